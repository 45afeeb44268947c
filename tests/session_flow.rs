mod support;

use std::sync::Arc;
use std::time::Duration;

use game_client::domain::{InputFrame, SessionIds, SessionPhase, SessionStorage, Vec2, Vec3};
use game_client::interface_adapters::input::ScriptedInput;
use game_client::interface_adapters::net::{
    DisconnectReason, NetError, RunnerSettings, run_session,
};
use game_client::interface_adapters::persistence::MemorySessionStorage;
use game_client::interface_adapters::presentation::LoggingPresentation;
use game_client::use_cases::{SessionController, SessionSettings};
use support::{Script, spawn_server};
use tokio::sync::Notify;

fn settings(url: &str) -> RunnerSettings {
    RunnerSettings {
        url: url.to_string(),
        room: "arena".to_string(),
        tick_interval: Duration::from_millis(10),
        join_timeout: Duration::from_secs(2),
    }
}

fn walking_right() -> ScriptedInput {
    ScriptedInput::constant(InputFrame {
        movement: Vec3::new(1.0, 0.0, 0.0),
        aim: Vec2::ZERO,
    })
}

fn controller() -> SessionController<LoggingPresentation> {
    SessionController::new(SessionSettings::default(), LoggingPresentation::new())
}

#[tokio::test]
async fn test_session_joins_predicts_and_tears_down_on_server_close() {
    let server = spawn_server(Script {
        reply_join: true,
        close_after_movements: Some(3),
    })
    .await;
    let storage = MemorySessionStorage::new();
    let mut session = controller();
    let mut input = walking_right();

    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        run_session(
            &settings(&server.url),
            &mut session,
            &mut input,
            &storage,
            Arc::new(Notify::new()),
        ),
    )
    .await
    .expect("session should end in time")
    .expect("session should end cleanly");
    let log = server.finish().await;

    let join = log.join.expect("client should send join");
    assert_eq!(join.room, "arena");
    assert_eq!(join.room_id, None);
    assert_eq!(join.session_id, None);

    // Sequence numbers start right after the spawn snapshot and increase by one.
    assert!(log.movements.len() >= 3);
    for (i, movement) in log.movements.iter().enumerate() {
        assert_eq!(movement.state_num, i as u32 + 1);
    }
    assert_eq!(
        (log.movements[0].x, log.movements[0].y, log.movements[0].z),
        (0.1, 0.0, 0.0)
    );

    let ids = log.ids.expect("server should assign ids");
    assert_eq!(summary.ids, ids);
    assert_eq!(summary.reason, DisconnectReason::ServerClosed);
    assert_eq!(summary.stats.rejected_events, 1);
    assert_eq!(storage.load(), Ok(Some(ids)));

    // Each echoed movement was reconciled before the close frame arrived.
    let stats = session.stats();
    assert_eq!(stats.confirmed + stats.corrected, 3);

    assert_eq!(session.phase(), SessionPhase::Disconnected);
    assert!(session.context().store.is_empty());
    assert_eq!(session.presentation().live_proxies(), 0);
    assert_eq!(session.sequence().pending(), 0);
}

#[tokio::test]
async fn test_stored_session_ids_are_sent_with_join() {
    let server = spawn_server(Script {
        reply_join: true,
        close_after_movements: Some(1),
    })
    .await;
    let stored = SessionIds {
        room_id: "room-9".to_string(),
        session_id: format!("resume-{}", uuid::Uuid::new_v4()),
    };
    let storage = MemorySessionStorage::with_ids(stored.clone());
    let mut session = controller();
    let mut input = walking_right();

    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        run_session(
            &settings(&server.url),
            &mut session,
            &mut input,
            &storage,
            Arc::new(Notify::new()),
        ),
    )
    .await
    .expect("session should end in time")
    .expect("session should end cleanly");
    let log = server.finish().await;

    let join = log.join.expect("client should send join");
    assert_eq!(join.room_id.as_deref(), Some("room-9"));
    assert_eq!(join.session_id.as_deref(), Some(stored.session_id.as_str()));
    assert_eq!(summary.ids, stored);
}

#[tokio::test]
async fn test_shutdown_signal_ends_the_session() {
    let server = spawn_server(Script {
        reply_join: true,
        close_after_movements: None,
    })
    .await;
    let storage = MemorySessionStorage::new();
    let mut session = controller();
    let mut input = walking_right();
    let shutdown = Arc::new(Notify::new());

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.notify_one();
    });

    let summary = tokio::time::timeout(
        Duration::from_secs(5),
        run_session(
            &settings(&server.url),
            &mut session,
            &mut input,
            &storage,
            shutdown,
        ),
    )
    .await
    .expect("session should end in time")
    .expect("session should end cleanly");
    let log = server.finish().await;

    assert_eq!(summary.reason, DisconnectReason::Shutdown);
    assert!(!log.movements.is_empty());
    assert_eq!(session.phase(), SessionPhase::Disconnected);
    assert_eq!(session.presentation().live_proxies(), 0);
}

#[tokio::test]
async fn test_unanswered_join_times_out_and_resets_the_session() {
    let server = spawn_server(Script {
        reply_join: false,
        close_after_movements: None,
    })
    .await;
    let storage = MemorySessionStorage::new();
    let mut session = controller();
    let mut input = walking_right();
    let mut runner = settings(&server.url);
    runner.join_timeout = Duration::from_millis(200);

    let result = run_session(
        &runner,
        &mut session,
        &mut input,
        &storage,
        Arc::new(Notify::new()),
    )
    .await;
    let log = server.finish().await;

    assert!(matches!(result, Err(NetError::JoinTimeout)));
    assert!(log.join.is_some());
    assert_eq!(session.phase(), SessionPhase::Disconnected);
    assert_eq!(storage.load(), Ok(None));
}

#[tokio::test]
async fn test_rejected_stored_session_is_cleared() {
    let server = spawn_server(Script {
        reply_join: false,
        close_after_movements: None,
    })
    .await;
    let storage = MemorySessionStorage::with_ids(SessionIds {
        room_id: "room-gone".to_string(),
        session_id: uuid::Uuid::new_v4().to_string(),
    });
    let mut session = controller();
    let mut input = walking_right();
    let mut runner = settings(&server.url);
    runner.join_timeout = Duration::from_millis(200);

    let result = run_session(
        &runner,
        &mut session,
        &mut input,
        &storage,
        Arc::new(Notify::new()),
    )
    .await;
    let log = server.finish().await;

    assert!(matches!(result, Err(NetError::JoinTimeout)));
    let join = log.join.expect("client should send join");
    assert_eq!(join.room_id.as_deref(), Some("room-gone"));
    assert_eq!(storage.load(), Ok(None));
}

#[tokio::test]
async fn test_released_aim_fires_projectiles() {
    let server = spawn_server(Script {
        reply_join: true,
        close_after_movements: Some(4),
    })
    .await;
    let storage = MemorySessionStorage::new();
    let mut session = controller();
    // Hold a diagonal aim for one tick, then let go.
    let mut input = ScriptedInput::new(vec![
        InputFrame {
            movement: Vec3::new(1.0, 0.0, 0.0),
            aim: Vec2::new(1.0, 1.0),
        },
        InputFrame {
            movement: Vec3::new(1.0, 0.0, 0.0),
            aim: Vec2::ZERO,
        },
    ]);

    tokio::time::timeout(
        Duration::from_secs(5),
        run_session(
            &settings(&server.url),
            &mut session,
            &mut input,
            &storage,
            Arc::new(Notify::new()),
        ),
    )
    .await
    .expect("session should end in time")
    .expect("session should end cleanly");
    let log = server.finish().await;

    assert_eq!(log.movements.len(), 4);
    assert!(log.projectiles >= 1);
}
