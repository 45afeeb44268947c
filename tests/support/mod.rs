// Scripted WebSocket game server for end-to-end client tests.
use std::time::Duration;

// `SinkExt`/`StreamExt` drive the accepted WebSocket stream.
use futures_util::{SinkExt, StreamExt};
use game_client::domain::SessionIds;
use game_client::interface_adapters::protocol::{
    ClientMessage, EntityDto, EntityUpdateDto, JoinPayload, MovementDto, RemoveDto, ServerMessage,
};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::{WebSocketStream, accept_async, tungstenite::Message};

pub const REMOTE_KEY: &str = "remote-1";
pub const UNKNOWN_KEY: &str = "ghost";

// What the server does after accepting the connection.
#[derive(Debug, Clone, Copy)]
pub struct Script {
    // When false the join request is read and never answered.
    pub reply_join: bool,
    // Close the connection once this many movement commands arrived.
    pub close_after_movements: Option<usize>,
}

// Everything the server observed from the client.
#[derive(Debug, Default)]
pub struct ServerLog {
    pub join: Option<JoinPayload>,
    pub ids: Option<SessionIds>,
    pub movements: Vec<MovementDto>,
    pub projectiles: usize,
}

pub struct ScriptedServer {
    pub url: String,
    task: JoinHandle<ServerLog>,
}

impl ScriptedServer {
    // Wait for the scripted conversation to end and return its log.
    pub async fn finish(self) -> ServerLog {
        tokio::time::timeout(Duration::from_secs(5), self.task)
            .await
            .expect("scripted server should finish in time")
            .expect("scripted server task panicked")
    }
}

// Bind an ephemeral port and serve exactly one client with `script`.
pub async fn spawn_server(script: Script) -> ScriptedServer {
    // Bind to an ephemeral port to avoid collisions with local services.
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral test port");
    let addr = listener.local_addr().expect("get local addr");

    let task = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept client");
        let mut ws = accept_async(stream).await.expect("websocket handshake");
        serve(&mut ws, script).await
    });

    ScriptedServer {
        url: format!("ws://{addr}"),
        task,
    }
}

async fn serve(ws: &mut WebSocketStream<TcpStream>, script: Script) -> ServerLog {
    let mut log = ServerLog::default();

    // The first text frame must be the join request.
    let join = loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => {
                match serde_json::from_str::<ClientMessage>(&text).expect("client json") {
                    ClientMessage::Join(payload) => break payload,
                    other => panic!("expected join, got {other:?}"),
                }
            }
            Some(Ok(_)) => continue,
            _ => return log,
        }
    };
    log.join = Some(join.clone());

    if !script.reply_join {
        drain(ws).await;
        return log;
    }

    // Resume the stored session when the client sent one.
    let ids = SessionIds {
        room_id: join.room_id.unwrap_or_else(|| "room-test".to_string()),
        session_id: join
            .session_id
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
    };
    log.ids = Some(ids.clone());

    send(ws, ServerMessage::Joined(ids.clone())).await;
    send(ws, player_update(&ids.session_id, 0.0, 0, true)).await;
    send(ws, player_update(REMOTE_KEY, 5.0, 0, true)).await;
    send(ws, player_update(REMOTE_KEY, 10.0, 0, false)).await;
    send(
        ws,
        ServerMessage::Remove(RemoveDto {
            key: UNKNOWN_KEY.to_string(),
        }),
    )
    .await;

    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(ClientMessage::Movement(movement)) => {
                    log.movements.push(movement);
                    // Authoritative echo: the server accepts the move as sent.
                    send(
                        ws,
                        ServerMessage::Change(EntityUpdateDto {
                            key: ids.session_id.clone(),
                            entity: EntityDto::Player {
                                x: movement.x,
                                y: movement.y,
                                z: movement.z,
                                state_num: movement.state_num,
                                health: 100.0,
                            },
                        }),
                    )
                    .await;

                    if script.close_after_movements == Some(log.movements.len()) {
                        let _ = ws.close(None).await;
                        drain(ws).await;
                        return log;
                    }
                }
                Ok(ClientMessage::CreateProjectile(_)) => log.projectiles += 1,
                Ok(ClientMessage::Join(_)) | Err(_) => {}
            },
            Some(Ok(Message::Close(_))) | Some(Err(_)) | None => return log,
            Some(Ok(_)) => {}
        }
    }
}

fn player_update(key: &str, x: f32, state_num: u32, add: bool) -> ServerMessage {
    let update = EntityUpdateDto {
        key: key.to_string(),
        entity: EntityDto::Player {
            x,
            y: 0.0,
            z: 0.0,
            state_num,
            health: 100.0,
        },
    };
    if add {
        ServerMessage::Add(update)
    } else {
        ServerMessage::Change(update)
    }
}

async fn send(ws: &mut WebSocketStream<TcpStream>, msg: ServerMessage) {
    let txt = serde_json::to_string(&msg).expect("serialize server message");
    // The client may already be gone; the log captures what it saw.
    let _ = ws.send(Message::Text(txt.into())).await;
}

async fn drain(ws: &mut WebSocketStream<TcpStream>) {
    while let Some(Ok(_)) = ws.next().await {}
}
