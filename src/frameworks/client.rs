// Framework bootstrap for the headless game client.

use crate::domain::SessionStorage;
use crate::frameworks::config;
use crate::interface_adapters::input::ScriptedInput;
use crate::interface_adapters::net::{RunSummary, RunnerSettings, run_session};
use crate::interface_adapters::persistence::{FileSessionStorage, MemorySessionStorage};
use crate::interface_adapters::presentation::LoggingPresentation;
use crate::use_cases::{SessionController, SessionSettings};

use std::{io::Result, sync::Arc};
use tokio::sync::Notify;

fn init_runtime() {
    let _ = dotenvy::dotenv();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

/// Runs one session with the logging presentation and the scripted patrol input.
pub async fn run(
    settings: RunnerSettings,
    tuning: SessionSettings,
    storage: &dyn SessionStorage,
    shutdown: Arc<Notify>,
) -> Result<RunSummary> {
    let mut session = SessionController::new(tuning, LoggingPresentation::new());
    let mut input = ScriptedInput::patrol(config::PATROL_LEG_TICKS);

    run_session(&settings, &mut session, &mut input, storage, shutdown)
        .await
        .map_err(std::io::Error::other)
}

pub async fn run_with_config() -> Result<()> {
    init_runtime();

    let settings = RunnerSettings {
        url: config::server_url(),
        room: config::room_name(),
        tick_interval: config::tick_interval(),
        join_timeout: config::JOIN_TIMEOUT,
    };
    let tuning = session_settings();
    tracing::debug!(
        url = %settings.url,
        room = %settings.room,
        tick_ms = settings.tick_interval.as_millis(),
        move_step = tuning.prediction.step,
        interpolation_factor = tuning.interpolation.factor,
        "client configured"
    );

    let storage: Box<dyn SessionStorage> = match config::session_file() {
        Some(path) => Box::new(FileSessionStorage::new(path)),
        None => Box::new(MemorySessionStorage::new()),
    };

    // Ctrl-C ends the session loop; teardown runs before `run` returns.
    let shutdown = Arc::new(Notify::new());
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received");
            signal.notify_one();
        }
    });

    run(settings, tuning, storage.as_ref(), shutdown)
        .await
        .inspect_err(|e| {
            tracing::error!(error = %e, "client error");
        })
        .map(|_| ())
}

fn session_settings() -> SessionSettings {
    let mut tuning = SessionSettings::default();
    if let Some(step) = config::move_step() {
        tuning.prediction.step = step;
    }
    if let Some(factor) = config::interpolation_factor() {
        tuning.interpolation.factor = factor;
    }
    tuning
}
