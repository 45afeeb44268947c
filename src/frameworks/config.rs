use std::{env, time::Duration};

// Runtime/client constants (not gameplay tuning).

pub fn server_url() -> String {
    env::var("GAME_SERVER_URL").unwrap_or_else(|_| "ws://127.0.0.1:2567".to_string())
}

pub fn room_name() -> String {
    env::var("GAME_ROOM").unwrap_or_else(|_| "game".to_string())
}

pub fn tick_interval() -> Duration {
    let millis = env::var("CLIENT_TICK_MS")
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|millis| *millis > 0)
        .unwrap_or(16);
    Duration::from_millis(millis)
}

// Overrides for gameplay tuning; `None` keeps the tuning default.
pub fn move_step() -> Option<f32> {
    env_f32("MOVE_STEP")
}

pub fn interpolation_factor() -> Option<f32> {
    env_f32("INTERPOLATION_FACTOR")
}

// Empty value disables persistence for the run.
pub fn session_file() -> Option<String> {
    match env::var("SESSION_FILE") {
        Ok(path) if path.trim().is_empty() => None,
        Ok(path) => Some(path),
        Err(_) => Some(".session.toml".to_string()),
    }
}

fn env_f32(name: &str) -> Option<f32> {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<f32>().ok())
        .filter(|value| value.is_finite())
}

pub const JOIN_TIMEOUT: Duration = Duration::from_secs(5);
// Ticks per side of the scripted patrol driven by the headless binary.
pub const PATROL_LEG_TICKS: usize = 60;
