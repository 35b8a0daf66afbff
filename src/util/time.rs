//! Time utilities for game simulation

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use chrono::{DateTime, Utc};

/// Get current Unix timestamp in milliseconds
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_millis() as u64
}

/// Server start time for uptime tracking
static SERVER_START: std::sync::OnceLock<DateTime<Utc>> = std::sync::OnceLock::new();

/// Initialize server start time (call once at startup)
pub fn init_server_time() {
    SERVER_START.get_or_init(Utc::now);
}

/// Wall-clock time the server started, if initialized
pub fn server_started_at() -> Option<DateTime<Utc>> {
    SERVER_START.get().copied()
}

/// Get server uptime in seconds
pub fn uptime_secs() -> u64 {
    SERVER_START
        .get()
        .map(|start| (Utc::now() - *start).num_seconds().max(0) as u64)
        .unwrap_or(0)
}

/// Tick rate configuration
pub const SIMULATION_TPS: u32 = 60; // one tick per rendered frame
pub const SNAPSHOT_TPS: u32 = 60; // full snapshot every tick

/// Milliseconds represented by one simulation frame (`dt == 1.0`)
pub const FRAME_MS: f32 = 1000.0 / SIMULATION_TPS as f32;

/// Delta time for one authority tick, in frame units.
///
/// Velocities are expressed in units per frame, so a fixed-rate tick
/// always advances the world by exactly one frame.
pub fn tick_delta() -> f32 {
    1.0
}

/// Convert a frame-unit delta to milliseconds
pub fn frames_to_ms(dt: f32) -> f32 {
    dt * FRAME_MS
}
