//! Cholo Run - A stadium endless runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, spawning, collisions, difficulty director)
//! - `tuning`: Data-driven game balance
//! - `settings`: Player display preferences
//! - `highscores` / `progression`: Run-end leaderboard and career challenges
//! - `web`: Browser host binding (wasm32 only)

pub mod highscores;
pub mod progression;
pub mod settings;
pub mod sim;
mod storage;
pub mod tuning;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use highscores::HighScores;
pub use progression::{Profile, RunSummary};
pub use settings::{QualityPreset, Settings};
pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Logical canvas size (portrait)
    pub const VIEW_WIDTH: f32 = 540.0;
    pub const VIEW_HEIGHT: f32 = 960.0;

    /// Number of running lanes
    pub const LANE_COUNT: usize = 3;

    /// Screen Y of the vanishing horizon (depth = 1)
    pub const HORIZON_Y: f32 = 190.0;
    /// Screen Y of the nearest ground row (depth = 0)
    pub const GROUND_BOTTOM: f32 = VIEW_HEIGHT - 22.0;
    /// Screen Y where the runner is drawn
    pub const CAMERA_HEIGHT: f32 = VIEW_HEIGHT - 150.0;

    /// Milliseconds in one reference frame. All per-frame rates are
    /// expressed against this 60 Hz frame.
    pub const FRAME_MS: f32 = 1000.0 / 60.0;
    /// Largest step a single update may take, in reference frames.
    /// Keeps an obstacle from jumping over the whole hit window after a stall.
    pub const MAX_FRAME_STEP: f32 = 3.0;
}

/// Convert elapsed milliseconds to reference frames, clamped to `MAX_FRAME_STEP`
#[inline]
pub fn ms_to_frames(elapsed_ms: f64) -> f32 {
    ((elapsed_ms as f32) / consts::FRAME_MS).clamp(0.0, consts::MAX_FRAME_STEP)
}

/// Convert reference frames to milliseconds
#[inline]
pub fn frames_to_ms(frames: f32) -> f32 {
    frames * consts::FRAME_MS
}

/// Linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
