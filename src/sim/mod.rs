//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time enters only through `update`/`tick`, clamped per step
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod director;
pub mod projection;
pub mod spawn;
pub mod stadium;
pub mod stage;
pub mod state;
pub mod tick;

pub use autopilot::choose_action;
pub use projection::{ScreenPos, project};
pub use stadium::{BoosterEffect, STADIUMS, Stadium, stadium, stadium_count};
pub use stage::{Outcome, StageProgress, StageStatus, status};
pub use state::{Action, GameEvent, GameState, Telemetry};
pub use tick::{TickOutcome, TickResult, tick, update};
