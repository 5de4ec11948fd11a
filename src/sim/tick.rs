//! Per-frame simulation step
//!
//! `update` is the host entry point: it turns a wall-clock timestamp into a
//! clamped frame delta and runs one `tick`. `tick` advances the whole run in
//! a fixed order so that seeded runs replay identically.

use std::f32::consts::PI;

use glam::Vec2;
use rand::Rng;
use serde::Serialize;

use super::collision::{tick_active_booster, update_boosters, update_effects, update_obstacles};
use super::director::{current_speed, update_aggro};
use super::spawn::update_spawner;
use super::stadium::{Stadium, stadium};
use super::stage::{Outcome, advance_transition, check_progression, update_sub_phase};
use super::state::GameState;
use crate::consts::{LANE_COUNT, MAX_FRAME_STEP};
use crate::{frames_to_ms, ms_to_frames};

/// Background scroll per unit of speed per frame
const SCROLL_RATE: f32 = 10.0;

/// What a tick did to the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TickOutcome {
    Continuing,
    /// Reported once, on the tick that took the last life
    GameOver { score: u64 },
    /// Reported once, on the tick that cleared the final stadium
    Victory { score: u64 },
    /// Run already ended; nothing was simulated
    Halted,
}

/// Result of one update, with the stadium the frame should be drawn in
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    pub outcome: TickOutcome,
    pub stadium: &'static Stadium,
}

impl TickResult {
    fn new(outcome: TickOutcome, state: &GameState) -> Self {
        Self {
            outcome,
            stadium: stadium(state.stage.phase),
        }
    }
}

/// Advance the run to host time `now_ms`.
///
/// The first call only records the timestamp, as does any call that yields
/// no elapsed time, so repeated calls with the same `now_ms` change nothing.
/// `state.events` always describes this call and is empty when nothing ran.
pub fn update(state: &mut GameState, now_ms: f64) -> TickResult {
    state.events.clear();
    let previous = state.last_now_ms.replace(now_ms);

    if state.is_terminal() {
        return TickResult::new(TickOutcome::Halted, state);
    }

    let dt = previous.map(|prev| ms_to_frames(now_ms - prev)).unwrap_or(0.0);
    if dt <= 0.0 {
        return TickResult::new(TickOutcome::Continuing, state);
    }

    tick(state, dt)
}

/// Advance the run by `dt` reference frames (clamped to `MAX_FRAME_STEP`)
pub fn tick(state: &mut GameState, dt: f32) -> TickResult {
    if state.is_terminal() {
        return TickResult::new(TickOutcome::Halted, state);
    }

    let dt = dt.clamp(0.0, MAX_FRAME_STEP);
    if dt <= 0.0 {
        return TickResult::new(TickOutcome::Continuing, state);
    }

    state.events.clear();
    state.frame += dt;

    advance_transition(state, dt);
    let stadium = stadium(state.stage.phase);

    update_aggro(state, dt);
    state.speed = current_speed(state, stadium);
    state.scroll_x += state.speed * SCROLL_RATE * dt;

    update_runner(state, dt);
    tick_active_booster(state, dt);
    update_spawner(state, stadium, dt);

    // The field is frozen while the next stadium slides in
    if !state.stage.is_transitioning() {
        update_obstacles(state, stadium, dt);
        update_boosters(state, dt);
        update_sub_phase(state);
    }
    update_effects(state, dt);

    check_progression(state);

    let outcome = match state.outcome {
        Some(Outcome::GameOver { score }) => TickOutcome::GameOver { score },
        Some(Outcome::Victory { score }) => TickOutcome::Victory { score },
        None => TickOutcome::Continuing,
    };
    TickResult::new(outcome, state)
}

/// Lane smoothing, pose timers, invincibility, shake and recovery
fn update_runner(state: &mut GameState, dt: f32) {
    let ms = frames_to_ms(dt);
    let max_lane = (LANE_COUNT - 1) as f32;

    let blend = (state.tuning.lane_smoothing * dt).min(1.0);
    state.lane_smooth += (state.target_lane as f32 - state.lane_smooth) * blend;
    state.lane_smooth = state.lane_smooth.clamp(0.0, max_lane);
    state.lane = state.lane_smooth.round() as usize;

    if state.is_ducking {
        state.duck_ms -= ms;
        if state.duck_ms <= 0.0 {
            state.is_ducking = false;
            state.duck_ms = 0.0;
        }
    }

    if state.is_jumping {
        state.jump_ms -= ms;
        if state.jump_ms <= 0.0 {
            state.is_jumping = false;
            state.jump_ms = 0.0;
            state.jump_height = 0.0;
        } else {
            let total = state.tuning.jump_ms.max(1.0);
            let progress = (1.0 - state.jump_ms / total).clamp(0.0, 1.0);
            state.jump_height = (PI * progress).sin();
        }
    }

    if state.is_invincible {
        state.invincible_ms -= ms;
        if state.invincible_ms <= 0.0 {
            state.is_invincible = false;
            state.invincible_ms = 0.0;
        }
    }

    state.recovery_ms = (state.recovery_ms - ms).max(0.0);

    if state.shake_ms > 0.0 {
        state.shake_ms = (state.shake_ms - ms).max(0.0);
    }
    state.shake = if state.shake_ms > 0.0 && state.tuning.screen_shake {
        let amp = state.tuning.shake_amplitude;
        Vec2::new(
            (state.rng.random::<f32>() - 0.5) * amp,
            (state.rng.random::<f32>() - 0.5) * amp,
        )
    } else {
        Vec2::ZERO
    };
}
