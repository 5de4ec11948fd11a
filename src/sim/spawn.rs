//! Spawn controller
//!
//! One obstacle per elapsed interval, drawn from the current sub-phase pool.
//! Boosters ride along on spawn ticks behind a cooldown and a probability
//! roll, and never stack.

use rand::Rng;

use super::director::roll_spawn_interval;
use super::projection::project;
use super::stadium::{BoosterDef, ObstacleKind, Stadium};
use super::state::{Booster, GameState, Obstacle, Patrol};
use crate::consts::LANE_COUNT;

/// Advance spawn timers and spawn when due. Suspended during transitions.
pub fn update_spawner(state: &mut GameState, stadium: &Stadium, dt: f32) {
    if state.stage.is_transitioning() {
        return;
    }

    state.booster_cooldown = (state.booster_cooldown - dt).max(0.0);
    state.spawn_timer += dt;
    if state.spawn_timer < state.spawn_interval {
        return;
    }

    state.spawn_timer = 0.0;
    let lane = state.rng.random_range(0..LANE_COUNT);
    let pool = stadium.pool(state.stage.sub_phase);
    let def = pool[state.rng.random_range(0..pool.len())];
    spawn_obstacle(state, stadium, def, lane);

    if let Some(booster) = stadium.booster.as_ref() {
        maybe_spawn_booster(state, booster, lane);
    }

    roll_spawn_interval(state, stadium);
}

/// Spawn catalog entry `def` at the horizon in `lane`
pub fn spawn_obstacle(state: &mut GameState, stadium: &Stadium, def: usize, lane: usize) -> u32 {
    let def = def.min(stadium.obstacles.len().saturating_sub(1));
    let kind = stadium.obstacles[def].kind;

    let mole_phase = match kind {
        ObstacleKind::Mole => Some(state.tuning.mole_start_phase),
        _ => None,
    };
    let patrol = match kind {
        ObstacleKind::Patrol { lane_speed } => {
            let direction = if state.rng.random_bool(0.5) { 1.0 } else { -1.0 };
            Some(Patrol {
                direction,
                lane_speed,
            })
        }
        _ => None,
    };
    let depth = if mole_phase.is_some() {
        state.tuning.mole_ground_depth
    } else {
        1.0
    };

    let lane = lane.min(LANE_COUNT - 1) as f32;
    let id = state.next_entity_id();
    state.obstacles.push(Obstacle {
        id,
        lane,
        def,
        depth,
        active: true,
        mole_phase,
        patrol,
        near_miss: false,
        screen: project(lane, depth, state.lane_smooth),
    });
    id
}

/// Roll for a booster if the cooldown elapsed and none is out or held.
/// Returns whether one spawned.
pub fn maybe_spawn_booster(state: &mut GameState, def: &BoosterDef, obstacle_lane: usize) -> bool {
    let present = state.boosters.iter().any(|b| b.active);
    if present || state.active_booster.is_some() || state.booster_cooldown > 0.0 {
        return false;
    }

    state.booster_cooldown = def.cooldown_frames;
    if !state.rng.random_bool(def.spawn_chance.clamp(0.0, 1.0)) {
        return false;
    }

    // Keep it out of the obstacle's lane when possible
    let offset = state.rng.random_range(1..LANE_COUNT.max(2));
    let lane = (obstacle_lane + offset) % LANE_COUNT;
    spawn_booster(state, def, lane);
    true
}

/// Place a booster at the horizon
pub fn spawn_booster(state: &mut GameState, def: &BoosterDef, lane: usize) -> u32 {
    let lane = lane.min(LANE_COUNT - 1) as f32;
    let id = state.next_entity_id();
    state.boosters.push(Booster {
        id,
        lane,
        depth: 1.0,
        active: true,
        effect: def.effect,
        duration_ms: def.duration_ms,
        screen: project(lane, 1.0, state.lane_smooth),
    });
    id
}

/// Clean slate for a new stadium
pub fn reset_for_stage(state: &mut GameState, stadium: &Stadium) {
    state.obstacles.clear();
    state.boosters.clear();
    state.spawn_timer = 0.0;
    state.booster_cooldown = 0.0;
    roll_spawn_interval(state, stadium);
}
