//! Demo/attract-mode player
//!
//! Picks one action per frame from the visible field. Not perfect on
//! purpose-built patterns, but good enough to show the game off and to drive
//! headless soak runs.

use super::stadium::{Avoidance, stadium};
use super::state::{Action, GameState, Obstacle};
use crate::consts::LANE_COUNT;

/// How far ahead (in depth) the autopilot looks for threats
const LOOKAHEAD: f32 = 0.45;
/// Lane distance that counts as "coming at me"
const THREAT_LANE: f32 = 0.9;

/// Next action for the current frame, if any
pub fn choose_action(state: &GameState) -> Option<Action> {
    if state.is_terminal() || state.stage.is_transitioning() {
        return None;
    }

    let stadium = stadium(state.stage.phase);
    let target = state.target_lane as f32;
    let step = (state.speed * state.tuning.depth_rate).max(1e-4);
    let window_far = state.tuning.hit_window_far;

    let threat = state
        .obstacles
        .iter()
        .filter(|o| is_threat(state, o, target))
        .min_by(|a, b| a.depth.total_cmp(&b.depth));

    if let Some(obs) = threat {
        let def = &stadium.obstacles[obs.def.min(stadium.obstacles.len() - 1)];
        if let Some(lane) = safest_neighbour(state) {
            return Some(if lane < state.target_lane {
                Action::Left
            } else {
                Action::Right
            });
        }
        return match def.avoid {
            // Re-ducking refreshes the timer, so keep ducking until it is past
            Avoidance::Duck if obs.depth < window_far + step * 3.0 && !state.is_jumping => {
                Some(Action::Duck)
            }
            // Leave time for the arc to climb over the clear height
            Avoidance::Jump if obs.depth < window_far + step * 5.0 && !state.is_jumping => {
                Some(Action::Jump)
            }
            _ => None,
        };
    }

    // Nothing to dodge: drift toward a booster
    let booster = state
        .boosters
        .iter()
        .filter(|b| b.active && b.depth < 0.7)
        .min_by(|a, b| a.depth.total_cmp(&b.depth))?;
    let lane = booster.lane.round() as usize;
    if lane < state.target_lane && lane_is_clear(state, lane) {
        Some(Action::Left)
    } else if lane > state.target_lane && lane_is_clear(state, lane) {
        Some(Action::Right)
    } else {
        None
    }
}

fn is_threat(state: &GameState, o: &Obstacle, lane: f32) -> bool {
    o.active
        && o.is_revealed()
        && o.depth > state.tuning.hit_window_near
        && o.depth < LOOKAHEAD
        && (o.lane - lane).abs() < THREAT_LANE
}

/// No revealed obstacle heading into `lane` within the lookahead
fn lane_is_clear(state: &GameState, lane: usize) -> bool {
    !state
        .obstacles
        .iter()
        .any(|o| is_threat(state, o, lane as f32))
}

/// Adjacent lane with no threat, preferring the centre
fn safest_neighbour(state: &GameState) -> Option<usize> {
    let here = state.target_lane;
    let mut candidates = Vec::with_capacity(2);
    if here > 0 {
        candidates.push(here - 1);
    }
    if here + 1 < LANE_COUNT {
        candidates.push(here + 1);
    }
    let centre = LANE_COUNT / 2;
    candidates.sort_by_key(|&l| l.abs_diff(centre));
    candidates.into_iter().find(|&l| lane_is_clear(state, l))
}
