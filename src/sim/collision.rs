//! Entity movement and collision resolution
//!
//! Obstacles and boosters approach the runner along depth. Anything whose
//! path this tick crosses the hit window is tested against the runner's
//! smoothed lane, so a long step can never tunnel through the window.
//! Every active obstacle is resolved exactly once: a hit, a shield block, or
//! a scored dodge when it passes behind the runner.

use glam::Vec2;

use super::projection::project;
use super::stadium::{Avoidance, ObstacleDef, Stadium};
use super::stage::Outcome;
use super::state::{ActiveBooster, GameEvent, GameState, Obstacle, ParticleKind};
use crate::consts::{CAMERA_HEIGHT, FRAME_MS, LANE_COUNT, VIEW_WIDTH};

const HIT_PARTICLES: usize = 10;
const SHIELD_PARTICLES: usize = 14;
const PICKUP_PARTICLES: usize = 8;

const PARTICLE_GRAVITY: f32 = 0.32;
const PARTICLE_FADE: f32 = 0.03;
const FLOAT_RISE: f32 = 1.6;
const FLOAT_FADE: f32 = 0.02;
/// Combo at which score floats are highlighted
const FLOAT_HIGHLIGHT_COMBO: u32 = 3;

/// How an obstacle inside the hit window relates to the runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encounter {
    /// Not in the runner's lane
    OtherLane,
    /// In lane, but ducked or jumped correctly
    Avoided,
    /// In lane while invincible; it keeps going and scores when passed
    PassThrough,
    /// In lane with a shield up
    Shielded,
    Hit,
}

/// Whether a depth sweep `from -> to` overlaps the open band `(near, far)`
#[inline]
fn swept(from: f32, to: f32, near: f32, far: f32) -> bool {
    from.max(to) > near && from.min(to) < far
}

/// Can the runner's current pose get past this obstacle without leaving the lane?
pub fn pose_avoids(state: &GameState, def: &ObstacleDef) -> bool {
    match def.avoid {
        Avoidance::LaneOnly => false,
        Avoidance::Duck => state.is_ducking,
        Avoidance::Jump => state.is_jumping && state.jump_height >= state.tuning.jump_clear_height,
    }
}

/// Classify an obstacle that is inside the hit window
pub fn classify(state: &GameState, obstacle: &Obstacle, def: &ObstacleDef) -> Encounter {
    let tolerance = def.lane_tolerance.unwrap_or(state.tuning.lane_tolerance);
    if (obstacle.lane - state.lane_smooth).abs() >= tolerance {
        Encounter::OtherLane
    } else if pose_avoids(state, def) {
        Encounter::Avoided
    } else if state.is_invincible {
        Encounter::PassThrough
    } else if state.has_shield() {
        Encounter::Shielded
    } else {
        Encounter::Hit
    }
}

/// Move obstacles, resolve collisions, score dodges and drop passed entities
pub fn update_obstacles(state: &mut GameState, stadium: &Stadium, dt: f32) {
    let mut obstacles = std::mem::take(&mut state.obstacles);
    let last = stadium.obstacles.len().saturating_sub(1);

    for obs in obstacles.iter_mut() {
        if state.is_terminal() {
            break;
        }
        let def = &stadium.obstacles[obs.def.min(last)];
        let prev_depth = obs.depth;
        advance_obstacle(state, obs, dt);

        if obs.active && obs.is_revealed() {
            let t = &state.tuning;
            if swept(prev_depth, obs.depth, t.hit_window_near, t.hit_window_far) {
                resolve(state, obs, def, prev_depth);
            }
        }

        if obs.active && obs.depth < state.tuning.pass_depth {
            score_dodge(state, obs, def);
        }
    }

    let cleanup = state.tuning.cleanup_depth;
    obstacles.retain(|o| o.depth > cleanup);
    state.obstacles = obstacles;
}

fn advance_obstacle(state: &GameState, obs: &mut Obstacle, dt: f32) {
    let t = &state.tuning;
    let speed = state.speed;

    match obs.mole_phase.as_mut() {
        Some(phase) if *phase < 0.0 => {
            *phase += t.mole_reveal_rate * dt;
            obs.depth = t.mole_ground_depth;
        }
        Some(_) => obs.depth -= speed * t.mole_depth_rate * dt,
        None => obs.depth -= speed * t.depth_rate * dt,
    }

    if let Some(patrol) = obs.patrol.as_mut() {
        let max_lane = (LANE_COUNT - 1) as f32;
        obs.lane += patrol.direction * patrol.lane_speed * dt;
        if obs.lane <= 0.0 {
            obs.lane = (-obs.lane).min(max_lane);
            patrol.direction = 1.0;
        } else if obs.lane >= max_lane {
            obs.lane = (2.0 * max_lane - obs.lane).max(0.0);
            patrol.direction = -1.0;
        }
    }

    obs.screen = project(obs.lane, obs.depth, state.lane_smooth);
}

fn resolve(state: &mut GameState, obs: &mut Obstacle, def: &ObstacleDef, prev_depth: f32) {
    match classify(state, obs, def) {
        Encounter::OtherLane => {
            let band = state.tuning.near_miss_depth;
            let close = (obs.lane - state.lane_smooth).abs() < state.tuning.near_miss_lane;
            if !obs.near_miss && close && swept(prev_depth, obs.depth, -band, band) {
                obs.near_miss = true;
                state.telemetry.near_misses += 1;
                state.events.push(GameEvent::NearMiss);
            }
        }
        Encounter::Avoided | Encounter::PassThrough => {}
        Encounter::Shielded => {
            obs.active = false;
            state.active_booster = None;
            state.is_invincible = true;
            state.invincible_ms = state.invincible_ms.max(state.tuning.shield_grace_ms);
            state.burst(obs.screen.pos, SHIELD_PARTICLES, ParticleKind::Shield);
            state.events.push(GameEvent::ShieldBlocked);
            log::debug!("Shield absorbed {}", def.name);
        }
        Encounter::Hit => {
            obs.active = false;
            apply_hit(state, obs.screen.pos);
            log::debug!("Hit by {} ({} lives left)", def.name, state.lives);
        }
    }
}

/// Damage the runner. Ends the run when the last life goes.
pub fn apply_hit(state: &mut GameState, at: Vec2) {
    state.lives = state.lives.saturating_sub(1);
    state.combo = 0;
    state.is_invincible = true;
    state.invincible_ms = state.tuning.invincible_ms;
    state.shake_ms = state.tuning.shake_ms;
    state.recovery_ms = state.tuning.recovery_ms;
    state.burst(at, HIT_PARTICLES, ParticleKind::Hit);

    let telemetry = &mut state.telemetry;
    telemetry.hits_taken += 1;
    telemetry.recent_hits += 1.0;
    telemetry.no_damage_dodges = 0;

    state.events.push(GameEvent::Hit {
        lives_left: state.lives,
    });

    if state.lives == 0 {
        let score = state.score;
        state.outcome = Some(Outcome::GameOver { score });
        state.events.push(GameEvent::GameOver { score });
        log::info!("Game over with score {}", score);
    }
}

fn score_dodge(state: &mut GameState, obs: &mut Obstacle, def: &ObstacleDef) {
    obs.active = false;
    state.combo += 1;
    state.max_combo = state.max_combo.max(state.combo);

    let telemetry = &mut state.telemetry;
    telemetry.dodges += 1;
    if telemetry.hits_taken == 0 {
        telemetry.no_damage_dodges += 1;
        telemetry.best_no_damage_dodges = telemetry.best_no_damage_dodges.max(telemetry.no_damage_dodges);
    }

    let multiplier = state.combo.min(state.tuning.combo_cap) as u64;
    let points = def.points as u64 * multiplier;
    state.score += points;
    state.stage.local_score += points;

    let highlight = state.combo >= FLOAT_HIGHLIGHT_COMBO;
    state.push_float(
        Vec2::new(VIEW_WIDTH / 2.0, CAMERA_HEIGHT - 118.0),
        format!("+{points}"),
        highlight,
    );
    state.events.push(GameEvent::Dodged {
        points,
        combo: state.combo,
    });
}

/// Move boosters and collect any the runner touches
pub fn update_boosters(state: &mut GameState, dt: f32) {
    let mut boosters = std::mem::take(&mut state.boosters);

    for b in boosters.iter_mut() {
        let prev_depth = b.depth;
        b.depth -= state.speed * state.tuning.depth_rate * dt;
        b.screen = project(b.lane, b.depth, state.lane_smooth);

        if !b.active {
            continue;
        }
        let t = &state.tuning;
        let in_lane = (b.lane - state.lane_smooth).abs() < t.lane_tolerance;
        if in_lane && swept(prev_depth, b.depth, t.hit_window_near, t.hit_window_far) {
            b.active = false;
            state.active_booster = Some(ActiveBooster {
                effect: b.effect,
                remaining_ms: b.duration_ms,
                duration_ms: b.duration_ms,
            });
            state.burst(b.screen.pos, PICKUP_PARTICLES, ParticleKind::Pickup);
            state.push_float(
                Vec2::new(VIEW_WIDTH / 2.0, CAMERA_HEIGHT - 140.0),
                b.effect.label().to_string(),
                true,
            );
            state.events.push(GameEvent::BoosterCollected(b.effect));
            log::debug!("Booster collected: {:?}", b.effect);
        } else if b.depth < t.pass_depth {
            b.active = false;
        }
    }

    let cleanup = state.tuning.cleanup_depth;
    boosters.retain(|b| b.depth > cleanup);
    state.boosters = boosters;
}

/// Count down the held booster
pub fn tick_active_booster(state: &mut GameState, dt: f32) {
    let Some(active) = state.active_booster.as_mut() else {
        return;
    };
    active.remaining_ms -= dt * FRAME_MS;
    if active.remaining_ms <= 0.0 {
        let effect = active.effect;
        state.active_booster = None;
        state.events.push(GameEvent::BoosterExpired(effect));
    }
}

/// Particles fall and fade; score floats rise and fade
pub fn update_effects(state: &mut GameState, dt: f32) {
    for p in state.particles.iter_mut() {
        p.vel.y += PARTICLE_GRAVITY * dt;
        p.pos += p.vel * dt;
        p.life -= PARTICLE_FADE * dt;
    }
    state.particles.retain(|p| p.life > 0.0);

    for f in state.floats.iter_mut() {
        f.pos.y -= FLOAT_RISE * dt;
        f.life -= FLOAT_FADE * dt;
    }
    state.floats.retain(|f| f.life > 0.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawn::{spawn_booster, spawn_obstacle};
    use crate::sim::stadium::{BoosterEffect, stadium};

    /// Obstacle `def` of stadium 0 placed just outside the hit window
    fn approaching(state: &mut GameState, def: usize, lane: usize) -> u32 {
        let id = spawn_obstacle(state, stadium(0), def, lane);
        let obs = state.obstacles.iter_mut().find(|o| o.id == id).unwrap();
        obs.depth = 0.14;
        obs.mole_phase = obs.mole_phase.map(|_| 0.0);
        id
    }

    fn run(state: &mut GameState, frames: usize) {
        for _ in 0..frames {
            update_obstacles(state, stadium(0), 1.0);
        }
    }

    #[test]
    fn test_same_lane_hit() {
        // Cono: lane-only obstacle
        let mut state = GameState::new(1);
        state.speed = 2.0;
        approaching(&mut state, 2, 1);
        run(&mut state, 1);
        assert_eq!(state.lives, 2);
        assert_eq!(state.combo, 0);
        assert!(state.is_invincible);
        assert!((state.invincible_ms - 1250.0).abs() < 1e-3);
        assert!(state.shake_ms > 0.0);
        assert_eq!(state.particles.len(), 10);
        assert_eq!(state.telemetry.hits_taken, 1);
        assert!(state.events.contains(&GameEvent::Hit { lives_left: 2 }));
        assert!(!state.obstacles[0].active);
    }

    #[test]
    fn test_other_lane_dodge_scores() {
        let mut state = GameState::new(1);
        state.speed = 2.0;
        state.lane_smooth = 0.0;
        state.combo = 2;
        approaching(&mut state, 2, 1);
        // Crosses the window and passes behind the runner
        run(&mut state, 20);
        assert_eq!(state.lives, 3);
        assert_eq!(state.combo, 3);
        // Cono is worth 15, x3 combo
        assert_eq!(state.score, 45);
        assert_eq!(state.stage.local_score, 45);
        assert_eq!(state.telemetry.dodges, 1);
        let float = state.floats.last().unwrap();
        assert_eq!(float.text, "+45");
        assert!(float.highlight);
    }

    #[test]
    fn test_no_damage_streak_stops_at_first_hit() {
        let mut state = GameState::new(1);
        state.speed = 2.0;
        state.lane_smooth = 0.0;
        approaching(&mut state, 2, 2);
        run(&mut state, 20);
        assert_eq!(state.telemetry.no_damage_dodges, 1);

        apply_hit(&mut state, Vec2::ZERO);
        assert_eq!(state.telemetry.no_damage_dodges, 0);
        approaching(&mut state, 2, 2);
        run(&mut state, 20);
        assert_eq!(state.telemetry.dodges, 2);
        assert_eq!(state.telemetry.no_damage_dodges, 0);
        assert_eq!(state.telemetry.best_no_damage_dodges, 1);
    }

    #[test]
    fn test_five_dodges_with_combo_cap() {
        // Five 10-point dodges at combo 1..5: 10 + 20 + 30 + 40 + 50
        let mut state = GameState::new(1);
        state.speed = 2.0;
        state.lane_smooth = 0.0;
        for _ in 0..5 {
            // Rival caído is worth 10
            approaching(&mut state, 0, 2);
            run(&mut state, 20);
        }
        assert_eq!(state.combo, 5);
        assert_eq!(state.score, 150);
    }

    #[test]
    fn test_combo_multiplier_capped() {
        let mut state = GameState::new(1);
        state.speed = 2.0;
        state.lane_smooth = 0.0;
        state.combo = 9;
        approaching(&mut state, 2, 2);
        run(&mut state, 20);
        assert_eq!(state.combo, 10);
        assert_eq!(state.score, 15 * 5);
    }

    #[test]
    fn test_duck_avoids_thrown_object() {
        // Balón perdido must be ducked
        let mut state = GameState::new(1);
        state.speed = 2.0;
        state.is_ducking = true;
        state.duck_ms = 10_000.0;
        approaching(&mut state, 5, 1);
        run(&mut state, 20);
        assert_eq!(state.lives, 3);
        assert_eq!(state.combo, 1);
    }

    #[test]
    fn test_duck_does_not_clear_ground_obstacle() {
        // Rival caído needs a jump
        let mut state = GameState::new(1);
        state.speed = 2.0;
        state.is_ducking = true;
        approaching(&mut state, 0, 1);
        run(&mut state, 1);
        assert_eq!(state.lives, 2);
    }

    #[test]
    fn test_jump_needs_height() {
        let mut state = GameState::new(1);
        state.speed = 2.0;
        state.is_jumping = true;
        state.jump_height = 0.1;
        approaching(&mut state, 0, 1);
        run(&mut state, 1);
        assert_eq!(state.lives, 2);

        let mut state = GameState::new(1);
        state.speed = 2.0;
        state.is_jumping = true;
        state.jump_height = 0.9;
        approaching(&mut state, 0, 1);
        run(&mut state, 20);
        assert_eq!(state.lives, 3);
        assert_eq!(state.telemetry.dodges, 1);
    }

    #[test]
    fn test_invincible_passes_through_and_scores() {
        let mut state = GameState::new(1);
        state.speed = 2.0;
        state.is_invincible = true;
        state.invincible_ms = 10_000.0;
        approaching(&mut state, 2, 1);
        run(&mut state, 20);
        assert_eq!(state.lives, 3);
        assert_eq!(state.telemetry.dodges, 1);
        assert!(state.score > 0);
    }

    #[test]
    fn test_shield_absorbs_hit() {
        let mut state = GameState::new(1);
        state.speed = 2.0;
        state.combo = 4;
        state.active_booster = Some(ActiveBooster {
            effect: BoosterEffect::Shield,
            remaining_ms: 5000.0,
            duration_ms: 8000.0,
        });
        approaching(&mut state, 2, 1);
        run(&mut state, 20);
        assert_eq!(state.lives, 3);
        assert_eq!(state.combo, 4);
        assert!(state.active_booster.is_none());
        assert!(state.is_invincible);
        assert_eq!(state.score, 0);
        assert!(state.events.contains(&GameEvent::ShieldBlocked));
    }

    #[test]
    fn test_last_life_ends_run() {
        let mut state = GameState::new(1);
        state.speed = 2.0;
        state.lives = 1;
        state.score = 321;
        approaching(&mut state, 2, 1);
        run(&mut state, 1);
        assert_eq!(state.lives, 0);
        assert_eq!(state.outcome, Some(Outcome::GameOver { score: 321 }));
        assert!(state.events.contains(&GameEvent::GameOver { score: 321 }));
    }

    #[test]
    fn test_near_miss_counted_once() {
        let mut state = GameState::new(1);
        state.speed = 1.0;
        state.lane_smooth = 0.0;
        approaching(&mut state, 2, 1);
        run(&mut state, 40);
        assert_eq!(state.telemetry.near_misses, 1);
        let near = state.events.iter().filter(|e| **e == GameEvent::NearMiss).count();
        assert!(near <= 1);
    }

    #[test]
    fn test_far_lane_is_not_near_miss() {
        let mut state = GameState::new(1);
        state.speed = 1.0;
        state.lane_smooth = 0.0;
        approaching(&mut state, 2, 2);
        run(&mut state, 40);
        assert_eq!(state.telemetry.near_misses, 0);
    }

    #[test]
    fn test_large_step_cannot_tunnel() {
        let mut state = GameState::new(1);
        // Per-step travel larger than the whole window
        state.speed = 40.0;
        approaching(&mut state, 2, 1);
        update_obstacles(&mut state, stadium(0), 1.0);
        assert_eq!(state.lives, 2);
    }

    #[test]
    fn test_underground_mole_is_harmless() {
        let mut state = GameState::new(1);
        state.speed = 2.0;
        let id = spawn_obstacle(&mut state, stadium(0), 1, 1);
        for _ in 0..10 {
            update_obstacles(&mut state, stadium(0), 1.0);
        }
        let mole = state.obstacles.iter().find(|o| o.id == id).unwrap();
        assert!(!mole.is_revealed());
        assert!((mole.depth - state.tuning.mole_ground_depth).abs() < 1e-6);
        assert_eq!(state.lives, 3);

        // 0.55 / 0.017 frames until it surfaces
        for _ in 0..30 {
            update_obstacles(&mut state, stadium(0), 1.0);
        }
        let mole = state.obstacles.iter().find(|o| o.id == id).unwrap();
        assert!(mole.is_revealed());
        assert!(mole.depth < state.tuning.mole_ground_depth);
    }

    #[test]
    fn test_patrol_reflects_at_edges() {
        let mut state = GameState::new(1);
        state.speed = 0.0;
        spawn_obstacle(&mut state, stadium(0), 6, 2);
        state.obstacles[0].patrol.as_mut().unwrap().direction = 1.0;
        update_obstacles(&mut state, stadium(0), 1.0);
        let obs = &state.obstacles[0];
        assert!(obs.lane <= 2.0);
        assert_eq!(obs.patrol.unwrap().direction, -1.0);

        for _ in 0..500 {
            update_obstacles(&mut state, stadium(0), 3.0);
            let lane = state.obstacles[0].lane;
            assert!((0.0..=2.0).contains(&lane));
        }
    }

    #[test]
    fn test_cleanup_behind_runner() {
        let mut state = GameState::new(1);
        state.speed = 2.0;
        state.lane_smooth = 0.0;
        approaching(&mut state, 2, 2);
        run(&mut state, 40);
        assert!(state.obstacles.is_empty());
    }

    #[test]
    fn test_booster_pickup_and_expiry() {
        let mut state = GameState::new(1);
        state.speed = 2.0;
        let def = stadium(0).booster.unwrap();
        spawn_booster(&mut state, &def, 1);
        state.boosters[0].depth = 0.14;
        update_boosters(&mut state, 1.0);
        assert!(state.has_shield());
        assert!(state.events.contains(&GameEvent::BoosterCollected(BoosterEffect::Shield)));

        // 8 s at 60 fps is 480 frames
        for _ in 0..479 {
            tick_active_booster(&mut state, 1.0);
        }
        assert!(state.has_shield());
        tick_active_booster(&mut state, 2.0);
        assert!(state.active_booster.is_none());
        assert!(state.events.contains(&GameEvent::BoosterExpired(BoosterEffect::Shield)));
    }

    #[test]
    fn test_missed_booster_dropped() {
        let mut state = GameState::new(1);
        state.speed = 2.0;
        let def = stadium(0).booster.unwrap();
        spawn_booster(&mut state, &def, 0);
        state.boosters[0].depth = 0.14;
        for _ in 0..40 {
            update_boosters(&mut state, 1.0);
        }
        assert!(state.active_booster.is_none());
        assert!(state.boosters.is_empty());
    }

    #[test]
    fn test_effects_fade_out() {
        let mut state = GameState::new(1);
        state.burst(Vec2::new(100.0, 100.0), 5, ParticleKind::Hit);
        state.push_float(Vec2::new(10.0, 500.0), "+10".into(), false);
        update_effects(&mut state, 1.0);
        assert_eq!(state.particles.len(), 5);
        assert!(state.floats[0].pos.y < 500.0);
        for _ in 0..60 {
            update_effects(&mut state, 1.0);
        }
        assert!(state.particles.is_empty());
        assert!(state.floats.is_empty());
    }
}
