//! Difficulty director
//!
//! Rubber-bands the challenge to recent performance: long combos and near
//! misses push `director_aggro` up, a recent hit relaxes it. Aggro scales the
//! speed curve and, together with the same telemetry, biases spawn cadence.
//! Every output is clamped so the game can neither run away nor stall.

use rand::Rng;

use super::stadium::{SpawnProfile, SpeedCurve, Stadium};
use super::state::{GameState, Telemetry};
use crate::tuning::{DirectorTuning, SpawnTuning};

/// Aggro the director is steering toward
pub fn target_aggro(telemetry: &Telemetry, recovering: bool, t: &DirectorTuning) -> f32 {
    let combo_pressure = ((telemetry.avg_combo() - t.combo_pivot) * t.combo_pressure).max(0.0);
    let near_miss_pressure = (telemetry.near_misses as f32 * t.near_miss_pressure).min(t.near_miss_cap);
    let relief = if recovering { t.recovery_relief } else { 0.0 };

    (1.0 + combo_pressure + near_miss_pressure - relief).clamp(t.aggro_min, t.aggro_max)
}

/// Sample telemetry and move `director_aggro` toward its target
pub fn update_aggro(state: &mut GameState, dt: f32) {
    let decay = (1.0 - state.tuning.spawn.recent_hit_decay).clamp(0.0, 1.0);
    state.telemetry.recent_hits *= decay.powf(dt);
    state.telemetry.sample_combo(state.combo, dt);

    let t = &state.tuning.director;
    let target = target_aggro(&state.telemetry, state.recovery_ms > 0.0, t);
    let blend = (t.filter_rate * dt).min(1.0);
    state.director_aggro += (target - state.director_aggro) * blend;
    state.director_aggro = state.director_aggro.clamp(t.aggro_min, t.aggro_max);
}

/// Piecewise-linear speed for a run score.
///
/// Each segment picks up where the previous left off and is capped, so the
/// result never exceeds `late_cap`.
pub fn curve_speed(curve: &SpeedCurve, score: u64, initial_speed: f32) -> f32 {
    let early = score.min(curve.mid_start) as f32;
    let mut speed = (initial_speed + early * curve.early_slope).min(curve.early_cap);
    if score > curve.mid_start {
        let over = score.min(curve.late_start).saturating_sub(curve.mid_start) as f32;
        speed = (speed + over * curve.mid_slope).min(curve.mid_cap);
    }
    if score > curve.late_start {
        let over = (score - curve.late_start) as f32;
        speed = (speed + over * curve.late_slope).min(curve.late_cap);
    }
    speed
}

/// Final scroll speed: curve x aggro x booster
pub fn current_speed(state: &GameState, stadium: &Stadium) -> f32 {
    curve_speed(&stadium.speed_curve, state.score, state.tuning.initial_speed)
        * state.director_aggro
        * state.booster_speed_multiplier()
}

/// Inputs to the spawn interval formula
#[derive(Debug, Clone, Copy)]
pub struct SpawnPressure {
    /// Baseline rolled from the stadium band
    pub baseline: f32,
    pub speed: f32,
    pub stage_index: usize,
    pub avg_combo: f32,
    pub near_misses: u32,
    pub recent_hits: f32,
    /// Already-rolled jitter in frames
    pub jitter: f32,
}

/// Frames until the next spawn, clamped to the stadium's floor/ceiling
pub fn spawn_interval(p: &SpawnPressure, profile: &SpawnProfile, t: &SpawnTuning) -> f32 {
    let speed_bias = (p.speed * t.speed_bias_per_speed).min(t.speed_bias_cap) * profile.speed_bias;
    let stage_bias = p.stage_index as f32 * t.stage_bias * profile.phase_bias;
    let combo_bias = (p.avg_combo * t.combo_bias).min(t.combo_bias_cap);
    let near_miss_bias = (p.near_misses as f32 * t.near_miss_bias).min(t.near_miss_bias_cap);
    let safety = (p.recent_hits * t.safety_per_hit).min(t.safety_cap);

    let raw = p.baseline - speed_bias - stage_bias - combo_bias - near_miss_bias + safety + p.jitter;
    raw.clamp(profile.floor, profile.ceiling)
}

/// Re-roll the baseline and jitter and store the next interval
pub fn roll_spawn_interval(state: &mut GameState, stadium: &Stadium) -> f32 {
    let profile = &stadium.spawn;
    let jitter_range = state.tuning.spawn.jitter.max(0.0);
    state.spawn_baseline = state
        .rng
        .random_range(profile.baseline_min..=profile.baseline_max);
    let jitter = if jitter_range > 0.0 {
        state.rng.random_range(-jitter_range..=jitter_range)
    } else {
        0.0
    };

    let pressure = SpawnPressure {
        baseline: state.spawn_baseline,
        speed: state.speed,
        stage_index: state.stage.phase,
        avg_combo: state.telemetry.avg_combo(),
        near_misses: state.telemetry.near_misses,
        recent_hits: state.telemetry.recent_hits,
        jitter,
    };
    state.spawn_interval = spawn_interval(&pressure, profile, &state.tuning.spawn);
    state.spawn_interval
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stadium::stadium;

    fn calm() -> SpawnPressure {
        SpawnPressure {
            baseline: 90.0,
            speed: 2.0,
            stage_index: 0,
            avg_combo: 0.0,
            near_misses: 0,
            recent_hits: 0.0,
            jitter: 0.0,
        }
    }

    #[test]
    fn test_target_aggro_neutral() {
        let t = DirectorTuning::default();
        let telemetry = Telemetry::default();
        assert!((target_aggro(&telemetry, false, &t) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_target_aggro_pressure_and_relief() {
        let t = DirectorTuning::default();
        let mut telemetry = Telemetry::default();
        telemetry.sample_combo(6, 10.0);
        telemetry.near_misses = 5;
        let pushed = target_aggro(&telemetry, false, &t);
        // (6 - 2) * 0.04 + 5 * 0.01
        assert!((pushed - 1.21).abs() < 1e-4);
        let relieved = target_aggro(&telemetry, true, &t);
        assert!((relieved - 1.03).abs() < 1e-4);
    }

    #[test]
    fn test_target_aggro_clamped() {
        let t = DirectorTuning::default();
        let mut telemetry = Telemetry::default();
        telemetry.sample_combo(500, 1.0);
        telemetry.near_misses = 1000;
        assert!((target_aggro(&telemetry, false, &t) - t.aggro_max).abs() < 1e-6);

        let empty = Telemetry::default();
        let low = DirectorTuning {
            recovery_relief: 5.0,
            ..DirectorTuning::default()
        };
        assert!((target_aggro(&empty, true, &low) - low.aggro_min).abs() < 1e-6);
    }

    #[test]
    fn test_aggro_filtered_not_snapped() {
        let mut state = GameState::new(3);
        state.telemetry.near_misses = 12;
        update_aggro(&mut state, 1.0);
        assert!(state.director_aggro > 1.0);
        assert!(state.director_aggro < 1.12);
    }

    #[test]
    fn test_aggro_zero_dt_noop() {
        let mut state = GameState::new(3);
        state.telemetry.near_misses = 12;
        update_aggro(&mut state, 0.0);
        assert_eq!(state.director_aggro, 1.0);
    }

    #[test]
    fn test_curve_segments() {
        let curve = &stadium(0).speed_curve;
        assert!((curve_speed(curve, 0, 1.6) - 1.6).abs() < 1e-6);
        // Early segment: 1.6 + 400 * 0.0006
        assert!((curve_speed(curve, 400, 1.6) - 1.84).abs() < 1e-4);
        // Mid segment continues from the early value
        let at_mid = curve_speed(curve, 450, 1.6);
        let past_mid = curve_speed(curve, 700, 1.6);
        assert!((past_mid - (at_mid + 250.0 * 0.0008)).abs() < 1e-4);
        // Never above the late cap
        assert!(curve_speed(curve, 1_000_000, 1.6) <= curve.late_cap + 1e-6);
    }

    #[test]
    fn test_curve_monotonic() {
        for s in &crate::sim::stadium::STADIUMS {
            let mut prev = 0.0;
            for score in (0..2000).step_by(10) {
                let v = curve_speed(&s.speed_curve, score, 1.6);
                assert!(v >= prev);
                prev = v;
            }
        }
    }

    #[test]
    fn test_spawn_interval_clamped() {
        let profile = &stadium(2).spawn;
        let t = SpawnTuning::default();
        let frantic = SpawnPressure {
            baseline: 0.0,
            speed: 50.0,
            stage_index: 2,
            avg_combo: 30.0,
            near_misses: 100,
            ..calm()
        };
        assert_eq!(spawn_interval(&frantic, profile, &t), profile.floor);

        let battered = SpawnPressure {
            baseline: 500.0,
            recent_hits: 10.0,
            ..calm()
        };
        assert_eq!(spawn_interval(&battered, profile, &t), profile.ceiling);
    }

    #[test]
    fn test_hits_lengthen_interval() {
        let profile = &stadium(0).spawn;
        let t = SpawnTuning::default();
        let base = spawn_interval(&calm(), profile, &t);
        let hurt = spawn_interval(
            &SpawnPressure {
                recent_hits: 1.0,
                ..calm()
            },
            profile,
            &t,
        );
        assert!(hurt > base);
    }

    #[test]
    fn test_roll_spawn_interval_within_band() {
        let mut state = GameState::new(11);
        for i in 0..3 {
            state.stage.phase = i;
            let s = stadium(i);
            for _ in 0..50 {
                let v = roll_spawn_interval(&mut state, s);
                assert!(v >= s.spawn.floor && v <= s.spawn.ceiling);
            }
        }
    }
}
