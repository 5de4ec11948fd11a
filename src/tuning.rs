//! Data-driven game balance
//!
//! Every number the simulation needs lives here so balance passes can be done
//! from a JSON file instead of a rebuild. Missing fields fall back to defaults.
//!
//! Rates marked "per frame" are against the 60 Hz reference frame
//! (see [`crate::consts::FRAME_MS`]).

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("tuning json is malformed: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Difficulty director constants (rubber-band controller)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorTuning {
    /// Average combo above which the director starts pushing
    pub combo_pivot: f32,
    /// Aggro gained per point of average combo above the pivot
    pub combo_pressure: f32,
    /// Aggro gained per near miss
    pub near_miss_pressure: f32,
    /// Cap on total near-miss pressure
    pub near_miss_cap: f32,
    /// Aggro removed while the post-hit recovery window runs
    pub recovery_relief: f32,
    /// Low-pass filter rate toward the target (per frame)
    pub filter_rate: f32,
    pub aggro_min: f32,
    pub aggro_max: f32,
}

impl Default for DirectorTuning {
    fn default() -> Self {
        Self {
            combo_pivot: 2.0,
            combo_pressure: 0.04,
            near_miss_pressure: 0.01,
            near_miss_cap: 0.12,
            recovery_relief: 0.18,
            filter_rate: 0.02,
            aggro_min: 0.72,
            aggro_max: 1.28,
        }
    }
}

/// Spawn cadence constants. Intervals are in frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Interval frames removed per unit of speed
    pub speed_bias_per_speed: f32,
    pub speed_bias_cap: f32,
    /// Interval frames removed per stage index (scaled by the stage's phase bias)
    pub stage_bias: f32,
    /// Interval frames removed per point of average combo
    pub combo_bias: f32,
    pub combo_bias_cap: f32,
    /// Interval frames removed per near miss
    pub near_miss_bias: f32,
    pub near_miss_bias_cap: f32,
    /// Interval frames added per recent hit
    pub safety_per_hit: f32,
    pub safety_cap: f32,
    /// Fraction of the recent-hit counter that decays per frame
    pub recent_hit_decay: f32,
    /// Uniform jitter (+/-) in frames
    pub jitter: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            speed_bias_per_speed: 2.2,
            speed_bias_cap: 16.0,
            stage_bias: 3.0,
            combo_bias: 1.2,
            combo_bias_cap: 10.0,
            near_miss_bias: 0.5,
            near_miss_bias_cap: 8.0,
            safety_per_hit: 6.0,
            safety_cap: 24.0,
            recent_hit_decay: 0.0015,
            jitter: 4.0,
        }
    }
}

/// Full balance sheet for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub max_lives: u8,
    pub invincible_ms: f32,
    /// Invincibility granted when the shield absorbs a hit
    pub shield_grace_ms: f32,
    pub duck_ms: f32,
    pub jump_ms: f32,
    /// Jump arc height (0-1) needed to clear a jump obstacle
    pub jump_clear_height: f32,
    pub shake_ms: f32,
    pub shake_amplitude: f32,
    /// Post-hit window during which difficulty relaxes
    pub recovery_ms: f32,
    /// Fraction of the lane gap closed per frame
    pub lane_smoothing: f32,

    /// Hit window is `hit_window_near < depth < hit_window_far`
    pub hit_window_far: f32,
    pub hit_window_near: f32,
    /// Max lane distance that still counts as "same lane"
    pub lane_tolerance: f32,
    /// Depth band around the player where a lane dodge counts as a near miss
    pub near_miss_depth: f32,
    /// Max lane distance for a near miss (adjacent lane only)
    pub near_miss_lane: f32,
    /// Active obstacles below this depth were dodged
    pub pass_depth: f32,
    /// Entities below this depth are dropped
    pub cleanup_depth: f32,

    /// Depth closed per frame per unit of speed
    pub depth_rate: f32,
    pub mole_depth_rate: f32,
    /// Depth a mole waits at while underground
    pub mole_ground_depth: f32,
    pub mole_start_phase: f32,
    /// Reveal progress per frame
    pub mole_reveal_rate: f32,

    pub initial_speed: f32,
    pub combo_cap: u32,
    /// Score needed per stage
    pub phase_score: u64,
    /// Transition progress per frame
    pub transition_rate: f32,

    pub max_particles: usize,
    pub screen_shake: bool,

    pub director: DirectorTuning,
    pub spawn: SpawnTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            max_lives: 3,
            invincible_ms: 1250.0,
            shield_grace_ms: 700.0,
            duck_ms: 390.0,
            jump_ms: 560.0,
            jump_clear_height: 0.35,
            shake_ms: 240.0,
            shake_amplitude: 5.0,
            recovery_ms: 2600.0,
            lane_smoothing: 0.18,

            hit_window_far: 0.13,
            hit_window_near: -0.03,
            lane_tolerance: 0.58,
            near_miss_depth: 0.05,
            near_miss_lane: 1.25,
            pass_depth: -0.03,
            cleanup_depth: -0.14,

            depth_rate: 0.006,
            mole_depth_rate: 0.004,
            mole_ground_depth: 0.35,
            mole_start_phase: -0.55,
            mole_reveal_rate: 0.017,

            initial_speed: 1.6,
            combo_cap: 5,
            phase_score: 800,
            transition_rate: 0.01,

            max_particles: 256,
            screen_shake: true,

            director: DirectorTuning::default(),
            spawn: SpawnTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning file
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Serialize to pretty JSON (for dumping the defaults)
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let d = &self.director;
        if !(d.aggro_min <= 1.0 && 1.0 <= d.aggro_max) {
            return Err(TuningError::Invalid(format!(
                "aggro band [{}, {}] must contain 1.0",
                d.aggro_min, d.aggro_max
            )));
        }
        if self.hit_window_near >= self.hit_window_far {
            return Err(TuningError::Invalid("hit window is empty".into()));
        }
        if self.pass_depth > self.hit_window_far || self.cleanup_depth >= self.pass_depth {
            return Err(TuningError::Invalid(
                "expected cleanup_depth < pass_depth <= hit_window_far".into(),
            ));
        }
        if !(0.0..1.0).contains(&self.lane_tolerance) {
            return Err(TuningError::Invalid("lane_tolerance must be in [0, 1)".into()));
        }
        if self.max_lives == 0 {
            return Err(TuningError::Invalid("max_lives must be at least 1".into()));
        }
        if self.phase_score == 0 {
            return Err(TuningError::Invalid("phase_score must be positive".into()));
        }
        if self.transition_rate <= 0.0 || self.depth_rate <= 0.0 {
            return Err(TuningError::Invalid("rates must be positive".into()));
        }
        if self.combo_cap == 0 {
            return Err(TuningError::Invalid("combo_cap must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "max_lives": 5, "director": { "aggro_max": 1.5 } }"#)
            .expect("valid tuning");
        assert_eq!(tuning.max_lives, 5);
        assert!((tuning.director.aggro_max - 1.5).abs() < 1e-6);
        assert!((tuning.director.aggro_min - 0.72).abs() < 1e-6);
        assert_eq!(tuning.phase_score, 800);
    }

    #[test]
    fn test_rejects_inverted_aggro_band() {
        let err = Tuning::from_json(r#"{ "director": { "aggro_min": 1.2, "aggro_max": 0.9 } }"#)
            .unwrap_err();
        assert!(matches!(err, TuningError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_json_roundtrip_defaults() {
        let json = Tuning::default().to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), Tuning::default());
    }
}
