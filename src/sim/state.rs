//! Game state and core simulation types
//!
//! One `GameState` per run, owned by the caller and mutated only by
//! [`super::tick`] and [`GameState::apply_action`].

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::projection::ScreenPos;
use super::stadium::{BoosterEffect, stadium};
use super::stage::{Outcome, StageProgress};
use crate::consts::LANE_COUNT;
use crate::tuning::Tuning;

/// Discrete input actions produced by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Left,
    Right,
    Duck,
    Jump,
    /// Only meaningful to the host (menu / restart)
    Start,
}

/// Player performance counters for the whole run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Telemetry {
    pub hits_taken: u32,
    pub near_misses: u32,
    pub dodges: u32,
    /// Dodges before the first hit of the run; zeroed by that hit
    pub no_damage_dodges: u32,
    pub best_no_damage_dodges: u32,
    /// Time-weighted combo accumulator (combo * frames)
    pub combo_accum: f64,
    /// Frames sampled into `combo_accum`
    pub combo_samples: f64,
    /// Hits counter that decays over time; feeds the spawn safety bonus
    pub recent_hits: f32,
}

impl Telemetry {
    /// Rolling average combo over the run
    pub fn avg_combo(&self) -> f32 {
        if self.combo_samples > 0.0 {
            (self.combo_accum / self.combo_samples) as f32
        } else {
            0.0
        }
    }

    /// Sample the current combo for `dt` frames
    pub fn sample_combo(&mut self, combo: u32, dt: f32) {
        self.combo_accum += combo as f64 * dt as f64;
        self.combo_samples += dt as f64;
    }
}

/// Lane-sweeping motion for patrol obstacles
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Patrol {
    /// +1 toward higher lanes, -1 toward lower
    pub direction: f32,
    /// Lanes per frame
    pub lane_speed: f32,
}

/// An obstacle on the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    /// Continuous lane position (patrols move between lanes)
    pub lane: f32,
    /// Index into the current stadium's obstacle catalog
    pub def: usize,
    /// 1 = spawn horizon, 0 = at the player, negative = passed
    pub depth: f32,
    /// Cleared exactly once: by a hit, a shield block, or a scored dodge
    pub active: bool,
    /// Mole reveal progress; negative while underground
    pub mole_phase: Option<f32>,
    pub patrol: Option<Patrol>,
    /// Set once a near miss has been counted for this obstacle
    #[serde(default)]
    pub near_miss: bool,
    #[serde(skip)]
    pub screen: ScreenPos,
}

impl Obstacle {
    /// Moles are harmless until they surface
    pub fn is_revealed(&self) -> bool {
        self.mole_phase.is_none_or(|p| p >= 0.0)
    }
}

/// A collectible booster on the field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booster {
    pub id: u32,
    pub lane: f32,
    pub depth: f32,
    pub active: bool,
    pub effect: BoosterEffect,
    pub duration_ms: f32,
    #[serde(skip)]
    pub screen: ScreenPos,
}

/// The effect currently applied to the runner
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActiveBooster {
    pub effect: BoosterEffect,
    pub remaining_ms: f32,
    pub duration_ms: f32,
}

/// Particle flavours (renderer picks the colour)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticleKind {
    Hit,
    Shield,
    Pickup,
}

/// A particle for visual effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32, // 0-1, decreases over time
    pub kind: ParticleKind,
}

/// Floating score / pickup text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FloatText {
    pub pos: Vec2,
    pub text: String,
    pub life: f32,
    pub highlight: bool,
}

/// Things that happened during the last tick (for audio/HUD hooks)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Hit { lives_left: u8 },
    ShieldBlocked,
    Dodged { points: u64, combo: u32 },
    NearMiss,
    BoosterCollected(BoosterEffect),
    BoosterExpired(BoosterEffect),
    SubPhaseUnlocked { stage: usize, sub_phase: usize },
    TransitionStarted { from: usize, to: usize },
    StageEntered(usize),
    GameOver { score: u64 },
    Victory { score: u64 },
}

/// Complete game state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub rng: Pcg32,
    pub tuning: Tuning,
    /// Host timestamp of the previous update
    pub last_now_ms: Option<f64>,
    /// Elapsed reference frames this run
    pub frame: f32,

    // Runner
    pub lane: usize,
    pub target_lane: usize,
    pub lane_smooth: f32,
    pub is_ducking: bool,
    pub duck_ms: f32,
    pub is_jumping: bool,
    pub jump_ms: f32,
    /// Current jump arc height in [0, 1]
    pub jump_height: f32,
    pub is_invincible: bool,
    pub invincible_ms: f32,

    // Scoring
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    pub lives: u8,

    /// Recomputed every tick
    pub speed: f32,
    /// Background animation phase only
    pub scroll_x: f32,

    pub obstacles: Vec<Obstacle>,
    pub boosters: Vec<Booster>,
    pub active_booster: Option<ActiveBooster>,

    // Spawn cadence (frames)
    pub spawn_timer: f32,
    pub spawn_interval: f32,
    pub spawn_baseline: f32,
    pub booster_cooldown: f32,

    pub stage: StageProgress,

    // Difficulty director
    pub director_aggro: f32,
    pub recovery_ms: f32,
    pub telemetry: Telemetry,

    // Presentation side effects
    pub shake_ms: f32,
    pub shake: Vec2,
    #[serde(skip)]
    pub particles: Vec<Particle>,
    #[serde(skip)]
    pub floats: Vec<FloatText>,
    /// Events from the most recent tick
    #[serde(skip)]
    pub events: Vec<GameEvent>,

    /// Terminal outcome, once reached
    pub outcome: Option<Outcome>,
    /// Next entity ID
    next_id: u32,
}

impl GameState {
    /// Create a new run with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Create a new run with the given balance sheet
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let center = LANE_COUNT / 2;
        let mut rng = Pcg32::seed_from_u64(seed);

        let spawn = &stadium(0).spawn;
        let spawn_baseline = rng.random_range(spawn.baseline_min..=spawn.baseline_max);

        Self {
            seed,
            rng,
            last_now_ms: None,
            frame: 0.0,
            lane: center,
            target_lane: center,
            lane_smooth: center as f32,
            is_ducking: false,
            duck_ms: 0.0,
            is_jumping: false,
            jump_ms: 0.0,
            jump_height: 0.0,
            is_invincible: false,
            invincible_ms: 0.0,
            score: 0,
            combo: 0,
            max_combo: 0,
            lives: tuning.max_lives,
            speed: tuning.initial_speed,
            scroll_x: 0.0,
            obstacles: Vec::new(),
            boosters: Vec::new(),
            active_booster: None,
            spawn_timer: 0.0,
            spawn_interval: spawn_baseline.clamp(spawn.floor, spawn.ceiling),
            spawn_baseline,
            booster_cooldown: 0.0,
            stage: StageProgress::default(),
            director_aggro: 1.0,
            recovery_ms: 0.0,
            telemetry: Telemetry::default(),
            shake_ms: 0.0,
            shake: Vec2::ZERO,
            particles: Vec::new(),
            floats: Vec::new(),
            events: Vec::new(),
            outcome: None,
            next_id: 1,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Run has ended (game over or victory)
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_some()
    }

    /// Whether the shield booster is currently held
    pub fn has_shield(&self) -> bool {
        matches!(
            self.active_booster,
            Some(ActiveBooster { effect: BoosterEffect::Shield, .. })
        )
    }

    /// Speed multiplier from the active booster
    pub fn booster_speed_multiplier(&self) -> f32 {
        self.active_booster
            .map(|b| b.effect.speed_multiplier())
            .unwrap_or(1.0)
    }

    /// Apply a host input action. Returns whether it was accepted.
    ///
    /// Input is dropped while the run is over or a stage transition plays.
    pub fn apply_action(&mut self, action: Action) -> bool {
        if self.is_terminal() || self.stage.is_transitioning() {
            return false;
        }

        match action {
            Action::Left if self.target_lane > 0 => {
                self.target_lane -= 1;
                true
            }
            Action::Right if self.target_lane + 1 < LANE_COUNT => {
                self.target_lane += 1;
                true
            }
            Action::Duck if !self.is_jumping => {
                self.is_ducking = true;
                self.duck_ms = self.tuning.duck_ms;
                true
            }
            Action::Jump if !self.is_jumping => {
                self.is_jumping = true;
                self.jump_ms = self.tuning.jump_ms;
                self.jump_height = 0.0;
                // Jumping cancels a duck
                self.is_ducking = false;
                self.duck_ms = 0.0;
                true
            }
            _ => false,
        }
    }

    /// Push a particle, dropping the oldest when over the cap
    pub fn push_particle(&mut self, particle: Particle) {
        if self.tuning.max_particles == 0 {
            return;
        }
        if self.particles.len() >= self.tuning.max_particles {
            self.particles.remove(0);
        }
        self.particles.push(particle);
    }

    /// Burst of `count` particles at a screen position
    pub fn burst(&mut self, at: Vec2, count: usize, kind: ParticleKind) {
        for _ in 0..count {
            let vel = Vec2::new(
                (self.rng.random::<f32>() - 0.5) * 8.0,
                -self.rng.random::<f32>() * 6.0,
            );
            self.push_particle(Particle {
                pos: at,
                vel,
                life: 1.0,
                kind,
            });
        }
    }

    pub fn push_float(&mut self, pos: Vec2, text: String, highlight: bool) {
        self.floats.push(FloatText {
            pos,
            text,
            life: 1.0,
            highlight,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state() {
        let state = GameState::new(7);
        assert_eq!(state.lives, 3);
        assert_eq!(state.score, 0);
        assert_eq!(state.target_lane, 1);
        assert!((state.lane_smooth - 1.0).abs() < 1e-6);
        assert!(state.obstacles.is_empty());
        assert!(!state.is_terminal());
        let spawn = &stadium(0).spawn;
        assert!(state.spawn_interval >= spawn.floor && state.spawn_interval <= spawn.ceiling);
    }

    #[test]
    fn test_lane_actions_clamped() {
        let mut state = GameState::new(1);
        assert!(state.apply_action(Action::Left));
        assert!(!state.apply_action(Action::Left));
        assert_eq!(state.target_lane, 0);
        assert!(state.apply_action(Action::Right));
        assert!(state.apply_action(Action::Right));
        assert!(!state.apply_action(Action::Right));
        assert_eq!(state.target_lane, LANE_COUNT - 1);
    }

    #[test]
    fn test_jump_cancels_duck_and_blocks_duck() {
        let mut state = GameState::new(1);
        assert!(state.apply_action(Action::Duck));
        assert!(state.is_ducking);
        assert!(state.apply_action(Action::Jump));
        assert!(state.is_jumping);
        assert!(!state.is_ducking);
        assert!(!state.apply_action(Action::Duck));
        assert!(!state.apply_action(Action::Jump));
    }

    #[test]
    fn test_start_ignored_by_core() {
        let mut state = GameState::new(1);
        assert!(!state.apply_action(Action::Start));
    }

    #[test]
    fn test_particle_cap() {
        let mut state = GameState::new(1);
        state.tuning.max_particles = 4;
        state.burst(Vec2::ZERO, 10, ParticleKind::Hit);
        assert_eq!(state.particles.len(), 4);
    }

    #[test]
    fn test_avg_combo_time_weighted() {
        let mut t = Telemetry::default();
        assert_eq!(t.avg_combo(), 0.0);
        t.sample_combo(4, 1.0);
        t.sample_combo(0, 3.0);
        assert!((t.avg_combo() - 1.0).abs() < 1e-6);
    }
}
