//! Stage progression
//!
//! Playing -> Transitioning -> Playing (next stadium) ... -> Victory, with
//! GameOver reachable from any playing state. A transition is a short
//! animated window: input is dropped, spawning stops, and the field is
//! cleared when it completes.

use serde::{Deserialize, Serialize};

use super::spawn::reset_for_stage;
use super::stadium::{stadium, stadium_count};
use super::state::{GameEvent, GameState};

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    GameOver { score: u64 },
    Victory { score: u64 },
}

impl Outcome {
    pub fn score(&self) -> u64 {
        match *self {
            Outcome::GameOver { score } | Outcome::Victory { score } => score,
        }
    }

    pub fn is_victory(&self) -> bool {
        matches!(self, Outcome::Victory { .. })
    }
}

/// An in-flight stage transition
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StageTransition {
    pub from: usize,
    pub to: usize,
    /// 0..1
    pub progress: f32,
}

/// Where the run is in the stadium sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageProgress {
    /// Current stadium index
    pub phase: usize,
    /// Furthest stadium reached this run
    pub max_phase: usize,
    pub transition: Option<StageTransition>,
    /// Score earned since entering the current stadium
    pub local_score: u64,
    /// Highest unlocked sub-phase of the current stadium
    pub sub_phase: usize,
}

impl StageProgress {
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Transition progress, or 0 when none is running
    pub fn transition_progress(&self) -> f32 {
        self.transition.map(|t| t.progress).unwrap_or(0.0)
    }

    /// Start moving to stadium `to`. Ignored if one is already running.
    pub fn begin_transition(&mut self, to: usize) -> bool {
        if self.transition.is_some() {
            return false;
        }
        self.transition = Some(StageTransition {
            from: self.phase,
            to,
            progress: 0.0,
        });
        true
    }
}

/// Coarse state for the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum StageStatus {
    Playing { stage: usize },
    Transitioning { from: usize, to: usize, progress: f32 },
    Victory,
    GameOver,
}

pub fn status(state: &GameState) -> StageStatus {
    match (state.outcome, state.stage.transition) {
        (Some(Outcome::Victory { .. }), _) => StageStatus::Victory,
        (Some(Outcome::GameOver { .. }), _) => StageStatus::GameOver,
        (None, Some(t)) => StageStatus::Transitioning {
            from: t.from,
            to: t.to,
            progress: t.progress,
        },
        (None, None) => StageStatus::Playing {
            stage: state.stage.phase,
        },
    }
}

/// Cumulative score that opens the exit of stadium `phase`
pub fn stage_exit_score(phase: usize, phase_score: u64) -> u64 {
    (phase as u64 + 1).saturating_mul(phase_score)
}

/// Advance a running transition; commits the new stadium when complete
pub fn advance_transition(state: &mut GameState, dt: f32) {
    let rate = state.tuning.transition_rate;
    let Some(transition) = state.stage.transition.as_mut() else {
        return;
    };

    transition.progress = (transition.progress + rate * dt).min(1.0);
    if transition.progress < 1.0 {
        return;
    }

    let to = transition.to;
    state.stage.transition = None;
    state.stage.phase = to;
    state.stage.max_phase = state.stage.max_phase.max(to);
    state.stage.local_score = 0;
    state.stage.sub_phase = 0;

    let next = stadium(to);
    reset_for_stage(state, next);
    state.events.push(GameEvent::StageEntered(to));
    log::info!("Entered stadium {}: {}", to, next.name);
}

/// Check the score gates: start a transition or declare victory
pub fn check_progression(state: &mut GameState) {
    if state.is_terminal() || state.stage.is_transitioning() {
        return;
    }

    let phase = state.stage.phase;
    let last = stadium_count() - 1;
    let phase_score = state.tuning.phase_score;

    if phase < last {
        if state.score >= stage_exit_score(phase, phase_score) && state.stage.begin_transition(phase + 1) {
            state.events.push(GameEvent::TransitionStarted {
                from: phase,
                to: phase + 1,
            });
            log::info!(
                "Stadium {} cleared at score {}, moving to {}",
                phase,
                state.score,
                stadium(phase + 1).name
            );
        }
    } else if state.score >= stage_exit_score(last, phase_score) {
        let score = state.score;
        state.outcome = Some(Outcome::Victory { score });
        state.events.push(GameEvent::Victory { score });
        log::info!("Victory with score {}", score);
    }
}

/// Unlock sub-phases as phase-local score grows
pub fn update_sub_phase(state: &mut GameState) {
    let stage = state.stage.phase;
    let unlocked = stadium(stage).sub_phase_for(state.stage.local_score);
    if unlocked <= state.stage.sub_phase {
        return;
    }

    state.stage.sub_phase = unlocked;
    state.events.push(GameEvent::SubPhaseUnlocked {
        stage,
        sub_phase: unlocked,
    });
    log::debug!(
        "Stadium {} sub-phase {}: {}",
        stage,
        unlocked,
        stadium(stage).sub_phases[unlocked].label
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spawn::spawn_obstacle;

    #[test]
    fn test_transition_at_exact_threshold() {
        let mut state = GameState::new(1);
        state.score = 799;
        check_progression(&mut state);
        assert!(!state.stage.is_transitioning());

        state.score = 800;
        check_progression(&mut state);
        assert!(state.stage.is_transitioning());
        assert_eq!(
            status(&state),
            StageStatus::Transitioning {
                from: 0,
                to: 1,
                progress: 0.0
            }
        );
        assert!(state.events.contains(&GameEvent::TransitionStarted { from: 0, to: 1 }));
    }

    #[test]
    fn test_transition_commits_clean_slate() {
        let mut state = GameState::new(1);
        spawn_obstacle(&mut state, stadium(0), 0, 1);
        state.score = 820;
        state.stage.local_score = 820;
        state.stage.sub_phase = 3;
        state.spawn_timer = 30.0;
        check_progression(&mut state);

        // 0.01 per frame: 100 frames to complete
        for _ in 0..99 {
            advance_transition(&mut state, 1.0);
        }
        assert!(state.stage.is_transitioning());
        assert_eq!(state.stage.phase, 0);

        advance_transition(&mut state, 2.0);
        assert!(!state.stage.is_transitioning());
        assert_eq!(state.stage.phase, 1);
        assert_eq!(state.stage.max_phase, 1);
        assert_eq!(state.stage.local_score, 0);
        assert_eq!(state.stage.sub_phase, 0);
        assert!(state.obstacles.is_empty());
        assert_eq!(state.spawn_timer, 0.0);
        // Cumulative score is untouched
        assert_eq!(state.score, 820);
        assert!(state.events.contains(&GameEvent::StageEntered(1)));
    }

    #[test]
    fn test_no_double_transition() {
        let mut state = GameState::new(1);
        state.score = 5000;
        check_progression(&mut state);
        check_progression(&mut state);
        let started = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::TransitionStarted { .. }))
            .count();
        assert_eq!(started, 1);
    }

    #[test]
    fn test_victory_only_on_final_stage() {
        let mut state = GameState::new(1);
        state.score = 2400;
        check_progression(&mut state);
        assert!(!state.is_terminal());

        state.stage.transition = None;
        state.stage.phase = 2;
        state.score = 2399;
        check_progression(&mut state);
        assert!(!state.is_terminal());

        state.score = 2400;
        check_progression(&mut state);
        assert_eq!(state.outcome, Some(Outcome::Victory { score: 2400 }));
        assert_eq!(status(&state), StageStatus::Victory);
    }

    #[test]
    fn test_terminal_blocks_progression() {
        let mut state = GameState::new(1);
        state.outcome = Some(Outcome::GameOver { score: 900 });
        state.score = 900;
        check_progression(&mut state);
        assert!(!state.stage.is_transitioning());
    }

    #[test]
    fn test_sub_phase_unlocks_once() {
        let mut state = GameState::new(1);
        state.stage.local_score = 300;
        update_sub_phase(&mut state);
        assert_eq!(state.stage.sub_phase, 1);
        update_sub_phase(&mut state);
        let unlocks = state
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::SubPhaseUnlocked { .. }))
            .count();
        assert_eq!(unlocks, 1);
    }

    #[test]
    fn test_outcome_accessors() {
        let o = Outcome::Victory { score: 10 };
        assert!(o.is_victory());
        assert_eq!(o.score(), 10);
        assert!(!Outcome::GameOver { score: 1 }.is_victory());
    }
}
