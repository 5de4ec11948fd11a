//! Career progression: run summaries, lifetime stats, challenges and unlocks
//!
//! Updated once per finished run. Persisted to LocalStorage on wasm32.

use serde::{Deserialize, Serialize};

use crate::sim::GameState;
use crate::storage;

const STORAGE_KEY: &str = "cholo_run_profile";

/// What one finished run achieved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub score: u64,
    pub max_combo: u32,
    /// Furthest stadium reached (0-based)
    pub max_stage: usize,
    pub hits_taken: u32,
    pub dodges: u32,
    pub near_misses: u32,
    pub best_no_damage_dodges: u32,
    pub victory: bool,
}

impl RunSummary {
    pub fn from_state(state: &GameState) -> Self {
        let t = &state.telemetry;
        Self {
            score: state.score,
            max_combo: state.max_combo,
            max_stage: state.stage.max_phase,
            hits_taken: t.hits_taken,
            dodges: t.dodges,
            near_misses: t.near_misses,
            best_no_damage_dodges: t.best_no_damage_dodges,
            victory: state.outcome.is_some_and(|o| o.is_victory()),
        }
    }

    /// Reached the third stadium without taking a hit
    pub fn is_perfect_stage3(&self) -> bool {
        self.max_stage >= 2 && self.hits_taken == 0
    }
}

/// Lifetime stats
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    pub games_played: u32,
    pub high_score: u64,
    pub best_combo: u32,
    pub best_stage: usize,
    pub total_dodges: u32,
    pub total_near_misses: u32,
    pub best_no_damage_dodges: u32,
    pub perfect_stage3_runs: u32,
    pub victories: u32,
}

/// Profile counter a challenge is measured against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    GamesPlayed,
    HighScore,
    BestCombo,
    BestStage,
    PerfectStage3Runs,
    BestNoDamageDodges,
    TotalDodges,
    TotalNearMisses,
}

impl Metric {
    pub fn read(&self, profile: &Profile) -> u64 {
        match self {
            Metric::GamesPlayed => profile.games_played as u64,
            Metric::HighScore => profile.high_score,
            Metric::BestCombo => profile.best_combo as u64,
            Metric::BestStage => profile.best_stage as u64,
            Metric::PerfectStage3Runs => profile.perfect_stage3_runs as u64,
            Metric::BestNoDamageDodges => profile.best_no_damage_dodges as u64,
            Metric::TotalDodges => profile.total_dodges as u64,
            Metric::TotalNearMisses => profile.total_near_misses as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct Challenge {
    pub id: &'static str,
    pub label: &'static str,
    pub metric: Metric,
    pub target: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnlockKind {
    Palette,
    Trail,
    Coach,
}

/// Cosmetic reward for completing a challenge
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Unlock {
    pub id: &'static str,
    pub kind: UnlockKind,
    pub name: &'static str,
    pub challenge: &'static str,
}

pub static CHALLENGES: [Challenge; 8] = [
    Challenge { id: "firstKickoff", label: "Juega 1 partida", metric: Metric::GamesPlayed, target: 1 },
    Challenge { id: "score400", label: "Alcanza 400 puntos", metric: Metric::HighScore, target: 400 },
    Challenge { id: "combo8", label: "Logra combo x8", metric: Metric::BestCombo, target: 8 },
    Challenge { id: "phase2", label: "Llega a la fase 2", metric: Metric::BestStage, target: 1 },
    Challenge {
        id: "phase3Perfect",
        label: "Llega a fase 3 con 3 vidas",
        metric: Metric::PerfectStage3Runs,
        target: 1,
    },
    Challenge {
        id: "noDamage20",
        label: "Esquiva 20 obstáculos sin daño",
        metric: Metric::BestNoDamageDodges,
        target: 20,
    },
    Challenge {
        id: "dodges150",
        label: "Esquiva 150 obstáculos en total",
        metric: Metric::TotalDodges,
        target: 150,
    },
    Challenge { id: "nearMiss12", label: "Consigue 12 near misses", metric: Metric::TotalNearMisses, target: 12 },
];

pub static UNLOCKS: [Unlock; 6] = [
    Unlock { id: "paletteSunset", kind: UnlockKind::Palette, name: "Paleta Sunset", challenge: "score400" },
    Unlock { id: "paletteNeon", kind: UnlockKind::Palette, name: "Paleta Neon", challenge: "phase2" },
    Unlock { id: "trailGold", kind: UnlockKind::Trail, name: "Trail Dorado", challenge: "combo8" },
    Unlock { id: "trailPulse", kind: UnlockKind::Trail, name: "Trail Pulsante", challenge: "dodges150" },
    Unlock { id: "coachTracksuit", kind: UnlockKind::Coach, name: "Coach Chándal", challenge: "phase3Perfect" },
    Unlock { id: "coachLegend", kind: UnlockKind::Coach, name: "Coach Leyenda", challenge: "noDamage20" },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChallengeStatus {
    pub id: &'static str,
    pub completed: bool,
    /// Progress, capped at the target
    pub current: u64,
    pub target: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnlockStatus {
    pub id: &'static str,
    pub unlocked: bool,
}

/// Challenge and unlock state derived from a profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Progress {
    pub challenges: Vec<ChallengeStatus>,
    pub unlocks: Vec<UnlockStatus>,
}

impl Progress {
    pub fn is_completed(&self, challenge_id: &str) -> bool {
        self.challenges
            .iter()
            .any(|c| c.id == challenge_id && c.completed)
    }

    pub fn is_unlocked(&self, unlock_id: &str) -> bool {
        self.unlocks.iter().any(|u| u.id == unlock_id && u.unlocked)
    }
}

pub fn evaluate(profile: &Profile) -> Progress {
    let challenges: Vec<ChallengeStatus> = CHALLENGES
        .iter()
        .map(|c| {
            let current = c.metric.read(profile);
            ChallengeStatus {
                id: c.id,
                completed: current >= c.target,
                current: current.min(c.target),
                target: c.target,
            }
        })
        .collect();

    let unlocks = UNLOCKS
        .iter()
        .map(|u| UnlockStatus {
            id: u.id,
            unlocked: challenges.iter().any(|c| c.id == u.challenge && c.completed),
        })
        .collect();

    Progress {
        challenges,
        unlocks,
    }
}

/// First challenge in table order that is still open
pub fn next_challenge(progress: &Progress) -> Option<&'static Challenge> {
    CHALLENGES.iter().find(|c| !progress.is_completed(c.id))
}

impl Profile {
    /// Fold a finished run into the lifetime stats.
    /// Returns the unlocks this run earned.
    pub fn record_run(&mut self, run: &RunSummary) -> Vec<&'static str> {
        let before = evaluate(self);

        self.games_played += 1;
        self.high_score = self.high_score.max(run.score);
        self.best_combo = self.best_combo.max(run.max_combo);
        self.best_stage = self.best_stage.max(run.max_stage);
        self.total_dodges += run.dodges;
        self.total_near_misses += run.near_misses;
        self.best_no_damage_dodges = self.best_no_damage_dodges.max(run.best_no_damage_dodges);
        if run.is_perfect_stage3() {
            self.perfect_stage3_runs += 1;
        }
        if run.victory {
            self.victories += 1;
        }

        let after = evaluate(self);
        let earned: Vec<&'static str> = after
            .unlocks
            .iter()
            .filter(|u| u.unlocked && !before.is_unlocked(u.id))
            .map(|u| u.id)
            .collect();
        for id in &earned {
            log::info!("Unlocked {}", id);
        }
        earned
    }

    pub fn load() -> Self {
        match storage::load::<Profile>(STORAGE_KEY) {
            Some(profile) => {
                log::info!("Loaded profile ({} games)", profile.games_played);
                profile
            }
            None => Self::default(),
        }
    }

    pub fn save(&self) {
        if storage::save(STORAGE_KEY, self) {
            log::info!("Profile saved");
        }
    }
}
