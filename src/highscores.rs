//! Top-10 leaderboard of finished runs
//!
//! Ordered by score, best first. A run that ties an existing score ranks
//! below it.

use serde::{Deserialize, Serialize};

use crate::progression::RunSummary;
use crate::storage;

pub const MAX_HIGH_SCORES: usize = 10;

const STORAGE_KEY: &str = "cholo_run_highscores";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u64,
    /// Furthest stadium reached (0-based)
    pub stage: usize,
    pub max_combo: u32,
    pub victory: bool,
    /// Host clock in ms (`Date.now()` on the web)
    pub timestamp: f64,
}

impl HighScoreEntry {
    fn from_run(run: &RunSummary, timestamp: f64) -> Self {
        Self {
            score: run.score,
            stage: run.max_stage,
            max_combo: run.max_combo,
            victory: run.victory,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot a score would take, whether or not it makes the board
    fn slot(&self, score: u64) -> usize {
        self.entries.partition_point(|e| e.score >= score)
    }

    /// Scoreless runs never make the board
    pub fn qualifies(&self, score: u64) -> bool {
        score > 0 && self.slot(score) < MAX_HIGH_SCORES
    }

    /// 1-based rank the score would get, if it qualifies
    pub fn potential_rank(&self, score: u64) -> Option<usize> {
        self.qualifies(score).then(|| self.slot(score) + 1)
    }

    /// Record a finished run. Returns its 1-based rank if it made the board.
    pub fn add_score(&mut self, run: &RunSummary, timestamp: f64) -> Option<usize> {
        let rank = self.potential_rank(run.score)?;
        self.entries.insert(rank - 1, HighScoreEntry::from_run(run, timestamp));
        self.entries.truncate(MAX_HIGH_SCORES);
        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn best(&self) -> Option<&HighScoreEntry> {
        self.entries.first()
    }

    /// Runs on the board that cleared the final stadium
    pub fn victories(&self) -> usize {
        self.entries.iter().filter(|e| e.victory).count()
    }

    pub fn load() -> Self {
        match storage::load::<HighScores>(STORAGE_KEY) {
            Some(mut scores) => {
                scores.entries.truncate(MAX_HIGH_SCORES);
                log::info!("Loaded {} high scores", scores.entries.len());
                scores
            }
            None => Self::new(),
        }
    }

    pub fn save(&self) {
        if storage::save(STORAGE_KEY, self) {
            log::info!("High scores saved ({} entries)", self.entries.len());
        }
    }
}
