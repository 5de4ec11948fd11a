//! Browser binding
//!
//! A thin wasm-bindgen wrapper: the JS side owns the canvas and the
//! `requestAnimationFrame` loop, calls `action` on input and `update` once per
//! frame, then reads the getters or `snapshot_json` to draw.

use std::sync::Once;

use wasm_bindgen::prelude::*;

use crate::highscores::HighScores;
use crate::progression::{Profile, RunSummary};
use crate::settings::Settings;
use crate::sim::{Action, GameState, Stadium, TickOutcome, stadium, update};
use crate::tuning::Tuning;

static INIT: Once = Once::new();

fn init_logging() {
    INIT.call_once(|| {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialised".into());
        }
    });
}

/// Outcome codes returned by [`WebGame::update`]
pub const OUTCOME_CONTINUING: u8 = 0;
pub const OUTCOME_GAME_OVER: u8 = 1;
pub const OUTCOME_VICTORY: u8 = 2;
pub const OUTCOME_HALTED: u8 = 3;

#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
    /// Stadium the last update asked to be painted
    stadium: &'static Stadium,
    /// Rank achieved on the leaderboard by the finished run
    last_rank: Option<usize>,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> WebGame {
        Self::with_tuning(seed, Tuning::default())
    }

    /// Start a run with a JSON balance sheet; falls back to defaults if it is invalid
    pub fn with_tuning_json(seed: u64, json: &str) -> WebGame {
        init_logging();
        let tuning = Tuning::from_json(json).unwrap_or_else(|e| {
            log::warn!("Rejected tuning, using defaults: {}", e);
            Tuning::default()
        });
        Self::with_tuning(seed, tuning)
    }

    /// Feed one input action by name (`left`, `right`, `duck`, `jump`, `start`)
    pub fn action(&mut self, name: &str) -> bool {
        let action = match name {
            "left" => Action::Left,
            "right" => Action::Right,
            "duck" => Action::Duck,
            "jump" => Action::Jump,
            "start" => Action::Start,
            _ => return false,
        };
        self.state.apply_action(action)
    }

    /// Advance to `now_ms` (the rAF timestamp). Returns an `OUTCOME_*` code.
    pub fn update(&mut self, now_ms: f64) -> u8 {
        let result = update(&mut self.state, now_ms);
        self.stadium = result.stadium;
        match result.outcome {
            TickOutcome::Continuing => OUTCOME_CONTINUING,
            TickOutcome::Halted => OUTCOME_HALTED,
            TickOutcome::GameOver { .. } => {
                self.record_run();
                OUTCOME_GAME_OVER
            }
            TickOutcome::Victory { .. } => {
                self.record_run();
                OUTCOME_VICTORY
            }
        }
    }

    pub fn score(&self) -> f64 {
        self.state.score as f64
    }

    pub fn lives(&self) -> u8 {
        self.state.lives
    }

    pub fn combo(&self) -> u32 {
        self.state.combo
    }

    pub fn stage(&self) -> usize {
        self.state.stage.phase
    }

    pub fn stage_name(&self) -> String {
        self.stadium.name.to_string()
    }

    pub fn transition_progress(&self) -> f32 {
        self.state.stage.transition_progress()
    }

    pub fn obstacle_count(&self) -> usize {
        self.state.obstacles.iter().filter(|o| o.active).count()
    }

    pub fn last_rank(&self) -> Option<usize> {
        self.last_rank
    }

    /// Full state as JSON for the renderer
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Current stadium descriptor: palette, obstacle catalog (indexed by
    /// `Obstacle.def`), booster and sub-phase labels
    pub fn stadium_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.stadium).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Particles and score floats, which the snapshot skips
    pub fn effects_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&(&self.state.particles, &self.state.floats, &self.state.events))
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl WebGame {
    fn with_tuning(seed: u64, mut tuning: Tuning) -> WebGame {
        init_logging();
        Settings::load().apply_to(&mut tuning);
        log::info!("Cholo Run starting (seed {})", seed);
        let state = GameState::with_tuning(seed, tuning);
        WebGame {
            stadium: stadium(state.stage.phase),
            state,
            last_rank: None,
        }
    }

    fn record_run(&mut self) {
        let summary = RunSummary::from_state(&self.state);

        let mut profile = Profile::load();
        profile.record_run(&summary);
        profile.save();

        let mut scores = HighScores::load();
        self.last_rank = scores.add_score(&summary, js_sys::Date::now());
        scores.save();

        log::info!(
            "Run recorded: {} points, stadium {}, rank {:?}",
            summary.score,
            summary.max_stage + 1,
            self.last_rank
        );
    }
}
