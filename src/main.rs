//! Cholo Run entry point
//!
//! The browser build is driven from JS through `cholo_run::web::WebGame`.
//! Natively this runs headless autopilot matches, which is handy for
//! balance passes: `cholo-run [seed] [tuning.json] [--runs N]`, or
//! `cholo-run --dump-tuning` to print the default balance sheet.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Cholo Run (native) starting...");

    let mut seed: u64 = 1;
    let mut runs: u64 = 1;
    let mut tuning_path: Option<String> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dump-tuning" => {
                match cholo_run::Tuning::default().to_json() {
                    Ok(json) => println!("{json}"),
                    Err(e) => log::error!("Could not serialize tuning: {}", e),
                }
                return;
            }
            "--runs" => {
                runs = args.next().and_then(|n| n.parse().ok()).unwrap_or(1).max(1);
            }
            other => match other.parse::<u64>() {
                Ok(n) => seed = n,
                Err(_) => tuning_path = Some(other.to_string()),
            },
        }
    }

    let tuning = load_tuning(tuning_path.as_deref());
    let mut profile = cholo_run::Profile::load();
    let mut scores = cholo_run::HighScores::load();

    for i in 0..runs {
        let summary = headless::play(seed.wrapping_add(i), tuning.clone());
        println!(
            "seed {:>6}: {:>5} pts  stadium {}  combo x{:<3} dodges {:<4} hits {}  {}",
            seed.wrapping_add(i),
            summary.score,
            summary.max_stage + 1,
            summary.max_combo,
            summary.dodges,
            summary.hits_taken,
            if summary.victory { "VICTORY" } else { "game over" }
        );
        for unlock in profile.record_run(&summary) {
            println!("  unlocked: {unlock}");
        }
        scores.add_score(&summary, i as f64);
    }

    if let Some(best) = scores.best() {
        println!(
            "best: {} pts  stadium {}  ({} victories on the board)",
            best.score,
            best.stage + 1,
            scores.victories()
        );
    }
    if let Some(challenge) = cholo_run::progression::next_challenge(&cholo_run::progression::evaluate(&profile)) {
        println!("next challenge: {}", challenge.label);
    }
    profile.save();
    scores.save();
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: Option<&str>) -> cholo_run::Tuning {
    let Some(path) = path else {
        return cholo_run::Tuning::default();
    };
    let parsed = std::fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|json| cholo_run::Tuning::from_json(&json).map_err(|e| e.to_string()));
    match parsed {
        Ok(tuning) => {
            log::info!("Loaded tuning from {}", path);
            tuning
        }
        Err(e) => {
            log::warn!("Ignoring tuning file {}: {}", path, e);
            cholo_run::Tuning::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use cholo_run::RunSummary;
    use cholo_run::Tuning;
    use cholo_run::consts::FRAME_MS;
    use cholo_run::sim::{GameEvent, GameState, TickOutcome, choose_action, update};

    /// Safety net for runs the autopilot never finishes (about an hour of play)
    const MAX_FRAMES: u64 = 60 * 60 * 60;

    /// Play one run to its outcome with the autopilot at a steady 60 fps
    pub fn play(seed: u64, tuning: Tuning) -> RunSummary {
        let mut state = GameState::with_tuning(seed, tuning);
        let mut now = 0.0;

        for _ in 0..MAX_FRAMES {
            if let Some(action) = choose_action(&state) {
                state.apply_action(action);
            }
            let result = update(&mut state, now);
            now += FRAME_MS as f64;

            for event in &state.events {
                if let GameEvent::StageEntered(stage) = event {
                    log::debug!("seed {}: entered {}", seed, cholo_run::sim::stadium(*stage).name);
                }
            }
            if matches!(
                result.outcome,
                TickOutcome::GameOver { .. } | TickOutcome::Victory { .. } | TickOutcome::Halted
            ) {
                break;
            }
        }

        RunSummary::from_state(&state)
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::WebGame, this is just to satisfy the compiler
}
