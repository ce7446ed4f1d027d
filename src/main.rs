//! Tenpin headless demo
//!
//! Bowls one seeded game and prints the score card. An optional first
//! argument names a settings JSON file.

#[cfg(not(target_arch = "wasm32"))]
use rand::{Rng, SeedableRng};
#[cfg(not(target_arch = "wasm32"))]
use rand_pcg::Pcg32;
#[cfg(not(target_arch = "wasm32"))]
use tenpin::{BowlingGame, RollPhase, ScoreSystem, Settings};

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();

    let settings = std::env::args()
        .nth(1)
        .map(|path| load_settings(&path))
        .unwrap_or_default();
    log::info!(
        "Tenpin starting: {} oil, seed {}",
        settings.oil_pattern.as_str(),
        settings.seed
    );

    // Separate stream from the lane RNG
    let mut bowler = Pcg32::seed_from_u64(settings.seed.wrapping_add(0x9e37_79b9));
    let mut game = BowlingGame::new(settings);

    while game.phase() != RollPhase::GameOver {
        let vx = bowler.random_range(-25.0f32..25.0);
        let vy = -bowler.random_range(550.0f32..850.0);
        let spin = bowler.random_range(-0.6f32..0.6);

        let Some(result) = game.bowl(vx, vy, spin) else {
            log::error!("Roll could not be completed, stopping");
            break;
        };
        match result.bonus_message {
            Some(message) => println!("{:>2} pins  {message}", result.pins_knocked),
            None if result.is_split => println!("{:>2} pins  split", result.pins_knocked),
            None => println!("{:>2} pins", result.pins_knocked),
        }
    }

    print_card(game.score());
}

#[cfg(not(target_arch = "wasm32"))]
fn load_settings(path: &str) -> Settings {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) => {
            log::error!("Failed to read settings from {path}: {e}, using defaults");
            return Settings::default();
        }
    };
    match Settings::from_json(&json) {
        Ok(settings) => {
            log::info!("Loaded settings from {path}");
            settings
        }
        Err(e) => {
            log::error!("Invalid settings in {path}: {e}, using defaults");
            Settings::default()
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn print_card(score: &ScoreSystem) {
    let mut header = String::from("Frame ");
    let mut marks = String::from("Marks ");
    let mut totals = String::from("Score ");
    for (i, frame) in score.frames().iter().enumerate() {
        header.push_str(&format!("|{:^5}", i + 1));
        marks.push_str(&format!("|{:^5}", frame.notation()));
        let total = frame
            .cumulative_score
            .map(|t| t.to_string())
            .unwrap_or_default();
        totals.push_str(&format!("|{total:^5}"));
    }
    println!();
    println!("{header}|");
    println!("{marks}|");
    println!("{totals}|");
    println!(
        "\nTotal: {}  (clean frames: {})",
        score.total_score(),
        score.clean_frames()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library only on wasm; there is no headless runner in the browser
}
