//! Refrain demo binary
//!
//! Seeds a small library, exercises the manual surface (keep, snooze,
//! preview), and runs the AI tagging path when a Gemini API key is
//! configured.

use chrono::Utc;
use clap::Parser;
use refrain::models::{Track, User};
use refrain::{GeminiClient, ScoreResult, ScoringEngine};

#[derive(Parser)]
#[command(name = "refrain-cli")]
#[command(about = "Refrain track resurfacing engine - demo")]
struct Args {
    /// Gemini API key; AI tagging is skipped when absent
    #[arg(long, env = "GEMINI_API_KEY")]
    api_key: Option<String>,

    /// Number of entries per preview
    #[arg(long, default_value_t = 10)]
    limit: usize,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(format!("refrain={log_level}"))
        .init();

    tracing::info!("Starting refrain demo");
    tracing::info!("Refrain version: {}", refrain::VERSION);

    let mut engine = ScoringEngine::new();
    let user = User {
        id: "demo-user".to_string(),
        name: "Demo Listener".to_string(),
        email: "demo@example.com".to_string(),
    };
    let tracks = seed_tracks();
    let now = Utc::now();

    // A couple of user actions: keep one forgotten favorite twice, snooze
    // the one that keeps getting skipped.
    engine.keep(&user, &tracks[0], now);
    engine.keep(&user, &tracks[0], now);
    engine.snooze(&user, &tracks[3], None, now);

    println!("Manual preview (top {}):", args.limit);
    print_rows(&engine.preview(&user, &tracks, now, Some(args.limit)));

    match args.api_key {
        Some(api_key) => {
            let llm = GeminiClient::new(api_key)?;
            for track in &tracks {
                let outcome = engine.tag(&user, track, &llm, Utc::now()).await;
                println!(
                    "tagged \"{}\": [{}] - {}",
                    track.title,
                    outcome
                        .tags
                        .iter()
                        .map(|t| t.as_str())
                        .collect::<Vec<_>>()
                        .join(", "),
                    outcome.rationale
                );
            }

            println!();
            println!("AI preview (top {}):", args.limit);
            print_rows(&engine.preview_ai(&user, &tracks, Utc::now(), Some(args.limit)));
        }
        None => {
            println!();
            println!("No API key configured; skipping AI tagging (set GEMINI_API_KEY)");
        }
    }

    Ok(())
}

fn print_rows(rows: &[ScoreResult]) {
    for row in rows {
        println!(
            "  {:>6.3}  {:<24} {}",
            row.score, row.track.title, row.rationale
        );
    }
}

fn seed_tracks() -> Vec<Track> {
    let track = |id: &str,
                 title: &str,
                 artist: &str,
                 tempo: f64,
                 energy: f64,
                 valence: f64,
                 last_played: f64,
                 liked: f64,
                 skips: u32| Track {
        id: id.to_string(),
        title: title.to_string(),
        artist: artist.to_string(),
        available: true,
        tempo,
        energy,
        valence,
        last_played_days_ago: last_played,
        liked_days_ago: liked,
        num_skipped: skips,
    };

    vec![
        track("t1", "Golden Hour", "Marigold Parade", 118.0, 0.7, 0.8, 300.0, 420.0, 0),
        track("t2", "Undertow", "Cold Harbour", 92.0, 0.4, 0.2, 45.0, 200.0, 1),
        track("t3", "Night Drive", "The Examples", 128.0, 0.8, 0.3, 150.0, 90.0, 0),
        track("t4", "Elevator Days", "Brass Monday", 104.0, 0.5, 0.6, 12.0, 30.0, 6),
        track("t5", "Low Tide", "Marigold Parade", 76.0, 0.2, 0.4, 500.0, 500.0, 2),
    ]
}
