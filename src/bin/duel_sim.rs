//! Headless duel runner.
//!
//! Plays one or more duels against a catalog opponent with a scripted
//! player and prints each round plus the final result.
//!
//! Run with: `cargo run --bin duel_sim -- --opponent quick --wins 5 --seed 42`

use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use quiz_duel::duel_engine::{catalog, models::ProgressionSnapshot, pool::sample_questions};
use quiz_duel::{
    DuelEngine, DuelEvent, DuelSettings, EngineConfig, ManualClock, MemoryProgressionStore,
    Phase, QuestionPool, RoundResult, SessionResult,
};

#[derive(Parser, Debug)]
#[command(name = "duel_sim")]
#[command(about = "Play scripted quiz duels against a synthetic opponent")]
struct Args {
    /// Opponent id from the catalog (see --list)
    #[arg(long, default_value = "rookie")]
    opponent: String,

    /// List the opponent catalog and exit
    #[arg(long)]
    list: bool,

    /// Prior wins in the chosen tier
    #[arg(long, default_value_t = 0)]
    wins: u32,

    /// Number of duels to play back to back (rematches)
    #[arg(long, default_value_t = 1)]
    duels: u32,

    /// Questions per duel [default: config default_settings]
    #[arg(long)]
    questions: Option<usize>,

    /// Seconds per question [default: config default_settings]
    #[arg(long)]
    time_limit: Option<u32>,

    /// Added to the opponent's accuracy, in percentage points
    #[arg(long, allow_hyphen_values = true)]
    accuracy_modifier: Option<f64>,

    /// Opponent speed multiplier (above 1.0 is faster)
    #[arg(long)]
    speed_multiplier: Option<f64>,

    /// Scripted player's chance of answering correctly, 0-100
    #[arg(long, default_value_t = 70.0)]
    player_accuracy: f64,

    /// Scripted player's answer time range in ms, e.g. 1500-9000
    #[arg(long, default_value = "1500-9000")]
    player_time: String,

    /// Engine config TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "text")]
    format: String,
}

#[derive(Serialize)]
struct DuelReport {
    rounds: Vec<RoundResult>,
    result: SessionResult,
}

fn parse_time_range(s: &str) -> Result<(u64, u64), String> {
    let (lo, hi) = s
        .split_once('-')
        .ok_or_else(|| format!("expected MIN-MAX, got '{s}'"))?;
    let lo: u64 = lo.trim().parse().map_err(|e| format!("bad min '{lo}': {e}"))?;
    let hi: u64 = hi.trim().parse().map_err(|e| format!("bad max '{hi}': {e}"))?;
    if lo > hi {
        return Err(format!("min {lo} is above max {hi}"));
    }
    Ok((lo, hi))
}

/// Flags override the config's default settings field by field.
fn settings_from_args(args: &Args, defaults: DuelSettings) -> DuelSettings {
    DuelSettings {
        question_count: args.questions.unwrap_or(defaults.question_count),
        time_limit_secs: args.time_limit.unwrap_or(defaults.time_limit_secs),
        accuracy_modifier: args.accuracy_modifier.unwrap_or(defaults.accuracy_modifier),
        speed_multiplier: args.speed_multiplier.unwrap_or(defaults.speed_multiplier),
        ..defaults
    }
}

fn print_catalog(wins: u32) {
    println!("  #   id            accuracy   latency (ms)    unlock");
    for o in catalog::all() {
        let lock = if o.is_unlocked(wins) { " " } else { "x" };
        println!(
            "  {:<3} {:<12} {:>3}-{:<3}%   {:>5}-{:<6}  {:>4} {lock}",
            o.ordinal, o.id, o.accuracy_min, o.accuracy_max,
            o.latency_min_ms, o.latency_max_ms, o.unlock_threshold,
        );
    }
}

fn print_round(index: usize, round: &RoundResult) {
    let player = match round.player.answer_index {
        Some(i) => format!("{} ({}ms)", i, round.player.elapsed_ms),
        None => "timed out".to_string(),
    };
    let mark = |ok: bool| if ok { "✓" } else { "✗" };
    println!(
        "  Q{:<2} you: {} {:<14} +{:<4} opp: {} {:>5}ms +{:<4} → {}",
        index + 1,
        mark(round.player.is_correct), player, round.player.points,
        mark(round.opponent.is_correct), round.opponent.elapsed_ms, round.opponent.points,
        round.winner,
    );
}

fn print_result(result: &SessionResult) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!(
        "  Winner: {}   Score {} - {}   Correct {} - {} of {}",
        result.winner, result.player_score, result.opponent_score,
        result.player_correct, result.opponent_correct, result.total_questions,
    );
    println!(
        "  Best streak: {}   Avg answer: {}ms   {} wins / {} games",
        result.best_streak, result.average_answer_ms,
        result.progression.wins, result.progression.games,
    );
    if let Some(unlock) = result.unlocked {
        println!("  Unlocked: {}", unlock.opponent_name);
    }
    println!();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("quiz_duel=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if args.list {
        print_catalog(args.wins);
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let (time_min, time_max) = parse_time_range(&args.player_time)?;
    let settings = settings_from_args(&args, config.default_settings);

    let clock = ManualClock::new();
    let store = MemoryProgressionStore::with_snapshot(
        settings.tier,
        ProgressionSnapshot { wins: args.wins, games: args.wins },
    );
    let mut engine = DuelEngine::new(
        config,
        QuestionPool::new(sample_questions(), args.seed),
        store,
        clock.clone(),
        args.seed,
    );
    let mut player_rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(1)),
        None       => StdRng::from_entropy(),
    };

    engine.start_session(&args.opponent, settings)?;
    let mut reports = Vec::new();

    for duel in 0..args.duels {
        if duel > 0 {
            engine.rematch()?;
        }
        let mut rounds = Vec::new();

        loop {
            // Outside an open window, jump straight to the next timer.
            if engine.phase() != Some(Phase::Playing) {
                if let Some(deadline) = engine.next_deadline_ms() {
                    clock.set(deadline);
                }
                engine.poll();
            }

            if engine.phase() == Some(Phase::Playing) {
                let think_ms = player_rng.gen_range(time_min..=time_max);
                let remaining = engine.remaining_ms().unwrap_or(0);
                if think_ms >= remaining {
                    clock.advance(remaining);
                    engine.poll();
                } else if let Some(q) = engine.current_question() {
                    let correct = q.correct_index;
                    let choice = if player_rng.gen_range(0.0..100.0) < args.player_accuracy {
                        correct
                    } else {
                        (correct + player_rng.gen_range(1..q.options.len())) % q.options.len()
                    };
                    clock.advance(think_ms);
                    engine.submit_answer(choice);
                }
            }

            if engine.phase() == Some(Phase::Revealing) {
                engine.advance();
            }

            for event in engine.take_events() {
                match event {
                    DuelEvent::RoundRevealed { index, round } => {
                        if args.format == "text" {
                            print_round(index, &round);
                        }
                        rounds.push(round);
                    }
                    DuelEvent::SessionFinished { result } => {
                        if args.format == "text" {
                            print_result(&result);
                        }
                        reports.push(DuelReport { rounds: std::mem::take(&mut rounds), result });
                    }
                    _ => {}
                }
            }

            if matches!(engine.phase(), Some(Phase::Finished) | None) {
                break;
            }
        }
    }

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}
