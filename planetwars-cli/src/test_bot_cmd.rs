//! Test-bot command - one bot against a roster of competitors
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: report_results()
//! - Level 3: run_bot_test (library)
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use planetwars_core::{BotKind, EngineConfig};
use planetwars_tournament::{run_bot_test, BotTestConfig, BotTestResult};

use crate::common::{build_roster, load_maps};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct TestBotArgs {
    /// Bot under test
    #[arg(long, value_name = "BOT")]
    pub bot: BotKind,

    /// Comma-separated competitors
    #[arg(long, value_name = "BOT,...", value_delimiter = ',', required = true)]
    pub against: Vec<BotKind>,

    /// Map files
    #[arg(long = "map", value_name = "FILE", required = true, num_args = 1..)]
    pub maps: Vec<PathBuf>,

    /// Only play as side A (no swapped rematch)
    #[arg(long)]
    pub always_first: bool,

    /// Run matches in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run test-bot command
///
/// 1. Load maps and build candidate plus competitors
/// 2. Play every pairing
/// 3. Report the candidate's record
pub fn run(args: TestBotArgs, engine: EngineConfig, seed: Option<u64>) -> Result<()> {
    let maps = load_maps(&args.maps)?;

    // Candidate goes last so its name is suffixed if it also competes
    let mut kinds = args.against.clone();
    kinds.push(args.bot);
    let mut roster = build_roster(&kinds, seed);
    let candidate = roster.pop().context("Roster is empty")?;

    let config = BotTestConfig::default()
        .with_engine(engine)
        .with_always_first(args.always_first)
        .with_parallel(args.parallel);

    let result = run_bot_test(&candidate, &roster, &maps, &config).context("Bot test failed")?;

    report_results(&result, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn report_results(result: &BotTestResult, json: bool) -> Result<()> {
    if json {
        let output = serde_json::to_string_pretty(result).context("Failed to serialize results")?;
        println!("{}", output);
    } else {
        print_text_results(result);
    }
    Ok(())
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn print_text_results(result: &BotTestResult) {
    let entry = &result.candidate;
    let total = entry.battles.max(1) as f32;

    println!("\n=== Bot Test: {} ===", entry.name);
    println!("Battles:       {}", entry.battles);
    println!("Won:           {} ({:.1}%)", entry.wins, entry.wins as f32 / total * 100.0);
    println!("Lost:          {} ({:.1}%)", entry.losses, entry.losses as f32 / total * 100.0);
    println!("Tied:          {} ({:.1}%)", entry.ties, entry.ties as f32 / total * 100.0);
    println!("Points:        {:.1} ({:.3} per battle)", entry.points, result.normalized_score());
    println!("Wins as A / B: {} / {}", entry.wins_as_first, entry.wins_as_second);
    println!("Mean score:    {:.1} vs {:.1}", entry.mean_score, entry.mean_opponent_score);
    println!("Rank:          {} of {}", entry.rank, result.standings.len());

    println!("\nPer-battle:");
    for m in &result.matches {
        println!(
            "  #{:<4} map {:<3} {:<20} vs {:<20} {:?} ({} - {}, {} turns)",
            m.battle_id, m.map_index, m.first_name, m.second_name, m.winner, m.first_score,
            m.second_score, m.turns
        );
    }
}
