//! Battle command - play one match between two bots
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: report_result()
//! - Level 3: GameRunner::play
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use planetwars_core::{BotKind, EngineConfig};
use planetwars_tournament::{GameRunner, MatchResult, Pairing, Winner};

use crate::common::{build_roster, load_map};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct BattleArgs {
    /// Map file
    #[arg(long, value_name = "FILE")]
    pub map: PathBuf,

    /// Bot playing side A
    #[arg(long, value_name = "BOT")]
    pub first: BotKind,

    /// Bot playing side B
    #[arg(long, value_name = "BOT")]
    pub second: BotKind,

    /// Print the replay string after the result
    #[arg(long)]
    pub replay: bool,

    /// Output result as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run battle command
///
/// 1. Load the map and build both bots
/// 2. Play the match
/// 3. Report the result
pub fn run(args: BattleArgs, engine: EngineConfig, seed: Option<u64>) -> Result<()> {
    let map = load_map(&args.map)?;
    let roster = build_roster(&[args.first, args.second], seed);

    tracing::info!(
        "Starting battle: {} vs {} on {} ({} planets)",
        roster[0].name(),
        roster[1].name(),
        args.map.display(),
        map.planets.len()
    );

    let pairing = Pairing {
        battle_id: 1,
        map_index: 0,
        first: 0,
        second: 1,
    };
    let result = GameRunner::new(engine)
        .play(pairing, &map, &roster[0], &roster[1])
        .context("Battle aborted by a bot failure")?;

    report_result(&result, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn report_result(result: &MatchResult, args: &BattleArgs) -> Result<()> {
    if args.json {
        print_json_result(result, args.replay)
    } else {
        print_text_result(result, args.replay);
        Ok(())
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn print_json_result(result: &MatchResult, with_replay: bool) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonBattle<'a> {
        first: &'a str,
        second: &'a str,
        winner: String,
        finish: String,
        first_score: u64,
        second_score: u64,
        turns: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        replay: Option<String>,
    }

    let output = JsonBattle {
        first: &result.first_name,
        second: &result.second_name,
        winner: format!("{:?}", result.winner),
        finish: format!("{:?}", result.finish),
        first_score: result.first_score,
        second_score: result.second_score,
        turns: result.turns,
        replay: with_replay.then(|| result.replay.to_display_string()),
    };

    let json = serde_json::to_string_pretty(&output).context("Failed to serialize result")?;
    println!("{}", json);
    Ok(())
}

fn print_text_result(result: &MatchResult, with_replay: bool) {
    println!("\n=== Battle Result ===");
    println!("{} (A) vs {} (B)", result.first_name, result.second_name);
    println!("Winner:  {}", winner_label(result));
    println!("Finish:  {:?}", result.finish);
    println!("Score:   {} - {}", result.first_score, result.second_score);
    println!("Turns:   {}", result.turns);

    if with_replay {
        println!("\n{}", result.replay.to_display_string());
    }
}

fn winner_label(result: &MatchResult) -> String {
    match result.winner {
        Winner::First => result.first_name.clone(),
        Winner::Second => result.second_name.clone(),
        Winner::Tie => "tie".to_string(),
    }
}
