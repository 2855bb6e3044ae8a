//! Tournament command - rank several bots over several maps
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: build_config(), report_results()
//! - Level 3: run_tournament (library)
//! - Level 4: formatting utilities

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use planetwars_core::{BotKind, EngineConfig};
use planetwars_tournament::{run_tournament, TournamentConfig, TournamentFormat, TournamentResult};

use crate::common::{build_roster, load_maps};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    RoundRobin,
    SingleElimination,
}

impl From<FormatArg> for TournamentFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::RoundRobin => TournamentFormat::RoundRobin,
            FormatArg::SingleElimination => TournamentFormat::SingleElimination,
        }
    }
}

#[derive(Args)]
pub struct TournamentArgs {
    /// Map files (every pairing plays on each)
    #[arg(long = "map", value_name = "FILE", required = true, num_args = 1..)]
    pub maps: Vec<PathBuf>,

    /// Comma-separated bots to enter
    #[arg(long, value_name = "BOT,...", value_delimiter = ',', required = true)]
    pub bots: Vec<BotKind>,

    /// Tournament format
    #[arg(long, value_enum, default_value = "round-robin")]
    pub format: FormatArg,

    /// Run independent matches in parallel
    #[arg(long)]
    pub parallel: bool,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run tournament command
///
/// 1. Load maps and build the roster
/// 2. Run the tournament
/// 3. Report standings
pub fn run(args: TournamentArgs, engine: EngineConfig, seed: Option<u64>) -> Result<()> {
    let maps = load_maps(&args.maps)?;
    let roster = build_roster(&args.bots, seed);
    let config = build_config(&args, engine, seed);

    let result = run_tournament(&roster, &maps, &config).context("Tournament failed")?;

    report_results(&result, args.json)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn build_config(args: &TournamentArgs, engine: EngineConfig, seed: Option<u64>) -> TournamentConfig {
    let mut config = TournamentConfig {
        format: args.format.into(),
        ..TournamentConfig::default()
    }
    .with_engine(engine)
    .with_parallel(args.parallel);
    if let Some(seed) = seed {
        config = config.with_seed(seed);
    }
    config
}

fn report_results(result: &TournamentResult, json: bool) -> Result<()> {
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

fn print_text_results(result: &TournamentResult) {
    println!("\n=== Tournament Results ({:?}) ===", result.format);
    println!("Matches played: {}", result.matches.len());

    for bracket in &result.brackets {
        println!("\nMap {}:", bracket.map_index);
        for (number, round) in bracket.rounds.iter().enumerate() {
            println!(
                "  Round {}: {} matches, advancing: {}",
                number + 1,
                round.pairs.len(),
                round.advancing.join(", ")
            );
        }
        println!("  Champions: {}", bracket.champions.join(", "));
    }

    println!(
        "\n{:>4}  {:<24} {:>7} {:>5} {:>5} {:>5} {:>7} {:>10}",
        "Rank", "Bot", "Battles", "Won", "Lost", "Tie", "Points", "Mean score"
    );
    for entry in &result.standings {
        println!(
            "{:>4}  {:<24} {:>7} {:>5} {:>5} {:>5} {:>7.1} {:>10.1}",
            entry.rank,
            entry.name,
            entry.battles,
            entry.wins,
            entry.losses,
            entry.ties,
            entry.points,
            entry.mean_score
        );
    }
}
