//! Planet Wars CLI - Command-line interface
//!
//! Commands:
//! - battle: Play a single match between two bots
//! - tournament: Run a round-robin or single elimination tournament
//! - test-bot: Test one bot against a roster

mod battle_cmd;
mod common;
mod test_bot_cmd;
mod tournament_cmd;

use std::time::Duration;

use clap::{Parser, Subcommand};
use planetwars_core::{EngineConfig, FaultPolicy};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "planetwars")]
#[command(about = "Planet Wars bot arena")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Random seed for reproducibility
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Maximum turns per match
    #[arg(long, global = true, default_value = "200")]
    max_turns: u32,

    /// Per-turn answer budget for each bot in milliseconds (0 = unlimited)
    #[arg(long, global = true, default_value = "1000")]
    turn_budget_ms: u64,

    /// Abort on the first bot failure instead of forfeiting the match
    #[arg(long, global = true, conflicts_with = "skip_faults")]
    strict: bool,

    /// Treat a failing bot's turn as sending no orders
    #[arg(long, global = true)]
    skip_faults: bool,
}

impl Cli {
    fn engine_config(&self) -> EngineConfig {
        let policy = if self.strict {
            FaultPolicy::Propagate
        } else if self.skip_faults {
            FaultPolicy::Skip
        } else {
            FaultPolicy::Forfeit
        };
        let budget = (self.turn_budget_ms > 0).then(|| Duration::from_millis(self.turn_budget_ms));

        EngineConfig::default()
            .with_max_turns(self.max_turns)
            .with_turn_budget(budget)
            .with_fault_policy(policy)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Play a single match between two bots
    Battle(battle_cmd::BattleArgs),
    /// Run a tournament between several bots
    Tournament(tournament_cmd::TournamentArgs),
    /// Test one bot against a roster of competitors
    TestBot(test_bot_cmd::TestBotArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so JSON output stays clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let engine = cli.engine_config();

    match cli.command {
        Commands::Battle(args) => battle_cmd::run(args, engine, cli.seed),
        Commands::Tournament(args) => tournament_cmd::run(args, engine, cli.seed),
        Commands::TestBot(args) => test_bot_cmd::run(args, engine, cli.seed),
    }
}
