//! Planet Wars Tournament - Scheduling matches and ranking bots
//!
//! This crate provides tournament infrastructure:
//! - Single matches driven to completion with replays
//! - Tournament formats (round-robin, single elimination)
//! - Testing one bot against a roster
//! - Standings aggregation
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run_tournament (orchestration)
//! - Level 2: run_bot_test, round and bracket phases
//! - Level 3: GameRunner::play, compute_standings (steps)
//! - Level 4: utilities, configuration

mod config;
mod error;
mod game_runner;
mod roster;
mod standings;
mod tournament;

pub use bot_test::{run_bot_test, BotTestResult};
pub use config::{BotTestConfig, TournamentConfig, TournamentFormat};
pub use error::TournamentError;
pub use game_runner::{GameRunner, MatchResult, Pairing, Winner};
pub use roster::Contender;
pub use standings::{compute_standings, tally, StandingsEntry};
pub use tournament::{parse_maps, run_tournament, Bracket, BracketRound, TournamentResult};
