//! Planet Wars Core - Game engine and agent contract
//!
//! This crate provides the core game logic for Planet Wars:
//! - Planets, fleets and orders, plus the text map format
//! - Turn resolution with growth, movement and combat
//! - Player trait and the fault-isolating agent boundary
//! - Baseline bots
//! - Replay snapshots

pub mod game;
pub mod map;
pub mod engine;
pub mod player;
pub mod bots;
pub mod replay;

// Re-exports for convenient access
pub use game::{distance, Fleet, GameState, Order, Owner, Planet, PlanetId, Side};
pub use map::{parse_map, MapErrorKind, MapParseError};
pub use engine::{
    resolve_combat, EngineConfig, EngineError, FaultPolicy, FinishReason, MatchState, TurnEngine,
    DEFAULT_MAX_TURNS, DEFAULT_TURN_BUDGET,
};
pub use player::{AgentFault, AgentHandle, Decision, Player};
pub use bots::{BotKind, UnknownBot};
pub use replay::Replay;
