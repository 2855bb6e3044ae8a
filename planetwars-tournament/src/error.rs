//! Tournament errors
//!
//! Level 4 - Utilities

use planetwars_core::{EngineError, MapParseError};

/// Errors that stop a tournament before or while it runs
#[derive(Debug, thiserror::Error)]
pub enum TournamentError {
    #[error("need at least 2 contenders, got {0}")]
    TooFewContenders(usize),

    #[error("need at least one map")]
    NoMaps,

    #[error("bot test needs at least one competitor")]
    NoCompetitors,

    #[error("map {index} is invalid: {source}")]
    Map {
        index: usize,
        #[source]
        source: MapParseError,
    },

    #[error(transparent)]
    Engine(#[from] EngineError),
}
