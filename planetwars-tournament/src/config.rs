//! Configuration types for tournament play
//!
//! Level 4 - Utilities and configuration

use planetwars_core::EngineConfig;
use serde::Serialize;

/// Tournament format
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum TournamentFormat {
    /// Every ordered pair plays on every map
    #[default]
    RoundRobin,
    /// Shuffled knockout per map, ties advance both contenders
    SingleElimination,
}

/// Tournament configuration
#[derive(Clone, Debug)]
pub struct TournamentConfig {
    /// Tournament format
    pub format: TournamentFormat,
    /// Engine settings for every match
    pub engine: EngineConfig,
    /// Whether to run independent matches in parallel
    pub parallel: bool,
    /// Seed for the elimination shuffle (None = entropy)
    pub seed: Option<u64>,
}

impl Default for TournamentConfig {
    fn default() -> Self {
        Self {
            format: TournamentFormat::RoundRobin,
            engine: EngineConfig::default(),
            parallel: false,
            seed: None,
        }
    }
}

impl TournamentConfig {
    /// Create round-robin tournament config
    pub fn round_robin() -> Self {
        Self::default()
    }

    /// Create single elimination tournament config
    pub fn single_elimination(seed: u64) -> Self {
        Self {
            format: TournamentFormat::SingleElimination,
            seed: Some(seed),
            ..Default::default()
        }
    }

    /// Set engine configuration
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Configuration for testing one bot against a roster
#[derive(Clone, Debug, Default)]
pub struct BotTestConfig {
    /// Engine settings for every match
    pub engine: EngineConfig,
    /// Skip the swapped-sides rematch
    pub always_first: bool,
    /// Whether to run matches in parallel
    pub parallel: bool,
}

impl BotTestConfig {
    /// Set engine configuration
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_always_first(mut self, always_first: bool) -> Self {
        self.always_first = always_first;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}
