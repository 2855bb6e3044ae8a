//! Contenders - named factories for fresh agents
//!
//! Level 4 - Utilities

use std::fmt;
use std::sync::Arc;

use planetwars_core::{BotKind, Player};

type Factory = dyn Fn() -> Box<dyn Player> + Send + Sync;

/// An entrant in a tournament
///
/// Every match gets its own agent instance so matches never share state.
#[derive(Clone)]
pub struct Contender {
    name: String,
    factory: Arc<Factory>,
}

impl Contender {
    /// Contender named after the player the factory produces
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> Box<dyn Player> + Send + Sync + 'static,
    {
        let name = factory().name();
        Self::named(name, factory)
    }

    /// Contender with an explicit display name
    pub fn named<F>(name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn Player> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
        }
    }

    /// Contender for a player type with a `Default` constructor
    pub fn of<P>() -> Self
    where
        P: Player + Default + 'static,
    {
        Self::new(|| Box::new(P::default()) as Box<dyn Player>)
    }

    /// Contender for a built-in bot
    pub fn builtin(kind: BotKind, seed: u64) -> Self {
        Self::new(move || kind.build(seed))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename, e.g. to tell apart two copies of the same bot
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Fresh agent for one match
    pub fn spawn(&self) -> Box<dyn Player> {
        (self.factory)()
    }
}

impl fmt::Debug for Contender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Contender").field("name", &self.name).finish_non_exhaustive()
    }
}
