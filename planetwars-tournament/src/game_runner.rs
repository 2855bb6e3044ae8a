//! Game runner - plays a single match to completion
//!
//! Level 3 - Step-level implementation

use planetwars_core::{
    AgentHandle, EngineConfig, EngineError, FinishReason, GameState, MatchState, Replay, Side,
    TurnEngine,
};
use serde::Serialize;

use crate::roster::Contender;

/// A scheduled match: which map, which roster entries, which battle number
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pairing {
    pub battle_id: u32,
    pub map_index: usize,
    /// Roster index playing side A
    pub first: usize,
    /// Roster index playing side B
    pub second: usize,
}

/// Winner indicator of a finished match
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Winner {
    First,
    Second,
    Tie,
}

impl From<MatchState> for Winner {
    fn from(state: MatchState) -> Self {
        match state.winner() {
            Some(Side::First) => Winner::First,
            Some(Side::Second) => Winner::Second,
            None => Winner::Tie,
        }
    }
}

/// Outcome of a single match
#[derive(Clone, Debug, Serialize)]
pub struct MatchResult {
    /// Sequential id within a run, starting at 1
    pub battle_id: u32,
    pub map_index: usize,
    pub first_index: usize,
    pub second_index: usize,
    pub first_name: String,
    pub second_name: String,
    /// Terminal engine state
    pub state: MatchState,
    pub winner: Winner,
    pub finish: FinishReason,
    pub first_score: u64,
    pub second_score: u64,
    /// Turns elapsed at termination
    pub turns: u32,
    pub replay: Replay,
}

impl MatchResult {
    /// Which side a roster entry played, if any
    pub fn side_of(&self, index: usize) -> Option<Side> {
        if index == self.first_index {
            Some(Side::First)
        } else if index == self.second_index {
            Some(Side::Second)
        } else {
            None
        }
    }

    /// Roster index of the winner (None for a tie)
    pub fn winner_index(&self) -> Option<usize> {
        match self.winner {
            Winner::First => Some(self.first_index),
            Winner::Second => Some(self.second_index),
            Winner::Tie => None,
        }
    }

    /// Final score of a side
    pub fn score(&self, side: Side) -> u64 {
        match side {
            Side::First => self.first_score,
            Side::Second => self.second_score,
        }
    }

    /// Points earned by a side (win = 1, tie = 0.5)
    pub fn points(&self, side: Side) -> f32 {
        match (self.winner, side) {
            (Winner::Tie, _) => 0.5,
            (Winner::First, Side::First) | (Winner::Second, Side::Second) => 1.0,
            _ => 0.0,
        }
    }

    pub fn is_tie(&self) -> bool {
        self.winner == Winner::Tie
    }
}

/// Plays matches with one engine configuration
#[derive(Clone, Debug, Default)]
pub struct GameRunner {
    config: EngineConfig,
}

impl GameRunner {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Play one match on a fresh engine with fresh agents
    ///
    /// # Arguments
    /// * `pairing` - battle id, map index and roster indices
    /// * `map` - initial state, cloned into the engine
    /// * `first` - contender playing side A
    /// * `second` - contender playing side B
    ///
    /// # Returns
    /// The finished match, or an agent fault under `FaultPolicy::Propagate`
    pub fn play(
        &self,
        pairing: Pairing,
        map: &GameState,
        first: &Contender,
        second: &Contender,
    ) -> Result<MatchResult, EngineError> {
        let budget = self.config.turn_budget;
        let mut first_agent = AgentHandle::new(first.spawn(), budget);
        let mut second_agent = AgentHandle::new(second.spawn(), budget);
        let mut engine = TurnEngine::new(map.clone(), self.config.clone());
        let mut replay = Replay::new(map);

        engine.start(&mut first_agent, &mut second_agent)?;
        while !engine.status().is_finished() {
            let before = engine.turn();
            engine.play_turn(&mut first_agent, &mut second_agent)?;
            if engine.turn() > before {
                replay.record(engine.state());
            }
        }

        let state = engine.status();
        let result = MatchResult {
            battle_id: pairing.battle_id,
            map_index: pairing.map_index,
            first_index: pairing.first,
            second_index: pairing.second,
            first_name: first.name().to_string(),
            second_name: second.name().to_string(),
            state,
            winner: Winner::from(state),
            finish: engine.finish_reason().unwrap_or(FinishReason::TurnLimit),
            first_score: engine.score(Side::First),
            second_score: engine.score(Side::Second),
            turns: engine.turn(),
            replay,
        };

        tracing::info!(
            battle = result.battle_id,
            map = result.map_index,
            first = %result.first_name,
            second = %result.second_name,
            winner = ?result.winner,
            turns = result.turns,
            "match finished"
        );
        Ok(result)
    }
}
