//! Turn engine - order execution, movement, growth, combat and termination
//!
//! Architecture:
//! - Level 1: `TurnEngine::play_turn` queries both agents and resolves a turn
//! - Level 2: `TurnEngine::step` applies the fixed resolution phases
//! - Level 3: phase helpers and the combat arbiter

use std::time::Duration;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::game::{Fleet, GameState, Order, Owner, PlanetId, Side};
use crate::player::{AgentFault, AgentHandle};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Turn limit used when none is configured
pub const DEFAULT_MAX_TURNS: u32 = 200;

/// Per-turn answer budget used when none is configured
pub const DEFAULT_TURN_BUDGET: Duration = Duration::from_secs(1);

// ============================================================================
// CONFIGURATION
// ============================================================================

/// What happens when an agent fails during a match
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaultPolicy {
    /// The faulting side loses (both faulting is a tie)
    #[default]
    Forfeit,
    /// The faulting side sends no orders this turn
    Skip,
    /// Stop the match and return the fault as an error
    Propagate,
}

/// Match-level settings shared by every engine in a run
#[derive(Clone, Debug, PartialEq)]
pub struct EngineConfig {
    /// Turns played before the higher score is declared the winner
    pub max_turns: u32,
    /// Time each agent gets per call (None = call inline, no limit)
    pub turn_budget: Option<Duration>,
    /// Handling of agent errors, panics and timeouts
    pub fault_policy: FaultPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
            turn_budget: Some(DEFAULT_TURN_BUDGET),
            fault_policy: FaultPolicy::Forfeit,
        }
    }
}

impl EngineConfig {
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn with_turn_budget(mut self, budget: Option<Duration>) -> Self {
        self.turn_budget = budget;
        self
    }

    pub fn with_fault_policy(mut self, policy: FaultPolicy) -> Self {
        self.fault_policy = policy;
        self
    }
}

// ============================================================================
// STATUS
// ============================================================================

/// Engine status, terminal once it leaves `InProgress`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchState {
    InProgress,
    FirstWins,
    SecondWins,
    Tie,
}

impl MatchState {
    pub fn is_finished(self) -> bool {
        self != MatchState::InProgress
    }

    /// Winning side of a decided match
    pub fn winner(self) -> Option<Side> {
        match self {
            MatchState::FirstWins => Some(Side::First),
            MatchState::SecondWins => Some(Side::Second),
            MatchState::InProgress | MatchState::Tie => None,
        }
    }

    fn won_by(side: Side) -> Self {
        match side {
            Side::First => MatchState::FirstWins,
            Side::Second => MatchState::SecondWins,
        }
    }
}

/// Why a match ended
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    /// A side was reduced to zero ships
    Elimination,
    /// The configured turn limit was reached
    TurnLimit,
    /// One or both agents faulted under the forfeit policy
    Forfeit {
        first_faulted: bool,
        second_faulted: bool,
    },
}

/// Errors surfaced by the engine (only under `FaultPolicy::Propagate`)
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("agent '{agent}' playing {side:?} failed: {fault}")]
    Agent {
        side: Side,
        agent: String,
        fault: AgentFault,
    },
}

// ============================================================================
// TURN ENGINE
// ============================================================================

/// Authoritative state of one match
#[derive(Clone, Debug)]
pub struct TurnEngine {
    state: GameState,
    status: MatchState,
    finish: Option<FinishReason>,
    config: EngineConfig,
}

impl TurnEngine {
    pub fn new(state: GameState, config: EngineConfig) -> Self {
        Self {
            state,
            status: MatchState::InProgress,
            finish: None,
            config,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn status(&self) -> MatchState {
        self.status
    }

    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish
    }

    /// Elapsed turns
    pub fn turn(&self) -> u32 {
        self.state.turn
    }

    /// Ships a side has on planets and in flight
    pub fn score(&self, side: Side) -> u64 {
        self.state.total_ships(side.owner())
    }

    /// Independent copy of the state as `side` sees it
    pub fn perspective(&self, side: Side) -> GameState {
        self.state.relabeled(side)
    }

    // ========================================================================
    // Level 1 - Agent interaction
    // ========================================================================

    /// Deliver the match-start hook to both agents
    ///
    /// Start faults are never skipped: they forfeit unless the policy
    /// propagates them.
    pub fn start(
        &mut self,
        first: &mut AgentHandle,
        second: &mut AgentHandle,
    ) -> Result<MatchState, EngineError> {
        if self.status.is_finished() {
            return Ok(self.status);
        }
        let first_reply = first.start(&self.perspective(Side::First));
        let second_reply = second.start(&self.perspective(Side::Second));

        let first_ok = self.screen(Side::First, first.name(), first_reply, false)?;
        let second_ok = self.screen(Side::Second, second.name(), second_reply, false)?;
        match (first_ok, second_ok) {
            (Some(()), Some(())) => Ok(self.status),
            (first_ok, second_ok) => Ok(self.forfeit(first_ok.is_none(), second_ok.is_none())),
        }
    }

    /// Query both agents on their own perspective and resolve one turn
    ///
    /// # Arguments
    /// * `first` - agent playing side A
    /// * `second` - agent playing side B
    ///
    /// # Returns
    /// The status after the turn, or the fault under `FaultPolicy::Propagate`
    pub fn play_turn(
        &mut self,
        first: &mut AgentHandle,
        second: &mut AgentHandle,
    ) -> Result<MatchState, EngineError> {
        if self.status.is_finished() {
            return Ok(self.status);
        }
        let turn = self.turn();

        // Both views come from the same pre-step state
        let first_view = self.perspective(Side::First);
        let second_view = self.perspective(Side::Second);
        let first_reply = first.decide(&first_view, turn);
        let second_reply = second.decide(&second_view, turn);

        let first_orders = self.screen(Side::First, first.name(), first_reply, true)?;
        let second_orders = self.screen(Side::Second, second.name(), second_reply, true)?;
        match (first_orders, second_orders) {
            (Some(first_orders), Some(second_orders)) => Ok(self.step(&first_orders, &second_orders)),
            (first_orders, second_orders) => {
                Ok(self.forfeit(first_orders.is_none(), second_orders.is_none()))
            }
        }
    }

    /// Apply the fault policy to one agent reply
    ///
    /// `Ok(None)` means the side forfeits.
    fn screen<T: Default>(
        &self,
        side: Side,
        agent: &str,
        reply: Result<T, AgentFault>,
        skippable: bool,
    ) -> Result<Option<T>, EngineError> {
        let fault = match reply {
            Ok(value) => return Ok(Some(value)),
            Err(fault) => fault,
        };
        tracing::warn!(?side, agent, turn = self.turn(), %fault, "agent fault");

        match self.config.fault_policy {
            FaultPolicy::Propagate => Err(EngineError::Agent {
                side,
                agent: agent.to_string(),
                fault,
            }),
            FaultPolicy::Skip if skippable => Ok(Some(T::default())),
            FaultPolicy::Skip | FaultPolicy::Forfeit => Ok(None),
        }
    }

    fn forfeit(&mut self, first_faulted: bool, second_faulted: bool) -> MatchState {
        self.status = match (first_faulted, second_faulted) {
            (true, true) => MatchState::Tie,
            (true, false) => MatchState::SecondWins,
            (false, _) => MatchState::FirstWins,
        };
        self.finish = Some(FinishReason::Forfeit {
            first_faulted,
            second_faulted,
        });
        self.status
    }

    // ========================================================================
    // Level 2 - Resolution step
    // ========================================================================

    /// Resolve one turn from both sides' orders
    ///
    /// Orders are in absolute terms (planet ids do not change under
    /// relabeling). A finished engine is left untouched.
    pub fn step(&mut self, first_orders: &[Order], second_orders: &[Order]) -> MatchState {
        if self.status.is_finished() {
            return self.status;
        }

        self.execute_orders(Side::First, first_orders);
        self.execute_orders(Side::Second, second_orders);
        self.advance_fleets();
        self.grow();
        self.resolve_arrivals();
        self.state.turn += 1;
        self.check_endgame();

        self.status
    }

    // ========================================================================
    // Level 3 - Phases
    // ========================================================================

    fn execute_orders(&mut self, side: Side, orders: &[Order]) {
        for order in orders {
            if !self.state.is_legal_order(order, side) {
                tracing::debug!(?side, ?order, turn = self.turn(), "dropping illegal order");
                continue;
            }
            let Some(trip) = self.state.distance(order.source, order.destination) else {
                continue;
            };
            if let Some(source) = self.state.planet_mut(order.source) {
                source.ships -= order.ships;
            }
            self.state.fleets.push(Fleet {
                owner: side,
                ships: order.ships,
                source: order.source,
                destination: order.destination,
                total_trip_length: trip,
                turns_remaining: trip,
            });
        }
    }

    fn advance_fleets(&mut self) {
        for fleet in &mut self.state.fleets {
            fleet.turns_remaining = fleet.turns_remaining.saturating_sub(1);
        }
    }

    fn grow(&mut self) {
        for planet in &mut self.state.planets {
            if planet.owner != Owner::Neutral {
                planet.ships = planet.ships.saturating_add(u64::from(planet.growth_rate));
            }
        }
    }

    fn resolve_arrivals(&mut self) {
        let (arrived, in_flight): (Vec<Fleet>, Vec<Fleet>) = std::mem::take(&mut self.state.fleets)
            .into_iter()
            .partition(Fleet::has_arrived);
        self.state.fleets = in_flight;
        if arrived.is_empty() {
            return;
        }

        let mut arrivals: FxHashMap<PlanetId, [u64; 3]> = FxHashMap::default();
        for fleet in &arrived {
            let forces = arrivals.entry(fleet.destination).or_default();
            let force = &mut forces[fleet.owner.owner().index()];
            *force = force.saturating_add(fleet.ships);
        }

        for (id, mut forces) in arrivals {
            let Some(planet) = self.state.planet_mut(id) else {
                continue;
            };
            let garrison = &mut forces[planet.owner.index()];
            *garrison = garrison.saturating_add(planet.ships);
            let (owner, ships) = resolve_combat(planet.owner, forces);
            if owner != planet.owner {
                tracing::debug!(planet = id, from = ?planet.owner, to = ?owner, "planet changed hands");
            }
            planet.owner = owner;
            planet.ships = ships;
        }
    }

    fn check_endgame(&mut self) {
        let first = self.score(Side::First);
        let second = self.score(Side::Second);

        let (status, reason) = if first == 0 || second == 0 {
            let status = match (first, second) {
                (0, 0) => MatchState::Tie,
                (0, _) => MatchState::won_by(Side::Second),
                _ => MatchState::won_by(Side::First),
            };
            (status, FinishReason::Elimination)
        } else if self.state.turn >= self.config.max_turns {
            let status = match first.cmp(&second) {
                std::cmp::Ordering::Greater => MatchState::FirstWins,
                std::cmp::Ordering::Less => MatchState::SecondWins,
                std::cmp::Ordering::Equal => MatchState::Tie,
            };
            (status, FinishReason::TurnLimit)
        } else {
            return;
        };

        self.status = status;
        self.finish = Some(reason);
    }
}

/// Decide a contested planet
///
/// `forces` holds total ships per owner (neutral, first, second) including
/// the garrison. A tie for the largest force leaves `owner` in place with no
/// ships, otherwise the largest force wins with its margin over the runner-up.
pub fn resolve_combat(owner: Owner, forces: [u64; 3]) -> (Owner, u64) {
    let owners = [Owner::Neutral, Owner::First, Owner::Second];
    let mut ranked: Vec<(Owner, u64)> = owners.into_iter().zip(forces).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let (leader, most) = ranked[0];
    let runner_up = ranked[1].1;
    if most == runner_up {
        (owner, 0)
    } else {
        (leader, most - runner_up)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bots::RandomBot;
    use crate::game::Planet;
    use crate::player::{Decision, Player};
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    fn make_engine(planets: Vec<Planet>) -> TurnEngine {
        let config = EngineConfig::default().with_turn_budget(None);
        TurnEngine::new(GameState::new(planets, Vec::new()), config)
    }

    fn duel() -> Vec<Planet> {
        vec![
            Planet::new(0, Owner::First, 10, 1, 0.0, 0.0),
            Planet::new(1, Owner::Second, 10, 1, 10.0, 0.0),
            Planet::new(2, Owner::Neutral, 5, 3, 3.0, 4.0),
        ]
    }

    struct Idle;

    impl Player for Idle {
        fn decide(&mut self, _state: &GameState, _turn: u32) -> anyhow::Result<Decision> {
            Ok(Decision::Hold)
        }
    }

    struct Faulty;

    impl Player for Faulty {
        fn decide(&mut self, _state: &GameState, _turn: u32) -> anyhow::Result<Decision> {
            anyhow::bail!("cannot decide")
        }
    }

    struct Recorder(Arc<Mutex<Vec<GameState>>>);

    impl Player for Recorder {
        fn decide(&mut self, state: &GameState, _turn: u32) -> anyhow::Result<Decision> {
            self.0.lock().unwrap().push(state.clone());
            Ok(Decision::Hold)
        }
    }

    fn seat(player: impl Player + 'static) -> AgentHandle {
        AgentHandle::new(Box::new(player), None)
    }

    // ------------------------------------------------------------------------
    // Combat
    // ------------------------------------------------------------------------

    #[test]
    fn test_combat_tie_keeps_owner_with_no_ships() {
        // Garrison 10 for First, arrivals {First: 0, Second: 10}
        assert_eq!(resolve_combat(Owner::First, [0, 10, 10]), (Owner::First, 0));
    }

    #[test]
    fn test_combat_clear_win() {
        // Neutral garrison 5, First arrives with 20
        assert_eq!(resolve_combat(Owner::Neutral, [5, 20, 0]), (Owner::First, 15));
    }

    #[test]
    fn test_combat_tie_without_owner_among_leaders() {
        assert_eq!(resolve_combat(Owner::Neutral, [3, 10, 10]), (Owner::Neutral, 0));
    }

    #[test]
    fn test_combat_three_way() {
        assert_eq!(resolve_combat(Owner::Neutral, [4, 9, 12]), (Owner::Second, 3));
        assert_eq!(resolve_combat(Owner::Second, [0, 1, 0]), (Owner::First, 1));
    }

    // ------------------------------------------------------------------------
    // Resolution phases
    // ------------------------------------------------------------------------

    #[test]
    fn test_fleet_arrives_on_fifth_step() {
        let mut engine = make_engine(vec![
            Planet::new(0, Owner::First, 10, 0, 0.0, 0.0),
            Planet::new(1, Owner::Neutral, 5, 0, 3.0, 4.0),
            Planet::new(2, Owner::Second, 10, 0, 50.0, 50.0),
        ]);

        engine.step(&[Order::new(0, 1, 7)], &[]);
        assert_eq!(engine.state().planets[0].ships, 3);
        assert_eq!(engine.state().fleets[0].total_trip_length, 5);
        assert_eq!(engine.state().fleets[0].turns_remaining, 4);

        for _ in 0..3 {
            engine.step(&[], &[]);
        }
        assert_eq!(engine.state().fleets[0].turns_remaining, 1);
        assert_eq!(engine.state().planets[1].owner, Owner::Neutral);

        engine.step(&[], &[]);
        assert!(engine.state().fleets.is_empty());
        assert_eq!(engine.state().planets[1].owner, Owner::First);
        assert_eq!(engine.state().planets[1].ships, 2);
        assert_eq!(engine.turn(), 5);
    }

    #[test]
    fn test_later_order_sees_decremented_source() {
        let mut engine = make_engine(duel());
        engine.step(&[Order::new(0, 1, 6), Order::new(0, 2, 6)], &[]);

        // Second order exceeds the 4 ships left and is dropped
        assert_eq!(engine.state().fleets.len(), 1);
        assert_eq!(engine.state().planets[0].ships, 4 + 1);
    }

    #[test]
    fn test_side_orders_are_validated_against_their_own_planets() {
        let mut engine = make_engine(duel());
        // First tries to move Second's ships, Second tries the neutral planet
        engine.step(&[Order::new(1, 0, 5)], &[Order::new(2, 0, 5)]);
        assert!(engine.state().fleets.is_empty());
    }

    #[test]
    fn test_score_grows_by_growth_without_arrivals() {
        let mut engine = make_engine(duel());
        let first_before = engine.score(Side::First);
        let second_before = engine.score(Side::Second);

        engine.step(&[Order::new(0, 1, 4)], &[]);

        assert_eq!(engine.score(Side::First), first_before + 1);
        assert_eq!(engine.score(Side::Second), second_before + 1);
        // Neutral planets never grow
        assert_eq!(engine.state().planets[2].ships, 5);
    }

    #[test]
    fn test_seeded_fleet_with_zero_remaining_arrives_first_step() {
        let mut state = GameState::new(duel(), Vec::new());
        state.fleets.push(Fleet {
            owner: Side::Second,
            ships: 8,
            source: 1,
            destination: 2,
            total_trip_length: 7,
            turns_remaining: 0,
        });
        let mut engine = TurnEngine::new(state, EngineConfig::default());
        engine.step(&[], &[]);
        assert_eq!(engine.state().planets[2].owner, Owner::Second);
        assert_eq!(engine.state().planets[2].ships, 3);
    }

    #[test]
    fn test_colocated_planets_resolve_in_same_step() {
        let mut engine = make_engine(vec![
            Planet::new(0, Owner::First, 10, 0, 2.0, 2.0),
            Planet::new(1, Owner::Neutral, 3, 0, 2.0, 2.0),
            Planet::new(2, Owner::Second, 10, 0, 40.0, 0.0),
        ]);
        engine.step(&[Order::new(0, 1, 7)], &[]);

        assert!(engine.state().fleets.is_empty());
        assert_eq!(engine.state().planets[1].owner, Owner::First);
        assert_eq!(engine.state().planets[1].ships, 4);
    }

    #[test]
    fn test_garrison_beyond_u32_keeps_growing() {
        let map = crate::map::parse_map("P 0 0 1 4294967295 1\nP 5 0 2 10 1").unwrap();
        let mut engine = make_engine(map.planets);
        engine.step(&[], &[]);

        assert_eq!(engine.state().planets[0].ships, 4_294_967_296);
        assert_eq!(engine.score(Side::First), 4_294_967_296);
    }

    #[test]
    fn test_growth_saturates_at_max() {
        let mut engine = make_engine(vec![
            Planet::new(0, Owner::First, u64::MAX, 5, 0.0, 0.0),
            Planet::new(1, Owner::Second, 1, 0, 5.0, 0.0),
        ]);
        engine.step(&[], &[]);
        assert_eq!(engine.state().planets[0].ships, u64::MAX);
    }

    #[test]
    fn test_large_arrivals_keep_every_ship() {
        let big = u64::from(u32::MAX);
        let fleet = Fleet {
            owner: Side::First,
            ships: big,
            source: 0,
            destination: 2,
            total_trip_length: 3,
            turns_remaining: 1,
        };
        let state = GameState::new(
            vec![
                Planet::new(0, Owner::First, 1, 0, 0.0, 0.0),
                Planet::new(1, Owner::Second, 1, 0, 9.0, 0.0),
                Planet::new(2, Owner::Neutral, 0, 0, 3.0, 0.0),
            ],
            vec![fleet.clone(), fleet],
        );
        let mut engine = TurnEngine::new(state, EngineConfig::default());
        let before = engine.score(Side::First);
        engine.step(&[], &[]);

        assert_eq!(engine.state().planets[2].owner, Owner::First);
        assert_eq!(engine.state().planets[2].ships, 2 * big);
        assert_eq!(engine.score(Side::First), before);
    }

    // ------------------------------------------------------------------------
    // Termination
    // ------------------------------------------------------------------------

    #[test]
    fn test_elimination_ends_match() {
        let mut engine = make_engine(vec![
            Planet::new(0, Owner::First, 10, 0, 0.0, 0.0),
            Planet::new(1, Owner::Second, 5, 0, 1.0, 0.0),
        ]);
        let status = engine.step(&[Order::new(0, 1, 10)], &[]);

        assert_eq!(status, MatchState::FirstWins);
        assert_eq!(engine.finish_reason(), Some(FinishReason::Elimination));
        assert_eq!(engine.turn(), 1);
        assert_eq!(engine.state().planets[1].owner, Owner::First);
    }

    #[test]
    fn test_mutual_elimination_is_tie() {
        let mut engine = make_engine(vec![
            Planet::new(0, Owner::First, 0, 0, 0.0, 0.0),
            Planet::new(1, Owner::Second, 0, 0, 1.0, 0.0),
        ]);
        assert_eq!(engine.step(&[], &[]), MatchState::Tie);
    }

    #[test]
    fn test_turn_limit_compares_scores() {
        let config = EngineConfig::default().with_max_turns(3);
        let mut engine = TurnEngine::new(GameState::new(duel(), Vec::new()), config.clone());
        engine.step(&[], &[]);
        engine.step(&[], &[]);
        assert_eq!(engine.status(), MatchState::InProgress);
        assert_eq!(engine.step(&[], &[]), MatchState::Tie);
        assert_eq!(engine.finish_reason(), Some(FinishReason::TurnLimit));

        let mut planets = duel();
        planets[1].ships = 11;
        let mut engine = TurnEngine::new(GameState::new(planets, Vec::new()), config);
        for _ in 0..3 {
            engine.step(&[], &[]);
        }
        assert_eq!(engine.status(), MatchState::SecondWins);
        assert_eq!(engine.status().winner(), Some(Side::Second));
    }

    #[test]
    fn test_default_turn_limit() {
        let mut engine = make_engine(duel());
        let mut steps = 0;
        while !engine.status().is_finished() {
            engine.step(&[], &[]);
            steps += 1;
        }
        assert_eq!(steps, DEFAULT_MAX_TURNS);
        assert_eq!(engine.status(), MatchState::Tie);
    }

    #[test]
    fn test_finished_engine_is_absorbing() {
        let mut engine = make_engine(vec![
            Planet::new(0, Owner::First, 0, 0, 0.0, 0.0),
            Planet::new(1, Owner::Second, 3, 0, 1.0, 0.0),
        ]);
        assert_eq!(engine.step(&[], &[]), MatchState::SecondWins);
        let snapshot = engine.state().clone();

        assert_eq!(engine.step(&[], &[Order::new(1, 0, 3)]), MatchState::SecondWins);
        assert_eq!(engine.state(), &snapshot);
    }

    // ------------------------------------------------------------------------
    // Agents and faults
    // ------------------------------------------------------------------------

    #[test]
    fn test_second_side_sees_mirrored_map() {
        let map = GameState::new(duel(), Vec::new());
        let mirrored = map.relabeled(Side::Second);

        let seen_second = Arc::new(Mutex::new(Vec::new()));
        let seen_first = Arc::new(Mutex::new(Vec::new()));

        let mut engine = TurnEngine::new(map, EngineConfig::default().with_turn_budget(None));
        let mut a = seat(Idle);
        let mut b = seat(Recorder(seen_second.clone()));
        engine.play_turn(&mut a, &mut b).unwrap();

        let mut engine = TurnEngine::new(mirrored, EngineConfig::default().with_turn_budget(None));
        let mut a = seat(Recorder(seen_first.clone()));
        let mut b = seat(Idle);
        engine.play_turn(&mut a, &mut b).unwrap();

        let seen_second = seen_second.lock().unwrap();
        let seen_first = seen_first.lock().unwrap();
        assert_eq!(seen_second[0], seen_first[0]);
        assert_eq!(seen_second[0].planets[1].owner, Owner::MINE);
    }

    #[test]
    fn test_fault_forfeits() {
        let mut engine = make_engine(duel());
        let status = engine.play_turn(&mut seat(Faulty), &mut seat(Idle)).unwrap();

        assert_eq!(status, MatchState::SecondWins);
        assert_eq!(
            engine.finish_reason(),
            Some(FinishReason::Forfeit {
                first_faulted: true,
                second_faulted: false
            })
        );
        assert_eq!(engine.turn(), 0);
    }

    #[test]
    fn test_double_fault_is_tie() {
        let mut engine = make_engine(duel());
        let status = engine.play_turn(&mut seat(Faulty), &mut seat(Faulty)).unwrap();
        assert_eq!(status, MatchState::Tie);
    }

    #[test]
    fn test_skip_policy_continues() {
        let config = EngineConfig::default()
            .with_turn_budget(None)
            .with_fault_policy(FaultPolicy::Skip);
        let mut engine = TurnEngine::new(GameState::new(duel(), Vec::new()), config);

        let status = engine.play_turn(&mut seat(Idle), &mut seat(Faulty)).unwrap();
        assert_eq!(status, MatchState::InProgress);
        assert_eq!(engine.turn(), 1);
    }

    #[test]
    fn test_skip_policy_still_forfeits_start_faults() {
        struct NoStart;
        impl Player for NoStart {
            fn on_match_start(&mut self, _state: &GameState) -> anyhow::Result<()> {
                anyhow::bail!("not ready")
            }
            fn decide(&mut self, _state: &GameState, _turn: u32) -> anyhow::Result<Decision> {
                Ok(Decision::Hold)
            }
        }
        let config = EngineConfig::default()
            .with_turn_budget(None)
            .with_fault_policy(FaultPolicy::Skip);
        let mut engine = TurnEngine::new(GameState::new(duel(), Vec::new()), config);

        let status = engine.start(&mut seat(Idle), &mut seat(NoStart)).unwrap();
        assert_eq!(status, MatchState::FirstWins);
    }

    #[test]
    fn test_propagate_policy_returns_error() {
        let config = EngineConfig::default()
            .with_turn_budget(None)
            .with_fault_policy(FaultPolicy::Propagate);
        let mut engine = TurnEngine::new(GameState::new(duel(), Vec::new()), config);

        let err = engine.play_turn(&mut seat(Idle), &mut seat(Faulty)).unwrap_err();
        let EngineError::Agent { side, agent, fault } = err;
        assert_eq!(side, Side::Second);
        assert_eq!(agent, "Faulty");
        assert_eq!(fault, AgentFault::Raised("cannot decide".to_string()));
    }

    #[test]
    fn test_timeout_forfeits() {
        struct Slow;
        impl Player for Slow {
            fn decide(&mut self, _state: &GameState, _turn: u32) -> anyhow::Result<Decision> {
                std::thread::sleep(Duration::from_millis(300));
                Ok(Decision::Hold)
            }
        }
        let budget = Some(Duration::from_millis(20));
        let config = EngineConfig::default().with_turn_budget(budget);
        let mut engine = TurnEngine::new(GameState::new(duel(), Vec::new()), config);

        let mut fast = AgentHandle::new(Box::new(Idle), budget);
        let mut slow = AgentHandle::new(Box::new(Slow), budget);
        let status = engine.play_turn(&mut fast, &mut slow).unwrap();
        assert_eq!(status, MatchState::FirstWins);
    }

    // ------------------------------------------------------------------------
    // Invariants
    // ------------------------------------------------------------------------

    fn planet_strategy() -> impl Strategy<Value = (u8, u64, u32, u8, u8)> {
        (0u8..3, 0u64..120, 0u32..6, 0u8..30, 0u8..30)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_state_invariants_hold(
            specs in prop::collection::vec(planet_strategy(), 2..10),
            seed in any::<u64>(),
        ) {
            let mut planets: Vec<Planet> = specs
                .iter()
                .enumerate()
                .map(|(id, &(owner, ships, growth, x, y))| {
                    let owner = Owner::from_code(owner).unwrap_or(Owner::Neutral);
                    Planet::new(id, owner, ships, growth, x as f64, y as f64)
                })
                .collect();
            // Every match starts with both sides on the map
            planets[0].owner = Owner::First;
            planets[1].owner = Owner::Second;

            let config = EngineConfig::default().with_max_turns(60).with_turn_budget(None);
            let mut engine = TurnEngine::new(GameState::new(planets, Vec::new()), config);
            let mut first = seat(RandomBot::new(seed));
            let mut second = seat(RandomBot::new(seed.wrapping_add(1)));

            while !engine.status().is_finished() {
                let before = engine.state().clone();
                engine.play_turn(&mut first, &mut second).unwrap();
                prop_assert_eq!(engine.turn(), before.turn + 1);

                for fleet in &engine.state().fleets {
                    prop_assert!(fleet.ships > 0);
                    prop_assert!(fleet.turns_remaining <= fleet.total_trip_length);
                    prop_assert!(fleet.source != fleet.destination);
                }
                // Owned planets never revert to neutral and neutral garrisons never grow
                for (old, new) in before.planets.iter().zip(&engine.state().planets) {
                    if new.owner == Owner::Neutral {
                        prop_assert_eq!(old.owner, Owner::Neutral);
                        prop_assert!(new.ships <= old.ships);
                    }
                }
            }
            prop_assert!(engine.turn() <= 60);
        }

        #[test]
        fn prop_idle_scores_grow_by_growth(
            specs in prop::collection::vec(planet_strategy(), 2..10),
        ) {
            let mut planets: Vec<Planet> = specs
                .iter()
                .enumerate()
                .map(|(id, &(owner, ships, growth, x, y))| {
                    let owner = Owner::from_code(owner).unwrap_or(Owner::Neutral);
                    Planet::new(id, owner, ships + 1, growth, x as f64, y as f64)
                })
                .collect();
            planets[0].owner = Owner::First;
            planets[1].owner = Owner::Second;

            let mut engine = make_engine(planets);
            let before = (engine.score(Side::First), engine.score(Side::Second));
            let growth = (
                engine.state().total_growth(Owner::First),
                engine.state().total_growth(Owner::Second),
            );
            engine.step(&[], &[]);
            prop_assert_eq!(engine.score(Side::First), before.0 + growth.0);
            prop_assert_eq!(engine.score(Side::Second), before.1 + growth.1);
        }
    }
}
