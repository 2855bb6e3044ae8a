//! Baseline bots
//!
//! Simple reference strategies used as sparring partners and in tests.

use std::fmt;
use std::str::FromStr;

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::game::{GameState, Order, Owner, Planet};
use crate::player::{Decision, Player};

// ============================================================================
// BOTS
// ============================================================================

/// Never sends a fleet
#[derive(Clone, Copy, Debug, Default)]
pub struct Idle;

impl Player for Idle {
    fn decide(&mut self, _state: &GameState, _turn: u32) -> anyhow::Result<Decision> {
        Ok(Decision::Hold)
    }
}

/// Half of the strongest planet's ships go to the weakest planet not owned,
/// one fleet in flight at a time
#[derive(Clone, Copy, Debug, Default)]
pub struct AttackWeakest;

impl Player for AttackWeakest {
    fn decide(&mut self, state: &GameState, _turn: u32) -> anyhow::Result<Decision> {
        if state.fleets_owned_by(Owner::MINE).next().is_some() {
            return Ok(Decision::Hold);
        }
        let target = weakest(state.planets.iter().filter(|p| p.owner != Owner::MINE));
        Ok(half_from_strongest(state, target).into())
    }
}

/// Like [`AttackWeakest`] but ignores neutral planets
#[derive(Clone, Copy, Debug, Default)]
pub struct AttackEnemyWeakest;

impl Player for AttackEnemyWeakest {
    fn decide(&mut self, state: &GameState, _turn: u32) -> anyhow::Result<Decision> {
        if state.fleets_owned_by(Owner::MINE).next().is_some() {
            return Ok(Decision::Hold);
        }
        let target = weakest(state.planets_owned_by(Owner::ENEMY));
        Ok(half_from_strongest(state, target).into())
    }
}

/// Every planet sends exactly enough ships to take its closest affordable
/// target, accounting for enemy growth during the trip
#[derive(Clone, Copy, Debug, Default)]
pub struct Conqueror;

impl Player for Conqueror {
    fn decide(&mut self, state: &GameState, _turn: u32) -> anyhow::Result<Decision> {
        let mut orders = Vec::new();
        for source in state.planets_owned_by(Owner::MINE) {
            let target = state
                .planets
                .iter()
                .filter(|p| p.owner != Owner::MINE)
                .map(|p| (p, ships_needed(source, p)))
                .filter(|(_, needed)| *needed < source.ships)
                .min_by_key(|(p, _)| source.distance_to(p));
            if let Some((target, needed)) = target {
                orders.push(Order::between(source, target, needed));
            }
        }
        Ok(orders.into())
    }
}

/// Random orders from a seeded generator
#[derive(Clone, Debug)]
pub struct RandomBot {
    rng: ChaCha8Rng,
}

impl RandomBot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Player for RandomBot {
    fn decide(&mut self, state: &GameState, _turn: u32) -> anyhow::Result<Decision> {
        let sources: Vec<&Planet> = state
            .planets_owned_by(Owner::MINE)
            .filter(|p| p.ships > 0)
            .collect();
        if state.planets.len() < 2 || !self.rng.gen_bool(0.5) {
            return Ok(Decision::Hold);
        }
        let Some(source) = sources.choose(&mut self.rng) else {
            return Ok(Decision::Hold);
        };
        let destination = loop {
            let candidate = self.rng.gen_range(0..state.planets.len());
            if candidate != source.id {
                break candidate;
            }
        };
        let ships = self.rng.gen_range(1..=source.ships);
        Ok(Order::new(source.id, destination, ships).into())
    }
}

fn weakest<'a>(planets: impl Iterator<Item = &'a Planet>) -> Option<&'a Planet> {
    planets.min_by_key(|p| p.ships)
}

fn half_from_strongest(state: &GameState, target: Option<&Planet>) -> Option<Order> {
    let target = target?;
    let source = state.planets_owned_by(Owner::MINE).max_by_key(|p| p.ships)?;
    let ships = source.ships / 2;
    (ships > 0).then(|| Order::between(source, target, ships))
}

fn ships_needed(source: &Planet, target: &Planet) -> u64 {
    let reinforcements = if target.owner == Owner::ENEMY {
        u64::from(target.growth_rate) * u64::from(source.distance_to(target))
    } else {
        0
    };
    target.ships + reinforcements + 1
}

// ============================================================================
// REGISTRY
// ============================================================================

/// Built-in bots selectable by name
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BotKind {
    Idle,
    AttackWeakest,
    AttackEnemyWeakest,
    Conqueror,
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown bot '{0}' (known: idle, attack-weakest, attack-enemy-weakest, conqueror, random)")]
pub struct UnknownBot(pub String);

impl BotKind {
    pub const ALL: [BotKind; 5] = [
        BotKind::Idle,
        BotKind::AttackWeakest,
        BotKind::AttackEnemyWeakest,
        BotKind::Conqueror,
        BotKind::Random,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BotKind::Idle => "idle",
            BotKind::AttackWeakest => "attack-weakest",
            BotKind::AttackEnemyWeakest => "attack-enemy-weakest",
            BotKind::Conqueror => "conqueror",
            BotKind::Random => "random",
        }
    }

    /// Fresh instance; `seed` only matters for randomized bots
    pub fn build(self, seed: u64) -> Box<dyn Player> {
        match self {
            BotKind::Idle => Box::new(Idle),
            BotKind::AttackWeakest => Box::new(AttackWeakest),
            BotKind::AttackEnemyWeakest => Box::new(AttackEnemyWeakest),
            BotKind::Conqueror => Box::new(Conqueror),
            BotKind::Random => Box::new(RandomBot::new(seed)),
        }
    }
}

impl fmt::Display for BotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BotKind {
    type Err = UnknownBot;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        BotKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == wanted)
            .ok_or_else(|| UnknownBot(s.to_string()))
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Side;

    fn make_test_state() -> GameState {
        GameState::new(
            vec![
                Planet::new(0, Owner::MINE, 40, 3, 0.0, 0.0),
                Planet::new(1, Owner::MINE, 10, 1, 1.0, 0.0),
                Planet::new(2, Owner::ENEMY, 30, 2, 5.0, 0.0),
                Planet::new(3, Owner::Neutral, 6, 1, 2.0, 0.0),
                Planet::new(4, Owner::ENEMY, 12, 1, 8.0, 0.0),
            ],
            Vec::new(),
        )
    }

    #[test]
    fn test_idle_holds() {
        assert_eq!(Idle.decide(&make_test_state(), 0).unwrap(), Decision::Hold);
    }

    #[test]
    fn test_attack_weakest() {
        let decision = AttackWeakest.decide(&make_test_state(), 0).unwrap();
        assert_eq!(decision, Decision::Single(Order::new(0, 3, 20)));
    }

    #[test]
    fn test_attack_enemy_weakest_skips_neutral() {
        let decision = AttackEnemyWeakest.decide(&make_test_state(), 0).unwrap();
        assert_eq!(decision, Decision::Single(Order::new(0, 4, 20)));
    }

    #[test]
    fn test_attackers_wait_for_fleet() {
        let mut state = make_test_state();
        state.fleets.push(crate::game::Fleet {
            owner: Side::First,
            ships: 3,
            source: 0,
            destination: 3,
            total_trip_length: 2,
            turns_remaining: 1,
        });
        assert_eq!(AttackWeakest.decide(&state, 1).unwrap(), Decision::Hold);
    }

    #[test]
    fn test_conqueror_sends_exact_force() {
        let orders = Conqueror.decide(&make_test_state(), 0).unwrap().into_orders();
        // Both planets can afford the neutral, the enemy home is out of reach
        assert_eq!(orders, vec![Order::new(0, 3, 7), Order::new(1, 3, 7)]);
    }

    #[test]
    fn test_bot_orders_are_legal() {
        let state = make_test_state();
        let mut random = RandomBot::new(7);
        for turn in 0..50 {
            for order in random.decide(&state, turn).unwrap().into_orders() {
                assert!(state.is_legal_order(&order, Side::First));
            }
        }
        for order in Conqueror.decide(&state, 0).unwrap().into_orders() {
            assert!(state.is_legal_order(&order, Side::First));
        }
    }

    #[test]
    fn test_random_bot_is_deterministic() {
        let state = make_test_state();
        let mut a = RandomBot::new(11);
        let mut b = RandomBot::new(11);
        for turn in 0..20 {
            assert_eq!(a.decide(&state, turn).unwrap(), b.decide(&state, turn).unwrap());
        }
    }

    #[test]
    fn test_bot_kind_names() {
        for kind in BotKind::ALL {
            assert_eq!(kind.as_str().parse::<BotKind>().unwrap(), kind);
        }
        assert_eq!("Attack_Weakest".parse::<BotKind>().unwrap(), BotKind::AttackWeakest);
        assert!("nobody".parse::<BotKind>().is_err());
        assert_eq!(BotKind::Conqueror.build(0).name(), "Conqueror");
        assert_eq!(BotKind::Random.build(0).name(), "RandomBot");
    }
}
