//! Entity model: planets, fleets, orders and the game state

use serde::{Deserialize, Serialize};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Planet identifier, assigned by position in the map text
pub type PlanetId = usize;

/// One of the two competing sides (never neutral)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    First,
    Second,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    pub fn owner(self) -> Owner {
        match self {
            Side::First => Owner::First,
            Side::Second => Owner::Second,
        }
    }
}

/// Owner of a planet
///
/// From an agent's point of view `First` is always "mine" and `Second` is
/// always "enemy", see [`GameState::relabeled`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    Neutral = 0,
    First = 1,
    Second = 2,
}

impl Owner {
    /// Alias used by agents: planets and fleets they own
    pub const MINE: Owner = Owner::First;
    /// Alias used by agents: the opposing side
    pub const ENEMY: Owner = Owner::Second;

    /// Wire code used by the map and replay formats
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Owner::Neutral),
            1 => Some(Owner::First),
            2 => Some(Owner::Second),
            _ => None,
        }
    }

    pub fn side(self) -> Option<Side> {
        match self {
            Owner::Neutral => None,
            Owner::First => Some(Side::First),
            Owner::Second => Some(Side::Second),
        }
    }

    /// Swap the two sides, neutral stays neutral
    pub fn swapped(self) -> Self {
        match self {
            Owner::Neutral => Owner::Neutral,
            Owner::First => Owner::Second,
            Owner::Second => Owner::First,
        }
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl From<Side> for Owner {
    fn from(side: Side) -> Self {
        side.owner()
    }
}

/// A planet on the map
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Planet {
    pub id: PlanetId,
    pub owner: Owner,
    pub ships: u64,
    pub growth_rate: u32,
    pub x: f64,
    pub y: f64,
}

impl Planet {
    pub fn new(id: PlanetId, owner: Owner, ships: u64, growth_rate: u32, x: f64, y: f64) -> Self {
        Self {
            id,
            owner,
            ships,
            growth_rate,
            x,
            y,
        }
    }

    /// Travel time in turns to another planet (fleet speed is 1 per turn)
    pub fn distance_to(&self, other: &Planet) -> u32 {
        distance(self, other)
    }
}

/// Ceiling of the euclidean distance between two planets
pub fn distance(a: &Planet, b: &Planet) -> u32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt().ceil() as u32
}

/// A fleet in flight
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fleet {
    pub owner: Side,
    pub ships: u64,
    pub source: PlanetId,
    pub destination: PlanetId,
    pub total_trip_length: u32,
    pub turns_remaining: u32,
}

impl Fleet {
    pub fn has_arrived(&self) -> bool {
        self.turns_remaining == 0
    }
}

/// Request to send `ships` from `source` to `destination`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    pub source: PlanetId,
    pub destination: PlanetId,
    pub ships: u64,
}

impl Order {
    pub fn new(source: PlanetId, destination: PlanetId, ships: u64) -> Self {
        Self {
            source,
            destination,
            ships,
        }
    }

    /// Build an order straight from planet references
    pub fn between(source: &Planet, destination: &Planet, ships: u64) -> Self {
        Self::new(source.id, destination.id, ships)
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Planets, fleets and the elapsed turn counter (clone to mutate)
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub planets: Vec<Planet>,
    pub fleets: Vec<Fleet>,
    pub turn: u32,
}

impl GameState {
    pub fn new(planets: Vec<Planet>, fleets: Vec<Fleet>) -> Self {
        Self {
            planets,
            fleets,
            turn: 0,
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn planet(&self, id: PlanetId) -> Option<&Planet> {
        self.planets.get(id)
    }

    pub(crate) fn planet_mut(&mut self, id: PlanetId) -> Option<&mut Planet> {
        self.planets.get_mut(id)
    }

    pub fn planets_owned_by(&self, owner: Owner) -> impl Iterator<Item = &Planet> + '_ {
        self.planets.iter().filter(move |p| p.owner == owner)
    }

    pub fn fleets_owned_by(&self, owner: Owner) -> impl Iterator<Item = &Fleet> + '_ {
        self.fleets.iter().filter(move |f| f.owner.owner() == owner)
    }

    /// Ships on owned planets plus ships in owned fleets (the score)
    pub fn total_ships(&self, owner: Owner) -> u64 {
        let on_planets: u64 = self.planets_owned_by(owner).map(|p| p.ships).sum();
        let in_flight: u64 = self.fleets_owned_by(owner).map(|f| f.ships).sum();
        on_planets + in_flight
    }

    /// Total growth per turn of everything a side owns
    pub fn total_growth(&self, owner: Owner) -> u64 {
        self.planets_owned_by(owner).map(|p| p.growth_rate as u64).sum()
    }

    pub fn distance(&self, source: PlanetId, destination: PlanetId) -> Option<u32> {
        Some(distance(self.planet(source)?, self.planet(destination)?))
    }

    // ========================================================================
    // ORDERS
    // ========================================================================

    /// Whether `order` may be executed by `side` against this state
    pub fn is_legal_order(&self, order: &Order, side: Side) -> bool {
        let Some(source) = self.planet(order.source) else {
            return false;
        };
        if self.planet(order.destination).is_none() {
            return false;
        }
        order.source != order.destination
            && source.owner == side.owner()
            && source.ships >= order.ships
            && order.ships > 0
    }

    // ========================================================================
    // PERSPECTIVE
    // ========================================================================

    /// Copy of this state as seen by `viewer`: its assets are always `First`
    pub fn relabeled(&self, viewer: Side) -> GameState {
        let mut view = self.clone();
        if viewer == Side::Second {
            for planet in &mut view.planets {
                planet.owner = planet.owner.swapped();
            }
            for fleet in &mut view.fleets {
                fleet.owner = fleet.owner.opponent();
            }
        }
        view
    }
}

// ============================================================================
// TESTS
// ============================================================================
