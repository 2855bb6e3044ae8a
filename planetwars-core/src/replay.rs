//! Replay trace for external viewers
//!
//! Header: `x,y,owner,ships,growth` per planet joined by `:`, coordinates always
//! written with a decimal point (`0.0`, `1.5`).
//! Snapshot: `owner.ships` per planet, then `owner.ships.source.destination.total.remaining`
//! per fleet, all joined by `,`. The display string is `header|snapshot:snapshot:...`.

use serde::Serialize;

use crate::game::GameState;

/// Initial map plus one snapshot per resolved turn
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Replay {
    pub header: String,
    pub turns: Vec<String>,
}

impl Replay {
    /// Start a trace from the initial map
    pub fn new(initial: &GameState) -> Self {
        Self {
            header: map_header(initial),
            turns: Vec::new(),
        }
    }

    /// Append a snapshot of the state after a turn
    pub fn record(&mut self, state: &GameState) {
        self.turns.push(turn_snapshot(state));
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// `header|snapshot:snapshot:...`
    pub fn to_display_string(&self) -> String {
        format!("{}|{}", self.header, self.turns.join(":"))
    }
}

pub fn map_header(state: &GameState) -> String {
    state
        .planets
        .iter()
        .map(|p| format!("{:?},{:?},{},{},{}", p.x, p.y, p.owner.code(), p.ships, p.growth_rate))
        .collect::<Vec<_>>()
        .join(":")
}

pub fn turn_snapshot(state: &GameState) -> String {
    let planets = state
        .planets
        .iter()
        .map(|p| format!("{}.{}", p.owner.code(), p.ships));
    let fleets = state.fleets.iter().map(|f| {
        format!(
            "{}.{}.{}.{}.{}.{}",
            f.owner.owner().code(),
            f.ships,
            f.source,
            f.destination,
            f.total_trip_length,
            f.turns_remaining
        )
    });
    planets.chain(fleets).collect::<Vec<_>>().join(",")
}
