//! Map text format
//!
//! One entity per line, `#` starts a comment:
//!
//! ```text
//! P x y owner ships growth
//! F owner ships source destination total_trip_length turns_remaining
//! ```
//!
//! Planet ids are assigned in the order `P` lines appear.

use std::fmt;
use std::str::FromStr;

use crate::game::{Fleet, GameState, Owner, Planet};

// ============================================================================
// ERRORS
// ============================================================================

/// A map line that could not be turned into an entity
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("map line {line}: {kind}")]
pub struct MapParseError {
    /// 1-based line number
    pub line: usize,
    pub kind: MapErrorKind,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapErrorKind {
    #[error("unknown entity '{0}'")]
    UnknownEntity(String),

    #[error("'{entity}' line needs {expected} fields, found {found}")]
    FieldCount {
        entity: char,
        expected: usize,
        found: usize,
    },

    #[error("invalid number '{0}'")]
    InvalidNumber(String),

    #[error("owner must be 0, 1 or 2, got {0}")]
    InvalidOwner(String),

    #[error("fleet cannot be neutral")]
    NeutralFleet,

    #[error("fleet carries no ships")]
    EmptyFleet,

    #[error("fleet references unknown planet {0}")]
    UnknownPlanet(usize),

    #[error("fleet source and destination are both planet {0}")]
    SameEndpoints(usize),

    #[error("fleet has {remaining} turns remaining on a {total} turn trip")]
    RemainingExceedsTrip { remaining: u32, total: u32 },
}

const PLANET_FIELDS: usize = 5;
const FLEET_FIELDS: usize = 6;

// ============================================================================
// PARSING
// ============================================================================

/// Parse a map into a fresh game state (turn 0)
pub fn parse_map(text: &str) -> Result<GameState, MapParseError> {
    let mut planets = Vec::new();
    let mut fleets: Vec<(usize, Fleet)> = Vec::new();

    for (index, raw) in text.lines().enumerate() {
        let line = index + 1;
        let content = raw.split('#').next().unwrap_or_default();
        let mut tokens = content.split_whitespace();
        let Some(entity) = tokens.next() else {
            continue;
        };
        let fields: Vec<&str> = tokens.collect();
        let fail = |kind| MapParseError { line, kind };

        match entity {
            "P" => {
                expect_fields('P', PLANET_FIELDS, &fields).map_err(fail)?;
                let planet = parse_planet(planets.len(), &fields).map_err(fail)?;
                planets.push(planet);
            }
            "F" => {
                expect_fields('F', FLEET_FIELDS, &fields).map_err(fail)?;
                let fleet = parse_fleet(&fields).map_err(fail)?;
                fleets.push((line, fleet));
            }
            other => return Err(fail(MapErrorKind::UnknownEntity(other.to_string()))),
        }
    }

    // Fleets may only be checked against planets once every P line is read
    for (line, fleet) in &fleets {
        for id in [fleet.source, fleet.destination] {
            if id >= planets.len() {
                return Err(MapParseError {
                    line: *line,
                    kind: MapErrorKind::UnknownPlanet(id),
                });
            }
        }
    }

    Ok(GameState::new(
        planets,
        fleets.into_iter().map(|(_, fleet)| fleet).collect(),
    ))
}

fn expect_fields(entity: char, expected: usize, fields: &[&str]) -> Result<(), MapErrorKind> {
    if fields.len() == expected {
        Ok(())
    } else {
        Err(MapErrorKind::FieldCount {
            entity,
            expected,
            found: fields.len(),
        })
    }
}

fn parse_planet(id: usize, fields: &[&str]) -> Result<Planet, MapErrorKind> {
    let x = number::<f64>(fields[0])?;
    let y = number::<f64>(fields[1])?;
    if !x.is_finite() || !y.is_finite() {
        return Err(MapErrorKind::InvalidNumber(format!("{} {}", fields[0], fields[1])));
    }
    let owner = owner(fields[2])?;
    let ships = number::<u64>(fields[3])?;
    let growth_rate = number::<u32>(fields[4])?;
    Ok(Planet::new(id, owner, ships, growth_rate, x, y))
}

fn parse_fleet(fields: &[&str]) -> Result<Fleet, MapErrorKind> {
    let owner = owner(fields[0])?
        .side()
        .ok_or(MapErrorKind::NeutralFleet)?;
    let ships = number::<u64>(fields[1])?;
    if ships == 0 {
        return Err(MapErrorKind::EmptyFleet);
    }
    let source = number::<usize>(fields[2])?;
    let destination = number::<usize>(fields[3])?;
    if source == destination {
        return Err(MapErrorKind::SameEndpoints(source));
    }
    let total_trip_length = number::<u32>(fields[4])?;
    let turns_remaining = number::<u32>(fields[5])?;
    if turns_remaining > total_trip_length {
        return Err(MapErrorKind::RemainingExceedsTrip {
            remaining: turns_remaining,
            total: total_trip_length,
        });
    }
    Ok(Fleet {
        owner,
        ships,
        source,
        destination,
        total_trip_length,
        turns_remaining,
    })
}

fn number<T: FromStr>(token: &str) -> Result<T, MapErrorKind> {
    token
        .parse()
        .map_err(|_| MapErrorKind::InvalidNumber(token.to_string()))
}

fn owner(token: &str) -> Result<Owner, MapErrorKind> {
    token
        .parse::<u8>()
        .ok()
        .and_then(Owner::from_code)
        .ok_or_else(|| MapErrorKind::InvalidOwner(token.to_string()))
}

impl FromStr for GameState {
    type Err = MapParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_map(s)
    }
}

// ============================================================================
// SERIALIZATION
// ============================================================================

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for planet in &self.planets {
            writeln!(
                f,
                "P {} {} {} {} {}",
                planet.x,
                planet.y,
                planet.owner.code(),
                planet.ships,
                planet.growth_rate
            )?;
        }
        if !self.fleets.is_empty() {
            writeln!(f)?;
        }
        for fleet in &self.fleets {
            writeln!(
                f,
                "F {} {} {} {} {} {}",
                fleet.owner.owner().code(),
                fleet.ships,
                fleet.source,
                fleet.destination,
                fleet.total_trip_length,
                fleet.turns_remaining
            )?;
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
