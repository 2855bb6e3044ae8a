//! Tournament execution - round-robin and single elimination formats
//!
//! Level 1 - Orchestration and Level 2 - Phases

use planetwars_core::{parse_map, EngineConfig, EngineError, GameState};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::config::{TournamentConfig, TournamentFormat};
use crate::error::TournamentError;
use crate::game_runner::{GameRunner, MatchResult, Pairing, Winner};
use crate::roster::Contender;
use crate::standings::{compute_standings, StandingsEntry};

/// One knockout round on one map
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct BracketRound {
    /// (side A, side B) names, in play order
    pub pairs: Vec<(String, String)>,
    /// Names moving on, first-seen order
    pub advancing: Vec<String>,
}

/// Single elimination history for one map
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Bracket {
    pub map_index: usize,
    pub rounds: Vec<BracketRound>,
    /// Survivors of the last round (several when it was all ties)
    pub champions: Vec<String>,
}

/// Result of a tournament
#[derive(Clone, Debug, Serialize)]
pub struct TournamentResult {
    /// Tournament format used
    pub format: TournamentFormat,
    /// Final standings sorted by points (descending)
    pub standings: Vec<StandingsEntry>,
    /// Every match in battle id order
    pub matches: Vec<MatchResult>,
    /// Knockout history per map (empty for round robin)
    pub brackets: Vec<Bracket>,
}

impl TournamentResult {
    /// Get winner (top standing)
    pub fn winner(&self) -> Option<&StandingsEntry> {
        self.standings.first()
    }

    /// Get top N performers
    pub fn top_n(&self, n: usize) -> &[StandingsEntry] {
        let n = n.min(self.standings.len());
        &self.standings[..n]
    }
}

// ============================================================================
// Level 1 - Orchestration
// ============================================================================

/// Run a tournament (Level 1 orchestration)
///
/// # Arguments
/// * `contenders` - Participants in the tournament
/// * `maps` - Maps every pairing is played on
/// * `config` - Tournament configuration
///
/// # Returns
/// Tournament results with final standings
pub fn run_tournament(
    contenders: &[Contender],
    maps: &[GameState],
    config: &TournamentConfig,
) -> Result<TournamentResult, TournamentError> {
    if contenders.len() < 2 {
        return Err(TournamentError::TooFewContenders(contenders.len()));
    }
    if maps.is_empty() {
        return Err(TournamentError::NoMaps);
    }

    tracing::info!(
        contenders = contenders.len(),
        maps = maps.len(),
        format = ?config.format,
        "starting tournament"
    );
    match config.format {
        TournamentFormat::RoundRobin => run_round_robin(contenders, maps, config),
        TournamentFormat::SingleElimination => run_single_elimination(contenders, maps, config),
    }
}

/// Parse map texts, reporting which one failed
pub fn parse_maps<S: AsRef<str>>(texts: &[S]) -> Result<Vec<GameState>, TournamentError> {
    texts
        .iter()
        .enumerate()
        .map(|(index, text)| {
            parse_map(text.as_ref()).map_err(|source| TournamentError::Map { index, source })
        })
        .collect()
}

// ============================================================================
// Level 2 - Phases
// ============================================================================

/// Run a round-robin tournament (Level 2 phase)
fn run_round_robin(
    contenders: &[Contender],
    maps: &[GameState],
    config: &TournamentConfig,
) -> Result<TournamentResult, TournamentError> {
    let pairings = generate_round_robin_pairings(contenders.len(), maps.len());
    let matches = execute_pairings(&pairings, contenders, maps, &config.engine, config.parallel)?;
    let standings = compute_standings(contenders, &matches);

    Ok(TournamentResult {
        format: TournamentFormat::RoundRobin,
        standings,
        matches,
        brackets: Vec::new(),
    })
}

/// Run a single elimination bracket on every map (Level 2 phase)
fn run_single_elimination(
    contenders: &[Contender],
    maps: &[GameState],
    config: &TournamentConfig,
) -> Result<TournamentResult, TournamentError> {
    let mut rng = match config.seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let names = |indices: &[usize]| -> Vec<String> {
        indices.iter().map(|&i| contenders[i].name().to_string()).collect()
    };

    let mut matches: Vec<MatchResult> = Vec::new();
    let mut brackets = Vec::with_capacity(maps.len());
    for map_index in 0..maps.len() {
        let mut alive: Vec<usize> = (0..contenders.len()).collect();
        alive.shuffle(&mut rng);
        let mut rounds = Vec::new();

        while alive.len() > 1 {
            let first_id = matches.len() as u32 + 1;
            let pairings: Vec<Pairing> = generate_elimination_pairs(&alive)
                .into_iter()
                .enumerate()
                .map(|(offset, (first, second))| Pairing {
                    battle_id: first_id + offset as u32,
                    map_index,
                    first,
                    second,
                })
                .collect();
            let results =
                execute_pairings(&pairings, contenders, maps, &config.engine, config.parallel)?;
            let next = advancing(&results);

            rounds.push(BracketRound {
                pairs: pairings
                    .iter()
                    .map(|p| {
                        (
                            contenders[p.first].name().to_string(),
                            contenders[p.second].name().to_string(),
                        )
                    })
                    .collect(),
                advancing: names(&next),
            });
            matches.extend(results);
            tracing::info!(
                map = map_index,
                round = rounds.len(),
                remaining = next.len(),
                "round finished"
            );

            // Nothing was eliminated, more rounds would replay the same ties
            let stalled = next.len() == alive.len();
            alive = next;
            if stalled {
                break;
            }
        }

        brackets.push(Bracket {
            map_index,
            rounds,
            champions: names(&alive),
        });
    }

    let standings = compute_standings(contenders, &matches);
    Ok(TournamentResult {
        format: TournamentFormat::SingleElimination,
        standings,
        matches,
        brackets,
    })
}

// ============================================================================
// Level 3 - Steps
// ============================================================================

/// Every ordered pair on every map, battle ids from 1
fn generate_round_robin_pairings(n: usize, maps: usize) -> Vec<Pairing> {
    let mut pairings = Vec::new();
    for map_index in 0..maps {
        for first in 0..n {
            for second in 0..n {
                if first != second {
                    pairings.push(Pairing {
                        battle_id: pairings.len() as u32 + 1,
                        map_index,
                        first,
                        second,
                    });
                }
            }
        }
    }
    pairings
}

/// Consecutive pairs plus the first against the last
fn generate_elimination_pairs(alive: &[usize]) -> Vec<(usize, usize)> {
    let mut pairs: Vec<(usize, usize)> = alive.windows(2).map(|w| (w[0], w[1])).collect();
    // With two entrants the wrap pair would repeat the only match
    if let (Some(&first), Some(&last)) = (alive.first(), alive.last()) {
        if alive.len() > 2 {
            pairs.push((first, last));
        }
    }
    pairs
}

/// Winners advance, ties advance both; duplicates keep first position
fn advancing(results: &[MatchResult]) -> Vec<usize> {
    let mut next = Vec::new();
    for result in results {
        match result.winner {
            Winner::First => next.push(result.first_index),
            Winner::Second => next.push(result.second_index),
            Winner::Tie => {
                next.push(result.first_index);
                next.push(result.second_index);
            }
        }
    }
    let mut seen = FxHashSet::default();
    next.retain(|index| seen.insert(*index));
    next
}

/// Play pairings, in parallel if requested, keeping scheduling order
pub(crate) fn execute_pairings(
    pairings: &[Pairing],
    contenders: &[Contender],
    maps: &[GameState],
    engine: &EngineConfig,
    parallel: bool,
) -> Result<Vec<MatchResult>, EngineError> {
    let runner = GameRunner::new(engine.clone());
    let play = |pairing: &Pairing| {
        runner.play(
            *pairing,
            &maps[pairing.map_index],
            &contenders[pairing.first],
            &contenders[pairing.second],
        )
    };

    if parallel {
        pairings.par_iter().map(play).collect()
    } else {
        pairings.iter().map(play).collect()
    }
}
