//! Standings - fold match results into per-contender aggregates
//!
//! Level 3 - Steps

use planetwars_core::Side;
use serde::Serialize;

use crate::game_runner::MatchResult;
use crate::roster::Contender;

/// Aggregate record of one contender
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StandingsEntry {
    /// Dense rank starting at 1 (0 until ranked)
    pub rank: usize,
    /// Position in the roster
    pub index: usize,
    pub name: String,
    pub battles: u32,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    /// Wins + 0.5 * ties
    pub points: f32,
    pub total_score: u64,
    pub total_opponent_score: u64,
    pub mean_score: f64,
    pub mean_opponent_score: f64,
    /// Matches that ended with the opponent at zero ships
    pub opponents_wiped_out: u32,
    /// Matches that ended with this contender at zero ships
    pub wiped_out: u32,
    pub wins_as_first: u32,
    pub wins_as_second: u32,
}

impl StandingsEntry {
    /// Win rate
    pub fn win_rate(&self) -> f32 {
        if self.battles == 0 {
            0.0
        } else {
            self.wins as f32 / self.battles as f32
        }
    }
}

/// Tally every match a roster entry took part in, on either side
pub fn tally(index: usize, name: &str, results: &[MatchResult]) -> StandingsEntry {
    let mut entry = StandingsEntry {
        rank: 0,
        index,
        name: name.to_string(),
        battles: 0,
        wins: 0,
        losses: 0,
        ties: 0,
        points: 0.0,
        total_score: 0,
        total_opponent_score: 0,
        mean_score: 0.0,
        mean_opponent_score: 0.0,
        opponents_wiped_out: 0,
        wiped_out: 0,
        wins_as_first: 0,
        wins_as_second: 0,
    };

    for result in results {
        let Some(side) = result.side_of(index) else {
            continue;
        };
        let own = result.score(side);
        let opponent = result.score(side.opponent());

        entry.battles += 1;
        entry.points += result.points(side);
        entry.total_score += own;
        entry.total_opponent_score += opponent;
        if opponent == 0 {
            entry.opponents_wiped_out += 1;
        }
        if own == 0 {
            entry.wiped_out += 1;
        }

        if result.is_tie() {
            entry.ties += 1;
        } else if result.winner_index() == Some(index) {
            entry.wins += 1;
            match side {
                Side::First => entry.wins_as_first += 1,
                Side::Second => entry.wins_as_second += 1,
            }
        } else {
            entry.losses += 1;
        }
    }

    if entry.battles > 0 {
        entry.mean_score = entry.total_score as f64 / entry.battles as f64;
        entry.mean_opponent_score = entry.total_opponent_score as f64 / entry.battles as f64;
    }
    entry
}

/// Compute ranked standings for a roster
///
/// Sorted by points (descending); equal points keep roster order.
pub fn compute_standings(roster: &[Contender], results: &[MatchResult]) -> Vec<StandingsEntry> {
    let mut standings: Vec<StandingsEntry> = roster
        .iter()
        .enumerate()
        .map(|(index, contender)| tally(index, contender.name(), results))
        .collect();

    standings.sort_by(|a, b| {
        b.points
            .partial_cmp(&a.points)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    for (position, entry) in standings.iter_mut().enumerate() {
        entry.rank = position + 1;
    }
    standings
}
