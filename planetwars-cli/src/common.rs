//! Shared helpers for commands - map loading and roster building
//!
//! Level 4 - Utilities

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rustc_hash::FxHashMap;

use planetwars_core::{BotKind, GameState};
use planetwars_tournament::Contender;

/// Seed used when none is given on the command line
const DEFAULT_SEED: u64 = 42;

/// Read and parse one map file
pub fn load_map(path: &Path) -> Result<GameState> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read map: {}", path.display()))?;
    text.parse::<GameState>()
        .with_context(|| format!("Failed to parse map: {}", path.display()))
}

/// Read and parse every map file in order
pub fn load_maps(paths: &[PathBuf]) -> Result<Vec<GameState>> {
    paths.iter().map(|path| load_map(path)).collect()
}

/// Turn bot names into contenders
///
/// Repeated bots get `#2`, `#3`... suffixes and distinct seeds.
pub fn build_roster(kinds: &[BotKind], seed: Option<u64>) -> Vec<Contender> {
    let base_seed = seed.unwrap_or(DEFAULT_SEED);
    let mut seen: FxHashMap<BotKind, usize> = FxHashMap::default();

    kinds
        .iter()
        .enumerate()
        .map(|(position, &kind)| {
            let copies = seen.entry(kind).or_insert(0);
            *copies += 1;
            let contender = Contender::builtin(kind, base_seed.wrapping_add(position as u64));
            if *copies > 1 {
                let name = format!("{}#{}", contender.name(), copies);
                contender.with_name(name)
            } else {
                contender
            }
        })
        .collect()
}
