//! Two-tier tile matching for the search bar.

use crate::catalog::Tile;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchTier {
    Prefix,
    Substring,
}

/// Tier of `name` against an already lower-cased needle.
fn tier(name: &str, needle: &str) -> Option<MatchTier> {
    let name = name.to_lowercase();
    if name.starts_with(needle) {
        Some(MatchTier::Prefix)
    } else if name.contains(needle) {
        Some(MatchTier::Substring)
    } else {
        None
    }
}

/// Catalog indices of the tiles matching `query`, prefix matches first and
/// substring matches after, each group in catalog order, at most
/// `max_results` long.
///
/// The empty query is a prefix of every name, so it yields the head of the
/// catalog.
pub fn match_tiles(tiles: &[Tile], query: &str, max_results: usize) -> Vec<usize> {
    let needle = query.to_lowercase();
    let tiers: Vec<Option<MatchTier>> = tiles.iter().map(|tile| tier(&tile.name, &needle)).collect();
    let in_tier = |wanted: MatchTier| {
        tiers
            .iter()
            .enumerate()
            .filter(move |(_, found)| **found == Some(wanted))
            .map(|(index, _)| index)
    };
    in_tier(MatchTier::Prefix)
        .chain(in_tier(MatchTier::Substring))
        .take(max_results)
        .collect()
}

/// Whether any tile name contains `query`, ignoring case.
pub fn has_any_match(tiles: &[Tile], query: &str) -> bool {
    let needle = query.to_lowercase();
    tiles
        .iter()
        .any(|tile| tile.name.to_lowercase().contains(&needle))
}
