//! Orderings for the game list.

use std::cmp::Ordering;

use ggdb_catalog::{EnrichmentMap, Game};
use rand::Rng;
use rand::seq::SliceRandom;

/// Named orderings. Every one ends with a sort-title ascending tie-break.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    #[default]
    Name,
    /// Newest release year first, unknown years last.
    Year,
    /// Most recently added first.
    Added,
    Rating,
    RatingCount,
}

fn by_name(a: &Game, b: &Game) -> Ordering {
    a.sort_title().cmp(b.sort_title())
}

fn rating_of(enrichment: &EnrichmentMap, game: &Game) -> f64 {
    enrichment
        .get(&game.game_id)
        .and_then(|r| r.rating)
        .unwrap_or(0.0)
}

fn rating_count_of(enrichment: &EnrichmentMap, game: &Game) -> u32 {
    enrichment
        .get(&game.game_id)
        .and_then(|r| r.rating_count)
        .unwrap_or(0)
}

/// Compare two games under `key`.
pub fn compare(a: &Game, b: &Game, key: SortKey, enrichment: &EnrichmentMap) -> Ordering {
    let primary = match key {
        SortKey::Name => Ordering::Equal,
        SortKey::Year => b.year.unwrap_or(0).cmp(&a.year.unwrap_or(0)),
        SortKey::Added => b.added_date.cmp(&a.added_date),
        SortKey::Rating => rating_of(enrichment, b).total_cmp(&rating_of(enrichment, a)),
        SortKey::RatingCount => rating_count_of(enrichment, b).cmp(&rating_count_of(enrichment, a)),
    };
    primary.then_with(|| by_name(a, b))
}

/// Stable sort in place.
pub fn sort_games(games: &mut [Game], key: SortKey, enrichment: &EnrichmentMap) {
    games.sort_by(|a, b| compare(a, b, key, enrichment));
}

/// Uniform random permutation (Fisher–Yates).
pub fn shuffle_games<R: Rng + ?Sized>(games: &mut [Game], rng: &mut R) {
    games.shuffle(rng);
}
