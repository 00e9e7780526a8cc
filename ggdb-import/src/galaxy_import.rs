//! Import a Galaxy library into canonical games.
//!
//! Rows are reduced into releases, each game's primary release is selected,
//! and the display fields are derived from the selection. The resulting list
//! is ordered by sorting title, ready to replace a [`Library`]'s games.

use std::path::Path;

use ggdb_catalog::{Game, RawRow};
use ggdb_db::{DbError, open_galaxy_db, read_release_rows};
use ggdb_library::{KeyValueStore, Library};
use thiserror::Error;

use crate::fields::derive_game;
use crate::progress::ImportProgress;
use crate::reduce::reduce_rows;
use crate::select::select_releases;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Galaxy database error: {0}")]
    Db(#[from] DbError),
}

/// Statistics from a single import.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportStats {
    pub rows_read: u64,
    /// Rows whose piece value was not valid JSON.
    pub rows_discarded: u64,
    pub games_seen: u64,
    /// Games dropped because none of their releases has a cover.
    pub games_without_cover: u64,
    pub games_emitted: u64,
}

/// Canonicalize a row cursor into games sorted by sorting title.
pub fn import_games<I>(rows: I, progress: Option<&dyn ImportProgress>) -> (Vec<Game>, ImportStats)
where
    I: IntoIterator<Item = RawRow>,
{
    if let Some(p) = progress {
        p.on_phase("Reducing release rows");
    }
    let reduced = reduce_rows(rows);

    let mut stats = ImportStats {
        rows_read: reduced.rows_read,
        rows_discarded: reduced.rows_discarded,
        games_seen: reduced.groups.len() as u64,
        ..ImportStats::default()
    };

    if let Some(p) = progress {
        p.on_phase("Selecting primary releases");
    }
    let total = reduced.groups.len();
    let mut games = Vec::with_capacity(total);
    for (i, (game_id, releases)) in reduced.groups.into_iter().enumerate() {
        match select_releases(&game_id, releases) {
            Some(selection) => {
                let game = derive_game(&selection);
                if let Some(p) = progress {
                    p.on_game(i + 1, total, &game);
                }
                games.push(game);
            }
            None => {
                if let Some(p) = progress {
                    p.on_game_dropped(&game_id);
                }
                stats.games_without_cover += 1;
            }
        }
    }

    games.sort_by(|a, b| a.sort_title().cmp(b.sort_title()));
    stats.games_emitted = games.len() as u64;

    if let Some(p) = progress {
        p.on_complete(&stats);
    }

    (games, stats)
}

/// Read and canonicalize a Galaxy database file.
pub fn import_galaxy_db(
    path: &Path,
    progress: Option<&dyn ImportProgress>,
) -> Result<(Vec<Game>, ImportStats), ImportError> {
    if let Some(p) = progress {
        p.on_phase(&format!("Reading {}", path.display()));
    }
    let conn = open_galaxy_db(path)?;
    let rows = read_release_rows(&conn)?;
    Ok(import_games(rows, progress))
}

/// Import a Galaxy database into `library`, replacing its games and
/// persisting them. Enrichment records are kept.
pub fn import_into_library<S: KeyValueStore>(
    library: &mut Library<S>,
    path: &Path,
    progress: Option<&dyn ImportProgress>,
) -> Result<ImportStats, ImportError> {
    let (games, stats) = import_galaxy_db(path, progress)?;
    library.replace_games(games);
    Ok(stats)
}
