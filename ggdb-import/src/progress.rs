//! Import progress reporting.

use ggdb_catalog::Game;

use crate::galaxy_import::ImportStats;

/// Receives updates while a Galaxy library is canonicalized.
pub trait ImportProgress {
    /// A game was canonicalized. `current` counts games seen so far,
    /// including dropped ones.
    fn on_game(&self, current: usize, total: usize, game: &Game);

    /// A game was left out because none of its releases has a cover.
    fn on_game_dropped(&self, game_id: &str);

    /// A phase started (e.g., "Reducing release rows").
    fn on_phase(&self, message: &str);

    fn on_complete(&self, stats: &ImportStats);
}

/// Discards all updates.
pub struct SilentProgress;

impl ImportProgress for SilentProgress {
    fn on_game(&self, _current: usize, _total: usize, _game: &Game) {}
    fn on_game_dropped(&self, _game_id: &str) {}
    fn on_phase(&self, _message: &str) {}
    fn on_complete(&self, _stats: &ImportStats) {}
}

/// Logs through the `log` facade.
pub struct LogProgress;

impl ImportProgress for LogProgress {
    fn on_game(&self, current: usize, total: usize, game: &Game) {
        if current.is_multiple_of(250) || current == total {
            log::info!("  [{}/{}] {}", current, total, game.title);
        }
    }

    fn on_game_dropped(&self, game_id: &str) {
        log::debug!("Dropping {}: no release has a cover", game_id);
    }

    fn on_phase(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_complete(&self, stats: &ImportStats) {
        log::info!(
            "Imported {} games ({} without cover, {} unreadable rows)",
            stats.games_emitted,
            stats.games_without_cover,
            stats.rows_discarded
        );
    }
}
