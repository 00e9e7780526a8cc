//! Galaxy library import and IGDB enrichment.
//!
//! Turns raw Galaxy property rows into canonical [`ggdb_catalog::Game`]s and
//! enriches them with IGDB ratings, keywords and time-to-beat data.

pub mod alt_title;
pub mod enrich;
pub mod fields;
pub mod galaxy_import;
pub mod igdb;
pub mod progress;
pub mod reduce;
pub mod select;

pub use alt_title::{AltTitleStage, PromptRequest, run_alt_title_stage};
pub use enrich::{
    BATCH_SIZE, EnrichError, Stage, StageReport, enrich_batch, enrich_library, steam_stage,
    title_stage,
};
pub use galaxy_import::{ImportError, ImportStats, import_galaxy_db, import_games, import_into_library};
pub use igdb::{connect, refresh_enrichment, remember_verified_credentials};
pub use progress::{ImportProgress, LogProgress, SilentProgress};
