//! Game library data model types.
//!
//! This crate defines the raw row, release, canonical game and enrichment
//! record shapes without any storage or network dependencies. The import,
//! library and scraper crates all speak in these types.

pub mod enrichment;
pub mod types;

pub use enrichment::{EnrichmentMap, EnrichmentRecord, seconds_to_hours};
pub use types::*;
