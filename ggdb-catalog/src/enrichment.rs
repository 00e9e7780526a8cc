//! Externally sourced rating, keyword and playtime data.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Enrichment data for one game, joined to it by `game_id` at read time.
///
/// Only created after a successful external match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normal_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fast_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complete_hours: Option<f64>,
}

/// All enrichment records, keyed by game id.
pub type EnrichmentMap = BTreeMap<String, EnrichmentRecord>;

/// Convert a time-to-beat in seconds to hours.
///
/// Rounded to tenths of an hour; past 10 hours the tenths are dropped.
pub fn seconds_to_hours(seconds: u64) -> f64 {
    let tenths = (seconds as f64 / 360.0).round();
    if tenths > 100.0 {
        (tenths / 10.0).round()
    } else {
        tenths / 10.0
    }
}
