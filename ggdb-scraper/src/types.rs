use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// IGDB external source category for Steam.
pub const STEAM_CATEGORY: u32 = 1;

/// A game record from the `games` endpoint, with expanded keyword and
/// external-game fields.
#[derive(Debug, Clone, Deserialize)]
pub struct IgdbGame {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub rating_count: Option<u32>,
    #[serde(default)]
    pub keywords: Vec<NamedRef>,
    #[serde(default)]
    pub external_games: Vec<ExternalGame>,
}

impl IgdbGame {
    /// Steam app ids this game is listed under.
    pub fn steam_app_ids(&self) -> impl Iterator<Item = &str> {
        self.external_games
            .iter()
            .filter(|e| e.category == Some(STEAM_CATEGORY))
            .filter_map(|e| e.uid.as_deref())
    }

    pub fn keyword_names(&self) -> Vec<String> {
        self.keywords
            .iter()
            .filter(|k| !k.name.is_empty())
            .map(|k| k.name.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalGame {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub category: Option<u32>,
}

/// A record from the `game_time_to_beats` endpoint. Times are in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeToBeat {
    pub game_id: u64,
    #[serde(default)]
    pub hastily: Option<u64>,
    #[serde(default)]
    pub normally: Option<u64>,
    #[serde(default)]
    pub completely: Option<u64>,
}

/// Decode raw query records into typed records.
pub fn parse_records<T: DeserializeOwned>(
    records: Vec<serde_json::Value>,
) -> Result<Vec<T>, ApiError> {
    records
        .into_iter()
        .map(|r| serde_json::from_value(r).map_err(ApiError::from))
        .collect()
}
