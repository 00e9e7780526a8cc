//! Data model types for the game library.
//!
//! Raw rows come out of the Galaxy database, get folded into releases, and
//! releases get merged into one canonical [`Game`] per title.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ── Raw Row ─────────────────────────────────────────────────────────────────

/// One property row read from the library database.
///
/// Rows are not retained once the reducer has folded them into releases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub game_id: String,
    pub release_key: String,
    pub platform: String,
    pub added_date: Option<String>,
    /// Category tag of the piece, e.g. "title", "meta", "originalImages".
    pub piece_type: String,
    pub piece_value_json: String,
}

impl RawRow {
    pub fn new(
        game_id: impl Into<String>,
        release_key: impl Into<String>,
        platform: impl Into<String>,
        added_date: Option<&str>,
        piece_type: impl Into<String>,
        piece_value_json: impl Into<String>,
    ) -> Self {
        Self {
            game_id: game_id.into(),
            release_key: release_key.into(),
            platform: platform.into(),
            added_date: added_date.map(str::to_string),
            piece_type: piece_type.into(),
            piece_value_json: piece_value_json.into(),
        }
    }
}

// ── Release ─────────────────────────────────────────────────────────────────

/// Metadata assembled from every piece seen for one release.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseAttributes {
    pub title: Option<String>,
    pub sorting_title: Option<String>,
    pub original_title: Option<String>,
    pub original_sorting_title: Option<String>,
    pub vertical_cover: Option<String>,
    pub genres: Option<Vec<String>>,
    pub themes: Option<Vec<String>>,
    pub summary: Option<String>,
    /// Release date in epoch seconds.
    pub release_date: Option<i64>,
    /// Screenshot URL templates containing `{formatter}` and `{ext}` tokens.
    pub screenshots: Option<Vec<String>>,
}

/// One platform-specific listing of a game within the library.
#[derive(Debug, Clone, PartialEq)]
pub struct Release {
    pub release_key: String,
    pub platform: String,
    pub added_date: Option<String>,
    pub attributes: ReleaseAttributes,
}

impl Release {
    pub fn new(release_key: &str, platform: &str, added_date: Option<&str>) -> Self {
        Self {
            release_key: release_key.to_string(),
            platform: platform.to_string(),
            added_date: added_date.map(str::to_string),
            attributes: ReleaseAttributes::default(),
        }
    }

    /// The displayed title: `title`, falling back to `originalTitle`.
    pub fn display_title(&self) -> Option<&str> {
        non_empty(self.attributes.title.as_deref())
            .or_else(|| non_empty(self.attributes.original_title.as_deref()))
    }

    /// The sorting title: `sortingTitle`, falling back to `originalSortingTitle`.
    pub fn display_sorting_title(&self) -> Option<&str> {
        non_empty(self.attributes.sorting_title.as_deref())
            .or_else(|| non_empty(self.attributes.original_sorting_title.as_deref()))
    }

    /// Whether the release has a vertical cover and is therefore shown in the library.
    pub fn has_cover(&self) -> bool {
        non_empty(self.attributes.vertical_cover.as_deref()).is_some()
    }
}

fn non_empty(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

// ── Game ────────────────────────────────────────────────────────────────────

/// The canonical record for one title across all of its releases.
///
/// Serialized in camelCase. `text_index` and `alt_attempted` are transient
/// and never written to the cache.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub game_id: String,
    pub title: String,
    /// Present only when it differs from `title`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorting_title: Option<String>,
    #[serde(default)]
    pub vertical_cover: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(default)]
    pub platforms: BTreeSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steam_app_id: Option<String>,
    #[serde(default)]
    pub added_date: String,
    #[serde(default)]
    pub screenshots: Vec<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub igdb_steam_attempted: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub igdb_title_attempted: bool,
    /// Cleared on every reload, so a skipped game is offered again next session.
    #[serde(skip)]
    pub igdb_alt_attempted: bool,
    /// Lowercase search blob, rebuilt after load and after enrichment.
    #[serde(skip)]
    pub text_index: String,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Game {
    /// `sortingTitle || title`, the final tie-break of every ordering.
    pub fn sort_title(&self) -> &str {
        match self.sorting_title.as_deref() {
            Some(s) if !s.is_empty() => s,
            _ => &self.title,
        }
    }

    /// Copy with the transient fields reset to their defaults.
    pub fn without_transient(&self) -> Game {
        Game {
            igdb_alt_attempted: false,
            text_index: String::new(),
            ..self.clone()
        }
    }
}
