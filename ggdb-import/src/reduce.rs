//! Fold raw property rows into per-game release groups.
//!
//! Every row carries one game piece (`pieceType` plus a JSON value) for one
//! release. Pieces are collected per release and merged into a
//! [`ReleaseAttributes`] once all rows are in, so the outcome does not depend
//! on the order the cursor yields rows in.

use std::collections::BTreeMap;

use ggdb_catalog::{RawRow, Release, ReleaseAttributes};
use serde_json::{Map, Value};

/// Releases of each game, keyed by game id then release key.
pub type ReleaseGroups = BTreeMap<String, BTreeMap<String, Release>>;

/// Output of one reduction pass.
#[derive(Debug, Default)]
pub struct Reduced {
    pub groups: ReleaseGroups,
    pub rows_read: u64,
    /// Rows whose JSON value failed to parse.
    pub rows_discarded: u64,
}

// ── Attribute dispatch ──────────────────────────────────────────────────────

type Setter = fn(&mut ReleaseAttributes, &Value);

/// Attribute key → setter. Keys not listed here are ignored.
const SETTERS: &[(&str, Setter)] = &[
    ("title", set_title),
    ("sortingTitle", set_sorting_title),
    ("originalTitle", set_original_title),
    ("originalSortingTitle", set_original_sorting_title),
    ("verticalCover", set_vertical_cover),
    ("genres", set_genres),
    ("themes", set_themes),
    ("summary", set_summary),
    ("releaseDate", set_release_date),
    ("screenshots", set_screenshots),
];

fn set_title(a: &mut ReleaseAttributes, v: &Value) {
    a.title = string_value(v);
}

fn set_sorting_title(a: &mut ReleaseAttributes, v: &Value) {
    a.sorting_title = string_value(v);
}

fn set_original_title(a: &mut ReleaseAttributes, v: &Value) {
    a.original_title = string_value(v);
}

fn set_original_sorting_title(a: &mut ReleaseAttributes, v: &Value) {
    a.original_sorting_title = string_value(v);
}

fn set_vertical_cover(a: &mut ReleaseAttributes, v: &Value) {
    a.vertical_cover = string_value(v);
}

fn set_genres(a: &mut ReleaseAttributes, v: &Value) {
    a.genres = string_list(v);
}

fn set_themes(a: &mut ReleaseAttributes, v: &Value) {
    a.themes = string_list(v);
}

fn set_summary(a: &mut ReleaseAttributes, v: &Value) {
    a.summary = string_value(v);
}

fn set_release_date(a: &mut ReleaseAttributes, v: &Value) {
    a.release_date = match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
}

fn set_screenshots(a: &mut ReleaseAttributes, v: &Value) {
    a.screenshots = string_list(v);
}

fn string_value(v: &Value) -> Option<String> {
    v.as_str().map(str::to_string)
}

fn string_list(v: &Value) -> Option<Vec<String>> {
    let items = v.as_array()?;
    Some(
        items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
    )
}

/// Merge one decoded piece object into `attrs`.
///
/// For a `title` piece the object's `title` field is the release title. For
/// any other piece type the object's `title` field is renamed to the piece
/// type, which is how `originalTitle`, `sortingTitle` and
/// `originalSortingTitle` arrive.
pub fn merge_piece(attrs: &mut ReleaseAttributes, piece_type: &str, object: &Map<String, Value>) {
    for (key, value) in object {
        let key = if key == "title" && piece_type != "title" {
            piece_type
        } else {
            key.as_str()
        };
        if let Some((_, set)) = SETTERS.iter().find(|(name, _)| *name == key) {
            set(attrs, value);
        }
    }
}

// ── Reducer ─────────────────────────────────────────────────────────────────

struct ReleaseBucket {
    release: Release,
    /// Last value seen per piece type.
    pieces: BTreeMap<String, Map<String, Value>>,
}

/// Streaming row reducer. Feed rows with [`RowReducer::push`], then call
/// [`RowReducer::finish`].
#[derive(Default)]
pub struct RowReducer {
    buckets: BTreeMap<String, BTreeMap<String, ReleaseBucket>>,
    rows_read: u64,
    rows_discarded: u64,
}

impl RowReducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, row: RawRow) {
        self.rows_read += 1;

        let value: Value = match serde_json::from_str(&row.piece_value_json) {
            Ok(v) => v,
            Err(e) => {
                log::warn!(
                    "Discarding '{}' piece of {}: {}",
                    row.piece_type,
                    row.release_key,
                    e
                );
                self.rows_discarded += 1;
                return;
            }
        };

        let releases = self.buckets.entry(row.game_id).or_default();
        let bucket = releases
            .entry(row.release_key.clone())
            .or_insert_with(|| ReleaseBucket {
                release: Release::new(&row.release_key, &row.platform, None),
                pieces: BTreeMap::new(),
            });
        if bucket.release.added_date.is_none() {
            bucket.release.added_date = row.added_date;
        }

        match value {
            Value::Object(object) => {
                bucket.pieces.insert(row.piece_type, object);
            }
            _ => log::debug!(
                "Ignoring non-object '{}' piece of {}",
                row.piece_type,
                row.release_key
            ),
        }
    }

    /// Merge collected pieces into each release.
    ///
    /// `original*` pieces are merged before the rest, so a store-curated piece
    /// (`meta`) wins over its original counterpart (`originalMeta`) when both
    /// carry the same attribute.
    pub fn finish(self) -> Reduced {
        let groups = self
            .buckets
            .into_iter()
            .map(|(game_id, releases)| {
                let releases = releases
                    .into_iter()
                    .map(|(key, bucket)| (key, build_release(bucket)))
                    .collect();
                (game_id, releases)
            })
            .collect();

        Reduced {
            groups,
            rows_read: self.rows_read,
            rows_discarded: self.rows_discarded,
        }
    }
}

fn build_release(bucket: ReleaseBucket) -> Release {
    let ReleaseBucket {
        mut release,
        pieces,
    } = bucket;
    let (originals, curated): (Vec<_>, Vec<_>) = pieces
        .iter()
        .partition(|(piece_type, _)| piece_type.starts_with("original"));
    for (piece_type, object) in originals.into_iter().chain(curated) {
        merge_piece(&mut release.attributes, piece_type, object);
    }
    release
}

/// Reduce a whole row cursor.
pub fn reduce_rows<I>(rows: I) -> Reduced
where
    I: IntoIterator<Item = RawRow>,
{
    let mut reducer = RowReducer::new();
    for row in rows {
        reducer.push(row);
    }
    reducer.finish()
}
