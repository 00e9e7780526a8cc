//! Display fields of the canonical game.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike};
use ggdb_catalog::{Game, Release};

use crate::select::Selection;

const STEAM_PREFIX: &str = "steam_";

/// Build the canonical game from its selected releases.
pub fn derive_game(selection: &Selection) -> Game {
    let primary = &selection.primary;
    let attrs = &primary.attributes;

    let title = primary.display_title().unwrap_or_default().to_string();
    let sorting_title = primary
        .display_sorting_title()
        .filter(|s| *s != title)
        .map(str::to_string);

    Game {
        game_id: selection.game_id.clone(),
        title,
        sorting_title,
        vertical_cover: attrs.vertical_cover.clone().unwrap_or_default(),
        genres: attrs.genres.clone().unwrap_or_default(),
        themes: attrs.themes.clone().unwrap_or_default(),
        summary: attrs.summary.clone().unwrap_or_default(),
        year: attrs.release_date.and_then(release_year),
        platforms: platforms(selection.releases()),
        steam_app_id: steam_app_id(selection.releases()),
        added_date: selection.added_date.clone(),
        screenshots: attrs
            .screenshots
            .iter()
            .flatten()
            .map(|s| expand_screenshot(s))
            .collect(),
        ..Game::default()
    }
}

/// Calendar year (UTC) of an epoch timestamp in seconds.
///
/// Zero, unrepresentable, and pre-1971 timestamps have no year.
pub fn release_year(epoch_seconds: i64) -> Option<i32> {
    if epoch_seconds == 0 {
        return None;
    }
    let year = DateTime::from_timestamp(epoch_seconds, 0)?.year();
    (year > 1970).then_some(year)
}

pub fn platforms<'a>(releases: impl IntoIterator<Item = &'a Release>) -> BTreeSet<String> {
    releases.into_iter().map(|r| r.platform.clone()).collect()
}

/// App id of the first Steam release, in selection order.
pub fn steam_app_id<'a>(releases: impl IntoIterator<Item = &'a Release>) -> Option<String> {
    releases.into_iter().find_map(|r| {
        let id = r.release_key.strip_prefix(STEAM_PREFIX)?;
        (!id.is_empty() && id.bytes().all(|b| b.is_ascii_digit())).then(|| id.to_string())
    })
}

/// Fill the placeholders of a screenshot URL template.
pub fn expand_screenshot(template: &str) -> String {
    template.replace("{formatter}", "").replace("{ext}", "jpg")
}
