//! Primary release selection.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use ggdb_catalog::Release;

/// The releases of one game that will be shown, primary first.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub game_id: String,
    pub primary: Release,
    pub alternates: Vec<Release>,
    /// Latest non-empty added date across all selected releases, or empty.
    pub added_date: String,
}

impl Selection {
    /// Primary followed by alternates, in selection order.
    pub fn releases(&self) -> impl Iterator<Item = &Release> {
        std::iter::once(&self.primary).chain(&self.alternates)
    }
}

/// Untitled releases sort after every titled one.
fn title_length(release: &Release) -> usize {
    release
        .display_title()
        .map(|t| t.chars().count())
        .unwrap_or(usize::MAX)
}

/// Shortest title first, then platform, then release key.
///
/// The release key tie-break keeps the choice independent of row order.
pub fn compare_releases(a: &Release, b: &Release) -> Ordering {
    title_length(a)
        .cmp(&title_length(b))
        .then_with(|| a.platform.cmp(&b.platform))
        .then_with(|| a.release_key.cmp(&b.release_key))
}

/// Pick the primary release of a game.
///
/// Releases without a vertical cover are dropped; `None` if nothing is left.
pub fn select_releases(game_id: &str, releases: BTreeMap<String, Release>) -> Option<Selection> {
    let mut covered: Vec<Release> = releases.into_values().filter(Release::has_cover).collect();
    if covered.is_empty() {
        return None;
    }
    covered.sort_by(compare_releases);

    let added_date = covered
        .iter()
        .filter_map(|r| r.added_date.as_deref())
        .filter(|d| !d.is_empty())
        .max()
        .unwrap_or_default()
        .to_string();

    let mut releases = covered.into_iter();
    let primary = releases.next()?;
    Some(Selection {
        game_id: game_id.to_string(),
        primary,
        alternates: releases.collect(),
        added_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release(key: &str, title: &str, cover: bool, added: Option<&str>) -> (String, Release) {
        let platform = key.split('_').next().unwrap_or_default();
        let mut r = Release::new(key, platform, added);
        r.attributes.title = Some(title.to_string());
        if cover {
            r.attributes.vertical_cover = Some(format!("https://img/{key}.jpg"));
        }
        (key.to_string(), r)
    }

    #[test]
    fn shortest_title_is_primary() {
        let releases = BTreeMap::from([
            release("steam_1", "Foo: Windows Edition", true, None),
            release("gog_1", "Foo", true, None),
        ]);
        let selection = select_releases("g1", releases).unwrap();
        assert_eq!(selection.primary.release_key, "gog_1");
        assert_eq!(selection.alternates.len(), 1);
        assert_eq!(selection.alternates[0].release_key, "steam_1");
    }

    #[test]
    fn equal_lengths_fall_back_to_platform_then_key() {
        let releases = BTreeMap::from([
            release("xboxone_2", "Bar", true, None),
            release("epic_9", "Baz", true, None),
            release("epic_3", "Qux", true, None),
        ]);
        let selection = select_releases("g1", releases).unwrap();
        let keys: Vec<&str> = selection.releases().map(|r| r.release_key.as_str()).collect();
        assert_eq!(keys, vec!["epic_3", "epic_9", "xboxone_2"]);
    }

    #[test]
    fn title_length_counts_characters() {
        // "Ōkami" is 5 characters but 6 bytes.
        let releases = BTreeMap::from([
            release("steam_1", "Ōkami", true, None),
            release("gog_1", "Okami!", true, None),
        ]);
        let selection = select_releases("g1", releases).unwrap();
        assert_eq!(selection.primary.release_key, "steam_1");
    }

    #[test]
    fn uncovered_releases_are_dropped() {
        let releases = BTreeMap::from([
            release("gog_1", "Foo", false, None),
            release("steam_1", "Foo Deluxe", true, None),
        ]);
        let selection = select_releases("g1", releases).unwrap();
        assert_eq!(selection.primary.release_key, "steam_1");
        assert!(selection.alternates.is_empty());
    }

    #[test]
    fn game_without_covers_is_dropped() {
        let releases = BTreeMap::from([release("gog_1", "Foo", false, None)]);
        assert_eq!(select_releases("g1", releases), None);
    }

    #[test]
    fn added_date_is_latest_across_releases() {
        let releases = BTreeMap::from([
            release("gog_1", "Foo", true, Some("2021-01-01")),
            release("steam_1", "Foo Deluxe", true, Some("2022-06-01")),
            release("epic_1", "Foo GOTY", true, Some("")),
        ]);
        let selection = select_releases("g1", releases).unwrap();
        assert_eq!(selection.added_date, "2022-06-01");

        let undated = BTreeMap::from([release("gog_1", "Foo", true, None)]);
        assert_eq!(select_releases("g1", undated).unwrap().added_date, "");
    }
}
