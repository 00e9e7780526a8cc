//! Apicalypse query construction and title matching keys.

use crate::types::STEAM_CATEGORY;

pub const GAMES_RESOURCE: &str = "games";
pub const TIME_TO_BEATS_RESOURCE: &str = "game_time_to_beats";

/// IGDB's maximum page size.
const MAX_LIMIT: usize = 500;

const GAME_FIELDS: &str =
    "fields name, rating, rating_count, keywords.name, external_games.uid, external_games.category;";

/// Quote a string for an Apicalypse query.
fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
}

/// Games listed on Steam under any of `app_ids`.
pub fn steam_ids_query(app_ids: &[&str]) -> String {
    let ids: Vec<String> = app_ids.iter().map(|id| quote(id)).collect();
    format!(
        "{GAME_FIELDS} where external_games.category = {STEAM_CATEGORY} & external_games.uid = ({}); limit {MAX_LIMIT};",
        ids.join(",")
    )
}

/// Games whose name case-insensitively equals any of `keys`.
pub fn titles_query(keys: &[String]) -> String {
    let clauses: Vec<String> = keys.iter().map(|k| format!("name ~ {}", quote(k))).collect();
    format!(
        "{GAME_FIELDS} where {}; limit {MAX_LIMIT};",
        clauses.join(" | ")
    )
}

/// Best single search hit for a free-form title.
pub fn search_query(title: &str) -> String {
    format!("search {}; {GAME_FIELDS} limit 1;", quote(title))
}

/// Time-to-beat records of the given IGDB game ids.
pub fn time_to_beat_query(game_ids: &[u64]) -> String {
    let ids: Vec<String> = game_ids.iter().map(u64::to_string).collect();
    format!(
        "fields game_id, hastily, normally, completely; where game_id = ({}); limit {MAX_LIMIT};",
        ids.join(",")
    )
}

/// Lowercase title with trademark glyphs and a trailing period removed.
///
/// Storefronts decorate titles ("Foo™", "Foo Inc.") where IGDB does not;
/// matches are joined on this form.
pub fn normalize_title(title: &str) -> String {
    let stripped: String = title
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '™' | '®'))
        .collect();
    let trimmed = stripped.trim();
    trimmed.strip_suffix('.').unwrap_or(trimmed).trim_end().to_string()
}

/// Up to two lookup keys: the raw lowercase title, then the normalized
/// title if it differs.
pub fn title_lookup_keys(title: &str) -> Vec<String> {
    let mut keys = Vec::new();
    let raw = title.to_lowercase();
    if !raw.trim().is_empty() {
        keys.push(raw.clone());
    }
    let normalized = normalize_title(title);
    if !normalized.is_empty() && normalized != raw {
        keys.push(normalized);
    }
    keys
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_marks_and_trailing_period() {
        assert_eq!(normalize_title("Foo™"), "foo");
        assert_eq!(normalize_title("Bar® Deluxe."), "bar deluxe");
        assert_eq!(normalize_title("S.T.A.L.K.E.R."), "s.t.a.l.k.e.r");
        assert_eq!(normalize_title("Plain"), "plain");
    }

    #[test]
    fn lookup_keys_deduplicate() {
        assert_eq!(title_lookup_keys("Plain"), vec!["plain"]);
        assert_eq!(title_lookup_keys("Foo™"), vec!["foo™", "foo"]);
        assert!(title_lookup_keys("  ").is_empty());
    }

    #[test]
    fn quotes_are_escaped() {
        assert_eq!(
            search_query(r#"Say "Hi""#),
            format!(r#"search "Say \"Hi\""; {GAME_FIELDS} limit 1;"#)
        );
    }

    #[test]
    fn steam_query_lists_ids() {
        let q = steam_ids_query(&["1", "620"]);
        assert!(q.contains(r#"external_games.uid = ("1","620")"#));
        assert!(q.contains("external_games.category = 1"));
        assert!(q.ends_with("limit 500;"));
    }

    #[test]
    fn titles_query_ors_keys() {
        let q = titles_query(&["foo™".to_string(), "foo".to_string()]);
        assert!(q.contains(r#"where name ~ "foo™" | name ~ "foo";"#));
    }

    #[test]
    fn time_to_beat_query_lists_ids() {
        assert_eq!(
            time_to_beat_query(&[3, 4]),
            "fields game_id, hastily, normally, completely; where game_id = (3,4); limit 500;"
        );
    }
}
