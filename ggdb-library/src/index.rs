//! Search blob and visibility filter.

use std::collections::BTreeSet;

use ggdb_catalog::{EnrichmentRecord, Game};

/// Build the lowercase, tab-joined search blob for a game.
///
/// Covers the title, genres, themes, summary and any enrichment keywords.
pub fn text_index(game: &Game, record: Option<&EnrichmentRecord>) -> String {
    let keywords = record
        .and_then(|r| r.keywords.as_deref())
        .unwrap_or_default();

    let parts: Vec<&str> = std::iter::once(game.title.as_str())
        .chain(game.genres.iter().map(String::as_str))
        .chain(game.themes.iter().map(String::as_str))
        .chain(std::iter::once(game.summary.as_str()))
        .chain(keywords.iter().map(String::as_str))
        .collect();

    parts.join("\t").to_lowercase()
}

/// Rebuild `game.text_index` in place.
pub fn refresh_text_index(game: &mut Game, record: Option<&EnrichmentRecord>) {
    game.text_index = text_index(game, record);
}

/// Split filter text into lowercase whitespace-separated tokens.
pub fn filter_tokens(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_lowercase).collect()
}

/// Whether a game passes the platform and text filters.
///
/// Hidden when all of its platforms are hidden. Otherwise every token must
/// appear somewhere in the text index.
pub fn is_visible(game: &Game, hidden_platforms: &BTreeSet<String>, tokens: &[String]) -> bool {
    if game.platforms.iter().all(|p| hidden_platforms.contains(p)) {
        return false;
    }
    tokens
        .iter()
        .all(|token| game.text_index.contains(token.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game() -> Game {
        Game {
            game_id: "g1".to_string(),
            title: "Disco Elysium".to_string(),
            genres: vec!["Role-playing (RPG)".to_string()],
            themes: vec!["Detective".to_string()],
            summary: "A Detective RPG.".to_string(),
            platforms: ["gog", "steam"].iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn index_joins_fields_lowercase() {
        let g = game();
        assert_eq!(
            text_index(&g, None),
            "disco elysium\trole-playing (rpg)\tdetective\ta detective rpg."
        );
    }

    #[test]
    fn index_appends_keywords() {
        let record = EnrichmentRecord {
            keywords: Some(vec!["Amnesia".to_string(), "Noir".to_string()]),
            ..Default::default()
        };
        assert!(text_index(&game(), Some(&record)).ends_with("\tamnesia\tnoir"));
    }

    #[test]
    fn tokens_are_anded() {
        let mut g = game();
        refresh_text_index(&mut g, None);
        let hidden = BTreeSet::new();

        assert!(is_visible(&g, &hidden, &filter_tokens("DISCO  rpg")));
        assert!(!is_visible(&g, &hidden, &filter_tokens("disco shooter")));
        assert!(is_visible(&g, &hidden, &filter_tokens("   ")));
    }

    #[test]
    fn hidden_only_when_every_platform_hidden() {
        let mut g = game();
        refresh_text_index(&mut g, None);

        let mut hidden = BTreeSet::from(["steam".to_string()]);
        assert!(is_visible(&g, &hidden, &[]));

        hidden.insert("gog".to_string());
        assert!(!is_visible(&g, &hidden, &[]));
        assert!(!is_visible(&g, &hidden, &filter_tokens("disco")));
    }
}
