use ggdb_catalog::{EnrichmentMap, EnrichmentRecord, Game};
use ggdb_library::*;
use tempfile::TempDir;

fn games() -> Vec<Game> {
    vec![
        Game {
            game_id: "g1".to_string(),
            title: "Foo".to_string(),
            vertical_cover: "https://images.gog.com/foo.jpg".to_string(),
            genres: vec!["Puzzle".to_string()],
            year: Some(2019),
            platforms: ["gog", "steam"].iter().map(|s| s.to_string()).collect(),
            steam_app_id: Some("1".to_string()),
            added_date: "2022-01-01".to_string(),
            igdb_steam_attempted: true,
            igdb_alt_attempted: true,
            text_index: "stale".to_string(),
            ..Default::default()
        },
        Game {
            game_id: "g2".to_string(),
            title: "The Bar".to_string(),
            sorting_title: Some("Bar".to_string()),
            vertical_cover: "https://images.gog.com/bar.jpg".to_string(),
            platforms: ["epic"].iter().map(|s| s.to_string()).collect(),
            summary: "Ünïcödé summary ™".to_string(),
            ..Default::default()
        },
    ]
}

fn stripped(games: &[Game]) -> Vec<Game> {
    games.iter().map(Game::without_transient).collect()
}

#[test]
fn games_round_trip_plain_and_compressed() {
    for compress in [false, true] {
        let codec = CacheCodec::new(compress);
        let text = codec.encode(&games()).unwrap();
        assert_eq!(is_plain(&text), !compress);

        let back: Vec<Game> = codec.decode(&text).unwrap();
        assert_eq!(back, stripped(&games()));
    }
}

fn is_plain(text: &str) -> bool {
    text.starts_with('[')
}

#[test]
fn enrichment_round_trips_through_file_store() {
    let tmp = TempDir::new().unwrap();
    let mut store = FileStore::new(tmp.path());
    let codec = CacheCodec::new(true);

    let mut map = EnrichmentMap::new();
    map.insert(
        "g1".to_string(),
        EnrichmentRecord {
            rating: Some(80.25),
            rating_count: Some(42),
            keywords: Some(vec!["puzzle".to_string()]),
            normal_hours: Some(12.0),
            fast_hours: Some(8.5),
            complete_hours: None,
        },
    );

    codec.save_slot(&mut store, ENRICHMENT_SLOT, &map).unwrap();
    let back: EnrichmentMap = codec.load_slot(&mut store, ENRICHMENT_SLOT);
    assert_eq!(back, map);
}

#[test]
fn library_reopen_rebuilds_transient_state() {
    let tmp = TempDir::new().unwrap();
    let settings = Settings {
        cache: CacheSettings {
            compress: false,
            quota_bytes: None,
            dir: Some(tmp.path().to_path_buf()),
        },
    };

    let mut library = Library::open(settings.file_store(), settings.codec());
    library.replace_games(games());

    let reopened = Library::open(settings.file_store(), settings.codec());
    let g1 = &reopened.games()[0];
    assert!(g1.igdb_steam_attempted);
    assert!(!g1.igdb_alt_attempted);
    assert_eq!(g1.text_index, "foo\tpuzzle\t");
}
