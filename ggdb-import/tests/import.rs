use std::cell::RefCell;

use ggdb_catalog::{Game, RawRow};
use ggdb_import::*;
use ggdb_library::{CacheCodec, Library, MemoryStore};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rusqlite::{Connection, params};
use tempfile::TempDir;

const COVER: &str = r#"{"verticalCover":"https://img/{formatter}cover.{ext}"}"#;

fn g1_rows() -> Vec<RawRow> {
    vec![
        RawRow::new("g1", "gog_1", "gog", Some("2021-05-01"), "title", r#"{"title":"Foo"}"#),
        RawRow::new("g1", "gog_1", "gog", Some("2021-05-01"), "originalImages", COVER),
        RawRow::new(
            "g1",
            "gog_1",
            "gog",
            Some("2021-05-01"),
            "meta",
            r#"{"releaseDate":1431993600,"genres":["Puzzle"]}"#,
        ),
        RawRow::new(
            "g1",
            "steam_1",
            "steam",
            Some("2022-01-10"),
            "title",
            r#"{"title":"Foo: Windows Edition"}"#,
        ),
        RawRow::new("g1", "steam_1", "steam", Some("2022-01-10"), "originalImages", COVER),
        RawRow::new(
            "g1",
            "steam_1",
            "steam",
            Some("2022-01-10"),
            "media",
            r#"{"screenshots":["https://img/s1{formatter}.{ext}"]}"#,
        ),
    ]
}

fn other_rows() -> Vec<RawRow> {
    vec![
        // Covered, sorts before "Foo" by its sorting title.
        RawRow::new("g2", "epic_2", "epic", None, "title", r#"{"title":"The Bar"}"#),
        RawRow::new("g2", "epic_2", "epic", None, "sortingTitle", r#"{"title":"Bar, The"}"#),
        RawRow::new("g2", "epic_2", "epic", None, "originalImages", COVER),
        // No cover anywhere.
        RawRow::new("g3", "gog_3", "gog", None, "title", r#"{"title":"Uncovered"}"#),
        RawRow::new("g3", "gog_3", "gog", None, "summary", "not json"),
    ]
}

#[test]
fn g1_prefers_shorter_title() {
    let (games, stats) = import_games(g1_rows(), None);
    assert_eq!(games.len(), 1);
    let game = &games[0];

    assert_eq!(game.game_id, "g1");
    assert_eq!(game.title, "Foo");
    assert_eq!(game.platforms.iter().collect::<Vec<_>>(), vec!["gog", "steam"]);
    assert_eq!(game.steam_app_id.as_deref(), Some("1"));
    assert_eq!(game.year, Some(2015));
    assert_eq!(game.genres, vec!["Puzzle"]);
    assert_eq!(game.vertical_cover, "https://img/cover.jpg");
    assert_eq!(game.added_date, "2022-01-10");
    // Screenshots come from the primary release only.
    assert!(game.screenshots.is_empty());

    assert_eq!(stats.rows_read, 6);
    assert_eq!(stats.games_emitted, 1);
}

#[test]
fn uncovered_games_are_dropped_and_counted() {
    let rows: Vec<RawRow> = g1_rows().into_iter().chain(other_rows()).collect();
    let (games, stats) = import_games(rows, Some(&SilentProgress));

    let ids: Vec<&str> = games.iter().map(|g| g.game_id.as_str()).collect();
    assert_eq!(ids, vec!["g2", "g1"], "sorted by sorting title");
    assert!(games.iter().all(|g| !g.vertical_cover.is_empty()));
    assert_eq!(games[0].sorting_title.as_deref(), Some("Bar, The"));

    assert_eq!(
        stats,
        ImportStats {
            rows_read: 11,
            rows_discarded: 1,
            games_seen: 3,
            games_without_cover: 1,
            games_emitted: 2,
        }
    );
}

/// Records which games were emitted and dropped.
#[derive(Default)]
struct RecordingProgress {
    emitted: RefCell<Vec<String>>,
    dropped: RefCell<Vec<String>>,
    completed: RefCell<Option<ImportStats>>,
}

impl ImportProgress for RecordingProgress {
    fn on_game(&self, _current: usize, _total: usize, game: &Game) {
        self.emitted.borrow_mut().push(game.game_id.clone());
    }

    fn on_game_dropped(&self, game_id: &str) {
        self.dropped.borrow_mut().push(game_id.to_string());
    }

    fn on_phase(&self, _message: &str) {}

    fn on_complete(&self, stats: &ImportStats) {
        *self.completed.borrow_mut() = Some(stats.clone());
    }
}

#[test]
fn progress_reports_dropped_games() {
    let rows: Vec<RawRow> = g1_rows().into_iter().chain(other_rows()).collect();
    let progress = RecordingProgress::default();
    let (_, stats) = import_games(rows, Some(&progress));

    assert_eq!(*progress.dropped.borrow(), vec!["g3"]);
    let mut emitted = progress.emitted.borrow().clone();
    emitted.sort();
    assert_eq!(emitted, vec!["g1", "g2"]);
    assert_eq!(progress.completed.borrow().as_ref(), Some(&stats));
}

#[test]
fn row_order_does_not_change_the_result() {
    let rows: Vec<RawRow> = g1_rows().into_iter().chain(other_rows()).collect();
    let (expected, _) = import_games(rows.clone(), None);

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..10 {
        let mut shuffled = rows.clone();
        shuffled.shuffle(&mut rng);
        let (games, _) = import_games(shuffled, None);
        assert_eq!(games, expected);
    }
}

// ── Galaxy database ─────────────────────────────────────────────────────────

fn create_galaxy_db(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("galaxy-2.0.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        "
        CREATE TABLE GamePieceTypes (id INTEGER PRIMARY KEY, type TEXT NOT NULL);
        CREATE TABLE GamePieces (releaseKey TEXT, gamePieceTypeId INTEGER, value TEXT);
        CREATE TABLE ReleaseProperties (releaseKey TEXT PRIMARY KEY, isVisibleInLibrary INTEGER, gameId TEXT);
        CREATE TABLE PlatformConnections (platform TEXT, connectionState TEXT);
        CREATE TABLE ProductPurchaseDates (gameReleaseKey TEXT, purchaseDate TEXT);
        INSERT INTO GamePieceTypes VALUES (1, 'title'), (2, 'originalImages');
        INSERT INTO PlatformConnections VALUES ('steam', 'Connected');
        ",
    )
    .unwrap();

    for (key, game, title) in [("gog_1", "g1", "Foo"), ("steam_1", "g1", "Foo: Windows Edition")] {
        conn.execute(
            "INSERT INTO ReleaseProperties VALUES (?1, 1, ?2)",
            params![key, game],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO GamePieces VALUES (?1, 1, ?2)",
            params![key, format!(r#"{{"title":"{title}"}}"#)],
        )
        .unwrap();
        conn.execute("INSERT INTO GamePieces VALUES (?1, 2, ?2)", params![key, COVER])
            .unwrap();
    }
    path
}

#[test]
fn imports_galaxy_database_into_library() {
    let tmp = TempDir::new().unwrap();
    let path = create_galaxy_db(&tmp);

    let mut library = Library::open(MemoryStore::new(), CacheCodec::new(true));
    let stats = import_into_library(&mut library, &path, Some(&LogProgress)).unwrap();
    assert_eq!(stats.games_emitted, 1);
    assert_eq!(library.games()[0].title, "Foo");
    assert_eq!(library.games()[0].steam_app_id.as_deref(), Some("1"));

    // The import was persisted.
    let reopened = Library::open(library.store().clone(), CacheCodec::new(false));
    assert_eq!(reopened.games(), library.games());
}

#[test]
fn missing_tables_are_an_import_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("other.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch("CREATE TABLE unrelated (id INTEGER)")
        .unwrap();

    let result = import_galaxy_db(&path, None);
    assert!(matches!(result, Err(ImportError::Db(_))));
}
