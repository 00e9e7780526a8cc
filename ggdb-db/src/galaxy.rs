//! Galaxy database queries.

use std::path::Path;

use ggdb_catalog::RawRow;
use rusqlite::{Connection, OpenFlags, Row};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Not a Galaxy library database: missing table '{0}'")]
    MissingTable(&'static str),
}

/// Tables the release query reads from.
const REQUIRED_TABLES: &[&str] = &[
    "GamePieces",
    "GamePieceTypes",
    "ReleaseProperties",
    "PlatformConnections",
    "ProductPurchaseDates",
];

/// Pieces of every release that is visible in the library and belongs to a
/// connected platform (or to GOG itself, which has no connection row).
///
/// A release key is `<platform>_<id>`; the prefix must match exactly, so
/// `xbox` does not claim `xboxone_*` releases.
const RELEASE_ROWS_SQL: &str = "
    SELECT CAST(rp.gameId AS TEXT),
           p.releaseKey,
           ifnull(pc.platform, 'gog') AS platform,
           CAST(ppd.purchaseDate AS TEXT),
           t.type,
           p.value
    FROM GamePieces p
    JOIN ReleaseProperties rp ON p.releaseKey = rp.releaseKey
        AND rp.isVisibleInLibrary = 1
    JOIN GamePieceTypes t ON p.gamePieceTypeId = t.id
    LEFT JOIN PlatformConnections pc
        ON substr(p.releaseKey, 1, length(pc.platform) + 1) = pc.platform || '_'
        AND pc.connectionState = 'Connected'
    LEFT JOIN ProductPurchaseDates ppd ON ppd.gameReleaseKey = p.releaseKey
    WHERE pc.platform IS NOT NULL OR substr(p.releaseKey, 1, 4) = 'gog_'";

/// Open a Galaxy database file without write access.
pub fn open_galaxy_db(path: &Path) -> Result<Connection, DbError> {
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    check_tables(&conn)?;
    Ok(conn)
}

fn check_tables(conn: &Connection) -> Result<(), DbError> {
    for table in REQUIRED_TABLES {
        let exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
            [table],
            |row| row.get(0),
        )?;
        if !exists {
            return Err(DbError::MissingTable(table));
        }
    }
    Ok(())
}

/// Read every release piece row. Row order is whatever SQLite returns.
pub fn read_release_rows(conn: &Connection) -> Result<Vec<RawRow>, DbError> {
    let mut stmt = conn.prepare(RELEASE_ROWS_SQL)?;
    let rows = stmt.query_map([], row_to_raw)?;
    let rows = rows.collect::<Result<Vec<_>, _>>()?;
    log::debug!("Read {} release piece rows", rows.len());
    Ok(rows)
}

fn row_to_raw(row: &Row) -> rusqlite::Result<RawRow> {
    Ok(RawRow {
        game_id: row.get(0)?,
        release_key: row.get(1)?,
        platform: row.get(2)?,
        added_date: row.get(3)?,
        piece_type: row.get(4)?,
        piece_value_json: row.get(5)?,
    })
}
