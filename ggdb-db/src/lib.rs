//! Read access to the GOG Galaxy 2.0 library database.
//!
//! Produces the raw property rows the import pipeline reduces into games.
//! The database is only ever opened read-only.

pub mod galaxy;

pub use galaxy::{DbError, open_galaxy_db, read_release_rows};
