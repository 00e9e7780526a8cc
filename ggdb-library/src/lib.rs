//! The in-memory game library: search index, filtering, ordering and the
//! persisted cache it is loaded from and saved to.

pub mod cache;
pub mod index;
pub mod library;
pub mod settings;
pub mod sort;
pub mod store;

pub use cache::{CacheCodec, CacheError, ENRICHMENT_SLOT, GAMES_SLOT};
pub use index::{filter_tokens, is_visible, refresh_text_index, text_index};
pub use library::Library;
pub use settings::{CacheSettings, Settings, SettingsError, settings_path};
pub use sort::{SortKey, compare, shuffle_games, sort_games};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreError, default_store_dir};
