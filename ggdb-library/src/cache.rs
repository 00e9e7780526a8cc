//! Encoding of the game list and enrichment map into store slots.
//!
//! A slot holds either plain JSON or base64-encoded zstd of that JSON. Plain
//! JSON always starts with `[` (game list) or `{` (enrichment map), and the
//! compressed form never does, so the first character tells them apart.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::store::{KeyValueStore, StoreError};

/// Slot holding the canonical game list.
pub const GAMES_SLOT: &str = "ggdb_games";
/// Slot holding the `gameId → EnrichmentRecord` map.
pub const ENRICHMENT_SLOT: &str = "ggdb_igdb";

const ZSTD_LEVEL: i32 = 9;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Failed to decompress cached value: {0}")]
    Decompress(String),

    #[error("Failed to parse cached value: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Failed to compress value: {0}")]
    Compress(#[from] std::io::Error),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Whether a stored text is plain JSON rather than the compressed encoding.
pub fn is_plain_json(text: &str) -> bool {
    text.trim_start().starts_with(['[', '{'])
}

/// Compress JSON text into the stored text form.
pub fn compress_text(json: &str) -> Result<String, CacheError> {
    let compressed = zstd::stream::encode_all(Cursor::new(json.as_bytes()), ZSTD_LEVEL)?;
    Ok(BASE64.encode(compressed))
}

/// Reverse [`compress_text`].
pub fn decompress_text(text: &str) -> Result<String, CacheError> {
    let bytes = BASE64
        .decode(text.trim())
        .map_err(|e| CacheError::Decompress(e.to_string()))?;
    let raw = zstd::stream::decode_all(Cursor::new(bytes))
        .map_err(|e| CacheError::Decompress(e.to_string()))?;
    let json = String::from_utf8(raw).map_err(|e| CacheError::Decompress(e.to_string()))?;
    if json.is_empty() {
        return Err(CacheError::Decompress("empty content".to_string()));
    }
    Ok(json)
}

/// Serializer for persisted slots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheCodec {
    /// Compress on save. Loading accepts both forms regardless.
    pub compress: bool,
}

impl CacheCodec {
    pub fn new(compress: bool) -> Self {
        Self { compress }
    }

    pub fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, CacheError> {
        let json = serde_json::to_string(value)?;
        if self.compress {
            compress_text(&json)
        } else {
            Ok(json)
        }
    }

    pub fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, CacheError> {
        if is_plain_json(text) {
            Ok(serde_json::from_str(text)?)
        } else {
            let json = decompress_text(text)?;
            Ok(serde_json::from_str(&json)?)
        }
    }

    /// Load a slot, falling back to the default value.
    ///
    /// A slot that fails to decode is logged and removed so the next save
    /// starts clean. Never fails.
    pub fn load_slot<T, S>(&self, store: &mut S, key: &str) -> T
    where
        T: DeserializeOwned + Default,
        S: KeyValueStore + ?Sized,
    {
        let text = match store.get(key) {
            Ok(Some(text)) => text,
            Ok(None) => return T::default(),
            Err(e) => {
                log::error!("Error reading '{}' from store: {}", key, e);
                return T::default();
            }
        };

        match self.decode(&text) {
            Ok(value) => value,
            Err(e) => {
                log::error!("Error parsing '{}' from store, discarding it: {}", key, e);
                if let Err(e) = store.remove(key) {
                    log::warn!("Failed to remove '{}' from store: {}", key, e);
                }
                T::default()
            }
        }
    }

    /// Encode and write a slot. On failure the previous slot value is left as is.
    pub fn save_slot<T, S>(&self, store: &mut S, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize + ?Sized,
        S: KeyValueStore + ?Sized,
    {
        let text = self.encode(value)?;
        store.set(key, &text)?;
        Ok(())
    }
}
