//! In-memory library state backed by the persisted cache.
//!
//! `Library` is the single owner of the game list and the enrichment map.
//! Persistence failures are logged and swallowed; the in-memory copy stays
//! authoritative either way.

use std::collections::BTreeSet;

use ggdb_catalog::{EnrichmentMap, EnrichmentRecord, Game};
use rand::Rng;

use crate::cache::{CacheCodec, ENRICHMENT_SLOT, GAMES_SLOT};
use crate::index::{filter_tokens, is_visible, refresh_text_index};
use crate::sort::{SortKey, shuffle_games, sort_games};
use crate::store::KeyValueStore;

pub struct Library<S: KeyValueStore> {
    games: Vec<Game>,
    enrichment: EnrichmentMap,
    store: S,
    codec: CacheCodec,
}

impl<S: KeyValueStore> Library<S> {
    /// Load both slots from the store. Broken slots are discarded.
    pub fn open(mut store: S, codec: CacheCodec) -> Self {
        let games: Vec<Game> = codec.load_slot(&mut store, GAMES_SLOT);
        let enrichment: EnrichmentMap = codec.load_slot(&mut store, ENRICHMENT_SLOT);
        log::debug!(
            "Loaded {} games and {} enrichment records from store",
            games.len(),
            enrichment.len()
        );

        let mut library = Self {
            games,
            enrichment,
            store,
            codec,
        };
        library.refresh_all_indexes();
        library
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn games_mut(&mut self) -> &mut [Game] {
        &mut self.games
    }

    /// Mutable games alongside the enrichment map, for updates that depend
    /// on whether a game already has a record.
    pub fn games_mut_with_enrichment(&mut self) -> (&mut [Game], &EnrichmentMap) {
        (&mut self.games, &self.enrichment)
    }

    pub fn enrichment(&self) -> &EnrichmentMap {
        &self.enrichment
    }

    pub fn record(&self, game_id: &str) -> Option<&EnrichmentRecord> {
        self.enrichment.get(game_id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn codec(&self) -> CacheCodec {
        self.codec
    }

    pub fn set_codec(&mut self, codec: CacheCodec) {
        self.codec = codec;
    }

    /// Replace the game list with a fresh import and persist it.
    ///
    /// Enrichment records are kept; they join by game id.
    pub fn replace_games(&mut self, games: Vec<Game>) -> bool {
        self.games = games;
        self.refresh_all_indexes();
        self.persist_games()
    }

    /// Store a record for a game and rebuild that game's search blob.
    pub fn set_record(&mut self, game_id: &str, record: EnrichmentRecord) {
        self.enrichment.insert(game_id.to_string(), record);
        let record = self.enrichment.get(game_id);
        if let Some(game) = self.games.iter_mut().find(|g| g.game_id == game_id) {
            refresh_text_index(game, record);
        }
    }

    fn refresh_all_indexes(&mut self) {
        for game in &mut self.games {
            let record = self.enrichment.get(&game.game_id);
            refresh_text_index(game, record);
        }
    }

    /// Games passing the platform and text filters, in current order.
    pub fn visible_games(&self, hidden_platforms: &BTreeSet<String>, filter: &str) -> Vec<&Game> {
        let tokens = filter_tokens(filter);
        self.games
            .iter()
            .filter(|g| is_visible(g, hidden_platforms, &tokens))
            .collect()
    }

    /// Every platform present in the library, for the platform filter.
    pub fn platforms(&self) -> BTreeSet<&str> {
        self.games
            .iter()
            .flat_map(|g| g.platforms.iter().map(String::as_str))
            .collect()
    }

    pub fn sort(&mut self, key: SortKey) {
        sort_games(&mut self.games, key, &self.enrichment);
    }

    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        shuffle_games(&mut self.games, rng);
    }

    /// Write the game list. Returns whether the write succeeded.
    pub fn persist_games(&mut self) -> bool {
        let result = self.codec.save_slot(&mut self.store, GAMES_SLOT, &self.games);
        self.report_write(GAMES_SLOT, result)
    }

    /// Write the enrichment map. Returns whether the write succeeded.
    pub fn persist_enrichment(&mut self) -> bool {
        let result = self
            .codec
            .save_slot(&mut self.store, ENRICHMENT_SLOT, &self.enrichment);
        self.report_write(ENRICHMENT_SLOT, result)
    }

    fn report_write(&self, key: &str, result: Result<(), crate::cache::CacheError>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) if self.codec.compress => {
                log::error!("Failed to write '{}' to store: {}", key, e);
                false
            }
            Err(e) => {
                log::error!(
                    "Failed to write '{}' to store: {}. Enabling cache compression (cache.compress = true) may help",
                    key,
                    e
                );
                false
            }
        }
    }
}
