//! IGDB enrichment of library games.
//!
//! Games are matched in stages, each tried only when the previous one had
//! nothing left to do:
//!
//! 1. **Steam**: batched lookup by Steam app id.
//! 2. **Title**: batched lookup by exact (case-insensitive) title.
//! 3. **Alternate title**: the user types a title to search for, one game at
//!    a time (see [`crate::alt_title`]).
//!
//! Each game is marked as attempted for a stage before the query is sent, so
//! a game that IGDB does not know is not asked about again. A match creates
//! an [`EnrichmentRecord`] with rating, keywords and time-to-beat hours.

use std::collections::{BTreeSet, HashMap};

use ggdb_catalog::{EnrichmentRecord, seconds_to_hours};
use ggdb_library::{KeyValueStore, Library};
use ggdb_scraper::lookup::{
    GAMES_RESOURCE, TIME_TO_BEATS_RESOURCE, steam_ids_query, time_to_beat_query, titles_query,
};
use ggdb_scraper::{
    ApiError, IgdbGame, MetadataSource, Prompter, TimeToBeat, normalize_title, parse_records,
    title_lookup_keys,
};
use thiserror::Error;

use crate::alt_title::run_alt_title_stage;

/// Games per batched query.
pub const BATCH_SIZE: usize = 100;

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("IGDB error: {0}")]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    SteamId,
    Title,
    AltTitle,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SteamId => write!(f, "Steam id"),
            Self::Title => write!(f, "title"),
            Self::AltTitle => write!(f, "alternate title"),
        }
    }
}

/// What one stage did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StageReport {
    /// Games looked up.
    pub attempted: usize,
    /// Games that received a record.
    pub matched: usize,
    /// An attempt flag was set.
    pub flags_changed: bool,
}

impl StageReport {
    pub fn records_changed(&self) -> bool {
        self.matched > 0
    }

    /// A stage is conclusive when it matched something or left games
    /// unresolved; only an inconclusive stage lets the next one run.
    pub fn is_conclusive(&self) -> bool {
        self.records_changed() || self.attempted > self.matched
    }
}

// ── Shared helpers ──────────────────────────────────────────────────────────

/// Persist what a stage changed. Write failures are logged by the library.
pub(crate) fn persist_changes<S: KeyValueStore>(library: &mut Library<S>, report: &StageReport) {
    if report.records_changed() {
        library.persist_enrichment();
    }
    if report.flags_changed {
        library.persist_games();
    }
}

/// Build a record from an IGDB game and its time-to-beat, if any.
pub fn build_record(game: &IgdbGame, time_to_beat: Option<&TimeToBeat>) -> EnrichmentRecord {
    let keywords = game.keyword_names();
    EnrichmentRecord {
        rating: game.rating,
        rating_count: game.rating_count,
        keywords: (!keywords.is_empty()).then_some(keywords),
        normal_hours: time_to_beat.and_then(|t| t.normally).map(seconds_to_hours),
        fast_hours: time_to_beat.and_then(|t| t.hastily).map(seconds_to_hours),
        complete_hours: time_to_beat.and_then(|t| t.completely).map(seconds_to_hours),
    }
}

pub(crate) async fn fetch_games<M: MetadataSource>(
    source: &M,
    body: &str,
) -> Result<Vec<IgdbGame>, EnrichError> {
    let records = source.query(GAMES_RESOURCE, body).await?;
    Ok(parse_records(records)?)
}

/// Time-to-beat records for the given IGDB ids, keyed by IGDB id.
pub(crate) async fn fetch_time_to_beats<M: MetadataSource>(
    source: &M,
    igdb_ids: &BTreeSet<u64>,
) -> Result<HashMap<u64, TimeToBeat>, EnrichError> {
    if igdb_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let ids: Vec<u64> = igdb_ids.iter().copied().collect();
    let records = source
        .query(TIME_TO_BEATS_RESOURCE, &time_to_beat_query(&ids))
        .await?;
    let parsed: Vec<TimeToBeat> = parse_records(records)?;
    Ok(parsed.into_iter().map(|t| (t.game_id, t)).collect())
}

/// Matches stored by a lookup, and the error that cut it short, if any.
#[derive(Debug, Default)]
pub(crate) struct LookupOutcome {
    pub matched: usize,
    pub error: Option<EnrichError>,
}

/// Fetch time-to-beat data for matched games and store their records.
///
/// When the time-to-beat query fails the records are stored without hours
/// and the error is returned alongside them.
pub(crate) async fn store_matches<S, M>(
    library: &mut Library<S>,
    source: &M,
    matches: Vec<(String, IgdbGame)>,
) -> LookupOutcome
where
    S: KeyValueStore,
    M: MetadataSource,
{
    let igdb_ids: BTreeSet<u64> = matches.iter().map(|(_, g)| g.id).collect();
    let (times, error) = match fetch_time_to_beats(source, &igdb_ids).await {
        Ok(times) => (times, None),
        Err(e) => {
            log::warn!("IGDB time-to-beat lookup failed, storing matches without hours: {}", e);
            (HashMap::new(), Some(e))
        }
    };
    for (game_id, igdb) in &matches {
        log::debug!("Matched {} to IGDB game {} ({})", game_id, igdb.id, igdb.name);
        library.set_record(game_id, build_record(igdb, times.get(&igdb.id)));
    }
    LookupOutcome {
        matched: matches.len(),
        error,
    }
}

/// Persist what a marked batch changed, including the attempt flags and any
/// stored records when its lookup failed.
fn finish_stage<S: KeyValueStore>(
    library: &mut Library<S>,
    stage: Stage,
    attempted: usize,
    result: Result<LookupOutcome, EnrichError>,
) -> Result<StageReport, EnrichError> {
    let outcome = result.unwrap_or_else(|e| LookupOutcome {
        matched: 0,
        error: Some(e),
    });
    let report = StageReport {
        attempted,
        matched: outcome.matched,
        flags_changed: attempted > 0,
    };
    persist_changes(library, &report);
    if let Some(e) = outcome.error {
        return Err(e);
    }

    log::info!(
        "IGDB {} lookup: matched {} of {} games",
        stage,
        report.matched,
        report.attempted
    );
    Ok(report)
}

// ── Stage 1: Steam id ───────────────────────────────────────────────────────

/// Mark and return up to [`BATCH_SIZE`] games to look up by Steam app id,
/// as `(game id, app id)` pairs.
fn take_steam_batch<S: KeyValueStore>(library: &mut Library<S>) -> Vec<(String, String)> {
    let (games, enrichment) = library.games_mut_with_enrichment();
    let mut batch = Vec::new();
    for game in games {
        if batch.len() == BATCH_SIZE {
            break;
        }
        if game.igdb_steam_attempted || enrichment.contains_key(&game.game_id) {
            continue;
        }
        let Some(app_id) = game.steam_app_id.clone() else {
            continue;
        };
        game.igdb_steam_attempted = true;
        batch.push((game.game_id.clone(), app_id));
    }
    batch
}

pub async fn steam_stage<S, M>(
    library: &mut Library<S>,
    source: &M,
) -> Result<StageReport, EnrichError>
where
    S: KeyValueStore,
    M: MetadataSource,
{
    let batch = take_steam_batch(library);
    if batch.is_empty() {
        return Ok(StageReport::default());
    }

    let result = lookup_steam_ids(library, source, &batch).await;
    finish_stage(library, Stage::SteamId, batch.len(), result)
}

async fn lookup_steam_ids<S, M>(
    library: &mut Library<S>,
    source: &M,
    batch: &[(String, String)],
) -> Result<LookupOutcome, EnrichError>
where
    S: KeyValueStore,
    M: MetadataSource,
{
    let app_ids: Vec<&str> = batch.iter().map(|(_, id)| id.as_str()).collect();
    let found = fetch_games(source, &steam_ids_query(&app_ids)).await?;

    let mut by_app_id: HashMap<&str, &IgdbGame> = HashMap::new();
    for igdb in &found {
        for app_id in igdb.steam_app_ids() {
            by_app_id.entry(app_id).or_insert(igdb);
        }
    }

    let matches: Vec<(String, IgdbGame)> = batch
        .iter()
        .filter_map(|(game_id, app_id)| {
            by_app_id
                .get(app_id.as_str())
                .map(|igdb| (game_id.clone(), (*igdb).clone()))
        })
        .collect();
    Ok(store_matches(library, source, matches).await)
}

// ── Stage 2: Title ──────────────────────────────────────────────────────────

/// Mark and return up to [`BATCH_SIZE`] games to look up by title, as
/// `(game id, title)` pairs.
fn take_title_batch<S: KeyValueStore>(library: &mut Library<S>) -> Vec<(String, String)> {
    let (games, enrichment) = library.games_mut_with_enrichment();
    let mut batch = Vec::new();
    for game in games {
        if batch.len() == BATCH_SIZE {
            break;
        }
        if game.igdb_title_attempted || enrichment.contains_key(&game.game_id) {
            continue;
        }
        game.igdb_title_attempted = true;
        batch.push((game.game_id.clone(), game.title.clone()));
    }
    batch
}

pub async fn title_stage<S, M>(
    library: &mut Library<S>,
    source: &M,
) -> Result<StageReport, EnrichError>
where
    S: KeyValueStore,
    M: MetadataSource,
{
    let batch = take_title_batch(library);
    if batch.is_empty() {
        return Ok(StageReport::default());
    }

    let result = lookup_titles(library, source, &batch).await;
    finish_stage(library, Stage::Title, batch.len(), result)
}

async fn lookup_titles<S, M>(
    library: &mut Library<S>,
    source: &M,
    batch: &[(String, String)],
) -> Result<LookupOutcome, EnrichError>
where
    S: KeyValueStore,
    M: MetadataSource,
{
    let mut keys: Vec<String> = Vec::new();
    let mut wanted: HashMap<String, Vec<&str>> = HashMap::new();
    for (game_id, title) in batch {
        for key in title_lookup_keys(title) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        let normalized = normalize_title(title);
        if !normalized.is_empty() {
            wanted.entry(normalized).or_default().push(game_id.as_str());
        }
    }
    if keys.is_empty() {
        return Ok(LookupOutcome::default());
    }

    let found = fetch_games(source, &titles_query(&keys)).await?;

    // First IGDB result with a matching name wins.
    let mut matches: Vec<(String, IgdbGame)> = Vec::new();
    for igdb in &found {
        let Some(game_ids) = wanted.remove(&normalize_title(&igdb.name)) else {
            continue;
        };
        matches.extend(game_ids.into_iter().map(|id| (id.to_string(), igdb.clone())));
    }
    Ok(store_matches(library, source, matches).await)
}

// ── Drivers ─────────────────────────────────────────────────────────────────

/// Run the Steam stage, then the title stage if the Steam stage was
/// inconclusive. Returns whether any record was created.
pub async fn enrich_batch<S, M>(library: &mut Library<S>, source: &M) -> Result<bool, EnrichError>
where
    S: KeyValueStore,
    M: MetadataSource,
{
    let steam = steam_stage(library, source).await?;
    if steam.is_conclusive() {
        return Ok(steam.records_changed());
    }

    let title = title_stage(library, source).await?;
    if !title.is_conclusive() {
        log::info!("All games already looked up on IGDB, no fetch necessary");
    }
    Ok(title.records_changed())
}

/// Like [`enrich_batch`], then asks the user for alternate titles of games
/// still without a record when neither batched stage had anything to do.
pub async fn enrich_library<S, M, P>(
    library: &mut Library<S>,
    source: &M,
    prompter: &mut P,
) -> Result<bool, EnrichError>
where
    S: KeyValueStore,
    M: MetadataSource,
    P: Prompter,
{
    let steam = steam_stage(library, source).await?;
    if steam.is_conclusive() {
        return Ok(steam.records_changed());
    }

    let title = title_stage(library, source).await?;
    if title.is_conclusive() {
        return Ok(title.records_changed());
    }

    let alt = run_alt_title_stage(library, source, prompter).await?;
    if alt.attempted == 0 && !alt.flags_changed {
        log::info!("All games already looked up on IGDB, no fetch necessary");
    }
    Ok(alt.records_changed())
}
