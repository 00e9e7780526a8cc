//! Interactive alternate-title lookup.
//!
//! Games that neither the Steam nor the title stage could match are offered
//! to the user one at a time. [`AltTitleStage`] is a suspend/resume state
//! machine: the host asks it for the next [`PromptRequest`], shows the prompt
//! however it likes, and feeds the answer back as a [`PromptReply`].
//! [`run_alt_title_stage`] drives it over a [`Prompter`].

use ggdb_library::{KeyValueStore, Library};
use ggdb_scraper::lookup::search_query;
use ggdb_scraper::{MetadataSource, PromptReply, Prompter};

use crate::enrich::{EnrichError, Stage, StageReport, fetch_games, persist_changes, store_matches};

/// A question for the user about one unmatched game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub game_id: String,
    pub message: String,
    /// Pre-filled answer: the game's title, or the last title tried for it.
    pub default_value: String,
}

impl PromptRequest {
    fn new(game_id: &str, title: &str, default_value: &str) -> Self {
        Self {
            game_id: game_id.to_string(),
            message: format!(
                "No IGDB match for \"{title}\". Title to search for (empty to skip):"
            ),
            default_value: default_value.to_string(),
        }
    }
}

#[derive(Debug, Default)]
pub struct AltTitleStage {
    pending: Option<PromptRequest>,
    report: StageReport,
    finished: bool,
}

impl AltTitleStage {
    pub fn new() -> Self {
        Self::default()
    }

    /// The prompt to show next, or `None` once the stage is over.
    ///
    /// Repeats the same request until it is answered.
    pub fn next_prompt<S: KeyValueStore>(&mut self, library: &Library<S>) -> Option<PromptRequest> {
        if self.finished {
            return None;
        }
        if self.pending.is_none() {
            let next = library
                .games()
                .iter()
                .find(|g| !g.igdb_alt_attempted && library.record(&g.game_id).is_none());
            match next {
                Some(game) => {
                    self.pending = Some(PromptRequest::new(&game.game_id, &game.title, &game.title))
                }
                None => self.finished = true,
            }
        }
        self.pending.clone()
    }

    /// Apply the user's answer to the pending request.
    ///
    /// A matched record is persisted at once. A failed search ends the stage
    /// and returns the error.
    pub async fn answer<S, M>(
        &mut self,
        library: &mut Library<S>,
        source: &M,
        reply: PromptReply,
    ) -> Result<(), EnrichError>
    where
        S: KeyValueStore,
        M: MetadataSource,
    {
        let Some(request) = self.pending.take() else {
            return Ok(());
        };

        match reply {
            PromptReply::Cancel => {
                log::debug!("Alternate title lookup cancelled");
                self.finished = true;
            }
            PromptReply::Skip => {
                if let Some(game) = library
                    .games_mut()
                    .iter_mut()
                    .find(|g| g.game_id == request.game_id)
                {
                    game.igdb_alt_attempted = true;
                    self.report.flags_changed = true;
                }
            }
            PromptReply::Text(title) => {
                self.report.attempted += 1;
                let found = match fetch_games(source, &search_query(&title)).await {
                    Ok(found) => found,
                    Err(e) => {
                        self.finished = true;
                        return Err(e);
                    }
                };

                match found.into_iter().next() {
                    Some(igdb) => {
                        log::info!("\"{}\" matched IGDB game {}", title, igdb.name);
                        let matches = vec![(request.game_id, igdb)];
                        let outcome = store_matches(library, source, matches).await;
                        self.report.matched += outcome.matched;
                        library.persist_enrichment();
                        if let Some(e) = outcome.error {
                            self.finished = true;
                            return Err(e);
                        }
                    }
                    None => {
                        log::info!("No IGDB match for \"{}\"", title);
                        let current = library
                            .games()
                            .iter()
                            .find(|g| g.game_id == request.game_id)
                            .map(|g| g.title.clone())
                            .unwrap_or_default();
                        self.pending = Some(PromptRequest::new(&request.game_id, &current, &title));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn report(&self) -> &StageReport {
        &self.report
    }
}

/// Ask the user about every unmatched game until they cancel or none is left.
///
/// Changed attempt flags are persisted even when a search fails.
pub async fn run_alt_title_stage<S, M, P>(
    library: &mut Library<S>,
    source: &M,
    prompter: &mut P,
) -> Result<StageReport, EnrichError>
where
    S: KeyValueStore,
    M: MetadataSource,
    P: Prompter,
{
    let mut stage = AltTitleStage::new();
    let result = loop {
        let Some(request) = stage.next_prompt(library) else {
            break Ok(());
        };
        let answer = prompter
            .prompt_text(&request.message, &request.default_value)
            .await;
        if let Err(e) = stage
            .answer(library, source, PromptReply::from_answer(answer))
            .await
        {
            break Err(e);
        }
    };

    // Records were persisted as they matched.
    let flags_only = StageReport {
        matched: 0,
        ..stage.report().clone()
    };
    persist_changes(library, &flags_only);
    result?;

    let report = stage.report().clone();
    log::info!(
        "IGDB {} lookup: matched {} of {} searches",
        Stage::AltTitle,
        report.matched,
        report.attempted
    );
    Ok(report)
}
