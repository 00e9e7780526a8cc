//! Connecting the library to IGDB.

use ggdb_library::{KeyValueStore, Library};
use ggdb_scraper::{CredentialSource, Credentials, IgdbClient, Prompter};

use crate::enrich::{EnrichError, enrich_library};

/// Build an IGDB client from configured, stored, or prompted credentials.
///
/// `Ok(None)` when the user declines to enter credentials.
pub async fn connect<S, P>(
    library: &Library<S>,
    prompter: &mut P,
) -> Result<Option<(IgdbClient, CredentialSource)>, EnrichError>
where
    S: KeyValueStore,
    P: Prompter,
{
    let Some((creds, source)) = Credentials::resolve(library.store(), prompter).await else {
        log::info!("No IGDB credentials, skipping enrichment");
        return Ok(None);
    };
    log::debug!("Using {} IGDB credentials", source);
    let client = IgdbClient::new(creds)?;
    Ok(Some((client, source)))
}

/// Save prompted credentials once IGDB has accepted them.
pub fn remember_verified_credentials<S: KeyValueStore>(
    library: &mut Library<S>,
    client: &IgdbClient,
    source: CredentialSource,
) {
    if source != CredentialSource::Prompted || !client.is_verified() {
        return;
    }
    match client.credentials().remember(library.store_mut()) {
        Ok(()) => log::info!("Saved IGDB credentials"),
        Err(e) => log::warn!("Failed to save IGDB credentials: {}", e),
    }
}

/// Connect to IGDB and run [`enrich_library`]. Returns whether any record
/// was created.
pub async fn refresh_enrichment<S, P>(
    library: &mut Library<S>,
    prompter: &mut P,
) -> Result<bool, EnrichError>
where
    S: KeyValueStore,
    P: Prompter,
{
    let Some((client, source)) = connect(library, prompter).await? else {
        return Ok(false);
    };
    let result = enrich_library(library, &client, prompter).await;
    remember_verified_credentials(library, &client, source);
    result
}
