use ggdb_library::{KeyValueStore, StoreError, settings_path};
use serde::{Deserialize, Serialize};

use crate::prompt::Prompter;

/// Store slot holding credentials that were entered interactively.
pub const CREDENTIALS_SLOT: &str = "ggdb_igdb_credentials";

/// Twitch application credentials for the IGDB API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub client_id: String,
    pub access_token: String,
}

/// Where the credentials in use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Environment variables or the settings file.
    Configured,
    /// Saved in the store after an earlier prompt.
    Stored,
    /// Entered just now; not yet saved.
    Prompted,
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Configured => write!(f, "configured"),
            Self::Stored => write!(f, "stored"),
            Self::Prompted => write!(f, "prompted"),
        }
    }
}

/// `[igdb]` table of the settings file.
#[derive(Debug, Default, Deserialize)]
struct SettingsFile {
    igdb: Option<IgdbConfig>,
}

#[derive(Debug, Default, Deserialize)]
struct IgdbConfig {
    client_id: Option<String>,
    access_token: Option<String>,
}

fn load_config_file() -> Option<IgdbConfig> {
    let content = std::fs::read_to_string(settings_path()).ok()?;
    let file: SettingsFile = toml::from_str(&content).ok()?;
    file.igdb
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Credentials {
    /// Load configured credentials.
    ///
    /// Priority per field: env vars (`IGDB_CLIENT_ID`, `IGDB_ACCESS_TOKEN`) >
    /// `[igdb]` in the settings file.
    pub fn from_config() -> Option<Self> {
        let config = load_config_file().unwrap_or_default();
        let client_id = non_empty(std::env::var("IGDB_CLIENT_ID").ok())
            .or_else(|| non_empty(config.client_id))?;
        let access_token = non_empty(std::env::var("IGDB_ACCESS_TOKEN").ok())
            .or_else(|| non_empty(config.access_token))?;
        Some(Self {
            client_id,
            access_token,
        })
    }

    /// Credentials saved by [`Credentials::remember`].
    pub fn from_store<S: KeyValueStore + ?Sized>(store: &S) -> Option<Self> {
        let text = match store.get(CREDENTIALS_SLOT) {
            Ok(Some(text)) => text,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("Failed to read stored IGDB credentials: {}", e);
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(creds) => Some(creds),
            Err(e) => {
                log::warn!("Ignoring unreadable stored IGDB credentials: {}", e);
                None
            }
        }
    }

    /// Configured, then stored credentials, without prompting.
    pub fn load<S: KeyValueStore + ?Sized>(store: &S) -> Option<(Self, CredentialSource)> {
        Self::from_config()
            .map(|c| (c, CredentialSource::Configured))
            .or_else(|| Self::from_store(store).map(|c| (c, CredentialSource::Stored)))
    }

    /// Like [`Credentials::load`], but asks through `prompter` when nothing is
    /// configured or stored. `None` if the user cancels or leaves a field blank.
    pub async fn resolve<S, P>(store: &S, prompter: &mut P) -> Option<(Self, CredentialSource)>
    where
        S: KeyValueStore + ?Sized,
        P: Prompter + ?Sized,
    {
        if let Some(found) = Self::load(store) {
            return Some(found);
        }

        let client_id = non_empty(prompter.prompt_text("IGDB (Twitch) client ID", "").await)?;
        let access_token =
            non_empty(prompter.prompt_text("IGDB (Twitch) app access token", "").await)?;
        Some((
            Self {
                client_id,
                access_token,
            },
            CredentialSource::Prompted,
        ))
    }

    /// Save into the store so the next session does not prompt again.
    pub fn remember<S: KeyValueStore + ?Sized>(&self, store: &mut S) -> Result<(), StoreError> {
        let text = serde_json::to_string(self).map_err(std::io::Error::other)?;
        store.set(CREDENTIALS_SLOT, &text)
    }

    pub fn forget<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
        store.remove(CREDENTIALS_SLOT)
    }
}
