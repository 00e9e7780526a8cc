pub mod client;
pub mod credentials;
pub mod error;
pub mod lookup;
pub mod prompt;
pub mod source;
pub mod types;

pub use client::IgdbClient;
pub use credentials::{CREDENTIALS_SLOT, CredentialSource, Credentials};
pub use error::ApiError;
pub use lookup::{normalize_title, title_lookup_keys};
pub use prompt::{PromptReply, Prompter};
pub use source::MetadataSource;
pub use types::{ExternalGame, IgdbGame, NamedRef, TimeToBeat, parse_records};
