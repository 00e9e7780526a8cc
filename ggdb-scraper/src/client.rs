use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

use crate::credentials::Credentials;
use crate::error::ApiError;
use crate::source::MetadataSource;

const BASE_URL: &str = "https://api.igdb.com/v4";
/// IGDB allows four requests per second.
const MIN_REQUEST_INTERVAL: Duration = Duration::from_millis(250);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for the IGDB v4 API with rate limiting.
pub struct IgdbClient {
    http: reqwest::Client,
    creds: Credentials,
    base_url: String,
    last_request: Arc<Mutex<Instant>>,
    verified: AtomicBool,
}

impl IgdbClient {
    pub fn new(creds: Credentials) -> Result<Self, ApiError> {
        if creds.client_id.is_empty() || creds.access_token.is_empty() {
            return Err(ApiError::Config(
                "IGDB client id and access token are both required".to_string(),
            ));
        }

        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            http,
            creds,
            base_url: BASE_URL.to_string(),
            last_request: Arc::new(Mutex::new(Instant::now() - MIN_REQUEST_INTERVAL)),
            verified: AtomicBool::new(false),
        })
    }

    /// Point the client at a proxy or mirror of the IGDB API.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn credentials(&self) -> &Credentials {
        &self.creds
    }

    /// Whether at least one request has been accepted with these credentials.
    pub fn is_verified(&self) -> bool {
        self.verified.load(Ordering::Relaxed)
    }

    /// Enforce rate limiting: wait until at least MIN_REQUEST_INTERVAL has
    /// passed since the last API request.
    async fn rate_limit(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();
        if elapsed < MIN_REQUEST_INTERVAL {
            tokio::time::sleep(MIN_REQUEST_INTERVAL - elapsed).await;
        }
        *last = Instant::now();
    }
}

impl MetadataSource for IgdbClient {
    async fn query(&self, resource: &str, body: &str) -> Result<Vec<serde_json::Value>, ApiError> {
        self.rate_limit().await;
        log::debug!("IGDB {}: {}", resource, body);

        let resp = self
            .http
            .post(format!("{}/{}", self.base_url, resource))
            .header("Client-ID", &self.creds.client_id)
            .bearer_auth(&self.creds.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .body(body.to_string())
            .send()
            .await?;

        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let records: Vec<serde_json::Value> = serde_json::from_str(&text).map_err(|e| {
            ApiError::Response(format!(
                "{e}. Response: {}",
                text.chars().take(200).collect::<String>()
            ))
        })?;
        self.verified.store(true, Ordering::Relaxed);
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_blank_credentials() {
        let creds = Credentials {
            client_id: "abc".to_string(),
            access_token: String::new(),
        };
        assert!(matches!(IgdbClient::new(creds), Err(ApiError::Config(_))));
    }

    #[test]
    fn base_url_override_drops_trailing_slash() {
        let creds = Credentials {
            client_id: "abc".to_string(),
            access_token: "token".to_string(),
        };
        let client = IgdbClient::new(creds)
            .unwrap()
            .with_base_url("http://localhost:8080/igdb/");
        assert_eq!(client.base_url, "http://localhost:8080/igdb");
        assert!(!client.is_verified());
    }
}
