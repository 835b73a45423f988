//! Secret retrieval via the Lambda Parameters-and-Secrets extension.
//!
//! The extension runs as a local caching side-channel on a fixed port;
//! fetching a secret is one authenticated GET against it. The raw secret
//! string returned here is itself serialized JSON — deserializing it is
//! the caller's responsibility.

use std::future::Future;

use serde::Deserialize;

use relay_common::error::RelayError;

/// Default base URL of the Parameters-and-Secrets extension endpoint.
pub const EXTENSION_BASE_URL: &str = "http://localhost:2773";

/// Header carrying the session token that authorizes a fetch.
pub const SESSION_TOKEN_HEADER: &str = "X-Aws-Parameters-Secrets-Token";

/// Narrow seam over the secret store, so the dispatcher can be exercised
/// without the extension running.
pub trait SecretStore: Send + Sync {
    /// Fetch the named secret's raw string payload.
    fn fetch(
        &self,
        name: &str,
        token: &str,
    ) -> impl Future<Output = Result<String, RelayError>> + Send;
}

/// Envelope returned by the extension's `secretsmanager/get` endpoint.
#[derive(Debug, Deserialize)]
struct GetSecretResponse {
    #[serde(rename = "SecretString")]
    secret_string: String,
}

/// [`SecretStore`] backed by the local extension endpoint.
pub struct ExtensionSecretStore {
    client: reqwest::Client,
    base_url: String,
}

impl ExtensionSecretStore {
    pub fn new() -> Self {
        Self::with_base_url(EXTENSION_BASE_URL)
    }

    /// Point the store at a non-default endpoint (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for ExtensionSecretStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretStore for ExtensionSecretStore {
    async fn fetch(&self, name: &str, token: &str) -> Result<String, RelayError> {
        let url = format!("{}/secretsmanager/get", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[("secretId", name)])
            .header(SESSION_TOKEN_HEADER, token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                tracing::error!(secret = name, error = %e, "secret fetch failed");
                RelayError::SecretFetch(e)
            })?;

        let envelope: GetSecretResponse = response.json().await.map_err(|e| {
            tracing::error!(secret = name, error = %e, "secret response was not valid JSON");
            RelayError::SecretFetch(e)
        })?;

        Ok(envelope.secret_string)
    }
}
