use thiserror::Error;

/// Common error types used across the relay.
///
/// No stage recovers from any of these locally: every error aborts the
/// remaining dispatch stages and surfaces to the invoking platform.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The trigger payload is missing or malformed.
    #[error("decode error: {0}")]
    Decode(String),

    /// Fatal misconfiguration (missing env var, empty or unparseable
    /// secret). Not retryable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The secret store side-channel was unreachable or denied the request.
    #[error("secret fetch failed: {0}")]
    SecretFetch(#[source] reqwest::Error),

    /// The message is missing fields the renderer requires.
    #[error("malformed message: {0}")]
    MalformedMessage(String),

    /// The webhook call failed (transport or API error).
    #[error("webhook delivery failed: {0}")]
    Delivery(#[source] reqwest::Error),
}
