//! Outbound delivery to a Slack incoming webhook.

use std::future::Future;

use serde::Serialize;

use relay_blocks::Block;
use relay_common::error::RelayError;
use relay_common::types::WebhookSecret;

/// Default base URL for Slack incoming webhooks.
pub const SLACK_BASE_URL: &str = "https://hooks.slack.com";

/// Narrow seam over webhook delivery, so dispatch can be exercised
/// without calling Slack.
pub trait WebhookSender: Send + Sync {
    /// Post the rendered blocks as one message to the secret's webhook.
    fn send(
        &self,
        secret: &WebhookSecret,
        blocks: &[Block],
    ) -> impl Future<Output = Result<(), RelayError>> + Send;
}

#[derive(Serialize)]
struct WebhookBody<'a> {
    blocks: &'a [Block],
}

/// [`WebhookSender`] backed by the Slack incoming-webhook API.
pub struct SlackWebhook {
    client: reqwest::Client,
    base_url: String,
}

impl SlackWebhook {
    pub fn new() -> Self {
        Self::with_base_url(SLACK_BASE_URL)
    }

    /// Point the sender at a non-default endpoint (tests).
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Default for SlackWebhook {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookSender for SlackWebhook {
    async fn send(&self, secret: &WebhookSecret, blocks: &[Block]) -> Result<(), RelayError> {
        let url = format!(
            "{}/services/{}/{}/{}",
            self.base_url, secret.workspace, secret.channel, secret.webhook
        );

        self.client
            .post(&url)
            .json(&WebhookBody { blocks })
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| {
                tracing::error!(error = %e, "webhook delivery failed");
                RelayError::Delivery(e)
            })?;

        Ok(())
    }
}
