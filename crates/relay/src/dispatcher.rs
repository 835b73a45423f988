//! Dispatch pipeline for one inbound SNS event.
//!
//! Stages run strictly in order, each gated on the previous one:
//! decode → load secret → render blocks → deliver. Any error aborts the
//! remaining stages and surfaces to the Lambda runtime.

use aws_lambda_events::event::sns::SnsEvent;

use relay_blocks::{Block, render};
use relay_common::config::RelayConfig;
use relay_common::error::RelayError;
use relay_common::types::{BuildMessage, WebhookSecret};
use relay_secrets::SecretStore;

use crate::webhook::WebhookSender;

/// Orchestrates one event-handling invocation.
///
/// Holds the configuration loaded at startup plus the two collaborators;
/// the webhook secret itself is fetched fresh on every dispatch.
pub struct Dispatcher<S, W> {
    config: RelayConfig,
    secrets: S,
    webhook: W,
}

impl<S: SecretStore, W: WebhookSender> Dispatcher<S, W> {
    pub fn new(config: RelayConfig, secrets: S, webhook: W) -> Self {
        Self {
            config,
            secrets,
            webhook,
        }
    }

    /// Handle one SNS event end to end.
    pub async fn dispatch(&self, event: SnsEvent) -> Result<(), RelayError> {
        let message = Self::decode(&event)?;

        let secret = self.load_secret().await?;

        let blocks = render(self.config.render_mode, &message)?;
        tracing::debug!(blocks = blocks.len(), mode = %self.config.render_mode, "rendered blocks");

        self.deliver(&secret, &blocks).await?;

        Ok(())
    }

    /// Extract and parse the build message embedded in the first record.
    ///
    /// Only the first record is forwarded; SNS delivers one record per
    /// Lambda invocation in practice, but extras are logged rather than
    /// silently dropped.
    fn decode(event: &SnsEvent) -> Result<BuildMessage, RelayError> {
        tracing::info!(records = event.records.len(), "received sns event");

        if event.records.len() > 1 {
            tracing::warn!(
                dropped = event.records.len() - 1,
                "only the first sns record is forwarded"
            );
        }

        let record = event
            .records
            .first()
            .ok_or_else(|| RelayError::Decode("sns event contains no records".into()))?;

        let message: BuildMessage = serde_json::from_str(&record.sns.message)
            .map_err(|e| RelayError::Decode(format!("invalid message payload: {}", e)))?;

        tracing::debug!(?message, "decoded build message");
        Ok(message)
    }

    /// Fetch and parse the webhook secret.
    ///
    /// An empty secret value is a fatal misconfiguration: the deployment
    /// should surface it immediately rather than silently drop
    /// notifications.
    async fn load_secret(&self) -> Result<WebhookSecret, RelayError> {
        let raw = self
            .secrets
            .fetch(&self.config.secret_name, &self.config.session_token)
            .await?;

        if raw.trim().is_empty() {
            return Err(RelayError::Configuration("secret is empty".into()));
        }

        let secret: WebhookSecret = serde_json::from_str(&raw).map_err(|e| {
            RelayError::Configuration(format!("secret is not a valid webhook secret: {}", e))
        })?;

        tracing::debug!(workspace = %secret.workspace, channel = %secret.channel, "loaded webhook secret");
        Ok(secret)
    }

    async fn deliver(&self, secret: &WebhookSecret, blocks: &[Block]) -> Result<(), RelayError> {
        tracing::info!("sending the notification");
        self.webhook.send(secret, blocks).await?;
        tracing::info!("notification delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use relay_blocks::TextObject;
    use relay_common::types::RenderMode;

    use super::*;

    /// Secret store returning a fixed payload, counting fetches.
    #[derive(Clone)]
    struct StaticSecrets {
        payload: String,
        fetches: Arc<AtomicUsize>,
    }

    impl StaticSecrets {
        fn new(payload: &str) -> Self {
            Self {
                payload: payload.to_string(),
                fetches: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl SecretStore for StaticSecrets {
        async fn fetch(&self, _name: &str, _token: &str) -> Result<String, RelayError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(self.payload.clone())
        }
    }

    /// Webhook sender recording every delivery instead of posting it.
    #[derive(Clone, Default)]
    struct RecordingWebhook {
        sent: Arc<Mutex<Vec<(WebhookSecret, Vec<Block>)>>>,
    }

    impl RecordingWebhook {
        fn deliveries(&self) -> Vec<(WebhookSecret, Vec<Block>)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl WebhookSender for RecordingWebhook {
        async fn send(&self, secret: &WebhookSecret, blocks: &[Block]) -> Result<(), RelayError> {
            self.sent
                .lock()
                .unwrap()
                .push((secret.clone(), blocks.to_vec()));
            Ok(())
        }
    }

    const SECRET_JSON: &str = r#"{"Workspace":"T1","Channel":"C1","Webhook":"W1"}"#;

    fn config(render_mode: RenderMode) -> RelayConfig {
        RelayConfig {
            secret_name: "slack/webhook".to_string(),
            session_token: "session-token".to_string(),
            render_mode,
        }
    }

    /// Build an SNS event carrying the given message bodies, one record each.
    fn sns_event(messages: &[&str]) -> SnsEvent {
        let records: Vec<serde_json::Value> = messages
            .iter()
            .map(|message| {
                json!({
                    "EventVersion": "1.0",
                    "EventSubscriptionArn":
                        "arn:aws:sns:eu-west-1:123456789012:build-events:deadbeef",
                    "EventSource": "aws:sns",
                    "Sns": {
                        "Type": "Notification",
                        "MessageId": "95df01b4-ee98-5cb9-9903-4c221d41eb5e",
                        "TopicArn": "arn:aws:sns:eu-west-1:123456789012:build-events",
                        "Subject": null,
                        "Message": message,
                        "Timestamp": "2024-01-02T12:45:07.000Z",
                        "SignatureVersion": "1",
                        "Signature": "EXAMPLE",
                        "SigningCertUrl": "https://sns.eu-west-1.amazonaws.com/cert.pem",
                        "UnsubscribeUrl": "https://sns.eu-west-1.amazonaws.com/unsubscribe",
                        "MessageAttributes": {}
                    }
                })
            })
            .collect();
        serde_json::from_value(json!({ "Records": records })).unwrap()
    }

    const BUCKET_MESSAGE: &str =
        r#"{"resources":["arn:aws:s3:::bucket-1"],"detail":{},"additionalAttributes":{}}"#;

    #[tokio::test]
    async fn dispatch_delivers_simple_blocks() {
        let webhook = RecordingWebhook::default();
        let dispatcher = Dispatcher::new(
            config(RenderMode::Simple),
            StaticSecrets::new(SECRET_JSON),
            webhook.clone(),
        );

        dispatcher.dispatch(sns_event(&[BUCKET_MESSAGE])).await.unwrap();

        let deliveries = webhook.deliveries();
        assert_eq!(deliveries.len(), 1);

        let (secret, blocks) = &deliveries[0];
        assert_eq!(
            secret,
            &WebhookSecret {
                workspace: "T1".to_string(),
                channel: "C1".to_string(),
                webhook: "W1".to_string(),
            }
        );
        assert_eq!(
            serde_json::to_value(blocks).unwrap(),
            json!([{
                "type": "context",
                "elements": [
                    {"type": "plain_text", "text": "✗ arn:aws:s3:::bucket-1", "emoji": true}
                ]
            }])
        );
    }

    #[tokio::test]
    async fn dispatch_with_rich_mode_delivers_rich_blocks() {
        let webhook = RecordingWebhook::default();
        let dispatcher = Dispatcher::new(
            config(RenderMode::Rich),
            StaticSecrets::new(SECRET_JSON),
            webhook.clone(),
        );

        dispatcher.dispatch(sns_event(&[BUCKET_MESSAGE])).await.unwrap();

        let deliveries = webhook.deliveries();
        assert_eq!(deliveries.len(), 1);
        // header + detail section + resources + ack control, no failedActions
        assert_eq!(deliveries[0].1.len(), 4);
        assert!(matches!(deliveries[0].1[0], Block::Header { .. }));
    }

    #[tokio::test]
    async fn dispatch_fails_on_event_without_records() {
        let webhook = RecordingWebhook::default();
        let secrets = StaticSecrets::new(SECRET_JSON);
        let dispatcher = Dispatcher::new(config(RenderMode::Simple), secrets.clone(), webhook.clone());

        let err = dispatcher.dispatch(sns_event(&[])).await.unwrap_err();

        assert!(matches!(err, RelayError::Decode(_)));
        // Aborted before the secret was ever fetched or anything delivered.
        assert_eq!(secrets.fetches.load(Ordering::SeqCst), 0);
        assert!(webhook.deliveries().is_empty());
    }

    #[tokio::test]
    async fn dispatch_fails_on_unparseable_message() {
        let webhook = RecordingWebhook::default();
        let dispatcher = Dispatcher::new(
            config(RenderMode::Simple),
            StaticSecrets::new(SECRET_JSON),
            webhook.clone(),
        );

        let err = dispatcher
            .dispatch(sns_event(&["not a json payload"]))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Decode(_)));
        assert!(webhook.deliveries().is_empty());
    }

    #[tokio::test]
    async fn dispatch_fails_on_empty_secret_before_delivery() {
        let webhook = RecordingWebhook::default();
        let dispatcher = Dispatcher::new(
            config(RenderMode::Simple),
            StaticSecrets::new(""),
            webhook.clone(),
        );

        let err = dispatcher
            .dispatch(sns_event(&[BUCKET_MESSAGE]))
            .await
            .unwrap_err();

        match err {
            RelayError::Configuration(message) => assert_eq!(message, "secret is empty"),
            other => panic!("expected configuration error, got {:?}", other),
        }
        assert!(webhook.deliveries().is_empty());
    }

    #[tokio::test]
    async fn dispatch_fails_on_blank_secret() {
        let webhook = RecordingWebhook::default();
        let dispatcher = Dispatcher::new(
            config(RenderMode::Simple),
            StaticSecrets::new("   "),
            webhook.clone(),
        );

        let err = dispatcher
            .dispatch(sns_event(&[BUCKET_MESSAGE]))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Configuration(_)));
        assert!(webhook.deliveries().is_empty());
    }

    #[tokio::test]
    async fn dispatch_fails_on_unparseable_secret() {
        let webhook = RecordingWebhook::default();
        let dispatcher = Dispatcher::new(
            config(RenderMode::Simple),
            StaticSecrets::new(r#"{"Workspace":"T1"}"#),
            webhook.clone(),
        );

        let err = dispatcher
            .dispatch(sns_event(&[BUCKET_MESSAGE]))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Configuration(_)));
        assert!(webhook.deliveries().is_empty());
    }

    #[tokio::test]
    async fn dispatch_fails_on_message_without_resources() {
        let webhook = RecordingWebhook::default();
        let dispatcher = Dispatcher::new(
            config(RenderMode::Simple),
            StaticSecrets::new(SECRET_JSON),
            webhook.clone(),
        );

        let err = dispatcher
            .dispatch(sns_event(&[
                r#"{"resources":[],"detail":{},"additionalAttributes":{}}"#,
            ]))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::MalformedMessage(_)));
        assert!(webhook.deliveries().is_empty());
    }

    #[tokio::test]
    async fn dispatch_forwards_first_record_only() {
        let webhook = RecordingWebhook::default();
        let dispatcher = Dispatcher::new(
            config(RenderMode::Simple),
            StaticSecrets::new(SECRET_JSON),
            webhook.clone(),
        );

        let second =
            r#"{"resources":["arn:aws:s3:::ignored"],"detail":{},"additionalAttributes":{}}"#;
        dispatcher
            .dispatch(sns_event(&[BUCKET_MESSAGE, second]))
            .await
            .unwrap();

        let deliveries = webhook.deliveries();
        assert_eq!(deliveries.len(), 1);
        assert_eq!(
            deliveries[0].1,
            vec![Block::Context {
                elements: vec![TextObject::plain("✗ arn:aws:s3:::bucket-1")],
            }]
        );
    }

    #[tokio::test]
    async fn dispatch_fetches_secret_fresh_per_invocation() {
        let webhook = RecordingWebhook::default();
        let secrets = StaticSecrets::new(SECRET_JSON);
        let dispatcher = Dispatcher::new(config(RenderMode::Simple), secrets.clone(), webhook);

        dispatcher.dispatch(sns_event(&[BUCKET_MESSAGE])).await.unwrap();
        dispatcher.dispatch(sns_event(&[BUCKET_MESSAGE])).await.unwrap();

        assert_eq!(secrets.fetches.load(Ordering::SeqCst), 2);
    }
}
