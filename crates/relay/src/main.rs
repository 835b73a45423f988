//! SNS-to-Slack relay Lambda entrypoint.

use aws_lambda_events::event::sns::SnsEvent;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing_subscriber::EnvFilter;

use relay::Dispatcher;
use relay::webhook::SlackWebhook;
use relay_common::config::RelayConfig;
use relay_secrets::ExtensionSecretStore;

async fn handler(
    event: LambdaEvent<SnsEvent>,
    dispatcher: &Dispatcher<ExtensionSecretStore, SlackWebhook>,
) -> Result<(), Error> {
    dispatcher.dispatch(event.payload).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing; CloudWatch adds its own ingestion timestamps.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relay=info,relay_secrets=info,relay_blocks=info".into()),
        )
        .json()
        .init();

    tracing::info!("sns-slack relay starting...");

    // Load configuration once; the dispatcher owns it from here on.
    let config = RelayConfig::from_env()?;

    let dispatcher = Dispatcher::new(config, ExtensionSecretStore::new(), SlackWebhook::new());

    run(service_fn(|event| handler(event, &dispatcher))).await
}
