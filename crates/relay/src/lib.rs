//! SNS-to-Slack notification relay.
//!
//! One Lambda invocation handles one SNS event: decode the embedded build
//! message, fetch the webhook secret, render Slack blocks, post them to
//! the incoming webhook. No retries, no persistence — a failed stage
//! surfaces to the platform as an invocation failure.

pub mod dispatcher;
pub mod webhook;

pub use dispatcher::Dispatcher;
pub use webhook::{SlackWebhook, WebhookSender};
