//! Slack Block Kit rendering for build notifications.
//!
//! Pure transformation from a decoded [`BuildMessage`] into the block
//! sequence posted to the webhook. Two variants: a one-line summary
//! ([`render_simple`]) and a full report ([`render_rich`]). Both are
//! deterministic and never mutate their input.
//!
//! [`BuildMessage`]: relay_common::types::BuildMessage

pub mod block;
pub mod render;

pub use block::{Block, CheckboxOption, InputElement, TextObject};
pub use render::{render, render_rich, render_simple};
