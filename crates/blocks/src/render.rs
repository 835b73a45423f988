use relay_common::error::RelayError;
use relay_common::types::{BuildMessage, RenderMode};

use crate::block::{Block, CheckboxOption, InputElement, TextObject};

/// Fixed header text for the rich variant.
const HEADER_TEXT: &str = "✗ Build Failed";

/// Render a message with the given variant.
pub fn render(mode: RenderMode, message: &BuildMessage) -> Result<Vec<Block>, RelayError> {
    match mode {
        RenderMode::Simple => render_simple(message),
        RenderMode::Rich => Ok(render_rich(message)),
    }
}

/// Render a one-line summary: a single context block naming the first
/// affected resource.
///
/// Fails with [`RelayError::MalformedMessage`] when `resources` is empty;
/// there is nothing meaningful to summarize without one.
pub fn render_simple(message: &BuildMessage) -> Result<Vec<Block>, RelayError> {
    let resource = message.resources.first().ok_or_else(|| {
        RelayError::MalformedMessage("message has no resources to summarize".into())
    })?;

    Ok(vec![Block::Context {
        elements: vec![TextObject::plain(format!("✗ {}", resource))],
    }])
}

/// Render the full report: header, detail field table, resource list,
/// failed-action list (when present), acknowledgement control.
///
/// Block order is fixed. The failed-actions block is omitted entirely, not
/// rendered empty, when `failedActions` is absent or empty. An empty
/// `resources` list renders as an empty list, not an error.
pub fn render_rich(message: &BuildMessage) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(5);

    blocks.push(Block::Header {
        text: TextObject::plain(HEADER_TEXT),
    });

    let fields = message
        .detail
        .iter()
        .map(|(key, value)| TextObject::mrkdwn(format!("*{}:*\n{}", key, value)))
        .collect();
    blocks.push(Block::Section { fields });

    let mut resource_list = String::new();
    for resource in &message.resources {
        resource_list.push_str(resource);
        resource_list.push('\n');
    }
    blocks.push(Block::Context {
        elements: vec![TextObject::mrkdwn(format!("*resources*:\n{}", resource_list))],
    });

    if let Some(actions) = message
        .additional_attributes
        .failed_actions
        .as_deref()
        .filter(|actions| !actions.is_empty())
    {
        let mut action_list = String::new();
        for action in actions {
            action_list.push_str(&action.additional_information);
            action_list.push('\n');
        }
        blocks.push(Block::Context {
            elements: vec![TextObject::mrkdwn(format!(
                "*failedActions*:\n{}",
                action_list
            ))],
        });
    }

    blocks.push(Block::Input {
        element: InputElement::Checkboxes {
            options: vec![CheckboxOption {
                text: TextObject::plain("*Viewed*"),
                value: "value-0".to_string(),
            }],
        },
        label: TextObject::plain("Viewed"),
    });

    blocks
}
