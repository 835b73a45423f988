use serde::{Deserialize, Serialize};

/// A Slack text object: either `plain_text` or `mrkdwn`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    PlainText { text: String, emoji: bool },
    Mrkdwn { text: String },
}

impl TextObject {
    pub fn plain(text: impl Into<String>) -> Self {
        TextObject::PlainText {
            text: text.into(),
            emoji: true,
        }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        TextObject::Mrkdwn { text: text.into() }
    }
}

/// A single option inside a checkboxes input element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckboxOption {
    pub text: TextObject,
    pub value: String,
}

/// Interactive element carried by an input block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputElement {
    Checkboxes { options: Vec<CheckboxOption> },
}

/// One unit of rendered message content, in Slack Block Kit wire shape.
///
/// Constructed once by the renderer and serialized into the webhook body;
/// nothing inspects a block after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Context {
        elements: Vec<TextObject>,
    },
    Header {
        text: TextObject,
    },
    Section {
        fields: Vec<TextObject>,
    },
    Input {
        element: InputElement,
        label: TextObject,
    },
}
