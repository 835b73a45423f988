use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A single value in the message's free-form `detail` map.
///
/// The inbound JSON carries arbitrary scalars here; anything more exotic
/// (nested objects, arrays) is rejected at decode time rather than carried
/// around as an untyped blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    String(String),
    Number(f64),
    Bool(bool),
    Null,
}

impl fmt::Display for DetailValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetailValue::String(s) => write!(f, "{}", s),
            DetailValue::Number(n) => write!(f, "{}", n),
            DetailValue::Bool(b) => write!(f, "{}", b),
            DetailValue::Null => write!(f, "null"),
        }
    }
}

/// Insertion-ordered key/value annotations attached to a message.
///
/// Rendering iterates this map in the order the keys appeared in the
/// inbound JSON, so repeated renders of the same payload produce the same
/// field order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailMap(Vec<(String, DetailValue)>);

impl DetailMap {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn insert(&mut self, key: impl Into<String>, value: DetailValue) {
        self.0.push((key.into(), value));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DetailValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for DetailMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DetailMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DetailMapVisitor;

        impl<'de> Visitor<'de> for DetailMapVisitor {
            type Value = DetailMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of scalar detail values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((key, value)) = access.next_entry::<String, DetailValue>()? {
                    entries.push((key, value));
                }
                Ok(DetailMap(entries))
            }
        }

        deserializer.deserialize_map(DetailMapVisitor)
    }
}

impl FromIterator<(String, DetailValue)> for DetailMap {
    fn from_iter<I: IntoIterator<Item = (String, DetailValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// A single failed action reported alongside a build notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedAction {
    #[serde(rename = "additionalInformation")]
    pub additional_information: String,
}

/// Optional attributes carried alongside the core message fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalAttributes {
    #[serde(
        rename = "failedActions",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub failed_actions: Option<Vec<FailedAction>>,
}

/// The structured payload embedded in an SNS record's message body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildMessage {
    /// Free-form key/value annotations, rendered as a field table.
    #[serde(default)]
    pub detail: DetailMap,
    /// Identifiers of the resources affected by the event.
    #[serde(default)]
    pub resources: Vec<String>,
    #[serde(rename = "additionalAttributes", default)]
    pub additional_attributes: AdditionalAttributes,
}

/// The decoded secret payload: the three path segments of a Slack
/// incoming-webhook URL.
///
/// Fetched fresh on every dispatch and held only for the duration of that
/// dispatch, never cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WebhookSecret {
    pub workspace: String,
    pub channel: String,
    pub webhook: String,
}

/// Which renderer variant the dispatcher uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RenderMode {
    /// One-line summary of the first affected resource (observed behavior).
    #[default]
    Simple,
    /// Header, detail field table, resource list, failed actions, ack control.
    Rich,
}

impl std::str::FromStr for RenderMode {
    type Err = crate::error::RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple" => Ok(RenderMode::Simple),
            "rich" => Ok(RenderMode::Rich),
            other => Err(crate::error::RelayError::Configuration(format!(
                "unknown render mode '{}', expected 'simple' or 'rich'",
                other
            ))),
        }
    }
}

impl fmt::Display for RenderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderMode::Simple => write!(f, "simple"),
            RenderMode::Rich => write!(f, "rich"),
        }
    }
}
