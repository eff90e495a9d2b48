//! Command protocol definitions.
//!
//! On the wire a command is a flat JSON object: `{action, ...params, id,
//! timestamp}`. In memory it is a [`Command`] that keeps those fields as
//! received and offers a typed [`CommandBody`] view of them.

mod body;
mod validation;

pub use body::*;
pub use validation::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::peer::PeerRole;
use crate::types::{Fields, Metadata};

/// A processed, stamped command.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    /// Unique, opaque identifier.
    pub id: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Wire parameters including `action`, exactly as normalized.
    fields: Fields,
    body: CommandBody,
}

impl Command {
    /// Build a command from a complete field map.
    ///
    /// `id` and `timestamp` must be present; everything else goes to the body.
    pub fn from_fields(mut fields: Fields) -> Option<Self> {
        let id = match fields.remove("id")? {
            Value::String(id) => id,
            other => other.to_string(),
        };
        let timestamp = fields.remove("timestamp")?.as_i64()?;
        let body = CommandBody::from_fields(fields.clone());
        Some(Self {
            id,
            timestamp,
            fields,
            body,
        })
    }

    /// Typed view of the parameters.
    pub fn body(&self) -> &CommandBody {
        &self.body
    }

    /// Wire form of the command. Numbers keep their original representation.
    pub fn to_fields(&self) -> Fields {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        fields.insert("timestamp".to_string(), Value::from(self.timestamp));
        fields
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.to_fields())
    }

    pub fn action(&self) -> &str {
        self.body.action()
    }

    pub fn surface(&self) -> Surface {
        self.body.surface()
    }
}

impl Serialize for Command {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_fields().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Command {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = Fields::deserialize(deserializer)?;
        if !fields.contains_key("action") {
            return Err(serde::de::Error::missing_field("action"));
        }
        Command::from_fields(fields)
            .ok_or_else(|| serde::de::Error::custom("command requires id and timestamp"))
    }
}

/// Who submitted a command and from where.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandContext {
    /// Peer id, `http`, or `extension:<name>`.
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<PeerRole>,
    #[serde(default, skip_serializing_if = "Metadata::is_empty")]
    pub metadata: Metadata,
}

impl CommandContext {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            role: None,
            metadata: Metadata::new(),
        }
    }

    pub fn with_role(mut self, role: PeerRole) -> Self {
        self.role = Some(role);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// One record in the command history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub command: Command,
    pub validation: ValidationResult,
    pub context: CommandContext,
    pub recorded_at: DateTime<Utc>,
}
