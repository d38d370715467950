//! Memory types for the Ageni system
//!
//! Defines the payload stored alongside every vector and the role of the
//! speaker it came from.

use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Value of the `source` field on every record written by this crate
pub const MEMORY_SOURCE: &str = "risu_ai";

/// A single memory as stored in a vector point payload.
///
/// Records are append-only: created once by the manager and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// The remembered message
    pub text: String,
    /// Character or chat name this memory belongs to
    pub context: String,
    /// Who said it
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Creation time, unix seconds with sub-second precision
    pub timestamp: f64,
    /// Category tags, see [`KeywordTaxonomy`](crate::memory::KeywordTaxonomy)
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Origin marker
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    MEMORY_SOURCE.to_string()
}

impl MemoryRecord {
    /// Create a record stamped with the current time
    pub fn new(
        text: String,
        context: String,
        message_type: MessageType,
        keywords: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            text,
            context,
            message_type,
            timestamp: now.timestamp_micros() as f64 / 1_000_000.0,
            keywords,
            source: default_source(),
        }
    }
}

/// Speaker of a remembered message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// The human side of the chat
    User,
    /// The character being role-played
    Character,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageType::User => write!(f, "user"),
            MessageType::Character => write!(f, "character"),
        }
    }
}

impl FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageType::User),
            "character" => Ok(MessageType::Character),
            _ => Err(format!("Unknown message type: {s}. Use user or character.")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_creation() {
        let before = Utc::now().timestamp() as f64;
        let record = MemoryRecord::new(
            "My name is Alice".to_string(),
            "Seraphina".to_string(),
            MessageType::User,
            vec!["user_my".to_string(), "personal_name".to_string()],
        );

        assert_eq!(record.text, "My name is Alice");
        assert_eq!(record.context, "Seraphina");
        assert_eq!(record.message_type, MessageType::User);
        assert_eq!(record.keywords.len(), 2);
        assert_eq!(record.source, MEMORY_SOURCE);
        assert!(record.timestamp >= before);
    }

    #[test]
    fn test_record_payload_shape() {
        let record = MemoryRecord::new(
            "hello".to_string(),
            "Bob".to_string(),
            MessageType::Character,
            vec![],
        );

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["type"], "character");
        assert_eq!(value["source"], "risu_ai");
        assert_eq!(value["context"], "Bob");
        assert!(value["timestamp"].is_f64());
        assert!(value.get("message_type").is_none());
    }

    #[test]
    fn test_record_from_foreign_payload() {
        // Written by another client without keywords/source
        let value = serde_json::json!({
            "text": "It was raining",
            "context": "Bob",
            "type": "user",
            "timestamp": 1700000000
        });

        let record: MemoryRecord = serde_json::from_value(value).unwrap();
        assert_eq!(record.timestamp, 1_700_000_000.0);
        assert!(record.keywords.is_empty());
        assert_eq!(record.source, MEMORY_SOURCE);
    }

    #[test]
    fn test_message_type_parsing() {
        assert_eq!("user".parse::<MessageType>().unwrap(), MessageType::User);
        assert_eq!("Character".parse::<MessageType>().unwrap(), MessageType::Character);
        assert!("narrator".parse::<MessageType>().is_err());
        assert_eq!(MessageType::Character.to_string(), "character");
    }
}
