// ── Log entries ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::convert::parse_timestamp;

/// A single controller log line.
///
/// Treated as an opaque record: the three well-known fields are lifted
/// out, everything else the controller sent is kept in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Timestamp exactly as the controller formatted it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl LogEntry {
    /// Convenience constructor for a bare message.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// `time` parsed into UTC, if it is in a recognised format.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.time.as_deref().and_then(parse_timestamp)
    }
}
