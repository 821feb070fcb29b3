use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::wire;

/// Sender name the backend stamps on messages written from the dashboard.
pub const DEFAULT_AGENT_NAME: &str = "WebAgent";

/// A chat message as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Backend row id; used for incremental fetches.
    #[serde(default, deserialize_with = "wire::opt_u64")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// Discord snowflake, when the relay recorded one.
    #[serde(default, deserialize_with = "wire::opt_string_or_number")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, alias = "ticket_id", deserialize_with = "wire::opt_string_or_number")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(alias = "sender", default, deserialize_with = "wire::null_as_default")]
    pub author_name: String,
    #[serde(default, deserialize_with = "wire::opt_string_or_number")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(default, alias = "author_avatar")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub content: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub timestamp: String,
    /// Set only on local placeholders: creation time in epoch milliseconds.
    #[serde(skip)]
    pub pending_since_ms: Option<f64>,
}

impl Message {
    /// Local placeholder for a message that has been sent but not yet echoed back.
    pub fn optimistic(channel_id: &str, author_name: &str, content: &str, now_ms: f64) -> Self {
        let timestamp = DateTime::from_timestamp_millis(now_ms as i64)
            .map(|dt| dt.to_rfc3339())
            .unwrap_or_default();
        Self {
            id: None,
            message_id: None,
            channel_id: Some(channel_id.to_string()),
            author_name: author_name.to_string(),
            author_id: None,
            avatar_url: None,
            content: content.to_string(),
            timestamp,
            pending_since_ms: Some(now_ms),
        }
    }

    pub fn is_optimistic(&self) -> bool {
        self.pending_since_ms.is_some()
    }

    /// Timestamp as epoch milliseconds. Accepts RFC 3339 and the naive
    /// `YYYY-MM-DD HH:MM:SS[.f]` form SQL backends emit. Clock-only strings
    /// such as `"14:05"` carry no date and yield `None`.
    pub fn timestamp_millis(&self) -> Option<i64> {
        parse_timestamp_millis(&self.timestamp)
    }

    pub fn belongs_to(&self, channel_id: &str) -> bool {
        self.channel_id.as_deref().is_none_or(|id| id == channel_id)
    }
}

pub fn parse_timestamp_millis(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc().timestamp_millis())
}

/// Who "we" are in the feed: the relay bot account and the dashboard's sender name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfIdentity {
    pub bot_id: Option<String>,
    pub agent_name: String,
}

impl Default for SelfIdentity {
    fn default() -> Self {
        Self {
            bot_id: None,
            agent_name: DEFAULT_AGENT_NAME.to_string(),
        }
    }
}

impl SelfIdentity {
    pub fn is_self(&self, message: &Message) -> bool {
        if message.is_optimistic() {
            return true;
        }
        if let (Some(bot), Some(author)) = (self.bot_id.as_deref(), message.author_id.as_deref())
            && bot == author
        {
            return true;
        }
        message.author_name == self.agent_name
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotInfo {
    #[serde(deserialize_with = "wire::string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub name: String,
}

/// Body of the send endpoint. Both id spellings are sent so either backend
/// revision accepts it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutgoingMessage {
    pub ticket_id: String,
    pub channel_id: String,
    pub content: String,
}

impl OutgoingMessage {
    pub fn new(channel_id: &str, content: &str) -> Self {
        Self {
            ticket_id: channel_id.to_string(),
            channel_id: channel_id.to_string(),
            content: content.to_string(),
        }
    }
}

/// Response of the send endpoint: `{status}`, `{ok}` or `{error}`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SendAck {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SendAck {
    pub fn rejection(&self) -> Option<String> {
        if let Some(error) = self.error.as_deref() {
            return Some(error.to_string());
        }
        if self.ok == Some(false) {
            return Some(
                self.status
                    .clone()
                    .unwrap_or_else(|| "send rejected".to_string()),
            );
        }
        None
    }
}
