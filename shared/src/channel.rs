use serde::{Deserialize, Serialize};

use crate::wire;

/// Relay region a ticket channel belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "EU")]
    Eu,
    #[serde(rename = "NA")]
    Na,
    #[serde(rename = "ASIA")]
    Asia,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::Eu, Region::Na, Region::Asia];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "EU" => Some(Self::Eu),
            "NA" => Some(Self::Na),
            "ASIA" => Some(Self::Asia),
            _ => None,
        }
    }

    /// Region guessed from a channel name the way the relay bot tags new
    /// tickets: "eu" wins, then "asia", everything else is NA.
    pub fn infer_from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.contains("eu") {
            Self::Eu
        } else if lower.contains("asia") {
            Self::Asia
        } else {
            Self::Na
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Eu => "EU",
            Self::Na => "NA",
            Self::Asia => "ASIA",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegionFilter {
    #[default]
    All,
    Only(Region),
}

impl RegionFilter {
    pub fn matches(self, channel: &Channel) -> bool {
        match self {
            Self::All => true,
            Self::Only(region) => channel.region() == region,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Only(region) => region.label(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Closed,
    Completed,
    #[serde(other)]
    Unknown,
}

impl TicketStatus {
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }

    /// Two-letter badge shown next to the ticket name.
    pub fn badge(self) -> &'static str {
        if self.is_open() { "OP" } else { "CL" }
    }
}

/// A conversation thread (Discord channel or support ticket) surfaced by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    #[serde(alias = "channel_id", deserialize_with = "wire::string_or_number")]
    pub id: String,
    #[serde(alias = "channel_name", default, deserialize_with = "wire::null_as_default")]
    pub name: String,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<TicketStatus>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, deserialize_with = "wire::null_as_default")]
    pub unread: u32,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
}

impl Channel {
    /// Explicit region tag when the backend sends one, otherwise inferred from the name.
    pub fn region(&self) -> Region {
        self.region
            .as_deref()
            .and_then(Region::parse)
            .unwrap_or_else(|| Region::infer_from_name(&self.name))
    }

    pub fn display_name(&self) -> String {
        if let Some(user) = self.user_name.as_deref().filter(|u| !u.trim().is_empty()) {
            return user.to_string();
        }
        if self.name.trim().is_empty() {
            format!("#{}", self.short_id())
        } else {
            format!("#{}", self.name)
        }
    }

    /// First six characters of the id, ellipsized when truncated.
    pub fn short_id(&self) -> String {
        let mut chars = self.id.chars();
        let head: String = chars.by_ref().take(6).collect();
        if chars.next().is_some() {
            format!("{head}...")
        } else {
            head
        }
    }

    pub fn has_unread(&self) -> bool {
        self.unread > 0
    }
}

/// Channels that pass `filter`, preserving backend order.
pub fn filter_channels(channels: &[Channel], filter: RegionFilter) -> Vec<Channel> {
    channels
        .iter()
        .filter(|c| filter.matches(c))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteTicketRequest {
    pub ticket_id: String,
}

#[cfg(test)]
mod tests {
    use super::{Channel, Region, RegionFilter, TicketStatus, filter_channels};

    fn parse(json: &str) -> Channel {
        serde_json::from_str(json).expect("channel should decode")
    }

    #[test]
    fn decodes_ticket_shape_with_numeric_id() {
        let ch = parse(r#"{"id": 1355062396322058287, "name": "tryout-eu-7", "region": "EU", "unread": 3}"#);
        assert_eq!(ch.id, "1355062396322058287");
        assert_eq!(ch.region(), Region::Eu);
        assert!(ch.has_unread());
        assert_eq!(ch.status, None);
    }

    #[test]
    fn decodes_channel_shape_aliases() {
        let ch = parse(r#"{"channel_id": "42", "channel_name": "general", "status": "closed"}"#);
        assert_eq!(ch.id, "42");
        assert_eq!(ch.name, "general");
        assert_eq!(ch.status, Some(TicketStatus::Closed));
        assert_eq!(ch.status.map(TicketStatus::badge), Some("CL"));
    }

    #[test]
    fn unknown_status_does_not_fail_decode() {
        let ch = parse(r#"{"id": "1", "name": "x", "status": "archived", "unread": null}"#);
        assert_eq!(ch.status, Some(TicketStatus::Unknown));
        assert_eq!(ch.unread, 0);
    }

    #[test]
    fn region_falls_back_to_name_inference() {
        assert_eq!(parse(r#"{"id": "1", "name": "ticket-asia-3"}"#).region(), Region::Asia);
        assert_eq!(parse(r#"{"id": "1", "name": "ticket-12"}"#).region(), Region::Na);
        assert_eq!(
            parse(r#"{"id": "1", "name": "ticket-asia", "region": "eu"}"#).region(),
            Region::Eu
        );
    }

    #[test]
    fn display_name_prefers_user_name() {
        let ch = parse(r#"{"id": "123456789", "name": "tryout", "user_name": "striker99"}"#);
        assert_eq!(ch.display_name(), "striker99");
        assert_eq!(ch.short_id(), "123456...");

        let ch = parse(r#"{"id": "12", "name": "tryout"}"#);
        assert_eq!(ch.display_name(), "#tryout");
        assert_eq!(ch.short_id(), "12");
    }

    #[test]
    fn filter_keeps_backend_order() {
        let channels = vec![
            parse(r#"{"id": "1", "name": "a", "region": "NA"}"#),
            parse(r#"{"id": "2", "name": "b", "region": "EU"}"#),
            parse(r#"{"id": "3", "name": "c", "region": "EU"}"#),
        ];
        let eu: Vec<_> = filter_channels(&channels, RegionFilter::Only(Region::Eu))
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(eu, vec!["2", "3"]);
        assert_eq!(filter_channels(&channels, RegionFilter::All).len(), 3);
    }
}
