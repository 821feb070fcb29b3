use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static MENTION_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<@([!&]?)(\d+)>").expect("mention pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MentionKind {
    User,
    Role,
}

/// A `<@id>`, `<@!id>` or `<@&id>` reference inside message text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MentionToken {
    pub kind: MentionKind,
    pub id: String,
}

impl MentionToken {
    pub fn user(id: impl Into<String>) -> Self {
        Self {
            kind: MentionKind::User,
            id: id.into(),
        }
    }

    pub fn role(id: impl Into<String>) -> Self {
        Self {
            kind: MentionKind::Role,
            id: id.into(),
        }
    }

    fn from_captures(marker: &str, id: &str) -> Self {
        if marker == "&" {
            Self::role(id)
        } else {
            Self::user(id)
        }
    }
}

/// Every mention token in `text`, in order of appearance.
pub fn scan_mentions(text: &str) -> Vec<MentionToken> {
    MENTION_TOKEN
        .captures_iter(text)
        .map(|caps| MentionToken::from_captures(&caps[1], &caps[2]))
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MentionLookupRequest {
    pub users: Vec<String>,
    pub roles: Vec<String>,
}

impl MentionLookupRequest {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.roles.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum UserDisplay {
    Name(String),
    Detailed {
        display: String,
        #[serde(default)]
        tag: Option<String>,
    },
}

impl UserDisplay {
    pub fn display(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Detailed { display, .. } => display,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MentionLookupResponse {
    #[serde(default)]
    pub users: HashMap<String, UserDisplay>,
    #[serde(default)]
    pub roles: HashMap<String, String>,
}

/// Cache of resolved mention names plus the batching state for lookups.
///
/// Ids are requested at most once while they are cached or in flight, and
/// only one batch is outstanding at any time. A failed batch releases its
/// ids so a later render may ask again.
#[derive(Debug, Clone, Default)]
pub struct MentionResolver {
    resolved: HashMap<MentionToken, String>,
    requested: HashSet<MentionToken>,
    queued: BTreeSet<MentionToken>,
    in_flight: Option<Vec<MentionToken>>,
    /// Set when a failed batch gave its ids back; cleared by the next enqueue.
    released: bool,
}

impl MentionResolver {
    pub fn name_for(&self, token: &MentionToken) -> Option<&str> {
        self.resolved.get(token).map(String::as_str)
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn queued_len(&self) -> usize {
        self.queued.len()
    }

    /// `true` after a failed lookup until the feed is scanned again, so the
    /// next poll knows to retry even when no new messages arrived.
    pub fn needs_rescan(&self) -> bool {
        self.released
    }

    /// Queue unresolved tokens. Returns how many were newly queued.
    pub fn enqueue<I>(&mut self, tokens: I) -> usize
    where
        I: IntoIterator<Item = MentionToken>,
    {
        self.released = false;
        let mut added = 0;
        for token in tokens {
            if self.resolved.contains_key(&token) || self.requested.contains(&token) {
                continue;
            }
            if self.queued.insert(token) {
                added += 1;
            }
        }
        added
    }

    /// Next batch to send, or `None` when one is outstanding or nothing is queued.
    pub fn take_batch(&mut self) -> Option<MentionLookupRequest> {
        if self.in_flight.is_some() || self.queued.is_empty() {
            return None;
        }
        let batch: Vec<MentionToken> = std::mem::take(&mut self.queued).into_iter().collect();
        let mut request = MentionLookupRequest::default();
        for token in &batch {
            match token.kind {
                MentionKind::User => request.users.push(token.id.clone()),
                MentionKind::Role => request.roles.push(token.id.clone()),
            }
            self.requested.insert(token.clone());
        }
        self.in_flight = Some(batch);
        Some(request)
    }

    /// Record a successful lookup. Ids the backend did not know stay
    /// requested and render as raw ids.
    pub fn complete(&mut self, response: MentionLookupResponse) {
        self.in_flight = None;
        for (id, display) in response.users {
            self.resolved
                .insert(MentionToken::user(id), display.display().to_string());
        }
        for (id, name) in response.roles {
            self.resolved.insert(MentionToken::role(id), name);
        }
    }

    pub fn fail(&mut self) {
        if let Some(batch) = self.in_flight.take() {
            for token in batch {
                self.requested.remove(&token);
            }
            self.released = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MentionKind, MentionLookupResponse, MentionResolver, MentionToken, scan_mentions};

    #[test]
    fn scans_user_nickname_and_role_tokens() {
        let tokens = scan_mentions("hey <@123> and <@!456>, ping <@&789> but not <@abc>");
        assert_eq!(
            tokens,
            vec![
                MentionToken::user("123"),
                MentionToken::user("456"),
                MentionToken::role("789"),
            ]
        );
        assert_eq!(tokens[2].kind, MentionKind::Role);
    }

    #[test]
    fn only_one_batch_is_outstanding() {
        let mut resolver = MentionResolver::default();
        resolver.enqueue([MentionToken::user("1"), MentionToken::role("2")]);
        let batch = resolver.take_batch().expect("first batch");
        assert_eq!(batch.users, vec!["1"]);
        assert_eq!(batch.roles, vec!["2"]);

        resolver.enqueue([MentionToken::user("3")]);
        assert!(resolver.take_batch().is_none(), "second batch waits for the first");

        resolver.complete(MentionLookupResponse::default());
        let batch = resolver.take_batch().expect("queued id goes out next");
        assert_eq!(batch.users, vec!["3"]);
    }

    #[test]
    fn resolved_and_requested_ids_are_not_requeued() {
        let mut resolver = MentionResolver::default();
        resolver.enqueue([MentionToken::user("1"), MentionToken::user("1")]);
        assert_eq!(resolver.queued_len(), 1);
        resolver.take_batch().expect("batch");

        assert_eq!(resolver.enqueue([MentionToken::user("1")]), 0, "in flight");

        let response: MentionLookupResponse = serde_json::from_str(
            r#"{"users": {"1": {"display": "Striker", "tag": "striker#0001"}}, "roles": {}}"#,
        )
        .expect("response decodes");
        resolver.complete(response);
        assert_eq!(resolver.name_for(&MentionToken::user("1")), Some("Striker"));
        assert_eq!(resolver.enqueue([MentionToken::user("1")]), 0, "cached");
    }

    #[test]
    fn failed_batch_can_be_retried() {
        let mut resolver = MentionResolver::default();
        resolver.enqueue([MentionToken::role("9")]);
        resolver.take_batch().expect("batch");
        assert!(!resolver.needs_rescan());
        resolver.fail();
        assert!(!resolver.is_in_flight());
        assert!(resolver.needs_rescan(), "next poll should scan again");
        assert_eq!(resolver.enqueue([MentionToken::role("9")]), 1);
        assert!(!resolver.needs_rescan());
    }

    #[test]
    fn plain_string_user_display_decodes() {
        let response: MentionLookupResponse =
            serde_json::from_str(r#"{"users": {"5": "Keeper"}, "roles": {"6": "Staff"}}"#)
                .expect("response decodes");
        let mut resolver = MentionResolver::default();
        resolver.complete(response);
        assert_eq!(resolver.name_for(&MentionToken::user("5")), Some("Keeper"));
        assert_eq!(resolver.name_for(&MentionToken::role("6")), Some("Staff"));
    }
}
