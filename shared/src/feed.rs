use std::cmp::Ordering;

use crate::message::{Message, SelfIdentity};

/// Optimistic placeholders older than this are dropped at the next merge.
pub const OPTIMISTIC_TTL_MS: f64 = 5_000.0;

/// Put a backend batch into oldest-first order.
///
/// Batches where every message carries a parseable timestamp are sorted by
/// `(timestamp, id)`; the sort is stable so equal keys keep backend order.
/// Otherwise, if ids are present and run newest-first, the batch is reversed.
/// Anything else is assumed to already be oldest-first.
pub fn normalize_order(mut batch: Vec<Message>) -> Vec<Message> {
    if batch.len() < 2 {
        return batch;
    }

    if batch.iter().all(|m| m.timestamp_millis().is_some()) {
        batch.sort_by(|a, b| {
            a.timestamp_millis()
                .cmp(&b.timestamp_millis())
                .then_with(|| compare_ids(a.id, b.id))
        });
        return batch;
    }

    let first = batch.first().and_then(|m| m.id);
    let last = batch.last().and_then(|m| m.id);
    if let (Some(first), Some(last)) = (first, last)
        && first > last
    {
        batch.reverse();
    }
    batch
}

fn same_message(a: &Message, b: &Message) -> bool {
    match (a.id, b.id) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

/// Messages of `next` with no counterpart in `previous`, counting
/// duplicates: two identical id-less rows in `next` against one in
/// `previous` leave one arrival.
fn new_in_replacement(previous: &[Message], next: &[Message]) -> Vec<Message> {
    let mut claimed = vec![false; previous.len()];
    let mut arrived = Vec::new();
    for m in next {
        let matched = previous
            .iter()
            .enumerate()
            .position(|(i, p)| !claimed[i] && same_message(p, m));
        match matched {
            Some(i) => claimed[i] = true,
            None => arrived.push(m.clone()),
        }
    }
    arrived
}

fn compare_ids(a: Option<u64>, b: Option<u64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        _ => Ordering::Equal,
    }
}

/// How a batch relates to what the feed already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    /// The batch is the complete history; replace everything.
    Full,
    /// The batch holds only messages newer than `since_id`.
    Since(u64),
}

/// Rendered message list for one channel: confirmed backend messages in
/// ascending order followed by optimistic local placeholders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feed {
    channel_id: Option<String>,
    confirmed: Vec<Message>,
    pending: Vec<Message>,
    loaded: bool,
}

impl Feed {
    pub fn for_channel(channel_id: &str) -> Self {
        Self {
            channel_id: Some(channel_id.to_string()),
            ..Self::default()
        }
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.channel_id.as_deref()
    }

    /// `true` once at least one batch has been applied.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_empty(&self) -> bool {
        self.confirmed.is_empty() && self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.confirmed.len() + self.pending.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.confirmed.iter().chain(self.pending.iter())
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Highest confirmed backend id; the cursor for the next incremental fetch.
    pub fn last_confirmed_id(&self) -> Option<u64> {
        self.confirmed.iter().filter_map(|m| m.id).max()
    }

    /// Fetch kind the next poll should use.
    pub fn next_fetch(&self) -> FetchKind {
        match self.last_confirmed_id() {
            Some(id) if self.loaded => FetchKind::Since(id),
            _ => FetchKind::Full,
        }
    }

    /// Merge a backend batch. Returns the number of newly visible confirmed messages.
    pub fn apply(
        &mut self,
        batch: Vec<Message>,
        kind: FetchKind,
        identity: &SelfIdentity,
        now_ms: f64,
    ) -> usize {
        let channel_id = self.channel_id.clone();
        let batch: Vec<Message> = normalize_order(batch)
            .into_iter()
            .filter(|m| channel_id.as_deref().is_none_or(|id| m.belongs_to(id)))
            .map(|mut m| {
                m.pending_since_ms = None;
                m
            })
            .collect();

        let arrived: Vec<Message> = match kind {
            FetchKind::Full => {
                let previous = std::mem::replace(&mut self.confirmed, batch);
                new_in_replacement(&previous, &self.confirmed)
            }
            FetchKind::Since(since) => {
                let mut fresh = Vec::new();
                for m in batch {
                    let is_new = m.id.is_none_or(|id| id > since)
                        && !self.confirmed.iter().any(|c| same_message(c, &m));
                    if is_new {
                        fresh.push(m);
                    }
                }
                self.confirmed.extend(fresh.iter().cloned());
                fresh
            }
        };
        self.loaded = true;

        for echoed in arrived.iter().filter(|m| identity.is_self(m)) {
            if let Some(pos) = self.pending.iter().position(|p| p.content == echoed.content) {
                self.pending.remove(pos);
            }
        }
        self.expire_pending(now_ms);

        arrived.len()
    }

    pub fn push_optimistic(&mut self, message: Message) {
        debug_assert!(message.is_optimistic());
        self.pending.push(message);
    }

    /// Drop the placeholder for a send that failed.
    pub fn remove_optimistic(&mut self, content: &str, created_ms: f64) -> bool {
        let Some(pos) = self
            .pending
            .iter()
            .position(|p| p.content == content && p.pending_since_ms == Some(created_ms))
        else {
            return false;
        };
        self.pending.remove(pos);
        true
    }

    pub fn expire_pending(&mut self, now_ms: f64) {
        self.pending.retain(|p| {
            p.pending_since_ms
                .is_some_and(|created| now_ms - created < OPTIMISTIC_TTL_MS)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::{FetchKind, Feed, OPTIMISTIC_TTL_MS, normalize_order};
    use crate::message::{Message, SelfIdentity};

    fn msg(id: u64, ts: &str, author: &str, content: &str) -> Message {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "channel_id": "7",
            "author_name": author,
            "content": content,
            "timestamp": ts,
        }))
        .expect("fixture should decode")
    }

    fn ids(feed: &Feed) -> Vec<Option<u64>> {
        feed.iter().map(|m| m.id).collect()
    }

    #[test]
    fn descending_timestamps_become_ascending() {
        let batch = vec![
            msg(3, "2026-03-01T10:02:00Z", "a", "third"),
            msg(2, "2026-03-01T10:01:00Z", "a", "second"),
            msg(1, "2026-03-01T10:00:00Z", "a", "first"),
        ];
        let ordered: Vec<_> = normalize_order(batch)
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(ordered, vec!["first", "second", "third"]);
    }

    #[test]
    fn equal_timestamps_break_ties_by_id() {
        let batch = vec![
            msg(5, "2026-03-01T10:00:00Z", "a", "b"),
            msg(4, "2026-03-01T10:00:00Z", "a", "a"),
        ];
        let ordered: Vec<_> = normalize_order(batch).into_iter().map(|m| m.id).collect();
        assert_eq!(ordered, vec![Some(4), Some(5)]);
    }

    #[test]
    fn clock_only_timestamps_fall_back_to_id_direction() {
        let batch = vec![
            msg(9, "14:05", "a", "newest"),
            msg(8, "14:04", "a", "older"),
        ];
        let ordered: Vec<_> = normalize_order(batch).into_iter().map(|m| m.id).collect();
        assert_eq!(ordered, vec![Some(8), Some(9)]);

        let already_ascending = vec![msg(1, "14:04", "a", "x"), msg(2, "14:05", "a", "y")];
        let ordered: Vec<_> = normalize_order(already_ascending)
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(ordered, vec![Some(1), Some(2)]);
    }

    #[test]
    fn incremental_fetch_appends_only_unseen_ids() {
        let identity = SelfIdentity::default();
        let mut feed = Feed::for_channel("7");
        assert_eq!(feed.next_fetch(), FetchKind::Full);

        let added = feed.apply(
            vec![
                msg(1, "2026-03-01T10:00:00Z", "a", "x"),
                msg(2, "2026-03-01T10:01:00Z", "a", "y"),
            ],
            FetchKind::Full,
            &identity,
            0.0,
        );
        assert_eq!(added, 2);
        assert_eq!(feed.next_fetch(), FetchKind::Since(2));

        let added = feed.apply(
            vec![
                msg(2, "2026-03-01T10:01:00Z", "a", "y"),
                msg(3, "2026-03-01T10:02:00Z", "a", "z"),
            ],
            FetchKind::Since(2),
            &identity,
            0.0,
        );
        assert_eq!(added, 1);
        assert_eq!(ids(&feed), vec![Some(1), Some(2), Some(3)]);
    }

    #[test]
    fn messages_from_other_channels_are_filtered() {
        let mut feed = Feed::for_channel("8");
        feed.apply(
            vec![msg(1, "2026-03-01T10:00:00Z", "a", "x")],
            FetchKind::Full,
            &SelfIdentity::default(),
            0.0,
        );
        assert!(feed.is_empty());
        assert!(feed.is_loaded());
    }

    #[test]
    fn echoed_send_replaces_optimistic_placeholder() {
        let identity = SelfIdentity::default();
        let mut feed = Feed::for_channel("7");
        feed.push_optimistic(Message::optimistic("7", "WebAgent", "on my way", 1_000.0));
        assert_eq!(feed.len(), 1);

        feed.apply(
            vec![msg(1, "2026-03-01T10:00:00Z", "WebAgent", "on my way")],
            FetchKind::Full,
            &identity,
            1_500.0,
        );
        assert_eq!(feed.pending_count(), 0);
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn echo_from_someone_else_keeps_placeholder() {
        let mut feed = Feed::for_channel("7");
        feed.push_optimistic(Message::optimistic("7", "WebAgent", "gg", 1_000.0));
        feed.apply(
            vec![msg(1, "2026-03-01T10:00:00Z", "striker99", "gg")],
            FetchKind::Full,
            &SelfIdentity::default(),
            1_500.0,
        );
        assert_eq!(feed.pending_count(), 1);
        assert!(feed.iter().last().is_some_and(Message::is_optimistic));
    }

    #[test]
    fn repeated_idless_echo_counts_as_arrival() {
        let row = |content: &str| -> Message {
            serde_json::from_value(serde_json::json!({
                "sender": "WebAgent",
                "content": content,
                "timestamp": "14:05",
            }))
            .expect("fixture should decode")
        };
        let identity = SelfIdentity::default();
        let mut feed = Feed::for_channel("7");
        feed.apply(vec![row("ok")], FetchKind::Full, &identity, 0.0);

        feed.push_optimistic(Message::optimistic("7", "WebAgent", "ok", 1_000.0));
        let added = feed.apply(vec![row("ok"), row("ok")], FetchKind::Full, &identity, 1_200.0);

        assert_eq!(added, 1);
        assert_eq!(feed.pending_count(), 0);
        assert_eq!(feed.len(), 2);
    }

    #[test]
    fn stale_placeholders_expire_after_ttl() {
        let mut feed = Feed::for_channel("7");
        feed.push_optimistic(Message::optimistic("7", "WebAgent", "lost", 0.0));
        feed.apply(Vec::new(), FetchKind::Full, &SelfIdentity::default(), OPTIMISTIC_TTL_MS - 1.0);
        assert_eq!(feed.pending_count(), 1);
        feed.apply(Vec::new(), FetchKind::Full, &SelfIdentity::default(), OPTIMISTIC_TTL_MS);
        assert_eq!(feed.pending_count(), 0);
    }

    #[test]
    fn failed_send_removes_its_placeholder_only() {
        let mut feed = Feed::for_channel("7");
        feed.push_optimistic(Message::optimistic("7", "WebAgent", "same", 10.0));
        feed.push_optimistic(Message::optimistic("7", "WebAgent", "same", 20.0));
        assert!(feed.remove_optimistic("same", 20.0));
        assert!(!feed.remove_optimistic("same", 20.0));
        assert_eq!(feed.pending_count(), 1);
    }
}
