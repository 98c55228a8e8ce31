//! Deduplicated change feed for connected clients.
//!
//! The feed hands out strictly increasing revisions and remembers the
//! highest revision seen for each record, dropping re-publishes at or
//! below it, so retries and overlapping writers cannot produce duplicate
//! notifications. Any number of consumers may subscribe; each gets its
//! own broadcast receiver.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::broadcast;
use tracing::debug;
use uuid::Uuid;

/// One change-feed notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedEntry {
    pub record_id: Uuid,
    pub revision: u64,
    pub kind: FeedKind,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeedKind {
    InventoryChanged,
    ChatMessage,
    WarehouseChanged,
}

#[derive(Debug)]
pub struct ChangeFeed {
    seen: DashMap<Uuid, u64>,
    revision: AtomicU64,
    tx: broadcast::Sender<FeedEntry>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            seen: DashMap::new(),
            revision: AtomicU64::new(0),
            tx,
        }
    }

    /// Hands out the next revision, strictly increasing for the life of
    /// the process. Wall-clock time is not used: two changes landing in
    /// the same instant still get distinct revisions.
    pub fn next_revision(&self) -> u64 {
        self.revision.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Publishes an entry unless the record's revision was already seen.
    /// Returns whether the entry was forwarded to subscribers.
    pub fn publish(&self, entry: FeedEntry) -> bool {
        let mut fresh = false;
        self.seen
            .entry(entry.record_id)
            .and_modify(|rev| {
                if entry.revision > *rev {
                    *rev = entry.revision;
                    fresh = true;
                }
            })
            .or_insert_with(|| {
                fresh = true;
                entry.revision
            });

        if !fresh {
            debug!(
                record_id = %entry.record_id,
                revision = entry.revision,
                "dropping duplicate feed entry"
            );
            return false;
        }

        // A send error only means no subscriber is currently connected.
        let _ = self.tx.send(entry);
        true
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedEntry> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(record_id: Uuid, revision: u64) -> FeedEntry {
        FeedEntry {
            record_id,
            revision,
            kind: FeedKind::InventoryChanged,
            occurred_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn duplicate_revision_is_dropped() {
        let feed = ChangeFeed::new(8);
        let mut rx = feed.subscribe();
        let record = Uuid::new_v4();

        assert!(feed.publish(entry(record, 1)));
        assert!(!feed.publish(entry(record, 1)));
        assert!(feed.publish(entry(record, 2)));

        assert_eq!(rx.recv().await.unwrap().revision, 1);
        assert_eq!(rx.recv().await.unwrap().revision, 2);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_revision_is_dropped() {
        let feed = ChangeFeed::new(8);
        let record = Uuid::new_v4();
        assert!(feed.publish(entry(record, 5)));
        assert!(!feed.publish(entry(record, 3)));
    }

    #[tokio::test]
    async fn each_subscriber_receives_every_entry() {
        let feed = ChangeFeed::new(8);
        let mut a = feed.subscribe();
        let mut b = feed.subscribe();
        assert_eq!(feed.subscriber_count(), 2);

        feed.publish(entry(Uuid::new_v4(), 1));
        assert_eq!(a.recv().await.unwrap().revision, 1);
        assert_eq!(b.recv().await.unwrap().revision, 1);
    }

    #[tokio::test]
    async fn issued_revisions_deliver_back_to_back_changes() {
        let feed = ChangeFeed::new(8);
        let mut rx = feed.subscribe();
        let record = Uuid::new_v4();

        // Two immediate changes to the same record must both go out.
        assert!(feed.publish(entry(record, feed.next_revision())));
        assert!(feed.publish(entry(record, feed.next_revision())));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.record_id, record);
        assert!(second.revision > first.revision);
    }

    #[tokio::test]
    async fn publish_without_subscribers_still_records_revision() {
        let feed = ChangeFeed::new(8);
        let record = Uuid::new_v4();
        assert!(feed.publish(entry(record, 1)));

        let mut rx = feed.subscribe();
        assert!(!feed.publish(entry(record, 1)));
        assert!(rx.try_recv().is_err());
    }
}
