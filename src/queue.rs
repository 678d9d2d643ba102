//! Module that contains the ordered queue of pending mutual-exclusion requests.

use crate::{clock::Timestamp, peer::PeerId};
use std::{collections::BTreeSet, fmt};
use tokio::sync::Mutex;

/// One pending request, ordered by timestamp and then by peer id.
///
/// The field order matters: the derived `Ord` is the lexicographic `(timestamp, peer)` order
/// that every process agrees on, so equal timestamps always resolve to the lower peer id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestRecord {
    pub timestamp: Timestamp,
    pub peer: PeerId,
}

impl RequestRecord {
    pub fn new(timestamp: Timestamp, peer: PeerId) -> Self {
        Self { timestamp, peer }
    }
}

impl fmt::Display for RequestRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.timestamp, self.peer)
    }
}

#[derive(Debug, Default)]
pub struct RequestQueue(Mutex<BTreeSet<RequestRecord>>);

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Function that adds a request. Returns `false` if the exact pair was already queued.
    pub async fn insert(&self, record: RequestRecord) -> bool {
        self.0.lock().await.insert(record)
    }

    /// Function that drops a request. Removing a request that is not queued is a no-op.
    pub async fn remove(&self, record: RequestRecord) -> bool {
        self.0.lock().await.remove(&record)
    }

    pub async fn head_is(&self, record: RequestRecord) -> bool {
        self.0.lock().await.first() == Some(&record)
    }

    pub async fn head(&self) -> Option<RequestRecord> {
        self.0.lock().await.first().copied()
    }

    pub async fn len(&self) -> usize {
        self.0.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.0.lock().await.is_empty()
    }

    /// Function that copies the queue out in order.
    pub async fn snapshot(&self) -> Vec<RequestRecord> {
        self.0.lock().await.iter().copied().collect()
    }
}
