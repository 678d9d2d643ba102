//! Module that tracks which peers have acknowledged the current request of this process.

use crate::{clock::Timestamp, peer::PeerId};
use tokio::sync::Mutex;

/// Latest acknowledgment timestamp per peer; `None` means "not yet acknowledged".
#[derive(Debug)]
pub struct AckTable(Mutex<Vec<Option<Timestamp>>>);

impl AckTable {
    pub fn new(peers: usize) -> Self {
        Self(Mutex::new(vec![None; peers]))
    }

    /// Function that starts a new cycle: nobody has acknowledged yet except this process itself.
    pub async fn reset_for_new_request(&self, own_timestamp: Timestamp, own_id: PeerId) {
        let mut table = self.0.lock().await;
        table.fill(None);
        if let Some(own) = table.get_mut(own_id) {
            *own = Some(own_timestamp);
        }
    }

    /// Function that stores an acknowledgment, overwriting any earlier one from the same peer.
    /// Returns `false` when `from` is not a known peer.
    pub async fn record(&self, from: PeerId, timestamp: Timestamp) -> bool {
        match self.0.lock().await.get_mut(from) {
            Some(entry) => {
                *entry = Some(timestamp);
                true
            }
            None => false,
        }
    }

    pub async fn all_at_least(&self, threshold: Timestamp) -> bool {
        self.0
            .lock()
            .await
            .iter()
            .all(|entry| matches!(entry, Some(ack) if *ack >= threshold))
    }

    pub async fn get(&self, peer: PeerId) -> Option<Timestamp> {
        self.0.lock().await.get(peer).copied().flatten()
    }
}
