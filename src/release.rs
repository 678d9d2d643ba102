//! Module that counts completed critical-section cycles per peer, used by `Wait` instructions.

use crate::peer::PeerId;
use tokio::sync::Mutex;

#[derive(Debug)]
pub struct ReleaseCounters(Mutex<Vec<u64>>);

impl ReleaseCounters {
    pub fn new(peers: usize) -> Self {
        Self(Mutex::new(vec![0; peers]))
    }

    /// Function that counts one more release of `peer`. Unknown peers are ignored.
    pub async fn increment(&self, peer: PeerId) -> bool {
        match self.0.lock().await.get_mut(peer) {
            Some(count) => {
                *count += 1;
                true
            }
            None => false,
        }
    }

    pub async fn snapshot(&self, peer: PeerId) -> u64 {
        self.0.lock().await.get(peer).copied().unwrap_or(0)
    }

    pub async fn has_advanced(&self, peer: PeerId, since: u64) -> bool {
        self.snapshot(peer).await > since
    }
}
