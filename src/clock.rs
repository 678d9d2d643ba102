//! Module that contains the Lamport clock of a process.

use tokio::sync::Mutex;

pub type Timestamp = u64;

/// Scalar logical clock shared by the instruction stream and every connection task.
#[derive(Debug, Default)]
pub struct LogicalClock(Mutex<Timestamp>);

impl LogicalClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Function that advances the clock for a local event and returns the new value.
    pub async fn tick(&self) -> Timestamp {
        let mut current = self.0.lock().await;
        *current = current.saturating_add(1);
        *current
    }

    /// Function that merges a timestamp carried by an inbound message.
    ///
    /// The clock only moves when `remote >= current`, in which case it jumps to `remote + 1`.
    /// An older remote timestamp leaves it untouched. The clock saturates at `Timestamp::MAX`.
    pub async fn observe(&self, remote: Timestamp) -> Timestamp {
        let mut current = self.0.lock().await;
        if remote >= *current {
            *current = remote.saturating_add(1);
        }
        *current
    }

    pub async fn now(&self) -> Timestamp {
        *self.0.lock().await
    }
}
