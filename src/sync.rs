use std::{future::Future, sync::Arc, time::Duration};
use tokio::{sync::Notify, time};

/// Wake-up signal raised whenever protocol state that somebody may be waiting on changes.
#[derive(Clone, Default)]
pub struct Signal(pub Arc<Notify>);

impl Signal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&self) {
        self.0.notify_waiters();
    }

    /// Function that waits until `ready` holds.
    ///
    /// The predicate is re-checked after every wake-up and at least once per `poll`, so wake-ups
    /// that coalesce several changes, or that race with the check itself, are never lost.
    pub async fn wait_until<F, Fut>(&self, poll: Duration, mut ready: F)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = bool>,
    {
        loop {
            let notified = self.0.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if ready().await {
                return;
            }

            let _ = time::timeout(poll, notified).await;
        }
    }
}
