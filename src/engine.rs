//! Module that contains the Lamport mutual-exclusion protocol engine of one process.
//!
//! A cycle goes `Idle → Requesting → WaitingForGrant → InCriticalSection → Releasing → Idle`.
//! Access is granted to the own request `(t, id)` once it is at the head of the local queue
//! and every peer has acknowledged with a timestamp of at least `t`.

use crate::{
    ack::AckTable,
    clock::LogicalClock,
    executor::CriticalSection,
    log,
    message::Message,
    peer::PeerId,
    queue::{RequestQueue, RequestRecord},
    release::ReleaseCounters,
    sync::Signal,
};
use async_trait::async_trait;
use color_print::cformat;
use std::{sync::Arc, time::Duration};
use tokio::sync::Mutex;

/// Outbound side of the transport: best effort, a lost message is simply gone.
#[async_trait]
pub trait Outbox: Send + Sync {
    async fn send(&self, to: PeerId, message: Message);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Requesting,
    WaitingForGrant,
    InCriticalSection,
    Releasing,
}

pub struct Engine {
    id: PeerId,
    peers: usize,
    clock: LogicalClock,
    queue: RequestQueue,
    acks: AckTable,
    releases: ReleaseCounters,
    state: Mutex<CycleState>,
    changed: Signal,
    outbox: Arc<dyn Outbox>,
    poll_interval: Duration,
}

impl Engine {
    pub fn new(id: PeerId, peers: usize, outbox: Arc<dyn Outbox>, poll_interval: Duration) -> Self {
        Self {
            id,
            peers,
            clock: LogicalClock::new(),
            queue: RequestQueue::new(),
            acks: AckTable::new(peers),
            releases: ReleaseCounters::new(peers),
            state: Mutex::new(CycleState::Idle),
            changed: Signal::new(),
            outbox,
            poll_interval,
        }
    }

    pub fn peers(&self) -> usize {
        self.peers
    }

    pub fn clock(&self) -> &LogicalClock {
        &self.clock
    }

    pub fn queue(&self) -> &RequestQueue {
        &self.queue
    }

    pub fn acks(&self) -> &AckTable {
        &self.acks
    }

    pub fn releases(&self) -> &ReleaseCounters {
        &self.releases
    }

    pub async fn state(&self) -> CycleState {
        *self.state.lock().await
    }

    async fn enter(&self, state: CycleState) {
        *self.state.lock().await = state;
    }

    async fn broadcast(&self, message: Message) {
        for peer in (0..self.peers).filter(|peer| *peer != self.id) {
            self.outbox.send(peer, message).await;
        }
    }

    /// Function that stamps a new own request, queues it and broadcasts it.
    pub async fn request(&self) -> RequestRecord {
        self.enter(CycleState::Requesting).await;

        let record = RequestRecord::new(self.clock.tick().await, self.id);
        self.queue.insert(record).await;
        self.acks
            .reset_for_new_request(record.timestamp, self.id)
            .await;
        self.changed.raise();

        log::info(&cformat!("Requesting the <bold>critical section</bold> as {record}."));
        self.broadcast(Message::Request {
            timestamp: record.timestamp,
            requester: self.id,
        })
        .await;

        self.enter(CycleState::WaitingForGrant).await;
        record
    }

    pub async fn is_granted(&self, record: RequestRecord) -> bool {
        self.queue.head_is(record).await && self.acks.all_at_least(record.timestamp).await
    }

    pub async fn wait_for_grant(&self, record: RequestRecord) {
        self.changed
            .wait_until(self.poll_interval, move || self.is_granted(record))
            .await;
        self.enter(CycleState::InCriticalSection).await;
    }

    /// Function that withdraws the own request after the critical section and tells everyone.
    pub async fn release(&self, record: RequestRecord) {
        self.enter(CycleState::Releasing).await;

        self.queue.remove(record).await;
        let timestamp = self.clock.tick().await;
        self.broadcast(Message::Release {
            timestamp,
            released: record,
        })
        .await;
        self.releases.increment(self.id).await;
        self.changed.raise();

        log::info(&cformat!("Released {record} at {timestamp}."));
        self.enter(CycleState::Idle).await;
    }

    /// Function that runs one full cycle around `section`.
    pub async fn lock(&self, duration: u64, section: &dyn CriticalSection) {
        let record = self.request().await;
        self.wait_for_grant(record).await;

        log::info(&cformat!(
            "Entering the <bold>critical section</bold> (duration={duration})."
        ));
        section.run(self.id, duration).await;

        self.release(record).await;
    }

    /// Function that blocks until `peer` completes one more cycle than it had when called.
    pub async fn wait_for_release(&self, peer: PeerId) {
        let since = self.releases.snapshot(peer).await;
        self.wait_for_release_since(peer, since).await;
    }

    pub async fn wait_for_release_since(&self, peer: PeerId, since: u64) {
        self.changed
            .wait_until(self.poll_interval, move || self.releases.has_advanced(peer, since))
            .await;
    }

    /// Function that applies an inbound message.
    pub async fn handle(&self, message: Message) {
        if let Some(unknown) = message.peers().into_iter().find(|peer| *peer >= self.peers) {
            log::warn(&cformat!(
                "Dropping <bold>{}</bold> message: peer {unknown} is not in the address book.",
                message.kind()
            ));
            return;
        }

        message.print_received();
        if let Some(timestamp) = message.timestamp() {
            self.clock.observe(timestamp).await;
        }

        match message {
            Message::Hello { .. } => {}
            Message::Request {
                timestamp,
                requester,
            } => self.on_request(RequestRecord::new(timestamp, requester)).await,
            Message::Ack {
                timestamp,
                sender,
                for_request,
            } => self.on_ack(timestamp, sender, for_request).await,
            Message::Release { released, .. } => self.on_release(released).await,
        }
    }

    async fn on_request(&self, record: RequestRecord) {
        self.queue.insert(record).await;
        self.changed.raise();

        let ack = Message::Ack {
            timestamp: self.clock.tick().await,
            sender: self.id,
            for_request: record,
        };
        self.outbox.send(record.peer, ack).await;
    }

    async fn on_ack(&self, timestamp: u64, sender: PeerId, for_request: RequestRecord) {
        if for_request.peer == self.id {
            self.acks.record(sender, timestamp).await;
            self.changed.raise();
        }
    }

    async fn on_release(&self, released: RequestRecord) {
        self.queue.remove(released).await;
        self.releases.increment(released.peer).await;
        self.changed.raise();
    }
}
