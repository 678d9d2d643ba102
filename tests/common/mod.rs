#![allow(dead_code)]

use async_trait::async_trait;
use lamport_lock::{
    engine::{Engine, Outbox},
    executor::CriticalSection,
    message::Message,
    peer::PeerId,
};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};
use tokio::sync::mpsc;

pub const POLL: Duration = Duration::from_millis(5);

/// Critical section that remembers who entered and whether two peers were ever inside at once.
/// The duration is taken as milliseconds to keep tests fast.
#[derive(Default)]
pub struct Recorder {
    active: AtomicUsize,
    overlapped: AtomicBool,
    entries: Mutex<Vec<PeerId>>,
}

impl Recorder {
    pub fn entries(&self) -> Vec<PeerId> {
        self.entries.lock().unwrap().clone()
    }

    pub fn overlapped(&self) -> bool {
        self.overlapped.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CriticalSection for Recorder {
    async fn run(&self, peer: PeerId, duration: u64) {
        if self.active.fetch_add(1, Ordering::SeqCst) != 0 {
            self.overlapped.store(true, Ordering::SeqCst);
        }
        self.entries.lock().unwrap().push(peer);
        tokio::time::sleep(Duration::from_millis(duration)).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Messages waiting to be delivered by hand with [`ManualMesh::pump`].
#[derive(Default)]
pub struct Pending(Mutex<VecDeque<(PeerId, Message)>>);

#[async_trait]
impl Outbox for Pending {
    async fn send(&self, to: PeerId, message: Message) {
        self.0.lock().unwrap().push_back((to, message));
    }
}

/// Engines wired together through a single queue that the test drains explicitly.
pub struct ManualMesh {
    pub engines: Vec<Arc<Engine>>,
    pending: Arc<Pending>,
}

impl ManualMesh {
    pub fn new(peers: usize) -> Self {
        let pending = Arc::new(Pending::default());
        let engines = (0..peers)
            .map(|id| Arc::new(Engine::new(id, peers, pending.clone(), POLL)))
            .collect();
        Self { engines, pending }
    }

    /// Delivers every pending message, including the ones sent while delivering.
    pub async fn pump(&self) -> usize {
        let mut delivered = 0;
        loop {
            let next = self.pending.0.lock().unwrap().pop_front();
            let Some((to, message)) = next else {
                return delivered;
            };
            self.engines[to].handle(message).await;
            delivered += 1;
        }
    }

    /// Drops every pending message without delivering it.
    pub fn lose_all(&self) -> usize {
        let mut pending = self.pending.0.lock().unwrap();
        let lost = pending.len();
        pending.clear();
        lost
    }
}

struct ChannelOutbox(Vec<mpsc::UnboundedSender<Message>>);

#[async_trait]
impl Outbox for ChannelOutbox {
    async fn send(&self, to: PeerId, message: Message) {
        let _ = self.0[to].send(message);
    }
}

/// Engines wired together through per-peer channels, each drained by its own task in order.
pub fn auto_mesh(peers: usize) -> Vec<Arc<Engine>> {
    let (senders, receivers): (Vec<_>, Vec<_>) =
        (0..peers).map(|_| mpsc::unbounded_channel()).unzip();
    let outbox = Arc::new(ChannelOutbox(senders));

    let engines: Vec<_> = (0..peers)
        .map(|id| Arc::new(Engine::new(id, peers, outbox.clone(), POLL)))
        .collect();

    for (engine, mut inbox) in engines.iter().cloned().zip(receivers) {
        tokio::spawn(async move {
            while let Some(message) = inbox.recv().await {
                engine.handle(message).await;
            }
        });
    }

    engines
}
