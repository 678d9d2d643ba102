//! Module that contains the static address book of the peers taking part in the protocol.

use std::net::{IpAddr, SocketAddr};

pub type PeerId = usize;

/// Largest number of peers a script may declare.
pub const MAX_PEERS: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Peer {
    pub id: PeerId,
    pub address: SocketAddr,
}

/// Fixed mapping from peer id to listening address: `host:(base_port + id)`.
#[derive(Debug, Clone)]
pub struct AddressBook {
    pub host: IpAddr,
    pub base_port: u16,
    pub peers: usize,
}

impl AddressBook {
    /// Function that creates the address book, or `None` when the last port would overflow.
    pub fn new(host: IpAddr, base_port: u16, peers: usize) -> Option<Self> {
        let last = u16::try_from(peers.checked_sub(1)?).ok()?;
        base_port.checked_add(last)?;

        Some(Self {
            host,
            base_port,
            peers,
        })
    }

    pub fn contains(&self, id: PeerId) -> bool {
        id < self.peers
    }

    pub fn peer(&self, id: PeerId) -> Option<Peer> {
        if !self.contains(id) {
            return None;
        }
        let port = self.base_port + u16::try_from(id).ok()?;
        Some(Peer {
            id,
            address: SocketAddr::new(self.host, port),
        })
    }

    /// Function that lists every peer except `own`, in id order.
    pub fn others(&self, own: PeerId) -> impl Iterator<Item = Peer> + '_ {
        (0..self.peers)
            .filter(move |id| *id != own)
            .filter_map(move |id| self.peer(id))
    }
}
