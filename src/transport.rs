//! Module that sends messages to other peers, one short-lived connection per message.

use crate::{
    engine::Outbox,
    log,
    message::Message,
    peer::{AddressBook, PeerId},
};
use async_trait::async_trait;
use color_print::cformat;
use futures::SinkExt;
use std::{error::Error, net::SocketAddr, time::Duration};
use tokio::{net::TcpStream, time};
use tokio_util::codec::{Framed, LinesCodec};

/// Function that opens a connection to `address`, writes one line and closes it again.
pub async fn send_line(
    address: SocketAddr,
    message: &Message,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let stream = TcpStream::connect(address).await?;
    let mut lines = Framed::new(stream, LinesCodec::new());
    lines.send(message.to_string()).await?;
    SinkExt::<String>::close(&mut lines).await?;
    Ok(())
}

/// Outbox that delivers every message over a fresh TCP connection, without retrying.
#[derive(Debug, Clone)]
pub struct TcpOutbox {
    pub book: AddressBook,
}

impl TcpOutbox {
    pub fn new(book: AddressBook) -> Self {
        Self { book }
    }
}

#[async_trait]
impl Outbox for TcpOutbox {
    async fn send(&self, to: PeerId, message: Message) {
        let Some(peer) = self.book.peer(to) else {
            log::warn(&cformat!("No address for peer <bold>{to}</bold>, dropping {message}."));
            return;
        };

        if let Err(e) = send_line(peer.address, &message).await {
            log::debug(&cformat!(
                "Lost <bold>{message}</bold> to peer {to} at {}: {e}",
                peer.address
            ));
        }
    }
}

/// Function that says `HELLO` to every other peer, retrying each one until its listener answers.
///
/// Peers are contacted one after the other in id order. This only tells this process that every
/// listener was reachable once; the other processes may still be starting.
pub async fn handshake(book: &AddressBook, own: PeerId, retry: Duration) {
    let hello = Message::Hello { sender: own };

    for peer in book.others(own) {
        let mut attempts = 1u64;
        while let Err(e) = send_line(peer.address, &hello).await {
            log::debug(&format!(
                "Peer {} at {} not reachable yet (attempt {attempts}): {e}",
                peer.id, peer.address
            ));
            attempts += 1;
            time::sleep(retry).await;
        }
        log::debug(&cformat!("Said <bold>hello</bold> to peer {}.", peer.id));
    }

    log::info(&cformat!("Reached <bold>every peer</bold>."));
}
