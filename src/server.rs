//! Module that accepts connections from other peers and feeds their messages to the engine.

use crate::{
    engine::Engine,
    error::{Error, Result},
    log,
    message::Message,
};
use color_print::cformat;
use futures::StreamExt;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};

#[derive(Clone)]
pub struct Server {
    pub engine: Arc<Engine>,
    pub max_line_length: usize,
}

/// Function that binds the listening socket of this process.
pub async fn bind(address: SocketAddr) -> Result<TcpListener> {
    TcpListener::bind(address)
        .await
        .map_err(|source| Error::Bind { address, source })
}

impl Server {
    pub fn new(engine: Arc<Engine>, max_line_length: usize) -> Self {
        Self {
            engine,
            max_line_length,
        }
    }

    /// Function that reads one connection line by line until the other side closes it.
    ///
    /// An oversized line is skipped. `Framed` ends the stream with one `None` after a decode
    /// error, so that `None` is read past and the rest of the connection is still handled.
    async fn handle(self, stream: TcpStream, address: SocketAddr) {
        let mut lines = Framed::new(stream, LinesCodec::new_with_max_length(self.max_line_length));
        let mut skipping = false;

        loop {
            match lines.next().await {
                Some(Ok(line)) => match line.parse::<Message>() {
                    Ok(message) => self.engine.handle(message).await,
                    Err(e) => log::debug(&format!("Ignoring line from {address}: {e}")),
                },
                Some(Err(LinesCodecError::MaxLineLengthExceeded)) => {
                    log::debug(&format!("Ignoring an oversized line from {address}."));
                    skipping = true;
                    continue;
                }
                Some(Err(LinesCodecError::Io(e))) => {
                    log::debug(&format!("Connection from {address} failed: {e}"));
                    break;
                }
                None if skipping => {}
                None => break,
            }
            skipping = false;
        }
    }

    /// Function that accepts connections forever, each one handled by its own task.
    pub async fn run(self, listener: TcpListener) {
        loop {
            let (stream, address) = match listener.accept().await {
                Ok(connection) => connection,
                Err(e) => {
                    log::warn(&cformat!("Failed to <bold>accept</bold> a connection: {e}"));
                    continue;
                }
            };

            let server = self.clone();
            tokio::spawn(server.handle(stream, address));
        }
    }
}
