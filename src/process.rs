//! Module that wires together everything one process of the protocol needs.

use crate::{
    config::Config,
    engine::Engine,
    error::{Error, Result},
    executor::CriticalSection,
    log,
    peer::PeerId,
    runner::InstructionRunner,
    script::Script,
    server::{self, Server},
    transport::{self, TcpOutbox},
};
use color_print::cformat;
use std::{path::Path, sync::Arc};
use tokio::time;

#[derive(Debug, Clone)]
pub struct Process {
    pub config: Config,
    pub id: PeerId,
    pub script: Script,
}

impl Process {
    /// Function that checks that `id` and `config` fit the peers declared by `script`.
    pub fn new(config: Config, id: PeerId, script: Script) -> Result<Self> {
        config.validate()?;
        if id >= script.peers {
            return Err(Error::ProcessId {
                id,
                peers: script.peers,
            });
        }
        config.address_book(script.peers)?;

        Ok(Self { config, id, script })
    }

    /// Function that reads the script at `path`. Nothing is bound if the script is invalid.
    pub fn load(config: Config, id: PeerId, path: &Path) -> Result<Self> {
        Self::new(config, id, Script::load(path)?)
    }

    /// Function that runs the whole life of the process: listen, greet every peer, work through
    /// the script, then give in-flight messages a moment before returning.
    pub async fn run(self, section: Arc<dyn CriticalSection>) -> Result<()> {
        let peers = self.script.peers;
        let book = self.config.address_book(peers)?;
        let own = book
            .peer(self.id)
            .ok_or(Error::ProcessId { id: self.id, peers })?;

        let listener = server::bind(own.address).await?;
        log::info(&cformat!(
            "Listening on <bold>{}</bold> as peer {} of {peers}.",
            own.address,
            self.id
        ));

        let engine = Arc::new(Engine::new(
            self.id,
            peers,
            Arc::new(TcpOutbox::new(book.clone())),
            self.config.poll_interval(),
        ));

        let server_thread = tokio::spawn(
            Server::new(engine.clone(), self.config.max_line_length).run(listener),
        );

        time::sleep(self.config.startup_delay()).await;

        let handshake_thread = {
            let id = self.id;
            let retry = self.config.connect_retry();
            tokio::spawn(async move { transport::handshake(&book, id, retry).await })
        };

        InstructionRunner::new(engine, section)
            .run(self.script.for_peer(self.id))
            .await;

        time::sleep(self.config.exit_grace()).await;
        log::info(&cformat!("<bold>Finished</bold>, exiting."));

        handshake_thread.abort();
        server_thread.abort();
        Ok(())
    }
}
