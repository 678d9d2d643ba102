//! Fatal startup errors. Anything that goes wrong after the listener is bound is absorbed.

use std::{io, net::SocketAddr, path::PathBuf};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("couldn't read the instruction script {path}: {source}")]
    ScriptRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("the first line of the script must be the peer count, found `{0}`")]
    PeerCount(String),
    #[error("the peer count must be between 1 and {max}, found {found}")]
    PeerCountRange { found: i64, max: usize },
    #[error("process id {id} is outside the {peers} peers declared by the script")]
    ProcessId { id: usize, peers: usize },
    #[error("base port {base_port} leaves no room for {peers} peers")]
    PortRange { base_port: u16, peers: usize },
    #[error("couldn't read the config file {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("couldn't parse the config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("couldn't listen on {address}: {source}")]
    Bind {
        address: SocketAddr,
        #[source]
        source: io::Error,
    },
}
