//! Runtime settings of a process: where peers listen, how often waits re-check, and which
//! program runs the critical section.

use crate::{
    error::{Error, Result},
    peer::AddressBook,
};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_BASE_PORT: u16 = 50000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: IpAddr,
    pub base_port: u16,
    /// Upper bound between two checks of a grant or `Wait` condition.
    pub poll_interval_ms: u64,
    /// Backoff between failed handshake connection attempts.
    pub connect_retry_ms: u64,
    /// Delay between binding the listener and starting the handshake.
    pub startup_delay_ms: u64,
    /// Time left for in-flight messages after the script is exhausted.
    pub exit_grace_ms: u64,
    pub max_line_length: usize,
    pub executor: PathBuf,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            base_port: DEFAULT_BASE_PORT,
            poll_interval_ms: 100,
            connect_retry_ms: 100,
            startup_delay_ms: 200,
            exit_grace_ms: 1000,
            max_line_length: 4096,
            executor: PathBuf::from("./critical"),
            verbose: false,
        }
    }
}

impl Config {
    /// Function that reads a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json_str(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(Error::Config("poll_interval_ms must be positive".into()));
        }
        if self.connect_retry_ms == 0 {
            return Err(Error::Config("connect_retry_ms must be positive".into()));
        }
        if self.max_line_length == 0 {
            return Err(Error::Config("max_line_length must be positive".into()));
        }
        Ok(())
    }

    /// Function that builds the address book for `peers` processes.
    pub fn address_book(&self, peers: usize) -> Result<AddressBook> {
        AddressBook::new(self.host, self.base_port, peers).ok_or(Error::PortRange {
            base_port: self.base_port,
            peers,
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn connect_retry(&self) -> Duration {
        Duration::from_millis(self.connect_retry_ms)
    }

    pub fn startup_delay(&self) -> Duration {
        Duration::from_millis(self.startup_delay_ms)
    }

    pub fn exit_grace(&self) -> Duration {
        Duration::from_millis(self.exit_grace_ms)
    }
}
