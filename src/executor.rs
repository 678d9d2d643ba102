//! Module that runs the critical section once a process has been granted access.

use crate::{log, peer::PeerId};
use async_trait::async_trait;
use color_print::cformat;
use std::path::PathBuf;
use tokio::process::Command;

/// Work performed while holding the distributed lock. Returns once the section is over.
#[async_trait]
pub trait CriticalSection: Send + Sync {
    async fn run(&self, peer: PeerId, duration: u64);
}

/// Critical section backed by an external program invoked as `<program> <peer> <duration>`.
///
/// The exit status is not inspected. A program that can't be spawned is logged and counts as
/// a finished section, so the lock is still released.
#[derive(Debug, Clone)]
pub struct ExternalExecutor {
    pub program: PathBuf,
}

impl ExternalExecutor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

#[async_trait]
impl CriticalSection for ExternalExecutor {
    async fn run(&self, peer: PeerId, duration: u64) {
        let status = Command::new(&self.program)
            .arg(peer.to_string())
            .arg(duration.to_string())
            .status()
            .await;

        match status {
            Ok(status) => log::debug(&format!("Critical section exited with {status}.")),
            Err(e) => log::error(&cformat!(
                "Couldn't run <bold>{}</bold>: {e}",
                self.program.display()
            )),
        }
    }
}
