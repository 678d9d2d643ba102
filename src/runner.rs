//! Module that drives the engine through the instructions of this process, one at a time.

use crate::{engine::Engine, executor::CriticalSection, log, peer::PeerId, script::Instruction};
use color_print::cformat;
use std::sync::Arc;

pub struct InstructionRunner {
    pub engine: Arc<Engine>,
    pub section: Arc<dyn CriticalSection>,
}

impl InstructionRunner {
    pub fn new(engine: Arc<Engine>, section: Arc<dyn CriticalSection>) -> Self {
        Self { engine, section }
    }

    fn known_peer(&self, peer: i64) -> Option<PeerId> {
        usize::try_from(peer)
            .ok()
            .filter(|peer| *peer < self.engine.peers())
    }

    /// Function that runs a single instruction to completion.
    ///
    /// A negative `Lock` duration still takes the lock, but runs the section for zero seconds.
    /// A `Wait` on a peer outside the address book could never finish and is skipped.
    pub async fn execute(&self, instruction: Instruction) {
        match instruction {
            Instruction::Lock { duration } => {
                let duration = u64::try_from(duration).unwrap_or_else(|_| {
                    log::warn(&cformat!(
                        "Negative <bold>Lock {duration}</bold>, running the section for 0 seconds."
                    ));
                    0
                });
                self.engine.lock(duration, self.section.as_ref()).await;
            }
            Instruction::Wait { peer } => match self.known_peer(peer) {
                Some(peer) => {
                    log::info(&cformat!("Waiting for peer <bold>{peer}</bold> to release."));
                    self.engine.wait_for_release(peer).await;
                    log::info(&cformat!("Peer <bold>{peer}</bold> released."));
                }
                None => log::warn(&cformat!(
                    "Skipping <bold>Wait {peer}</bold>: there is no such peer."
                )),
            },
        }
    }

    pub async fn run(&self, instructions: impl IntoIterator<Item = Instruction>) {
        for instruction in instructions {
            self.execute(instruction).await;
        }
    }
}
