//! Module that parses the instruction script shared by every process.
//!
//! ```text
//! <N>
//! <peerId> Lock [<durationSeconds>]
//! <peerId> Wait [<targetPeerId>]
//! ```

use crate::{
    error::{Error, Result},
    peer::{PeerId, MAX_PEERS},
};
use std::{fs, path::Path};

pub const DEFAULT_LOCK_DURATION: i64 = 1;
pub const DEFAULT_WAIT_TARGET: i64 = 0;

/// One operation of the script. Arguments are kept as written, including negative values;
/// the runner decides what an out-of-range argument means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// Run the critical section once for `duration` seconds.
    Lock { duration: i64 },
    /// Block until `peer` finishes one more cycle.
    Wait { peer: i64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    pub peers: usize,
    pub instructions: Vec<(PeerId, Instruction)>,
}

impl Instruction {
    /// Function that parses one instruction line into its owner and instruction.
    ///
    /// Lines without an owner and an operation, with a non-numeric owner, or with an unknown
    /// operation yield `None`. A missing or non-numeric argument falls back to its default.
    pub fn parse_line(line: &str) -> Option<(PeerId, Self)> {
        let mut tokens = line.split_whitespace();
        let owner = tokens.next()?.parse().ok()?;
        let operation = tokens.next()?;
        let argument = tokens.next();

        let instruction = match operation {
            "Lock" => Self::Lock {
                duration: argument
                    .and_then(|arg| arg.parse().ok())
                    .unwrap_or(DEFAULT_LOCK_DURATION),
            },
            "Wait" => Self::Wait {
                peer: argument
                    .and_then(|arg| arg.parse().ok())
                    .unwrap_or(DEFAULT_WAIT_TARGET),
            },
            _ => return None,
        };

        Some((owner, instruction))
    }
}

impl Script {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|source| Error::ScriptRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let mut lines = contents.lines();
        let first = lines.next().unwrap_or("").trim();

        let peers: i64 = first
            .parse()
            .map_err(|_| Error::PeerCount(first.to_string()))?;
        let peers = usize::try_from(peers)
            .ok()
            .filter(|peers| (1..=MAX_PEERS).contains(peers))
            .ok_or(Error::PeerCountRange {
                found: peers,
                max: MAX_PEERS,
            })?;

        let instructions = lines.filter_map(Instruction::parse_line).collect();

        Ok(Self {
            peers,
            instructions,
        })
    }

    /// Function that lists the instructions addressed to `peer`, in file order.
    pub fn for_peer(&self, peer: PeerId) -> impl Iterator<Item = Instruction> + '_ {
        self.instructions
            .iter()
            .filter(move |(owner, _)| *owner == peer)
            .map(|(_, instruction)| *instruction)
    }
}
