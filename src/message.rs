//! Module that contains all the different message types sent in the network.
//!
//! Every message travels as one line of space separated decimal fields:
//!
//! ```text
//! HELLO <sender>
//! REQ <timestamp> <requester>
//! ACK <timestamp> <sender> <for_timestamp> <for_requester>
//! REL <timestamp> <released_timestamp> <released_requester>
//! ```

use crate::{clock::Timestamp, log, peer::PeerId, queue::RequestRecord};
use color_print::cformat;
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Presence signal sent once to every peer during the startup handshake.
    Hello { sender: PeerId },
    /// Request for the critical section, broadcast to every other peer.
    Request { timestamp: Timestamp, requester: PeerId },
    /// Reply to a request, sent only to the requester.
    Ack {
        timestamp: Timestamp,
        sender: PeerId,
        for_request: RequestRecord,
    },
    /// Release of a previously granted request, broadcast to every other peer.
    Release {
        timestamp: Timestamp,
        released: RequestRecord,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseMessageError {
    #[error("empty line")]
    Empty,
    #[error("unknown message kind `{0}`")]
    UnknownKind(String),
    #[error("`{kind}` is missing its `{field}` field")]
    MissingField {
        kind: &'static str,
        field: &'static str,
    },
    #[error("`{kind}` has a non-numeric `{field}` field: `{value}`")]
    InvalidField {
        kind: &'static str,
        field: &'static str,
        value: String,
    },
}

impl Message {
    /// Logical timestamp carried by the message, if any. `HELLO` carries none.
    pub fn timestamp(&self) -> Option<Timestamp> {
        match self {
            Self::Hello { .. } => None,
            Self::Request { timestamp, .. }
            | Self::Ack { timestamp, .. }
            | Self::Release { timestamp, .. } => Some(*timestamp),
        }
    }

    /// Every peer id named by the message, used to reject ids outside the address book.
    pub fn peers(&self) -> Vec<PeerId> {
        match self {
            Self::Hello { sender } => vec![*sender],
            Self::Request { requester, .. } => vec![*requester],
            Self::Ack {
                sender,
                for_request,
                ..
            } => vec![*sender, for_request.peer],
            Self::Release { released, .. } => vec![released.peer],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hello { .. } => "HELLO",
            Self::Request { .. } => "REQ",
            Self::Ack { .. } => "ACK",
            Self::Release { .. } => "REL",
        }
    }

    /// Function that logs a received message.
    pub fn print_received(&self) {
        match self {
            Self::Hello { sender } => {
                log::debug(&cformat!("Peer <bold>{sender}</bold> said <bold>hello</bold>."))
            }
            Self::Request {
                timestamp,
                requester,
            } => log::debug(&cformat!(
                "Received <bold>request</bold> ({timestamp}, {requester})."
            )),
            Self::Ack {
                timestamp,
                sender,
                for_request,
            } => log::debug(&cformat!(
                "Received <bold>ack</bold> at {timestamp} from <bold>{sender}</bold> for {for_request}."
            )),
            Self::Release {
                timestamp,
                released,
            } => log::debug(&cformat!(
                "Received <bold>release</bold> at {timestamp} of {released}."
            )),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hello { sender } => write!(f, "HELLO {sender}"),
            Self::Request {
                timestamp,
                requester,
            } => write!(f, "REQ {timestamp} {requester}"),
            Self::Ack {
                timestamp,
                sender,
                for_request,
            } => write!(
                f,
                "ACK {timestamp} {sender} {} {}",
                for_request.timestamp, for_request.peer
            ),
            Self::Release {
                timestamp,
                released,
            } => write!(f, "REL {timestamp} {} {}", released.timestamp, released.peer),
        }
    }
}

struct Fields<'a> {
    kind: &'static str,
    tokens: std::str::SplitWhitespace<'a>,
}

impl Fields<'_> {
    fn next<T: FromStr>(&mut self, field: &'static str) -> Result<T, ParseMessageError> {
        let value = self.tokens.next().ok_or(ParseMessageError::MissingField {
            kind: self.kind,
            field,
        })?;
        value.parse().map_err(|_| ParseMessageError::InvalidField {
            kind: self.kind,
            field,
            value: value.to_string(),
        })
    }
}

impl FromStr for Message {
    type Err = ParseMessageError;

    /// Trailing tokens after the last field are ignored.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut tokens = line.split_whitespace();
        let kind = match tokens.next().ok_or(ParseMessageError::Empty)? {
            "HELLO" => "HELLO",
            "REQ" => "REQ",
            "ACK" => "ACK",
            "REL" => "REL",
            other => return Err(ParseMessageError::UnknownKind(other.to_string())),
        };
        let mut fields = Fields { kind, tokens };

        Ok(match kind {
            "HELLO" => Self::Hello {
                sender: fields.next("sender")?,
            },
            "REQ" => Self::Request {
                timestamp: fields.next("timestamp")?,
                requester: fields.next("requester")?,
            },
            "ACK" => Self::Ack {
                timestamp: fields.next("timestamp")?,
                sender: fields.next("sender")?,
                for_request: RequestRecord::new(
                    fields.next("for_timestamp")?,
                    fields.next("for_requester")?,
                ),
            },
            _ => Self::Release {
                timestamp: fields.next("timestamp")?,
                released: RequestRecord::new(
                    fields.next("released_timestamp")?,
                    fields.next("released_requester")?,
                ),
            },
        })
    }
}
