//! Distributed mutual exclusion between a fixed set of peers, ordered by Lamport clocks.

pub mod ack;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod executor;
pub mod log;
pub mod message;
pub mod peer;
pub mod process;
pub mod queue;
pub mod release;
pub mod runner;
pub mod script;
pub mod server;
pub mod sync;
pub mod transport;

pub use error::{Error, Result};
