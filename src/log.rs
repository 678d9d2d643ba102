//! Module that prints the colored, level-tagged lines every process writes to its console.

use color_print::{ceprintln, cprintln};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    OnceLock,
};

static PREFIX: OnceLock<String> = OnceLock::new();
static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Function that tags every following line with the id of this process.
pub fn init(process_id: usize, verbose: bool) {
    let _ = PREFIX.set(format!("[proc {process_id}] "));
    VERBOSE.store(verbose, Ordering::Relaxed);
}

fn prefix() -> &'static str {
    PREFIX.get().map(String::as_str).unwrap_or("")
}

pub fn debug(message: &str) {
    if VERBOSE.load(Ordering::Relaxed) {
        cprintln!("<dim>{}DEBUG</dim> {}", prefix(), message);
    }
}

pub fn info(message: &str) {
    cprintln!("<green, bold>{}INFO</green, bold> {}", prefix(), message);
}

pub fn warn(message: &str) {
    ceprintln!("<yellow, bold>{}WARN</yellow, bold> {}", prefix(), message);
}

pub fn error(message: &str) {
    ceprintln!("<red, bold>{}ERROR</red, bold> {}", prefix(), message);
}
