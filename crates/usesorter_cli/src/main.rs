//! CLI demo entry point.
//!
//! # Responsibility
//! - Fix process-wide policy (allocation failure, logging) before any atom exists.
//! - Drive one atom through set/get/print to verify `usesorter_core` wiring.
//! - Keep stdout deterministic for quick local sanity checks.

use std::io::{self, Write};
use std::path::PathBuf;
use usesorter_core::{
    configure_alloc_policy, default_log_level, flush_logging, init_logging, AllocPolicy, Atom,
};

const LOG_DIR_ENV: &str = "USESORTER_LOG_DIR";

fn main() -> io::Result<()> {
    configure_alloc_policy(AllocPolicy::Abort).map_err(io::Error::other)?;
    let log_dir = log_dir();
    init_logging(default_log_level(), &log_dir.to_string_lossy()).map_err(io::Error::other)?;

    let result = run_demo();
    flush_logging();
    result
}

/// `$USESORTER_LOG_DIR` when set, otherwise `<tmp>/usesorter-logs`.
fn log_dir() -> PathBuf {
    std::env::var_os(LOG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("usesorter-logs"))
}

fn run_demo() -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "usesorter_core version={}", usesorter_core::core_version())?;

    let mut atom = Atom::new();
    atom.set_name("New Name");
    if let Some(name) = atom.get_name() {
        writeln!(out, "{name}")?;
    }
    atom.print_to(&mut out)?;

    atom.set_name("Bart Simpson");
    atom.print_to(&mut out)?;

    atom.destroy();
    out.flush()
}
