// All extraction logic is in betslip-core
// This CLI acts as a thin wrapper around the core library

pub mod output;

// Re-export core types for convenience
pub use betslip_core::*;

use tracing_subscriber::EnvFilter;

/// Log level used when `RUST_LOG` is not set.
/// Profiling output is logged at info, so `--profile` lifts the floor.
pub fn default_log_directive(verbose: u8, profile: bool) -> &'static str {
    match verbose {
        0 if profile => "info",
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the stderr subscriber; stdout is reserved for the JSON record
pub fn init_logging(verbose: u8, profile: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_directive(verbose, profile))),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
