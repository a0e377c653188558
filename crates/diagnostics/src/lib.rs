//! Logging for the graphload workspace
//!
//! Thin wrapper over `emit` so every crate logs the same way.
//!
//! Usage:
//! - Set GRAPHLOAD_LOG=off - no logs
//! - Set GRAPHLOAD_LOG=info - load progress (batches committed, session lifecycle)
//! - Set GRAPHLOAD_LOG=debug - per-batch detail
//!
//! When GRAPHLOAD_LOG is unset the level passed to [`init_with_default`] applies.

use std::sync::Once;

// Re-export emit so macros can use it
pub use emit;

/// Environment variable consulted for the log level
pub const LOG_ENV: &str = "GRAPHLOAD_LOG";

static INIT: Once = Once::new();

/// Initialize diagnostics from GRAPHLOAD_LOG, defaulting to "off"
pub fn init_diagnostics() {
    init_with_default("off");
}

/// Initialize diagnostics from GRAPHLOAD_LOG, falling back to `default_level`
///
/// Safe to call multiple times; only the first call installs an emitter.
pub fn init_with_default(default_level: &str) {
    INIT.call_once(|| {
        let log_level = std::env::var(LOG_ENV).unwrap_or_else(|_| default_level.to_string());

        let min_level = match parse_level(&log_level) {
            Some(LevelChoice::Off) => return,
            Some(LevelChoice::Min(level)) => level,
            None => {
                // The emitter is not installed yet, so this has to go straight to stderr
                eprintln!("Warning: Unknown {LOG_ENV} value '{log_level}', using 'info'");
                emit::Level::Info
            }
        };

        let rt = emit::setup()
            .emit_to(emit_term::stderr())
            .emit_when(emit::level::min_filter(min_level))
            .init();

        // Keep the runtime alive for the rest of the process
        std::mem::forget(rt);
    });
}

#[derive(Debug, PartialEq)]
enum LevelChoice {
    Off,
    Min(emit::Level),
}

fn parse_level(value: &str) -> Option<LevelChoice> {
    match value.trim().to_ascii_lowercase().as_str() {
        "off" => Some(LevelChoice::Off),
        "debug" => Some(LevelChoice::Min(emit::Level::Debug)),
        "info" => Some(LevelChoice::Min(emit::Level::Info)),
        "warn" => Some(LevelChoice::Min(emit::Level::Warn)),
        "error" => Some(LevelChoice::Min(emit::Level::Error)),
        _ => None,
    }
}

/// Log basic operations (session opened, batch committed, load finished)
#[macro_export]
macro_rules! info {
    ($($arg:tt)*) => {
        $crate::emit::info!($($arg)*)
    };
}

/// Log detailed diagnostics (batch sizes, decoded schema, cypher text)
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {
        $crate::emit::debug!($($arg)*)
    };
}

/// Log warning conditions (close failures, overridden settings)
#[macro_export]
macro_rules! warn {
    ($($arg:tt)*) => {
        $crate::emit::warn!($($arg)*)
    };
}

/// Log failures that stop the load
#[macro_export]
macro_rules! error {
    ($($arg:tt)*) => {
        $crate::emit::error!($($arg)*)
    };
}

/// Re-export the init function for convenience
pub use init_diagnostics as init;
