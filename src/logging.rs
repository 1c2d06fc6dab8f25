//! Log output for the binary
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to whoever embeds it. `VIDSHELF_LOG` takes an `EnvFilter` directive and
//! wins over the `-v` count.

use tracing_subscriber::EnvFilter;

/// Environment variable holding a filter directive
pub const LOG_ENV: &str = "VIDSHELF_LOG";

/// Filter directive for `verbosity` repetitions of `-v`
#[must_use]
pub const fn level_for(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install a stderr subscriber; later calls are ignored
pub fn init(verbosity: u8) {
    let default = format!("vidshelf={}", level_for(verbosity));
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
