//! Tracing setup for the console and the per-input log file.

use std::fs::File;
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// The filter directive for a `--log-level` value.
pub fn level_directive(level: u8) -> &'static str {
    match level {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence over `level`. The console layer is left out
/// when `quiet` is set; the log file, when given, always gets every event
/// that passes the filter.
pub fn init(level: u8, quiet: bool, log_file: Option<File>) {
    let console = (!quiet).then(|| fmt::layer().with_target(false));
    let file = log_file.map(|file| {
        fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .with_target(false)
    });

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| level_directive(level).into()),
        )
        .with(console)
        .with(file)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_directive() {
        assert_eq!(level_directive(0), "warn");
        assert_eq!(level_directive(1), "info");
        assert_eq!(level_directive(2), "debug");
    }
}
