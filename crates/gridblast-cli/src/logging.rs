use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, prelude::*};

/// Maps the number of `-v` flags to a log level, starting at INFO.
pub(crate) fn level_from_verbosity(verbose: u8) -> Level {
    match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Installs the global subscriber writing human-readable events to stderr.
pub(crate) fn init(verbose: u8) {
    let level = level_from_verbosity(verbose);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(LevelFilter::from_level(level))
        .init();
    tracing::debug!(%level, "logging initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_from_verbosity(0), Level::INFO);
        assert_eq!(level_from_verbosity(1), Level::DEBUG);
        assert_eq!(level_from_verbosity(5), Level::TRACE);
    }
}
