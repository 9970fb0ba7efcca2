use crate::error::{CliError, Result};
use std::fs::File;
use std::path::PathBuf;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::{Layer, fmt, prelude::*};

/// Target prefix shared by the engine library and this binary.
const COLBUILDER_TARGET: &str = "colbuilder";

/// Console level: `-q` keeps only failures, each `-v` adds one level.
fn console_level(verbosity: u8, quiet: bool) -> LevelFilter {
    if quiet {
        return LevelFilter::ERROR;
    }
    match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

/// The log file always carries the per-attempt and per-copy debug events of colbuilder,
/// so a failed optimization can be diagnosed from the file of a quiet run.
fn file_filter(console: LevelFilter) -> Targets {
    Targets::new()
        .with_default(console)
        .with_target(COLBUILDER_TARGET, console.max(LevelFilter::DEBUG))
}

pub fn setup_logging(verbosity: u8, quiet: bool, log_file: Option<PathBuf>) -> Result<()> {
    let console = console_level(verbosity, quiet);
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .with_filter(console);

    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(&path).map_err(CliError::Io)?;
            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_thread_ids(true)
                    .with_target(true)
                    .with_filter(file_filter(console)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::sync::Once;
    use tracing::{debug, error, info, trace, warn};

    static INIT: Once = Once::new();

    fn ensure_global_logger_is_set() {
        INIT.call_once(|| {
            setup_logging(3, false, None).expect("Failed to set up global logger for tests");
        });
    }

    #[test]
    fn quiet_keeps_errors_and_verbosity_raises_the_level() {
        assert_eq!(console_level(0, true), LevelFilter::ERROR);
        assert_eq!(console_level(0, false), LevelFilter::WARN);
        assert_eq!(console_level(1, false), LevelFilter::INFO);
        assert_eq!(console_level(2, false), LevelFilter::DEBUG);
        assert_eq!(console_level(7, false), LevelFilter::TRACE);
    }

    #[test]
    fn file_filter_keeps_engine_debug_events_of_quiet_runs() {
        let filter = file_filter(LevelFilter::ERROR);
        assert!(filter.would_enable(
            "colbuilder::engine::tasks::crosslink_optimization",
            &tracing::Level::DEBUG
        ));
        assert!(!filter.would_enable("colbuilder::workflows::geometry", &tracing::Level::TRACE));
        assert!(!filter.would_enable("rayon_core", &tracing::Level::WARN));

        let verbose = file_filter(LevelFilter::TRACE);
        assert!(verbose.would_enable("colbuilder::workflows::geometry", &tracing::Level::TRACE));
    }

    #[test]
    #[serial]
    fn initialization_and_macros_work() {
        ensure_global_logger_is_set();

        error!(attempt = 10, distance = 12.5, "Cross-link optimization failed.");
        warn!(skipped = 1, "Some cross-link records could not be parsed.");
        info!(copies = 3, components = 2, "Connectivity analysis complete.");
        debug!(copy = 1.0, "Placed copy.");
        trace!("Marker pair checked.");
    }

    #[test]
    #[serial]
    fn file_log_records_attempt_scores_below_console_level() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log_path = temp_dir.path().join("colbuilder.log");

        let file = File::create(&log_path).unwrap();
        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_thread_ids(true)
            .with_filter(file_filter(LevelFilter::WARN));
        let subscriber = tracing_subscriber::registry().with(file_layer);

        tracing::subscriber::with_default(subscriber, || {
            debug!(
                target: "colbuilder::engine",
                attempt = 2,
                distance = 3.5,
                "Scored trial structures."
            );
            debug!(target: "indicatif", "Redraw.");
        });

        let content = std::fs::read_to_string(log_path).unwrap();
        assert!(content.contains("Scored trial structures."));
        assert!(content.contains("attempt=2"));
        assert!(content.contains("ThreadId"));
        assert!(!content.contains("Redraw."));
    }

    #[test]
    #[serial]
    fn invalid_log_file_path_propagates_error() {
        let invalid_path = PathBuf::from("/");

        if cfg!(unix) && invalid_path.is_dir() {
            let result = setup_logging(0, false, Some(invalid_path));
            assert!(matches!(result, Err(CliError::Io(_))));
        }
    }
}
