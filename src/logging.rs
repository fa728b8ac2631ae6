use std::fs;

use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LoggingConfig;
use crate::constants::LOG_FILE_PREFIX;

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("est=info"))
}

/// Builds the subscriber described by `config` without installing it.
///
/// The guard is `Some` when file output is enabled and flushes the file writer on drop.
pub fn build_subscriber(config: &LoggingConfig) -> (BoxedSubscriber, Option<WorkerGuard>) {
    if !config.file_output {
        let subscriber = tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false));
        return (Box::new(subscriber), None);
    }

    // Ensure logs directory exists
    let _ = fs::create_dir_all(&config.directory);

    let file_appender = tracing_appender::rolling::daily(&config.directory, LOG_FILE_PREFIX);
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(file_appender);

    let subscriber = tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().json().with_writer(non_blocking_writer))
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false));
    (Box::new(subscriber), Some(guard))
}

/// Initializes logging: human readable output on stderr, plus JSON lines in a daily
/// rotated file when enabled.
///
/// Stdout is left to the results report. The returned guard has to be held until the
/// program exits.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let (subscriber, guard) = build_subscriber(config);
    subscriber.init();
    guard
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_console_only_subscriber_has_no_guard() {
        let config = LoggingConfig {
            file_output: false,
            ..LoggingConfig::default()
        };

        let (_subscriber, guard) = build_subscriber(&config);
        assert!(guard.is_none());
    }

    #[test]
    fn test_file_subscriber_writes_json_lines() {
        let dir = tempdir().unwrap();
        let config = LoggingConfig {
            directory: dir.path().join("logs"),
            file_output: true,
        };

        let (subscriber, guard) = build_subscriber(&config);
        assert!(guard.is_some());
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("settings file logged");
        });
        drop(guard);

        let entries: Vec<_> = fs::read_dir(&config.directory)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(entries.len(), 1);
        let content = fs::read_to_string(&entries[0]).unwrap();
        assert!(content.contains("settings file logged"));
        assert!(content.trim_start().starts_with('{'));
    }
}
