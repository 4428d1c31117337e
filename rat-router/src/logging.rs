//! Log file setup.
//!
//! The terminal belongs to the UI, so logs go to a file through a
//! non-blocking writer. Keep the returned guard alive until exit; dropping it
//! flushes pending lines.

use crate::config::LoggingSettings;
use crate::error::{Error, IoSnafu, Result};
use snafu::ResultExt;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber. Returns `None` when logging is disabled.
pub fn init_logging(settings: &LoggingSettings) -> Result<Option<WorkerGuard>> {
    if !settings.enabled {
        return Ok(None);
    }

    std::fs::create_dir_all(&settings.directory).context(IoSnafu)?;
    let appender = tracing_appender::rolling::never(&settings.directory, &settings.file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.level))
        .map_err(|e| Error::LoggingInit {
            message: format!("invalid log level '{}': {e}", settings.level),
        })?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(false).with_target(true))
        .try_init()
        .map_err(|e| Error::LoggingInit { message: e.to_string() })?;

    Ok(Some(guard))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_logging_installs_nothing() {
        let settings = LoggingSettings {
            enabled: false,
            ..LoggingSettings::default()
        };
        assert!(init_logging(&settings).unwrap().is_none());
    }

    #[test]
    fn test_logging_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let settings = LoggingSettings {
            directory: dir.path().join("logs"),
            ..LoggingSettings::default()
        };

        let guard = init_logging(&settings).unwrap();
        assert!(guard.is_some());
        assert!(settings.directory.is_dir());
    }
}
