//! Build logging
//!
//! Logs go to stderr through `tracing-subscriber`. A dated log file is added
//! when a log directory is given on the command line or the settings ask for
//! one; its writer is flushed when the returned guard is dropped.

use std::fs;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::core::errors::{BuildContext, BuildResult};

/// Filter used when `RUST_LOG` is not set
pub fn default_directive(verbosity: u8) -> String {
    let level = match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    format!("warn,fontsmith={level}")
}

/// Name of today's log file
pub fn current_log_file_name() -> String {
    let timestamp = chrono::Local::now().format("%Y-%m-%d");
    format!("fontsmith-{timestamp}.log")
}

/// Install the global subscriber.
///
/// Keep the returned guard alive for the whole run, or buffered file output
/// is lost.
pub fn init(verbosity: u8, log_dir: Option<&Path>) -> BuildResult<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));
    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            fs::create_dir_all(dir).with_file_context("create log directory", dir)?;
            let appender = tracing_appender::rolling::never(dir, current_log_file_name());
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    if let Some(dir) = log_dir {
        tracing::debug!("Logging to {:?}", log_path(dir));
    }
    Ok(guard)
}

fn log_path(dir: &Path) -> PathBuf {
    dir.join(current_log_file_name())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(default_directive(0), "warn,fontsmith=info");
        assert_eq!(default_directive(1), "warn,fontsmith=debug");
        assert_eq!(default_directive(5), "warn,fontsmith=trace");
    }

    #[test]
    fn test_log_file_is_dated() {
        let name = current_log_file_name();
        assert!(name.starts_with("fontsmith-20"));
        assert!(name.ends_with(".log"));
    }
}
