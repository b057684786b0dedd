//! Logging system initialization
//!
//! Logs go to `app.log` in the config folder (next to `config.json`, so the
//! "Config/logs" menu entry opens both). Each start moves the previous sessions'
//! logs one slot up and keeps the last `MAX_LOG_FILES` of them.

use crate::error::{OverlayError, Result, StringError};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt};

/// Maximum number of historical log files to keep (app.log.1 through app.log.9)
const MAX_LOG_FILES: u8 = 9;

/// Initialize the logging system writing into `log_dir`
///
/// Log level defaults to INFO but can be configured via `RUST_LOG` environment variable.
pub fn init_logging(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)?;

    let log_path = log_dir.join("app.log");
    rotate_logs_on_startup(&log_path)?;

    // Rotation happens once per session above, never while running
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix("app")
        .filename_suffix("log")
        .build(log_dir)
        .map_err(|e| OverlayError::ConfigError(Box::new(e)))?;

    let subscriber = fmt()
        .with_writer(file_appender)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .with_line_number(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| OverlayError::ConfigError(Box::new(e)))?;

    tracing::info!("AoE IV: Overlay v{} started", crate::VERSION);

    Ok(())
}

/// Shift `app.log` -> `app.log.1` -> ... -> `app.log.9`, dropping the oldest
fn rotate_logs_on_startup(log_path: &Path) -> Result<()> {
    if !log_path.exists() {
        return Ok(());
    }

    let log_dir = log_path
        .parent()
        .ok_or_else(|| OverlayError::ConfigError(StringError::new("Invalid log path")))?;
    let log_name = log_path
        .file_name()
        .ok_or_else(|| OverlayError::ConfigError(StringError::new("Invalid log filename")))?
        .to_string_lossy();

    let oldest_log = log_dir.join(format!("{log_name}.{MAX_LOG_FILES}"));
    if oldest_log.exists() {
        std::fs::remove_file(&oldest_log)?;
    }

    for i in (1..MAX_LOG_FILES).rev() {
        let current_log = log_dir.join(format!("{log_name}.{i}"));
        if current_log.exists() {
            std::fs::rename(&current_log, log_dir.join(format!("{log_name}.{}", i + 1)))?;
        }
    }

    std::fs::rename(log_path, log_dir.join(format!("{log_name}.1")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_dir;
    use std::fs;

    #[test]
    fn test_rotation_moves_current_log() {
        let dir = create_test_dir();
        let log_path = dir.path().join("app.log");
        fs::write(&log_path, "Session 1").unwrap();

        rotate_logs_on_startup(&log_path).unwrap();

        assert!(!log_path.exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("app.log.1")).unwrap(),
            "Session 1"
        );
    }

    #[test]
    fn test_rotation_keeps_at_most_max_files() {
        let dir = create_test_dir();
        let log_path = dir.path().join("app.log");

        for i in 1..=12 {
            fs::write(&log_path, format!("Session {i}")).unwrap();
            rotate_logs_on_startup(&log_path).unwrap();
        }

        for i in 1..=MAX_LOG_FILES {
            assert!(dir.path().join(format!("app.log.{i}")).exists());
        }
        assert!(!dir.path().join("app.log.10").exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("app.log.9")).unwrap(),
            "Session 4"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("app.log.1")).unwrap(),
            "Session 12"
        );
    }

    #[test]
    fn test_rotation_without_existing_log() {
        let dir = create_test_dir();
        let log_path = dir.path().join("app.log");

        rotate_logs_on_startup(&log_path).unwrap();
        assert!(!dir.path().join("app.log.1").exists());
    }

    #[test]
    fn test_rotation_with_gaps_in_history() {
        let dir = create_test_dir();
        let log_path = dir.path().join("app.log");
        fs::write(&log_path, "Current").unwrap();
        fs::write(dir.path().join("app.log.1"), "Previous").unwrap();
        fs::write(dir.path().join("app.log.5"), "Old").unwrap();

        rotate_logs_on_startup(&log_path).unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("app.log.1")).unwrap(), "Current");
        assert_eq!(fs::read_to_string(dir.path().join("app.log.2")).unwrap(), "Previous");
        assert_eq!(fs::read_to_string(dir.path().join("app.log.6")).unwrap(), "Old");
    }
}
