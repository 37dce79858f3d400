//! File-based logging module for musicbox
//!
//! The terminal is taken over by the panel display, so logs go to a file
//! instead of stdout.

use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

const LOG_FILE_PREFIX: &str = "musicbox";

/// Initialize the logging system.
///
/// Logs are written to `<log_dir>/musicbox.YYYY-MM-DD.log` with daily rotation.
/// `RUST_LOG` overrides the default filter (`musicbox=debug,warn`).
pub fn init_logging(log_dir: &Path) -> anyhow::Result<()> {
    if !log_dir.exists() {
        std::fs::create_dir_all(log_dir)?;
    }

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Flushes on drop; the writer must outlive every task
    Box::leak(Box::new(guard));

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("musicbox=debug,warn"));

    let fmt_layer = fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::info!("Logging initialized - logs written to {}/", log_dir.display());

    Ok(())
}

/// Log a player command and its result
#[macro_export]
macro_rules! log_player_result {
    ($command:expr, $result:expr) => {
        match &$result {
            Ok(_) => tracing::debug!(command = $command, "Player command succeeded"),
            Err(e) => tracing::warn!(command = $command, error = %e, "Player command failed"),
        }
    };
}
