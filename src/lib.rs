pub mod analytics;
pub mod calendar;
pub mod db;
pub mod dimensions;
pub mod errors;
pub mod journal;
pub mod mirror;
pub mod models;
pub mod reveal;
pub mod store;
pub mod text;
pub mod transfer;

pub use crate::errors::{AppError, AppResult};
pub use crate::journal::JournalCore;
pub use crate::models::{AppSettings, DimensionId, DimensionStats, Entry, RevealState};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

pub fn open(app_data_dir: PathBuf) -> Result<Arc<JournalCore>, String> {
    std::fs::create_dir_all(&app_data_dir).map_err(|error| error.to_string())?;
    init_tracing(&app_data_dir)?;

    let journal = JournalCore::new(app_data_dir).map_err(to_client_error)?;
    tracing::info!(
        data_dir = %journal.data_dir().display(),
        backup_mirror = journal.has_backup_mirror(),
        "journal opened"
    );
    Ok(journal)
}

pub fn init_tracing(app_data_dir: &Path) -> Result<(), String> {
    let log_dir = app_data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "journal.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let _ = LOG_GUARD.set(guard);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .json()
        .with_writer(non_blocking)
        .try_init()
        .map_err(|error| error.to_string())
}

pub fn to_client_error(error: impl std::fmt::Display) -> String {
    error.to_string()
}
