pub mod auth;
pub mod db;
pub mod errors;
pub mod models;
pub mod normalize;
pub mod pipeline;
pub mod service;
pub mod storage;
pub mod store;
pub mod view;

use crate::storage::FsStorage;
use std::path::Path;
use std::sync::Arc;
use tracing_appender::non_blocking::WorkerGuard;

pub use crate::auth::Identity;
pub use crate::errors::{AppError, AppResult};
pub use crate::models::{
    AppSettings, CompanyDraft, CompanyRecord, DirectoryAction, DirectoryPage, DirectoryState,
    Facets, SortDirection, SortField, UserRecord,
};
pub use crate::service::DirectoryService;

static LOG_GUARD: std::sync::OnceLock<WorkerGuard> = std::sync::OnceLock::new();

/// Opens the SQLite-backed store under `data_dir` and wires up the service
/// with the persisted settings.
pub fn open_directory(data_dir: &Path) -> AppResult<DirectoryService> {
    let database = db::Database::new(&data_dir.join("directory.sqlite"))?;
    let settings = database.get_settings()?;
    let storage = FsStorage::new(&data_dir.join(&settings.uploads_dir));
    DirectoryService::new(Arc::new(database), Arc::new(storage), settings)
}

pub fn init_tracing(data_dir: &Path) -> Result<(), String> {
    let log_dir = data_dir.join("logs");
    std::fs::create_dir_all(&log_dir).map_err(|error| error.to_string())?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "directory.log");
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
