use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("VALIDATION_FAILED: {0}")]
    Validation(String),
    #[error("PERSISTENCE_READ: {0}")]
    PersistenceRead(String),
    #[error("PERSISTENCE_WRITE: {0}")]
    PersistenceWrite(String),
    #[error("MIRROR_FAILURE: {0}")]
    Mirror(String),
    #[error("IMPORT_FORMAT: {0}")]
    ImportFormat(String),
    #[error("IMPORT_EMPTY: {0}")]
    ImportEmpty(String),
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl AppError {
    pub fn is_import_rejection(&self) -> bool {
        matches!(self, Self::ImportFormat(_) | Self::ImportEmpty(_))
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(format!("{:#}", value))
    }
}

pub type AppResult<T> = Result<T, AppError>;
