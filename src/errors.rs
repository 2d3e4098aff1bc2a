use thiserror::Error;

/// Error type that captures key-value persistence failures.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Corrupt entry `{key}`: {reason}")]
    Corrupt { key: String, reason: String },
    #[error("Backup `{0}` not found")]
    BackupNotFound(String),
}
