//! Error handling for the application

use thiserror::Error;

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Blockchain error: {0}")]
    BlockchainError(String),

    #[error("Stake registry error: {0}")]
    RegistryError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("No leader known for sandwiched slot {0}")]
    MissingLeader(u64),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::RegistryError(err.to_string())
    }
}
