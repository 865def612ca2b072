//! Error types for paws-core

use thiserror::Error;

/// Result type alias for paws operations
pub type Result<T> = std::result::Result<T, PawsError>;

/// Paws error types
#[derive(Error, Debug)]
pub enum PawsError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Credential not found: {0}")]
    NotFound(i64),

    /// Wrong master password, or a corrupted / foreign token
    #[error("Decryption failed: {0}")]
    DecryptionError(String),

    #[error("Encryption failed: {0}")]
    EncryptionError(String),

    #[error("Key derivation failed: {0}")]
    KeyDerivationError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for PawsError {
    fn from(err: rusqlite::Error) -> Self {
        Self::StorageError(err.to_string())
    }
}

impl PawsError {
    /// True when the error means the stored token could not be opened
    /// with the current key.
    pub fn is_decryption(&self) -> bool {
        matches!(self, Self::DecryptionError(_))
    }

    /// True when the error refers to a credential id that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
