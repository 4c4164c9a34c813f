// Registry Error Types
// One variant per caller-visible outcome

use thiserror::Error;

/// Failure kind, for callers that branch on the category rather than the message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    InconsistentData,
    ValidationFailed,
    Internal,
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    InconsistentData(String),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::NotFound(_) => ErrorKind::NotFound,
            RegistryError::Conflict(_) => ErrorKind::Conflict,
            RegistryError::InconsistentData(_) => ErrorKind::InconsistentData,
            RegistryError::ValidationFailed(_) => ErrorKind::ValidationFailed,
            RegistryError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Duplicate-code failure, shared by the pre-check and the store constraint
    pub fn duplicate(code: &str) -> Self {
        RegistryError::Conflict(format!("SWIFT code '{}' already exists.", code))
    }
}

impl From<rusqlite::Error> for RegistryError {
    fn from(e: rusqlite::Error) -> Self {
        RegistryError::Internal(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
