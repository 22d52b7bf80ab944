use std::io;
use thiserror::Error;

/// Errors raised while touching the granted folder or the persisted state.
///
/// These stay inside the store layer. Callers see `Option`/`bool` results
/// after the error has been logged.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Permission to access the folder was denied")]
    PermissionDenied,

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid file name: {0:?}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read persisted state: {0}")]
    State(#[from] serde_json::Error),
}

impl StoreError {
    /// Map an IO error on a named file, keeping "missing" distinct.
    pub fn for_file(name: &str, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(name.to_string()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied,
            _ => Self::Io(err),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
