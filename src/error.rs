//! Error types for hashdbm
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using DbmError
pub type Result<T> = std::result::Result<T, DbmError>;

/// Unified error type for hashdbm operations
#[derive(Debug, Error)]
pub enum DbmError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A page read from disk failed structural validation
    #[error("Corrupt page {page}: failed structural validation")]
    CorruptPage { page: u64 },

    /// The split budget ran out before the target page had room
    #[error("Cannot make room for pair after {attempts} splits")]
    CannotMakeRoom { attempts: usize },

    // -------------------------------------------------------------------------
    // Caller Errors
    // -------------------------------------------------------------------------
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store is opened read-only")]
    ReadOnly,

    #[error("Pair too large: {size} bytes (max {max})")]
    PairTooLarge { size: usize, max: usize },

    /// Insert into a page without room for the pair
    #[error("Page full: need {need} bytes, {free} free")]
    PageFull { need: usize, free: usize },

    // -------------------------------------------------------------------------
    // Locking Errors
    // -------------------------------------------------------------------------
    #[error("Store is locked by another handle: {}", .0.display())]
    Locked(PathBuf),
}

impl DbmError {
    /// Whether this error sets the handle's sticky I/O-error flag
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            DbmError::Io(_) | DbmError::CorruptPage { .. } | DbmError::CannotMakeRoom { .. }
        )
    }
}
