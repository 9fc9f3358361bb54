//! Error types for label composition and printing
//!
//! Degrade-and-continue conditions ([`EncodeError::Unavailable`], missing
//! fonts) never surface as a batch failure. Abort-and-report conditions
//! ([`DeviceError`]) stop the dispatch they happen in.

use thiserror::Error;

/// Symbol encoder errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// No encoder is installed or configured; the composer falls back to a placeholder
    #[error("symbol encoder unavailable")]
    Unavailable,

    /// The encoder was present but rejected the payload
    #[error("symbol encoding failed: {0}")]
    Failed(String),
}

/// Unrecoverable render failure for a single code
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("encoder error: {0}")]
    Encode(String),

    /// Encoder output does not match its declared geometry
    #[error("invalid symbol bitmap: {width}x{height} with {len} bytes")]
    InvalidSymbol { width: u32, height: u32, len: usize },

    /// Canvas would exceed the configured maximum
    #[error("canvas allocation failed: {width}x{height}")]
    Canvas { width: u32, height: u32 },
}

/// Input rejected before any device interaction
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("code must not be empty")]
    EmptyCode,

    #[error("copies must be between {min} and {max}, got {value}")]
    Copies { value: u32, min: u32, max: u32 },
}

/// Print subsystem errors
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceError {
    #[error("no printers available")]
    NoDevices,

    #[error("printer not found: {0}")]
    NotFound(String),

    #[error("open job failed on {device}: {reason}")]
    Open { device: String, reason: String },

    #[error("page error: {0}")]
    Page(String),

    #[error("blit failed: {0}")]
    Blit(String),

    #[error("close failed: {0}")]
    Close(String),

    #[error("capability query failed on {device}: {reason}")]
    Capability { device: String, reason: String },
}

/// History store errors
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),

    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),

    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),

    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The history lock was poisoned by a panicking writer
    #[error("history lock poisoned")]
    Poisoned,
}

/// PNG export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Printer settings file errors
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid settings: {0}")]
    Json(#[from] serde_json::Error),
}

/// Logging setup errors
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),

    #[error("global subscriber already installed: {0}")]
    Init(String),
}

/// Errors from the background batch worker
#[derive(Debug, Error)]
pub enum BatchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("batch worker stopped")]
    WorkerGone,
}

pub type ComposeResult<T> = Result<T, ComposeError>;
pub type DeviceResult<T> = Result<T, DeviceError>;
pub type PersistenceResult<T> = Result<T, PersistenceError>;
