//! Error types for bloomkit.

use std::io;
use thiserror::Error;

/// The result type used throughout bloomkit.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for filter and backend operations.
///
/// Storage failures abort the current call and are returned to the caller.
/// Nothing is retried.
#[derive(Debug, Error)]
pub enum Error {
    /// A bit index outside `0..capacity` was addressed.
    #[error("Bit index {index} out of bounds for capacity {capacity}")]
    OutOfBounds {
        /// The offending index.
        index: u64,
        /// The capacity of the bit sink.
        capacity: u64,
    },

    /// The snapshot location or the remote endpoint cannot be reached.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// A persisted snapshot could not be decoded.
    #[error("Corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// A single remote read or write failed.
    #[error("Transport failure: {0}")]
    TransportFailure(String),

    /// An invalid argument was provided.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The bit sink has already been released.
    #[error("Bit sink is closed")]
    Closed,

    /// An I/O error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Creates a new out of bounds error.
    pub fn out_of_bounds(index: u64, capacity: u64) -> Self {
        Error::OutOfBounds { index, capacity }
    }

    /// Creates a new storage unavailable error.
    pub fn storage_unavailable(msg: impl Into<String>) -> Self {
        Error::StorageUnavailable(msg.into())
    }

    /// Creates a new corrupt snapshot error.
    pub fn corrupt_snapshot(msg: impl Into<String>) -> Self {
        Error::CorruptSnapshot(msg.into())
    }

    /// Creates a new transport failure error.
    pub fn transport(msg: impl Into<String>) -> Self {
        Error::TransportFailure(msg.into())
    }

    /// Creates a new invalid argument error.
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }
}
