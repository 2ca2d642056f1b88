//! Bloom filter over a pluggable bit sink.
//!
//! The filter owns the hashing protocol; where the bits physically live is
//! decided by the [`BitSink`] it is bound to.

pub mod bloom;

pub use bloom::{BloomFilter, FileBloomFilter, MemoryBloomFilter, RemoteBloomFilter};

use crate::error::Result;

/// Minimal storage capability a backend exposes to the filter.
///
/// Implementations are not required to be internally synchronized. Local
/// sinks must be serialized by the caller when shared between threads; remote
/// sinks are as atomic as the store's single operations.
pub trait BitSink {
    /// Number of addressable bit slots.
    fn capacity(&self) -> u64;

    /// Set the bit at `index`.
    fn set(&mut self, index: u64) -> Result<()>;

    /// Clear the bit at `index`.
    fn unset(&mut self, index: u64) -> Result<()>;

    /// Check whether the bit at `index` is set.
    fn is_set(&self, index: u64) -> Result<bool>;

    /// Release the sink. Any further operation fails with `Error::Closed`.
    fn close(&mut self) -> Result<()>;
}

impl<T: BitSink + ?Sized> BitSink for Box<T> {
    fn capacity(&self) -> u64 {
        (**self).capacity()
    }

    fn set(&mut self, index: u64) -> Result<()> {
        (**self).set(index)
    }

    fn unset(&mut self, index: u64) -> Result<()> {
        (**self).unset(index)
    }

    fn is_set(&self, index: u64) -> Result<bool> {
        (**self).is_set(index)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}
