//! In-memory bit sink.

use crate::bitarray::BitArray;
use crate::error::{Error, Result};
use crate::filter::BitSink;

/// A bit sink that owns its [`BitArray`].
///
/// Not synchronized: concurrent mutation from several threads must be
/// serialized by the caller, e.g. behind a mutex or one filter per thread.
#[derive(Debug, Clone)]
pub struct MemorySink {
    /// `None` once closed
    bits: Option<BitArray>,
    capacity: u64,
}

impl MemorySink {
    /// Create a sink of `capacity` unset bits.
    pub fn new(capacity: u64) -> Self {
        Self::from_bits(BitArray::new(capacity))
    }

    /// Create a sink over existing bits.
    pub fn from_bits(bits: BitArray) -> Self {
        let capacity = bits.capacity();
        Self {
            bits: Some(bits),
            capacity,
        }
    }

    /// The underlying bit array.
    pub fn bits(&self) -> Result<&BitArray> {
        self.bits.as_ref().ok_or(Error::Closed)
    }

    /// The packed words of the underlying bit array.
    pub fn words(&self) -> Result<&[u64]> {
        Ok(self.bits()?.words())
    }

    /// Number of bits currently set.
    pub fn bits_set(&self) -> Result<u64> {
        Ok(self.bits()?.count_ones())
    }

    /// Whether the sink has been released.
    pub fn is_closed(&self) -> bool {
        self.bits.is_none()
    }

    fn bits_mut(&mut self) -> Result<&mut BitArray> {
        self.bits.as_mut().ok_or(Error::Closed)
    }
}

impl BitSink for MemorySink {
    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn set(&mut self, index: u64) -> Result<()> {
        self.bits_mut()?.set(index)
    }

    fn unset(&mut self, index: u64) -> Result<()> {
        self.bits_mut()?.unset(index)
    }

    fn is_set(&self, index: u64) -> Result<bool> {
        self.bits()?.is_set(index)
    }

    fn close(&mut self) -> Result<()> {
        self.bits = None;
        Ok(())
    }
}
