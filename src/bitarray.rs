//! Fixed-length packed bit array.
//!
//! Bits are packed into `u64` words, so `capacity` bits occupy
//! `ceil(capacity / 64)` words. The array performs no internal locking.

use crate::error::{Error, Result};

/// Number of bits in one storage word.
pub const WORD_BITS: u64 = u64::BITS as u64;

/// A fixed-size sequence of bits addressed `0..capacity`.
///
/// # Example
/// ```
/// use bloomkit::BitArray;
///
/// let mut bits = BitArray::new(100);
/// bits.set(42).unwrap();
/// assert!(bits.is_set(42).unwrap());
/// assert!(!bits.is_set(41).unwrap());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitArray {
    words: Vec<u64>,
    capacity: u64,
}

impl BitArray {
    /// Allocate `capacity` bits, all unset.
    pub fn new(capacity: u64) -> Self {
        Self {
            words: vec![0u64; Self::words_for(capacity)],
            capacity,
        }
    }

    /// Rebuild a bit array from its raw words.
    ///
    /// Fails if the word count does not match `capacity`, or if any bit past
    /// `capacity` in the last word is set.
    pub fn from_words(words: Vec<u64>, capacity: u64) -> Result<Self> {
        let expected = Self::words_for(capacity);
        if words.len() != expected {
            return Err(Error::invalid_argument(format!(
                "expected {} words for {} bits, got {}",
                expected,
                capacity,
                words.len()
            )));
        }

        let tail = capacity % WORD_BITS;
        if tail != 0 {
            if let Some(last) = words.last() {
                if last >> tail != 0 {
                    return Err(Error::invalid_argument(
                        "bits set beyond capacity in the last word",
                    ));
                }
            }
        }

        Ok(Self { words, capacity })
    }

    /// Number of words needed to hold `capacity` bits.
    pub fn words_for(capacity: u64) -> usize {
        capacity.div_ceil(WORD_BITS) as usize
    }

    /// Set the bit at `index`.
    pub fn set(&mut self, index: u64) -> Result<()> {
        let (word, mask) = self.locate(index)?;
        self.words[word] |= mask;
        Ok(())
    }

    /// Clear the bit at `index`.
    pub fn unset(&mut self, index: u64) -> Result<()> {
        let (word, mask) = self.locate(index)?;
        self.words[word] &= !mask;
        Ok(())
    }

    /// Check whether the bit at `index` is set.
    pub fn is_set(&self, index: u64) -> Result<bool> {
        let (word, mask) = self.locate(index)?;
        Ok(self.words[word] & mask != 0)
    }

    /// Number of addressable bits.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Number of bits currently set.
    pub fn count_ones(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// The packed words, least significant bit first within each word.
    pub fn words(&self) -> &[u64] {
        &self.words
    }

    /// Memory held by the packed words, in bytes.
    pub fn size_in_bytes(&self) -> usize {
        self.words.len() * std::mem::size_of::<u64>()
    }

    fn locate(&self, index: u64) -> Result<(usize, u64)> {
        if index >= self.capacity {
            return Err(Error::out_of_bounds(index, self.capacity));
        }
        Ok(((index / WORD_BITS) as usize, 1u64 << (index % WORD_BITS)))
    }
}
