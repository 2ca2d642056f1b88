//! Bloom Filter implementation.
//!
//! A space-efficient probabilistic data structure used to test whether an element
//! is a member of a set. False positive matches are possible, but false negatives are not.

use crate::backend::{FileSink, MemorySink, RemoteSink};
use crate::config::Options;
use crate::error::{Error, Result};
use crate::filter::BitSink;
use crate::hash::HashFamily;
use crate::store::ListStore;
use std::path::Path;

/// A filter whose bits live in process memory.
pub type MemoryBloomFilter = BloomFilter<MemorySink>;

/// A filter whose bits are persisted to a snapshot file on close.
pub type FileBloomFilter = BloomFilter<FileSink>;

/// A filter whose bits live in a shared remote list store.
pub type RemoteBloomFilter<L> = BloomFilter<RemoteSink<L>>;

/// BloomFilter provides probabilistic set membership testing over any [`BitSink`].
///
/// Each `put` sets `rounds` bits, each `has` requires all `rounds` bits to be
/// set. The inserted items themselves are never stored.
///
/// # Example
/// ```
/// use bloomkit::BloomFilter;
///
/// # fn main() -> bloomkit::Result<()> {
/// let mut filter = BloomFilter::in_memory(1 << 16, 5)?;
/// filter.put_str("user:1001")?;
///
/// assert!(filter.has_str("user:1001")?);
/// // user:1002 might return true (false positive) or false
/// filter.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct BloomFilter<S: BitSink> {
    /// Where the bits live
    sink: S,
    /// Number of hash rounds per operation
    rounds: u32,
}

impl<S: BitSink> BloomFilter<S> {
    /// Bind a filter to `sink` using `rounds` hash rounds.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if `rounds` is zero or the sink has no bits.
    pub fn new(sink: S, rounds: u32) -> Result<Self> {
        if rounds == 0 {
            return Err(Error::invalid_argument("rounds must be > 0"));
        }
        if sink.capacity() == 0 {
            return Err(Error::invalid_argument("capacity must be > 0"));
        }
        Ok(Self { sink, rounds })
    }

    /// Add a record to the filter.
    ///
    /// Idempotent: putting the same data again changes nothing. Backend
    /// errors abort the call; bits already set by earlier rounds stay set.
    pub fn put(&mut self, data: &[u8]) -> Result<()> {
        let capacity = self.sink.capacity();
        let family = HashFamily::new(data);

        for index in family.indices(self.rounds, capacity) {
            self.sink.set(index)?;
        }

        Ok(())
    }

    /// Add a string record to the filter.
    pub fn put_str(&mut self, data: &str) -> Result<()> {
        self.put(data.as_bytes())
    }

    /// Check whether a record may have been added.
    ///
    /// Returns `false` only if the record was definitely never added.
    pub fn has(&self, data: &[u8]) -> Result<bool> {
        let capacity = self.sink.capacity();
        let family = HashFamily::new(data);

        for index in family.indices(self.rounds, capacity) {
            if !self.sink.is_set(index)? {
                return Ok(false); // Definitely not present
            }
        }

        Ok(true) // Possibly present (or false positive)
    }

    /// Check whether a string record may have been added.
    pub fn has_str(&self, data: &str) -> Result<bool> {
        self.has(data.as_bytes())
    }

    /// Release the filter's bit sink.
    ///
    /// For file-backed filters this is the commit point: the snapshot is
    /// written before the bits are dropped.
    pub fn close(mut self) -> Result<()> {
        self.sink.close()
    }

    /// Number of bit slots.
    pub fn size(&self) -> u64 {
        self.sink.capacity()
    }

    /// Number of hash rounds per operation.
    pub fn rounds(&self) -> u32 {
        self.rounds
    }

    /// The bound bit sink.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Theoretical false positive rate after `num_items` distinct puts.
    ///
    /// p = (1 - e^(-kn/m))^k
    /// where k = rounds, n = num_items, m = size
    pub fn estimated_false_positive_rate(&self, num_items: u64) -> f64 {
        if num_items == 0 {
            return 0.0;
        }

        let k = f64::from(self.rounds);
        let n = num_items as f64;
        let m = self.size() as f64;

        (1.0 - (-k * n / m).exp()).powf(k)
    }
}

impl BloomFilter<MemorySink> {
    /// Create an in-memory filter with `capacity` bits.
    pub fn in_memory(capacity: u64, rounds: u32) -> Result<Self> {
        Self::in_memory_with_options(&Options::new().capacity(capacity).rounds(rounds))
    }

    /// Create an in-memory filter from options.
    pub fn in_memory_with_options(options: &Options) -> Result<Self> {
        options.validate()?;
        Self::new(MemorySink::new(options.capacity), options.rounds)
    }

    /// Number of bits currently set.
    pub fn bits_set(&self) -> Result<u64> {
        self.sink.bits_set()
    }
}

impl BloomFilter<FileSink> {
    /// Open a file-backed filter, loading the snapshot at `path` if one exists.
    pub fn open_file<P: AsRef<Path>>(path: P, capacity: u64, rounds: u32) -> Result<Self> {
        Self::open_file_with_options(path, &Options::new().capacity(capacity).rounds(rounds))
    }

    /// Open a file-backed filter from options.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The snapshot exists but cannot be read (`StorageUnavailable`)
    /// - The snapshot is malformed or was written with other parameters (`CorruptSnapshot`)
    pub fn open_file_with_options<P: AsRef<Path>>(path: P, options: &Options) -> Result<Self> {
        options.validate()?;
        let sink = FileSink::open(path, options)?;
        Self::new(sink, options.rounds)
    }

    /// Write the current bits to the snapshot without closing.
    pub fn save(&self) -> Result<()> {
        self.sink.save()
    }

    /// Number of bits currently set.
    pub fn bits_set(&self) -> Result<u64> {
        self.sink.bits_set()
    }
}

impl<L: ListStore> BloomFilter<RemoteSink<L>> {
    /// Bind a filter to the remote sequence for `(capacity, rounds)`.
    pub fn remote(store: L, capacity: u64, rounds: u32) -> Result<Self> {
        Self::remote_with_options(store, &Options::new().capacity(capacity).rounds(rounds))
    }

    /// Bind a filter to a remote store from options.
    ///
    /// An existing sequence of the wrong length under the derived key is
    /// discarded and replaced by an all-unset one.
    pub fn remote_with_options(store: L, options: &Options) -> Result<Self> {
        options.validate()?;
        let sink = RemoteSink::connect(store, options)?;
        Self::new(sink, options.rounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bloom_filter_basic() {
        let mut filter = BloomFilter::in_memory(1024, 3).unwrap();

        filter.put(b"key1").unwrap();
        filter.put(b"key2").unwrap();
        filter.put_str("key3").unwrap();

        assert!(filter.has(b"key1").unwrap());
        assert!(filter.has_str("key2").unwrap());
        assert!(filter.has(b"key3").unwrap());
        assert_eq!(filter.size(), 1024);
        assert_eq!(filter.rounds(), 3);
    }

    #[test]
    fn test_bloom_filter_empty() {
        let filter = BloomFilter::in_memory(1024, 3).unwrap();
        assert!(!filter.has(b"key1").unwrap());
        assert!(!filter.has(b"").unwrap());
        assert_eq!(filter.bits_set().unwrap(), 0);
    }

    #[test]
    fn test_bloom_filter_sets_at_most_rounds_bits() {
        let mut filter = BloomFilter::in_memory(1 << 20, 7).unwrap();
        filter.put(b"only").unwrap();

        let set = filter.bits_set().unwrap();
        assert!((1..=7).contains(&set));
    }

    #[test]
    fn test_bloom_filter_idempotent_put() {
        let mut filter = BloomFilter::in_memory(4096, 4).unwrap();
        filter.put(b"twice").unwrap();
        let words = filter.sink().words().unwrap().to_vec();

        filter.put(b"twice").unwrap();
        assert_eq!(filter.sink().words().unwrap(), &words[..]);
    }

    #[test]
    fn test_bloom_filter_single_bit() {
        let mut filter = BloomFilter::in_memory(1, 1).unwrap();
        assert!(!filter.has(b"a").unwrap());

        filter.put(b"a").unwrap();
        // Every item maps to bit 0
        assert!(filter.has(b"a").unwrap());
        assert!(filter.has(b"b").unwrap());
    }

    #[test]
    fn test_bloom_filter_rejects_bad_parameters() {
        assert!(matches!(
            BloomFilter::in_memory(0, 3),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            BloomFilter::in_memory(64, 0),
            Err(Error::InvalidArgument(_))
        ));
        assert!(BloomFilter::new(MemorySink::new(0), 1).is_err());
    }

    #[test]
    fn test_bloom_filter_estimated_fp_rate() {
        let filter = BloomFilter::in_memory(64 << 20, 5).unwrap();
        assert_eq!(filter.estimated_false_positive_rate(0), 0.0);

        let estimated = filter.estimated_false_positive_rate(50_000);
        assert!(estimated < 1e-9, "estimated {}", estimated);

        let small = BloomFilter::in_memory(1000, 5).unwrap();
        assert!(small.estimated_false_positive_rate(1000) > 0.5);
    }

    #[test]
    fn test_bloom_filter_close() {
        let mut filter = BloomFilter::in_memory(256, 2).unwrap();
        filter.put(b"x").unwrap();
        assert!(filter.close().is_ok());
    }
}
