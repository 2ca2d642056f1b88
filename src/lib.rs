//! # bloomkit - A Bloom Filter with Pluggable Storage
//!
//! bloomkit implements a probabilistic set-membership structure that can keep
//! its bits in one of three places while sharing a single hashing protocol.
//!
//! ## Architecture
//!
//! - **BitArray**: fixed-length bit array packed into `u64` words
//! - **HashFamily**: SHA-256 pre-hash followed by `k` seeded MurmurHash3 rounds
//! - **BloomFilter**: `put`/`has`/`close` over any [`BitSink`]
//! - **Backends**:
//!   - [`MemorySink`]: bits owned in process memory
//!   - [`FileSink`]: memory bits persisted as a compressed snapshot on close
//!   - [`RemoteSink`]: one element per bit in a shared [`ListStore`]
//!
//! A filter never returns `false` for data it was given (no false negatives)
//! but may return `true` for data it never saw (false positives).
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bloomkit::BloomFilter;
//!
//! # fn main() -> Result<(), bloomkit::Error> {
//! // Open a file-backed filter, restoring earlier state if present
//! let mut filter = BloomFilter::open_file("./seen.bloom", 64 << 20, 5)?;
//!
//! filter.put_str("https://example.com/")?;
//! assert!(filter.has_str("https://example.com/")?);
//!
//! // Closing writes the snapshot
//! filter.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Thread Safety
//!
//! Nothing here locks internally. Local sinks must not be mutated from
//! several threads without external synchronization. Remote sinks inherit
//! the per-operation atomicity of the store; a concurrent `has` may observe
//! a `put` halfway through.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Module declarations
pub mod backend;
pub mod bitarray;
pub mod config;
pub mod error;
pub mod filter;
pub mod hash;
pub mod snapshot;
pub mod store;

// Re-exports
pub use backend::{FileSink, MemorySink, RemoteSink};
pub use bitarray::BitArray;
pub use config::{CompressionType, Options};
pub use error::{Error, Result};
pub use filter::{BitSink, BloomFilter, FileBloomFilter, MemoryBloomFilter, RemoteBloomFilter};
pub use hash::HashFamily;
pub use store::{ListStore, MemoryListStore};
#[cfg(feature = "redis")]
pub use store::RedisListStore;
