//! Hash family for deriving bit positions.
//!
//! Input bytes are first normalized with SHA-256, then the 32-byte digest is
//! fed to MurmurHash3 (x64, 128-bit, lower 64 bits kept) seeded with the
//! round number.
//!
//! Index selection is `derive(data, round) % capacity`. When `capacity` does
//! not divide 2^64 this carries a small modulo bias, which is kept as is.

use sha2::{Digest, Sha256};
use std::io::Cursor;

/// Size of the normalizing digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// The `k` hash functions for one input.
///
/// The SHA-256 pass runs once on construction; each [`derive`](Self::derive)
/// call only runs the seeded fast hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashFamily {
    digest: [u8; DIGEST_LEN],
}

impl HashFamily {
    /// Normalize `data` for hashing.
    pub fn new(data: &[u8]) -> Self {
        Self {
            digest: Sha256::digest(data).into(),
        }
    }

    /// Hash value for `round`.
    pub fn derive(&self, round: u32) -> u64 {
        let mut cursor = Cursor::new(&self.digest[..]);
        // Reading from an in-memory cursor cannot fail
        let hash = murmur3::murmur3_x64_128(&mut cursor, round).unwrap_or(0);
        hash as u64
    }

    /// Bit index for `round` in a sink of `capacity` bits.
    pub fn index(&self, round: u32, capacity: u64) -> u64 {
        debug_assert!(capacity > 0);
        self.derive(round) % capacity
    }

    /// Iterate over the bit indices for rounds `0..rounds`.
    pub fn indices(&self, rounds: u32, capacity: u64) -> impl Iterator<Item = u64> + '_ {
        (0..rounds).map(move |round| self.index(round, capacity))
    }

    /// The SHA-256 digest of the input.
    pub fn digest(&self) -> &[u8; DIGEST_LEN] {
        &self.digest
    }
}

/// Hash `data` for `round`.
///
/// Identical inputs yield identical outputs across runs and processes.
pub fn derive(data: &[u8], round: u32) -> u64 {
    HashFamily::new(data).derive(round)
}

/// Bit index of `data` for `round` in a sink of `capacity` bits.
pub fn bit_index(data: &[u8], round: u32, capacity: u64) -> u64 {
    HashFamily::new(data).index(round, capacity)
}
