//! Configuration options for bloomkit filters.

use serde::{Deserialize, Serialize};

/// Default number of bit slots: 64 Mi bits (8 MiB of packed words).
pub const DEFAULT_CAPACITY: u64 = 64 << 20;

/// Default number of hash rounds per operation.
pub const DEFAULT_ROUNDS: u32 = 5;

/// Default namespace for remote sequences.
pub const DEFAULT_REMOTE_KEY_PREFIX: &str = "_bloomfilter";

/// Configuration options for constructing a filter.
///
/// `capacity` and `rounds` are always caller-supplied; nothing here derives
/// them from an expected item count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Total number of addressable bit slots.
    /// Default: 64 << 20
    pub capacity: u64,

    /// Number of hash rounds (k) per put/has.
    /// Default: 5
    pub rounds: u32,

    /// Compression applied to file snapshots.
    /// Default: CompressionType::Snappy
    pub compression: CompressionType,

    /// Fsync the snapshot before it replaces the previous one.
    /// Default: true
    pub sync_on_close: bool,

    /// Prefix of the remote key. The full key also encodes capacity and rounds.
    /// Default: "_bloomfilter"
    pub remote_key_prefix: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            rounds: DEFAULT_ROUNDS,
            compression: CompressionType::default(),
            sync_on_close: true,
            remote_key_prefix: DEFAULT_REMOTE_KEY_PREFIX.to_string(),
        }
    }
}

/// Compression algorithms supported for file snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum CompressionType {
    /// No compression.
    None = 0,

    /// Snappy frame compression (fast, moderate compression ratio).
    #[cfg(feature = "snappy")]
    Snappy = 1,

    /// LZ4 frame compression (very fast, lower compression ratio).
    #[cfg(feature = "lz4-compression")]
    Lz4 = 2,
}

impl CompressionType {
    /// Convert from u8
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CompressionType::None),
            #[cfg(feature = "snappy")]
            1 => Some(CompressionType::Snappy),
            #[cfg(feature = "lz4-compression")]
            2 => Some(CompressionType::Lz4),
            _ => None,
        }
    }
}

impl Default for CompressionType {
    fn default() -> Self {
        #[cfg(feature = "snappy")]
        return CompressionType::Snappy;

        #[cfg(not(feature = "snappy"))]
        CompressionType::None
    }
}

impl Options {
    /// Creates a new Options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of bit slots.
    pub fn capacity(mut self, capacity: u64) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the number of hash rounds.
    pub fn rounds(mut self, rounds: u32) -> Self {
        self.rounds = rounds;
        self
    }

    /// Sets the snapshot compression algorithm.
    pub fn compression(mut self, compression: CompressionType) -> Self {
        self.compression = compression;
        self
    }

    /// Sets whether the snapshot is fsynced on close.
    pub fn sync_on_close(mut self, value: bool) -> Self {
        self.sync_on_close = value;
        self
    }

    /// Sets the remote key prefix.
    pub fn remote_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.remote_key_prefix = prefix.into();
        self
    }

    /// Parses options from a JSON document. Missing fields take their defaults.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        let options: Options = serde_json::from_str(json)
            .map_err(|e| crate::Error::invalid_argument(format!("Malformed options: {}", e)))?;
        options.validate()?;
        Ok(options)
    }

    /// Serializes the options to a JSON document.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| crate::Error::invalid_argument(format!("Unserializable options: {}", e)))
    }

    /// Validates the options and returns an error if any are invalid.
    pub fn validate(&self) -> crate::Result<()> {
        if self.capacity == 0 {
            return Err(crate::Error::invalid_argument("capacity must be > 0"));
        }
        if self.rounds == 0 {
            return Err(crate::Error::invalid_argument("rounds must be > 0"));
        }
        if self.remote_key_prefix.is_empty() {
            return Err(crate::Error::invalid_argument(
                "remote_key_prefix must not be empty",
            ));
        }
        Ok(())
    }
}
