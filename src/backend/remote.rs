//! Remote bit sink over a shared [`ListStore`].
//!
//! Each bit is one element of a fixed-length sequence. The sequence key is
//! derived from `(capacity, rounds)`, so filters with different parameters
//! never share storage, while filters with the same parameters on the same
//! store see each other's bits.
//!
//! Every `set`/`is_set` is one round-trip; a `put` or `has` therefore costs
//! `rounds` round-trips and is not transactional.

use crate::config::Options;
use crate::error::{Error, Result};
use crate::filter::BitSink;
use crate::store::{ListStore, SET_MARKER, UNSET_MARKER};

/// Sequence key for a filter with the given parameters.
///
/// ```
/// assert_eq!(bloomkit::backend::remote_key("_bloomfilter", 2000, 5), "_bloomfilter:n2000:k5");
/// ```
pub fn remote_key(prefix: &str, capacity: u64, rounds: u32) -> String {
    format!("{}:n{}:k{}", prefix, capacity, rounds)
}

/// A bit sink stored in a remote list store.
///
/// The sink holds a handle to the store, not the data: closing drops the
/// handle and leaves the remote sequence in place.
#[derive(Debug)]
pub struct RemoteSink<L: ListStore> {
    /// `None` once closed
    store: Option<L>,
    key: String,
    capacity: u64,
}

impl<L: ListStore> RemoteSink<L> {
    /// Bind to the sequence for `options.capacity` and `options.rounds`.
    ///
    /// If a sequence exists under the key with a length other than
    /// `capacity`, it is deleted and replaced by an all-unset one. Its
    /// previous contents are lost.
    ///
    /// The length check and the replacement are separate store calls, so two
    /// first-time connects racing on a fresh key may each recreate it and drop
    /// bits the other already set. Connect once before starting concurrent
    /// writers.
    pub fn connect(store: L, options: &Options) -> Result<Self> {
        options.validate()?;
        let key = remote_key(&options.remote_key_prefix, options.capacity, options.rounds);

        let length = store.get_length(&key)?;
        if length != options.capacity {
            if length > 0 {
                log::warn!(
                    "Discarding remote sequence {}: length {} does not match capacity {}",
                    key,
                    length,
                    options.capacity
                );
            }
            store.delete(&key)?;
            store.create_sequence(&key, options.capacity)?;
        }

        Ok(Self {
            store: Some(store),
            key,
            capacity: options.capacity,
        })
    }

    /// The remote sequence key.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The store handle.
    pub fn store(&self) -> Result<&L> {
        self.store.as_ref().ok_or(Error::Closed)
    }

    /// Whether the handle has been released.
    pub fn is_closed(&self) -> bool {
        self.store.is_none()
    }

    fn check_index(&self, index: u64) -> Result<()> {
        if index >= self.capacity {
            return Err(Error::out_of_bounds(index, self.capacity));
        }
        Ok(())
    }
}

impl<L: ListStore> BitSink for RemoteSink<L> {
    fn capacity(&self) -> u64 {
        self.capacity
    }

    fn set(&mut self, index: u64) -> Result<()> {
        self.check_index(index)?;
        self.store()?.set_element(&self.key, index, SET_MARKER)
    }

    fn unset(&mut self, index: u64) -> Result<()> {
        self.check_index(index)?;
        self.store()?.set_element(&self.key, index, UNSET_MARKER)
    }

    fn is_set(&self, index: u64) -> Result<bool> {
        self.check_index(index)?;
        let value = self.store()?.get_element(&self.key, index)?;
        Ok(value.as_deref() == Some(SET_MARKER))
    }

    fn close(&mut self) -> Result<()> {
        self.store = None;
        Ok(())
    }
}
