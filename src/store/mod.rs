//! Remote list store contract.
//!
//! A [`ListStore`] holds named, fixed-length sequences of short string
//! values. [`RemoteSink`](crate::backend::RemoteSink) maps each bit of a
//! filter to one element: `"1"` is set, anything else is unset.

mod memory;
#[cfg(feature = "redis")]
pub mod redis_store;

pub use memory::MemoryListStore;
#[cfg(feature = "redis")]
pub use redis_store::RedisListStore;

use crate::error::Result;
use std::sync::Arc;

/// Element value of a set bit.
pub const SET_MARKER: &str = "1";

/// Element value of an unset bit.
pub const UNSET_MARKER: &str = "0";

/// Operations the remote backend needs from an external list store.
///
/// Every method is a single round-trip and is expected to be atomic on its
/// own; nothing spanning several calls is. Methods take `&self` so one store
/// session can back several filters.
pub trait ListStore {
    /// Length of the sequence at `key`, or 0 if there is none.
    fn get_length(&self, key: &str) -> Result<u64>;

    /// Remove the sequence at `key`, if any.
    fn delete(&self, key: &str) -> Result<()>;

    /// Create a sequence of `length` unset elements at `key`.
    fn create_sequence(&self, key: &str, length: u64) -> Result<()>;

    /// Overwrite the element at `index`.
    fn set_element(&self, key: &str, index: u64, value: &str) -> Result<()>;

    /// Read the element at `index`. `None` if the key or index does not exist.
    fn get_element(&self, key: &str, index: u64) -> Result<Option<String>>;
}

impl<T: ListStore + ?Sized> ListStore for &T {
    fn get_length(&self, key: &str) -> Result<u64> {
        (**self).get_length(key)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn create_sequence(&self, key: &str, length: u64) -> Result<()> {
        (**self).create_sequence(key, length)
    }

    fn set_element(&self, key: &str, index: u64, value: &str) -> Result<()> {
        (**self).set_element(key, index, value)
    }

    fn get_element(&self, key: &str, index: u64) -> Result<Option<String>> {
        (**self).get_element(key, index)
    }
}

impl<T: ListStore + ?Sized> ListStore for Arc<T> {
    fn get_length(&self, key: &str) -> Result<u64> {
        (**self).get_length(key)
    }

    fn delete(&self, key: &str) -> Result<()> {
        (**self).delete(key)
    }

    fn create_sequence(&self, key: &str, length: u64) -> Result<()> {
        (**self).create_sequence(key, length)
    }

    fn set_element(&self, key: &str, index: u64, value: &str) -> Result<()> {
        (**self).set_element(key, index, value)
    }

    fn get_element(&self, key: &str, index: u64) -> Result<Option<String>> {
        (**self).get_element(key, index)
    }
}
