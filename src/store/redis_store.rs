//! Redis-backed list store.
//!
//! Sequences are Redis lists: `LLEN`, `DEL`, `RPUSH`, `LSET` and `LINDEX`.

use crate::error::{Error, Result};
use crate::store::{ListStore, UNSET_MARKER};
use parking_lot::Mutex;
use std::fmt;

/// Elements pushed per `RPUSH` while creating a sequence.
const PUSH_CHUNK: u64 = 4096;

/// A [`ListStore`] on a single Redis connection.
///
/// The connection is guarded by a mutex so the store can be shared between
/// filters and threads; each operation is one command.
pub struct RedisListStore {
    conn: Mutex<redis::Connection>,
}

impl RedisListStore {
    /// Connect to the Redis server at `url`, e.g. `redis://127.0.0.1/`.
    ///
    /// # Errors
    ///
    /// Returns `StorageUnavailable` if the URL is invalid or the server cannot be reached.
    pub fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| Error::storage_unavailable(format!("Invalid endpoint {}: {}", url, e)))?;
        let conn = client
            .get_connection()
            .map_err(|e| Error::storage_unavailable(format!("Cannot connect to {}: {}", url, e)))?;
        Ok(Self::from_connection(conn))
    }

    /// Wrap an established connection.
    pub fn from_connection(conn: redis::Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }
}

impl fmt::Debug for RedisListStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisListStore").finish_non_exhaustive()
    }
}

fn command_failed(command: &str, key: &str, err: redis::RedisError) -> Error {
    Error::transport(format!("{} {}: {}", command, key, err))
}

impl ListStore for RedisListStore {
    fn get_length(&self, key: &str) -> Result<u64> {
        let mut conn = self.conn.lock();
        redis::cmd("LLEN")
            .arg(key)
            .query::<u64>(&mut *conn)
            .map_err(|e| command_failed("LLEN", key, e))
    }

    fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.lock();
        redis::cmd("DEL")
            .arg(key)
            .query::<()>(&mut *conn)
            .map_err(|e| command_failed("DEL", key, e))
    }

    fn create_sequence(&self, key: &str, length: u64) -> Result<()> {
        let mut conn = self.conn.lock();
        let mut remaining = length;
        while remaining > 0 {
            let n = remaining.min(PUSH_CHUNK);
            redis::cmd("RPUSH")
                .arg(key)
                .arg(vec![UNSET_MARKER; n as usize])
                .query::<()>(&mut *conn)
                .map_err(|e| command_failed("RPUSH", key, e))?;
            remaining -= n;
        }
        Ok(())
    }

    fn set_element(&self, key: &str, index: u64, value: &str) -> Result<()> {
        let mut conn = self.conn.lock();
        redis::cmd("LSET")
            .arg(key)
            .arg(index)
            .arg(value)
            .query::<()>(&mut *conn)
            .map_err(|e| command_failed("LSET", key, e))
    }

    fn get_element(&self, key: &str, index: u64) -> Result<Option<String>> {
        let mut conn = self.conn.lock();
        redis::cmd("LINDEX")
            .arg(key)
            .arg(index)
            .query::<Option<String>>(&mut *conn)
            .map_err(|e| command_failed("LINDEX", key, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_refused() {
        // Nothing listens on port 1
        let result = RedisListStore::connect("redis://127.0.0.1:1/");
        assert!(matches!(result, Err(Error::StorageUnavailable(_))));
    }

    #[test]
    fn test_invalid_url() {
        let result = RedisListStore::connect("not a url");
        assert!(matches!(result, Err(Error::StorageUnavailable(_))));
    }
}
