//! File-persisted bit sink.
//!
//! A [`MemorySink`] plus a snapshot location. The snapshot is read once when
//! the sink is opened and written when it is closed; between the two, the
//! in-memory bits are authoritative.

use crate::backend::memory::MemorySink;
use crate::config::{CompressionType, Options};
use crate::error::{Error, Result};
use crate::filter::BitSink;
use crate::snapshot;
use std::path::{Path, PathBuf};

/// A bit sink persisted to a compressed snapshot file.
///
/// Closing is the commit point. If the sink is dropped without being closed
/// (early return, panic unwinding), the snapshot is still written on a best
/// effort basis and failures are logged.
#[derive(Debug)]
pub struct FileSink {
    memory: MemorySink,
    path: PathBuf,
    rounds: u32,
    compression: CompressionType,
    sync: bool,
    /// Set when `close` reported a failed save and nothing changed since
    close_failed: bool,
}

impl FileSink {
    /// Open the sink, loading the snapshot at `path` if one exists.
    ///
    /// A missing snapshot starts an all-unset sink. A snapshot that cannot be
    /// decoded, or that was written for a different capacity or number of
    /// rounds, is rejected with `CorruptSnapshot`.
    pub fn open<P: AsRef<Path>>(path: P, options: &Options) -> Result<Self> {
        options.validate()?;
        let path = path.as_ref().to_path_buf();

        let memory = match snapshot::load(&path)? {
            Some(snapshot) => {
                let header = snapshot.header;
                if header.capacity != options.capacity || header.rounds != options.rounds {
                    return Err(Error::corrupt_snapshot(format!(
                        "Snapshot {:?} holds capacity {} / rounds {}, expected {} / {}",
                        path, header.capacity, header.rounds, options.capacity, options.rounds
                    )));
                }
                MemorySink::from_bits(snapshot.bits)
            }
            None => {
                log::debug!("No snapshot at {:?}, starting empty", path);
                MemorySink::new(options.capacity)
            }
        };

        Ok(Self {
            memory,
            path,
            rounds: options.rounds,
            compression: options.compression,
            sync: options.sync_on_close,
            close_failed: false,
        })
    }

    /// Write the current bits to the snapshot location.
    pub fn save(&self) -> Result<()> {
        let bits = self.memory.bits()?;
        snapshot::save(&self.path, bits, self.rounds, self.compression, self.sync)
    }

    /// Number of bits currently set.
    pub fn bits_set(&self) -> Result<u64> {
        self.memory.bits_set()
    }

    /// The snapshot location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the sink has been released.
    pub fn is_closed(&self) -> bool {
        self.memory.is_closed()
    }
}

impl BitSink for FileSink {
    fn capacity(&self) -> u64 {
        self.memory.capacity()
    }

    fn set(&mut self, index: u64) -> Result<()> {
        self.memory.set(index)?;
        self.close_failed = false;
        Ok(())
    }

    fn unset(&mut self, index: u64) -> Result<()> {
        self.memory.unset(index)?;
        self.close_failed = false;
        Ok(())
    }

    fn is_set(&self, index: u64) -> Result<bool> {
        self.memory.is_set(index)
    }

    /// Write the snapshot, then release the bits.
    ///
    /// If the write fails the bits are kept and the error is returned. A sink
    /// held directly may call `close` again; dropping it does not repeat the
    /// failed save unless bits changed after the failure.
    fn close(&mut self) -> Result<()> {
        if self.memory.is_closed() {
            return Ok(());
        }
        if let Err(e) = self.save() {
            self.close_failed = true;
            return Err(e);
        }
        self.close_failed = false;
        self.memory.close()
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        if self.memory.is_closed() {
            return;
        }
        if self.close_failed {
            log::debug!("Not retrying failed snapshot save {:?} on drop", self.path);
            return;
        }
        if let Err(e) = self.close() {
            log::error!("Failed to save snapshot {:?} on drop: {}", self.path, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn options() -> Options {
        Options::new().capacity(4096).rounds(3).sync_on_close(false)
    }

    #[test]
    fn test_open_missing_starts_empty() {
        let dir = TempDir::new().unwrap();
        let sink = FileSink::open(dir.path().join("absent.snap"), &options()).unwrap();
        assert_eq!(sink.capacity(), 4096);
        assert_eq!(sink.bits_set().unwrap(), 0);
    }

    #[test]
    fn test_close_persists_bits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bits.snap");

        let mut sink = FileSink::open(&path, &options()).unwrap();
        sink.set(10).unwrap();
        sink.set(4095).unwrap();
        sink.close().unwrap();
        assert!(sink.is_closed());
        assert!(path.exists());

        let reopened = FileSink::open(&path, &options()).unwrap();
        assert!(reopened.is_set(10).unwrap());
        assert!(reopened.is_set(4095).unwrap());
        assert!(!reopened.is_set(11).unwrap());
    }

    #[test]
    fn test_drop_persists_bits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dropped.snap");

        {
            let mut sink = FileSink::open(&path, &options()).unwrap();
            sink.set(77).unwrap();
        }

        let reopened = FileSink::open(&path, &options()).unwrap();
        assert!(reopened.is_set(77).unwrap());
    }

    #[test]
    fn test_drop_does_not_repeat_failed_close() {
        let dir = TempDir::new().unwrap();
        let parent = dir.path().join("later");
        let path = parent.join("bits.snap");

        {
            let mut sink = FileSink::open(&path, &options()).unwrap();
            sink.set(3).unwrap();
            assert!(matches!(sink.close(), Err(Error::StorageUnavailable(_))));
            assert!(!sink.is_closed());

            // The location becomes writable, but the failure was already reported
            std::fs::create_dir(&parent).unwrap();
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_changes_after_failed_close_are_saved_on_drop() {
        let dir = TempDir::new().unwrap();
        let parent = dir.path().join("later");
        let path = parent.join("bits.snap");

        {
            let mut sink = FileSink::open(&path, &options()).unwrap();
            sink.set(3).unwrap();
            assert!(sink.close().is_err());

            std::fs::create_dir(&parent).unwrap();
            sink.set(4).unwrap();
        }

        let reopened = FileSink::open(&path, &options()).unwrap();
        assert!(reopened.is_set(3).unwrap());
        assert!(reopened.is_set(4).unwrap());
    }

    #[test]
    fn test_close_can_be_retried() {
        let dir = TempDir::new().unwrap();
        let parent = dir.path().join("later");
        let path = parent.join("bits.snap");

        let mut sink = FileSink::open(&path, &options()).unwrap();
        sink.set(9).unwrap();
        assert!(sink.close().is_err());

        std::fs::create_dir(&parent).unwrap();
        sink.close().unwrap();
        assert!(sink.is_closed());
        assert!(FileSink::open(&path, &options()).unwrap().is_set(9).unwrap());
    }

    #[test]
    fn test_parameter_mismatch_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("params.snap");

        let mut sink = FileSink::open(&path, &options()).unwrap();
        sink.set(1).unwrap();
        sink.close().unwrap();

        let wrong_capacity = options().capacity(8192);
        assert!(matches!(
            FileSink::open(&path, &wrong_capacity),
            Err(Error::CorruptSnapshot(_))
        ));

        let wrong_rounds = options().rounds(4);
        assert!(matches!(
            FileSink::open(&path, &wrong_rounds),
            Err(Error::CorruptSnapshot(_))
        ));
    }

    #[test]
    fn test_closed_sink_rejects_operations() {
        let dir = TempDir::new().unwrap();
        let mut sink = FileSink::open(dir.path().join("closed.snap"), &options()).unwrap();
        sink.close().unwrap();

        assert!(matches!(sink.set(0), Err(Error::Closed)));
        assert!(matches!(sink.save(), Err(Error::Closed)));
        assert!(sink.close().is_ok());
    }
}
