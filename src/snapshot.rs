//! On-disk snapshot of a bit array.
//!
//! Layout (little-endian):
//! - Magic (8 bytes): `BLMSNAP\0`
//! - Version (1 byte)
//! - Compression (1 byte): `CompressionType` tag of the payload
//! - Rounds (4 bytes): hash rounds of the filter that wrote it
//! - Capacity (8 bytes): number of bits
//! - Word count (8 bytes): `ceil(capacity / 64)`
//! - Checksum (4 bytes): CRC32 of the uncompressed payload
//! - Payload (variable): the packed words as little-endian `u64`, passed
//!   through the compression stream
//!
//! Saving goes through a temporary file that is renamed over the target, so a
//! successful save fully replaces the previous snapshot.

use crate::bitarray::BitArray;
use crate::config::CompressionType;
use crate::error::{Error, Result};
use bytes::{Buf, BufMut, BytesMut};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Magic bytes at the start of every snapshot.
pub const SNAPSHOT_MAGIC: [u8; 8] = *b"BLMSNAP\0";

/// Current snapshot format version.
pub const SNAPSHOT_VERSION: u8 = 1;

/// Size of the uncompressed header in bytes.
pub const HEADER_SIZE: usize = 34;

/// Words encoded per payload chunk.
const CHUNK_WORDS: usize = 8 * 1024;

/// Snapshot header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    /// Compression of the payload
    pub compression: CompressionType,
    /// Hash rounds of the filter that wrote the snapshot
    pub rounds: u32,
    /// Number of bits
    pub capacity: u64,
    /// Number of packed words in the payload
    pub num_words: u64,
    /// CRC32 of the uncompressed payload
    pub checksum: u32,
}

impl SnapshotHeader {
    /// Encode the header into bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(HEADER_SIZE);
        buf.put_slice(&SNAPSHOT_MAGIC);
        buf.put_u8(SNAPSHOT_VERSION);
        buf.put_u8(self.compression as u8);
        buf.put_u32_le(self.rounds);
        buf.put_u64_le(self.capacity);
        buf.put_u64_le(self.num_words);
        buf.put_u32_le(self.checksum);
        buf.to_vec()
    }

    /// Decode a header from bytes
    pub fn decode(mut data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_SIZE {
            return Err(Error::corrupt_snapshot(format!(
                "Header too short: {} bytes",
                data.len()
            )));
        }

        let mut magic = [0u8; 8];
        data.copy_to_slice(&mut magic);
        if magic != SNAPSHOT_MAGIC {
            return Err(Error::corrupt_snapshot("Bad magic"));
        }

        let version = data.get_u8();
        if version != SNAPSHOT_VERSION {
            return Err(Error::corrupt_snapshot(format!(
                "Unsupported version: {}",
                version
            )));
        }

        let tag = data.get_u8();
        let compression = CompressionType::from_u8(tag).ok_or_else(|| {
            Error::corrupt_snapshot(format!("Unknown or disabled compression type: {}", tag))
        })?;

        let rounds = data.get_u32_le();
        let capacity = data.get_u64_le();
        let num_words = data.get_u64_le();
        let checksum = data.get_u32_le();

        if capacity == 0 || rounds == 0 {
            return Err(Error::corrupt_snapshot(format!(
                "Invalid parameters: capacity {}, rounds {}",
                capacity, rounds
            )));
        }
        if num_words != BitArray::words_for(capacity) as u64 {
            return Err(Error::corrupt_snapshot(format!(
                "Word count {} does not match capacity {}",
                num_words, capacity
            )));
        }

        Ok(Self {
            compression,
            rounds,
            capacity,
            num_words,
            checksum,
        })
    }
}

/// A decoded snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    /// The header as stored
    pub header: SnapshotHeader,
    /// The restored bits
    pub bits: BitArray,
}

/// Serialize `bits` into `writer`.
pub fn write_to<W: Write>(
    mut writer: W,
    bits: &BitArray,
    rounds: u32,
    compression: CompressionType,
) -> Result<()> {
    let mut hasher = crc32fast::Hasher::new();
    for_each_chunk(bits.words(), |chunk| {
        hasher.update(chunk);
        Ok(())
    })?;

    let header = SnapshotHeader {
        compression,
        rounds,
        capacity: bits.capacity(),
        num_words: bits.words().len() as u64,
        checksum: hasher.finalize(),
    };
    writer.write_all(&header.encode())?;

    match compression {
        CompressionType::None => {
            for_each_chunk(bits.words(), |chunk| Ok(writer.write_all(chunk)?))?;
        }
        #[cfg(feature = "snappy")]
        CompressionType::Snappy => {
            let mut encoder = snap::write::FrameEncoder::new(&mut writer);
            for_each_chunk(bits.words(), |chunk| Ok(encoder.write_all(chunk)?))?;
            encoder.flush()?;
        }
        #[cfg(feature = "lz4-compression")]
        CompressionType::Lz4 => {
            let mut encoder = lz4::EncoderBuilder::new().build(&mut writer)?;
            for_each_chunk(bits.words(), |chunk| Ok(encoder.write_all(chunk)?))?;
            let (_, result) = encoder.finish();
            result?;
        }
    }

    writer.flush()?;
    Ok(())
}

/// Deserialize a snapshot from `reader`.
pub fn read_from<R: Read>(mut reader: R) -> Result<Snapshot> {
    let mut header_buf = [0u8; HEADER_SIZE];
    reader
        .read_exact(&mut header_buf)
        .map_err(|e| read_error("header", e))?;
    let header = SnapshotHeader::decode(&header_buf)?;

    let (words, checksum) = match header.compression {
        CompressionType::None => read_words(reader, header.num_words)?,
        #[cfg(feature = "snappy")]
        CompressionType::Snappy => {
            read_words(snap::read::FrameDecoder::new(reader), header.num_words)?
        }
        #[cfg(feature = "lz4-compression")]
        CompressionType::Lz4 => {
            let decoder = lz4::Decoder::new(reader).map_err(|e| read_error("payload", e))?;
            read_words(decoder, header.num_words)?
        }
    };

    if checksum != header.checksum {
        return Err(Error::corrupt_snapshot(format!(
            "Checksum mismatch: expected {:#x}, got {:#x}",
            header.checksum, checksum
        )));
    }

    let bits = BitArray::from_words(words, header.capacity)
        .map_err(|e| Error::corrupt_snapshot(e.to_string()))?;

    Ok(Snapshot { header, bits })
}

/// Save `bits` to `path`, replacing any previous snapshot.
pub fn save(
    path: &Path,
    bits: &BitArray,
    rounds: u32,
    compression: CompressionType,
    sync: bool,
) -> Result<()> {
    let tmp_path = temp_path(path);
    let file = File::create(&tmp_path).map_err(|e| {
        Error::storage_unavailable(format!("Cannot create {:?}: {}", tmp_path, e))
    })?;

    let result = write_file(file, bits, rounds, compression, sync)
        .and_then(|_| fs::rename(&tmp_path, path).map_err(Error::Io));

    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result?;

    log::info!(
        "Saved snapshot {:?}: {} bits, {} rounds, {:?}",
        path,
        bits.capacity(),
        rounds,
        compression
    );
    Ok(())
}

/// Load the snapshot at `path`.
///
/// Returns `Ok(None)` if no snapshot exists.
pub fn load(path: &Path) -> Result<Option<Snapshot>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(Error::storage_unavailable(format!(
                "Cannot open {:?}: {}",
                path, e
            )))
        }
    };

    let metadata = file.metadata().map_err(|e| {
        Error::storage_unavailable(format!("Cannot stat {:?}: {}", path, e))
    })?;
    if !metadata.is_file() {
        return Err(Error::storage_unavailable(format!(
            "{:?} is not a regular file",
            path
        )));
    }

    let snapshot = read_from(BufReader::new(file))?;
    log::info!(
        "Loaded snapshot {:?}: {} bits, {} words",
        path,
        snapshot.header.capacity,
        snapshot.header.num_words
    );
    Ok(Some(snapshot))
}

fn write_file(
    file: File,
    bits: &BitArray,
    rounds: u32,
    compression: CompressionType,
    sync: bool,
) -> Result<()> {
    let mut writer = BufWriter::new(file);
    write_to(&mut writer, bits, rounds, compression)?;
    writer.flush()?;
    if sync {
        writer.get_ref().sync_all()?;
    }
    Ok(())
}

/// Classify a failed read of `part`.
///
/// OS-level failures of the underlying file are `StorageUnavailable`; a short
/// stream or a decoder rejecting its input is `CorruptSnapshot`.
fn read_error(part: &str, e: io::Error) -> Error {
    if e.raw_os_error().is_some() {
        return Error::storage_unavailable(format!("Cannot read snapshot {}: {}", part, e));
    }
    match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::corrupt_snapshot(format!("Truncated {}", part)),
        _ => Error::corrupt_snapshot(format!("Cannot decode {}: {}", part, e)),
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn for_each_chunk(words: &[u64], mut f: impl FnMut(&[u8]) -> Result<()>) -> Result<()> {
    let mut buf = Vec::with_capacity(CHUNK_WORDS * 8);
    for chunk in words.chunks(CHUNK_WORDS) {
        buf.clear();
        for word in chunk {
            buf.extend_from_slice(&word.to_le_bytes());
        }
        f(&buf)?;
    }
    Ok(())
}

/// Read `num_words` words and the CRC32 of their raw bytes.
fn read_words<R: Read>(mut reader: R, num_words: u64) -> Result<(Vec<u64>, u32)> {
    let mut words = Vec::new();
    let mut hasher = crc32fast::Hasher::new();
    let mut buf = vec![0u8; CHUNK_WORDS * 8];
    let mut remaining = num_words;

    while remaining > 0 {
        let n = remaining.min(CHUNK_WORDS as u64) as usize;
        let chunk = &mut buf[..n * 8];
        reader
            .read_exact(chunk)
            .map_err(|e| read_error("payload", e))?;

        hasher.update(chunk);
        words.extend(chunk.chunks_exact(8).map(|b| {
            let mut word = [0u8; 8];
            word.copy_from_slice(b);
            u64::from_le_bytes(word)
        }));
        remaining -= n as u64;
    }

    let mut probe = [0u8; 1];
    match reader.read(&mut probe) {
        Ok(0) => {}
        Ok(_) => return Err(Error::corrupt_snapshot("Trailing data after payload")),
        Err(e) => return Err(read_error("payload", e)),
    }

    Ok((words, hasher.finalize()))
}
