//! Storage backends implementing [`BitSink`](crate::filter::BitSink).
//!
//! - **Memory**: owns a packed [`BitArray`](crate::BitArray).
//! - **File**: wraps a memory sink and persists it as a compressed snapshot on close.
//! - **Remote**: maps each bit to one element of a fixed-length sequence in a
//!   [`ListStore`](crate::store::ListStore).

pub mod file;
pub mod memory;
pub mod remote;

pub use file::FileSink;
pub use memory::MemorySink;
pub use remote::{remote_key, RemoteSink};
