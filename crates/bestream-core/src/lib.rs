//! # bestream-core
//!
//! Sequential, bounds-checked reading of big-endian binary data.
//!
//! This crate provides:
//! - A single read contract, [`ReadableStream`], with big-endian fixed-width
//!   accessors written once on top of `read`/`peek`
//! - [`MemoryStream`], a cursor over a borrowed buffer that can hand out
//!   narrower windows over the same bytes
//! - [`FileStream`], the same contract over an open file
//!
//! ## Architecture
//!
//! - [`endian`]: Byte order reversal
//! - [`stream`]: The shared read contract
//! - [`memory`]: Buffer-backed streams and windows
//! - [`file`]: File-backed streams
//! - [`error`]: Error types and handling
//!
//! ## Example
//!
//! ```no_run
//! use bestream_core::{FileStream, MemoryStream, ReadableStream};
//!
//! fn read_header(stream: &mut dyn ReadableStream) -> bestream_core::Result<(u32, u16)> {
//!     Ok((stream.get_be_u32()?, stream.get_be_u16()?))
//! }
//!
//! let data = std::fs::read("./header.bin")?;
//! let from_memory = read_header(&mut MemoryStream::new(&data))?;
//! let from_file = read_header(&mut FileStream::open("./header.bin")?)?;
//! assert_eq!(from_memory, from_file);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod endian;
pub mod error;
pub mod file;
pub mod memory;
pub mod stream;

// Re-export primary types for convenience
pub use endian::{swap_endian16, swap_endian32, swap_endian64};
pub use error::{Error, Result};
pub use file::FileStream;
pub use memory::MemoryStream;
pub use stream::ReadableStream;

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
