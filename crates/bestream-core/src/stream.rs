//! The shared read contract for every stream backend.
//!
//! [`ReadableStream`] has five primitives each backend implements
//! (`is_eof`, `left_bytes`, `skip`, `read`, `peek`) plus the cursor query
//! `position`. Everything else, including the big-endian fixed-width
//! accessors, is provided by the trait and written only once.
//!
//! ## Short reads
//!
//! `read` and `peek` deliver as many bytes as are available, up to the size
//! of the caller's buffer, and report the count. Fewer bytes than requested
//! is not an error. The `*_exact` helpers and the fixed-width accessors are
//! all-or-nothing: a short delivery becomes [`Error::OutOfRange`] and the
//! cursor stays where it was.
//!
//! ```
//! use bestream_core::{MemoryStream, ReadableStream};
//!
//! let data = [0x00, 0x01, 0x02, 0x03, 0x12, 0x34, 0x56, 0x78];
//! let mut stream = MemoryStream::new(&data);
//!
//! assert_eq!(stream.get_be_u32()?, 0x0001_0203);
//! assert_eq!(stream.peek_be_u16()?, 0x1234);
//! assert_eq!(stream.get_be_u32()?, 0x1234_5678);
//! assert!(stream.is_eof());
//! assert!(stream.get_u8().is_err());
//! # Ok::<(), bestream_core::Error>(())
//! ```

use crate::endian::{swap_endian16, swap_endian32, swap_endian64};
use crate::error::{Error, Result};

/// Sequential, bounds-checked reader over some backing store.
///
/// The trait is object safe, so parsing code can take
/// `&mut dyn ReadableStream` and work the same over memory and files.
pub trait ReadableStream {
    /// Returns true if no more bytes can be read
    fn is_eof(&self) -> bool;

    /// Current absolute read offset
    fn position(&self) -> u64;

    /// Number of bytes remaining before the stream is exhausted
    fn left_bytes(&mut self) -> Result<u64>;

    /// Advances the cursor by `n` bytes without copying anything out.
    fn skip(&mut self, n: u64) -> Result<()>;

    /// Copies up to `buf.len()` bytes into `buf` and advances past them.
    ///
    /// Returns the number of bytes delivered, which is smaller than
    /// `buf.len()` only when the stream ran out of data.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Like [`read`](Self::read), but leaves the cursor where it was.
    ///
    /// Only the first `n` bytes of `buf` are meaningful, where `n` is the
    /// returned count.
    fn peek(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Fills `buf` completely without advancing, or fails with
    /// [`Error::OutOfRange`].
    fn peek_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let n = self.peek(buf)?;
        if n < buf.len() {
            return Err(Error::out_of_range(
                self.position(),
                buf.len() as u64,
                n as u64,
            ));
        }
        Ok(())
    }

    /// Fills `buf` completely and advances past it, or fails with
    /// [`Error::OutOfRange`] leaving the cursor untouched.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.peek_exact(buf)?;
        self.skip(buf.len() as u64)
    }

    /// Reads one byte
    fn get_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Reads a big-endian `u16`
    fn get_be_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(swap_endian16(u16::from_le_bytes(buf)))
    }

    /// Reads a big-endian `u32`
    fn get_be_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(swap_endian32(u32::from_le_bytes(buf)))
    }

    /// Reads a big-endian `u64`
    fn get_be_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(swap_endian64(u64::from_le_bytes(buf)))
    }

    /// Returns the next byte without consuming it
    fn peek_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.peek_exact(&mut buf)?;
        Ok(buf[0])
    }

    /// Returns the next big-endian `u16` without consuming it
    fn peek_be_u16(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.peek_exact(&mut buf)?;
        Ok(swap_endian16(u16::from_le_bytes(buf)))
    }

    /// Returns the next big-endian `u32` without consuming it
    fn peek_be_u32(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.peek_exact(&mut buf)?;
        Ok(swap_endian32(u32::from_le_bytes(buf)))
    }

    /// Returns the next big-endian `u64` without consuming it
    fn peek_be_u64(&mut self) -> Result<u64> {
        let mut buf = [0u8; 8];
        self.peek_exact(&mut buf)?;
        Ok(swap_endian64(u64::from_le_bytes(buf)))
    }
}

impl<S: ReadableStream + ?Sized> ReadableStream for &mut S {
    fn is_eof(&self) -> bool {
        (**self).is_eof()
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn left_bytes(&mut self) -> Result<u64> {
        (**self).left_bytes()
    }

    fn skip(&mut self, n: u64) -> Result<()> {
        (**self).skip(n)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn peek(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).peek(buf)
    }
}

impl<S: ReadableStream + ?Sized> ReadableStream for Box<S> {
    fn is_eof(&self) -> bool {
        (**self).is_eof()
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn left_bytes(&mut self) -> Result<u64> {
        (**self).left_bytes()
    }

    fn skip(&mut self, n: u64) -> Result<()> {
        (**self).skip(n)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn peek(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).peek(buf)
    }
}
