//! Streams over a borrowed in-memory buffer.
//!
//! A [`MemoryStream`] never copies its buffer. It keeps a shared borrow of
//! the bytes plus two absolute offsets: the cursor and an exclusive bound.
//! Narrower streams ("windows") can be cut out of an existing stream to hand
//! a sub-parser exactly the bytes it is allowed to see:
//!
//! ```
//! use bestream_core::{MemoryStream, ReadableStream};
//!
//! // A 2-byte length prefix followed by that many payload bytes, then a trailer.
//! let data = [0x00, 0x03, 0xAA, 0xBB, 0xCC, 0xFF];
//! let mut stream = MemoryStream::new(&data);
//!
//! let len = stream.get_be_u16()? as usize;
//! let mut payload = stream.split_window(len)?;
//! assert_eq!(payload.left_bytes()?, 3);
//! assert!(payload.get_be_u32().is_err());
//!
//! assert_eq!(stream.get_u8()?, 0xFF);
//! # Ok::<(), bestream_core::Error>(())
//! ```

use crate::error::{Error, Result};
use crate::stream::ReadableStream;
use std::fmt;
use tracing::trace;

/// A bounded cursor over a borrowed byte buffer.
///
/// `Clone` produces an independent cursor with the same bound over the same
/// buffer, which is the cheap way to save a position and try something.
#[derive(Clone)]
pub struct MemoryStream<'a> {
    /// The whole backing buffer, shared with every window cut from it
    data: &'a [u8],
    /// Absolute read offset into `data`
    cur: usize,
    /// Absolute exclusive upper limit for `cur`
    bound: usize,
}

impl<'a> MemoryStream<'a> {
    /// Creates a stream over the whole buffer.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            cur: 0,
            bound: data.len(),
        }
    }

    /// Creates a stream over the first `size` bytes of the buffer.
    ///
    /// Fails if the buffer is shorter than `size`.
    pub fn with_size(data: &'a [u8], size: usize) -> Result<Self> {
        if size > data.len() {
            return Err(Error::out_of_range(0, size as u64, data.len() as u64));
        }

        Ok(Self {
            data,
            cur: 0,
            bound: size,
        })
    }

    /// Creates a window of `len` bytes starting at this stream's cursor.
    ///
    /// The window shares the buffer but has its own cursor; reading from it
    /// does not move `self`. Fails if fewer than `len` bytes remain before
    /// this stream's bound, so a window can never see more than its parent.
    pub fn window(&self, len: usize) -> Result<MemoryStream<'a>> {
        let available = self.bound - self.cur;
        if len > available {
            return Err(Error::out_of_range(
                self.cur as u64,
                len as u64,
                available as u64,
            ));
        }

        trace!("Window {}..{} of {}", self.cur, self.cur + len, self.bound);

        Ok(Self {
            data: self.data,
            cur: self.cur,
            bound: self.cur + len,
        })
    }

    /// Creates a window of `len` bytes and moves this stream past it.
    ///
    /// On failure neither stream exists in a modified state.
    pub fn split_window(&mut self, len: usize) -> Result<MemoryStream<'a>> {
        let window = self.window(len)?;
        self.cur += len;
        Ok(window)
    }

    /// Absolute exclusive bound of this stream
    pub fn bound(&self) -> usize {
        self.bound
    }

    /// The entire backing buffer, regardless of cursor and bound
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The bytes between the cursor and the bound
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.cur..self.bound]
    }
}

impl fmt::Debug for MemoryStream<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStream")
            .field("len", &self.data.len())
            .field("cur", &self.cur)
            .field("bound", &self.bound)
            .finish()
    }
}

impl ReadableStream for MemoryStream<'_> {
    fn is_eof(&self) -> bool {
        self.cur == self.bound
    }

    fn position(&self) -> u64 {
        self.cur as u64
    }

    fn left_bytes(&mut self) -> Result<u64> {
        Ok((self.bound - self.cur) as u64)
    }

    fn skip(&mut self, n: u64) -> Result<()> {
        let available = self.bound - self.cur;
        match usize::try_from(n) {
            Ok(n) if n <= available => {
                self.cur += n;
                Ok(())
            }
            _ => Err(Error::out_of_range(self.cur as u64, n, available as u64)),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.peek(buf)?;
        self.cur += n;
        Ok(n)
    }

    fn peek(&mut self, buf: &mut [u8]) -> Result<usize> {
        let src = self.remaining();
        let n = src.len().min(buf.len());
        buf[..n].copy_from_slice(&src[..n]);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: [u8; 8] = [0x00, 0x01, 0x02, 0x03, 0x12, 0x34, 0x56, 0x78];

    #[test]
    fn test_be32_sequence_then_overrun() {
        let mut stream = MemoryStream::new(&SAMPLE);

        assert_eq!(stream.get_be_u32().unwrap(), 0x0001_0203);
        assert_eq!(stream.position(), 4);
        assert_eq!(stream.get_be_u32().unwrap(), 0x1234_5678);
        assert_eq!(stream.position(), 8);

        let err = stream.get_u8().unwrap_err();
        assert!(err.is_out_of_range());
        assert_eq!(stream.position(), 8);
        assert!(stream.is_eof());
    }

    #[test]
    fn test_peek_then_get_be16() {
        let data = [0xAB, 0xCD, 0xEF];
        let mut stream = MemoryStream::new(&data);

        assert_eq!(stream.peek_be_u16().unwrap(), 0xABCD);
        assert_eq!(stream.position(), 0);
        assert_eq!(stream.get_be_u16().unwrap(), 0xABCD);
        assert_eq!(stream.position(), 2);
    }

    #[test]
    fn test_all_widths() {
        let data = [
            0x7F, // u8
            0x01, 0x02, // u16
            0x01, 0x02, 0x03, 0x04, // u32
            0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, // u64
        ];
        let mut stream = MemoryStream::new(&data);

        assert_eq!(stream.peek_u8().unwrap(), 0x7F);
        assert_eq!(stream.get_u8().unwrap(), 0x7F);
        assert_eq!(stream.get_be_u16().unwrap(), 0x0102);
        assert_eq!(stream.peek_be_u32().unwrap(), 0x0102_0304);
        assert_eq!(stream.get_be_u32().unwrap(), 0x0102_0304);
        assert_eq!(stream.peek_be_u64().unwrap(), 0x0102_0304_0506_0708);
        assert_eq!(stream.get_be_u64().unwrap(), 0x0102_0304_0506_0708);
        assert!(stream.is_eof());
    }

    #[test]
    fn test_read_then_peek_never_rewinds() {
        for split in 0..=SAMPLE.len() {
            let mut stream = MemoryStream::new(&SAMPLE);
            let mut head = vec![0u8; split];
            assert_eq!(stream.read(&mut head).unwrap(), split);

            let mut rest = [0u8; 8];
            let n = stream.peek(&mut rest).unwrap();
            assert_eq!(&rest[..n], &SAMPLE[split..]);
            assert_eq!(stream.position(), split as u64);
        }
    }

    #[test]
    fn test_explicit_size_accounting() {
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let size = 6;
        let mut stream = MemoryStream::with_size(&data, size).unwrap();
        assert_eq!(stream.left_bytes().unwrap(), 6);

        let k = 4;
        let mut buf = [0u8; 4];
        stream.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(stream.left_bytes().unwrap(), (size - k) as u64);

        let mut over = [0u8; 3];
        let err = stream.read_exact(&mut over).unwrap_err();
        assert!(err.is_out_of_range());
        assert_eq!(stream.position(), k as u64);
        assert!(stream.skip(3).unwrap_err().is_out_of_range());
        assert_eq!(stream.position(), k as u64);
    }

    #[test]
    fn test_short_read_returns_count() {
        let data = [1u8, 2, 3, 4, 5];
        let mut stream = MemoryStream::with_size(&data, 3).unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(stream.read(&mut buf).unwrap(), 3);
        assert_eq!(&buf[..3], &[1, 2, 3]);
        assert_eq!(stream.read(&mut buf).unwrap(), 0);
        assert!(stream.is_eof());
    }

    #[test]
    fn test_with_size_larger_than_buffer() {
        let data = [0u8; 4];
        let err = MemoryStream::with_size(&data, 5).unwrap_err();
        assert!(err.is_out_of_range());
        assert!(MemoryStream::with_size(&data, 4).is_ok());
        assert!(MemoryStream::with_size(&data, 0).unwrap().is_eof());
    }

    #[test]
    fn test_window_reads_exactly_its_length() {
        let data = [0u8, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        let mut parent = MemoryStream::with_size(&data, 8).unwrap();
        parent.skip(2).unwrap();

        let mut window = parent.window(3).unwrap();
        assert_eq!(window.position(), 2);
        assert_eq!(window.bound(), 5);
        assert_eq!(window.left_bytes().unwrap(), 3);

        let mut buf = [0u8; 3];
        window.read_exact(&mut buf).unwrap();
        assert_eq!(buf, [2, 3, 4]);
        assert!(window.is_eof());
        assert!(window.get_u8().unwrap_err().is_out_of_range());

        // The parent's cursor does not follow the window.
        assert_eq!(parent.position(), 2);
        assert_eq!(parent.get_u8().unwrap(), 2);
    }

    #[test]
    fn test_window_of_all_remaining_bytes() {
        let data = [0u8, 1, 2, 3, 4, 5, 6, 7];
        let mut parent = MemoryStream::new(&data);
        parent.skip(5).unwrap();

        let left = parent.left_bytes().unwrap() as usize;
        let mut window = parent.window(left).unwrap();
        let mut buf = [0u8; 16];
        assert_eq!(window.read(&mut buf).unwrap(), left);
        assert_eq!(&buf[..left], &[5, 6, 7]);
    }

    #[test]
    fn test_window_never_widens() {
        let data = [0u8; 16];
        let parent = MemoryStream::with_size(&data, 8).unwrap();

        // Enough buffer exists, but the parent's bound forbids it.
        let err = parent.window(9).unwrap_err();
        assert!(err.is_out_of_range());

        let mut inner = parent.window(4).unwrap();
        assert!(inner.window(5).is_err());
        inner.skip(1).unwrap();
        let nested = inner.window(3).unwrap();
        assert_eq!(nested.position(), 1);
        assert_eq!(nested.bound(), 4);
        assert!(nested.window(4).is_err());
    }

    #[test]
    fn test_split_window_advances_parent() {
        let data = [0x00, 0x03, 0xAA, 0xBB, 0xCC, 0xFF];
        let mut stream = MemoryStream::new(&data);

        let len = stream.get_be_u16().unwrap() as usize;
        let payload = stream.split_window(len).unwrap();
        assert_eq!(payload.remaining(), &[0xAA, 0xBB, 0xCC]);
        assert_eq!(stream.position(), 5);

        assert!(stream.split_window(2).is_err());
        assert_eq!(stream.position(), 5);
        assert_eq!(stream.get_u8().unwrap(), 0xFF);
    }

    #[test]
    fn test_clone_has_independent_cursor() {
        let mut original = MemoryStream::new(&SAMPLE);
        original.skip(1).unwrap();

        let mut copy = original.clone();
        assert_eq!(copy.position(), 1);
        assert_eq!(copy.bound(), original.bound());

        copy.skip(3).unwrap();
        assert_eq!(original.position(), 1);

        original.get_be_u16().unwrap();
        assert_eq!(copy.position(), 4);
        assert_eq!(copy.get_be_u32().unwrap(), 0x1234_5678);
    }

    #[test]
    fn test_zero_length_requests() {
        let mut stream = MemoryStream::new(&[]);
        assert!(stream.is_eof());
        assert_eq!(stream.read(&mut []).unwrap(), 0);
        stream.skip(0).unwrap();
        assert!(stream.window(0).unwrap().is_eof());
        assert!(stream.skip(1).is_err());
    }

    #[test]
    fn test_data_is_the_whole_buffer() {
        let data = [1u8, 2, 3, 4];
        let stream = MemoryStream::with_size(&data, 2).unwrap();
        assert_eq!(stream.data(), &data);
        assert_eq!(stream.remaining(), &[1, 2]);
    }
}
