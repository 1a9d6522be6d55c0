//! Streams over an open file handle.
//!
//! [`FileStream`] reads straight from the OS handle with no buffering of its
//! own. Peeking is done by reading and seeking back, and the number of bytes
//! left is probed by seeking to the end and back. Reads that hit the end of
//! the file return a short count instead of failing.

use crate::error::{Error, Result};
use crate::stream::ReadableStream;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// A read-only stream over a file.
///
/// The handle is owned exclusively and closed when the stream is dropped.
#[derive(Debug)]
pub struct FileStream {
    file: File,
    path: PathBuf,
    /// Absolute offset the handle is positioned at between calls
    pos: u64,
}

impl FileStream {
    /// Opens `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::file_open(path, e))?;
        debug!("Opened {}", path.display());

        Ok(Self {
            file,
            path: path.to_path_buf(),
            pos: 0,
        })
    }

    /// Wraps an already open handle, starting at its current position.
    ///
    /// `path` is only used for diagnostics. If the handle's position can't be
    /// queried the returned [`Error::Seek`] carries offset 0, since the real
    /// offset is unknown.
    pub fn from_file(mut file: File, path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let pos = file.stream_position().map_err(|e| {
            debug!("Cannot query position of {}: {}", path.display(), e);
            Error::seek(0, e)
        })?;

        Ok(Self { file, path, pos })
    }

    /// Path the stream was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads until `buf` is full or the file ends, without touching `pos`.
    ///
    /// On error the handle is put back at `pos`.
    fn fill(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;

        while filled < buf.len() {
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.restore()?;
                    return Err(Error::io(self.pos, e));
                }
            }
        }

        Ok(filled)
    }

    /// Moves the handle back to the tracked position.
    fn restore(&mut self) -> Result<()> {
        self.file
            .seek(SeekFrom::Start(self.pos))
            .map_err(|e| Error::seek(self.pos, e))?;
        Ok(())
    }
}

impl ReadableStream for FileStream {
    fn is_eof(&self) -> bool {
        // A handle whose length can't be queried can't deliver bytes either.
        match self.file.metadata() {
            Ok(meta) => self.pos >= meta.len(),
            Err(e) => {
                trace!("{}: metadata unavailable, reporting EOF: {}", self.path.display(), e);
                true
            }
        }
    }

    fn position(&self) -> u64 {
        self.pos
    }

    fn left_bytes(&mut self) -> Result<u64> {
        let end = self
            .file
            .seek(SeekFrom::End(0))
            .map_err(|e| Error::seek(self.pos, e))?;
        self.restore()?;

        let left = end.saturating_sub(self.pos);
        trace!("{}: {} of {} bytes left", self.path.display(), left, end);
        Ok(left)
    }

    fn skip(&mut self, n: u64) -> Result<()> {
        let distance = i64::try_from(n).map_err(|_| {
            Error::seek(
                self.pos,
                std::io::Error::new(ErrorKind::InvalidInput, "skip distance too large"),
            )
        })?;

        self.pos = self
            .file
            .seek(SeekFrom::Current(distance))
            .map_err(|e| Error::seek(self.pos, e))?;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.fill(buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn peek(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.fill(buf)?;
        self.restore()?;
        Ok(n)
    }
}
