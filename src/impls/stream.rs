/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use super::bits::BitBuffer;
use super::write_back::{ChildStream, WriteBackState};
use super::{IoAdapter, MemReader, MemWriter, ReadAdapter, StreamingAdapter};
use crate::error::StreamError;
use crate::traits::*;
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, Write};
use std::path::Path;

/// Requests of at least this many bytes are checked against the remaining
/// length of seekable stores before reading.
pub const DEFAULT_PREFETCH_THRESHOLD: u64 = 8 * 1024 * 1024;

/// The in-memory store used by child streams of the write-back graph.
pub type MemStream = Stream<MemWriter<Vec<u8>>>;

/// A bit-exact binary stream over a [`Backend`].
///
/// A stream layers over the byte-addressable store:
///
/// - two bit accumulators (one for reading, one for writing) holding the
///   zero to seven bits of a partially consumed or produced byte, see
///   [`read_bits`](Stream::read_bits) and [`write_bits`](Stream::write_bits);
/// - a numeric codec, see [`read_num`](Stream::read_num);
/// - a byte-sequence codec, see [`read_bytes`](Stream::read_bytes);
/// - the write-back graph of child streams, see
///   [`add_child_stream`](Stream::add_child_stream).
///
/// All byte-aligned operations first reset the bit accumulator of their
/// direction: reads discard unread bits, writes flush pending bits padded to
/// a full byte.
///
/// The size of the store is captured at construction and used to check
/// writes; a store whose size cannot be computed (a non-seekable source) can
/// only be read.
///
/// Dropping a stream flushes pending write bits, ignoring errors; use
/// [`close`](Stream::close) to observe them.
///
/// # Example
/// ```
/// use structstream::prelude::*;
///
/// let mut io = Stream::with_size(4);
/// io.write_bits_int_be(3, 0b101).unwrap();
/// io.write_bits_int_be(5, 0b00011).unwrap();
/// io.write_u2le(0x1234).unwrap();
/// assert_eq!(io.pos().unwrap(), 3);
/// assert_eq!(io.to_byte_array().unwrap(), [0b1010_0011, 0x34, 0x12, 0]);
/// ```
#[derive(Debug)]
pub struct Stream<B: Backend> {
    pub(super) backend: B,
    /// The size of the store at construction time; `None` if unknown.
    pub(super) size: Option<u64>,
    pub(super) read_buf: BitBuffer,
    pub(super) write_buf: BitBuffer,
    /// Whether the last bit-level operation was a write.
    pub(super) bits_write_mode: bool,
    pub(super) prefetch_threshold: u64,
    pub(super) children: Vec<ChildStream>,
    pub(super) state: WriteBackState,
}

impl<B: Backend> Stream<B> {
    /// Create a new stream over a backend positioned at its start.
    pub fn new(mut backend: B) -> Self {
        // a failure here just means that the store is not seekable, which
        // is fine for reading
        let size = backend.size().ok();
        Self {
            backend,
            size,
            read_buf: BitBuffer::Aligned,
            write_buf: BitBuffer::Aligned,
            bits_write_mode: false,
            prefetch_threshold: DEFAULT_PREFETCH_THRESHOLD,
            children: Vec::new(),
            state: WriteBackState::Accumulating,
        }
    }

    /// Override [`DEFAULT_PREFETCH_THRESHOLD`].
    pub fn set_prefetch_threshold(&mut self, threshold: u64) {
        self.prefetch_threshold = threshold;
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Access the backend directly. Bypassing the stream while bits are
    /// pending leaves the accumulators out of sync with the store.
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Return whether the stream is at the end of the store.
    ///
    /// Unread bits of a partially read byte count as data.
    pub fn is_eof(&mut self) -> Result<bool, StreamError> {
        if !self.bits_write_mode && self.read_buf.left() > 0 {
            return Ok(false);
        }
        Ok(self.backend.tell()? >= self.backend.size()?)
    }

    /// Move to the absolute byte position `pos`, after flushing pending
    /// write bits or discarding unread bits.
    pub fn seek(&mut self, pos: u64) -> Result<(), StreamError> {
        if self.bits_write_mode {
            self.write_align_to_byte()?;
        } else {
            self.align_to_byte();
        }
        self.backend.seek(pos)?;
        Ok(())
    }

    /// Return the current byte position.
    ///
    /// Pending write bits occupy a byte that is not yet in the store, and
    /// are counted as a full byte, so that positions during writing match
    /// those of the corresponding reads.
    pub fn pos(&mut self) -> Result<u64, StreamError> {
        let pending = self.bits_write_mode && self.write_buf.left() > 0;
        Ok(self.backend.tell()? + pending as u64)
    }

    /// Return the current length of the store.
    pub fn size(&mut self) -> Result<u64, StreamError> {
        Ok(self.backend.size()?)
    }

    /// Return the whole content of the store, leaving the position unchanged.
    pub fn to_byte_array(&mut self) -> Result<Vec<u8>, StreamError> {
        let pos = self.pos()?;
        self.seek(0)?;
        let res = self.read_bytes_full()?;
        self.seek(pos)?;
        Ok(res)
    }

    /// Flush pending write bits and the backend, and release the store.
    ///
    /// The bit buffer is cleared even if flushing it fails, and the backend
    /// is released in all cases.
    pub fn close(mut self) -> Result<(), StreamError> {
        let aligned = if self.bits_write_mode {
            self.write_align_to_byte()
        } else {
            Ok(())
        };
        let flushed = self.backend.flush();
        aligned?;
        flushed?;
        Ok(())
    }

    /// Check that `n` bytes can be written at `pos`.
    ///
    /// Read-only stores fail here even if `n` is zero, so that bit writes
    /// that fit in the pending byte are refused as well.
    pub(super) fn ensure_bytes_left_to_write(&self, n: u64, pos: u64) -> Result<(), StreamError> {
        let size = self.size.ok_or(StreamError::NotSeekable)?;
        if !self.backend.is_writable() {
            return Err(StreamError::Io(io::Error::new(
                io::ErrorKind::Unsupported,
                "the backing store is read-only",
            )));
        }
        let left = size.saturating_sub(pos);
        if n > left {
            return Err(StreamError::WriteCapacity {
                size,
                requested: n,
                left,
            });
        }
        Ok(())
    }
}

impl<B: Backend> core::ops::Drop for Stream<B> {
    fn drop(&mut self) {
        if self.bits_write_mode && self.write_buf.left() > 0 {
            // During a drop we can't save anything if it goes bad
            if let Err(e) = self.write_align_to_byte() {
                log::warn!("Could not flush pending bits while dropping a stream: {}", e);
            }
        }
    }
}

impl<D: AsRef<[u8]>> Stream<MemReader<D>> {
    /// Create a read-only stream over a buffer.
    pub fn from_bytes(data: D) -> Self {
        Self::new(MemReader::new(data))
    }
}

impl Stream<MemWriter<Vec<u8>>> {
    /// Create a zero-filled in-memory stream of `size` bytes, readable and
    /// writable.
    pub fn with_size(size: usize) -> Self {
        Self::new(MemWriter::new(vec![0; size]))
    }

    /// Create a readable and writable in-memory stream over `data`.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self::new(MemWriter::new(data))
    }
}

impl<B: Read + Write + Seek> Stream<IoAdapter<B>> {
    /// Create a readable and writable stream over standard I/O.
    pub fn from_io(backend: B) -> Self {
        Self::new(IoAdapter::new(backend))
    }
}

impl<R: Read> Stream<StreamingAdapter<R>> {
    /// Create a read-only stream over a non-seekable source.
    pub fn from_reader(reader: R) -> Self {
        Self::new(StreamingAdapter::new(reader))
    }
}

impl Stream<ReadAdapter<File>> {
    /// Open the file at `path` for reading.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        Ok(Self::new(ReadAdapter::new(File::open(path)?)))
    }
}

impl Stream<IoAdapter<File>> {
    /// Create (or truncate) the file at `path` and size it to `size` bytes,
    /// which is the capacity of the stream.
    ///
    /// The file is not locked, and an existing file is overwritten; use
    /// [`create_new`](Stream::create_new) to refuse existing files.
    pub fn create(path: impl AsRef<Path>, size: u64) -> Result<Self, StreamError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Self::sized(file, size)
    }

    /// Like [`create`](Stream::create), but fails with an I/O error of kind
    /// [`AlreadyExists`](io::ErrorKind::AlreadyExists) if `path` exists.
    ///
    /// The existence check and the creation are atomic. As with
    /// [`create`](Stream::create), the file is not locked afterwards.
    pub fn create_new(path: impl AsRef<Path>, size: u64) -> Result<Self, StreamError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;
        Self::sized(file, size)
    }

    fn sized(file: File, size: u64) -> Result<Self, StreamError> {
        file.set_len(size)?;
        Ok(Self::new(IoAdapter::new(file)))
    }
}
