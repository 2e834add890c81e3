/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::traits::*;
#[cfg(feature = "mem_dbg")]
use mem_dbg::{MemDbg, MemSize};
use std::io::{self, Read, Seek, SeekFrom, Write};

/// Compute the length of a [`Seek`] leaving its position unchanged.
fn seek_len<S: Seek>(backend: &mut S) -> io::Result<u64> {
    let cur = backend.stream_position()?;
    let len = backend.seek(SeekFrom::End(0))?;
    if cur != len {
        backend.seek(SeekFrom::Start(cur))?;
    }
    Ok(len)
}

/// An adapter from [`Read`], [`Write`], and [`Seek`] to a writable
/// [`Backend`].
///
/// Instances of this struct turn every standard seekable destination of
/// bytes (such as [`std::fs::File`] or [`std::io::Cursor`]) into a backing
/// store for a [`Stream`](crate::impls::Stream). For read-only sources use
/// [`ReadAdapter`], and for non-seekable ones [`StreamingAdapter`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(rec))]
pub struct IoAdapter<B> {
    backend: B,
}

impl<B> IoAdapter<B> {
    /// Create a new IoAdapter
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn into_inner(self) -> B {
        self.backend
    }
}

impl<B: Read + Write + Seek> Backend for IoAdapter<B> {
    #[inline(always)]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.backend.read(buf)
    }

    #[inline(always)]
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.backend.write_all(buf)
    }

    #[inline(always)]
    fn is_writable(&self) -> bool {
        true
    }

    #[inline(always)]
    fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.backend.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    #[inline(always)]
    fn tell(&mut self) -> io::Result<u64> {
        self.backend.stream_position()
    }

    fn size(&mut self) -> io::Result<u64> {
        seek_len(&mut self.backend)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.backend.flush()
    }
}

/// An adapter from [`Read`] and [`Seek`] to a read-only [`Backend`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(rec))]
pub struct ReadAdapter<B> {
    backend: B,
}

impl<B> ReadAdapter<B> {
    /// Create a new ReadAdapter
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn into_inner(self) -> B {
        self.backend
    }
}

impl<B: Read + Seek> Backend for ReadAdapter<B> {
    #[inline(always)]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.backend.read(buf)
    }

    #[inline(always)]
    fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.backend.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    #[inline(always)]
    fn tell(&mut self) -> io::Result<u64> {
        self.backend.stream_position()
    }

    fn size(&mut self) -> io::Result<u64> {
        seek_len(&mut self.backend)
    }
}

/// An adapter from a non-seekable [`Read`] (a pipe, a socket, a decompressor)
/// to a read-only [`Backend`].
///
/// The adapter counts the bytes read so that positions can still be
/// reported, but [`seek`](Backend::seek) and [`size`](Backend::size) fail.
/// As a consequence, streams built on it cannot write, cannot check ahead
/// whether large reads are satisfiable, and cannot push back a terminator
/// that should not be consumed.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(rec))]
pub struct StreamingAdapter<R> {
    backend: R,
    pos: u64,
}

impl<R> StreamingAdapter<R> {
    /// Create a new StreamingAdapter
    pub fn new(backend: R) -> Self {
        Self { backend, pos: 0 }
    }

    pub fn into_inner(self) -> R {
        self.backend
    }
}

impl<R: Read> Backend for StreamingAdapter<R> {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.backend.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }

    fn seek(&mut self, _pos: u64) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "cannot seek a streaming source",
        ))
    }

    #[inline(always)]
    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }

    fn size(&mut self) -> io::Result<u64> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "the size of a streaming source is unknown",
        ))
    }
}
