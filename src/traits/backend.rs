/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use std::io;

/// A random-access byte store backing a [`Stream`](crate::impls::Stream).
///
/// This is the only interface between the stream and the outside world:
/// everything else (bit buffers, codecs, validation) is layered above. The
/// methods mirror the operations of a seekable file, but implementors are
/// free to refuse some of them:
///
/// - read-only stores use the default [`write`](Backend::write), which fails
///   with [`io::ErrorKind::Unsupported`], and the default
///   [`is_writable`](Backend::is_writable);
/// - non-seekable (streaming) stores fail on [`seek`](Backend::seek) and
///   [`size`](Backend::size), which makes the stream refuse any write.
///
/// Implementations are provided for memory ([`MemReader`](crate::impls::MemReader),
/// [`MemWriter`](crate::impls::MemWriter)) and for standard I/O
/// ([`IoAdapter`](crate::impls::IoAdapter),
/// [`ReadAdapter`](crate::impls::ReadAdapter),
/// [`StreamingAdapter`](crate::impls::StreamingAdapter)).
pub trait Backend {
    /// Read at most `buf.len()` bytes and advance the cursor, returning the
    /// number of bytes read. Zero means end of store.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Write all of `buf` at the cursor and advance it.
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        let _ = buf;
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "the backing store is read-only",
        ))
    }

    /// Return whether [`write`](Backend::write) is supported. Read-only
    /// stores keep the default.
    fn is_writable(&self) -> bool {
        false
    }

    /// Move the cursor to the absolute byte position `pos`.
    fn seek(&mut self, pos: u64) -> io::Result<()>;

    /// Return the current cursor position.
    fn tell(&mut self) -> io::Result<u64>;

    /// Return the total length of the store in bytes.
    fn size(&mut self) -> io::Result<u64>;

    /// Push buffered writes to the underlying resource.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    /// Read until `buf` is full or the store ends, returning the number of
    /// bytes read.
    fn read_up_to(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }
}

impl<B: Backend + ?Sized> Backend for &mut B {
    #[inline(always)]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        (**self).read(buf)
    }

    #[inline(always)]
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        (**self).write(buf)
    }

    #[inline(always)]
    fn is_writable(&self) -> bool {
        (**self).is_writable()
    }

    #[inline(always)]
    fn seek(&mut self, pos: u64) -> io::Result<()> {
        (**self).seek(pos)
    }

    #[inline(always)]
    fn tell(&mut self) -> io::Result<u64> {
        (**self).tell()
    }

    #[inline(always)]
    fn size(&mut self) -> io::Result<u64> {
        (**self).size()
    }

    #[inline(always)]
    fn flush(&mut self) -> io::Result<()> {
        (**self).flush()
    }
}
