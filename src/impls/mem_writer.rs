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
use std::io;

/// An implementation of [`Backend`] for a mutable slice of memory.
///
/// The store has a fixed size: writes past its end fail with
/// [`io::ErrorKind::WriteZero`]. Streams check their capacity before
/// writing, so the error is normally reported earlier as
/// [`StreamError::WriteCapacity`](crate::error::StreamError::WriteCapacity).
///
/// # Example
/// ```
/// use structstream::prelude::*;
///
/// let mut backend = MemWriter::new(vec![0_u8; 4]);
///
/// assert!(backend.write(&[1, 2]).is_ok());
/// assert_eq!(backend.tell().unwrap(), 2);
///
/// // we can write and read back!
/// assert!(backend.seek(0).is_ok());
/// let mut buf = [0; 4];
/// assert_eq!(backend.read(&mut buf).unwrap(), 4);
/// assert_eq!(buf, [1, 2, 0, 0]);
///
/// // but not past the end
/// assert!(backend.write(&[3]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(rec))]
pub struct MemWriter<B: AsRef<[u8]> + AsMut<[u8]>> {
    data: B,
    pos: u64,
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> MemWriter<B> {
    /// Create a new [`MemWriter`] writing over `data`; its length is the
    /// capacity of the store.
    #[must_use]
    pub fn new(data: B) -> Self {
        Self { data, pos: 0 }
    }

    pub fn len(&self) -> usize {
        self.data.as_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_inner(self) -> B {
        self.data
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> Backend for MemWriter<B> {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data.as_ref();
        let start = (self.pos as usize).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
    }

    #[inline]
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        let data = self.data.as_mut();
        let start = self.pos as usize;
        let end = start.checked_add(buf.len()).unwrap_or(usize::MAX);
        match data.get_mut(start..end) {
            Some(dst) => {
                dst.copy_from_slice(buf);
                self.pos += buf.len() as u64;
                Ok(())
            }
            None => Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "Cannot write past the end of the underlying memory",
            )),
        }
    }

    #[inline(always)]
    fn is_writable(&self) -> bool {
        true
    }

    #[inline(always)]
    fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.pos = pos;
        Ok(())
    }

    #[inline(always)]
    fn tell(&mut self) -> io::Result<u64> {
        Ok(self.pos)
    }

    #[inline(always)]
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.data.as_ref().len() as u64)
    }
}
