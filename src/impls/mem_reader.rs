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

/// An implementation of [`Backend`] for a read-only slice of memory.
///
/// Seeking past the end of the slice is allowed, as with files; reads from
/// there return no data.
///
/// # Example
/// ```
/// use structstream::prelude::*;
///
/// let data = [0x4d_u8, 0x4f, 0x44, 0x00];
/// let mut backend = MemReader::new(&data);
///
/// let mut buf = [0; 3];
/// assert_eq!(backend.read(&mut buf).unwrap(), 3);
/// assert_eq!(&buf, b"MOD");
/// assert_eq!(backend.tell().unwrap(), 3);
/// assert_eq!(backend.read(&mut buf).unwrap(), 1);
/// assert_eq!(backend.read(&mut buf).unwrap(), 0);
///
/// // the store cannot be written
/// assert!(backend.write(&[0]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(rec))]
pub struct MemReader<B: AsRef<[u8]>> {
    data: B,
    pos: u64,
}

impl<B: AsRef<[u8]>> MemReader<B> {
    /// Create a new [`MemReader`] from a slice of data
    #[must_use]
    pub fn new(data: B) -> Self {
        Self { data, pos: 0 }
    }

    pub fn into_inner(self) -> B {
        self.data
    }
}

impl<B: AsRef<[u8]>> Backend for MemReader<B> {
    #[inline]
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let data = self.data.as_ref();
        let start = (self.pos as usize).min(data.len());
        let n = buf.len().min(data.len() - start);
        buf[..n].copy_from_slice(&data[start..start + n]);
        self.pos += n as u64;
        Ok(n)
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
