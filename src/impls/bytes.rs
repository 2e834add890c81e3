/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Byte arrays: fixed-length, until end of store, and terminator-delimited.

use super::Stream;
use crate::error::StreamError;
use crate::traits::*;

impl<B: Backend> Stream<B> {
    /// Read exactly `n` bytes, without touching the bit accumulators.
    pub(super) fn read_bytes_not_aligned(&mut self, n: usize) -> Result<Vec<u8>, StreamError> {
        // When a large number of bytes is requested, check first that there
        // is indeed enough data left, so that we do not read a large amount
        // of data only to notice afterwards that it is not long enough
        if n as u64 >= self.prefetch_threshold {
            if let Ok(size) = self.backend.size() {
                let available = size.saturating_sub(self.backend.tell()?);
                log::trace!("large read of {} bytes, {} available", n, available);
                if n as u64 > available {
                    return Err(StreamError::Eof {
                        requested: n as u64,
                        available,
                    });
                }
            }
        }

        let mut buf = vec![0; n];
        let read = self.backend.read_up_to(&mut buf)?;
        if read < n {
            return Err(StreamError::Eof {
                requested: n as u64,
                available: read as u64,
            });
        }
        Ok(buf)
    }

    /// Read exactly `n` bytes.
    ///
    /// Fails with [`StreamError::Eof`], reporting the number of bytes
    /// requested and available, if the store ends earlier; in that case the
    /// available bytes are consumed.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, StreamError> {
        self.align_for_read()?;
        self.read_bytes_not_aligned(n)
    }

    /// Read all bytes up to the end of the store. Never fails because of
    /// short data: at the end of the store, the result is empty.
    pub fn read_bytes_full(&mut self) -> Result<Vec<u8>, StreamError> {
        self.align_for_read()?;
        let mut res = Vec::new();
        let mut chunk = [0_u8; 4096];
        loop {
            let read = self.backend.read_up_to(&mut chunk)?;
            res.extend_from_slice(&chunk[..read]);
            if read < chunk.len() {
                return Ok(res);
            }
        }
    }

    /// Read bytes until `term` is found.
    ///
    /// If the terminator is found, it is part of the result only if
    /// `include_term` is true, and the stream is positioned after it only if
    /// `consume_term` is true (on a non-seekable store the terminator is
    /// always consumed, and leaving it fails).
    ///
    /// If the store ends first, the bytes read so far are returned, unless
    /// `eos_error` is true, in which case the method fails with
    /// [`StreamError::MissingTerminator`].
    pub fn read_bytes_term(
        &mut self,
        term: u8,
        include_term: bool,
        consume_term: bool,
        eos_error: bool,
    ) -> Result<Vec<u8>, StreamError> {
        self.align_for_read()?;
        let mut res = Vec::new();
        let mut c = [0_u8];
        loop {
            if self.backend.read_up_to(&mut c)? == 0 {
                if eos_error {
                    return Err(StreamError::MissingTerminator { term });
                }
                return Ok(res);
            }
            if c[0] == term {
                if include_term {
                    res.push(term);
                }
                if !consume_term {
                    let pos = self.backend.tell()?;
                    self.backend.seek(pos - 1)?;
                }
                return Ok(res);
            }
            res.push(c[0]);
        }
    }

    /// Read `expected.len()` bytes and check that they are equal to
    /// `expected`.
    ///
    /// Fails with [`StreamError::ContentMismatch`] carrying both byte
    /// sequences otherwise; a short read is a mismatch whose actual bytes are
    /// shorter than the expected ones.
    pub fn ensure_fixed_contents(&mut self, expected: &[u8]) -> Result<Vec<u8>, StreamError> {
        self.align_for_read()?;
        let mut actual = vec![0; expected.len()];
        let read = self.backend.read_up_to(&mut actual)?;
        actual.truncate(read);
        if actual != expected {
            return Err(StreamError::ContentMismatch {
                expected: expected.to_vec(),
                actual,
            });
        }
        Ok(actual)
    }

    /// Write `buf` without touching the bit accumulators.
    pub(super) fn write_bytes_not_aligned(&mut self, buf: &[u8]) -> Result<(), StreamError> {
        let pos = self.backend.tell()?;
        self.ensure_bytes_left_to_write(buf.len() as u64, pos)?;
        self.backend.write(buf)?;
        Ok(())
    }

    /// Write `buf`, after flushing pending write bits.
    ///
    /// Fails with [`StreamError::WriteCapacity`] if the store is too short,
    /// and with [`StreamError::NotSeekable`] if its size is unknown.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<(), StreamError> {
        self.write_align_to_byte()?;
        self.write_bytes_not_aligned(buf)
    }

    /// Write `buf` in a field of exactly `size` bytes.
    ///
    /// If `buf` is shorter than `size`, it is followed by `term` and then by
    /// as many `pad_byte` as needed to fill the field. If it is longer,
    /// nothing is written and the method fails with
    /// [`StreamError::LimitExceeded`].
    pub fn write_bytes_limit(
        &mut self,
        buf: &[u8],
        size: usize,
        term: u8,
        pad_byte: u8,
    ) -> Result<(), StreamError> {
        let n = buf.len();
        if n > size {
            return Err(StreamError::LimitExceeded { size, given: n });
        }
        if n == size {
            return self.write_bytes(buf);
        }
        let mut field = Vec::with_capacity(size);
        field.extend_from_slice(buf);
        field.push(term);
        field.resize(size, pad_byte);
        self.write_bytes(&field)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_read_bytes_eof() {
        let mut io = Stream::from_bytes(b"abcd");
        assert_eq!(io.read_bytes(4).unwrap(), b"abcd");
        let mut io = Stream::from_bytes(b"abcd");
        match io.read_bytes(5) {
            Err(StreamError::Eof {
                requested,
                available,
            }) => assert_eq!((requested, available), (5, 4)),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_large_read_precheck() {
        let mut io = Stream::from_bytes(vec![0_u8; 16]);
        io.set_prefetch_threshold(8);
        io.seek(10).unwrap();
        match io.read_bytes(8) {
            Err(StreamError::Eof {
                requested,
                available,
            }) => assert_eq!((requested, available), (8, 6)),
            other => panic!("unexpected result {:?}", other),
        }
        // the check happens before reading anything
        assert_eq!(io.pos().unwrap(), 10);
    }

    #[test]
    fn test_read_bytes_full() {
        let mut io = Stream::from_bytes(b"abcdef");
        io.read_bytes(2).unwrap();
        assert_eq!(io.read_bytes_full().unwrap(), b"cdef");
        assert!(io.read_bytes_full().unwrap().is_empty());

        let big: Vec<u8> = (0..10_000).map(|i| i as u8).collect();
        let mut io = Stream::from_bytes(&big);
        assert_eq!(io.read_bytes_full().unwrap(), big);
    }

    #[test]
    fn test_read_bytes_term() {
        let mut io = Stream::from_bytes(b"abc\x00def");
        assert_eq!(io.read_bytes_term(0, false, true, true).unwrap(), b"abc");
        assert_eq!(io.pos().unwrap(), 4);

        let mut io = Stream::from_bytes(b"abc\x00def");
        assert_eq!(io.read_bytes_term(0, true, true, true).unwrap(), b"abc\x00");
        assert_eq!(io.pos().unwrap(), 4);

        let mut io = Stream::from_bytes(b"abc\x00def");
        assert_eq!(io.read_bytes_term(0, false, false, true).unwrap(), b"abc");
        assert_eq!(io.pos().unwrap(), 3);
        assert_eq!(io.read_u1().unwrap(), 0);
    }

    #[test]
    fn test_read_bytes_term_missing() {
        let mut io = Stream::from_bytes(b"abc");
        assert_eq!(io.read_bytes_term(0, false, true, false).unwrap(), b"abc");
        let mut io = Stream::from_bytes(b"abc");
        assert!(matches!(
            io.read_bytes_term(0, false, true, true),
            Err(StreamError::MissingTerminator { term: 0 })
        ));
    }

    #[test]
    fn test_ensure_fixed_contents() {
        let mut io = Stream::from_bytes(b"MOD\x00rest");
        assert_eq!(io.ensure_fixed_contents(b"MOD\x00").unwrap(), b"MOD\x00");
        match io.ensure_fixed_contents(b"abcd") {
            Err(StreamError::ContentMismatch { expected, actual }) => {
                assert_eq!(expected, b"abcd");
                assert_eq!(actual, b"rest");
            }
            other => panic!("unexpected result {:?}", other),
        }
        let mut io = Stream::from_bytes(b"MO");
        match io.ensure_fixed_contents(b"MOD\x00") {
            Err(StreamError::ContentMismatch { actual, .. }) => assert_eq!(actual, b"MO"),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_write_bytes_limit() {
        let mut io = Stream::with_size(5);
        io.write_bytes_limit(b"ab", 5, 0, 0xff).unwrap();
        assert_eq!(io.to_byte_array().unwrap(), b"ab\x00\xff\xff");

        let mut io = Stream::with_size(3);
        io.write_bytes_limit(b"abc", 3, 0, 0xff).unwrap();
        assert_eq!(io.to_byte_array().unwrap(), b"abc");

        let mut io = Stream::with_size(3);
        io.write_bytes_limit(b"ab", 3, 0, 0xff).unwrap();
        assert_eq!(io.to_byte_array().unwrap(), b"ab\x00");

        let mut io = Stream::with_size(8);
        assert!(matches!(
            io.write_bytes_limit(b"abcdef", 5, 0, 0),
            Err(StreamError::LimitExceeded { size: 5, given: 6 })
        ));
        assert_eq!(io.pos().unwrap(), 0);
    }

    #[test]
    fn test_read_after_write_bits_flushes() {
        let mut io = Stream::with_size(2);
        io.write_bits_int_be(4, 0xf).unwrap();
        // the pending nibble is written before reading
        assert_eq!(io.read_u1().unwrap(), 0);
        assert_eq!(io.to_byte_array().unwrap(), [0xf0, 0]);
    }
}
