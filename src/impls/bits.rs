/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Unaligned bit fields.
//!
//! Bit fields are read and written through a one-byte accumulator per
//! direction. Whole bytes are moved between the accumulator and the store
//! only when needed, so a sequence of bit fields whose widths add up to a
//! multiple of eight bits leaves the stream byte-aligned.
//!
//! In big-endian order bits are consumed MSB first: new bytes enter at the
//! low end of the accumulator and the oldest bits leave from the top. In
//! little-endian order bits are consumed LSB first: new bytes enter with
//! increasing significance and bits leave from the low end.
//!
//! The two orders cannot be mixed within a byte. Requesting a field in one
//! order while bits of the other are pending fails with
//! [`StreamError::MixedBitOrder`]; call
//! [`align_to_byte`](Stream::align_to_byte) or
//! [`write_align_to_byte`](Stream::write_align_to_byte) first.

use super::Stream;
use crate::error::StreamError;
use crate::traits::*;
#[cfg(feature = "mem_dbg")]
use mem_dbg::{MemDbg, MemSize};

/// The state of a bit accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(flat))]
pub enum BitBuffer {
    /// No bits pending: the stream is byte-aligned in this direction.
    #[default]
    Aligned,
    /// Between one and seven bits are pending, in the lowest bits of
    /// `value`.
    Pending { order: ByteOrder, left: u8, value: u8 },
}

impl BitBuffer {
    #[inline(always)]
    fn new(order: ByteOrder, left: u32, value: u128) -> Self {
        debug_assert!(left < 8);
        if left == 0 {
            BitBuffer::Aligned
        } else {
            BitBuffer::Pending {
                order,
                left: left as u8,
                value: (value & mask(left)) as u8,
            }
        }
    }

    /// Number of pending bits.
    #[inline(always)]
    pub fn left(&self) -> u32 {
        match self {
            BitBuffer::Aligned => 0,
            BitBuffer::Pending { left, .. } => *left as u32,
        }
    }

    #[inline(always)]
    fn value(&self) -> u128 {
        match self {
            BitBuffer::Aligned => 0,
            BitBuffer::Pending { value, .. } => *value as u128,
        }
    }

    /// Fail if bits of an order other than `requested` are pending.
    #[inline(always)]
    fn check_order(&self, requested: ByteOrder) -> Result<(), StreamError> {
        match self {
            BitBuffer::Pending { order, .. } if *order != requested => {
                Err(StreamError::MixedBitOrder {
                    pending: *order,
                    requested,
                })
            }
            _ => Ok(()),
        }
    }
}

#[inline(always)]
fn mask(n: u32) -> u128 {
    (1_u128 << n) - 1
}

#[inline(always)]
fn check_width(n: usize) -> Result<u32, StreamError> {
    if n > 64 {
        return Err(StreamError::TooManyBits { n });
    }
    Ok(n as u32)
}

impl<B: Backend> Stream<B> {
    /// Discard unread bits of a partially read byte.
    pub fn align_to_byte(&mut self) {
        self.read_buf = BitBuffer::Aligned;
    }

    /// Reset the stream to byte alignment before a byte-aligned read: unread
    /// bits are discarded, and bits still pending from writing are flushed.
    pub(super) fn align_for_read(&mut self) -> Result<(), StreamError> {
        if self.bits_write_mode {
            self.bits_write_mode = false;
            self.write_align_to_byte()?;
        }
        self.align_to_byte();
        Ok(())
    }

    /// Read an `n`-bit unsigned integer (`n` ≤ 64) in the given bit order.
    ///
    /// Pending bits are consumed first, and whole bytes are read from the
    /// store only as needed. On error the accumulator is left unchanged.
    pub fn read_bits(&mut self, n: usize, order: ByteOrder) -> Result<u64, StreamError> {
        let n = check_width(n)?;
        if self.bits_write_mode {
            self.bits_write_mode = false;
            self.write_align_to_byte()?;
        }
        self.read_buf.check_order(order)?;

        let bits_left = self.read_buf.left() as i32;
        let bits = self.read_buf.value();
        let bits_needed = n as i32 - bits_left;
        let new_left = (-bits_needed).rem_euclid(8) as u32;

        let res = match order {
            ByteOrder::Big => {
                if bits_needed > 0 {
                    let n_bytes = (bits_needed as u32).div_ceil(8) as usize;
                    let bytes = self.read_bytes_not_aligned(n_bytes)?;
                    let new_bits = bytes.iter().fold(0_u128, |acc, &b| acc << 8 | b as u128);
                    self.read_buf = BitBuffer::new(order, new_left, new_bits);
                    new_bits >> new_left | bits << bits_needed
                } else {
                    // shift unneeded bits out
                    self.read_buf = BitBuffer::new(order, new_left, bits);
                    bits >> -bits_needed
                }
            }
            ByteOrder::Little => {
                if bits_needed > 0 {
                    let n_bytes = (bits_needed as u32).div_ceil(8) as usize;
                    let bytes = self.read_bytes_not_aligned(n_bytes)?;
                    let new_bits = bytes
                        .iter()
                        .enumerate()
                        .fold(0_u128, |acc, (i, &b)| acc | (b as u128) << (i * 8));
                    self.read_buf = BitBuffer::new(order, new_left, new_bits >> bits_needed);
                    new_bits << bits_left | bits
                } else {
                    self.read_buf = BitBuffer::new(order, new_left, bits >> n);
                    bits
                }
            }
        };

        Ok((res & mask(n)) as u64)
    }

    /// Read an `n`-bit unsigned integer MSB first.
    #[inline(always)]
    pub fn read_bits_int_be(&mut self, n: usize) -> Result<u64, StreamError> {
        self.read_bits(n, ByteOrder::Big)
    }

    /// Read an `n`-bit unsigned integer LSB first.
    #[inline(always)]
    pub fn read_bits_int_le(&mut self, n: usize) -> Result<u64, StreamError> {
        self.read_bits(n, ByteOrder::Little)
    }

    /// Read an `n`-bit unsigned integer with statically selected bit order.
    #[inline(always)]
    pub fn read_bits_int<E: Endianness>(&mut self, n: usize) -> Result<u64, StreamError> {
        self.read_bits(n, E::ORDER)
    }

    /// Write the lowest `n` bits of `value` (`n` ≤ 64) in the given bit
    /// order.
    ///
    /// Each time eight bits are accumulated a byte is written to the store;
    /// the remaining bits stay pending until the next bit field, a
    /// byte-aligned write, [`write_align_to_byte`](Stream::write_align_to_byte),
    /// [`seek`](Stream::seek) or [`close`](Stream::close).
    ///
    /// Higher bits of `value` are ignored, unless the `checks` feature is
    /// enabled, in which case they must be zero.
    pub fn write_bits(
        &mut self,
        n: usize,
        value: u64,
        order: ByteOrder,
    ) -> Result<(), StreamError> {
        let n = check_width(n)?;
        #[cfg(feature = "checks")]
        if (value as u128) & !mask(n) != 0 {
            return Err(StreamError::ValueTooWide {
                value,
                n: n as usize,
            });
        }
        if !self.bits_write_mode {
            self.bits_write_mode = true;
            self.align_to_byte();
        }
        self.write_buf.check_order(order)?;

        let val = value as u128 & mask(n);
        let old_left = self.write_buf.left();
        let bits = self.write_buf.value();
        let bits_to_write = old_left + n;
        let bytes_needed = bits_to_write.div_ceil(8) as u64;
        // pos() already counts the pending byte
        let pos = self.pos()?;
        self.ensure_bytes_left_to_write(bytes_needed - (old_left > 0) as u64, pos)?;

        let bytes_to_write = (bits_to_write / 8) as usize;
        let new_left = bits_to_write % 8;

        if bytes_to_write == 0 {
            self.write_buf = match order {
                ByteOrder::Big => BitBuffer::new(order, new_left, bits << n | val),
                ByteOrder::Little => BitBuffer::new(order, new_left, bits | val << old_left),
            };
            return Ok(());
        }

        let mut buf = vec![0_u8; bytes_to_write];
        match order {
            ByteOrder::Big => {
                let mut out = val >> new_left | bits << (n - new_left);
                self.write_buf = BitBuffer::new(order, new_left, val);
                for byte in buf.iter_mut().rev() {
                    *byte = out as u8;
                    out >>= 8;
                }
            }
            ByteOrder::Little => {
                let mut out = val << old_left | bits;
                self.write_buf = BitBuffer::new(order, new_left, val >> (n - new_left));
                for byte in buf.iter_mut() {
                    *byte = out as u8;
                    out >>= 8;
                }
            }
        }
        self.write_bytes_not_aligned(&buf)
    }

    /// Write the lowest `n` bits of `value` MSB first.
    #[inline(always)]
    pub fn write_bits_int_be(&mut self, n: usize, value: u64) -> Result<(), StreamError> {
        self.write_bits(n, value, ByteOrder::Big)
    }

    /// Write the lowest `n` bits of `value` LSB first.
    #[inline(always)]
    pub fn write_bits_int_le(&mut self, n: usize, value: u64) -> Result<(), StreamError> {
        self.write_bits(n, value, ByteOrder::Little)
    }

    /// Write the lowest `n` bits of `value` with statically selected bit
    /// order.
    #[inline(always)]
    pub fn write_bits_int<E: Endianness>(
        &mut self,
        n: usize,
        value: u64,
    ) -> Result<(), StreamError> {
        self.write_bits(n, value, E::ORDER)
    }

    /// Pad pending write bits to a full byte and write it.
    ///
    /// Big-endian bits are padded with zeros on the right (they end up in
    /// the high bits of the byte), little-endian bits on the left.
    ///
    /// The accumulator is cleared before writing, so that if the write fails
    /// the error is reported once and the stream remains usable (e.g., it
    /// can still [`seek`](Stream::seek)).
    pub fn write_align_to_byte(&mut self) -> Result<(), StreamError> {
        if let BitBuffer::Pending { order, left, value } = self.write_buf {
            let byte = match order {
                ByteOrder::Big => value << (8 - left),
                ByteOrder::Little => value,
            };
            self.write_buf = BitBuffer::Aligned;
            self.write_bytes_not_aligned(&[byte])?;
        }
        Ok(())
    }
}
