/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Fixed-width integers and floats.
//!
//! There is a single generic codec, [`Stream::read_num`] and
//! [`Stream::write_num`], parameterized by a [`Primitive`] type and a
//! [`ByteOrder`]. The named methods (`read_u4le`, `write_f8be`, ...) are thin
//! wrappers generated by a macro, and [`NumType`](crate::dispatch::NumType)
//! provides the same codec when the type is known only at runtime.
//!
//! All methods byte-align the stream first: pending read bits are
//! discarded, pending write bits are flushed.

use super::Stream;
use crate::dispatch::Value;
use crate::error::StreamError;
use crate::traits::*;
use core::fmt::Debug;
#[cfg(feature = "mem_dbg")]
use mem_dbg::{MemDbg, MemSize};
use num_traits::{NumCast, ToPrimitive};

/// The kind of a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(flat))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumKind {
    /// Unsigned integer.
    Unsigned,
    /// Two's-complement signed integer.
    Signed,
    /// IEEE 754 binary floating point.
    Float,
}

/// A numeric type that can be read from and written to a stream.
///
/// This trait is sealed in practice: it is implemented for `u8`–`u64`,
/// `i8`–`i64`, `f32` and `f64`, which are all the types supported by format
/// descriptions.
pub trait Primitive:
    NumCast + ToPrimitive + Copy + PartialEq + PartialOrd + Debug + Into<Value>
{
    const KIND: NumKind;
    /// Width in bytes.
    const WIDTH: usize;
    /// The byte representation of the type.
    type Raw: AsRef<[u8]> + AsMut<[u8]> + Default;

    fn from_raw(raw: Self::Raw, order: ByteOrder) -> Self;

    fn to_raw(self, order: ByteOrder) -> Self::Raw;
}

macro_rules! impl_primitive {
    ($kind:ident: $($ty:ty),*) => {$(
        impl Primitive for $ty {
            const KIND: NumKind = NumKind::$kind;
            const WIDTH: usize = core::mem::size_of::<$ty>();
            type Raw = [u8; core::mem::size_of::<$ty>()];

            #[inline(always)]
            fn from_raw(raw: Self::Raw, order: ByteOrder) -> Self {
                match order {
                    ByteOrder::Big => <$ty>::from_be_bytes(raw),
                    ByteOrder::Little => <$ty>::from_le_bytes(raw),
                }
            }

            #[inline(always)]
            fn to_raw(self, order: ByteOrder) -> Self::Raw {
                match order {
                    ByteOrder::Big => self.to_be_bytes(),
                    ByteOrder::Little => self.to_le_bytes(),
                }
            }
        }
    )*};
}

impl_primitive!(Unsigned: u8, u16, u32, u64);
impl_primitive!(Signed: i8, i16, i32, i64);
impl_primitive!(Float: f32, f64);

impl<B: Backend> Stream<B> {
    /// Read a number of type `T` in the given byte order.
    ///
    /// Floats are decoded bit-exactly: NaN payloads are preserved.
    #[inline]
    pub fn read_num<T: Primitive>(&mut self, order: ByteOrder) -> Result<T, StreamError> {
        let bytes = self.read_bytes(T::WIDTH)?;
        let mut raw = T::Raw::default();
        raw.as_mut().copy_from_slice(&bytes);
        Ok(T::from_raw(raw, order))
    }

    /// Write a number of type `T` in the given byte order.
    #[inline]
    pub fn write_num<T: Primitive>(&mut self, value: T, order: ByteOrder) -> Result<(), StreamError> {
        self.write_bytes(value.to_raw(order).as_ref())
    }

    /// Read a number with statically selected byte order.
    #[inline(always)]
    pub fn read_num_e<E: Endianness, T: Primitive>(&mut self) -> Result<T, StreamError> {
        self.read_num(E::ORDER)
    }

    /// Write a number with statically selected byte order.
    #[inline(always)]
    pub fn write_num_e<E: Endianness, T: Primitive>(&mut self, value: T) -> Result<(), StreamError> {
        self.write_num(value, E::ORDER)
    }
}

macro_rules! impl_named {
    ($($read:ident, $write:ident: $ty:ty, $order:ident, $name:literal;)*) => {
        impl<B: Backend> Stream<B> {$(
            #[doc = concat!("Read a `", $name, "` field.")]
            #[inline(always)]
            pub fn $read(&mut self) -> Result<$ty, StreamError> {
                self.read_num::<$ty>(ByteOrder::$order)
            }

            #[doc = concat!("Write a `", $name, "` field.")]
            #[inline(always)]
            pub fn $write(&mut self, value: $ty) -> Result<(), StreamError> {
                self.write_num(value, ByteOrder::$order)
            }
        )*}
    };
}

impl_named! {
    read_u1, write_u1: u8, Big, "u1";
    read_s1, write_s1: i8, Big, "s1";
    read_u2be, write_u2be: u16, Big, "u2be";
    read_u2le, write_u2le: u16, Little, "u2le";
    read_s2be, write_s2be: i16, Big, "s2be";
    read_s2le, write_s2le: i16, Little, "s2le";
    read_u4be, write_u4be: u32, Big, "u4be";
    read_u4le, write_u4le: u32, Little, "u4le";
    read_s4be, write_s4be: i32, Big, "s4be";
    read_s4le, write_s4le: i32, Little, "s4le";
    read_u8be, write_u8be: u64, Big, "u8be";
    read_u8le, write_u8le: u64, Little, "u8le";
    read_s8be, write_s8be: i64, Big, "s8be";
    read_s8le, write_s8le: i64, Little, "s8le";
    read_f4be, write_f4be: f32, Big, "f4be";
    read_f4le, write_f4le: f32, Little, "f4le";
    read_f8be, write_f8be: f64, Big, "f8be";
    read_f8le, write_f8le: f64, Little, "f8le";
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_layout() {
        let mut io = Stream::with_size(14);
        io.write_u2be(0x0102).unwrap();
        io.write_u4le(0x03040506).unwrap();
        io.write_s8be(-2).unwrap();
        assert_eq!(
            io.to_byte_array().unwrap(),
            [1, 2, 6, 5, 4, 3, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe]
        );
        io.seek(0).unwrap();
        assert_eq!(io.read_u2le().unwrap(), 0x0201);
        assert_eq!(io.read_s4be().unwrap(), 0x06050403);
        assert_eq!(io.read_s8be().unwrap(), -2);
    }

    #[test]
    fn test_boundaries() {
        let mut io = Stream::with_size(64);
        io.write_s1(i8::MIN).unwrap();
        io.write_u1(u8::MAX).unwrap();
        io.write_s2le(i16::MIN).unwrap();
        io.write_u2be(u16::MAX).unwrap();
        io.write_s4be(i32::MAX).unwrap();
        io.write_u4le(u32::MAX).unwrap();
        io.write_s8le(i64::MIN).unwrap();
        io.write_u8be(u64::MAX).unwrap();
        io.seek(0).unwrap();
        assert_eq!(io.read_s1().unwrap(), i8::MIN);
        assert_eq!(io.read_u1().unwrap(), u8::MAX);
        assert_eq!(io.read_s2le().unwrap(), i16::MIN);
        assert_eq!(io.read_u2be().unwrap(), u16::MAX);
        assert_eq!(io.read_s4be().unwrap(), i32::MAX);
        assert_eq!(io.read_u4le().unwrap(), u32::MAX);
        assert_eq!(io.read_s8le().unwrap(), i64::MIN);
        assert_eq!(io.read_u8be().unwrap(), u64::MAX);
    }

    #[test]
    fn test_floats() {
        let mut io = Stream::with_size(32);
        io.write_f4be(-0.0).unwrap();
        io.write_f4le(1.0).unwrap();
        // a signaling NaN with a payload
        io.write_f8be(f64::from_bits(0x7ff4_0000_dead_beef)).unwrap();
        io.write_f8le(f64::INFINITY).unwrap();
        assert_eq!(io.to_byte_array().unwrap()[..8], [0x80, 0, 0, 0, 0, 0, 0x80, 0x3f]);
        io.seek(0).unwrap();
        let z = io.read_f4be().unwrap();
        assert_eq!(z, 0.0);
        assert!(z.is_sign_negative());
        assert_eq!(io.read_f4le().unwrap(), 1.0);
        assert_eq!(io.read_f8be().unwrap().to_bits(), 0x7ff4_0000_dead_beef);
        assert_eq!(io.read_f8le().unwrap(), f64::INFINITY);
    }

    #[test]
    fn test_static_order() {
        let mut io = Stream::with_size(4);
        io.write_num_e::<LE, u32>(0xdeadbeef).unwrap();
        io.seek(0).unwrap();
        assert_eq!(io.read_num_e::<BE, u32>().unwrap(), 0xefbeadde);
    }

    #[test]
    fn test_numeric_aligns() {
        let mut io = Stream::from_bytes([0xff_u8, 0x12, 0x34]);
        io.read_bits_int_be(3).unwrap();
        // the remaining five bits are discarded
        assert_eq!(io.read_u2be().unwrap(), 0x1234);
    }
}
