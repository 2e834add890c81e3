/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Runtime description of a fixed-width numeric field, with associated read
//! and write methods.
//!
//! This is the slower and more generic form of dispatching, used when the
//! field type is only known at runtime (e.g., when it comes from a format
//! description loaded from disk). When the type is known at compile time use
//! [`Stream::read_num`](crate::impls::Stream::read_num) or one of the named
//! methods such as [`Stream::read_u4le`](crate::impls::Stream::read_u4le).

use super::Value;
use crate::error::StreamError;
use crate::impls::{NumKind, Stream};
use crate::traits::{Backend, ByteOrder};
#[cfg(feature = "mem_dbg")]
use mem_dbg::{MemDbg, MemSize};

/// A numeric field type: kind, width in bytes and byte order.
///
/// Only the combinations supported by the numeric codec can be built:
/// integer widths 1, 2, 4 and 8, float widths 4 and 8. The byte order of
/// one-byte types is irrelevant and normalized to big-endian, so that `u1`
/// has a single representation.
///
/// Both [`Display`](std::fmt::Display) and [`FromStr`](std::str::FromStr) are
/// implemented for this struct in a dual way, using the names of format
/// descriptions (`u1`, `s2le`, `f8be`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(flat))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumType {
    kind: NumKind,
    width: usize,
    order: ByteOrder,
}

impl NumType {
    /// Create a new numeric type, checking that the combination is supported.
    pub fn new(kind: NumKind, width: usize, order: ByteOrder) -> Result<Self, NumTypeError> {
        let supported = match kind {
            NumKind::Unsigned | NumKind::Signed => matches!(width, 1 | 2 | 4 | 8),
            NumKind::Float => matches!(width, 4 | 8),
        };
        if !supported {
            return Err(NumTypeError::UnsupportedWidth { kind, width });
        }
        let order = if width == 1 { ByteOrder::Big } else { order };
        Ok(Self { kind, width, order })
    }

    pub fn kind(&self) -> NumKind {
        self.kind
    }

    /// Width in bytes.
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Read a value of this type, aligning the stream to a byte boundary.
    pub fn read<B: Backend>(&self, io: &mut Stream<B>) -> Result<Value, StreamError> {
        let order = self.order;
        Ok(match (self.kind, self.width) {
            (NumKind::Unsigned, 1) => io.read_num::<u8>(order)?.into(),
            (NumKind::Unsigned, 2) => io.read_num::<u16>(order)?.into(),
            (NumKind::Unsigned, 4) => io.read_num::<u32>(order)?.into(),
            (NumKind::Unsigned, 8) => io.read_num::<u64>(order)?.into(),
            (NumKind::Signed, 1) => io.read_num::<i8>(order)?.into(),
            (NumKind::Signed, 2) => io.read_num::<i16>(order)?.into(),
            (NumKind::Signed, 4) => io.read_num::<i32>(order)?.into(),
            (NumKind::Signed, 8) => io.read_num::<i64>(order)?.into(),
            (NumKind::Float, 4) => io.read_num::<f32>(order)?.into(),
            (NumKind::Float, 8) => io.read_num::<f64>(order)?.into(),
            _ => unreachable!("unsupported widths are rejected by NumType::new"),
        })
    }

    /// Write `value` with this type, flushing pending bits first.
    ///
    /// Fails with [`StreamError::NotRepresentable`] if `value` is not
    /// numeric or out of range; floats are never written to integer fields.
    pub fn write<B: Backend>(&self, io: &mut Stream<B>, value: &Value) -> Result<(), StreamError> {
        match (self.kind, self.width) {
            (NumKind::Unsigned, 1) => io.write_num(self.convert::<u8>(value)?, self.order),
            (NumKind::Unsigned, 2) => io.write_num(self.convert::<u16>(value)?, self.order),
            (NumKind::Unsigned, 4) => io.write_num(self.convert::<u32>(value)?, self.order),
            (NumKind::Unsigned, 8) => io.write_num(self.convert::<u64>(value)?, self.order),
            (NumKind::Signed, 1) => io.write_num(self.convert::<i8>(value)?, self.order),
            (NumKind::Signed, 2) => io.write_num(self.convert::<i16>(value)?, self.order),
            (NumKind::Signed, 4) => io.write_num(self.convert::<i32>(value)?, self.order),
            (NumKind::Signed, 8) => io.write_num(self.convert::<i64>(value)?, self.order),
            (NumKind::Float, 4) => io.write_num(self.convert::<f32>(value)?, self.order),
            (NumKind::Float, 8) => io.write_num(self.convert::<f64>(value)?, self.order),
            _ => unreachable!("unsupported widths are rejected by NumType::new"),
        }
    }

    /// Encode `value` with this type without touching any stream.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>, StreamError> {
        let mut io = Stream::with_size(self.width);
        self.write(&mut io, value)?;
        io.to_byte_array()
    }

    fn convert<T: crate::impls::Primitive>(&self, value: &Value) -> Result<T, StreamError> {
        value
            .to_primitive::<T>()
            .ok_or_else(|| StreamError::NotRepresentable {
                ty: *self,
                value: value.clone(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Error type for building or parsing a [`NumType`].
pub enum NumTypeError {
    UnsupportedWidth { kind: NumKind, width: usize },
    UnknownType(String),
}

impl std::error::Error for NumTypeError {}
impl core::fmt::Display for NumTypeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self {
            NumTypeError::UnsupportedWidth { kind, width } => {
                write!(f, "Unsupported width {} for {:?} numbers", width, kind)
            }
            NumTypeError::UnknownType(s) => write!(f, "Unknown numeric type: {}", s),
        }
    }
}

impl core::fmt::Display for NumType {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let prefix = match self.kind {
            NumKind::Unsigned => 'u',
            NumKind::Signed => 's',
            NumKind::Float => 'f',
        };
        if self.width == 1 {
            write!(f, "{}1", prefix)
        } else {
            write!(f, "{}{}{}", prefix, self.width, self.order.suffix())
        }
    }
}

impl core::str::FromStr for NumType {
    type Err = NumTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || NumTypeError::UnknownType(s.to_owned());
        // Widths and suffixes are sliced by byte offset below
        if !s.is_ascii() {
            return Err(unknown());
        }
        let mut chars = s.chars();
        let kind = match chars.next() {
            Some('u') => NumKind::Unsigned,
            Some('s') => NumKind::Signed,
            Some('f') => NumKind::Float,
            _ => return Err(unknown()),
        };
        let rest = chars.as_str();
        let (width, order) = match rest.len() {
            1 => (rest, ByteOrder::Big),
            3 => match &rest[1..] {
                "be" => (&rest[..1], ByteOrder::Big),
                "le" => (&rest[..1], ByteOrder::Little),
                _ => return Err(unknown()),
            },
            _ => return Err(unknown()),
        };
        let width: usize = width.parse().map_err(|_| unknown())?;
        // One-byte types have no order suffix, and wider ones require it
        if (width == 1) != (rest.len() == 1) {
            return Err(unknown());
        }
        NumType::new(kind, width, order)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_display() {
        for name in [
            "u1", "u2le", "u2be", "u4le", "u4be", "u8le", "u8be", "s1", "s2le", "s2be", "s4le",
            "s4be", "s8le", "s8be", "f4le", "f4be", "f8le", "f8be",
        ] {
            let ty: NumType = name.parse().unwrap();
            assert_eq!(ty.to_string(), name);
        }
        assert!("u3le".parse::<NumType>().is_err());
        assert!("f2le".parse::<NumType>().is_err());
        assert!("f1".parse::<NumType>().is_err());
        assert!("u1le".parse::<NumType>().is_err());
        assert!("u4".parse::<NumType>().is_err());
        assert!("x4le".parse::<NumType>().is_err());
        assert!("".parse::<NumType>().is_err());
        // multi-byte characters where a width or suffix is expected
        for name in ["sé1", "u4lé", "fé", "u\u{1F600}", "é4le"] {
            assert_eq!(
                name.parse::<NumType>(),
                Err(NumTypeError::UnknownType(name.to_owned()))
            );
        }
    }

    #[test]
    fn test_one_byte_order() {
        assert_eq!(
            NumType::new(NumKind::Unsigned, 1, ByteOrder::Little).unwrap(),
            NumType::new(NumKind::Unsigned, 1, ByteOrder::Big).unwrap()
        );
    }

    #[test]
    fn test_encode() {
        let ty: NumType = "u4le".parse().unwrap();
        assert_eq!(ty.encode(&Value::U64(0x01020304)).unwrap(), [4, 3, 2, 1]);
        let ty: NumType = "s2be".parse().unwrap();
        assert_eq!(ty.encode(&Value::I64(-2)).unwrap(), [0xff, 0xfe]);
        match ty.encode(&Value::I64(40000)) {
            Err(StreamError::NotRepresentable { ty: t, value }) => {
                assert_eq!(t, ty);
                assert_eq!(value, Value::I64(40000));
            }
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_read_dispatch() {
        let mut io = Stream::from_bytes([0xff_u8, 0xfe, 0x00, 0x00, 0x80, 0x3f]);
        let ty: NumType = "s2be".parse().unwrap();
        assert_eq!(ty.read(&mut io).unwrap(), Value::I64(-2));
        let ty: NumType = "f4le".parse().unwrap();
        assert_eq!(ty.read(&mut io).unwrap(), Value::F32(1.0));
    }

    #[test]
    fn test_float_bits_preserved() {
        // a signalling NaN keeps its payload through a dynamic read and write
        for ty in ["f4le", "f4be"] {
            let ty: NumType = ty.parse().unwrap();
            let bits = ty.encode(&Value::F32(f32::from_bits(0x7fa0_0001))).unwrap();
            let mut io = Stream::from_bytes(bits.clone());
            let value = ty.read(&mut io).unwrap();
            let Value::F32(v) = value else {
                panic!("unexpected value {:?}", value);
            };
            assert_eq!(v.to_bits(), 0x7fa0_0001);
            assert_eq!(ty.encode(&value).unwrap(), bits);
        }
        let ty: NumType = "f8be".parse().unwrap();
        let nan = f64::from_bits(0x7ff4_0000_0000_0001);
        let bits = ty.encode(&Value::F64(nan)).unwrap();
        assert_eq!(bits, 0x7ff4_0000_0000_0001_u64.to_be_bytes());
        let mut io = Stream::from_bytes(bits);
        let Value::F64(v) = ty.read(&mut io).unwrap() else {
            panic!("f8 reads produce F64 values");
        };
        assert_eq!(v.to_bits(), 0x7ff4_0000_0000_0001);
    }

    #[cfg(feature = "mem_dbg")]
    #[test]
    fn test_mem_size() {
        use crate::impls::BitBuffer;
        use mem_dbg::SizeFlags;
        let flags = SizeFlags::default();
        let ty: NumType = "f8le".parse().unwrap();
        assert_eq!(ty.mem_size(flags), core::mem::size_of::<NumType>());
        assert_eq!(NumKind::Float.mem_size(flags), core::mem::size_of::<NumKind>());
        assert_eq!(ByteOrder::Little.mem_size(flags), core::mem::size_of::<ByteOrder>());
        let buf = BitBuffer::Pending {
            order: ByteOrder::Big,
            left: 3,
            value: 0b101,
        };
        assert_eq!(buf.mem_size(flags), core::mem::size_of::<BitBuffer>());
        let types = vec![ty; 4];
        assert!(types.mem_size(flags) >= 4 * core::mem::size_of::<NumType>());
    }
}
