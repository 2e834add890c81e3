/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

use crate::impls::{NumKind, Primitive};
use core::fmt::{Display, Formatter};
use num_traits::NumCast;

/// A decoded value of any kind the stream can produce.
///
/// This is the payload type of validation failures and consistency errors,
/// and the value type of the dynamic numeric codec
/// ([`NumType`](super::NumType)). Integers are widened to 64 bits, keeping
/// signedness apart so that `u8::MAX` and `-1_i8` remain distinguishable.
/// Floats keep their width, so that the bits of an `f32` (NaN payloads
/// included) survive a read followed by a write.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    U64(u64),
    I64(i64),
    F32(f32),
    F64(f64),
    Bool(bool),
    Bytes(Vec<u8>),
    Str(String),
}

impl Value {
    /// Convert to a primitive numeric type, returning `None` if the value is
    /// not numeric or out of the range of `T`.
    ///
    /// Floats are never converted to integer types.
    pub fn to_primitive<T: Primitive>(&self) -> Option<T> {
        match self {
            Value::U64(v) => <T as NumCast>::from(*v),
            Value::I64(v) => <T as NumCast>::from(*v),
            Value::F32(v) if T::KIND == NumKind::Float => <T as NumCast>::from(*v),
            Value::F64(v) if T::KIND == NumKind::Float => <T as NumCast>::from(*v),
            _ => None,
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Value::U64(v) => write!(f, "{}", v),
            Value::I64(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{:?}", v),
            Value::F64(v) => write!(f, "{:?}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Bytes(v) => write!(f, "{:02x?}", v),
            Value::Str(v) => write!(f, "{:?}", v),
        }
    }
}

macro_rules! impl_from {
    ($variant:ident as $wide:ty: $($ty:ty),*) => {$(
        impl From<$ty> for Value {
            #[inline(always)]
            fn from(v: $ty) -> Self {
                Value::$variant(v as $wide)
            }
        }
    )*};
}

impl_from!(U64 as u64: u8, u16, u32, u64, usize);
impl_from!(I64 as i64: i8, i16, i32, i64, isize);
impl_from!(F32 as f32: f32);
impl_from!(F64 as f64: f64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl<const N: usize> From<[u8; N]> for Value {
    fn from(v: [u8; N]) -> Self {
        Value::Bytes(v.to_vec())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_owned())
    }
}
