/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

#[cfg(feature = "mem_dbg")]
use mem_dbg::{MemDbg, MemSize};

/// Inner private trait used to make implementing [`Endianness`]
/// impossible for other structs.
mod private {
    /// This is a [SealedTrait](https://predr.ag/blog/definitive-guide-to-sealed-traits-in-rust/).
    pub trait Endianness {}
}

/// Marker trait for endianness selector types.
///
/// Its only implementations are [`LittleEndian`] and [`BigEndian`]. Each
/// selector carries the corresponding runtime [`ByteOrder`], so that
/// statically-selected reads and writes can share the code of the dynamic
/// ones.
///
/// The same selectors are used both for byte order (numeric codecs) and
/// for bit order (bit fields): big-endian bit fields are read MSB first,
/// little-endian bit fields LSB first.
pub trait Endianness: private::Endianness {
    /// The runtime counterpart of this selector.
    const ORDER: ByteOrder;
}

/// Selector type for little-endian streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LittleEndian;

/// Selector type for big-endian streams.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BigEndian;

/// Alias for [`BigEndian`]
pub type BE = BigEndian;

/// Alias for [`LittleEndian`]
pub type LE = LittleEndian;

impl private::Endianness for LittleEndian {}
impl private::Endianness for BigEndian {}

impl Endianness for LittleEndian {
    const ORDER: ByteOrder = ByteOrder::Little;
}

impl Endianness for BigEndian {
    const ORDER: ByteOrder = ByteOrder::Big;
}

/// Runtime byte (or bit) order.
///
/// Format descriptions frequently decide the order only when parsing (e.g.,
/// from a magic number), so every operation taking an order has a dynamic
/// variant accepting this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "mem_dbg", derive(MemDbg, MemSize))]
#[cfg_attr(feature = "mem_dbg", mem_size(flat))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    Big,
    Little,
}

impl ByteOrder {
    /// The suffix used by format descriptions (`"be"` or `"le"`).
    pub fn suffix(self) -> &'static str {
        match self {
            ByteOrder::Big => "be",
            ByteOrder::Little => "le",
        }
    }
}

impl core::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ByteOrder::Big => write!(f, "big-endian"),
            ByteOrder::Little => write!(f, "little-endian"),
        }
    }
}

/// Resolves the outcome of a switch on the default byte order of a type.
///
/// Generated parsers compute `candidate` from the data; `None` means that no
/// case matched, which is an error since an endianness expression implies
/// that some case must.
pub fn decide_endianness(
    src_path: &str,
    candidate: Option<ByteOrder>,
) -> Result<ByteOrder, crate::error::StreamError> {
    candidate.ok_or_else(|| crate::error::StreamError::UndecidedEndianness {
        src_path: src_path.to_owned(),
    })
}
