/*
 * SPDX-FileCopyrightText: 2025 Tommaso Fontana
 * SPDX-FileCopyrightText: 2025 Inria
 * SPDX-FileCopyrightText: 2025 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Dynamic dispatch for numeric fields.
//!
//! [`Stream`](crate::impls::Stream) provides a generic numeric codec,
//! [`read_num`](crate::impls::Stream::read_num) and
//! [`write_num`](crate::impls::Stream::write_num), parameterized by a
//! [`Primitive`](crate::impls::Primitive) type and a byte order, plus one
//! named method per combination (`read_u4le`, `write_f8be`, ...). All of them
//! need the field type at compile time.
//!
//! When the type is known only at runtime, [`NumType`] describes it as a
//! value (kind, width, order) that can be parsed from and printed to the
//! names used by format descriptions, and reads or writes a [`Value`]:
//!```rust
//! use structstream::prelude::*;
//!
//! let ty: NumType = "u2le".parse().unwrap();
//! let mut io = Stream::from_bytes([0x34_u8, 0x12]);
//! assert_eq!(ty.read(&mut io).unwrap(), Value::U64(0x1234));
//!```

mod num_type;
pub use num_type::*;

mod value;
pub use value::*;
