/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Implementations of backing stores and of the stream.

If you need to read or write a file or any backend implementing
[`std::io::Read`], [`std::io::Write`] and [`std::io::Seek`] you just need to
wrap it in an [`IoAdapter`] (or a [`ReadAdapter`], if it is read-only).
Non-seekable sources, such as pipes, can be read through a
[`StreamingAdapter`].

If instead you want to read or write directly from memory, you can use
[`MemReader`] and [`MemWriter`]. The latter has a fixed size, which is the
capacity of the stream.

Once you have a backing store, [`Stream`] provides bit fields, numbers,
byte arrays and the write-back graph on top of it. The most common
combinations have dedicated constructors, such as [`Stream::from_bytes`],
[`Stream::with_size`] and [`Stream::open`].

*/

mod mem_reader;
pub use mem_reader::*;

mod mem_writer;
pub use mem_writer::*;

mod io_adapter;
pub use io_adapter::*;

mod stream;
pub use stream::*;

mod bits;
pub use bits::BitBuffer;

mod bytes;

mod numeric;
pub use numeric::*;

mod write_back;
pub use write_back::*;
