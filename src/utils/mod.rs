/*
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

/*!

Validation and transformation helpers.

The `valid_*` functions ([`valid_eq`], [`valid_min`], [`valid_max`],
[`valid_any_of`] and [`valid_expr`]) check the constraints of a format
description, reporting failures as a [`ValidationError`] that carries the
position of the stream.

The `process_*` functions ([`process_xor_one`], [`process_xor_many`] and
[`process_rotate_left`]) implement the processing filters applied to raw
byte arrays, while [`bytes_strip_right`] and [`bytes_terminate`] handle
padding and terminators of fields read as a whole.

*/

mod valid;
pub use valid::*;

mod transform;
pub use transform::*;
