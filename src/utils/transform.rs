/*
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Pure functions on byte arrays: processing filters and terminator
//! handling.

use core::fmt::{Display, Formatter};

/// Error type of the transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformError {
    /// Only single-byte groups can be rotated.
    UnsupportedGroupSize(usize),
}

impl std::error::Error for TransformError {}

impl Display for TransformError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            TransformError::UnsupportedGroupSize(n) => {
                write!(f, "unable to rotate group of {} bytes yet", n)
            }
        }
    }
}

/// XOR each byte of `data` with `key`.
pub fn process_xor_one(data: &[u8], key: u8) -> Vec<u8> {
    data.iter().map(|b| b ^ key).collect()
}

/// XOR `data` with `key` repeated cyclically.
///
/// An empty key leaves the data unchanged.
pub fn process_xor_many(data: &[u8], key: &[u8]) -> Vec<u8> {
    if key.is_empty() {
        return data.to_vec();
    }
    data.iter().zip(key.iter().cycle()).map(|(b, k)| b ^ k).collect()
}

/// Rotate each group of `group_size` bytes of `data` left by `amount` bits.
///
/// Only `group_size == 1` is supported: each byte is rotated within its own
/// eight bits, and rotating by eight is the identity.
pub fn process_rotate_left(
    data: &[u8],
    amount: u32,
    group_size: usize,
) -> Result<Vec<u8>, TransformError> {
    if group_size != 1 {
        return Err(TransformError::UnsupportedGroupSize(group_size));
    }
    Ok(data.iter().map(|b| b.rotate_left(amount % 8)).collect())
}

/// Remove trailing `pad_byte`s.
pub fn bytes_strip_right(data: &[u8], pad_byte: u8) -> &[u8] {
    let end = data
        .iter()
        .rposition(|&b| b != pad_byte)
        .map_or(0, |i| i + 1);
    &data[..end]
}

/// Truncate `data` at the first occurrence of `term`, which is kept if
/// `include_term` is true. Data without a terminator is returned whole.
pub fn bytes_terminate(data: &[u8], term: u8, include_term: bool) -> &[u8] {
    match data.iter().position(|&b| b == term) {
        Some(i) if include_term => &data[..=i],
        Some(i) => &data[..i],
        None => data,
    }
}
