/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Errors returned by streams.
//!
//! Every failure is reported to the immediate caller, and nothing is
//! retried internally. The variants of [`StreamError`] fall in a few classes
//! that callers usually handle differently:
//!
//! - end of data ([`Eof`](StreamError::Eof),
//!   [`MissingTerminator`](StreamError::MissingTerminator)): the input is
//!   truncated;
//! - write capacity ([`WriteCapacity`](StreamError::WriteCapacity),
//!   [`NotSeekable`](StreamError::NotSeekable),
//!   [`LimitExceeded`](StreamError::LimitExceeded)): fatal for the current
//!   write pass;
//! - malformed input ([`Validation`](StreamError::Validation),
//!   [`ContentMismatch`](StreamError::ContentMismatch)): callers may log and
//!   continue;
//! - logic defects ([`Consistency`](StreamError::Consistency),
//!   [`MixedBitOrder`](StreamError::MixedBitOrder),
//!   [`Finalized`](StreamError::Finalized)): always fatal.
//!
//! Partial writes preceding a failure are not rolled back.

use crate::dispatch::{NumType, Value};
use crate::traits::ByteOrder;
use crate::utils::ValidationError;
use core::fmt::{Display, Formatter};
use std::error::Error;

/// The error type of all [`Stream`](crate::impls::Stream) operations.
#[derive(Debug)]
#[non_exhaustive]
pub enum StreamError {
    /// The backing store failed.
    Io(std::io::Error),
    /// Fewer bytes than requested were available.
    Eof { requested: u64, available: u64 },
    /// A write would go past the end of the pre-sized store.
    WriteCapacity { size: u64, requested: u64, left: u64 },
    /// Writing requires a seekable store of known size.
    NotSeekable,
    /// The store ended before the terminator byte was found.
    MissingTerminator { term: u8 },
    /// Fixed contents did not match.
    ContentMismatch { expected: Vec<u8>, actual: Vec<u8> },
    /// More bytes than the field size were given to
    /// [`write_bytes_limit`](crate::impls::Stream::write_bytes_limit).
    LimitExceeded { size: usize, given: usize },
    /// A bit field was requested in a bit order different from the one of
    /// the bits still pending in the accumulator.
    MixedBitOrder {
        pending: ByteOrder,
        requested: ByteOrder,
    },
    /// A value cannot be encoded with the requested numeric type.
    NotRepresentable { ty: NumType, value: Value },
    /// Bit fields are at most 64 bits wide.
    TooManyBits { n: usize },
    /// The value to write does not fit in the bit field.
    #[cfg(feature = "checks")]
    ValueTooWide { value: u64, n: usize },
    /// A value did not satisfy a constraint of the format.
    Validation(ValidationError),
    /// A value computed twice disagreed with itself.
    Consistency {
        id: String,
        expected: Value,
        actual: Value,
    },
    /// A switch on the default byte order of a type matched no case.
    UndecidedEndianness { src_path: String },
    /// A child stream was registered after the write-back pass.
    Finalized,
}

impl StreamError {
    /// Whether this error signals truncated input.
    pub fn is_eof(&self) -> bool {
        matches!(
            self,
            StreamError::Eof { .. } | StreamError::MissingTerminator { .. }
        )
    }

    /// Return the validation failure, if this is one.
    pub fn as_validation(&self) -> Option<&ValidationError> {
        match self {
            StreamError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

impl Display for StreamError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            StreamError::Io(e) => write!(f, "I/O error: {}", e),
            StreamError::Eof {
                requested,
                available,
            } => write!(
                f,
                "requested {} bytes, but only {} bytes available",
                requested, available
            ),
            StreamError::WriteCapacity {
                size,
                requested,
                left,
            } => write!(
                f,
                "[{}] requested to write {} bytes, but only {} bytes left in the stream",
                size, requested, left
            ),
            StreamError::NotSeekable => {
                write!(f, "writing to non-seekable streams is not supported")
            }
            StreamError::MissingTerminator { term } => write!(
                f,
                "end of stream reached, but no terminator {} found",
                term
            ),
            StreamError::ContentMismatch { expected, actual } => write!(
                f,
                "unexpected fixed contents: got {:02x?}, was waiting for {:02x?}",
                actual, expected
            ),
            StreamError::LimitExceeded { size, given } => write!(
                f,
                "writing {} bytes, but {} bytes were given",
                size, given
            ),
            StreamError::MixedBitOrder { pending, requested } => write!(
                f,
                "{} bit field requested while {} bits are pending; align to a byte boundary first",
                requested, pending
            ),
            StreamError::NotRepresentable { ty, value } => {
                write!(f, "value {} cannot be represented as {}", value, ty)
            }
            StreamError::TooManyBits { n } => write!(
                f,
                "The number of bits has to be in [0, 64] and {} is not",
                n
            ),
            #[cfg(feature = "checks")]
            StreamError::ValueTooWide { value, n } => {
                write!(f, "Value {} does not fit in {} bits", value, n)
            }
            StreamError::Validation(v) => write!(f, "{}", v),
            StreamError::Consistency {
                id,
                expected,
                actual,
            } => write!(
                f,
                "Check failed: {}, expected: {}, actual: {}",
                id, expected, actual
            ),
            StreamError::UndecidedEndianness { src_path } => write!(
                f,
                "{}: unable to decide on endianness for a type",
                src_path
            ),
            StreamError::Finalized => write!(
                f,
                "cannot register a child stream after the write-back pass"
            ),
        }
    }
}

impl Error for StreamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            StreamError::Io(e) => Some(e),
            StreamError::Validation(v) => Some(v),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StreamError {
    fn from(e: std::io::Error) -> Self {
        StreamError::Io(e)
    }
}

impl From<ValidationError> for StreamError {
    fn from(e: ValidationError) -> Self {
        StreamError::Validation(e)
    }
}

/// Fails with [`StreamError::Consistency`] if a recomputed value differs
/// from the one computed earlier.
///
/// Writers use this to check that, e.g., a length field set by the caller
/// matches the length of the data actually serialized.
pub fn check_consistency<T: PartialEq + Into<Value>>(
    id: &str,
    expected: T,
    actual: T,
) -> Result<(), StreamError> {
    if expected == actual {
        return Ok(());
    }
    Err(StreamError::Consistency {
        id: id.to_owned(),
        expected: expected.into(),
        actual: actual.into(),
    })
}
