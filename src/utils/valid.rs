/*
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Validation of decoded (or about to be encoded) values.
//!
//! Each check compares a value with the constraint of a format description
//! and, on failure, returns a [`ValidationError`] wrapped in
//! [`StreamError::Validation`] recording the kind of failure, the operands,
//! the current position of the stream, and an opaque source-location tag
//! supplied by the caller (usually the path of the field in the format
//! description). Checks never change the state of the stream.
//!
//! ```
//! use structstream::prelude::*;
//!
//! let mut io = Stream::from_bytes(b"MOD\x00\x07");
//! let magic = io.read_bytes(4).unwrap();
//! valid_eq(&mut io, "/seq/0", b"MOD\x00".to_vec(), magic).unwrap();
//!
//! let version = io.read_u1().unwrap();
//! let err = valid_max(&mut io, "/seq/1", 5, version).unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "/seq/1: at pos 5: validation failed: not in range, max 5, but got 7"
//! );
//! ```

use crate::dispatch::Value;
use crate::error::StreamError;
use crate::impls::Stream;
use crate::traits::Backend;
use core::fmt::{Display, Formatter};

/// The constraint that was violated, with its operands.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ValidationKind {
    NotEqual { expected: Value, actual: Value },
    LessThan { min: Value, actual: Value },
    GreaterThan { max: Value, actual: Value },
    NotAnyOf { actual: Value },
    ExprMismatch { actual: Value },
}

/// A value did not satisfy a constraint of the format.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ValidationError {
    kind: ValidationKind,
    pos: u64,
    src_path: String,
}

impl ValidationError {
    pub fn new(kind: ValidationKind, pos: u64, src_path: impl Into<String>) -> Self {
        Self {
            kind,
            pos,
            src_path: src_path.into(),
        }
    }

    pub fn kind(&self) -> &ValidationKind {
        &self.kind
    }

    /// The position of the stream when the check failed.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    pub fn src_path(&self) -> &str {
        &self.src_path
    }
}

impl std::error::Error for ValidationError {}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}: at pos {}: validation failed: ",
            self.src_path, self.pos
        )?;
        match &self.kind {
            ValidationKind::NotEqual { expected, actual } => {
                write!(f, "not equal, expected {}, but got {}", expected, actual)
            }
            ValidationKind::LessThan { min, actual } => {
                write!(f, "not in range, min {}, but got {}", min, actual)
            }
            ValidationKind::GreaterThan { max, actual } => {
                write!(f, "not in range, max {}, but got {}", max, actual)
            }
            ValidationKind::NotAnyOf { actual } => {
                write!(f, "not any of the list, got {}", actual)
            }
            ValidationKind::ExprMismatch { actual } => {
                write!(f, "not matching the expression, got {}", actual)
            }
        }
    }
}

fn fail<B: Backend>(
    io: &mut Stream<B>,
    src_path: &str,
    kind: ValidationKind,
) -> Result<(), StreamError> {
    let pos = io.pos()?;
    Err(ValidationError::new(kind, pos, src_path).into())
}

/// Check that `actual` is equal to `expected`.
pub fn valid_eq<B: Backend, T: PartialEq + Into<Value>>(
    io: &mut Stream<B>,
    src_path: &str,
    expected: T,
    actual: T,
) -> Result<(), StreamError> {
    if actual == expected {
        return Ok(());
    }
    let kind = ValidationKind::NotEqual {
        expected: expected.into(),
        actual: actual.into(),
    };
    fail(io, src_path, kind)
}

/// Check that `actual` is at least `min`.
pub fn valid_min<B: Backend, T: PartialOrd + Into<Value>>(
    io: &mut Stream<B>,
    src_path: &str,
    min: T,
    actual: T,
) -> Result<(), StreamError> {
    if actual >= min {
        return Ok(());
    }
    let kind = ValidationKind::LessThan {
        min: min.into(),
        actual: actual.into(),
    };
    fail(io, src_path, kind)
}

/// Check that `actual` is at most `max`.
pub fn valid_max<B: Backend, T: PartialOrd + Into<Value>>(
    io: &mut Stream<B>,
    src_path: &str,
    max: T,
    actual: T,
) -> Result<(), StreamError> {
    if actual <= max {
        return Ok(());
    }
    let kind = ValidationKind::GreaterThan {
        max: max.into(),
        actual: actual.into(),
    };
    fail(io, src_path, kind)
}

/// Check that `actual` is one of `allowed`.
pub fn valid_any_of<B: Backend, T: PartialEq + Into<Value>>(
    io: &mut Stream<B>,
    src_path: &str,
    allowed: &[T],
    actual: T,
) -> Result<(), StreamError> {
    if allowed.contains(&actual) {
        return Ok(());
    }
    let kind = ValidationKind::NotAnyOf {
        actual: actual.into(),
    };
    fail(io, src_path, kind)
}

/// Check that `predicate` holds for `actual`.
pub fn valid_expr<B: Backend, T: Into<Value>>(
    io: &mut Stream<B>,
    src_path: &str,
    actual: T,
    predicate: impl FnOnce(&T) -> bool,
) -> Result<(), StreamError> {
    if predicate(&actual) {
        return Ok(());
    }
    let kind = ValidationKind::ExprMismatch {
        actual: actual.into(),
    };
    fail(io, src_path, kind)
}

#[cfg(test)]
mod test {
    use super::*;

    fn validation(res: Result<(), StreamError>) -> ValidationError {
        match res {
            Err(StreamError::Validation(v)) => v,
            other => panic!("expected a validation failure, got {:?}", other),
        }
    }

    #[test]
    fn test_kinds() {
        let mut io = Stream::from_bytes([0_u8; 8]);
        io.seek(3).unwrap();

        assert!(valid_eq(&mut io, "/a", 1_u8, 1).is_ok());
        let v = validation(valid_eq(&mut io, "/a", 1_u8, 2));
        assert_eq!(
            *v.kind(),
            ValidationKind::NotEqual {
                expected: Value::U64(1),
                actual: Value::U64(2)
            }
        );
        assert_eq!((v.pos(), v.src_path()), (3, "/a"));

        assert!(valid_min(&mut io, "/b", -5_i32, -5).is_ok());
        let v = validation(valid_min(&mut io, "/b", -5_i32, -6));
        assert!(matches!(v.kind(), ValidationKind::LessThan { .. }));

        assert!(valid_max(&mut io, "/c", 2.5_f64, 2.5).is_ok());
        let v = validation(valid_max(&mut io, "/c", 2.5_f64, 2.6));
        assert!(matches!(v.kind(), ValidationKind::GreaterThan { .. }));

        assert!(valid_any_of(&mut io, "/d", &[1_u16, 3, 5], 3).is_ok());
        let v = validation(valid_any_of(&mut io, "/d", &[1_u16, 3, 5], 4));
        assert_eq!(
            *v.kind(),
            ValidationKind::NotAnyOf {
                actual: Value::U64(4)
            }
        );

        assert!(valid_expr(&mut io, "/e", 4_u32, |x| x % 2 == 0).is_ok());
        let v = validation(valid_expr(&mut io, "/e", 5_u32, |x| x % 2 == 0));
        assert_eq!(
            v.to_string(),
            "/e: at pos 3: validation failed: not matching the expression, got 5"
        );
        // checks do not move the stream
        assert_eq!(io.pos().unwrap(), 3);
    }

    #[test]
    fn test_bytes_payload() {
        let mut io = Stream::from_bytes(b"MOE\x00");
        let magic = io.read_bytes(4).unwrap();
        let v = validation(valid_eq(&mut io, "/magic", b"MOD\x00".to_vec(), magic));
        assert_eq!(
            *v.kind(),
            ValidationKind::NotEqual {
                expected: Value::Bytes(b"MOD\x00".to_vec()),
                actual: Value::Bytes(b"MOE\x00".to_vec()),
            }
        );
        assert_eq!(v.pos(), 4);
    }

    #[test]
    fn test_pos_with_pending_write_bits() {
        let mut io = Stream::with_size(2);
        io.write_bits_int_be(3, 0b111).unwrap();
        let v = validation(valid_eq(&mut io, "/bits", 0_u64, 0b111));
        assert_eq!(v.pos(), 1);
    }
}
