/*
 * SPDX-FileCopyrightText: 2023 Tommaso Fontana
 * SPDX-FileCopyrightText: 2023 Inria
 * SPDX-FileCopyrightText: 2023 Sebastiano Vigna
 *
 * SPDX-License-Identifier: Apache-2.0 OR LGPL-2.1-or-later
 */

//! Deferred writes of values that are known only after later content has
//! been serialized.
//!
//! Some fields (lengths, offsets, checksums) precede the data they depend
//! on. A writer handles them in two passes: during the first pass it
//! [reserves](Stream::reserve) room for the field, serializes the dependent
//! data into a separate in-memory child stream, and
//! [registers](Stream::add_child_stream) the child together with a
//! [`WriteBackHandler`] that says where the parent must be patched and how
//! the patch is computed from the child.
//!
//! At the end of the first pass a single call to
//! [`write_back_child_streams`](Stream::write_back_child_streams) finalizes
//! the tree: each child is finalized recursively (depth first, in
//! registration order) before its own handler is resolved, so nested
//! deferred values are patched bottom up. The resulting list of [`Patch`]es
//! is applied to the parent and returned, and the position of every stream
//! is restored.
//!
//! # Example
//! ```
//! use structstream::prelude::*;
//!
//! let mut io = Stream::with_size(8);
//! // a u2le length field followed by up to six bytes of body
//! let len_pos = io.reserve(2).unwrap();
//! let body_pos = io.reserve(6).unwrap();
//!
//! let mut body = Stream::with_size(6);
//! body.write_bytes(b"abc").unwrap();
//! let u2le: NumType = "u2le".parse().unwrap();
//! io.add_child_stream(body, WriteBackHandler::new(len_pos, WriteBack::ChildPos(u2le)))
//!     .unwrap();
//!
//! let mut body = Stream::with_size(6);
//! body.write_bytes(b"abc").unwrap();
//! io.add_child_stream(body, WriteBackHandler::new(body_pos, WriteBack::ChildBytes))
//!     .unwrap();
//!
//! let patches = io.write_back_child_streams().unwrap();
//! assert_eq!(patches.len(), 2);
//! assert_eq!(io.pos().unwrap(), 8);
//! assert_eq!(io.to_byte_array().unwrap(), b"\x03\x00abc\x00\x00\x00");
//! ```

use super::{MemStream, Stream};
use crate::dispatch::{NumType, Value};
use crate::error::StreamError;
use crate::traits::*;

/// How a [`WriteBackHandler`] computes the bytes patched into the parent
/// from its finalized child.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteBack {
    /// The whole content of the child store.
    ChildBytes,
    /// The size of the child store, encoded with the given type.
    ChildSize(NumType),
    /// The position of the child stream, that is, the number of bytes
    /// serialized into it, encoded with the given type.
    ChildPos(NumType),
    /// The bytes serialized into the child, preceded by their number encoded
    /// with the given type.
    LengthPrefixed(NumType),
    /// Fixed bytes, for values computed by the caller during the first pass.
    Bytes(Vec<u8>),
    /// A function of the whole content of the child store (e.g., a
    /// checksum).
    Computed(fn(&[u8]) -> Vec<u8>),
}

/// A deferred patch of the parent stream at a given position, computed from
/// a child stream once the child is finalized.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteBackHandler {
    pos: u64,
    kind: WriteBack,
}

impl WriteBackHandler {
    pub fn new(pos: u64, kind: WriteBack) -> Self {
        Self { pos, kind }
    }

    /// The position in the parent stream that will be patched.
    pub fn pos(&self) -> u64 {
        self.pos
    }

    pub fn kind(&self) -> &WriteBack {
        &self.kind
    }

    /// Compute the patch for a finalized child.
    fn resolve(&self, child: &mut MemStream) -> Result<Patch, StreamError> {
        let bytes = match &self.kind {
            WriteBack::ChildBytes => child.to_byte_array()?,
            WriteBack::ChildSize(ty) => ty.encode(&Value::U64(child.size()?))?,
            WriteBack::ChildPos(ty) => ty.encode(&Value::U64(child.pos()?))?,
            WriteBack::LengthPrefixed(ty) => {
                let len = child.pos()?;
                let mut bytes = ty.encode(&Value::U64(len))?;
                let content = child.to_byte_array()?;
                // a child can be positioned past the end of its content
                let body = content.get(..len as usize).ok_or(StreamError::Eof {
                    requested: len,
                    available: content.len() as u64,
                })?;
                bytes.extend_from_slice(body);
                bytes
            }
            WriteBack::Bytes(bytes) => bytes.clone(),
            WriteBack::Computed(f) => f(&child.to_byte_array()?),
        };
        Ok(Patch {
            pos: self.pos,
            bytes,
        })
    }
}

/// A write of `bytes` at position `pos` of a parent stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    pub pos: u64,
    pub bytes: Vec<u8>,
}

/// A child stream together with the handler that will patch its parent.
#[derive(Debug)]
pub struct ChildStream {
    stream: MemStream,
    handler: WriteBackHandler,
}

impl ChildStream {
    pub fn stream(&self) -> &MemStream {
        &self.stream
    }

    pub fn handler(&self) -> &WriteBackHandler {
        &self.handler
    }
}

/// The state of the write-back graph of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteBackState {
    /// Child streams can be registered.
    #[default]
    Accumulating,
    /// The write-back pass has run.
    Finalized,
}

impl<B: Backend> Stream<B> {
    /// Return the current position and skip `n` bytes, which a
    /// [`WriteBackHandler`] will fill later.
    ///
    /// Fails if the bytes cannot be written, so that the failure happens
    /// during the first pass rather than during the write-back.
    pub fn reserve(&mut self, n: u64) -> Result<u64, StreamError> {
        let pos = self.pos()?;
        self.ensure_bytes_left_to_write(n, pos)?;
        self.seek(pos + n)?;
        Ok(pos)
    }

    /// Register a child stream, returning a reference to it so that more
    /// content can be serialized into it before the write-back pass.
    ///
    /// Fails with [`StreamError::Finalized`] after
    /// [`write_back_child_streams`](Stream::write_back_child_streams).
    pub fn add_child_stream(
        &mut self,
        child: MemStream,
        handler: WriteBackHandler,
    ) -> Result<&mut MemStream, StreamError> {
        if self.state == WriteBackState::Finalized {
            return Err(StreamError::Finalized);
        }
        self.children.push(ChildStream {
            stream: child,
            handler,
        });
        let last = self.children.len() - 1;
        Ok(&mut self.children[last].stream)
    }

    /// The registered child streams, in registration order.
    pub fn child_streams(&self) -> &[ChildStream] {
        &self.children
    }

    pub fn write_back_state(&self) -> WriteBackState {
        self.state
    }

    /// Finalize the children in registration order, compute their patches
    /// and apply them. The children are left in place.
    fn apply_patches(&mut self) -> Result<Vec<Patch>, StreamError> {
        let mut patches = Vec::with_capacity(self.children.len());
        for child in &mut self.children {
            child.stream.write_back_child_streams()?;
            patches.push(child.handler.resolve(&mut child.stream)?);
        }
        for patch in &patches {
            log::debug!("patching {} bytes at position {}", patch.bytes.len(), patch.pos);
            self.seek(patch.pos)?;
            self.write_bytes(&patch.bytes)?;
        }
        Ok(patches)
    }

    /// Run the write-back pass: finalize all children recursively, patch
    /// this stream and restore its position.
    ///
    /// Returns the patches applied, in order. After this call no more
    /// children can be registered, and further calls do nothing.
    ///
    /// On failure the position is restored as well, but the stream stays
    /// [accumulating](WriteBackState::Accumulating) and keeps its children,
    /// so a further call runs the pass again. Patches applied before the
    /// failure are not undone.
    pub fn write_back_child_streams(&mut self) -> Result<Vec<Patch>, StreamError> {
        if self.state == WriteBackState::Finalized {
            return Ok(Vec::new());
        }
        let pos = self.pos()?;
        log::debug!(
            "write-back pass over {} child streams at position {}",
            self.children.len(),
            pos
        );
        let applied = self.apply_patches();
        let restored = self.seek(pos);
        let patches = applied?;
        restored?;
        self.children.clear();
        self.state = WriteBackState::Finalized;
        Ok(patches)
    }
}
