//! Cursor codec module
//!
//! Encodes opaque continuation tokens for the wire and decodes them back.
//!
//! # Overview
//!
//! Backends hand out raw continuation tokens (arbitrary bytes). Before a
//! token reaches a client it goes through a [`CursorCodec`]; the default codec
//! is URL-safe base64. Codecs are attached to cursor params specs and can be
//! replaced per page type with the `cursor_encoding` modifier.

mod codec;

pub use codec::{CursorCodec, DecodeFn, EncodeFn};
