//! Postcard serialization helpers
//!
//! Compact binary encoding for any type in this crate, for storing tables in
//! flash or sending them over a host link. Unlike [`crate::layout`], the
//! encoding is varint-based and not shared with C code.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::layout::LayoutError;

/// Serialize `value` into `buffer` with postcard
///
/// Returns the number of bytes written
pub fn to_postcard<T: Serialize>(value: &T, buffer: &mut [u8]) -> Result<usize, LayoutError> {
    postcard::to_slice(value, buffer)
        .map(|bytes| bytes.len())
        .map_err(|e| match e {
            postcard::Error::SerializeBufferFull => LayoutError::BufferTooSmall,
            _ => LayoutError::Serialize,
        })
}

/// Deserialize a value from postcard bytes
pub fn from_postcard<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LayoutError> {
    postcard::from_bytes(bytes).map_err(|e| match e {
        postcard::Error::DeserializeUnexpectedEnd => LayoutError::Incomplete,
        _ => LayoutError::Deserialize,
    })
}
