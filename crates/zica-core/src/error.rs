//! Error types for the zica-core library.
//!
//! Decode failures are value-returned, never panics. The four public codec
//! entry points surface success as `bool`/`Option`; the module-level decode
//! functions return this richer taxonomy.

use thiserror::Error;

use crate::wire::WireType;

/// Result type alias for zica operations
pub type Result<T> = std::result::Result<T, Error>;

/// Decode-side error taxonomy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The buffer ended while a varint's continuation bit was still set
    #[error("varint extends past the end of the buffer")]
    TruncatedVarint,

    /// The buffer ended inside a fixed-width value
    #[error("buffer too small for a fixed {width}-byte value")]
    TruncatedFixed {
        /// Width of the fixed value in bytes (4 or 8)
        width: usize,
    },

    /// A length-delimited payload ran past the end of the buffer
    #[error("length-delimited payload of {length} bytes exceeds the {available} bytes available")]
    TruncatedPayload {
        /// Declared payload length
        length: usize,
        /// Bytes remaining in the buffer
        available: usize,
    },

    /// A length-delimited payload exceeded the maximum serialized size
    #[error("length-delimited payload of {length} bytes exceeds the maximum serialized size")]
    PayloadTooLarge {
        /// Declared payload length
        length: u64,
    },

    /// A wire type with no documented encoding (groups or reserved codes)
    #[error("unsupported wire type {wire_type:?}")]
    UnsupportedWireType {
        /// The offending wire type
        wire_type: WireType,
    },

    /// Nested messages exceeded the parse depth ceiling
    #[error("message nesting exceeds the maximum depth of {limit}")]
    DepthLimitExceeded {
        /// The enforced depth limit
        limit: u32,
    },

    /// A packed fixed-width payload was not a whole number of elements
    #[error("packed payload of {length} bytes is not a multiple of the {element_size}-byte element size")]
    PackedLengthInvalid {
        /// Total packed payload length
        length: usize,
        /// Fixed element width in bytes
        element_size: usize,
    },

    /// A string field held bytes that are not valid UTF-8
    #[error("string field contains invalid UTF-8")]
    InvalidUtf8,
}

impl Error {
    /// Creates a truncated-payload error from a declared length and the bytes
    /// actually remaining.
    pub fn truncated_payload(length: usize, available: usize) -> Self {
        Self::TruncatedPayload { length, available }
    }

    /// Creates a depth-limit error carrying the enforced ceiling.
    pub fn depth_limit() -> Self {
        Self::DepthLimitExceeded {
            limit: crate::MAX_NESTING_DEPTH,
        }
    }
}
