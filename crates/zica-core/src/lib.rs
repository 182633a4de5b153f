//! # zica-core
//!
//! A schema-inline codec for the Protocol Buffers wire format, plus an
//! inspector that renders arbitrary wire bytes as an annotated hex dump.
//!
//! The codec is schema-driven: the user's record type *is* the schema. Fields
//! are declared directly on the struct with `#[zica(tag = N)]` attributes and
//! bound at build time — no message descriptors, no reflection, no generated
//! `.proto` code.
//!
//! ## Architecture
//!
//! - [`wire`]: varint, zigzag, and fixed-width primitives; tags
//! - [`field`]: value kinds, wire-type classification, field-list introspection
//! - [`encoding`]: per-kind size computation, emission, and value parsing
//! - [`message`]: the [`Message`] trait and the public codec entry points
//! - [`inspect`]: schema-less wire scanning and hex-dump rendering
//! - [`error`]: error types and handling
//!
//! ## Example
//!
//! ```
//! use zica_core::{self as zica, Message};
//!
//! #[derive(Message, Debug, Default, PartialEq)]
//! struct Greeting {
//!     #[zica(tag = 1)]
//!     text: String,
//!     #[zica(tag = 2)]
//!     count: u32,
//! }
//!
//! let greeting = Greeting { text: "hello".into(), count: 3 };
//!
//! let size = zica::compute_size(&greeting);
//! assert!(size >= 0);
//! let mut buffer = Vec::with_capacity(size as usize);
//! zica::serialize(&greeting, &mut buffer);
//!
//! let decoded: Greeting = zica::parse(&buffer).expect("round trip");
//! assert_eq!(greeting, decoded);
//! ```
//!
//! ## Wire compatibility
//!
//! Encoded bytes are bit-exact Protocol Buffers wire format and can be
//! exchanged with any conformant implementation. The deprecated group wire
//! types (3 and 4) are not supported; encountering one fails the parse.

#![deny(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, unreachable_pub)]

pub mod encoding;
pub mod error;
pub mod field;
pub mod inspect;
pub mod message;
pub mod wire;

// Re-export primary types for convenience
pub use error::{Error, Result};
pub use field::{FieldDescriptor, Kind, Label};
pub use message::{compute_size, merge_from, parse, serialize, Enumeration, Message};
pub use wire::WireType;

// The derive macros generate code against `zica_core::...` paths, including
// `zica_core::bytes::BufMut`.
pub use bytes;
pub use zica_derive::{Enumeration, Message};

/// Crate version for programmatic access
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum valid protobuf field number (2^29 - 1)
pub const MAX_FIELD_NUMBER: u32 = 536_870_911;

/// Maximum number of serialized bytes for an outermost message (64 MiB).
///
/// [`compute_size`] reports −1 for any record that would exceed this, and the
/// decoder rejects length-delimited payloads that could not fit under it.
pub const MAX_SERIALIZED_SIZE: u32 = 64 << 20;

/// Maximum message nesting depth enforced on parse.
///
/// The encoder does not enforce this bound; a record nested deeper than this
/// will serialize, but conformant parsers (including this one) reject it.
pub const MAX_NESTING_DEPTH: u32 = 100;
