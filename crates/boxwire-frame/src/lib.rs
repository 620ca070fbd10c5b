//! Schema-driven length-prefixed frame codec.
//!
//! Every frame is a fixed-width header followed by an opaque payload. The
//! header layout is a [`FrameKind`]: an ordered list of integer fields, one
//! byte order, and a verification rule. Exactly one field is a computed
//! length, either `packet_len` (header + payload) or `body_len` (payload
//! only), which lets a receiver know how many bytes to wait for.
//!
//! [`Frame::try_parse`] takes one frame off the front of a buffer and
//! reports [`ParseOutcome::Incomplete`], [`ParseOutcome::Complete`] with the
//! number of bytes used, or a framing error. It never blocks and never
//! consumes the caller's buffer.

pub mod config;
pub mod error;
pub mod field;
pub mod frame;
pub mod header;
pub mod kind;
pub mod outcome;
pub mod reader;
pub mod verify;
pub mod writer;

#[cfg(feature = "async")]
pub mod codec;

#[cfg(feature = "async")]
pub use codec::BoxCodec;
pub use config::KindSpec;
pub use error::{FrameError, Result};
pub use field::{ByteOrder, FieldSpec, FieldType, LengthField, BODY_LEN, MAGIC, PACKET_LEN};
pub use frame::Frame;
pub use header::{decode_header, encode_header, Header};
pub use kind::{FrameKind, FrameKindBuilder, DEFAULT_MAX_FRAME_LEN, REFERENCE_MAGIC};
pub use outcome::ParseOutcome;
pub use reader::FrameReader;
pub use verify::{AcceptAll, HeaderVerifier, MagicVerifier};
pub use writer::FrameWriter;
