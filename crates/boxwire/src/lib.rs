//! Length-prefixed binary frame codec with pluggable header schemas.
//!
//! boxwire frames a byte stream into header + payload units. The header is a
//! fixed list of integer fields described by a [`FrameKind`]; one of them is a
//! computed length so a receiver can reassemble frames from arbitrary chunks.
//!
//! # Crate Structure
//!
//! - [`frame`]: the codec (kinds, frames, stream reassembly, adapters)
//!
//! The `boxwire` binary (behind the `cli` feature) packs, decodes and checks
//! hex-encoded buffers for debugging protocols built on the codec.

/// Re-export frame types.
pub mod frame {
    pub use boxwire_frame::*;
}

pub use boxwire_frame::{
    ByteOrder, FieldSpec, FieldType, Frame, FrameError, FrameKind, FrameKindBuilder,
    FrameReader, FrameWriter, HeaderVerifier, KindSpec, ParseOutcome, Result,
};

#[cfg(feature = "async")]
pub use boxwire_frame::BoxCodec;
