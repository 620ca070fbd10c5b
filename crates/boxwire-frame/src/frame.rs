use std::fmt;

use bytes::{Bytes, BytesMut};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::error::{FrameError, Result};
use crate::field::LengthField;
use crate::header::encode_header;
use crate::kind::FrameKind;
use crate::outcome::ParseOutcome;

/// One header plus opaque payload of a given [`FrameKind`].
///
/// Wire format:
/// ```text
/// ┌──────────┬──────────┬─────┬──────────┬─────────────────────────┐
/// │ field 1  │ field 2  │ ... │ field n  │ Payload                 │
/// │ (fixed)  │ (fixed)  │     │ (fixed)  │ (body_len or            │
/// │          │          │     │          │  packet_len - header)   │
/// └──────────┴──────────┴─────┴──────────┴─────────────────────────┘
/// ```
///
/// The kind's `packet_len`/`body_len` field is computed from the payload
/// when packing and can not be set.
#[derive(Clone)]
pub struct Frame {
    kind: FrameKind,
    values: Vec<i64>,
    payload: Bytes,
}

impl Frame {
    /// A frame with every field at its schema default and an empty payload.
    pub fn new(kind: &FrameKind) -> Self {
        Self {
            kind: kind.clone(),
            values: kind.defaults(),
            payload: Bytes::new(),
        }
    }

    /// A frame with the given fields set on top of the defaults.
    pub fn with_fields(kind: &FrameKind, fields: &[(&str, i64)]) -> Result<Self> {
        let mut frame = Self::new(kind);
        for &(name, value) in fields {
            frame.set(name, value)?;
        }
        Ok(frame)
    }

    /// Builder-style payload assignment.
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    pub fn kind(&self) -> &FrameKind {
        &self.kind
    }

    /// Current value of a field.
    ///
    /// The computed length field reports the value it would be packed with.
    pub fn get(&self, name: &str) -> Option<i64> {
        let idx = self.kind.index_of(name)?;
        if idx == self.kind.length_index() {
            return Some(self.length_value());
        }
        Some(self.values[idx])
    }

    /// Set a header field.
    ///
    /// Writes to the computed length field are ignored.
    pub fn set(&mut self, name: &str, value: i64) -> Result<()> {
        let idx = self
            .kind
            .index_of(name)
            .ok_or_else(|| FrameError::UnknownField(name.to_string()))?;
        if idx == self.kind.length_index() {
            return Ok(());
        }

        let field = &self.kind.fields()[idx];
        if !field.ty.contains(value) {
            return Err(FrameError::FieldRange {
                field: field.name.clone(),
                value,
                ty: field.ty,
            });
        }
        self.values[idx] = value;
        Ok(())
    }

    /// `(name, value)` pairs in schema order, computed field included.
    pub fn fields(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.kind
            .fields()
            .iter()
            .enumerate()
            .map(|(idx, field)| {
                let value = if idx == self.kind.length_index() {
                    self.length_value()
                } else {
                    self.values[idx]
                };
                (field.name.as_str(), value)
            })
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn set_payload(&mut self, payload: impl Into<Bytes>) {
        self.payload = payload.into();
    }

    pub fn clear_payload(&mut self) {
        self.payload = Bytes::new();
    }

    /// Encoded header size in bytes.
    pub fn header_len(&self) -> usize {
        self.kind.header_len()
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        self.kind.header_len() + self.payload.len()
    }

    fn length_value(&self) -> i64 {
        let len = match self.kind.length_field() {
            LengthField::PacketLen => self.wire_size(),
            LengthField::BodyLen => self.payload.len(),
        };
        i64::try_from(len).unwrap_or(i64::MAX)
    }

    /// Encode the frame into its wire format.
    pub fn pack(&self) -> Result<Bytes> {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        self.pack_into(&mut dst)?;
        Ok(dst.freeze())
    }

    /// Append the encoded frame to `dst`.
    ///
    /// On error nothing is appended.
    pub fn pack_into(&self, dst: &mut BytesMut) -> Result<()> {
        let size = self.wire_size();
        if let Some(max) = self.kind.max_frame_len() {
            if size > max {
                return Err(FrameError::FrameTooLarge { size, max });
            }
        }

        let mut values = self.values.clone();
        values[self.kind.length_index()] = self.length_value();

        dst.reserve(size);
        encode_header(&self.kind, &values, dst)?;
        dst.extend_from_slice(&self.payload);
        Ok(())
    }

    /// Try to take one frame off the front of `buf`.
    ///
    /// With `apply` the header fields and payload are replaced by the parsed
    /// frame on [`ParseOutcome::Complete`]; otherwise `self` is left as is.
    /// `self` is never modified on any other outcome. Bytes past the
    /// returned length belong to the next frame.
    pub fn try_parse(&mut self, buf: &[u8], apply: bool) -> ParseOutcome {
        match self.kind.resolve(buf) {
            Ok(Some((header, used))) => {
                trace!(used, buffered = buf.len(), "frame complete");
                if apply {
                    let header_len = self.kind.header_len();
                    let mut values = header.into_values();
                    values[self.kind.length_index()] = 0;
                    self.values = values;
                    self.payload = Bytes::copy_from_slice(&buf[header_len..used]);
                }
                ParseOutcome::Complete(used)
            }
            Ok(None) => {
                trace!(buffered = buf.len(), "frame incomplete");
                ParseOutcome::Incomplete
            }
            Err(err) => {
                debug!(code = err.code(), error = %err, "frame rejected");
                ParseOutcome::Error(err)
            }
        }
    }

    /// Parse the frame at the front of `buf` into `self`.
    pub fn unpack(&mut self, buf: &[u8]) -> ParseOutcome {
        self.try_parse(buf, true)
    }

    /// Validate the frame at the front of `buf` without touching `self`.
    pub fn check(&self, buf: &[u8]) -> ParseOutcome {
        self.kind.check(buf)
    }

    /// Build a response carrying this frame's correlation fields.
    ///
    /// The new frame starts from schema defaults, copies the kind's
    /// correlation fields (by default `cmd` and `sn`) and then applies
    /// `overrides`. Its payload is empty. `self` is not modified.
    pub fn map(&self, overrides: &[(&str, i64)]) -> Result<Frame> {
        let mut mapped = Frame::new(&self.kind);
        for &idx in self.kind.correlation_indices() {
            mapped.values[idx] = self.values[idx];
        }
        for &(name, value) in overrides {
            mapped.set(name, value)?;
        }
        Ok(mapped)
    }

    /// Decode the payload as JSON. `None` if the payload is empty.
    pub fn payload_json(&self) -> Result<Option<Value>> {
        if self.payload.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&self.payload)
            .map(Some)
            .map_err(FrameError::PayloadDecode)
    }

    /// Store `value` as compact JSON text.
    ///
    /// Empty values (`null`, `false`, `0`, `""`, `[]`, `{}`) clear the payload.
    pub fn set_payload_json(&mut self, value: &Value) -> Result<()> {
        if is_empty_value(value) {
            self.clear_payload();
            return Ok(());
        }
        let encoded = serde_json::to_vec(value).map_err(FrameError::PayloadEncode)?;
        self.payload = Bytes::from(encoded);
        Ok(())
    }

    /// Decode the payload as JSON into `T`. `None` if the payload is empty.
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        if self.payload.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&self.payload)
            .map(Some)
            .map_err(FrameError::PayloadDecode)
    }

    /// Serialize `value` into the payload, with the same emptiness rule as
    /// [`set_payload_json`](Self::set_payload_json).
    pub fn set_payload_from<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<()> {
        let value = serde_json::to_value(value).map_err(FrameError::PayloadEncode)?;
        self.set_payload_json(&value)
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.values == other.values && self.payload == other.payload
    }
}

impl Eq for Frame {}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = f.debug_struct("Frame");
        for (name, value) in self.fields() {
            dbg.field(name, &value);
        }
        dbg.field("payload", &format_args!("<{} bytes>", self.payload.len()))
            .finish()
    }
}
