//! Frame kinds: immutable header schemas shared by every frame of a protocol.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use crate::error::{FrameError, Result};
use crate::field::{ByteOrder, FieldSpec, FieldType, LengthField, MAGIC};
use crate::frame::Frame;
use crate::header::{decode_header, Header};
use crate::outcome::ParseOutcome;
use crate::verify::{AcceptAll, HeaderVerifier, MagicVerifier};

/// Default upper bound for a single frame: 16 MiB.
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Magic value of the reference kind.
pub const REFERENCE_MAGIC: i64 = 0x1234_5678;

/// Correlation fields used when none are configured explicitly.
pub const DEFAULT_CORRELATION_FIELDS: [&str; 2] = ["cmd", "sn"];

static REFERENCE: LazyLock<FrameKind> = LazyLock::new(|| {
    FrameKind::builder()
        .field("magic", FieldType::I32, REFERENCE_MAGIC)
        .field("version", FieldType::I16, 0)
        .field("flag", FieldType::I16, 0)
        .field("packet_len", FieldType::I32, 0)
        .field("cmd", FieldType::I32, 0)
        .field("ret", FieldType::I32, 0)
        .field("sn", FieldType::I32, 0)
        .build()
        .expect("reference frame kind is well-formed")
});

/// Immutable header schema, byte order and verification rule.
///
/// Cloning is cheap; clones share the same schema and compare equal.
#[derive(Clone)]
pub struct FrameKind {
    inner: Arc<KindInner>,
}

struct KindInner {
    fields: Vec<FieldSpec>,
    offsets: Vec<usize>,
    index: HashMap<String, usize>,
    header_len: usize,
    byte_order: ByteOrder,
    length_field: LengthField,
    length_index: usize,
    correlation: Vec<usize>,
    verifier: Box<dyn HeaderVerifier>,
    max_frame_len: Option<usize>,
}

impl FrameKind {
    pub fn builder() -> FrameKindBuilder {
        FrameKindBuilder::new()
    }

    /// `magic:i32, version:i16, flag:i16, packet_len:i32, cmd:i32, ret:i32, sn:i32`,
    /// network byte order, magic `0x12345678`.
    pub fn reference() -> FrameKind {
        REFERENCE.clone()
    }

    /// A new frame of this kind with every field at its default.
    pub fn frame(&self) -> Frame {
        Frame::new(self)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.inner.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.index_of(name).map(|idx| &self.inner.fields[idx])
    }

    /// Byte offset of the named field within the header.
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.index_of(name).map(|idx| self.inner.offsets[idx])
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.inner.index.get(name).copied()
    }

    /// Encoded header size in bytes.
    pub fn header_len(&self) -> usize {
        self.inner.header_len
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.inner.byte_order
    }

    pub fn length_field(&self) -> LengthField {
        self.inner.length_field
    }

    pub(crate) fn length_index(&self) -> usize {
        self.inner.length_index
    }

    pub fn max_frame_len(&self) -> Option<usize> {
        self.inner.max_frame_len
    }

    /// Names of the fields copied by [`Frame::map`].
    pub fn correlation_fields(&self) -> impl Iterator<Item = &str> + '_ {
        self.inner
            .correlation
            .iter()
            .map(|&idx| self.inner.fields[idx].name.as_str())
    }

    pub(crate) fn correlation_indices(&self) -> &[usize] {
        &self.inner.correlation
    }

    /// Initial stored values; the computed slot is always zero.
    pub(crate) fn defaults(&self) -> Vec<i64> {
        let mut values: Vec<i64> = self.inner.fields.iter().map(|f| f.default).collect();
        values[self.inner.length_index] = 0;
        values
    }

    /// Run the kind's verifier over a decoded header.
    pub fn verify(&self, header: &Header<'_>) -> Result<()> {
        self.inner
            .verifier
            .verify(header)
            .map_err(FrameError::Verification)
    }

    /// Total frame length (header + payload) announced by `header`.
    pub fn frame_len(&self, header: &Header<'_>) -> Result<usize> {
        let header_len = self.inner.header_len;
        let raw = header.values()[self.inner.length_index];
        let announced = usize::try_from(raw).map_err(|_| {
            FrameError::Decode(format!(
                "negative {} value {raw}",
                self.inner.length_field.name()
            ))
        })?;

        match self.inner.length_field {
            LengthField::PacketLen => {
                if announced < header_len {
                    return Err(FrameError::Decode(format!(
                        "packet_len {announced} is smaller than the {header_len}-byte header"
                    )));
                }
                Ok(announced)
            }
            LengthField::BodyLen => header_len.checked_add(announced).ok_or_else(|| {
                FrameError::Decode(format!("body_len {announced} overflows frame length"))
            }),
        }
    }

    /// Locate one complete frame at the front of `buf`.
    ///
    /// `Ok(None)` means more bytes are needed. As soon as the header is
    /// available its length is resolved, then it is verified, then the
    /// length is checked against the limit, so a corrupt stream is rejected
    /// before its payload arrives.
    pub(crate) fn resolve<'k>(&'k self, buf: &[u8]) -> Result<Option<(Header<'k>, usize)>> {
        if buf.len() < self.inner.header_len {
            return Ok(None);
        }

        let (header, _) = decode_header(self, buf)?;
        let total = self.frame_len(&header)?;
        self.verify(&header)?;

        if let Some(max) = self.inner.max_frame_len {
            if total > max {
                return Err(FrameError::FrameTooLarge { size: total, max });
            }
        }

        if buf.len() < total {
            return Ok(None);
        }
        Ok(Some((header, total)))
    }

    /// Validate the frame at the front of `buf` without building it.
    pub fn check(&self, buf: &[u8]) -> ParseOutcome {
        self.resolve(buf)
            .map(|found| found.map(|(_, total)| total))
            .into()
    }

    /// Parse one frame from the front of `buf`.
    ///
    /// Returns the frame and the number of bytes it occupies, or `None` if
    /// the buffer does not hold a complete frame yet.
    pub fn parse(&self, buf: &[u8]) -> Result<Option<(Frame, usize)>> {
        let mut frame = self.frame();
        match frame.unpack(buf) {
            ParseOutcome::Complete(used) => Ok(Some((frame, used))),
            ParseOutcome::Incomplete => Ok(None),
            ParseOutcome::Error(err) => Err(err),
        }
    }

    /// True if both handles share the same schema.
    pub fn same_kind(&self, other: &FrameKind) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl PartialEq for FrameKind {
    fn eq(&self, other: &Self) -> bool {
        self.same_kind(other)
    }
}

impl Eq for FrameKind {}

impl fmt::Debug for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameKind")
            .field("fields", &self.inner.fields)
            .field("header_len", &self.inner.header_len)
            .field("byte_order", &self.inner.byte_order)
            .field("length_field", &self.inner.length_field)
            .field("max_frame_len", &self.inner.max_frame_len)
            .finish_non_exhaustive()
    }
}

/// Builder for [`FrameKind`]. All validation happens in [`build`](Self::build).
pub struct FrameKindBuilder {
    fields: Vec<FieldSpec>,
    byte_order: ByteOrder,
    verifier: Option<Box<dyn HeaderVerifier>>,
    correlate: Option<Vec<String>>,
    max_frame_len: Option<usize>,
}

impl FrameKindBuilder {
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            byte_order: ByteOrder::default(),
            verifier: None,
            correlate: None,
            max_frame_len: Some(DEFAULT_MAX_FRAME_LEN),
        }
    }

    /// Append a header field.
    pub fn field(mut self, name: impl Into<String>, ty: FieldType, default: i64) -> Self {
        self.fields.push(FieldSpec::new(name, ty, default));
        self
    }

    /// Append several header fields.
    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(fields);
        self
    }

    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    /// Replace the default verifier.
    ///
    /// Without this, kinds with a `magic` field check it against that
    /// field's default and all other kinds accept every header.
    pub fn verifier(mut self, verifier: impl HeaderVerifier + 'static) -> Self {
        self.verifier = Some(Box::new(verifier));
        self
    }

    /// Fields copied from a request into its response by [`Frame::map`].
    pub fn correlate<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.correlate = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Upper bound on a frame's total length; `None` disables the check.
    pub fn max_frame_len(mut self, max: Option<usize>) -> Self {
        self.max_frame_len = max;
        self
    }

    pub fn build(self) -> Result<FrameKind> {
        if self.fields.is_empty() {
            return Err(FrameError::Schema("frame kind has no header fields".into()));
        }

        let mut index = HashMap::with_capacity(self.fields.len());
        let mut offsets = Vec::with_capacity(self.fields.len());
        let mut header_len = 0usize;
        let mut length: Option<(LengthField, usize)> = None;

        for (idx, field) in self.fields.iter().enumerate() {
            if field.name.is_empty() {
                return Err(FrameError::Schema(format!("field #{idx} has an empty name")));
            }
            if index.insert(field.name.clone(), idx).is_some() {
                return Err(FrameError::Schema(format!(
                    "duplicate header field `{}`",
                    field.name
                )));
            }
            if !field.ty.contains(field.default) {
                return Err(FrameError::Schema(format!(
                    "default {} does not fit {} field `{}`",
                    field.default, field.ty, field.name
                )));
            }
            if let Some(kind) = LengthField::from_name(&field.name) {
                if let Some((existing, _)) = length {
                    return Err(FrameError::Schema(format!(
                        "ambiguous length: both `{}` and `{}` are defined",
                        existing.name(),
                        kind.name()
                    )));
                }
                length = Some((kind, idx));
            }

            offsets.push(header_len);
            header_len += field.ty.width();
        }

        let Some((length_field, length_index)) = length else {
            return Err(FrameError::Schema(
                "frame kind must define `packet_len` or `body_len`".into(),
            ));
        };

        if length_field == LengthField::PacketLen {
            let ty = self.fields[length_index].ty;
            let fits = i64::try_from(header_len).is_ok_and(|len| ty.contains(len));
            if !fits {
                return Err(FrameError::Schema(format!(
                    "{ty} `packet_len` cannot hold the {header_len}-byte header"
                )));
            }
        }

        let correlation = match self.correlate {
            Some(names) => names
                .iter()
                .map(|name| match index.get(name.as_str()) {
                    Some(&idx) if idx == length_index => Err(FrameError::Schema(format!(
                        "computed field `{name}` cannot be a correlation field"
                    ))),
                    Some(&idx) => Ok(idx),
                    None => Err(FrameError::Schema(format!(
                        "correlation field `{name}` is not in the schema"
                    ))),
                })
                .collect::<Result<Vec<_>>>()?,
            None => DEFAULT_CORRELATION_FIELDS
                .iter()
                .filter_map(|name| index.get(*name).copied())
                .collect(),
        };

        let verifier: Box<dyn HeaderVerifier> = match self.verifier {
            Some(verifier) => verifier,
            None => match index.get(MAGIC) {
                Some(&idx) => Box::new(MagicVerifier::new(self.fields[idx].default)),
                None => Box::new(AcceptAll),
            },
        };

        Ok(FrameKind {
            inner: Arc::new(KindInner {
                fields: self.fields,
                offsets,
                index,
                header_len,
                byte_order: self.byte_order,
                length_field,
                length_index,
                correlation,
                verifier,
                max_frame_len: self.max_frame_len,
            }),
        })
    }
}

impl Default for FrameKindBuilder {
    fn default() -> Self {
        Self::new()
    }
}
