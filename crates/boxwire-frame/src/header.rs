//! Fixed-width header encoding.
//!
//! Layout is the kind's fields in schema order, each at its own width, in
//! the kind's byte order. Nothing else is written: no padding, no tags.

use bytes::BufMut;

use crate::error::{FrameError, Result};
use crate::kind::FrameKind;

/// Header values decoded from (or about to be written to) the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header<'k> {
    kind: &'k FrameKind,
    values: Vec<i64>,
}

impl<'k> Header<'k> {
    /// Value of the named field, if the kind defines it.
    pub fn get(&self, name: &str) -> Option<i64> {
        self.kind.index_of(name).map(|idx| self.values[idx])
    }

    /// Values in schema order.
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// `(name, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> + '_ {
        self.kind
            .fields()
            .iter()
            .zip(self.values.iter().copied())
            .map(|(field, value)| (field.name.as_str(), value))
    }

    pub fn kind(&self) -> &'k FrameKind {
        self.kind
    }

    pub(crate) fn into_values(self) -> Vec<i64> {
        self.values
    }
}

/// Encode `values` (one per field, schema order) into `dst`.
///
/// Exactly `kind.header_len()` bytes are appended. All values are checked
/// before anything is written, so a range error leaves `dst` untouched.
pub fn encode_header(kind: &FrameKind, values: &[i64], dst: &mut impl BufMut) -> Result<()> {
    let fields = kind.fields();
    if values.len() != fields.len() {
        return Err(FrameError::Schema(format!(
            "expected {} header values, got {}",
            fields.len(),
            values.len()
        )));
    }

    for (field, &value) in fields.iter().zip(values) {
        if !field.ty.contains(value) {
            return Err(FrameError::FieldRange {
                field: field.name.clone(),
                value,
                ty: field.ty,
            });
        }
    }

    let order = kind.byte_order();
    for (field, &value) in fields.iter().zip(values) {
        field.ty.put(value, order, dst);
    }
    Ok(())
}

/// Decode the header at the front of `src`.
///
/// Returns the header and the number of bytes consumed, which is always
/// `kind.header_len()`. Fails if `src` is shorter than that.
pub fn decode_header<'k>(kind: &'k FrameKind, src: &[u8]) -> Result<(Header<'k>, usize)> {
    let header_len = kind.header_len();
    if src.len() < header_len {
        return Err(FrameError::Decode(format!(
            "need {header_len} header bytes, have {}",
            src.len()
        )));
    }

    let order = kind.byte_order();
    let mut cursor = &src[..header_len];
    let values = kind
        .fields()
        .iter()
        .map(|field| field.ty.get(order, &mut cursor))
        .collect();

    Ok((Header { kind, values }, header_len))
}
