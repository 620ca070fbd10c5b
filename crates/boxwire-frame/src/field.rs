//! Header field descriptors.
//!
//! A header is an ordered list of fixed-width integer fields. Every value is
//! carried as `i64` in memory and range-checked against its [`FieldType`]
//! before it reaches the wire.

use std::fmt;

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

/// Name of the computed field holding the total frame length.
pub const PACKET_LEN: &str = "packet_len";

/// Name of the computed field holding the payload length.
pub const BODY_LEN: &str = "body_len";

/// Name of the field checked by the default verifier.
pub const MAGIC: &str = "magic";

/// Fixed-width integer encodings available to header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
}

impl FieldType {
    /// Encoded width in bytes.
    pub const fn width(self) -> usize {
        match self {
            FieldType::I8 | FieldType::U8 => 1,
            FieldType::I16 | FieldType::U16 => 2,
            FieldType::I32 | FieldType::U32 => 4,
            FieldType::I64 => 8,
        }
    }

    /// Smallest representable value.
    pub const fn min(self) -> i64 {
        match self {
            FieldType::I8 => i8::MIN as i64,
            FieldType::I16 => i16::MIN as i64,
            FieldType::I32 => i32::MIN as i64,
            FieldType::I64 => i64::MIN,
            FieldType::U8 | FieldType::U16 | FieldType::U32 => 0,
        }
    }

    /// Largest representable value.
    pub const fn max(self) -> i64 {
        match self {
            FieldType::I8 => i8::MAX as i64,
            FieldType::U8 => u8::MAX as i64,
            FieldType::I16 => i16::MAX as i64,
            FieldType::U16 => u16::MAX as i64,
            FieldType::I32 => i32::MAX as i64,
            FieldType::U32 => u32::MAX as i64,
            FieldType::I64 => i64::MAX,
        }
    }

    /// Returns true if `value` fits this encoding.
    pub const fn contains(self, value: i64) -> bool {
        value >= self.min() && value <= self.max()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            FieldType::I8 => "i8",
            FieldType::U8 => "u8",
            FieldType::I16 => "i16",
            FieldType::U16 => "u16",
            FieldType::I32 => "i32",
            FieldType::U32 => "u32",
            FieldType::I64 => "i64",
        }
    }

    // Callers range-check first; the casts below only drop bits that are
    // already known to be zero (or sign copies).
    pub(crate) fn put(self, value: i64, order: ByteOrder, dst: &mut impl BufMut) {
        match (self, order) {
            (FieldType::I8, _) => dst.put_i8(value as i8),
            (FieldType::U8, _) => dst.put_u8(value as u8),
            (FieldType::I16, ByteOrder::Big) => dst.put_i16(value as i16),
            (FieldType::I16, ByteOrder::Little) => dst.put_i16_le(value as i16),
            (FieldType::U16, ByteOrder::Big) => dst.put_u16(value as u16),
            (FieldType::U16, ByteOrder::Little) => dst.put_u16_le(value as u16),
            (FieldType::I32, ByteOrder::Big) => dst.put_i32(value as i32),
            (FieldType::I32, ByteOrder::Little) => dst.put_i32_le(value as i32),
            (FieldType::U32, ByteOrder::Big) => dst.put_u32(value as u32),
            (FieldType::U32, ByteOrder::Little) => dst.put_u32_le(value as u32),
            (FieldType::I64, ByteOrder::Big) => dst.put_i64(value),
            (FieldType::I64, ByteOrder::Little) => dst.put_i64_le(value),
        }
    }

    /// Reads one value; `src` must hold at least `self.width()` bytes.
    pub(crate) fn get(self, order: ByteOrder, src: &mut impl Buf) -> i64 {
        match (self, order) {
            (FieldType::I8, _) => i64::from(src.get_i8()),
            (FieldType::U8, _) => i64::from(src.get_u8()),
            (FieldType::I16, ByteOrder::Big) => i64::from(src.get_i16()),
            (FieldType::I16, ByteOrder::Little) => i64::from(src.get_i16_le()),
            (FieldType::U16, ByteOrder::Big) => i64::from(src.get_u16()),
            (FieldType::U16, ByteOrder::Little) => i64::from(src.get_u16_le()),
            (FieldType::I32, ByteOrder::Big) => i64::from(src.get_i32()),
            (FieldType::I32, ByteOrder::Little) => i64::from(src.get_i32_le()),
            (FieldType::U32, ByteOrder::Big) => i64::from(src.get_u32()),
            (FieldType::U32, ByteOrder::Little) => i64::from(src.get_u32_le()),
            (FieldType::I64, ByteOrder::Big) => src.get_i64(),
            (FieldType::I64, ByteOrder::Little) => src.get_i64_le(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Byte order used for every field of a frame kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Network byte order.
    #[default]
    #[serde(alias = "network")]
    Big,
    Little,
}

/// One `(name, type, default)` entry of a header layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: FieldType,
    #[serde(default)]
    pub default: i64,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: FieldType, default: i64) -> Self {
        Self {
            name: name.into(),
            ty,
            default,
        }
    }
}

/// The computed length field a frame kind carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthField {
    /// Header plus payload length.
    PacketLen,
    /// Payload length only.
    BodyLen,
}

impl LengthField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            PACKET_LEN => Some(LengthField::PacketLen),
            BODY_LEN => Some(LengthField::BodyLen),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            LengthField::PacketLen => PACKET_LEN,
            LengthField::BodyLen => BODY_LEN,
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;

    use super::*;

    #[test]
    fn widths_and_ranges() {
        assert_eq!(FieldType::I8.width(), 1);
        assert_eq!(FieldType::U16.width(), 2);
        assert_eq!(FieldType::I32.width(), 4);
        assert_eq!(FieldType::I64.width(), 8);

        assert!(FieldType::U8.contains(255));
        assert!(!FieldType::U8.contains(256));
        assert!(!FieldType::U32.contains(-1));
        assert!(FieldType::I16.contains(-32_768));
        assert!(!FieldType::I16.contains(32_768));
        assert!(FieldType::I64.contains(i64::MIN));
    }

    #[test]
    fn put_respects_byte_order() {
        let mut big = BytesMut::new();
        FieldType::U32.put(0x0102_0304, ByteOrder::Big, &mut big);
        assert_eq!(big.as_ref(), &[1, 2, 3, 4]);

        let mut little = BytesMut::new();
        FieldType::U32.put(0x0102_0304, ByteOrder::Little, &mut little);
        assert_eq!(little.as_ref(), &[4, 3, 2, 1]);
    }

    #[test]
    fn get_sign_extends_signed_types() {
        let mut src: &[u8] = &[0xFF, 0xFE];
        assert_eq!(FieldType::I16.get(ByteOrder::Big, &mut src), -2);

        let mut src: &[u8] = &[0xFF, 0xFE];
        assert_eq!(FieldType::U16.get(ByteOrder::Big, &mut src), 0xFFFE);

        let mut src: &[u8] = &[0xFE, 0xFF];
        assert_eq!(FieldType::I16.get(ByteOrder::Little, &mut src), -2);
    }

    #[test]
    fn field_spec_deserializes_with_type_key() {
        let spec: FieldSpec =
            serde_json::from_str(r#"{"name":"cmd","type":"u16"}"#).unwrap();
        assert_eq!(spec, FieldSpec::new("cmd", FieldType::U16, 0));
    }

    #[test]
    fn byte_order_accepts_network_alias() {
        let order: ByteOrder = serde_json::from_str(r#""network""#).unwrap();
        assert_eq!(order, ByteOrder::Big);
    }

    #[test]
    fn length_field_names() {
        assert_eq!(LengthField::from_name("packet_len"), Some(LengthField::PacketLen));
        assert_eq!(LengthField::from_name("body_len"), Some(LengthField::BodyLen));
        assert_eq!(LengthField::from_name("cmd"), None);
    }
}
