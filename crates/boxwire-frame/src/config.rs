use serde::{Deserialize, Serialize};

use crate::error::{FrameError, Result};
use crate::field::{ByteOrder, FieldSpec};
use crate::kind::{FrameKind, DEFAULT_MAX_FRAME_LEN};

/// Serializable description of a frame kind, for loading kinds from files.
///
/// ```json
/// {
///   "byte_order": "big",
///   "max_frame_len": 65536,
///   "correlate": ["cmd", "sn"],
///   "fields": [
///     { "name": "magic", "type": "i32", "default": 305419896 },
///     { "name": "packet_len", "type": "i32" },
///     { "name": "cmd", "type": "i32" },
///     { "name": "sn", "type": "i32" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KindSpec {
    #[serde(default)]
    pub byte_order: ByteOrder,
    /// `null` disables the limit.
    #[serde(default = "default_max_frame_len")]
    pub max_frame_len: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlate: Option<Vec<String>>,
    pub fields: Vec<FieldSpec>,
}

fn default_max_frame_len() -> Option<usize> {
    Some(DEFAULT_MAX_FRAME_LEN)
}

impl KindSpec {
    /// Parse a kind description from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|err| FrameError::Schema(format!("invalid kind spec: {err}")))
    }

    /// Validate and build the kind. Uses the default verifier.
    pub fn into_kind(self) -> Result<FrameKind> {
        let mut builder = FrameKind::builder()
            .fields(self.fields)
            .byte_order(self.byte_order)
            .max_frame_len(self.max_frame_len);
        if let Some(names) = self.correlate {
            builder = builder.correlate(names);
        }
        builder.build()
    }

    /// Describe an existing kind.
    pub fn from_kind(kind: &FrameKind) -> Self {
        Self {
            byte_order: kind.byte_order(),
            max_frame_len: kind.max_frame_len(),
            correlate: Some(kind.correlation_fields().map(str::to_string).collect()),
            fields: kind.fields().to_vec(),
        }
    }
}
