use std::io::{IsTerminal, Write};

use boxwire_frame::{Frame, FrameKind, LengthField, MAGIC};
use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
pub struct FieldOutput<'a> {
    pub name: &'a str,
    pub value: i64,
}

#[derive(Serialize)]
pub struct FrameOutput<'a> {
    pub offset: usize,
    pub size: usize,
    pub fields: Vec<FieldOutput<'a>>,
    pub payload_size: usize,
    pub payload: String,
    pub payload_hex: String,
    #[serde(skip)]
    pub raw: &'a [u8],
}

impl<'a> FrameOutput<'a> {
    pub fn new(frame: &'a Frame, offset: usize) -> Self {
        Self {
            offset,
            size: frame.wire_size(),
            fields: frame
                .fields()
                .map(|(name, value)| FieldOutput { name, value })
                .collect(),
            payload_size: frame.payload().len(),
            payload: payload_preview(frame),
            payload_hex: hex::encode(frame.payload()),
            raw: frame.payload().as_ref(),
        }
    }
}

pub fn print_frame(out: &FrameOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "VALUE"]);
            for field in &out.fields {
                table.add_row(vec![field.name.to_string(), field.value.to_string()]);
            }
            table.add_row(vec![
                format!("payload ({} bytes)", out.payload_size),
                out.payload.clone(),
            ]);
            println!("frame @{} ({} bytes)", out.offset, out.size);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let fields = out
                .fields
                .iter()
                .map(|f| format!("{}={}", f.name, f.value))
                .collect::<Vec<_>>()
                .join(" ");
            println!(
                "offset={} size={} {} payload={}",
                out.offset, out.size, fields, out.payload
            );
        }
        OutputFormat::Raw => print_raw(out.raw),
    }
}

#[derive(Serialize)]
pub struct SchemaField<'a> {
    pub name: &'a str,
    #[serde(rename = "type")]
    pub ty: &'static str,
    pub offset: usize,
    pub width: usize,
    pub default: i64,
    pub role: &'static str,
}

#[derive(Serialize)]
pub struct SchemaOutput<'a> {
    pub header_len: usize,
    pub byte_order: &'static str,
    pub max_frame_len: Option<usize>,
    pub fields: Vec<SchemaField<'a>>,
}

impl<'a> SchemaOutput<'a> {
    pub fn new(kind: &'a FrameKind) -> Self {
        let correlated: Vec<&str> = kind.correlation_fields().collect();
        let length_name = kind.length_field().name();
        let fields = kind
            .fields()
            .iter()
            .map(|field| {
                let role = if field.name == length_name {
                    match kind.length_field() {
                        LengthField::PacketLen => "length (header + payload)",
                        LengthField::BodyLen => "length (payload)",
                    }
                } else if field.name == MAGIC {
                    "magic"
                } else if correlated.contains(&field.name.as_str()) {
                    "correlation"
                } else {
                    ""
                };
                SchemaField {
                    name: &field.name,
                    ty: field.ty.as_str(),
                    offset: kind.offset_of(&field.name).unwrap_or_default(),
                    width: field.ty.width(),
                    default: field.default,
                    role,
                }
            })
            .collect();

        Self {
            header_len: kind.header_len(),
            byte_order: match kind.byte_order() {
                boxwire_frame::ByteOrder::Big => "big",
                boxwire_frame::ByteOrder::Little => "little",
            },
            max_frame_len: kind.max_frame_len(),
            fields,
        }
    }
}

pub fn print_schema(out: &SchemaOutput<'_>, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(out),
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["FIELD", "TYPE", "OFFSET", "WIDTH", "DEFAULT", "ROLE"]);
            for f in &out.fields {
                table.add_row(vec![
                    f.name.to_string(),
                    f.ty.to_string(),
                    f.offset.to_string(),
                    f.width.to_string(),
                    f.default.to_string(),
                    f.role.to_string(),
                ]);
            }
            println!("{table}");
            println!("header: {} bytes, {} endian", out.header_len, out.byte_order);
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for f in &out.fields {
                println!("{}:{}@{} = {}", f.name, f.ty, f.offset, f.default);
            }
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(frame: &Frame) -> String {
    if let Ok(Some(value)) = frame.payload_json() {
        return value.to_string();
    }
    match std::str::from_utf8(frame.payload()) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", frame.payload().len()),
    }
}
