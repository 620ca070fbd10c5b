use std::io::Read;
use std::path::{Path, PathBuf};

use boxwire_frame::{FrameKind, KindSpec};
use clap::{Args, Subcommand};
use tracing::debug;

use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID};
use crate::output::OutputFormat;

pub mod check;
pub mod decode;
pub mod pack;
pub mod schema;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the header layout of the frame kind.
    Schema(SchemaArgs),
    /// Build a frame and print it as hex.
    Pack(PackArgs),
    /// Decode every complete frame in a hex buffer.
    Decode(DecodeArgs),
    /// Report the parse outcome for the frame at the front of a hex buffer.
    Check(CheckArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, kind_path: Option<&Path>, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Schema(args) => schema::run(args, &load_kind(kind_path)?, format),
        Command::Pack(args) => pack::run(args, &load_kind(kind_path)?, format),
        Command::Decode(args) => decode::run(args, &load_kind(kind_path)?, format),
        Command::Check(args) => check::run(args, &load_kind(kind_path)?, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Default)]
pub struct SchemaArgs {}

#[derive(Args, Debug)]
pub struct PackArgs {
    /// Header field assignment, e.g. `cmd=7` or `sn=0x2a`. Repeatable.
    #[arg(long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, i64)>,
    /// JSON payload.
    #[arg(long, conflicts_with_all = ["data", "file"])]
    pub json: Option<String>,
    /// Raw string payload.
    #[arg(long, conflicts_with_all = ["json", "file"])]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with_all = ["json", "data"])]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Hex-encoded buffer. Read from stdin when omitted.
    pub hex: Option<String>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Hex-encoded buffer. Read from stdin when omitted.
    pub hex: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn load_kind(path: Option<&Path>) -> CliResult<FrameKind> {
    let Some(path) = path else {
        return Ok(FrameKind::reference());
    };

    let text = std::fs::read_to_string(path)
        .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
    let kind = KindSpec::from_json(&text)
        .and_then(KindSpec::into_kind)
        .map_err(|err| frame_error(&format!("invalid kind {}", path.display()), err))?;

    debug!(path = %path.display(), header_len = kind.header_len(), "loaded frame kind");
    Ok(kind)
}

/// Decode a hex buffer given on the command line or on stdin.
///
/// Whitespace is ignored so `xxd -p` output can be piped in directly.
pub(crate) fn read_hex_input(arg: Option<String>) -> CliResult<Vec<u8>> {
    let text = match arg {
        Some(text) => text,
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| io_error("failed reading stdin", err))?;
            text
        }
    };
    decode_hex(&text)
}

fn decode_hex(text: &str) -> CliResult<Vec<u8>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    let compact = compact
        .strip_prefix("0x")
        .or_else(|| compact.strip_prefix("0X"))
        .unwrap_or(&compact);
    hex::decode(compact).map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex input: {err}")))
}

fn parse_assignment(input: &str) -> Result<(String, i64), String> {
    let (name, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{input}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in `{input}`"));
    }
    Ok((name.to_string(), parse_int(value.trim())?))
}

fn parse_int(text: &str) -> Result<i64, String> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let (radix, digits) = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex_digits) => (16, hex_digits),
        None => (10, digits),
    };
    // The std parsers accept their own sign; only one leading `-` is allowed.
    if digits.starts_with(['+', '-']) {
        return Err(format!("invalid integer `{text}`: unexpected sign"));
    }
    let magnitude = i128::from_str_radix(digits, radix)
        .map_err(|err| format!("invalid integer `{text}`: {err}"))?;

    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).map_err(|_| format!("integer `{text}` does not fit in 64 bits"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_assignment_accepts_decimal_hex_and_negative() {
        assert_eq!(parse_assignment("cmd=7").unwrap(), ("cmd".to_string(), 7));
        assert_eq!(
            parse_assignment("magic=0x12345678").unwrap(),
            ("magic".to_string(), 0x1234_5678)
        );
        assert_eq!(parse_assignment("ret = -3").unwrap(), ("ret".to_string(), -3));
        assert_eq!(
            parse_assignment("x=-0x8000000000000000").unwrap(),
            ("x".to_string(), i64::MIN)
        );
    }

    #[test]
    fn parse_assignment_rejects_garbage() {
        assert!(parse_assignment("cmd").is_err());
        assert!(parse_assignment("=1").is_err());
        assert!(parse_assignment("cmd=seven").is_err());
        assert!(parse_assignment("cmd=0x10000000000000000").is_err());
    }

    #[test]
    fn parse_assignment_rejects_repeated_or_plus_sign() {
        assert!(parse_assignment("cmd=--5").is_err());
        assert!(parse_assignment("cmd=+5").is_err());
        assert!(parse_assignment("cmd=-+5").is_err());
        assert!(parse_assignment("cmd=0x-5").is_err());
        assert!(parse_assignment("cmd=-0x+5").is_err());
    }

    #[test]
    fn decode_hex_ignores_whitespace_and_prefix() {
        assert_eq!(decode_hex("0x12 34\n56").unwrap(), vec![0x12, 0x34, 0x56]);
        assert_eq!(decode_hex("").unwrap(), Vec::<u8>::new());
        assert_eq!(decode_hex("abc").unwrap_err().code, DATA_INVALID);
    }

    #[test]
    fn missing_kind_file_is_usage_error() {
        let err = load_kind(Some(Path::new("/nonexistent/boxwire-kind.json"))).unwrap_err();
        assert_eq!(err.code, crate::exit::USAGE);
    }
}
