use boxwire_frame::{Frame, FrameKind};
use serde::Serialize;
use tracing::debug;

use crate::cmd::PackArgs;
use crate::exit::{frame_error, io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_json, print_raw, OutputFormat};

#[derive(Serialize)]
struct PackOutput {
    len: usize,
    hex: String,
}

pub fn run(args: PackArgs, kind: &FrameKind, format: OutputFormat) -> CliResult<i32> {
    let wire = build(&args, kind)?;
    debug!(len = wire.len(), "packed frame");

    match format {
        OutputFormat::Json => print_json(&PackOutput {
            len: wire.len(),
            hex: hex::encode(&wire),
        }),
        OutputFormat::Raw => print_raw(&wire),
        OutputFormat::Table | OutputFormat::Pretty => println!("{}", hex::encode(&wire)),
    }

    Ok(SUCCESS)
}

fn build(args: &PackArgs, kind: &FrameKind) -> CliResult<Vec<u8>> {
    let assignments: Vec<(&str, i64)> = args
        .set
        .iter()
        .map(|(name, value)| (name.as_str(), *value))
        .collect();
    let mut frame =
        Frame::with_fields(kind, &assignments).map_err(|err| frame_error("invalid field", err))?;

    if let Some(json) = &args.json {
        let value: serde_json::Value = serde_json::from_str(json)
            .map_err(|err| CliError::new(USAGE, format!("invalid --json payload: {err}")))?;
        frame
            .set_payload_json(&value)
            .map_err(|err| frame_error("invalid --json payload", err))?;
    } else if let Some(data) = &args.data {
        frame.set_payload(data.clone().into_bytes());
    } else if let Some(path) = &args.file {
        let data = std::fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
        frame.set_payload(data);
    }

    frame
        .pack()
        .map(|wire| wire.to_vec())
        .map_err(|err| frame_error("failed packing frame", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(set: &[(&str, i64)]) -> PackArgs {
        PackArgs {
            set: set.iter().map(|(n, v)| (n.to_string(), *v)).collect(),
            json: None,
            data: None,
            file: None,
        }
    }

    #[test]
    fn builds_reference_frame_with_data_payload() {
        let kind = FrameKind::reference();
        let mut pack = args(&[("cmd", 7)]);
        pack.data = Some("hi".to_string());

        let wire = build(&pack, &kind).unwrap();
        assert_eq!(wire.len(), 28);
        let (frame, used) = kind.parse(&wire).unwrap().unwrap();
        assert_eq!(used, 28);
        assert_eq!(frame.get("cmd"), Some(7));
        assert_eq!(frame.payload().as_ref(), b"hi");
    }

    #[test]
    fn json_null_payload_is_empty() {
        let kind = FrameKind::reference();
        let mut pack = args(&[]);
        pack.json = Some("null".to_string());

        assert_eq!(build(&pack, &kind).unwrap().len(), kind.header_len());
    }

    #[test]
    fn unknown_field_is_usage_error() {
        let err = build(&args(&[("nope", 1)]), &FrameKind::reference()).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn out_of_range_value_is_usage_error() {
        let err = build(&args(&[("version", 70_000)]), &FrameKind::reference()).unwrap_err();
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn malformed_json_is_usage_error() {
        let mut pack = args(&[]);
        pack.json = Some("{not json".to_string());
        let err = build(&pack, &FrameKind::reference()).unwrap_err();
        assert_eq!(err.code, USAGE);
    }
}
