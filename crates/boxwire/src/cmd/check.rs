use boxwire_frame::{FrameKind, ParseOutcome};
use serde::Serialize;

use crate::cmd::{read_hex_input, CheckArgs};
use crate::exit::{CliResult, DATA_INVALID, FAILURE, SUCCESS};
use crate::output::{print_json, OutputFormat};

#[derive(Serialize)]
struct CheckOutput {
    outcome: &'static str,
    code: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    used: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Exit 0 when a complete frame is present, 1 when more bytes are needed,
/// and 60 when the buffer can never hold a valid frame.
pub fn run(args: CheckArgs, kind: &FrameKind, format: OutputFormat) -> CliResult<i32> {
    let buf = read_hex_input(args.hex)?;
    let outcome = kind.check(&buf);
    let out = CheckOutput {
        outcome: match &outcome {
            ParseOutcome::Incomplete => "incomplete",
            ParseOutcome::Complete(_) => "complete",
            ParseOutcome::Error(_) => "error",
        },
        code: outcome.code(),
        used: outcome.used(),
        error: match &outcome {
            ParseOutcome::Error(err) => Some(err.to_string()),
            _ => None,
        },
    };

    match format {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Raw => println!("{}", out.code),
        OutputFormat::Table | OutputFormat::Pretty => match &out.error {
            Some(err) => println!("{} ({}): {err}", out.outcome, out.code),
            None => println!("{} ({})", out.outcome, out.code),
        },
    }

    Ok(match outcome {
        ParseOutcome::Complete(_) => SUCCESS,
        ParseOutcome::Incomplete => FAILURE,
        ParseOutcome::Error(_) => DATA_INVALID,
    })
}
