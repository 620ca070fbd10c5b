use boxwire_frame::FrameKind;

use crate::cmd::SchemaArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_schema, OutputFormat, SchemaOutput};

pub fn run(_args: SchemaArgs, kind: &FrameKind, format: OutputFormat) -> CliResult<i32> {
    print_schema(&SchemaOutput::new(kind), format);
    Ok(SUCCESS)
}
