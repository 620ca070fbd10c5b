mod cmd;
mod exit;
mod logging;
mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "boxwire", version, about = "Inspect and build boxwire frames")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Frame kind description (JSON). Default: the reference kind.
    #[arg(long, value_name = "FILE", global = true, env = "BOXWIRE_KIND")]
    kind: Option<PathBuf>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "info", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    let result = cmd::run(cli.command, cli.kind.as_deref(), format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pack_subcommand() {
        let cli = Cli::try_parse_from([
            "boxwire",
            "pack",
            "--set",
            "cmd=1",
            "--set",
            "sn=0x10",
            "--data",
            "hi",
        ])
        .expect("pack args should parse");

        match cli.command {
            Command::Pack(args) => {
                assert_eq!(
                    args.set,
                    vec![("cmd".to_string(), 1), ("sn".to_string(), 16)]
                );
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_conflicting_payload_args() {
        let err = Cli::try_parse_from([
            "boxwire",
            "pack",
            "--json",
            "{\"x\":1}",
            "--data",
            "hello",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_malformed_assignment() {
        let err = Cli::try_parse_from(["boxwire", "pack", "--set", "cmd"])
            .expect_err("assignment without value should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn parses_global_kind_after_subcommand() {
        let cli = Cli::try_parse_from(["boxwire", "decode", "00ff", "--kind", "kind.json"])
            .expect("decode args should parse");
        assert_eq!(cli.kind, Some(PathBuf::from("kind.json")));
        assert!(matches!(cli.command, Command::Decode(_)));
    }
}
