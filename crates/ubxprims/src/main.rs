mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "ubxprims", version, about = "UBX message codec CLI")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

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
    let result = cmd::run(cli.command, format);

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
    use crate::cmd::RecoveryMode;

    #[test]
    fn parses_decode_subcommand() {
        let cli = Cli::try_parse_from([
            "ubxprims",
            "decode",
            "capture.ubx",
            "--hex",
            "--count",
            "3",
            "--recovery",
            "skip-frame",
        ])
        .expect("decode args should parse");

        let Command::Decode(args) = cli.command else {
            panic!("expected decode");
        };
        assert!(args.hex);
        assert_eq!(args.count, Some(3));
        assert_eq!(args.recovery, RecoveryMode::SkipFrame);
        assert!(!args.poll);
    }

    #[test]
    fn parses_encode_assignments() {
        let cli = Cli::try_parse_from([
            "ubxprims",
            "--format",
            "raw",
            "encode",
            "AID-AOP-POLL-SV",
            "--set",
            "svid=12",
        ])
        .expect("encode args should parse");

        assert!(matches!(cli.format, Some(OutputFormat::Raw)));
        let Command::Encode(args) = cli.command else {
            panic!("expected encode");
        };
        assert_eq!(args.set, vec![("svid".to_string(), "12".to_string())]);
    }

    #[test]
    fn rejects_malformed_assignment() {
        let err = Cli::try_parse_from(["ubxprims", "encode", "MON-VER-POLL", "--set", "svid"])
            .expect_err("assignment without '=' should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn rejects_conflicting_list_args() {
        let err = Cli::try_parse_from(["ubxprims", "list", "--poll", "--all"])
            .expect_err("conflicting args should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn parses_version_subcommand() {
        let cli = Cli::try_parse_from(["ubxprims", "version", "--extended"])
            .expect("version args should parse");
        assert!(matches!(cli.command, Command::Version(args) if args.extended));
    }
}
