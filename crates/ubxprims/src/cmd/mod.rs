use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use ubxprims_frame::{ChecksumRecovery, MAX_PAYLOAD};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod list;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode UBX frames from a capture file or stdin.
    Decode(DecodeArgs),
    /// Build a catalog message and print its frame.
    Encode(EncodeArgs),
    /// List catalog messages.
    List(ListArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::List(args) => list::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// What to drop after a checksum failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RecoveryMode {
    /// Skip the sync marker and rescan.
    Resync,
    /// Skip the whole declared frame.
    SkipFrame,
}

impl From<RecoveryMode> for ChecksumRecovery {
    fn from(mode: RecoveryMode) -> Self {
        match mode {
            RecoveryMode::Resync => ChecksumRecovery::Resync,
            RecoveryMode::SkipFrame => ChecksumRecovery::SkipFrame,
        }
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file. Reads stdin when absent.
    pub file: Option<PathBuf>,
    /// Input is hex text rather than raw bytes.
    #[arg(long)]
    pub hex: bool,
    /// Exit after printing N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Dispatch against poll requests instead of device output.
    #[arg(long)]
    pub poll: bool,
    /// Exit with DATA_INVALID if any frame failed to decode.
    #[arg(long)]
    pub strict: bool,
    /// Checksum failure recovery.
    #[arg(long, value_name = "MODE", default_value = "resync")]
    pub recovery: RecoveryMode,
    /// Largest accepted payload length.
    #[arg(long, value_name = "BYTES", env = "UBXPRIMS_MAX_PAYLOAD", default_value_t = MAX_PAYLOAD)]
    pub max_payload: usize,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Catalog message name (e.g. NAV-POSLLH-POLL).
    pub name: String,
    /// Assign a field. Integers accept 0x prefixes, enums their variant
    /// names, byte blocks text or hex:<digits>, lists a JSON array of
    /// element arrays.
    #[arg(long = "set", value_name = "FIELD=VALUE", value_parser = parse_assignment)]
    pub set: Vec<(String, String)>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// List poll requests instead of device output.
    #[arg(long)]
    pub poll: bool,
    /// List both poll requests and device output.
    #[arg(long, conflicts_with = "poll")]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got {raw:?}"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in {raw:?}"));
    }
    Ok((field.to_string(), value.trim().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assignment_parsing() {
        assert_eq!(
            parse_assignment("svid = 12").unwrap(),
            ("svid".to_string(), "12".to_string())
        );
        assert_eq!(
            parse_assignment("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_assignment("svid").is_err());
        assert!(parse_assignment("=1").is_err());
    }
}
