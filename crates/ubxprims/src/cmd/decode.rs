use std::fs::File;
use std::io::{Cursor, Read};
use std::path::Path;

use tracing::{debug, warn};
use ubxprims::catalog;
use ubxprims_frame::{FrameConfig, FrameError, FrameReader};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, message_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{print_decoded, print_stats, OutputFormat};

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let registry = if args.poll {
        catalog::poll_registry()
    } else {
        catalog::output_registry()
    }
    .map_err(|err| message_error("catalog failed", err))?;

    let config = FrameConfig {
        max_payload_size: args.max_payload,
        checksum_recovery: args.recovery.into(),
    };
    let source = open_input(args.file.as_deref(), args.hex)?;
    let mut reader = FrameReader::with_config(source, config);

    let mut printed = 0usize;
    let mut failed = 0usize;

    loop {
        if args.count.is_some_and(|count| printed >= count) {
            break;
        }

        let frame = match reader.read_frame() {
            Ok(frame) => frame,
            Err(FrameError::EndOfStream) => break,
            Err(err) if err.is_recoverable() => {
                warn!(error = %err, "skipping corrupt frame");
                failed = failed.saturating_add(1);
                continue;
            }
            Err(err) => return Err(frame_error("read failed", err)),
        };

        match registry.decode_message(&frame) {
            Ok(decoded) => {
                print_decoded(&decoded, &frame, format);
                printed = printed.saturating_add(1);
            }
            Err(err) => {
                warn!(id = %frame.message_id(), error = %err, "skipping invalid message");
                failed = failed.saturating_add(1);
            }
        }
    }

    let stats = reader.stats();
    if stats.truncated > 0 {
        warn!(truncated = stats.truncated, "dropped incomplete frame(s) at end of input");
        let truncated = usize::try_from(stats.truncated).unwrap_or(usize::MAX);
        failed = failed.saturating_add(truncated);
    }
    if args.count.is_some() && reader.buffered() > 0 {
        debug!(bytes = reader.buffered(), "stopped with input left unread");
    }
    print_stats(&stats, failed);

    if args.strict && failed > 0 {
        return Err(CliError::new(
            DATA_INVALID,
            format!("{failed} frame(s) failed to decode"),
        ));
    }
    Ok(SUCCESS)
}

fn open_input(path: Option<&Path>, hex: bool) -> CliResult<Box<dyn Read>> {
    let mut source: Box<dyn Read> = match path {
        Some(path) => Box::new(
            File::open(path).map_err(|err| io_error(&format!("open {}", path.display()), err))?,
        ),
        None => Box::new(std::io::stdin().lock()),
    };

    if !hex {
        return Ok(source);
    }

    let mut text = String::new();
    source
        .read_to_string(&mut text)
        .map_err(|err| io_error("read failed", err))?;
    Ok(Box::new(Cursor::new(parse_hex(&text)?)))
}

/// Hex text as captured by terminals and loggers: whitespace, commas and
/// `0x` prefixes are ignored.
pub(crate) fn parse_hex(text: &str) -> CliResult<Vec<u8>> {
    let digits: String = text
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|token| {
            token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token)
        })
        .collect();
    hex::decode(&digits).map_err(|err| CliError::new(DATA_INVALID, format!("invalid hex input: {err}")))
}
