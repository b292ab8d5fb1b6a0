use tracing::debug;
use ubxprims::catalog;
use ubxprims_message::{FieldKind, FieldSpec, FieldValue, Message};

use crate::cmd::decode::parse_hex;
use crate::cmd::EncodeArgs;
use crate::exit::{message_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_encoded, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let schema = catalog::find(&args.name)
        .map_err(|err| message_error("catalog failed", err))?
        .ok_or_else(|| CliError::new(USAGE, format!("unknown message: {}", args.name)))?;

    let mut msg = schema.new_message();
    for (field, text) in &args.set {
        let value = parse_value(&msg, field, text)?;
        msg.set(field, value)
            .map_err(|err| message_error("invalid value", err))?;
    }

    let wire = msg
        .to_bytes()
        .map_err(|err| message_error("encode failed", err))?;
    debug!(name = msg.name(), len = wire.len(), "encoded message");
    print_encoded(&msg, &wire, format);
    Ok(SUCCESS)
}

fn parse_value(msg: &Message, field: &str, text: &str) -> CliResult<FieldValue> {
    let spec = msg
        .schema()
        .index_of(field)
        .and_then(|index| msg.schema().field(index))
        .ok_or_else(|| {
            CliError::new(
                USAGE,
                format!("message {} has no field {field}", msg.name()),
            )
        })?;
    parse_for(spec, text)
}

fn invalid(spec: &FieldSpec, text: &str) -> CliError {
    CliError::new(
        DATA_INVALID,
        format!("invalid value {text:?} for field {}", spec.name()),
    )
}

fn parse_for(spec: &FieldSpec, text: &str) -> CliResult<FieldValue> {
    match spec.kind() {
        FieldKind::Enum { variants, .. } => {
            if let Some(variant) = variants.iter().find(|v| v.name.eq_ignore_ascii_case(text)) {
                return i64::try_from(variant.value)
                    .map(FieldValue::Signed)
                    .map_err(|_| invalid(spec, text));
            }
            parse_int(text).ok_or_else(|| invalid(spec, text))
        }
        FieldKind::Int { .. } | FieldKind::Bitmask { .. } => {
            parse_int(text).ok_or_else(|| invalid(spec, text))
        }
        FieldKind::Bytes { width } => {
            let mut bytes = match text.strip_prefix("hex:") {
                Some(digits) => parse_hex(digits)?,
                None => text.as_bytes().to_vec(),
            };
            if bytes.len() > *width {
                return Err(invalid(spec, text));
            }
            bytes.resize(*width, 0);
            Ok(FieldValue::Bytes(bytes))
        }
        FieldKind::List { element, .. } => {
            let items: Vec<Vec<serde_json::Value>> =
                serde_json::from_str(text).map_err(|_| invalid(spec, text))?;
            items
                .into_iter()
                .map(|item| {
                    if item.len() != element.len() {
                        return Err(invalid(spec, text));
                    }
                    element
                        .iter()
                        .zip(item)
                        .map(|(elem_spec, value)| match value {
                            serde_json::Value::Number(n) => parse_for(elem_spec, &n.to_string()),
                            serde_json::Value::String(s) => parse_for(elem_spec, &s),
                            _ => Err(invalid(elem_spec, &value.to_string())),
                        })
                        .collect::<CliResult<Vec<_>>>()
                })
                .collect::<CliResult<Vec<_>>>()
                .map(FieldValue::List)
        }
        FieldKind::Reserved { .. } => Err(CliError::new(
            USAGE,
            format!("field {} is reserved", spec.name()),
        )),
    }
}

/// Decimal or `0x` hexadecimal integer, optionally negative.
fn parse_int(text: &str) -> Option<FieldValue> {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let magnitude = match digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u64>().ok()?,
    };
    if negative {
        let value = 0i64.checked_sub_unsigned(magnitude)?;
        Some(FieldValue::Signed(value))
    } else {
        Some(FieldValue::Unsigned(magnitude))
    }
}
