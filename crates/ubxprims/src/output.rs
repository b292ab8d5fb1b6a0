use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;
use ubxprims_frame::{DecodeStats, Frame};
use ubxprims_message::{Decoded, EditableField, FieldValue, Message, MessageSchema};

#[derive(Clone, Debug, Copy, PartialEq, Eq, ValueEnum)]
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

/// One printable field. List elements are flattened as `list[i].field`.
#[derive(Debug, Serialize)]
pub struct FieldRow {
    pub name: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wire_type: Option<&'static str>,
    pub raw: Option<FieldValue>,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl FieldRow {
    fn from_editable(name: String, field: EditableField) -> Self {
        let value = render_value(&field);
        Self {
            name,
            kind: field.kind,
            wire_type: field.wire_type,
            raw: field.raw.filter(|raw| !matches!(raw, FieldValue::List(_))),
            value,
            units: field.units,
        }
    }
}

fn render_value(field: &EditableField) -> String {
    let Some(raw) = &field.raw else {
        return "-".to_string();
    };
    if let Some(physical) = field.physical {
        return format!("{physical}");
    }
    match (field.kind, &field.display) {
        ("enum", Some(name)) => format!("{raw} ({name})"),
        ("enum", None) => raw.to_string(),
        ("bitmask", Some(bits)) if !bits.is_empty() => {
            format!("0x{:x} {bits}", raw.as_u64().unwrap_or(0))
        }
        ("bitmask", _) => format!("0x{:x}", raw.as_u64().unwrap_or(0)),
        ("bytes", Some(text)) if is_printable(text) && !text.is_empty() => text.clone(),
        _ => raw.to_string(),
    }
}

fn is_printable(text: &str) -> bool {
    text.chars().all(|c| c.is_ascii_graphic() || c == ' ')
}

/// Flatten a message into printable rows.
pub fn field_rows(msg: &Message) -> Vec<FieldRow> {
    let mut rows = Vec::new();
    for (index, (spec, value)) in msg.fields().enumerate() {
        rows.push(FieldRow::from_editable(
            spec.name().to_string(),
            spec.describe(index, value),
        ));
        if let (Some(element), Some(items)) = (spec.element(), value.as_list()) {
            for (n, item) in items.iter().enumerate() {
                for (i, (elem_spec, elem_value)) in element.iter().zip(item).enumerate() {
                    rows.push(FieldRow::from_editable(
                        format!("{}[{n}].{}", spec.name(), elem_spec.name()),
                        elem_spec.describe(i, elem_value),
                    ));
                }
            }
        }
    }
    rows
}

fn field_table(rows: Vec<FieldRow>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["FIELD", "TYPE", "RAW", "VALUE", "UNITS"]);
    for row in rows {
        table.add_row(vec![
            row.name,
            row.wire_type.unwrap_or(row.kind).to_string(),
            row.raw.map(|raw| raw.to_string()).unwrap_or_default(),
            row.value,
            row.units.unwrap_or_default(),
        ]);
    }
    table
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    schema_id: &'a str,
    id: String,
    class: u8,
    msg_id: u8,
    class_name: &'static str,
    name: Option<&'a str>,
    known: bool,
    payload_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldRow>,
}

pub fn print_decoded(decoded: &Decoded, frame: &Frame, format: OutputFormat) {
    let id = frame.message_id();
    let (name, rows) = match decoded {
        Decoded::Known(msg) => (Some(msg.name()), field_rows(msg)),
        Decoded::Unknown(_) => (None, Vec::new()),
    };

    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                schema_id: "https://schemas.3leaps.dev/ubxprims/cli/v1/message-decoded.schema.json",
                id: id.to_string(),
                class: id.class,
                msg_id: id.id,
                class_name: id.class_name(),
                name,
                known: name.is_some(),
                payload_size: frame.payload.len(),
                payload: name.is_none().then(|| hex::encode(&frame.payload)),
                fields: rows,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            println!("{} ({}) {} bytes", name.unwrap_or("UNKNOWN"), id, frame.payload.len());
            if name.is_none() {
                println!("payload: {}", hex::encode(&frame.payload));
                return;
            }
            println!("{}", field_table(rows));
        }
        OutputFormat::Pretty => {
            let fields: Vec<String> = rows
                .iter()
                .filter(|row| row.raw.is_some())
                .map(|row| match &row.units {
                    Some(units) => format!("{}={}{units}", row.name, row.value),
                    None => format!("{}={}", row.name, row.value),
                })
                .collect();
            match name {
                Some(name) => println!("{name} ({id}) {}", fields.join(" ")),
                None => println!(
                    "UNKNOWN ({id}) size={} payload={}",
                    frame.payload.len(),
                    hex::encode(&frame.payload)
                ),
            }
        }
        OutputFormat::Raw => {
            if let Ok(bytes) = frame.to_bytes() {
                print_raw(&bytes);
            }
        }
    }
}

#[derive(Serialize)]
struct EncodedOutput<'a> {
    schema_id: &'a str,
    name: &'a str,
    id: String,
    payload_size: usize,
    frame: String,
}

pub fn print_encoded(msg: &Message, wire: &[u8], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = EncodedOutput {
                schema_id: "https://schemas.3leaps.dev/ubxprims/cli/v1/message-encoded.schema.json",
                name: msg.name(),
                id: msg.id().to_string(),
                payload_size: msg.encoded_len(),
                frame: hex::encode(wire),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            println!("{} ({})", msg.name(), msg.id());
            if !msg.schema().fields().is_empty() {
                println!("{}", field_table(field_rows(msg)));
            }
            println!("frame: {}", spaced_hex(wire));
        }
        OutputFormat::Pretty => println!("{}", spaced_hex(wire)),
        OutputFormat::Raw => print_raw(wire),
    }
}

#[derive(Serialize)]
pub struct SchemaEntry {
    pub name: String,
    pub id: String,
    pub class_name: &'static str,
    pub poll: bool,
    pub fields: usize,
    pub fixed_size: Option<usize>,
    pub min_size: usize,
}

impl SchemaEntry {
    pub fn new(schema: &MessageSchema) -> Self {
        Self {
            name: schema.name().to_string(),
            id: schema.id().to_string(),
            class_name: schema.id().class_name(),
            poll: schema.is_poll(),
            fields: schema.fields().len(),
            fixed_size: schema.fixed_size(),
            min_size: schema.min_size(),
        }
    }

    fn size(&self) -> String {
        match self.fixed_size {
            Some(size) => size.to_string(),
            None => format!("{}+", self.min_size),
        }
    }
}

#[derive(Serialize)]
struct CatalogOutput<'a> {
    schema_id: &'a str,
    messages: &'a [SchemaEntry],
}

pub fn print_catalog(entries: &[SchemaEntry], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = CatalogOutput {
                schema_id: "https://schemas.3leaps.dev/ubxprims/cli/v1/catalog.schema.json",
                messages: entries,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["NAME", "ID", "CLASS", "FIELDS", "SIZE"]);
            for entry in entries {
                table.add_row(vec![
                    entry.name.clone(),
                    entry.id.clone(),
                    entry.class_name.to_string(),
                    entry.fields.to_string(),
                    entry.size(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            for entry in entries {
                println!("{} {} size={}", entry.id, entry.name, entry.size());
            }
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

pub fn print_stats(stats: &DecodeStats, failed: usize) {
    tracing::info!(
        frames = stats.frames,
        discarded_bytes = stats.discarded_bytes,
        checksum_errors = stats.checksum_errors,
        oversized = stats.oversized,
        truncated = stats.truncated,
        failed,
        "decode finished"
    );
}

pub fn spaced_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}
