//! Self-describing view of message fields for presentation layers.

use serde::Serialize;

use crate::field::{BitFlag, EnumVariant, FieldKind, FieldSpec, ListCount, Ratio, ValidRange};
use crate::message::Message;
use crate::value::FieldValue;

/// One field as a property editor sees it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditableField {
    pub index: usize,
    pub name: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wire_type: Option<&'static str>,
    /// Raw value; absent for reserved fields.
    pub raw: Option<FieldValue>,
    /// Human-readable rendering (variant name, set bits, text).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub physical: Option<f64>,
    pub domain: FieldDomain,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling: Option<Ratio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
    pub editable: bool,
}

/// Values a field accepts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldDomain {
    Ranges { ranges: Vec<ValidRange> },
    Choices { variants: Vec<EnumVariant> },
    Flags { bits: Vec<BitFlag>, reserved_mask: u64 },
    Block { width: usize },
    List { element: Vec<String>, count: ListCount },
    Fixed,
}

impl FieldSpec {
    /// Describe this field holding `value` at position `index`.
    pub fn describe(&self, index: usize, value: &FieldValue) -> EditableField {
        let domain = match self.kind() {
            FieldKind::Int { ty, valid, .. } => FieldDomain::Ranges {
                ranges: if valid.is_empty() {
                    vec![ValidRange {
                        min: ty.min(),
                        max: ty.max(),
                    }]
                } else {
                    valid.clone()
                },
            },
            FieldKind::Enum { variants, .. } => FieldDomain::Choices {
                variants: variants.clone(),
            },
            FieldKind::Bitmask {
                bits,
                reserved_mask,
                ..
            } => FieldDomain::Flags {
                bits: bits.clone(),
                reserved_mask: *reserved_mask,
            },
            FieldKind::Bytes { width } => FieldDomain::Block { width: *width },
            FieldKind::List { element, count } => FieldDomain::List {
                element: element.iter().map(|f| f.name().to_string()).collect(),
                count: count.clone(),
            },
            FieldKind::Reserved { .. } => FieldDomain::Fixed,
        };

        let display = match self.kind() {
            FieldKind::Enum { .. } => self.variant_name(value).map(str::to_string),
            FieldKind::Bitmask { .. } => Some(self.active_bits(value).join("|")),
            FieldKind::Bytes { .. } => value.as_str_lossy(),
            FieldKind::List { .. } => Some(value.to_string()),
            _ => None,
        };

        let reserved = self.is_reserved();
        EditableField {
            index,
            name: self.name().to_string(),
            kind: self.kind().tag(),
            wire_type: self.int_type().map(|ty| ty.wire_name()),
            raw: (!reserved).then(|| value.clone()),
            display,
            physical: self.scaling().and_then(|_| self.physical(value)),
            domain,
            scaling: self.scaling(),
            units: self.units().map(str::to_string),
            editable: !reserved,
        }
    }
}

impl Message {
    /// Every field of this message as an editable property.
    pub fn editable_fields(&self) -> Vec<EditableField> {
        self.fields()
            .enumerate()
            .map(|(index, (spec, value))| spec.describe(index, value))
            .collect()
    }
}
