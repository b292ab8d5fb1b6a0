use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use ubxprims_frame::MessageId;

use crate::error::{MessageError, Result};
use crate::field::{FieldSpec, ListCount};
use crate::message::Message;

/// Immutable layout of one message type: identity plus ordered fields.
///
/// Field order is wire order. Build with [`MessageSchema::builder`]; the
/// builder enforces the structural rules so a built schema can always
/// decode and encode consistently.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSchema {
    id: MessageId,
    name: String,
    fields: Vec<FieldSpec>,
    poll: bool,
    list_index: Option<usize>,
    count_index: Option<usize>,
    min_size: usize,
}

impl MessageSchema {
    /// Start describing a message type.
    pub fn builder(id: impl Into<MessageId>, name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            id: id.into(),
            name: name.into(),
            fields: Vec::new(),
            poll: false,
        }
    }

    pub fn id(&self) -> MessageId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn field(&self, index: usize) -> Option<&FieldSpec> {
        self.fields.get(index)
    }

    /// True when the schema was declared as a poll request.
    pub fn is_poll(&self) -> bool {
        self.poll
    }

    /// Position of the named field.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name() == name)
    }

    /// Position of the list field, if the payload is variable length.
    pub fn list_index(&self) -> Option<usize> {
        self.list_index
    }

    /// Position of the field holding the list's element count.
    pub fn count_index(&self) -> Option<usize> {
        self.count_index
    }

    /// Payload length of a fixed-layout message; `None` when a list makes
    /// the length variable.
    pub fn fixed_size(&self) -> Option<usize> {
        match self.list_index {
            Some(_) => None,
            None => Some(self.min_size),
        }
    }

    /// Payload length with every list empty.
    pub fn min_size(&self) -> usize {
        self.min_size
    }

    /// A fresh instance with every field at its default valid value.
    pub fn new_message(self: &Arc<Self>) -> Message {
        Message::new(Arc::clone(self))
    }

    /// Decode a payload against this schema.
    pub fn decode(self: &Arc<Self>, payload: &[u8]) -> Result<Message> {
        Message::decode(Arc::clone(self), payload)
    }

    pub(crate) fn unknown_field(&self, field: impl Into<String>) -> MessageError {
        MessageError::UnknownField {
            message: self.name.clone(),
            field: field.into(),
        }
    }
}

impl fmt::Display for MessageSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Builder for [`MessageSchema`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    id: MessageId,
    name: String,
    fields: Vec<FieldSpec>,
    poll: bool,
}

impl SchemaBuilder {
    /// Mark the schema as a poll request.
    pub fn poll(mut self) -> Self {
        self.poll = true;
        self
    }

    /// Append a field.
    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    /// Append several fields in order.
    pub fn fields(mut self, specs: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(specs);
        self
    }

    /// Validate the layout and produce the schema.
    pub fn build(self) -> Result<MessageSchema> {
        let invalid = |reason: String| MessageError::InvalidSchema {
            schema: self.name.clone(),
            reason,
        };

        let mut seen = HashSet::new();
        for spec in &self.fields {
            if !seen.insert(spec.name()) {
                return Err(invalid(format!("duplicate field name {}", spec.name())));
            }
            spec.check().map_err(&invalid)?;
        }

        let lists: Vec<usize> = self
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.is_list())
            .map(|(i, _)| i)
            .collect();
        if lists.len() > 1 {
            return Err(invalid("more than one list field".to_string()));
        }
        let list_index = lists.first().copied();

        let mut count_index = None;
        if let Some(index) = list_index {
            let list = &self.fields[index];
            match list.list_count() {
                Some(ListCount::Remaining) => {
                    if index + 1 != self.fields.len() {
                        return Err(invalid(format!(
                            "list {} fills the remaining payload but is not the last field",
                            list.name()
                        )));
                    }
                }
                Some(ListCount::Field(count_name)) => {
                    let position = self.fields[..index]
                        .iter()
                        .position(|f| f.name() == count_name)
                        .ok_or_else(|| {
                            invalid(format!(
                                "count field {count_name} of list {} must precede it",
                                list.name()
                            ))
                        })?;
                    let count_field = &self.fields[position];
                    let unsigned_int = matches!(
                        count_field.kind(),
                        crate::field::FieldKind::Int { ty, .. } if !ty.is_signed()
                    );
                    if !unsigned_int {
                        return Err(invalid(format!(
                            "count field {count_name} must be an unsigned integer"
                        )));
                    }
                    count_index = Some(position);
                }
                None => {}
            }
        }

        let min_size = self.fields.iter().filter_map(FieldSpec::fixed_size).sum();

        Ok(MessageSchema {
            id: self.id,
            name: self.name,
            fields: self.fields,
            poll: self.poll,
            list_index,
            count_index,
            min_size,
        })
    }

    /// Build and wrap in an `Arc` for sharing with a registry.
    pub fn build_shared(self) -> Result<Arc<MessageSchema>> {
        self.build().map(Arc::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::IntType;

    fn block() -> Vec<FieldSpec> {
        vec![FieldSpec::u8("svid"), FieldSpec::u8("cno")]
    }

    #[test]
    fn fixed_layout_size() {
        let schema = MessageSchema::builder((0x01, 0x02), "NAV-POSLLH")
            .field(FieldSpec::u32("iTOW"))
            .field(FieldSpec::i32("lon"))
            .field(FieldSpec::reserved("reserved1", 2))
            .build()
            .unwrap();

        assert_eq!(schema.fixed_size(), Some(10));
        assert_eq!(schema.min_size(), 10);
        assert_eq!(schema.index_of("lon"), Some(1));
        assert_eq!(schema.index_of("nope"), None);
        assert!(!schema.is_poll());
        assert_eq!(schema.to_string(), "NAV-POSLLH (0x01/0x02)");
    }

    #[test]
    fn poll_without_fields() {
        let schema = MessageSchema::builder((0x0A, 0x04), "MON-VER").poll().build().unwrap();
        assert!(schema.is_poll());
        assert_eq!(schema.fixed_size(), Some(0));
    }

    #[test]
    fn variable_layout_reports_list_and_count() {
        let schema = MessageSchema::builder((0x01, 0x30), "NAV-SVINFO")
            .field(FieldSpec::u32("iTOW"))
            .field(FieldSpec::u8("numCh"))
            .field(FieldSpec::list("sv", block(), ListCount::field("numCh")))
            .build()
            .unwrap();

        assert_eq!(schema.fixed_size(), None);
        assert_eq!(schema.min_size(), 5);
        assert_eq!(schema.list_index(), Some(2));
        assert_eq!(schema.count_index(), Some(1));
    }

    #[test]
    fn duplicate_names_rejected() {
        let err = MessageSchema::builder((1, 1), "X")
            .field(FieldSpec::u8("a"))
            .field(FieldSpec::u16("a"))
            .build()
            .unwrap_err();
        assert!(matches!(err, MessageError::InvalidSchema { .. }));
    }

    #[test]
    fn remaining_list_must_be_last() {
        let err = MessageSchema::builder((1, 1), "X")
            .field(FieldSpec::list("l", block(), ListCount::Remaining))
            .field(FieldSpec::u8("after"))
            .build()
            .unwrap_err();
        assert!(matches!(err, MessageError::InvalidSchema { .. }));
    }

    #[test]
    fn single_list_only() {
        let err = MessageSchema::builder((1, 1), "X")
            .field(FieldSpec::u8("n"))
            .field(FieldSpec::list("a", block(), ListCount::field("n")))
            .field(FieldSpec::list("b", block(), ListCount::Remaining))
            .build()
            .unwrap_err();
        assert!(matches!(err, MessageError::InvalidSchema { .. }));
    }

    #[test]
    fn count_field_must_precede_and_be_unsigned() {
        let after = MessageSchema::builder((1, 1), "X")
            .field(FieldSpec::list("l", block(), ListCount::field("n")))
            .field(FieldSpec::u8("n"))
            .build();
        assert!(after.is_err());

        let signed = MessageSchema::builder((1, 1), "X")
            .field(FieldSpec::i8("n"))
            .field(FieldSpec::list("l", block(), ListCount::field("n")))
            .build();
        assert!(signed.is_err());

        let enumerated = MessageSchema::builder((1, 1), "X")
            .field(FieldSpec::enumeration("n", IntType::U8, &[(0, "zero")]))
            .field(FieldSpec::list("l", block(), ListCount::field("n")))
            .build();
        assert!(enumerated.is_err());
    }

    #[test]
    fn field_checks_surface_as_invalid_schema() {
        let err = MessageSchema::builder((1, 1), "X")
            .field(FieldSpec::u8("v").with_range(0, 1000))
            .build()
            .unwrap_err();
        match err {
            MessageError::InvalidSchema { schema, reason } => {
                assert_eq!(schema, "X");
                assert!(reason.contains("v"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
