use ubxprims_frame::{FrameError, MessageId};

/// Errors raised by the field model, message schemas and the registry.
#[derive(Debug, thiserror::Error)]
pub enum MessageError {
    /// Fewer payload bytes than the schema requires.
    #[error("truncated data in field {field}: need {needed} bytes, {available} available")]
    TruncatedData {
        field: String,
        needed: usize,
        available: usize,
    },

    /// Payload bytes left over after the last field.
    #[error("trailing data in message {message}: {extra} unconsumed bytes")]
    TrailingData { message: String, extra: usize },

    /// An integer value outside the field's valid domain.
    #[error("value {value} out of range for field {field}")]
    Range { field: String, value: i128 },

    /// A raw value matching none of the enumeration's variants.
    #[error("invalid enum value {value} for field {field}")]
    InvalidEnumValue { field: String, value: i128 },

    /// A schema is already registered under this id.
    #[error("duplicate registration for {id}: {existing} already registered, rejected {rejected}")]
    DuplicateRegistration {
        id: MessageId,
        existing: String,
        rejected: String,
    },

    /// No schema registered for the id (strict registries only).
    #[error("no schema registered for message {0}")]
    UnknownMessage(MessageId),

    /// The schema definition itself is inconsistent.
    #[error("invalid schema {schema}: {reason}")]
    InvalidSchema { schema: String, reason: String },

    /// Lookup of a field name or index that the schema does not have.
    #[error("message {message} has no field {field}")]
    UnknownField { message: String, field: String },

    /// A value of the wrong shape for the field kind.
    #[error("field {field} expects {expected}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
    },

    /// Reserved fields cannot be assigned.
    #[error("field {0} is reserved")]
    ReservedField(String),

    /// A list length disagreeing with the count field that describes it.
    #[error("count field {count_field} is {count} but list {list} holds {len} elements")]
    CountMismatch {
        list: String,
        count_field: String,
        count: u64,
        len: usize,
    },

    /// Framing failure underneath message decoding or encoding.
    #[error(transparent)]
    Frame(#[from] FrameError),
}

impl MessageError {
    /// True for errors confined to a single frame; stream decoding can
    /// continue with the next one.
    pub fn is_recoverable(&self) -> bool {
        match self {
            MessageError::TruncatedData { .. }
            | MessageError::TrailingData { .. }
            | MessageError::Range { .. }
            | MessageError::InvalidEnumValue { .. }
            | MessageError::UnknownMessage(_) => true,
            MessageError::Frame(err) => err.is_recoverable(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, MessageError>;
