//! Typed UBX message model.
//!
//! Messages are described as data: a [`MessageSchema`] is an ordered list
//! of [`FieldSpec`]s (integers with ranges and scaling, enumerations,
//! bitmasks, reserved padding, byte blocks and one optional list) under a
//! class/id pair. A [`MessageRegistry`] maps ids to schemas and turns
//! validated frames into [`Message`] instances, or into an
//! [`UnknownMessage`] that keeps the payload byte-exact.

pub mod config;
pub mod decoder;
pub mod editable;
pub mod error;
pub mod field;
pub mod message;
pub mod registry;
pub mod schema;
pub mod value;

pub use config::RegistryConfig;
pub use decoder::MessageDecoder;
pub use editable::{EditableField, FieldDomain};
pub use error::{MessageError, Result};
pub use field::{
    BitFlag, EnumVariant, FieldKind, FieldSpec, IntType, ListCount, Ratio, ValidRange,
};
pub use message::Message;
pub use registry::{Decoded, MessageRegistry, UnknownMessage};
pub use schema::{MessageSchema, SchemaBuilder};
pub use value::FieldValue;
