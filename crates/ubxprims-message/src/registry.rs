use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use tracing::debug;
use ubxprims_frame::{Frame, MessageId};

use crate::config::RegistryConfig;
use crate::error::{MessageError, Result};
use crate::message::Message;
use crate::schema::MessageSchema;

/// A frame whose id has no registered schema, kept byte-exact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMessage {
    pub id: MessageId,
    pub payload: Bytes,
}

impl UnknownMessage {
    /// Rebuild the original frame.
    pub fn to_frame(&self) -> Frame {
        Frame::new(self.id, self.payload.clone())
    }
}

/// Outcome of dispatching a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Known(Message),
    Unknown(UnknownMessage),
}

impl Decoded {
    pub fn id(&self) -> MessageId {
        match self {
            Decoded::Known(msg) => msg.id(),
            Decoded::Unknown(unknown) => unknown.id,
        }
    }

    pub fn message(&self) -> Option<&Message> {
        match self {
            Decoded::Known(msg) => Some(msg),
            Decoded::Unknown(_) => None,
        }
    }

    pub fn into_message(self) -> Option<Message> {
        match self {
            Decoded::Known(msg) => Some(msg),
            Decoded::Unknown(_) => None,
        }
    }
}

/// Id-keyed table of message schemas.
///
/// Populated through `&mut self`, then shared read-only (typically behind
/// an `Arc`) by any number of decoders.
#[derive(Debug, Clone, Default)]
pub struct MessageRegistry {
    schemas: BTreeMap<MessageId, Arc<MessageSchema>>,
    config: RegistryConfig,
}

impl MessageRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            schemas: BTreeMap::new(),
            config,
        }
    }

    /// Build a registry from a set of schemas.
    pub fn from_schemas(schemas: impl IntoIterator<Item = Arc<MessageSchema>>) -> Result<Self> {
        let mut registry = Self::new();
        for schema in schemas {
            registry.register(schema)?;
        }
        Ok(registry)
    }

    /// Register a schema under its id. At most one schema per id.
    pub fn register(&mut self, schema: Arc<MessageSchema>) -> Result<()> {
        if let Some(existing) = self.schemas.get(&schema.id()) {
            return Err(MessageError::DuplicateRegistration {
                id: schema.id(),
                existing: existing.name().to_string(),
                rejected: schema.name().to_string(),
            });
        }
        self.schemas.insert(schema.id(), schema);
        Ok(())
    }

    /// Schema registered for `id`; absence is not an error.
    pub fn resolve(&self, id: MessageId) -> Option<&Arc<MessageSchema>> {
        self.schemas.get(&id)
    }

    /// Schema registered under `name` (e.g. `"NAV-POSLLH"`).
    pub fn by_name(&self, name: &str) -> Option<&Arc<MessageSchema>> {
        self.schemas.values().find(|schema| schema.name() == name)
    }

    /// Check if an id has a registered schema.
    pub fn contains(&self, id: MessageId) -> bool {
        self.schemas.contains_key(&id)
    }

    /// Registered ids in ascending order.
    pub fn ids(&self) -> Vec<MessageId> {
        self.schemas.keys().copied().collect()
    }

    /// Registered schemas in ascending id order.
    pub fn schemas(&self) -> impl Iterator<Item = &Arc<MessageSchema>> {
        self.schemas.values()
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    /// Decode a payload received under `id`.
    pub fn decode(&self, id: MessageId, payload: impl Into<Bytes>) -> Result<Decoded> {
        let payload = payload.into();
        match self.schemas.get(&id) {
            Some(schema) => {
                let msg = Message::decode(Arc::clone(schema), &payload)?;
                debug!(id = %id, name = schema.name(), len = payload.len(), "decoded message");
                Ok(Decoded::Known(msg))
            }
            None if self.config.fail_on_unknown => Err(MessageError::UnknownMessage(id)),
            None => {
                debug!(id = %id, len = payload.len(), "no schema for message");
                Ok(Decoded::Unknown(UnknownMessage { id, payload }))
            }
        }
    }

    /// Decode a validated frame against its schema.
    pub fn decode_message(&self, frame: &Frame) -> Result<Decoded> {
        self.decode(frame.message_id(), frame.payload.clone())
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}
