use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use ubxprims_frame::{Frame, MessageId};

use crate::error::{MessageError, Result};
use crate::field::FieldSpec;
use crate::schema::MessageSchema;
use crate::value::FieldValue;

/// A message instance: a schema plus one value per field.
///
/// Values are always kept valid for their field. Every mutation goes
/// through the field spec, and assigning a list keeps its count field in
/// step, so an instance built through this API always encodes.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    schema: Arc<MessageSchema>,
    values: Vec<FieldValue>,
}

impl Message {
    /// A fresh instance with every field at its default valid value.
    pub fn new(schema: Arc<MessageSchema>) -> Self {
        let values = schema.fields().iter().map(FieldSpec::default_value).collect();
        Self { schema, values }
    }

    /// Build an instance from one value per field, in schema order.
    pub fn from_values(schema: Arc<MessageSchema>, values: Vec<FieldValue>) -> Result<Self> {
        if values.len() != schema.fields().len() {
            return Err(MessageError::TypeMismatch {
                field: schema.name().to_string(),
                expected: "one value per schema field",
            });
        }
        let values = schema
            .fields()
            .iter()
            .zip(values)
            .map(|(spec, value)| spec.normalize(value))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { schema, values })
    }

    /// Decode `payload` field by field against `schema`.
    pub fn decode(schema: Arc<MessageSchema>, payload: &[u8]) -> Result<Self> {
        let mut values: Vec<FieldValue> = Vec::with_capacity(schema.fields().len());
        let mut offset = 0usize;

        for (index, spec) in schema.fields().iter().enumerate() {
            let count = match schema.count_index() {
                Some(count_index) if schema.list_index() == Some(index) => values
                    .get(count_index)
                    .and_then(FieldValue::as_u64)
                    .map(|n| usize::try_from(n).unwrap_or(usize::MAX)),
                _ => None,
            };
            let (value, used) = spec.decode(&payload[offset..], count)?;
            offset += used;
            values.push(value);
        }

        if offset < payload.len() {
            return Err(MessageError::TrailingData {
                message: schema.name().to_string(),
                extra: payload.len() - offset,
            });
        }

        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> &Arc<MessageSchema> {
        &self.schema
    }

    pub fn id(&self) -> MessageId {
        self.schema.id()
    }

    pub fn name(&self) -> &str {
        self.schema.name()
    }

    fn index(&self, name: &str) -> Result<usize> {
        self.schema
            .index_of(name)
            .ok_or_else(|| self.schema.unknown_field(name))
    }

    fn spec(&self, index: usize) -> Result<&FieldSpec> {
        self.schema
            .field(index)
            .ok_or_else(|| self.schema.unknown_field(index.to_string()))
    }

    /// Value of the named field.
    pub fn get(&self, name: &str) -> Result<&FieldValue> {
        let index = self.index(name)?;
        Ok(&self.values[index])
    }

    /// Value of the field at `index`.
    pub fn get_index(&self, index: usize) -> Option<&FieldValue> {
        self.values.get(index)
    }

    /// All fields in wire order with their values.
    pub fn fields(&self) -> impl Iterator<Item = (&FieldSpec, &FieldValue)> {
        self.schema.fields().iter().zip(&self.values)
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn get_u64(&self, name: &str) -> Result<u64> {
        self.get(name)?
            .as_u64()
            .ok_or_else(|| MessageError::TypeMismatch {
                field: name.to_string(),
                expected: "an unsigned integer",
            })
    }

    pub fn get_i64(&self, name: &str) -> Result<i64> {
        self.get(name)?
            .as_i64()
            .ok_or_else(|| MessageError::TypeMismatch {
                field: name.to_string(),
                expected: "a signed integer",
            })
    }

    /// Physical value of an integer field, scaling applied.
    pub fn physical(&self, name: &str) -> Result<f64> {
        let index = self.index(name)?;
        self.schema.fields()[index]
            .physical(&self.values[index])
            .ok_or_else(|| MessageError::TypeMismatch {
                field: name.to_string(),
                expected: "an integer",
            })
    }

    /// Whether the named bit of a bitmask field is set.
    pub fn bit(&self, field: &str, bit: &str) -> Result<bool> {
        let index = self.index(field)?;
        self.schema.fields()[index]
            .bit(&self.values[index], bit)
            .ok_or_else(|| self.schema.unknown_field(format!("{field}.{bit}")))
    }

    /// Assign the named field.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Result<()> {
        let index = self.index(name)?;
        self.set_index(index, value)
    }

    /// Assign the field at `index`.
    ///
    /// The value is validated against the field first; nothing changes on
    /// error. Assigning a list also updates the field that counts it.
    pub fn set_index(&mut self, index: usize, value: impl Into<FieldValue>) -> Result<()> {
        let spec = self.spec(index)?;
        if spec.is_reserved() {
            return Err(MessageError::ReservedField(spec.name().to_string()));
        }
        let value = spec.normalize(value.into())?;

        if self.schema.list_index() == Some(index) {
            if let Some(count_index) = self.schema.count_index() {
                let len = value.as_list().map_or(0, <[_]>::len);
                let count = self.schema.fields()[count_index]
                    .normalize(FieldValue::Unsigned(len as u64))?;
                self.values[count_index] = count;
            }
        }

        self.values[index] = value;
        Ok(())
    }

    fn check_count(&self) -> Result<()> {
        let (Some(list_index), Some(count_index)) =
            (self.schema.list_index(), self.schema.count_index())
        else {
            return Ok(());
        };
        let len = self.values[list_index].as_list().map_or(0, <[_]>::len);
        let count = self.values[count_index].as_u64().unwrap_or(0);
        if count != len as u64 {
            return Err(MessageError::CountMismatch {
                list: self.schema.fields()[list_index].name().to_string(),
                count_field: self.schema.fields()[count_index].name().to_string(),
                count,
                len,
            });
        }
        Ok(())
    }

    /// Payload length this instance encodes to.
    pub fn encoded_len(&self) -> usize {
        self.fields()
            .map(|(spec, value)| spec.encoded_size(value))
            .sum()
    }

    /// Append the encoded payload to `dst`.
    pub fn encode_to(&self, dst: &mut BytesMut) -> Result<()> {
        self.check_count()?;
        for (spec, value) in self.fields() {
            spec.encode(value, dst)?;
        }
        Ok(())
    }

    /// Encode the payload.
    pub fn encode(&self) -> Result<Bytes> {
        let expected = self.encoded_len();
        let mut buf = BytesMut::with_capacity(expected);
        self.encode_to(&mut buf)?;
        debug_assert_eq!(buf.len(), expected);
        Ok(buf.freeze())
    }

    /// Encode into a frame carrying this message's id.
    pub fn to_frame(&self) -> Result<Frame> {
        Ok(Frame::new(self.id(), self.encode()?))
    }

    /// Encode into complete wire bytes, frame included.
    pub fn to_bytes(&self) -> Result<Bytes> {
        Ok(self.to_frame()?.to_bytes()?)
    }
}
