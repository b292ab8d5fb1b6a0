use std::fmt;

use serde::Serialize;

/// The raw value held by one field of a message instance.
///
/// Integers are always stored raw; scaling is presentation metadata on the
/// field specification, so values round-trip exactly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// Value of an unsigned integer, enumeration or bitmask field.
    Unsigned(u64),
    /// Value of a signed integer field.
    Signed(i64),
    /// Content of a fixed byte block.
    Bytes(Vec<u8>),
    /// Placeholder for reserved padding. Carries nothing.
    Reserved,
    /// Elements of a variable-length list, each a bundle of field values.
    List(Vec<Vec<FieldValue>>),
}

impl FieldValue {
    /// The value as unsigned, if it is a non-negative integer.
    pub fn as_u64(&self) -> Option<u64> {
        match *self {
            FieldValue::Unsigned(v) => Some(v),
            FieldValue::Signed(v) => u64::try_from(v).ok(),
            _ => None,
        }
    }

    /// The value as signed, if it is an integer that fits.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            FieldValue::Unsigned(v) => i64::try_from(v).ok(),
            FieldValue::Signed(v) => Some(v),
            _ => None,
        }
    }

    pub(crate) fn as_i128(&self) -> Option<i128> {
        match *self {
            FieldValue::Unsigned(v) => Some(i128::from(v)),
            FieldValue::Signed(v) => Some(i128::from(v)),
            _ => None,
        }
    }

    /// The content of a byte block.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            FieldValue::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// The elements of a list.
    pub fn as_list(&self) -> Option<&[Vec<FieldValue>]> {
        match self {
            FieldValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// A byte block read as NUL-terminated text, the way version strings
    /// and other fixed-width character fields are transmitted.
    pub fn as_str_lossy(&self) -> Option<String> {
        let bytes = self.as_bytes()?;
        let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Some(String::from_utf8_lossy(&bytes[..end]).into_owned())
    }

    /// True for the placeholder of a reserved field.
    pub fn is_reserved(&self) -> bool {
        matches!(self, FieldValue::Reserved)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Unsigned(v) => write!(f, "{v}"),
            FieldValue::Signed(v) => write!(f, "{v}"),
            FieldValue::Bytes(bytes) => {
                for byte in bytes {
                    write!(f, "{byte:02x}")?;
                }
                Ok(())
            }
            FieldValue::Reserved => f.write_str("-"),
            FieldValue::List(items) => write!(f, "[{} elements]", items.len()),
        }
    }
}

macro_rules! impl_from_unsigned {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(v: $t) -> Self {
                FieldValue::Unsigned(u64::from(v))
            }
        })*
    };
}

macro_rules! impl_from_signed {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(v: $t) -> Self {
                FieldValue::Signed(i64::from(v))
            }
        })*
    };
}

impl_from_unsigned!(u8, u16, u32, u64);
impl_from_signed!(i8, i16, i32, i64);

impl From<Vec<u8>> for FieldValue {
    fn from(bytes: Vec<u8>) -> Self {
        FieldValue::Bytes(bytes)
    }
}

impl From<&[u8]> for FieldValue {
    fn from(bytes: &[u8]) -> Self {
        FieldValue::Bytes(bytes.to_vec())
    }
}

impl From<Vec<Vec<FieldValue>>> for FieldValue {
    fn from(items: Vec<Vec<FieldValue>>) -> Self {
        FieldValue::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_accessors_cross_sign() {
        assert_eq!(FieldValue::Unsigned(7).as_i64(), Some(7));
        assert_eq!(FieldValue::Signed(7).as_u64(), Some(7));
        assert_eq!(FieldValue::Signed(-1).as_u64(), None);
        assert_eq!(FieldValue::Unsigned(u64::MAX).as_i64(), None);
        assert_eq!(FieldValue::Reserved.as_u64(), None);
    }

    #[test]
    fn nul_terminated_text() {
        let value = FieldValue::from(b"ROM CORE 1.00\0\0\0".as_slice());
        assert_eq!(value.as_str_lossy().as_deref(), Some("ROM CORE 1.00"));
        assert_eq!(FieldValue::Unsigned(1).as_str_lossy(), None);
    }

    #[test]
    fn display_forms() {
        assert_eq!(FieldValue::from(-5i32).to_string(), "-5");
        assert_eq!(FieldValue::from(vec![0xAB, 0x01]).to_string(), "ab01");
        assert_eq!(FieldValue::Reserved.to_string(), "-");
        assert_eq!(FieldValue::List(vec![vec![], vec![]]).to_string(), "[2 elements]");
    }

    #[test]
    fn serializes_untagged() {
        let json = serde_json::to_string(&FieldValue::List(vec![vec![
            FieldValue::Unsigned(3),
            FieldValue::Signed(-2),
            FieldValue::Reserved,
        ]]))
        .unwrap();
        assert_eq!(json, "[[3,-2,null]]");
    }
}
