//! Typed field specifications.
//!
//! A [`FieldSpec`] describes how one field is laid out on the wire and which
//! values it accepts. Specs are pure data: a message schema is an ordered
//! list of them, and every encode/decode goes through the same spec so the
//! two directions cannot disagree.

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;

use crate::error::{MessageError, Result};
use crate::value::FieldValue;

/// Wire representation of an integer field (UBX `U1`..`I8`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IntType {
    U8,
    I8,
    U16,
    I16,
    U32,
    I32,
    U64,
    I64,
}

impl IntType {
    /// Encoded width in bytes.
    pub fn width(self) -> usize {
        match self {
            IntType::U8 | IntType::I8 => 1,
            IntType::U16 | IntType::I16 => 2,
            IntType::U32 | IntType::I32 => 4,
            IntType::U64 | IntType::I64 => 8,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(self, IntType::I8 | IntType::I16 | IntType::I32 | IntType::I64)
    }

    /// Smallest representable value.
    pub fn min(self) -> i128 {
        match self {
            IntType::U8 | IntType::U16 | IntType::U32 | IntType::U64 => 0,
            IntType::I8 => i8::MIN.into(),
            IntType::I16 => i16::MIN.into(),
            IntType::I32 => i32::MIN.into(),
            IntType::I64 => i64::MIN.into(),
        }
    }

    /// Largest representable value.
    pub fn max(self) -> i128 {
        match self {
            IntType::U8 => u8::MAX.into(),
            IntType::U16 => u16::MAX.into(),
            IntType::U32 => u32::MAX.into(),
            IntType::U64 => u64::MAX.into(),
            IntType::I8 => i8::MAX.into(),
            IntType::I16 => i16::MAX.into(),
            IntType::I32 => i32::MAX.into(),
            IntType::I64 => i64::MAX.into(),
        }
    }

    /// Name used in the UBX protocol documentation.
    pub fn wire_name(self) -> &'static str {
        match self {
            IntType::U8 => "U1",
            IntType::I8 => "I1",
            IntType::U16 => "U2",
            IntType::I16 => "I2",
            IntType::U32 => "U4",
            IntType::I32 => "I4",
            IntType::U64 => "U8",
            IntType::I64 => "I8",
        }
    }

    fn fits(self, raw: i128) -> bool {
        raw >= self.min() && raw <= self.max()
    }

    // `src` must hold at least `width()` bytes.
    fn read(self, mut src: &[u8]) -> i128 {
        match self {
            IntType::U8 => src.get_u8().into(),
            IntType::I8 => src.get_i8().into(),
            IntType::U16 => src.get_u16_le().into(),
            IntType::I16 => src.get_i16_le().into(),
            IntType::U32 => src.get_u32_le().into(),
            IntType::I32 => src.get_i32_le().into(),
            IntType::U64 => src.get_u64_le().into(),
            IntType::I64 => src.get_i64_le().into(),
        }
    }

    // `raw` must satisfy `fits`.
    fn write(self, raw: i128, dst: &mut BytesMut) {
        match self {
            IntType::U8 => dst.put_u8(raw as u8),
            IntType::I8 => dst.put_i8(raw as i8),
            IntType::U16 => dst.put_u16_le(raw as u16),
            IntType::I16 => dst.put_i16_le(raw as i16),
            IntType::U32 => dst.put_u32_le(raw as u32),
            IntType::I32 => dst.put_i32_le(raw as i32),
            IntType::U64 => dst.put_u64_le(raw as u64),
            IntType::I64 => dst.put_i64_le(raw as i64),
        }
    }

    fn to_value(self, raw: i128) -> FieldValue {
        if self.is_signed() {
            FieldValue::Signed(raw as i64)
        } else {
            FieldValue::Unsigned(raw as u64)
        }
    }
}

/// Scaling ratio from raw integer to physical unit: `raw * num / den`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Ratio {
    pub num: i64,
    pub den: i64,
}

impl Ratio {
    pub const fn new(num: i64, den: i64) -> Self {
        Self { num, den }
    }

    /// Physical value of a raw integer. Presentation only.
    pub fn apply(&self, raw: i128) -> f64 {
        raw as f64 * self.num as f64 / self.den as f64
    }
}

/// Inclusive range of valid raw values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ValidRange {
    pub min: i128,
    pub max: i128,
}

impl ValidRange {
    pub fn contains(&self, raw: i128) -> bool {
        raw >= self.min && raw <= self.max
    }
}

/// One named value of an enumeration field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnumVariant {
    pub value: i128,
    pub name: String,
}

/// One named bit of a bitmask field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BitFlag {
    pub bit: u8,
    pub name: String,
}

/// Where a list takes its element count from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListCount {
    /// Elements fill the rest of the payload.
    Remaining,
    /// An earlier unsigned field of the same message holds the count.
    Field(String),
}

impl ListCount {
    pub fn field(name: impl Into<String>) -> Self {
        ListCount::Field(name.into())
    }
}

/// The kind of a field and its kind-specific metadata.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    Int {
        ty: IntType,
        valid: Vec<ValidRange>,
        scaling: Option<Ratio>,
        units: Option<String>,
    },
    Enum {
        ty: IntType,
        variants: Vec<EnumVariant>,
    },
    Bitmask {
        ty: IntType,
        bits: Vec<BitFlag>,
        reserved_mask: u64,
    },
    Reserved {
        width: usize,
    },
    Bytes {
        width: usize,
    },
    List {
        element: Vec<FieldSpec>,
        count: ListCount,
    },
}

impl FieldKind {
    /// Short tag naming the kind, used by presentation layers.
    pub fn tag(&self) -> &'static str {
        match self {
            FieldKind::Int { .. } => "int",
            FieldKind::Enum { .. } => "enum",
            FieldKind::Bitmask { .. } => "bitmask",
            FieldKind::Reserved { .. } => "reserved",
            FieldKind::Bytes { .. } => "bytes",
            FieldKind::List { .. } => "list",
        }
    }
}

/// A named field specification.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
}

impl FieldSpec {
    /// Integer field of the given wire type with no restrictions.
    pub fn int(name: impl Into<String>, ty: IntType) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Int {
                ty,
                valid: Vec::new(),
                scaling: None,
                units: None,
            },
        }
    }

    pub fn u8(name: impl Into<String>) -> Self {
        Self::int(name, IntType::U8)
    }

    pub fn i8(name: impl Into<String>) -> Self {
        Self::int(name, IntType::I8)
    }

    pub fn u16(name: impl Into<String>) -> Self {
        Self::int(name, IntType::U16)
    }

    pub fn i16(name: impl Into<String>) -> Self {
        Self::int(name, IntType::I16)
    }

    pub fn u32(name: impl Into<String>) -> Self {
        Self::int(name, IntType::U32)
    }

    pub fn i32(name: impl Into<String>) -> Self {
        Self::int(name, IntType::I32)
    }

    pub fn u64(name: impl Into<String>) -> Self {
        Self::int(name, IntType::U64)
    }

    pub fn i64(name: impl Into<String>) -> Self {
        Self::int(name, IntType::I64)
    }

    /// Enumeration over a discrete set of named raw values.
    pub fn enumeration(name: impl Into<String>, ty: IntType, variants: &[(i128, &str)]) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Enum {
                ty,
                variants: variants
                    .iter()
                    .map(|(value, name)| EnumVariant {
                        value: *value,
                        name: (*name).to_string(),
                    })
                    .collect(),
            },
        }
    }

    /// Bitmask with named bits (bit 0 is the least significant).
    pub fn bitmask(name: impl Into<String>, ty: IntType, bits: &[(u8, &str)]) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Bitmask {
                ty,
                bits: bits
                    .iter()
                    .map(|(bit, name)| BitFlag {
                        bit: *bit,
                        name: (*name).to_string(),
                    })
                    .collect(),
                reserved_mask: 0,
            },
        }
    }

    /// Reserved padding of `width` bytes.
    pub fn reserved(name: impl Into<String>, width: usize) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Reserved { width },
        }
    }

    /// Opaque block of `width` bytes.
    pub fn bytes(name: impl Into<String>, width: usize) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::Bytes { width },
        }
    }

    /// Variable-length list of `element` bundles.
    pub fn list(name: impl Into<String>, element: Vec<FieldSpec>, count: ListCount) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::List { element, count },
        }
    }

    /// Add a valid range. Several calls accumulate disjoint ranges.
    /// Integer fields only; other kinds are returned unchanged.
    pub fn with_range(mut self, min: i128, max: i128) -> Self {
        if let FieldKind::Int { valid, .. } = &mut self.kind {
            valid.push(ValidRange { min, max });
        }
        self
    }

    /// Attach a scaling ratio. Integer fields only.
    pub fn scaled(mut self, num: i64, den: i64) -> Self {
        if let FieldKind::Int { scaling, .. } = &mut self.kind {
            *scaling = Some(Ratio::new(num, den));
        }
        self
    }

    /// Attach a unit label for the physical value. Integer fields only.
    pub fn with_units(mut self, label: impl Into<String>) -> Self {
        if let FieldKind::Int { units, .. } = &mut self.kind {
            *units = Some(label.into());
        }
        self
    }

    /// Mark bits that must stay clear. Bitmask fields only.
    pub fn with_reserved_bits(mut self, mask: u64) -> Self {
        if let FieldKind::Bitmask { reserved_mask, .. } = &mut self.kind {
            *reserved_mask = mask;
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    pub fn is_reserved(&self) -> bool {
        matches!(self.kind, FieldKind::Reserved { .. })
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, FieldKind::List { .. })
    }

    /// Count source of a list field.
    pub fn list_count(&self) -> Option<&ListCount> {
        match &self.kind {
            FieldKind::List { count, .. } => Some(count),
            _ => None,
        }
    }

    /// Element layout of a list field.
    pub fn element(&self) -> Option<&[FieldSpec]> {
        match &self.kind {
            FieldKind::List { element, .. } => Some(element),
            _ => None,
        }
    }

    /// Wire type of an integer, enumeration or bitmask field.
    pub fn int_type(&self) -> Option<IntType> {
        match &self.kind {
            FieldKind::Int { ty, .. } | FieldKind::Enum { ty, .. } | FieldKind::Bitmask { ty, .. } => {
                Some(*ty)
            }
            _ => None,
        }
    }

    /// Wire width when it does not depend on the value; `None` for lists.
    pub fn fixed_size(&self) -> Option<usize> {
        match &self.kind {
            FieldKind::Int { ty, .. } | FieldKind::Enum { ty, .. } | FieldKind::Bitmask { ty, .. } => {
                Some(ty.width())
            }
            FieldKind::Reserved { width } | FieldKind::Bytes { width } => Some(*width),
            FieldKind::List { .. } => None,
        }
    }

    /// Encoded width of one list element, or of the field itself.
    pub(crate) fn element_size(&self) -> usize {
        match &self.kind {
            FieldKind::List { element, .. } => element.iter().filter_map(|f| f.fixed_size()).sum(),
            _ => self.fixed_size().unwrap_or(0),
        }
    }

    /// Bytes this field occupies when encoding `value`.
    pub fn encoded_size(&self, value: &FieldValue) -> usize {
        match (&self.kind, value) {
            (FieldKind::List { .. }, FieldValue::List(items)) => items.len() * self.element_size(),
            (FieldKind::List { .. }, _) => 0,
            _ => self.fixed_size().unwrap_or(0),
        }
    }

    /// The value a freshly constructed message starts with: the lowest
    /// valid value, the first enum variant, zeroes, or an empty list.
    pub fn default_value(&self) -> FieldValue {
        match &self.kind {
            FieldKind::Int { ty, valid, .. } => {
                ty.to_value(valid.iter().map(|r| r.min).min().unwrap_or(0))
            }
            FieldKind::Enum { ty, variants } => {
                ty.to_value(variants.first().map(|v| v.value).unwrap_or(0))
            }
            FieldKind::Bitmask { ty, .. } => ty.to_value(0),
            FieldKind::Reserved { .. } => FieldValue::Reserved,
            FieldKind::Bytes { width } => FieldValue::Bytes(vec![0; *width]),
            FieldKind::List { .. } => FieldValue::List(Vec::new()),
        }
    }

    fn truncated(&self, needed: usize, available: usize) -> MessageError {
        MessageError::TruncatedData {
            field: self.name.clone(),
            needed,
            available,
        }
    }

    fn mismatch(&self, expected: &'static str) -> MessageError {
        MessageError::TypeMismatch {
            field: self.name.clone(),
            expected,
        }
    }

    fn check_domain(&self, raw: i128) -> Result<()> {
        let ok = match &self.kind {
            FieldKind::Int { ty, valid, .. } => {
                ty.fits(raw) && (valid.is_empty() || valid.iter().any(|r| r.contains(raw)))
            }
            FieldKind::Enum { ty, variants } => {
                if ty.fits(raw) && variants.iter().any(|v| v.value == raw) {
                    return Ok(());
                }
                return Err(MessageError::InvalidEnumValue {
                    field: self.name.clone(),
                    value: raw,
                });
            }
            FieldKind::Bitmask {
                ty, reserved_mask, ..
            } => ty.fits(raw) && (raw as u64) & reserved_mask == 0,
            _ => true,
        };
        if ok {
            Ok(())
        } else {
            Err(MessageError::Range {
                field: self.name.clone(),
                value: raw,
            })
        }
    }

    /// Check that `value` has the right shape and lies in the domain.
    pub fn validate(&self, value: &FieldValue) -> Result<()> {
        self.normalize(value.clone()).map(|_| ())
    }

    /// Validate `value` and convert it to the canonical representation for
    /// this field (e.g. a `Signed(5)` assigned to an unsigned field becomes
    /// `Unsigned(5)`).
    pub fn normalize(&self, value: FieldValue) -> Result<FieldValue> {
        match &self.kind {
            FieldKind::Int { ty, .. } | FieldKind::Enum { ty, .. } | FieldKind::Bitmask { ty, .. } => {
                let raw = value.as_i128().ok_or_else(|| self.mismatch("an integer"))?;
                self.check_domain(raw)?;
                Ok(ty.to_value(raw))
            }
            FieldKind::Reserved { .. } => Ok(FieldValue::Reserved),
            FieldKind::Bytes { width } => match value {
                FieldValue::Bytes(bytes) if bytes.len() == *width => Ok(FieldValue::Bytes(bytes)),
                _ => Err(self.mismatch("a byte block of the declared width")),
            },
            FieldKind::List { element, .. } => {
                let FieldValue::List(items) = value else {
                    return Err(self.mismatch("a list"));
                };
                items
                    .into_iter()
                    .map(|item| {
                        if item.len() != element.len() {
                            return Err(self.mismatch("list elements matching the element layout"));
                        }
                        element
                            .iter()
                            .zip(item)
                            .map(|(spec, v)| spec.normalize(v))
                            .collect::<Result<Vec<_>>>()
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(FieldValue::List)
            }
        }
    }

    /// Decode this field from the front of `src`.
    ///
    /// `count` carries the element count for lists whose count lives in
    /// another field. Returns the value and the number of bytes consumed.
    pub fn decode(&self, src: &[u8], count: Option<usize>) -> Result<(FieldValue, usize)> {
        match &self.kind {
            FieldKind::Int { ty, .. } | FieldKind::Enum { ty, .. } | FieldKind::Bitmask { ty, .. } => {
                let width = ty.width();
                if src.len() < width {
                    return Err(self.truncated(width, src.len()));
                }
                let raw = ty.read(&src[..width]);
                self.check_domain(raw)?;
                Ok((ty.to_value(raw), width))
            }
            FieldKind::Reserved { width } => {
                if src.len() < *width {
                    return Err(self.truncated(*width, src.len()));
                }
                Ok((FieldValue::Reserved, *width))
            }
            FieldKind::Bytes { width } => {
                if src.len() < *width {
                    return Err(self.truncated(*width, src.len()));
                }
                Ok((FieldValue::Bytes(src[..*width].to_vec()), *width))
            }
            FieldKind::List {
                element,
                count: list_count,
            } => {
                let element_size = self.element_size();
                if element_size == 0 {
                    return Err(MessageError::InvalidSchema {
                        schema: self.name.clone(),
                        reason: format!("list {} has no fixed-width element layout", self.name),
                    });
                }
                let n = match (list_count, count) {
                    (ListCount::Remaining, _) => {
                        if src.len() % element_size != 0 {
                            let needed = (src.len() / element_size + 1) * element_size;
                            return Err(self.truncated(needed, src.len()));
                        }
                        src.len() / element_size
                    }
                    (ListCount::Field(_), Some(n)) => {
                        let needed = n.saturating_mul(element_size);
                        if src.len() < needed {
                            return Err(self.truncated(needed, src.len()));
                        }
                        n
                    }
                    (ListCount::Field(count_field), None) => {
                        return Err(MessageError::UnknownField {
                            message: self.name.clone(),
                            field: count_field.clone(),
                        });
                    }
                };

                let mut items = Vec::with_capacity(n);
                let mut offset = 0usize;
                for _ in 0..n {
                    let mut item = Vec::with_capacity(element.len());
                    for spec in element {
                        let (value, used) = spec.decode(&src[offset..], None)?;
                        offset += used;
                        item.push(value);
                    }
                    items.push(item);
                }
                Ok((FieldValue::List(items), offset))
            }
        }
    }

    /// Append the wire form of `value` to `dst`.
    pub fn encode(&self, value: &FieldValue, dst: &mut BytesMut) -> Result<()> {
        match &self.kind {
            FieldKind::Int { ty, .. } | FieldKind::Enum { ty, .. } | FieldKind::Bitmask { ty, .. } => {
                let raw = value.as_i128().ok_or_else(|| self.mismatch("an integer"))?;
                self.check_domain(raw)?;
                ty.write(raw, dst);
            }
            FieldKind::Reserved { width } => dst.put_bytes(0, *width),
            FieldKind::Bytes { width } => match value {
                FieldValue::Bytes(bytes) if bytes.len() == *width => dst.put_slice(bytes),
                _ => return Err(self.mismatch("a byte block of the declared width")),
            },
            FieldKind::List { element, .. } => {
                let items = value.as_list().ok_or_else(|| self.mismatch("a list"))?;
                for item in items {
                    if item.len() != element.len() {
                        return Err(self.mismatch("list elements matching the element layout"));
                    }
                    for (spec, v) in element.iter().zip(item) {
                        spec.encode(v, dst)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Physical value of an integer field: the raw value with the scaling
    /// ratio applied, or the raw value itself when unscaled.
    pub fn physical(&self, value: &FieldValue) -> Option<f64> {
        let raw = value.as_i128()?;
        match &self.kind {
            FieldKind::Int {
                scaling: Some(ratio),
                ..
            } => Some(ratio.apply(raw)),
            FieldKind::Int { .. } => Some(raw as f64),
            _ => None,
        }
    }

    pub fn scaling(&self) -> Option<Ratio> {
        match &self.kind {
            FieldKind::Int { scaling, .. } => *scaling,
            _ => None,
        }
    }

    pub fn units(&self) -> Option<&str> {
        match &self.kind {
            FieldKind::Int { units, .. } => units.as_deref(),
            _ => None,
        }
    }

    /// Name of the enum variant `value` selects.
    pub fn variant_name(&self, value: &FieldValue) -> Option<&str> {
        let raw = value.as_i128()?;
        match &self.kind {
            FieldKind::Enum { variants, .. } => variants
                .iter()
                .find(|v| v.value == raw)
                .map(|v| v.name.as_str()),
            _ => None,
        }
    }

    /// Names of the bits set in a bitmask value.
    pub fn active_bits(&self, value: &FieldValue) -> Vec<&str> {
        let (FieldKind::Bitmask { bits, .. }, Some(raw)) = (&self.kind, value.as_u64()) else {
            return Vec::new();
        };
        bits.iter()
            .filter(|flag| flag.bit < 64 && raw & (1u64 << flag.bit) != 0)
            .map(|flag| flag.name.as_str())
            .collect()
    }

    /// Whether the named bit is set in a bitmask value.
    pub fn bit(&self, value: &FieldValue, name: &str) -> Option<bool> {
        let FieldKind::Bitmask { bits, .. } = &self.kind else {
            return None;
        };
        let flag = bits.iter().find(|flag| flag.name == name)?;
        let raw = value.as_u64()?;
        Some(flag.bit < 64 && raw & (1u64 << flag.bit) != 0)
    }

    /// Structural checks run when a schema is built.
    pub(crate) fn check(&self) -> std::result::Result<(), String> {
        match &self.kind {
            FieldKind::Int {
                ty, valid, scaling, ..
            } => {
                if let Some(r) = valid.iter().find(|r| r.min > r.max || !ty.fits(r.min) || !ty.fits(r.max)) {
                    return Err(format!(
                        "field {}: range {}..={} does not fit {}",
                        self.name,
                        r.min,
                        r.max,
                        ty.wire_name()
                    ));
                }
                if matches!(scaling, Some(ratio) if ratio.den == 0) {
                    return Err(format!("field {}: zero scaling denominator", self.name));
                }
            }
            FieldKind::Enum { ty, variants } => {
                if variants.is_empty() {
                    return Err(format!("field {}: enumeration without variants", self.name));
                }
                if let Some(v) = variants.iter().find(|v| !ty.fits(v.value)) {
                    return Err(format!(
                        "field {}: variant {} does not fit {}",
                        self.name,
                        v.name,
                        ty.wire_name()
                    ));
                }
            }
            FieldKind::Bitmask { ty, bits, .. } => {
                if ty.is_signed() {
                    return Err(format!("field {}: bitmask must be unsigned", self.name));
                }
                if let Some(flag) = bits.iter().find(|flag| usize::from(flag.bit) >= ty.width() * 8) {
                    return Err(format!(
                        "field {}: bit {} outside {}",
                        self.name,
                        flag.name,
                        ty.wire_name()
                    ));
                }
            }
            FieldKind::Reserved { width } | FieldKind::Bytes { width } => {
                if *width == 0 {
                    return Err(format!("field {}: zero width", self.name));
                }
            }
            FieldKind::List { element, .. } => {
                if element.is_empty() {
                    return Err(format!("list {}: empty element layout", self.name));
                }
                for spec in element {
                    if spec.fixed_size().is_none() {
                        return Err(format!(
                            "list {}: element field {} is not fixed width",
                            self.name, spec.name
                        ));
                    }
                    spec.check()?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(spec: &FieldSpec, value: &FieldValue) -> Vec<u8> {
        let mut dst = BytesMut::new();
        spec.encode(value, &mut dst).unwrap();
        dst.to_vec()
    }

    #[test]
    fn integers_are_little_endian() {
        let spec = FieldSpec::u32("iTOW");
        let (value, used) = spec.decode(&[0x78, 0x56, 0x34, 0x12, 0xFF], None).unwrap();
        assert_eq!(value, FieldValue::Unsigned(0x1234_5678));
        assert_eq!(used, 4);
        assert_eq!(encode(&spec, &value), vec![0x78, 0x56, 0x34, 0x12]);

        let spec = FieldSpec::i16("azim");
        let (value, _) = spec.decode(&[0xFE, 0xFF], None).unwrap();
        assert_eq!(value, FieldValue::Signed(-2));
        assert_eq!(encode(&spec, &value), vec![0xFE, 0xFF]);
    }

    #[test]
    fn extreme_widths_roundtrip() {
        for (spec, bytes) in [
            (FieldSpec::u64("a"), vec![0xFF; 8]),
            (FieldSpec::i64("b"), vec![0x00, 0, 0, 0, 0, 0, 0, 0x80]),
            (FieldSpec::i8("c"), vec![0x80]),
        ] {
            let (value, _) = spec.decode(&bytes, None).unwrap();
            assert_eq!(encode(&spec, &value), bytes);
        }
    }

    #[test]
    fn range_checked_on_decode_and_assignment() {
        let spec = FieldSpec::u8("version").with_range(0, 0);
        assert!(spec.decode(&[0], None).is_ok());
        assert!(matches!(
            spec.decode(&[1], None),
            Err(MessageError::Range { value: 1, .. })
        ));
        assert!(matches!(
            spec.normalize(FieldValue::Unsigned(3)),
            Err(MessageError::Range { .. })
        ));
    }

    #[test]
    fn disjoint_ranges() {
        let spec = FieldSpec::u8("svid").with_range(1, 32).with_range(120, 158);
        assert!(spec.validate(&FieldValue::Unsigned(5)).is_ok());
        assert!(spec.validate(&FieldValue::Unsigned(130)).is_ok());
        assert!(spec.validate(&FieldValue::Unsigned(60)).is_err());
        assert_eq!(spec.default_value(), FieldValue::Unsigned(1));
    }

    #[test]
    fn value_must_fit_wire_type() {
        let spec = FieldSpec::u8("numSV");
        assert!(matches!(
            spec.normalize(FieldValue::Unsigned(256)),
            Err(MessageError::Range { .. })
        ));
        assert!(matches!(
            spec.normalize(FieldValue::Signed(-1)),
            Err(MessageError::Range { .. })
        ));
        assert_eq!(
            spec.normalize(FieldValue::Signed(7)).unwrap(),
            FieldValue::Unsigned(7)
        );
    }

    #[test]
    fn scaled_field_keeps_raw_value() {
        let spec = FieldSpec::i32("lon").scaled(1, 100_000).with_units("deg");
        let raw = FieldValue::Signed(1_234_500);
        let bytes = encode(&spec, &raw);
        let (decoded, _) = spec.decode(&bytes, None).unwrap();

        assert_eq!(decoded, FieldValue::Signed(1_234_500));
        let physical = spec.physical(&decoded).unwrap();
        assert!((physical - 12.345).abs() < 1e-9);
        assert_eq!(spec.units(), Some("deg"));
        assert_eq!(spec.scaling(), Some(Ratio::new(1, 100_000)));
    }

    #[test]
    fn list_without_element_layout_is_rejected() {
        let spec = FieldSpec::list("items", Vec::new(), ListCount::Remaining);
        assert!(matches!(
            spec.decode(&[1, 2], None),
            Err(MessageError::InvalidSchema { .. })
        ));
        assert!(matches!(
            spec.decode(&[], None),
            Err(MessageError::InvalidSchema { .. })
        ));

        let counted = FieldSpec::list("items", Vec::new(), ListCount::field("n"));
        assert!(matches!(
            counted.decode(&[1], Some(3)),
            Err(MessageError::InvalidSchema { .. })
        ));
    }

    #[test]
    fn enumeration_rejects_undeclared_values() {
        let spec = FieldSpec::enumeration("fixType", IntType::U8, &[(2, "2D-Fix"), (3, "3D-Fix")]);
        let (value, _) = spec.decode(&[3], None).unwrap();
        assert_eq!(spec.variant_name(&value), Some("3D-Fix"));
        assert!(matches!(
            spec.decode(&[4], None),
            Err(MessageError::InvalidEnumValue { value: 4, .. })
        ));
        assert!(matches!(
            spec.normalize(FieldValue::Unsigned(0)),
            Err(MessageError::InvalidEnumValue { .. })
        ));
        assert_eq!(spec.default_value(), FieldValue::Unsigned(2));
    }

    #[test]
    fn bitmask_named_bits_and_reserved_bits() {
        let spec = FieldSpec::bitmask("flags", IntType::U8, &[(0, "svUsed"), (1, "diffCorr")])
            .with_reserved_bits(0x80);
        let (value, _) = spec.decode(&[0x03], None).unwrap();
        assert_eq!(spec.active_bits(&value), vec!["svUsed", "diffCorr"]);
        assert_eq!(spec.bit(&value, "diffCorr"), Some(true));
        assert_eq!(spec.bit(&value, "nope"), None);
        assert!(matches!(
            spec.decode(&[0x81], None),
            Err(MessageError::Range { .. })
        ));
    }

    #[test]
    fn reserved_is_hidden_and_encodes_zero() {
        let spec = FieldSpec::reserved("reserved1", 3);
        let (value, used) = spec.decode(&[0xAA, 0xBB, 0xCC], None).unwrap();
        assert_eq!(value, FieldValue::Reserved);
        assert_eq!(used, 3);
        assert_eq!(encode(&spec, &value), vec![0, 0, 0]);
        assert!(spec.decode(&[0xAA], None).is_err());
    }

    #[test]
    fn byte_block_width_enforced() {
        let spec = FieldSpec::bytes("hwVersion", 4);
        let (value, _) = spec.decode(b"0004extra", None).unwrap();
        assert_eq!(value.as_bytes(), Some(b"0004".as_slice()));
        assert!(matches!(
            spec.normalize(FieldValue::Bytes(vec![1, 2])),
            Err(MessageError::TypeMismatch { .. })
        ));
    }

    fn block() -> Vec<FieldSpec> {
        vec![FieldSpec::u8("svid"), FieldSpec::i16("prRes")]
    }

    #[test]
    fn remaining_list_requires_exact_multiple() {
        let spec = FieldSpec::list("sats", block(), ListCount::Remaining);
        let (value, used) = spec
            .decode(&[1, 0x10, 0x00, 2, 0xFF, 0xFF], None)
            .unwrap();
        assert_eq!(used, 6);
        assert_eq!(
            value,
            FieldValue::List(vec![
                vec![FieldValue::Unsigned(1), FieldValue::Signed(16)],
                vec![FieldValue::Unsigned(2), FieldValue::Signed(-1)],
            ])
        );
        assert_eq!(spec.encoded_size(&value), 6);

        assert!(matches!(
            spec.decode(&[1, 0x10, 0x00, 2], None),
            Err(MessageError::TruncatedData {
                needed: 6,
                available: 4,
                ..
            })
        ));
    }

    #[test]
    fn counted_list_uses_supplied_count() {
        let spec = FieldSpec::list("sats", block(), ListCount::field("numSV"));
        let (value, used) = spec.decode(&[1, 0, 0, 2, 0, 0, 9], Some(2)).unwrap();
        assert_eq!(value.as_list().map(|l| l.len()), Some(2));
        assert_eq!(used, 6);

        assert!(matches!(
            spec.decode(&[1, 0, 0], Some(2)),
            Err(MessageError::TruncatedData { .. })
        ));
    }

    #[test]
    fn list_normalizes_elements() {
        let spec = FieldSpec::list("sats", block(), ListCount::Remaining);
        let value = spec
            .normalize(FieldValue::List(vec![vec![
                FieldValue::Signed(4),
                FieldValue::Unsigned(5),
            ]]))
            .unwrap();
        assert_eq!(
            value,
            FieldValue::List(vec![vec![FieldValue::Unsigned(4), FieldValue::Signed(5)]])
        );
        assert!(spec
            .normalize(FieldValue::List(vec![vec![FieldValue::Unsigned(4)]]))
            .is_err());
    }

    #[test]
    fn structural_checks() {
        assert!(FieldSpec::u8("x").with_range(0, 300).check().is_err());
        assert!(FieldSpec::enumeration("e", IntType::U8, &[]).check().is_err());
        assert!(FieldSpec::bitmask("b", IntType::I8, &[]).check().is_err());
        assert!(FieldSpec::bitmask("b", IntType::U8, &[(8, "x")]).check().is_err());
        assert!(FieldSpec::bytes("z", 0).check().is_err());
        assert!(FieldSpec::u16("s").scaled(1, 0).check().is_err());
        let nested = FieldSpec::list(
            "outer",
            vec![FieldSpec::list("inner", block(), ListCount::Remaining)],
            ListCount::Remaining,
        );
        assert!(nested.check().is_err());
        assert!(FieldSpec::list("ok", block(), ListCount::Remaining).check().is_ok());
    }
}
