//! # Match
//!
//! ## Relations of important structs
//! ```text
//!   FieldSpec --(width)--> BitWidthClass
//!       |                       |
//!       v                       v
//!   FieldTarget + ClassifiedValue --FieldEncoder--> EncodedField
//! ```
//!
//! ## Example
//! ```
//! use pisc_core::{
//!     r#match::{BitWidthClass, FieldEncoder, FieldTarget, MatchKind, Secondary},
//!     value::ClassifiedValue,
//! };
//!
//! let target = FieldTarget {
//!     id: 1,
//!     name: "hdr.ipv4.dst_addr",
//!     width: 32,
//!     class: BitWidthClass::Int32,
//!     literal: "10.0.0.0/24",
//! };
//! let value = ClassifiedValue::Cidr { addr: [10, 0, 0, 0], prefix_len: 24 };
//! let field = FieldEncoder::encode_match(MatchKind::Lpm, &target, &value).unwrap();
//! assert_eq!(field.primary, vec![10, 0, 0, 0]);
//! assert_eq!(field.secondary, Some(Secondary::PrefixLen(24)));
//! ```

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};

use serde::Serialize;

use crate::{
    action::encode_data,
    error::{Error, Result},
    schema::FieldKind,
    value::{ClassifiedValue, MaskPair},
};

/// How a key field is compared against packet headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum MatchKind {
    Exact,
    #[serde(rename = "LPM")]
    Lpm,
    Ternary,
    Range,
}

impl Display for MatchKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            MatchKind::Exact => "Exact",
            MatchKind::Lpm => "LPM",
            MatchKind::Ternary => "Ternary",
            MatchKind::Range => "Range",
        };
        f.write_str(name)
    }
}

impl FromStr for MatchKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(MatchKind::Exact),
            "lpm" => Ok(MatchKind::Lpm),
            "ternary" => Ok(MatchKind::Ternary),
            "range" => Ok(MatchKind::Range),
            _ => Err(Error::malformed(format!("unknown match type {s}"))),
        }
    }
}

/// Integer codec size selected from a declared bit width.
///
/// Ranges are closed and non-overlapping: 1..=8, 9..=16, 17..=32, 33..=64. Anything else is a
/// malformed schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BitWidthClass {
    Int8,
    Int16,
    Int32,
    Int64,
}

impl TryFrom<u32> for BitWidthClass {
    type Error = Error;

    fn try_from(width: u32) -> Result<Self> {
        match width {
            1..=8 => Ok(BitWidthClass::Int8),
            9..=16 => Ok(BitWidthClass::Int16),
            17..=32 => Ok(BitWidthClass::Int32),
            33..=64 => Ok(BitWidthClass::Int64),
            _ => Err(Error::malformed(format!(
                "bit width {width} maps to no integer size"
            ))),
        }
    }
}

impl BitWidthClass {
    #[inline]
    pub const fn byte_len(self) -> usize {
        match self {
            BitWidthClass::Int8 => 1,
            BitWidthClass::Int16 => 2,
            BitWidthClass::Int32 => 4,
            BitWidthClass::Int64 => 8,
        }
    }

    #[inline]
    pub const fn bits(self) -> u32 {
        self.byte_len() as u32 * 8
    }

    /// Big-endian, zero padded to [byte_len](Self::byte_len). The caller guarantees that `value`
    /// fits, see [FieldTarget::encode_decimal].
    pub fn encode(self, value: u128) -> Vec<u8> {
        match self {
            BitWidthClass::Int8 => vec![value as u8],
            BitWidthClass::Int16 => (value as u16).to_be_bytes().to_vec(),
            BitWidthClass::Int32 => (value as u32).to_be_bytes().to_vec(),
            BitWidthClass::Int64 => (value as u64).to_be_bytes().to_vec(),
        }
    }
}

/// Largest unsigned value representable in `width` bits.
#[inline]
pub fn max_value(width: u32) -> u128 {
    if width >= u128::BITS {
        u128::MAX
    } else {
        (1u128 << width) - 1
    }
}

/// Everything the encoders need to know about the field a literal is written to.
#[derive(Debug, Clone, Copy)]
pub struct FieldTarget<'a> {
    pub id: u32,
    pub name: &'a str,
    /// Declared width, used by the overflow check.
    pub width: u32,
    /// Codec size, used by the decimal encoding.
    pub class: BitWidthClass,
    pub literal: &'a str,
}

impl FieldTarget<'_> {
    /// Checks the declared width first, then encodes with the codec size.
    pub fn encode_decimal(&self, value: u128) -> Result<Vec<u8>> {
        let max = max_value(self.width);
        if value > max {
            return Err(Error::OverflowValue {
                field: self.name.to_owned(),
                literal: self.literal.to_owned(),
                max,
            });
        }
        Ok(self.class.encode(value))
    }

    pub(crate) fn unexpected(&self, kind: FieldKind) -> Error {
        Error::UnexpectedValue {
            field: self.name.to_owned(),
            kind,
            literal: self.literal.to_owned(),
        }
    }
}

/// Second component of a key field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Secondary {
    Mask(Vec<u8>),
    PrefixLen(u32),
}

/// Bytes ready to be embedded in a write request, keyed by the schema field id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EncodedField {
    pub field_id: u32,
    pub primary: Vec<u8>,
    pub secondary: Option<Secondary>,
}

impl EncodedField {
    #[inline]
    pub fn single(field_id: u32, primary: Vec<u8>) -> Self {
        Self {
            field_id,
            primary,
            secondary: None,
        }
    }

    #[inline]
    pub fn masked(field_id: u32, value: Vec<u8>, mask: Vec<u8>) -> Self {
        Self {
            field_id,
            primary: value,
            secondary: Some(Secondary::Mask(mask)),
        }
    }

    #[inline]
    pub fn prefixed(field_id: u32, addr: Vec<u8>, prefix_len: u32) -> Self {
        Self {
            field_id,
            primary: addr,
            secondary: Some(Secondary::PrefixLen(prefix_len)),
        }
    }
}

/// FieldEncoder turns a classified value into the bytes its match kind (or action data) needs.
pub struct FieldEncoder;

impl FieldEncoder {
    pub fn encode(
        kind: FieldKind,
        target: &FieldTarget,
        value: &ClassifiedValue,
    ) -> Result<EncodedField> {
        match kind {
            FieldKind::Match(m) => Self::encode_match(m, target, value),
            FieldKind::Action => encode_data(target, value),
        }
    }

    pub fn encode_match(
        kind: MatchKind,
        target: &FieldTarget,
        value: &ClassifiedValue,
    ) -> Result<EncodedField> {
        let unexpected = || target.unexpected(FieldKind::Match(kind));
        match kind {
            MatchKind::Exact => {
                let bytes = match value {
                    ClassifiedValue::Mac(mac) => mac.to_vec(),
                    ClassifiedValue::Ipv4(ip) => ip.to_vec(),
                    ClassifiedValue::Hex(v) => v.to_be_bytes().to_vec(),
                    ClassifiedValue::Decimal(v) => target.encode_decimal(*v)?,
                    _ => return Err(unexpected()),
                };
                Ok(EncodedField::single(target.id, bytes))
            }
            MatchKind::Lpm => match value {
                ClassifiedValue::Cidr { addr, prefix_len } => Ok(EncodedField::prefixed(
                    target.id,
                    addr.to_vec(),
                    *prefix_len,
                )),
                _ => Err(unexpected()),
            },
            MatchKind::Ternary => {
                let ClassifiedValue::MaskPair(pair) = value else {
                    return Err(unexpected());
                };
                let (v, m) = match pair {
                    MaskPair::Mac(v, m) => (v.to_vec(), m.to_vec()),
                    MaskPair::Ipv4(v, m) => (v.to_vec(), m.to_vec()),
                    MaskPair::Hex(v, m) => (v.to_be_bytes().to_vec(), m.to_be_bytes().to_vec()),
                    MaskPair::Decimal(v, m) => {
                        (target.encode_decimal(*v)?, target.encode_decimal(*m)?)
                    }
                };
                Ok(EncodedField::masked(target.id, v, m))
            }
            MatchKind::Range => Err(Error::UnsupportedMatchKind {
                field: target.name.to_owned(),
                kind,
            }),
        }
    }
}
