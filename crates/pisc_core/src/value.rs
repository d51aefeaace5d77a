//! # Classified values
//!
//! A literal typed on the command line is classified once into a [ClassifiedValue], the encoders
//! then dispatch on the variant. A [MaskPair] can only hold two halves of the same kind, so a
//! heterogeneous pair is not representable.

use std::fmt::{Display, Formatter};

/// The kind of one half of a mask pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubKind {
    Mac,
    Ipv4,
    Hex,
    Decimal,
}

impl Display for SubKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SubKind::Mac => "MAC",
            SubKind::Ipv4 => "IPv4",
            SubKind::Hex => "hex",
            SubKind::Decimal => "decimal",
        };
        f.write_str(name)
    }
}

/// Value and mask of a ternary literal, e.g. `10.0.0.1/255.255.255.0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaskPair {
    Mac([u8; 6], [u8; 6]),
    Ipv4([u8; 4], [u8; 4]),
    Hex(u16, u16),
    Decimal(u128, u128),
}

impl MaskPair {
    pub fn sub_kind(&self) -> SubKind {
        match self {
            MaskPair::Mac(..) => SubKind::Mac,
            MaskPair::Ipv4(..) => SubKind::Ipv4,
            MaskPair::Hex(..) => SubKind::Hex,
            MaskPair::Decimal(..) => SubKind::Decimal,
        }
    }
}

/// The grammar a literal matched, with its parsed payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifiedValue {
    Mac([u8; 6]),
    Ipv4([u8; 4]),
    Cidr { addr: [u8; 4], prefix_len: u32 },
    MaskPair(MaskPair),
    Hex(u16),
    Decimal(u128),
    Unrecognized,
}

impl ClassifiedValue {
    #[inline]
    pub fn is_recognized(&self) -> bool {
        !matches!(self, ClassifiedValue::Unrecognized)
    }
}

impl Display for ClassifiedValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassifiedValue::Mac(_) => write!(f, "MAC"),
            ClassifiedValue::Ipv4(_) => write!(f, "IPv4"),
            ClassifiedValue::Cidr { .. } => write!(f, "CIDR"),
            ClassifiedValue::MaskPair(pair) => write!(f, "{} mask pair", pair.sub_kind()),
            ClassifiedValue::Hex(_) => write!(f, "hex"),
            ClassifiedValue::Decimal(_) => write!(f, "decimal"),
            ClassifiedValue::Unrecognized => write!(f, "unrecognized"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_pair_sub_kind() {
        assert_eq!(MaskPair::Hex(0x800, 0xffff).sub_kind(), SubKind::Hex);
        assert_eq!(
            MaskPair::Ipv4([10, 0, 0, 0], [255, 0, 0, 0]).sub_kind(),
            SubKind::Ipv4
        );
        let v = ClassifiedValue::MaskPair(MaskPair::Decimal(1, 3));
        assert_eq!(v.to_string(), "decimal mask pair");
        assert!(!ClassifiedValue::Unrecognized.is_recognized());
    }
}
