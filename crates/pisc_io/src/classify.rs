use nom::{combinator::all_consuming, error::Error as NomError, IResult};

use pisc_core::{
    r#match::BitWidthClass,
    value::{ClassifiedValue, MaskPair, SubKind},
};

use crate::basic::parser::{
    parse_cidr, parse_decimal, parse_hex16, parse_ipv4_dotted, parse_mac,
};

/// Runs `parser` over the whole input.
fn full<'a, O>(
    parser: impl FnMut(&'a str) -> IResult<&'a str, O, NomError<&'a str>>,
    input: &'a str,
) -> Option<O> {
    all_consuming(parser)(input).ok().map(|(_, out)| out)
}

/// One side of a mask pair.
enum Part {
    Mac([u8; 6]),
    Ipv4([u8; 4]),
    Hex(u16),
    Decimal(u128),
}

impl Part {
    fn kind(&self) -> SubKind {
        match self {
            Part::Mac(_) => SubKind::Mac,
            Part::Ipv4(_) => SubKind::Ipv4,
            Part::Hex(_) => SubKind::Hex,
            Part::Decimal(_) => SubKind::Decimal,
        }
    }
}

fn classify_part(part: &str) -> Option<Part> {
    if let Some(mac) = full(parse_mac, part) {
        Some(Part::Mac(mac))
    } else if let Some(ip) = full(parse_ipv4_dotted, part) {
        Some(Part::Ipv4(ip))
    } else if let Some(hex) = full(parse_hex16, part) {
        Some(Part::Hex(hex))
    } else {
        full(parse_decimal, part).map(Part::Decimal)
    }
}

fn split_pair(literal: &str) -> Option<(Part, Part)> {
    if literal.matches('/').count() != 1 {
        return None;
    }
    let (left, right) = literal.split_once('/')?;
    Some((classify_part(left)?, classify_part(right)?))
}

fn mask_pair(literal: &str) -> Option<MaskPair> {
    match split_pair(literal)? {
        (Part::Mac(v), Part::Mac(m)) => Some(MaskPair::Mac(v, m)),
        (Part::Ipv4(v), Part::Ipv4(m)) => Some(MaskPair::Ipv4(v, m)),
        (Part::Hex(v), Part::Hex(m)) => Some(MaskPair::Hex(v, m)),
        (Part::Decimal(v), Part::Decimal(m)) => Some(MaskPair::Decimal(v, m)),
        _ => None,
    }
}

/// Sub-kinds of both halves when `literal` is a `A/B` pair whose halves parse but disagree.
pub fn mask_pair_mismatch(literal: &str) -> Option<(SubKind, SubKind)> {
    let (left, right) = split_pair(literal)?;
    (left.kind() != right.kind()).then(|| (left.kind(), right.kind()))
}

/// Classifies a literal typed for a field of the given codec size.
///
/// Grammars overlap, the first one that accepts the whole literal wins:
/// MAC, bare IPv4 (fields up to 32 bits only), CIDR, mask pair, `0x` hex (16 bits), decimal.
pub fn classify(literal: &str, class: BitWidthClass) -> ClassifiedValue {
    if let Some(mac) = full(parse_mac, literal) {
        return ClassifiedValue::Mac(mac);
    }
    let slashes = literal.matches('/').count();
    if slashes == 0 && class <= BitWidthClass::Int32 {
        if let Some(ip) = full(parse_ipv4_dotted, literal) {
            return ClassifiedValue::Ipv4(ip);
        }
    }
    if slashes == 1 {
        if let Some((addr, prefix_len)) = full(parse_cidr, literal) {
            return ClassifiedValue::Cidr { addr, prefix_len };
        }
        if let Some(pair) = mask_pair(literal) {
            return ClassifiedValue::MaskPair(pair);
        }
    }
    if let Some(hex) = full(parse_hex16, literal) {
        return ClassifiedValue::Hex(hex);
    }
    if let Some(num) = full(parse_decimal, literal) {
        return ClassifiedValue::Decimal(num);
    }
    ClassifiedValue::Unrecognized
}
