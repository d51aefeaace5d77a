//! # Action
//! Encoding of action parameters. Action data carries a single value, there is no mask or prefix.
use crate::{
    error::Result,
    r#match::{EncodedField, FieldTarget},
    schema::FieldKind,
    value::ClassifiedValue,
};

/// Only MAC, IPv4 and decimal literals are legal action data. Decimals use the parameter's own
/// codec size.
pub fn encode_data(target: &FieldTarget, value: &ClassifiedValue) -> Result<EncodedField> {
    let bytes = match value {
        ClassifiedValue::Mac(mac) => mac.to_vec(),
        ClassifiedValue::Ipv4(ip) => ip.to_vec(),
        ClassifiedValue::Decimal(v) => target.encode_decimal(*v)?,
        _ => return Err(target.unexpected(FieldKind::Action)),
    };
    Ok(EncodedField::single(target.id, bytes))
}
