//! This module provides text-side parsing: the literal grammars accepted on the command line, the
//! classification of a literal into a [ClassifiedValue](pisc_core::value::ClassifiedValue), and
//! loading of the device schema from its BfRt JSON description.
mod classify;
mod default;

use std::path::Path;

use thiserror::Error;
use tracing::debug;

use pisc_core::schema::Schema;

pub use classify::{classify, mask_pair_mismatch};
pub use default::BfRtSchemaLoader;

/// Errors raised while turning schema metadata into a [Schema].
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("read schema: {0}")]
    Io(#[from] std::io::Error),

    #[error("decode schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("key {field} of table {table} has unknown match type {match_type}")]
    UnknownMatchType {
        table: String,
        field: String,
        match_type: String,
    },
}

/// SchemaLoader decodes the table/action metadata a device publishes into a [Schema].
///
/// ***The trait and the format are manufacture-specific.***
pub trait SchemaLoader {
    // Required method
    fn _load(&self, content: &str) -> Result<Schema, LoadError>;

    // Provided methods
    fn load(&self, content: &str) -> Result<Schema, LoadError> {
        let schema = self._load(content)?;
        debug!(tables = schema.tables().len(), "schema loaded");
        Ok(schema)
    }

    fn load_file(&self, path: impl AsRef<Path>) -> Result<Schema, LoadError> {
        let content = std::fs::read_to_string(path)?;
        self.load(&content)
    }
}

/// Basics for io
pub mod basic {
    /// Literal grammars, each parser consumes a prefix of its input.
    pub mod parser {
        use nom::bytes::complete::{tag_no_case, take_while_m_n};
        use nom::character::complete::{char, digit1, hex_digit1};
        use nom::error::{ErrorKind, ParseError};
        use nom::sequence::{preceded, separated_pair, tuple};
        use nom::Err::Error;
        use nom::IResult;

        /// r"[0-9a-fA-F]{2}"
        fn parse_hex_octet<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, u8, E> {
            let (rest, digits) = take_while_m_n(2, 2, |c: char| c.is_ascii_hexdigit())(input)?;
            if let Ok(num) = u8::from_str_radix(digits, 16) {
                Ok((rest, num))
            } else {
                Err(Error(E::from_error_kind(input, ErrorKind::HexDigit)))
            }
        }

        /// r"xx:xx:xx:xx:xx:xx"
        pub fn parse_mac<'a, E: ParseError<&'a str>>(
            input: &'a str,
        ) -> IResult<&'a str, [u8; 6], E> {
            let (rest, (o1, _, o2, _, o3, _, o4, _, o5, _, o6)) = tuple((
                parse_hex_octet,
                char(':'),
                parse_hex_octet,
                char(':'),
                parse_hex_octet,
                char(':'),
                parse_hex_octet,
                char(':'),
                parse_hex_octet,
                char(':'),
                parse_hex_octet,
            ))(input)?;
            Ok((rest, [o1, o2, o3, o4, o5, o6]))
        }

        /// r"[<=255].[<=255].[<=255].[<=255]"
        pub fn parse_ipv4_dotted<'a, E: ParseError<&'a str>>(
            input: &'a str,
        ) -> IResult<&'a str, [u8; 4], E> {
            fn parse_u8<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, u8, E> {
                let (rest, num) = digit1(input)?;
                if let Ok(num) = num.parse::<u8>() {
                    Ok((rest, num))
                } else {
                    Err(Error(E::from_error_kind(input, ErrorKind::Digit)))
                }
            }

            let (rest, (o1, _, o2, _, o3, _, o4)) = tuple((
                parse_u8,
                char('.'),
                parse_u8,
                char('.'),
                parse_u8,
                char('.'),
                parse_u8,
            ))(input)?;
            Ok((rest, [o1, o2, o3, o4]))
        }

        /// r"[<=32]"
        pub fn parse_prefix_len<'a, E: ParseError<&'a str>>(
            input: &'a str,
        ) -> IResult<&'a str, u32, E> {
            let (rest, num) = digit1(input)?;
            match num.parse::<u32>() {
                Ok(num) if num <= 32 => Ok((rest, num)),
                _ => Err(Error(E::from_error_kind(input, ErrorKind::Digit))),
            }
        }

        /// "<ipv4>/<prefix_len>"
        pub fn parse_cidr<'a, E: ParseError<&'a str>>(
            input: &'a str,
        ) -> IResult<&'a str, ([u8; 4], u32), E> {
            separated_pair(parse_ipv4_dotted, char('/'), parse_prefix_len)(input)
        }

        /// r"0[xX][0-9a-fA-F]+", at most 16 bits
        pub fn parse_hex16<'a, E: ParseError<&'a str>>(input: &'a str) -> IResult<&'a str, u16, E> {
            let (rest, digits) = preceded(tag_no_case("0x"), hex_digit1)(input)?;
            if let Ok(num) = u16::from_str_radix(digits, 16) {
                Ok((rest, num))
            } else {
                Err(Error(E::from_error_kind(input, ErrorKind::HexDigit)))
            }
        }

        /// r"[0-9]+", saturates at `u128::MAX` so that any digit string stays a decimal
        pub fn parse_decimal<'a, E: ParseError<&'a str>>(
            input: &'a str,
        ) -> IResult<&'a str, u128, E> {
            let (rest, num) = digit1(input)?;
            // only digits here, parsing can fail on overflow alone
            Ok((rest, num.parse::<u128>().unwrap_or(u128::MAX)))
        }

    }
}

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use crate::{classify, mask_pair_mismatch, BfRtSchemaLoader, LoadError, SchemaLoader};
}
