//! This module provides the schema model, classified literal values and the match/action field
//! encoders used to build table entries.
pub mod action;
pub mod error;
pub mod r#match;
pub mod schema;
pub mod value;

pub use crate::error::{Error, Result, Side};

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use crate::{
        action::encode_data,
        error::{Error, Result, Side},
        r#match::{BitWidthClass, EncodedField, FieldEncoder, FieldTarget, MatchKind, Secondary},
        schema::{ActionSpec, FieldKind, FieldSpec, Schema, TableSchema},
        value::{ClassifiedValue, MaskPair, SubKind},
    };
}
