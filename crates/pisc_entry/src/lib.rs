//! This module turns command-line literals into table entry requests and renders table entries
//! read back from the device.
//!
//! A command pairs the fields of its [EntryContext] with the literals it was given
//! ([MatchSetBuilder], [ActionSetBuilder]), the [RequestAssembler] classifies and encodes every
//! record and wraps the result in a [WriteRequest](wire::WriteRequest). The [EntryDecoder] goes
//! the other way for display.
mod assembler;
mod builder;
mod decoder;
pub mod wire;

pub use {
    assembler::{EncodedFields, RequestAssembler},
    builder::{ActionSetBuilder, EntryContext, FieldRecord, MatchSetBuilder},
    decoder::{DataRow, DecodedEntry, EntryDecoder, KeyRow},
};

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use crate::{
        assembler::{EncodedFields, RequestAssembler},
        builder::{ActionSetBuilder, EntryContext, FieldRecord, MatchSetBuilder},
        decoder::{DecodedEntry, EntryDecoder},
        wire::{
            DataField, KeyField, KeyMatch, ReadRequest, TableData, TableEntry, UpdateType,
            WriteRequest,
        },
    };
}
