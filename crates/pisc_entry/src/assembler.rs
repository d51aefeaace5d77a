use fxhash::FxBuildHasher;
use indexmap::IndexMap;
use tracing::{debug, trace};

use pisc_core::{
    error::{Error, Result},
    r#match::{EncodedField, FieldEncoder, FieldTarget, MatchKind},
    schema::FieldKind,
};
use pisc_io::{classify, mask_pair_mismatch};

use crate::{
    builder::{ActionSetBuilder, EntryContext, FieldRecord, MatchSetBuilder},
    wire::{DataField, KeyField, TableData, UpdateType, WriteRequest},
};

/// Encoded fields keyed by field id, in the order the records were given.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedFields(IndexMap<u32, EncodedField, FxBuildHasher>);

impl EncodedFields {
    #[inline]
    pub fn get(&self, field_id: u32) -> Option<&EncodedField> {
        self.0.get(&field_id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EncodedField> + '_ {
        self.0.values()
    }

    pub fn into_key_fields(self) -> Vec<KeyField> {
        self.into_iter().map(KeyField::from).collect()
    }

    pub fn into_data_fields(self) -> Vec<DataField> {
        self.into_iter().map(DataField::from).collect()
    }
}

impl IntoIterator for EncodedFields {
    type Item = EncodedField;
    type IntoIter = indexmap::map::IntoValues<u32, EncodedField>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_values()
    }
}

/// Turns field records into encoded fields. Stops at the first literal that cannot be encoded;
/// a failed command never yields a partial field set.
pub struct RequestAssembler;

impl RequestAssembler {
    /// Classifies and encodes a single record.
    pub fn encode_record(record: &FieldRecord) -> Result<EncodedField> {
        if record.kind == FieldKind::Match(MatchKind::Range) {
            return Err(Error::UnsupportedMatchKind {
                field: record.name.to_owned(),
                kind: MatchKind::Range,
            });
        }
        let class = record.class()?;
        let value = classify(record.literal, class);
        trace!(field = record.name, literal = record.literal, %value, "literal classified");
        if !value.is_recognized() {
            if record.kind == FieldKind::Match(MatchKind::Ternary) {
                if let Some((left, right)) = mask_pair_mismatch(record.literal) {
                    return Err(Error::HeterogeneousMaskPair {
                        field: record.name.to_owned(),
                        literal: record.literal.to_owned(),
                        left,
                        right,
                    });
                }
            }
            return Err(Error::UnclassifiableValue {
                field: record.name.to_owned(),
                position: record.position,
                literal: record.literal.to_owned(),
            });
        }
        let target = FieldTarget {
            id: record.id,
            name: record.name,
            width: record.width,
            class,
            literal: record.literal,
        };
        FieldEncoder::encode(record.kind, &target, &value)
    }

    pub fn assemble(records: &[FieldRecord]) -> Result<EncodedFields> {
        let mut fields =
            IndexMap::with_capacity_and_hasher(records.len(), FxBuildHasher::default());
        for record in records {
            let field = Self::encode_record(record)?;
            if fields.insert(record.id, field).is_some() {
                return Err(Error::malformed(format!(
                    "field id {} appears twice ({})",
                    record.id, record.name
                )));
            }
        }
        Ok(EncodedFields(fields))
    }

    /// Builds the single-update write request of one command. Both literal lists are checked
    /// against the schema before anything is encoded. `DELETE` carries no action data and
    /// ignores the action side.
    pub fn write_request<'a, S: AsRef<str>>(
        ctx: &EntryContext<'a>,
        update_type: UpdateType,
        match_literals: &'a [S],
        action_literals: &'a [S],
    ) -> Result<WriteRequest> {
        let match_records = MatchSetBuilder::build(ctx, match_literals)?;
        let action_records = match update_type {
            UpdateType::Delete => vec![],
            UpdateType::Insert | UpdateType::Modify => {
                ActionSetBuilder::build(ctx, action_literals)?
            }
        };

        let key = Self::assemble(&match_records)?.into_key_fields();
        let data = match (update_type, ctx.action) {
            (UpdateType::Delete, _) | (_, None) => None,
            (_, Some(action)) => Some(TableData {
                action_id: action.id,
                fields: Self::assemble(&action_records)?.into_data_fields(),
            }),
        };
        debug!(
            table = %ctx.table.name,
            ?update_type,
            keys = key.len(),
            data = data.as_ref().map_or(0, |d| d.fields.len()),
            "write request assembled"
        );
        Ok(WriteRequest::single(update_type, ctx.table.id, key, data))
    }
}
