use std::fmt::{Display, Formatter};

use tracing::trace;

use pisc_core::{r#match::MatchKind, schema::TableSchema};

use crate::wire::{KeyMatch, TableEntry};

/// One key field of a decoded entry. Fields the entry does not carry have no kind and no value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRow {
    pub name: String,
    pub kind: Option<MatchKind>,
    pub value: Option<String>,
    /// Mask, prefix length or range upper bound.
    pub secondary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRow {
    pub name: String,
    pub value: String,
}

/// A table entry rendered with schema names, ready to be printed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
    pub keys: Vec<KeyRow>,
    pub is_default: bool,
    pub action: Option<String>,
    pub data: Vec<DataRow>,
}

fn or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}

impl Display for DecodedEntry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_default {
            writeln!(f, "Default entry")?;
        }
        writeln!(f, "Match Key Info")?;
        writeln!(f, "  {:<32} {:<8} {:<24} {}", "Field Name", "Type", "Value", "Mask/Prefix")?;
        for row in &self.keys {
            let kind = row.kind.map_or_else(|| "None".to_owned(), |k| k.to_string());
            writeln!(
                f,
                "  {:<32} {:<8} {:<24} {}",
                row.name,
                kind,
                or_none(&row.value),
                or_none(&row.secondary)
            )?;
        }
        writeln!(f, "Action: {}", self.action.as_deref().unwrap_or("None"))?;
        for row in &self.data {
            writeln!(f, "  {:<32} {}", row.name, row.value)?;
        }
        Ok(())
    }
}

/// Renders read responses against the table they were read from.
pub struct EntryDecoder;

impl EntryDecoder {
    /// Key rows follow the schema order; wire fields are matched by id, not by position.
    pub fn decode(entry: &TableEntry, table: &TableSchema) -> DecodedEntry {
        let keys = table
            .keys
            .iter()
            .map(|spec| match entry.key.iter().find(|k| k.field_id == spec.id) {
                Some(field) => Self::key_row(&spec.name, &field.match_type),
                None => KeyRow {
                    name: spec.name.clone(),
                    kind: None,
                    value: None,
                    secondary: None,
                },
            })
            .collect();

        let (action, data) = match &entry.data {
            Some(data) => {
                let action = table.action_by_id(data.action_id);
                if action.is_none() {
                    trace!(table = %table.name, action_id = data.action_id, "unknown action");
                }
                let rows = data
                    .fields
                    .iter()
                    .filter_map(|field| {
                        let spec = action
                            .and_then(|a| a.param_by_id(field.field_id))
                            .or_else(|| table.data_field(field.field_id));
                        if spec.is_none() {
                            trace!(field_id = field.field_id, "unknown data field skipped");
                        }
                        Some(DataRow {
                            name: spec?.name.clone(),
                            value: hex::encode(&field.value),
                        })
                    })
                    .collect();
                (action.map(|a| a.name.clone()), rows)
            }
            None => (None, vec![]),
        };

        DecodedEntry {
            keys,
            is_default: entry.is_default_entry,
            action,
            data,
        }
    }

    fn key_row(name: &str, match_type: &KeyMatch) -> KeyRow {
        let (kind, value, secondary) = match match_type {
            KeyMatch::Exact { value } => (MatchKind::Exact, hex::encode(value), None),
            KeyMatch::Ternary { value, mask } => {
                (MatchKind::Ternary, hex::encode(value), Some(hex::encode(mask)))
            }
            KeyMatch::Lpm { value, prefix_len } => {
                (MatchKind::Lpm, hex::encode(value), Some(prefix_len.to_string()))
            }
            KeyMatch::Range { low, high } => {
                (MatchKind::Range, hex::encode(low), Some(hex::encode(high)))
            }
        };
        KeyRow {
            name: name.to_owned(),
            kind: Some(kind),
            value: Some(value),
            secondary,
        }
    }
}
