//! Transport independent model of the table entry messages exchanged with the device. The RPC
//! layer converts these into its own message types; byte fields serialize as hex strings.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use pisc_core::{
    r#match::{EncodedField, Secondary},
    schema::Schema,
};

/// Name prefixes of the ingress and egress pipeline tables a reset clears.
pub const RESET_PREFIXES: [&str; 2] = ["pipe.SwitchIngress.", "pipe.SwitchEgress."];

/// The per-kind payload of a key field. The variant is the match kind tag of the wire message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyMatch {
    Exact {
        #[serde(with = "hex")]
        value: Vec<u8>,
    },
    Ternary {
        #[serde(with = "hex")]
        value: Vec<u8>,
        #[serde(with = "hex")]
        mask: Vec<u8>,
    },
    Lpm {
        #[serde(with = "hex")]
        value: Vec<u8>,
        prefix_len: u32,
    },
    Range {
        #[serde(with = "hex")]
        low: Vec<u8>,
        #[serde(with = "hex")]
        high: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyField {
    pub field_id: u32,
    pub match_type: KeyMatch,
}

impl From<EncodedField> for KeyField {
    fn from(field: EncodedField) -> Self {
        let match_type = match field.secondary {
            None => KeyMatch::Exact {
                value: field.primary,
            },
            Some(Secondary::Mask(mask)) => KeyMatch::Ternary {
                value: field.primary,
                mask,
            },
            Some(Secondary::PrefixLen(prefix_len)) => KeyMatch::Lpm {
                value: field.primary,
                prefix_len,
            },
        };
        KeyField {
            field_id: field.field_id,
            match_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataField {
    pub field_id: u32,
    #[serde(with = "hex")]
    pub value: Vec<u8>,
}

impl From<EncodedField> for DataField {
    #[inline]
    fn from(field: EncodedField) -> Self {
        DataField {
            field_id: field.field_id,
            value: field.primary,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    pub action_id: u32,
    #[serde(default)]
    pub fields: Vec<DataField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub table_id: u32,
    #[serde(default)]
    pub key: Vec<KeyField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<TableData>,
    #[serde(default)]
    pub is_default_entry: bool,
}

impl TableEntry {
    #[inline]
    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UpdateType {
    Insert,
    Modify,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    #[serde(rename = "type")]
    pub update_type: UpdateType,
    pub entity: TableEntry,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteRequest {
    pub updates: Vec<Update>,
}

impl WriteRequest {
    /// A request holding a single update of one table.
    pub fn single(
        update_type: UpdateType,
        table_id: u32,
        key: Vec<KeyField>,
        data: Option<TableData>,
    ) -> Self {
        let mut req = Self::default();
        req.push(update_type, table_id, key, data);
        req
    }

    pub fn push(
        &mut self,
        update_type: UpdateType,
        table_id: u32,
        key: Vec<KeyField>,
        data: Option<TableData>,
    ) {
        self.updates.push(Update {
            update_type,
            entity: TableEntry {
                table_id,
                key,
                data,
                is_default_entry: false,
            },
        });
    }

    /// Deletes every keyed entry of a read response. The default entry cannot be deleted and is
    /// skipped.
    pub fn delete_all(table_id: u32, entries: &[TableEntry]) -> Self {
        let mut req = Self::default();
        req.push_deletes(table_id, entries);
        req
    }

    /// Clears every user table of the pipeline: deletes the keyed entries of a multi-table read
    /// response whose table name starts with one of [RESET_PREFIXES]. Entries of other tables are
    /// left alone.
    pub fn reset(schema: &Schema, entries: &[TableEntry]) -> Self {
        let mut req = Self::default();
        for table in schema.tables() {
            if !RESET_PREFIXES.iter().any(|p| table.name.starts_with(p)) {
                continue;
            }
            let before = req.len();
            req.push_deletes(table.id, entries.iter().filter(|e| e.table_id == table.id));
            debug!(table = %table.name, deletes = req.len() - before, "table cleared");
        }
        req
    }

    fn push_deletes<'e>(
        &mut self,
        table_id: u32,
        entries: impl IntoIterator<Item = &'e TableEntry>,
    ) {
        for (pos, entry) in entries.into_iter().enumerate() {
            if entry.has_key() {
                self.push(UpdateType::Delete, table_id, entry.key.clone(), None);
            } else if entry.is_default_entry {
                debug!(pos, "default entry skipped");
            } else {
                warn!(pos, table_id, "entry without key fields skipped");
            }
        }
    }

    /// Deletes the entries at `positions` (indices into the read response). Returns the request
    /// and the positions that do not name a keyed entry.
    pub fn delete_positions(
        table_id: u32,
        entries: &[TableEntry],
        positions: &[usize],
    ) -> (Self, Vec<usize>) {
        let mut req = Self::default();
        let mut missing = vec![];
        let mut done: Vec<usize> = Vec::with_capacity(positions.len());
        for &pos in positions {
            if done.contains(&pos) {
                continue;
            }
            match entries.get(pos) {
                Some(entry) if entry.has_key() => {
                    req.push(UpdateType::Delete, table_id, entry.key.clone(), None);
                    done.push(pos);
                }
                _ => missing.push(pos),
            }
        }
        (req, missing)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.updates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadRequest {
    pub entities: Vec<TableEntry>,
}

impl ReadRequest {
    /// Reads all entries of a table.
    pub fn table(table_id: u32) -> Self {
        ReadRequest {
            entities: vec![TableEntry {
                table_id,
                key: vec![],
                data: None,
                is_default_entry: false,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: Vec<KeyField>, is_default_entry: bool) -> TableEntry {
        TableEntry {
            table_id: 5,
            key,
            data: Some(TableData {
                action_id: 9,
                fields: vec![],
            }),
            is_default_entry,
        }
    }

    fn exact(id: u32, value: u8) -> KeyField {
        KeyField {
            field_id: id,
            match_type: KeyMatch::Exact { value: vec![value] },
        }
    }

    #[test]
    fn test_key_field_from_encoded() {
        let k = KeyField::from(EncodedField::prefixed(2, vec![10, 0, 0, 0], 8));
        assert_eq!(
            k.match_type,
            KeyMatch::Lpm {
                value: vec![10, 0, 0, 0],
                prefix_len: 8
            }
        );
        let k = KeyField::from(EncodedField::masked(3, vec![1], vec![3]));
        assert_eq!(
            k.match_type,
            KeyMatch::Ternary {
                value: vec![1],
                mask: vec![3]
            }
        );
        let d = DataField::from(EncodedField::single(4, vec![0, 1]));
        assert_eq!(d.value, vec![0, 1]);
    }

    #[test]
    fn test_delete_all() {
        let entries = vec![
            entry(vec![exact(1, 1)], false),
            entry(vec![], true),
            entry(vec![exact(1, 2)], false),
            entry(vec![], false),
        ];
        let req = WriteRequest::delete_all(5, &entries);
        assert_eq!(req.len(), 2);
        for u in &req.updates {
            assert_eq!(u.update_type, UpdateType::Delete);
            assert_eq!(u.entity.data, None);
        }
        assert_eq!(req.updates[1].entity.key, vec![exact(1, 2)]);
    }

    #[test]
    fn test_reset() {
        use pisc_core::schema::TableSchema;

        let table = |id: u32, name: &str| TableSchema {
            id,
            name: name.to_owned(),
            table_type: "MatchAction_Direct".to_owned(),
            size: 16,
            keys: vec![],
            actions: vec![],
            data: vec![],
        };
        let schema = Schema::new(vec![
            table(5, "pipe.SwitchIngress.acl"),
            table(6, "pipe.SwitchEgress.rewrite"),
            table(7, "$PORT"),
        ]);
        let mut rewrite = entry(vec![exact(2, 9)], false);
        rewrite.table_id = 6;
        let mut port = entry(vec![exact(3, 1)], false);
        port.table_id = 7;
        let entries = vec![
            entry(vec![exact(1, 1)], false),
            port,
            entry(vec![], true),
            rewrite,
            entry(vec![exact(1, 2)], false),
        ];

        let req = WriteRequest::reset(&schema, &entries);
        let deleted: Vec<_> = req
            .updates
            .iter()
            .map(|u| (u.entity.table_id, u.entity.key.clone()))
            .collect();
        assert_eq!(
            deleted,
            vec![
                (5, vec![exact(1, 1)]),
                (5, vec![exact(1, 2)]),
                (6, vec![exact(2, 9)]),
            ]
        );
        assert!(req.updates.iter().all(|u| u.update_type == UpdateType::Delete));
        assert!(WriteRequest::reset(&schema, &[]).is_empty());
    }

    #[test]
    fn test_delete_positions() {
        let entries = vec![entry(vec![exact(1, 1)], false), entry(vec![exact(1, 2)], false)];
        let (req, missing) = WriteRequest::delete_positions(5, &entries, &[1, 1, 7]);
        assert_eq!(req.len(), 1);
        assert_eq!(req.updates[0].entity.key, vec![exact(1, 2)]);
        assert_eq!(missing, vec![7]);
    }

    #[test]
    fn test_read_request() {
        let req = ReadRequest::table(42);
        assert_eq!(req.entities.len(), 1);
        assert_eq!(req.entities[0].table_id, 42);
        assert!(!req.entities[0].has_key());
    }
}
