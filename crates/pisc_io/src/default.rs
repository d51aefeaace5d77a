use serde::Deserialize;
use tracing::trace;

use pisc_core::{
    r#match::MatchKind,
    schema::{ActionSpec, FieldSpec, Schema, TableSchema},
};

use crate::{LoadError, SchemaLoader};

/// `{"type": "bytes", "width": 48}`, integer types may omit the width.
#[derive(Debug, Deserialize)]
struct RawType {
    #[serde(rename = "type")]
    name: String,
    #[serde(default)]
    width: Option<u32>,
}

impl RawType {
    fn width(&self) -> u32 {
        self.width.unwrap_or(match self.name.as_str() {
            "bool" => 1,
            "uint8" => 8,
            "uint16" => 16,
            "uint32" => 32,
            "uint64" => 64,
            _ => 0,
        })
    }
}

#[derive(Debug, Deserialize)]
struct RawKey {
    id: u32,
    name: String,
    match_type: String,
    #[serde(rename = "type")]
    ty: RawType,
}

#[derive(Debug, Deserialize)]
struct RawField {
    id: u32,
    name: String,
    #[serde(rename = "type")]
    ty: RawType,
}

impl From<RawField> for FieldSpec {
    fn from(raw: RawField) -> Self {
        FieldSpec::param(raw.id, raw.name, raw.ty.width())
    }
}

#[derive(Debug, Deserialize)]
struct RawActionSpec {
    id: u32,
    name: String,
    #[serde(default)]
    data: Vec<RawField>,
}

/// Table data is either a singleton or a oneof group, only singletons carry a name we can use.
#[derive(Debug, Deserialize)]
struct RawData {
    #[serde(default)]
    singleton: Option<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawTable {
    id: u32,
    name: String,
    #[serde(default)]
    table_type: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    key: Vec<RawKey>,
    #[serde(default)]
    action_specs: Vec<RawActionSpec>,
    #[serde(default)]
    data: Vec<RawData>,
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    tables: Vec<RawTable>,
}

/// Loads the `bf-rt.json` description a device publishes for its pipeline.
#[derive(Default)]
pub struct BfRtSchemaLoader {}

impl BfRtSchemaLoader {
    fn table(raw: RawTable) -> Result<TableSchema, LoadError> {
        let mut keys = Vec::with_capacity(raw.key.len());
        for k in raw.key {
            let kind = k
                .match_type
                .parse::<MatchKind>()
                .map_err(|_| LoadError::UnknownMatchType {
                    table: raw.name.clone(),
                    field: k.name.clone(),
                    match_type: k.match_type.clone(),
                })?;
            keys.push(FieldSpec::key(k.id, k.name, kind, k.ty.width()));
        }
        let actions = raw
            .action_specs
            .into_iter()
            .map(|a| ActionSpec {
                id: a.id,
                name: a.name,
                params: a.data.into_iter().map(FieldSpec::from).collect(),
            })
            .collect();
        let data = raw
            .data
            .into_iter()
            .filter_map(|d| d.singleton.map(FieldSpec::from))
            .collect();
        trace!(table = %raw.name, keys = keys.len(), "table decoded");
        Ok(TableSchema {
            id: raw.id,
            name: raw.name,
            table_type: raw.table_type,
            size: raw.size,
            keys,
            actions,
            data,
        })
    }
}

impl SchemaLoader for BfRtSchemaLoader {
    fn _load(&self, content: &str) -> Result<Schema, LoadError> {
        let info: RawInfo = serde_json::from_str(content)?;
        let tables = info
            .tables
            .into_iter()
            .map(Self::table)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Schema::new(tables))
    }
}

#[cfg(test)]
mod tests {
    use pisc_core::schema::{FieldKind, MATCH_PRIORITY_ID};

    use super::*;

    const BFRT: &str = r#"
    {
      "schema_version": "1.0.0",
      "tables": [
        {
          "name": "pipe.SwitchIngress.acl",
          "id": 33554433,
          "table_type": "MatchAction_Direct",
          "size": 512,
          "annotations": [],
          "depends_on": [],
          "key": [
            {
              "id": 1, "name": "hdr.ipv4.src_addr", "repeated": false, "annotations": [],
              "mandatory": false, "match_type": "Ternary",
              "type": { "type": "bytes", "width": 32 }
            },
            {
              "id": 65537, "name": "$MATCH_PRIORITY", "repeated": false, "annotations": [],
              "mandatory": true, "match_type": "Exact",
              "type": { "type": "uint32" }
            }
          ],
          "action_specs": [
            {
              "id": 16777217, "name": "SwitchIngress.set_port", "action_scope": "TableAndDefault",
              "annotations": [],
              "data": [
                {
                  "id": 1, "name": "port", "repeated": false, "mandatory": true,
                  "read_only": false, "annotations": [],
                  "type": { "type": "bytes", "width": 9 }
                }
              ]
            },
            { "id": 16777218, "name": "SwitchIngress.drop", "annotations": [], "data": [] }
          ],
          "data": [
            {
              "mandatory": false, "read_only": false,
              "singleton": {
                "id": 65553, "name": "$COUNTER_SPEC_PKTS", "repeated": false, "annotations": [],
                "type": { "type": "uint64", "default_value": 0 }
              }
            }
          ],
          "supported_operations": [],
          "attributes": ["EntryScope"]
        }
      ],
      "learn_filters": []
    }"#;

    #[test]
    fn test_bfrt_loader() {
        let schema = BfRtSchemaLoader::default().load(BFRT).unwrap();
        assert_eq!(schema.tables().len(), 1);
        let t = schema.table("acl").unwrap();
        assert_eq!(t.id, 33554433);
        assert_eq!(t.size, 512);
        assert_eq!(t.keys.len(), 2);
        assert_eq!(t.keys[0].kind(), FieldKind::Match(MatchKind::Ternary));
        assert_eq!(t.keys[0].bit_width, 32);
        assert_eq!(t.keys[1].id, MATCH_PRIORITY_ID);
        assert_eq!(t.keys[1].bit_width, 32);

        let set_port = t.action("set_port").unwrap();
        assert_eq!(set_port.params, vec![FieldSpec::param(1, "port", 9)]);
        assert!(t.action("drop").unwrap().params.is_empty());
        assert_eq!(t.data_field(65553).unwrap().bit_width, 64);
    }

    #[test]
    fn test_bfrt_loader_rejects() {
        let bad = BFRT.replace("\"Ternary\"", "\"Optional\"");
        match BfRtSchemaLoader::default().load(&bad) {
            Err(LoadError::UnknownMatchType { match_type, .. }) => {
                assert_eq!(match_type, "Optional")
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(matches!(
            BfRtSchemaLoader::default().load("{ \"tables\": 3 }"),
            Err(LoadError::Json(_))
        ));
    }
}
