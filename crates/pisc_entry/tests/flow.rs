use pisc_core::{error::Error, schema::Schema};
use pisc_entry::{
    wire::{KeyMatch, TableEntry, UpdateType, WriteRequest},
    EntryContext, EntryDecoder, RequestAssembler,
};
use pisc_io::{BfRtSchemaLoader, SchemaLoader};

const BFRT: &str = r#"
{
  "schema_version": "1.0.0",
  "tables": [
    {
      "name": "pipe.SwitchIngress.ipv4_host",
      "id": 33581587,
      "table_type": "MatchAction_Direct",
      "size": 65536,
      "key": [
        { "id": 1, "name": "hdr.ethernet.dst_addr", "match_type": "Exact",
          "type": { "type": "bytes", "width": 48 } },
        { "id": 2, "name": "hdr.ipv4.dst_addr", "match_type": "LPM",
          "type": { "type": "bytes", "width": 32 } },
        { "id": 3, "name": "hdr.ethernet.ether_type", "match_type": "Ternary",
          "type": { "type": "bytes", "width": 16 } },
        { "id": 65537, "name": "$MATCH_PRIORITY", "match_type": "Exact",
          "type": { "type": "uint32" } }
      ],
      "action_specs": [
        { "id": 16799317, "name": "SwitchIngress.send", "data": [
          { "id": 1, "name": "port", "type": { "type": "bytes", "width": 9 } },
          { "id": 2, "name": "new_dmac", "type": { "type": "bytes", "width": 48 } }
        ] },
        { "id": 16805742, "name": "SwitchIngress.drop", "data": [] }
      ],
      "data": [
        { "singleton": { "id": 65553, "name": "$COUNTER_SPEC_PKTS",
          "type": { "type": "uint64" } } }
      ]
    }
  ]
}"#;

fn schema() -> Schema {
    BfRtSchemaLoader::default().load(BFRT).unwrap()
}

const KEYS: [&str; 4] = ["00:11:22:33:44:55", "192.168.0.0/16", "0x0800/0xffff", "1"];

#[test]
fn test_set_flow_then_dump() {
    let schema = schema();
    let table = schema.table("ipv4_host").unwrap();
    let ctx = EntryContext::new(table).with_action(table.action("send").unwrap());
    let req = RequestAssembler::write_request(
        &ctx,
        UpdateType::Insert,
        &KEYS,
        &["5", "aa:bb:cc:dd:ee:ff"],
    )
    .unwrap();

    // the request survives the trip through its JSON form
    let json = serde_json::to_string(&req).unwrap();
    assert!(json.contains("\"type\":\"INSERT\""));
    assert!(json.contains("\"value\":\"001122334455\""));
    let req: WriteRequest = serde_json::from_str(&json).unwrap();

    // pretend the device echoes the entry back
    let entity: TableEntry = req.updates[0].entity.clone();
    let decoded = EntryDecoder::decode(&entity, table);
    let values: Vec<_> = decoded
        .keys
        .iter()
        .map(|k| (k.value.clone().unwrap(), k.secondary.clone()))
        .collect();
    assert_eq!(
        values,
        vec![
            ("001122334455".to_owned(), None),
            ("c0a80000".to_owned(), Some("16".to_owned())),
            ("0800".to_owned(), Some("ffff".to_owned())),
            ("00000001".to_owned(), None),
        ]
    );
    assert_eq!(decoded.action.as_deref(), Some("SwitchIngress.send"));
    let data: Vec<_> = decoded
        .data
        .iter()
        .map(|d| (d.name.as_str(), d.value.as_str()))
        .collect();
    assert_eq!(data, vec![("port", "0005"), ("new_dmac", "aabbccddeeff")]);
}

#[test]
fn test_delete_all_from_read_response() {
    let schema = schema();
    let table = schema.table("pipe.SwitchIngress.ipv4_host").unwrap();
    let ctx = EntryContext::new(table).with_action(table.action("drop").unwrap());
    let none: [&str; 0] = [];
    let mut entries: Vec<TableEntry> = vec![];
    for prefix in ["10.0.0.0/8", "172.16.0.0/12"] {
        let keys = ["00:11:22:33:44:55", prefix, "0x0800/0xffff", "1"];
        let req = RequestAssembler::write_request(&ctx, UpdateType::Insert, &keys, &none).unwrap();
        entries.extend(req.updates.into_iter().map(|u| u.entity));
    }
    let default_json = r#"{ "table_id": 33581587, "data": { "action_id": 16805742 },
        "is_default_entry": true }"#;
    entries.push(serde_json::from_str(default_json).unwrap());

    let req = WriteRequest::delete_all(table.id, &entries);
    assert_eq!(req.len(), 2);
    assert!(req
        .updates
        .iter()
        .all(|u| u.update_type == UpdateType::Delete && u.entity.data.is_none()));
    assert_eq!(
        req.updates[1].entity.key[1].match_type,
        KeyMatch::Lpm {
            value: vec![172, 16, 0, 0],
            prefix_len: 12
        }
    );

    let (req, missing) = WriteRequest::delete_positions(table.id, &entries, &[2, 0]);
    assert_eq!(req.len(), 1);
    assert_eq!(missing, vec![2]);
}

#[test]
fn test_failed_command_builds_nothing() {
    let schema = schema();
    let table = schema.table("ipv4_host").unwrap();
    let ctx = EntryContext::new(table).with_action(table.action("send").unwrap());
    // overflowing port: 512 does not fit in 9 bits
    let res = RequestAssembler::write_request(
        &ctx,
        UpdateType::Modify,
        &KEYS,
        &["512", "aa:bb:cc:dd:ee:ff"],
    );
    assert_eq!(
        res,
        Err(Error::OverflowValue {
            field: "port".to_owned(),
            literal: "512".to_owned(),
            max: 511
        })
    );
    let res = RequestAssembler::write_request(&ctx, UpdateType::Modify, &KEYS[..3], &["1", "2"]);
    assert!(matches!(res, Err(Error::ArityMismatch { expected: 4, got: 3, .. })));
}
