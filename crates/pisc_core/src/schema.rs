//! # Schema
//!
//! Read-only table/action/field metadata describing what a device accepts. Nothing in this crate
//! mutates a schema after it has been built, so a single instance can be shared by every command
//! invocation.

use std::fmt::{Display, Formatter};

use fxhash::FxHashMap;
use phf::phf_map;
use serde::Serialize;

use crate::r#match::{BitWidthClass, MatchKind};

/// Field id the device reserves for the entry priority of ternary/range tables.
pub const MATCH_PRIORITY_ID: u32 = 65537;

// pseudo-fields with a fixed codec size, whatever width the schema declares
static RESERVED_FIELDS: phf::Map<&'static str, BitWidthClass> = phf_map! {
    "$MATCH_PRIORITY" => BitWidthClass::Int32,
};

/// Whether a field is a match key (and how it is matched) or an action parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Match(MatchKind),
    Action,
}

impl Display for FieldKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Match(MatchKind::Exact) => write!(f, "exact match"),
            FieldKind::Match(MatchKind::Lpm) => write!(f, "LPM match"),
            FieldKind::Match(MatchKind::Ternary) => write!(f, "ternary match"),
            FieldKind::Match(MatchKind::Range) => write!(f, "range match"),
            FieldKind::Action => write!(f, "action data"),
        }
    }
}

/// Describes one match key or action parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub id: u32,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_kind: Option<MatchKind>,
    pub bit_width: u32,
}

impl FieldSpec {
    pub fn key(id: u32, name: impl Into<String>, kind: MatchKind, bit_width: u32) -> Self {
        Self {
            id,
            name: name.into(),
            match_kind: Some(kind),
            bit_width,
        }
    }

    pub fn param(id: u32, name: impl Into<String>, bit_width: u32) -> Self {
        Self {
            id,
            name: name.into(),
            match_kind: None,
            bit_width,
        }
    }

    #[inline]
    pub fn kind(&self) -> FieldKind {
        match self.match_kind {
            Some(kind) => FieldKind::Match(kind),
            None => FieldKind::Action,
        }
    }

    /// Codec size of a reserved pseudo-field such as the match priority, `None` for ordinary
    /// fields.
    pub fn reserved_class(&self) -> Option<BitWidthClass> {
        if self.id == MATCH_PRIORITY_ID {
            return Some(BitWidthClass::Int32);
        }
        RESERVED_FIELDS.get(self.name.as_str()).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSpec {
    pub id: u32,
    pub name: String,
    pub params: Vec<FieldSpec>,
}

impl ActionSpec {
    pub fn param_by_id(&self, id: u32) -> Option<&FieldSpec> {
        self.params.iter().find(|p| p.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub id: u32,
    pub name: String,
    pub table_type: String,
    pub size: u64,
    pub keys: Vec<FieldSpec>,
    pub actions: Vec<ActionSpec>,
    /// Table level data fields (counters, meters, ...), only used for naming.
    pub data: Vec<FieldSpec>,
}

impl TableSchema {
    pub fn action(&self, name: &str) -> Option<&ActionSpec> {
        lookup_by_name(&self.actions, name, |a| a.name.as_str())
    }

    pub fn action_by_id(&self, id: u32) -> Option<&ActionSpec> {
        self.actions.iter().find(|a| a.id == id)
    }

    pub fn data_field(&self, id: u32) -> Option<&FieldSpec> {
        self.data.iter().find(|d| d.id == id)
    }
}

/// All tables of a device.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    tables: Vec<TableSchema>,
    by_id: FxHashMap<u32, usize>,
}

impl Schema {
    pub fn new(tables: Vec<TableSchema>) -> Self {
        let by_id = tables
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.id, idx))
            .collect();
        Self { tables, by_id }
    }

    #[inline]
    pub fn tables(&self) -> &[TableSchema] {
        &self.tables
    }

    /// Lookup by full name, or by a unique dotted suffix (`fwd` for `pipe.SwitchIngress.fwd`).
    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        lookup_by_name(&self.tables, name, |t| t.name.as_str())
    }

    pub fn table_by_id(&self, id: u32) -> Option<&TableSchema> {
        self.by_id.get(&id).map(|idx| &self.tables[*idx])
    }
}

fn lookup_by_name<'a, T>(
    items: &'a [T],
    name: &str,
    name_of: impl Fn(&T) -> &str,
) -> Option<&'a T> {
    if let Some(item) = items.iter().find(|i| name_of(i) == name) {
        return Some(item);
    }
    let mut candidates = items.iter().filter(|i| {
        name_of(i)
            .strip_suffix(name)
            .is_some_and(|prefix| prefix.ends_with('.'))
    });
    match (candidates.next(), candidates.next()) {
        (Some(item), None) => Some(item),
        _ => None,
    }
}
