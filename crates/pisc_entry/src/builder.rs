use tracing::trace;

use pisc_core::{
    error::{Error, Result, Side},
    r#match::BitWidthClass,
    schema::{ActionSpec, FieldKind, FieldSpec, TableSchema},
};

/// The table, and for writes the action, a single command operates on. Passed explicitly to the
/// builders and the assembler; nothing is remembered between commands.
#[derive(Debug, Clone, Copy)]
pub struct EntryContext<'s> {
    pub table: &'s TableSchema,
    pub action: Option<&'s ActionSpec>,
}

impl<'s> EntryContext<'s> {
    pub fn new(table: &'s TableSchema) -> Self {
        Self {
            table,
            action: None,
        }
    }

    pub fn with_action(mut self, action: &'s ActionSpec) -> Self {
        self.action = Some(action);
        self
    }

    /// Parameters of the selected action, empty when no action is selected.
    pub fn action_params(&self) -> &'s [FieldSpec] {
        match self.action {
            Some(action) => &action.params,
            None => &[],
        }
    }
}

/// A schema field paired with the literal written for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRecord<'a> {
    pub id: u32,
    pub name: &'a str,
    pub kind: FieldKind,
    pub width: u32,
    /// Reserved pseudo-fields have a codec size that does not follow the declared width.
    pub fixed_class: Option<BitWidthClass>,
    /// 1-based position of the literal in its list.
    pub position: usize,
    pub literal: &'a str,
}

impl FieldRecord<'_> {
    pub fn class(&self) -> Result<BitWidthClass> {
        match self.fixed_class {
            Some(class) => Ok(class),
            None => BitWidthClass::try_from(self.width).map_err(|_| {
                Error::malformed(format!(
                    "field {} declares bit width {}",
                    self.name, self.width
                ))
            }),
        }
    }
}

fn check_arity(side: Side, expected: usize, got: usize) -> Result<()> {
    if expected != got {
        return Err(Error::ArityMismatch {
            side,
            expected,
            got,
        });
    }
    Ok(())
}

/// Pairs the key fields of the context table with the match literals, in schema order.
pub struct MatchSetBuilder;

impl MatchSetBuilder {
    pub fn build<'a, S: AsRef<str>>(
        ctx: &EntryContext<'a>,
        literals: &'a [S],
    ) -> Result<Vec<FieldRecord<'a>>> {
        let keys = &ctx.table.keys;
        check_arity(Side::Match, keys.len(), literals.len())?;
        let mut records = Vec::with_capacity(keys.len());
        for (idx, (spec, literal)) in keys.iter().zip(literals).enumerate() {
            let FieldKind::Match(kind) = spec.kind() else {
                return Err(Error::malformed(format!(
                    "key {} of table {} has no match type",
                    spec.name, ctx.table.name
                )));
            };
            let fixed_class = spec.reserved_class();
            records.push(FieldRecord {
                id: spec.id,
                name: &spec.name,
                kind: FieldKind::Match(kind),
                width: fixed_class.map_or(spec.bit_width, BitWidthClass::bits),
                fixed_class,
                position: idx + 1,
                literal: literal.as_ref(),
            });
        }
        trace!(table = %ctx.table.name, records = records.len(), "match set built");
        Ok(records)
    }
}

/// Pairs the parameters of the context action with the action literals.
pub struct ActionSetBuilder;

impl ActionSetBuilder {
    pub fn build<'a, S: AsRef<str>>(
        ctx: &EntryContext<'a>,
        literals: &'a [S],
    ) -> Result<Vec<FieldRecord<'a>>> {
        let params = ctx.action_params();
        check_arity(Side::Action, params.len(), literals.len())?;
        Ok(params
            .iter()
            .zip(literals)
            .enumerate()
            .map(|(idx, (spec, literal))| FieldRecord {
                id: spec.id,
                name: &spec.name,
                kind: FieldKind::Action,
                width: spec.bit_width,
                fixed_class: None,
                position: idx + 1,
                literal: literal.as_ref(),
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use pisc_core::{r#match::MatchKind, schema::MATCH_PRIORITY_ID};

    use super::*;

    fn table() -> TableSchema {
        TableSchema {
            id: 1,
            name: "pipe.SwitchIngress.acl".to_owned(),
            table_type: "MatchAction_Direct".to_owned(),
            size: 64,
            keys: vec![
                FieldSpec::key(1, "hdr.ipv4.dst_addr", MatchKind::Ternary, 32),
                FieldSpec::key(2, "hdr.tcp.dst_port", MatchKind::Exact, 16),
                FieldSpec::key(MATCH_PRIORITY_ID, "$MATCH_PRIORITY", MatchKind::Exact, 0),
            ],
            actions: vec![ActionSpec {
                id: 20,
                name: "SwitchIngress.set_port".to_owned(),
                params: vec![FieldSpec::param(1, "port", 9)],
            }],
            data: vec![],
        }
    }

    #[test]
    fn test_match_set() {
        let t = table();
        let ctx = EntryContext::new(&t);
        let literals = ["10.0.0.1/255.255.255.255", "80", "10"];
        let records = MatchSetBuilder::build(&ctx, &literals).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].kind, FieldKind::Match(MatchKind::Ternary));
        assert_eq!(records[1].literal, "80");
        assert_eq!(records[1].position, 2);
        assert_eq!(records[1].class().unwrap(), BitWidthClass::Int16);
        // priority is pinned to 32 bits
        assert_eq!(records[2].fixed_class, Some(BitWidthClass::Int32));
        assert_eq!(records[2].width, 32);
        assert_eq!(records[2].class().unwrap(), BitWidthClass::Int32);
    }

    #[test]
    fn test_match_set_arity() {
        let t = table();
        let ctx = EntryContext::new(&t);
        let literals = vec!["10.0.0.1/255.255.255.255".to_owned(), "80".to_owned()];
        assert_eq!(
            MatchSetBuilder::build(&ctx, &literals),
            Err(Error::ArityMismatch {
                side: Side::Match,
                expected: 3,
                got: 2
            })
        );
    }

    #[test]
    fn test_action_set() {
        let t = table();
        let ctx = EntryContext::new(&t).with_action(&t.actions[0]);
        let records = ActionSetBuilder::build(&ctx, &["3"]).unwrap();
        assert_eq!(records[0].kind, FieldKind::Action);
        assert_eq!(records[0].width, 9);

        assert!(matches!(
            ActionSetBuilder::build(&ctx, &["3", "4"]),
            Err(Error::ArityMismatch {
                side: Side::Action,
                expected: 1,
                got: 2
            })
        ));
        // no action selected: no parameters expected
        let ctx = EntryContext::new(&t);
        assert!(ActionSetBuilder::build::<&str>(&ctx, &[]).unwrap().is_empty());
    }

    #[test]
    fn test_malformed_width() {
        let mut t = table();
        t.keys[1].bit_width = 128;
        let ctx = EntryContext::new(&t);
        let records = MatchSetBuilder::build(&ctx, &["a", "b", "c"]).unwrap();
        assert!(matches!(records[1].class(), Err(Error::MalformedSchema(_))));
    }
}
