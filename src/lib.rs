//! # pisc
//! Encoding of command-line match/action literals into table entry requests for a switch
//! control plane, and decoding of table entries for display.
//!
//! ```
//! use pisc::prelude::*;
//!
//! let table = TableSchema {
//!     id: 1,
//!     name: "pipe.SwitchIngress.fwd".to_owned(),
//!     table_type: "MatchAction_Direct".to_owned(),
//!     size: 1024,
//!     keys: vec![FieldSpec::key(1, "hdr.ipv4.dst_addr", MatchKind::Lpm, 32)],
//!     actions: vec![],
//!     data: vec![],
//! };
//! let ctx = EntryContext::new(&table);
//! let records = MatchSetBuilder::build(&ctx, &["10.0.0.0/24"]).unwrap();
//! let fields = RequestAssembler::assemble(&records).unwrap();
//! assert_eq!(fields.get(1).unwrap().primary, vec![10, 0, 0, 0]);
//! ```
pub use pisc_core::{action, error, r#match, schema, value, Error, Result};
pub use pisc_entry as entry;
pub use pisc_io as io;

#[allow(missing_docs)]
pub mod prelude {
    #[doc(hidden)]
    pub use pisc_core::prelude::*;
    #[doc(hidden)]
    pub use pisc_entry::prelude::*;
    #[doc(hidden)]
    pub use pisc_io::prelude::*;
}
