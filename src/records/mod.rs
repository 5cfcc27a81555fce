//! Record Source: the fully dereferenced record graph the compiler reads
//!
//! Records are owned `serde_json::Value` trees. Child records are embedded
//! in their parents, so once a record is returned no further lookups are
//! needed to walk it.

pub mod fields;
pub mod mappings;
pub mod source;

pub use fields::{record_name, Fields};
pub use source::{RecordSource, RecordStore, Table};
