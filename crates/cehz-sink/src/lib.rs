//! Best-effort writer that projects extracted records into a remote
//! key-value table store.

mod entity;
mod error;
mod table;

pub use entity::{dedup_by_row_key, TableEntity, PARTITION_KEY};
pub use error::SinkError;
pub use table::{TableSink, UpsertSummary};
