//! Buffered SQL script and media manifest output.

pub mod sql;
pub mod tables;
pub mod writer;

pub use sql::{Row, SqlValue, Statement, insert_statement};
pub use tables::TableId;
pub use writer::{MemorySink, OutputSummary, OutputWriter, TableStats};
