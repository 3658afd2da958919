//! Catalog dataset generation engine.
//!
//! Runs the generation phases (customer groups, attribute metadata,
//! category tree, simple/grouped/configurable products) against a
//! [`catalogen_core::MetadataStore`] and streams the result as a MySQL
//! bulk-load script plus an optional media manifest.

pub mod engine;
pub mod errors;
pub mod ids;
pub mod metadata;
pub mod model;
pub mod output;
pub mod phases;
pub mod state;
pub mod text;

pub use engine::{GenerationEngine, GenerationResult};
pub use errors::GenerationError;
pub use ids::{IdAllocator, Identifiers};
pub use model::{GenerationReport, PhaseReport, TableReport};
pub use output::{MemorySink, OutputWriter, Row, SqlValue, TableId};
