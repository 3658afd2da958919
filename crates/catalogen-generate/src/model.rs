use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Summary of one generation phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseReport {
    pub phase: String,
    pub created: u64,
    pub skipped: u64,
    pub duration_ms: u64,
    /// Duration as `hh:mm:ss`.
    pub elapsed: String,
}

/// Rows written to one table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableReport {
    pub table: String,
    pub statements: u64,
    pub rows: u64,
    pub dropped: u64,
}

/// Report for a generation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationReport {
    pub run_id: String,
    pub seed: u64,
    pub phases: Vec<PhaseReport>,
    pub tables: Vec<TableReport>,
    /// Identifiers issued per source table.
    pub identifiers: BTreeMap<String, u64>,
    /// Skips keyed by reason code.
    pub skipped_by_code: BTreeMap<String, u64>,
    pub script_bytes: u64,
    pub manifest_bytes: u64,
    pub duration_ms: u64,
}

impl GenerationReport {
    pub fn new(run_id: String, seed: u64) -> Self {
        Self {
            run_id,
            seed,
            phases: Vec::new(),
            tables: Vec::new(),
            identifiers: BTreeMap::new(),
            skipped_by_code: BTreeMap::new(),
            script_bytes: 0,
            manifest_bytes: 0,
            duration_ms: 0,
        }
    }

    pub fn record_skip(&mut self, code: &str) {
        *self.skipped_by_code.entry(code.to_string()).or_insert(0) += 1;
    }

    pub fn phase(&self, name: &str) -> Option<&PhaseReport> {
        self.phases.iter().find(|phase| phase.phase == name)
    }

    pub fn table(&self, name: &str) -> Option<&TableReport> {
        self.tables.iter().find(|table| table.table == name)
    }
}
