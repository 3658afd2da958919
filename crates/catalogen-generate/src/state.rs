use std::time::Instant;

use catalogen_config::DatasetConfig;
use catalogen_core::MetadataStore;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::errors::GenerationError;
use crate::ids::Identifiers;
use crate::metadata::MetadataCache;
use crate::model::{GenerationReport, PhaseReport};
use crate::output::OutputWriter;
use crate::text::format_elapsed;

/// Mutable context shared by every generation phase.
pub struct GeneratorState<'a> {
    pub config: &'a DatasetConfig,
    pub ids: Identifiers,
    pub rng: ChaCha8Rng,
    pub metadata: MetadataCache<'a>,
    pub output: &'a mut OutputWriter,
    pub report: GenerationReport,
    /// Unix timestamp stamped into `updated_in` columns.
    pub timestamp: i64,
    seed: u64,
}

impl<'a> GeneratorState<'a> {
    pub fn new(
        config: &'a DatasetConfig,
        store: &'a dyn MetadataStore,
        output: &'a mut OutputWriter,
        report: GenerationReport,
        timestamp: i64,
    ) -> Result<Self, GenerationError> {
        let seed = report.seed;
        Ok(Self {
            config,
            ids: Identifiers::from_store(store)?,
            rng: ChaCha8Rng::seed_from_u64(seed),
            metadata: MetadataCache::load(store)?,
            output,
            report,
            timestamp,
            seed,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Closes the run state, recording the identifiers issued.
    pub fn into_report(self) -> GenerationReport {
        let mut report = self.report;
        report.identifiers = self.ids.summary();
        report
    }

    /// Starts a phase with its own random stream derived from the run seed.
    pub fn enter_phase(&mut self, phase: &str) -> Instant {
        self.rng = ChaCha8Rng::seed_from_u64(hash_seed(self.seed, phase));
        info!(phase, "phase started");
        Instant::now()
    }

    /// Flushes buffered rows and records the phase in the run report.
    pub fn finish_phase(
        &mut self,
        phase: &str,
        started: Instant,
        created: u64,
        skipped: u64,
    ) -> Result<(), GenerationError> {
        self.output.flush_all()?;

        let elapsed = started.elapsed();
        let report = PhaseReport {
            phase: phase.to_string(),
            created,
            skipped,
            duration_ms: elapsed.as_millis() as u64,
            elapsed: format_elapsed(elapsed),
        };
        info!(
            phase,
            created,
            skipped,
            elapsed = %report.elapsed,
            "phase completed"
        );
        self.report.phases.push(report);
        Ok(())
    }
}

pub(crate) fn hash_seed(seed: u64, key: &str) -> u64 {
    let mut hash = seed ^ 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}
