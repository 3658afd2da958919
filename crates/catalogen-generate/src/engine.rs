use std::path::PathBuf;
use std::time::Instant;

use catalogen_config::{DatasetConfig, validate_config};
use catalogen_core::{MetadataSnapshot, MetadataStore};
use rand::Rng;
use tracing::{info, warn};

use crate::errors::GenerationError;
use crate::model::{GenerationReport, TableReport};
use crate::output::OutputWriter;
use crate::phases::products::{self, ProductInputs};
use crate::phases::{
    assignments, attribute_groups, attribute_sets, attributes, categories, customer_groups,
};
use crate::state::GeneratorState;
use crate::text::format_elapsed;

/// Result of a generation run.
#[derive(Debug, Clone)]
pub struct GenerationResult {
    pub script_path: PathBuf,
    pub manifest_path: Option<PathBuf>,
    pub report: GenerationReport,
}

/// Entry point for generating a catalog dataset from a configuration.
#[derive(Debug, Clone)]
pub struct GenerationEngine {
    config: DatasetConfig,
    timestamp: Option<i64>,
}

impl GenerationEngine {
    pub fn new(config: DatasetConfig) -> Self {
        Self {
            config,
            timestamp: None,
        }
    }

    /// Fixes the `updated_in` timestamp instead of using the clock.
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn config(&self) -> &DatasetConfig {
        &self.config
    }

    /// Metadata the run is generated against: the configured snapshot
    /// file, or a fresh install.
    pub fn load_metadata(&self) -> Result<MetadataSnapshot, GenerationError> {
        match &self.config.metadata {
            Some(path) => {
                info!(path = %path.display(), "loading metadata snapshot");
                Ok(MetadataSnapshot::from_path(path)?)
            }
            None => Ok(MetadataSnapshot::fresh_install()),
        }
    }

    /// Generates into the configured script and manifest files.
    ///
    /// The configuration is checked before any file is created.
    pub fn run(&self, store: &dyn MetadataStore) -> Result<GenerationResult, GenerationError> {
        self.check_config()?;

        let script_path = self.config.output.clone();
        let manifest_path = self
            .config
            .catalog
            .product
            .image
            .as_ref()
            .map(|image| image.output.clone());
        let mut output = OutputWriter::create(&script_path, manifest_path.as_deref())?;
        let report = self.generate(store, &mut output)?;

        Ok(GenerationResult {
            script_path,
            manifest_path,
            report,
        })
    }

    /// Runs every phase against `store`, writing through `output`, and
    /// finishes the output streams.
    pub fn generate(
        &self,
        store: &dyn MetadataStore,
        output: &mut OutputWriter,
    ) -> Result<GenerationReport, GenerationError> {
        self.check_config()?;

        let start = Instant::now();
        let run_id = uuid::Uuid::new_v4().to_string();
        let seed = self.config.seed.unwrap_or_else(|| rand::rng().random());
        let timestamp = self
            .timestamp
            .unwrap_or_else(|| chrono::Utc::now().timestamp());

        info!(
            run_id = %run_id,
            seed,
            output = %self.config.output.display(),
            "generation started"
        );

        let mut state = GeneratorState::new(
            &self.config,
            store,
            output,
            GenerationReport::new(run_id.clone(), seed),
            timestamp,
        )?;

        let customer_groups = customer_groups::generate(&mut state)?;
        let sets = attribute_sets::generate(&mut state)?;
        let owned_groups = attribute_groups::generate(&mut state, &sets)?;
        let catalog = attributes::generate(&mut state)?;
        let set_assignments = assignments::generate(&mut state, &owned_groups, &catalog)?;
        let category_index = categories::generate(&mut state, &sets.ids())?;

        let inputs = ProductInputs {
            categories: &category_index,
            assignments: &set_assignments,
            attributes: &catalog,
            customer_groups: &customer_groups,
        };
        let pools = products::simple::generate(&mut state, inputs)?;
        products::grouped::generate(&mut state, inputs, &pools)?;
        products::configurable::generate(&mut state, inputs, &pools)?;

        let mut report = state.into_report();
        let summary = output.finish()?;
        report.tables = output
            .stats()
            .iter()
            .map(|(table, stats)| TableReport {
                table: table.name().to_string(),
                statements: stats.statements,
                rows: stats.rows,
                dropped: stats.dropped,
            })
            .collect();
        report.script_bytes = summary.script_bytes;
        report.manifest_bytes = summary.manifest_bytes;

        let elapsed = start.elapsed();
        report.duration_ms = elapsed.as_millis() as u64;
        info!(
            run_id = %run_id,
            statements = summary.statements,
            rows = summary.rows,
            elapsed = %format_elapsed(elapsed),
            "generation finished"
        );
        Ok(report)
    }

    fn check_config(&self) -> Result<(), GenerationError> {
        let validation = validate_config(&self.config);
        for warning in &validation.warnings {
            warn!(code = %warning.code, path = %warning.path, "{}", warning.message);
        }
        if validation.is_ok() {
            Ok(())
        } else {
            Err(GenerationError::InvalidConfig(validation.to_string()))
        }
    }
}
