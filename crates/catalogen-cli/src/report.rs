use std::fs::{OpenOptions, create_dir_all};
use std::io;
use std::path::Path;

use catalogen_generate::{GenerationReport, GenerationResult};
use serde::Serialize;

/// JSON document written by `run --report`.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    finished_at: String,
    script: &'a Path,
    manifest: Option<&'a Path>,
    report: &'a GenerationReport,
}

pub fn write_report(path: &Path, result: &GenerationResult) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }

    let summary = RunSummary {
        finished_at: chrono::Utc::now().to_rfc3339(),
        script: &result.script_path,
        manifest: result.manifest_path.as_deref(),
        report: &result.report,
    };
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, &summary)?;
    Ok(())
}
