use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use staylens_parser::TableSchema;

use crate::cleaning::CleaningReport;
use crate::error::Result;
use crate::pipeline::ChartArtifact;

/// Machine-readable record of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub input: PathBuf,
    pub schema: TableSchema,
    pub cleaning: CleaningReport,
    pub dpi: u32,
    pub charts: Vec<ChartArtifact>,
}

pub fn write_summary(path: &Path, summary: &RunSummary) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(summary)?;
    fs::write(path, json)?;
    Ok(())
}
