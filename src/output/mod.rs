//! Output module for pipeline runs and their records
//!
//! This module handles:
//! - Running the crawl + generation pipeline
//! - The scrape and FAQ records a run produces
//! - Exporting a run as JSON or Markdown

mod markdown;
mod pipeline;
mod records;

pub use markdown::{format_markdown, write_markdown};
pub use pipeline::{run_pipeline, PipelineReport, PipelineRequest};
pub use records::{
    FaqRunMetadata, FaqRunRecord, FaqRunStatus, ScrapeMetadata, ScrapeRecord, ScrapeStatus,
};

use crate::FaqError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes `report` to `output_path` as pretty-printed JSON
pub fn write_json(report: &PipelineReport, output_path: &Path) -> Result<(), FaqError> {
    let json = serde_json::to_string_pretty(report)?;

    let mut file = File::create(output_path)?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;

    Ok(())
}
