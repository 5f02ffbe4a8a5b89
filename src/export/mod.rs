//! Output writers for a finished run.
//!
//! Every format implements [`ResultWriter`]. The JSON writer uses the flat
//! record list; the tabular and document writers use the per-query sections.

mod csv;
mod json;
mod pdf;
mod xlsx;

pub use self::csv::CsvWriter;
pub use self::json::JsonWriter;
pub use self::pdf::PdfWriter;
pub use self::xlsx::XlsxWriter;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::RunResult;

/// Column headings shared by the tabular writers
pub const COLUMNS: [&str; 5] = ["Title", "Authors", "Abstract", "Link", "Citations"];

/// Writes a [`RunResult`] to a file
pub trait ResultWriter {
    fn write(&self, result: &RunResult, path: &Path) -> Result<(), ExportError>;
}

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
    Xlsx,
    Pdf,
}

impl OutputFormat {
    /// Every format, in the order they are written
    pub const ALL: [OutputFormat; 4] = [
        OutputFormat::Json,
        OutputFormat::Csv,
        OutputFormat::Xlsx,
        OutputFormat::Pdf,
    ];

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Pdf => "pdf",
        }
    }

    pub fn writer(self) -> Box<dyn ResultWriter> {
        match self {
            OutputFormat::Json => Box::new(JsonWriter),
            OutputFormat::Csv => Box::new(CsvWriter),
            OutputFormat::Xlsx => Box::new(XlsxWriter),
            OutputFormat::Pdf => Box::new(PdfWriter::default()),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "xlsx" | "excel" => Ok(OutputFormat::Xlsx),
            "pdf" => Ok(OutputFormat::Pdf),
            other => Err(ExportError::UnknownFormat(other.to_string())),
        }
    }
}

/// Errors raised while writing output files
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("Unknown output format: {0}")]
    UnknownFormat(String),
}

/// Path of the `format` output file for `stem` inside `dir`
pub fn output_path(dir: &Path, stem: &str, format: OutputFormat) -> PathBuf {
    dir.join(format!("{}.{}", stem, format.extension()))
}

/// Write `result` as `format` into `dir`, creating the directory if needed
pub fn export(
    result: &RunResult,
    format: OutputFormat,
    dir: &Path,
    stem: &str,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir)?;
    let path = output_path(dir, stem, format);
    format.writer().write(result, &path)?;
    info!(format = %format, "Data saved to {}", path.display());
    Ok(path)
}
