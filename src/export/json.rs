use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::{ExportError, ResultWriter};
use crate::models::RunResult;

/// Pretty-printed JSON array of every record
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonWriter;

impl ResultWriter for JsonWriter {
    fn write(&self, result: &RunResult, path: &Path) -> Result<(), ExportError> {
        let mut out = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(&mut out, &result.flat)?;
        out.flush()?;
        Ok(())
    }
}
