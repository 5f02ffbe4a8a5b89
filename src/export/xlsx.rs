use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;

use super::{ExportError, ResultWriter, COLUMNS};
use crate::models::{Record, RunResult};

const SHEET_NAME: &str = "Articles";
const COLUMN_WIDTHS: [f64; 5] = [30.0, 30.0, 50.0, 30.0, 10.0];
const SEPARATOR_ROWS: u32 = 2;

/// Single-sheet workbook, one row per record, blank rows between query sections
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxWriter;

impl ResultWriter for XlsxWriter {
    fn write(&self, result: &RunResult, path: &Path) -> Result<(), ExportError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;
        write_header(sheet)?;

        let mut row = 1u32;
        for (index, records) in result.by_query.iter().enumerate() {
            if index > 0 {
                row += SEPARATOR_ROWS;
            }
            for record in records {
                write_record(sheet, row, record)?;
                row += 1;
            }
        }

        workbook.save(path)?;
        Ok(())
    }
}

fn write_header(sheet: &mut Worksheet) -> Result<(), XlsxError> {
    let bold = Format::new().set_bold();
    for (col, (title, width)) in COLUMNS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        sheet.set_column_width(col, width)?;
        sheet.write_string_with_format(0, col, *title, &bold)?;
    }
    Ok(())
}

fn write_record(sheet: &mut Worksheet, row: u32, record: &Record) -> Result<(), XlsxError> {
    sheet.write_string(row, 0, &record.title)?;
    sheet.write_string(row, 1, &record.authors)?;
    sheet.write_string(row, 2, &record.r#abstract)?;
    sheet.write_string(row, 3, record.link_or_empty())?;
    sheet.write_number(row, 4, record.citation_count)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_result;
    use tempfile::tempdir;

    #[test]
    fn test_writes_zip_container() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("articles.xlsx");

        XlsxWriter.write(&sample_result(), &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_empty_run_still_has_header_sheet() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.xlsx");

        XlsxWriter.write(&RunResult::new(), &path).unwrap();

        assert!(path.exists());
    }
}
