use std::path::Path;

use super::{ExportError, ResultWriter, COLUMNS};
use crate::models::{Record, RunResult};

/// Blank rows written between two query sections
const SEPARATOR_ROWS: usize = 2;

/// CSV with one row per record and blank rows between query sections
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvWriter;

impl ResultWriter for CsvWriter {
    fn write(&self, result: &RunResult, path: &Path) -> Result<(), ExportError> {
        let mut writer = ::csv::Writer::from_path(path)?;
        writer.write_record(COLUMNS)?;

        for (index, records) in result.by_query.iter().enumerate() {
            if index > 0 {
                for _ in 0..SEPARATOR_ROWS {
                    writer.write_record([""; 5])?;
                }
            }
            for record in records {
                writer.write_record(row(record))?;
            }
        }

        writer.flush()?;
        Ok(())
    }
}

fn row(record: &Record) -> [String; 5] {
    [
        record.title.clone(),
        record.authors.clone(),
        record.r#abstract.clone(),
        record.link_or_empty().to_string(),
        record.citation_count.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::tests::sample_result;
    use tempfile::tempdir;

    #[test]
    fn test_sections_separated_by_two_blank_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("articles.csv");

        CsvWriter.write(&sample_result(), &path).unwrap();

        let mut reader = ::csv::Reader::from_path(&path).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), COLUMNS);

        let rows: Vec<::csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        // 2 records, 2 blanks, (empty section), 2 blanks, 1 record
        assert_eq!(rows.len(), 7);
        assert_eq!(&rows[0][0], "Deep learning");
        assert_eq!(&rows[0][4], "5");
        assert_eq!(&rows[1][3], "");
        assert!(rows[2].iter().all(str::is_empty));
        assert!(rows[5].iter().all(str::is_empty));
        assert_eq!(&rows[6][0], "Graph networks");
    }

    #[test]
    fn test_single_section_has_no_trailing_blank_rows() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("one.csv");
        let mut result = RunResult::new();
        result.push("q", vec![Record::new("only")]);

        CsvWriter.write(&result, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "Title,Authors,Abstract,Link,Citations\nonly,,,,0\n");
    }
}
