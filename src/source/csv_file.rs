//! CSV-backed record source
//!
//! The record file is UTF-8, comma-delimited with standard quoting, and
//! starts with a header row naming the fields.

use crate::error::{SourceError, SourceResult};
use crate::source::{Record, RecordIter, RecordSource};
use csv::{ByteRecord, Reader, ReaderBuilder, StringRecord};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Record source reading a local CSV file
#[derive(Debug, Clone)]
pub struct CsvRecordSource {
    path: PathBuf,
}

impl CsvRecordSource {
    /// Create a source over the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> SourceResult<(Reader<File>, StringRecord)> {
        let file = File::open(&self.path).map_err(|source| SourceError::Open {
            path: self.path.clone(),
            source,
        })?;

        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);
        let headers = reader.headers()?.clone();
        if headers.is_empty() {
            return Err(SourceError::MissingHeader {
                path: self.path.clone(),
            });
        }

        Ok((reader, headers))
    }
}

impl RecordSource for CsvRecordSource {
    fn count(&self) -> SourceResult<usize> {
        let (mut reader, _) = self.open()?;
        let mut row = ByteRecord::new();
        let mut count = 0usize;

        while reader
            .read_byte_record(&mut row)
            .map_err(|e| decode_error(count as u64, e))?
        {
            count += 1;
        }

        debug!(path = %self.path.display(), count, "Counted records");
        Ok(count)
    }

    fn records(&self) -> SourceResult<RecordIter<'_>> {
        let (reader, headers) = self.open()?;

        let iter = reader
            .into_records()
            .enumerate()
            .map(move |(row, result)| -> SourceResult<Record> {
                let row_record = result.map_err(|e| decode_error(row as u64, e))?;
                Ok(Record::new(
                    headers
                        .iter()
                        .zip(row_record.iter())
                        .map(|(k, v)| (k.to_string(), v.to_string()))
                        .collect(),
                ))
            });

        Ok(Box::new(iter))
    }
}

fn decode_error(row: u64, e: csv::Error) -> SourceError {
    SourceError::Decode {
        row,
        reason: e.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_csv_source_reads_rows() {
        let file = write_file(
            "name,id,twitter,curr_bio\n\
             Ada,1,ada,\"Writes about engines, mostly\"\n\
             Grace,2,grace,\n",
        );
        let source = CsvRecordSource::new(file.path());

        assert_eq!(source.count().unwrap(), 2);

        let records: Vec<_> = source.records().unwrap().map(|r| r.unwrap()).collect();
        assert_eq!(records[0].name(), "Ada");
        assert_eq!(records[0].get("curr_bio"), Some("Writes about engines, mostly"));
        assert_eq!(records[1].id(), Some("2"));
        assert_eq!(records[1].get("curr_bio"), Some(""));
    }

    #[test]
    fn test_csv_source_header_only() {
        let file = write_file("name,id,twitter,curr_bio\n");
        let source = CsvRecordSource::new(file.path());
        assert_eq!(source.count().unwrap(), 0);
        assert_eq!(source.records().unwrap().count(), 0);
    }

    #[test]
    fn test_csv_source_empty_file() {
        let file = write_file("");
        let source = CsvRecordSource::new(file.path());
        assert!(matches!(
            source.count(),
            Err(SourceError::MissingHeader { .. })
        ));
    }

    #[test]
    fn test_csv_source_missing_file() {
        let source = CsvRecordSource::new("/no/such/journalists.csv");
        assert!(matches!(source.count(), Err(SourceError::Open { .. })));
    }

    #[test]
    fn test_csv_source_ragged_row() {
        let file = write_file("name,id\nAda,1\nGrace\n");
        let source = CsvRecordSource::new(file.path());
        assert!(matches!(
            source.count(),
            Err(SourceError::Decode { row: 1, .. })
        ));
    }
}
