use crate::error::Result;
use crate::models::AddressRecord;
use crate::utils::constants::{
    COLUMN_COUNCIL_DISTRICT, COLUMN_STREET_NAME, COLUMN_STREET_NUMBER, COLUMN_WARD,
};
use csv::WriterBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

const HEADER: [&str; 4] = [
    COLUMN_STREET_NUMBER,
    COLUMN_STREET_NAME,
    COLUMN_COUNCIL_DISTRICT,
    COLUMN_WARD,
];

/// Writes address records as UTF-8 CSV with a header row and no index column.
pub struct AddressCsvWriter;

impl AddressCsvWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write all records, creating parent directories; returns the row count.
    ///
    /// The header is written even when there are no records.
    pub fn write_records(&self, records: &[AddressRecord], path: &Path) -> Result<usize> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;

        writer.write_record(HEADER)?;
        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        debug!(path = %path.display(), rows = records.len(), "wrote CSV");
        Ok(records.len())
    }

    /// Read back records written by [`AddressCsvWriter::write_records`].
    pub fn read_records(&self, path: &Path) -> Result<Vec<AddressRecord>> {
        let mut reader = csv::Reader::from_path(path)?;
        let records = reader
            .deserialize()
            .collect::<std::result::Result<Vec<AddressRecord>, csv::Error>>()?;
        Ok(records)
    }

    pub fn get_file_info(&self, path: &Path) -> Result<CsvFileInfo> {
        let size_bytes = std::fs::metadata(path)?.len();
        let records = self.read_records(path)?;

        Ok(CsvFileInfo {
            path: path.to_path_buf(),
            size_bytes,
            total_rows: records.len(),
            rows_with_district: records.iter().filter(|r| r.has_district()).count(),
        })
    }
}

impl Default for AddressCsvWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct CsvFileInfo {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub total_rows: usize,
    pub rows_with_district: usize,
}

impl CsvFileInfo {
    pub fn summary(&self) -> String {
        format!(
            "File: {}\nSize: {:.1} KB\nRows: {}\nRows with district: {}",
            self.path.display(),
            self.size_bytes as f64 / 1024.0,
            self.total_rows,
            self.rows_with_district
        )
    }
}
