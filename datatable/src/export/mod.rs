//! Export of table rows to downloadable files.
//!
//! Rows are first flattened into [`ExportRecord`]s (header text to cell text,
//! `Null` as the empty string) and then encoded by an [`ExportWriter`]. Saving
//! the bytes is left to a [`FileSaver`].

mod delimited;
mod save;
mod workbook;

pub use delimited::{CsvWriter, UTF8_BOM};
pub use save::{DirectorySaver, FileSaver};
pub use workbook::WorkbookWriter;

use chrono::NaiveDate;

use crate::column::ExportColumn;
use crate::error::ExportError;
use crate::row::TableRow;

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Workbook,
    Csv,
}

/// Which rows the table hands to the exporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExportScope {
    /// Every row passed to the table, unsorted and unfiltered.
    #[default]
    AllRows,
    /// Rows after filtering and sorting, across all pages.
    FilteredRows,
    /// The rows on the current page.
    CurrentPage,
}

/// One exported row: `(header, value)` pairs in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportRecord {
    pub fields: Vec<(String, String)>,
}

impl ExportRecord {
    /// Value under a header.
    pub fn get(&self, header: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, v)| v.as_str())
    }
}

/// An encoded file ready to be saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Encodes records into a file format.
pub trait ExportWriter {
    fn extension(&self) -> &'static str;
    fn mime_type(&self) -> &'static str;
    fn write(&self, headers: &[String], records: &[ExportRecord]) -> Result<Vec<u8>, ExportError>;
}

/// Snapshots rows into records and runs them through a writer.
#[derive(Debug, Clone)]
pub struct ExportController {
    columns: Vec<ExportColumn>,
    file_name: String,
    csv: CsvWriter,
    workbook: WorkbookWriter,
}

impl ExportController {
    pub fn new(columns: Vec<ExportColumn>, file_name: impl Into<String>) -> Self {
        Self {
            columns,
            file_name: file_name.into(),
            csv: CsvWriter::default(),
            workbook: WorkbookWriter::default(),
        }
    }

    /// Use a custom delimited-text writer.
    pub fn with_csv(mut self, csv: CsvWriter) -> Self {
        self.csv = csv;
        self
    }

    pub fn with_workbook(mut self, workbook: WorkbookWriter) -> Self {
        self.workbook = workbook;
        self
    }

    /// Check if there is anything to export.
    pub fn is_available(&self, row_count: usize) -> bool {
        row_count > 0
    }

    pub fn headers(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.header.clone()).collect()
    }

    /// Flatten rows into records.
    pub fn records<R: TableRow>(&self, rows: &[R]) -> Vec<ExportRecord> {
        rows.iter()
            .map(|row| ExportRecord {
                fields: self
                    .columns
                    .iter()
                    .map(|col| (col.header.clone(), row.cell(&col.accessor_key).to_string()))
                    .collect(),
            })
            .collect()
    }

    /// File name with the date suffix, e.g. `employees_20261018.csv`.
    pub fn file_name_for(&self, format: ExportFormat, today: NaiveDate) -> String {
        format!(
            "{}_{}.{}",
            self.file_name,
            today.format("%Y%m%d"),
            self.writer(format).extension()
        )
    }

    fn writer(&self, format: ExportFormat) -> &dyn ExportWriter {
        match format {
            ExportFormat::Workbook => &self.workbook,
            ExportFormat::Csv => &self.csv,
        }
    }

    /// Encode rows. Returns `None` when there are no rows.
    pub fn export<R: TableRow>(
        &self,
        rows: &[R],
        format: ExportFormat,
        today: NaiveDate,
    ) -> Result<Option<ExportArtifact>, ExportError> {
        if !self.is_available(rows.len()) {
            return Ok(None);
        }
        let writer = self.writer(format);
        let bytes = writer.write(&self.headers(), &self.records(rows))?;
        let file_name = self.file_name_for(format, today);
        log::debug!("export: {} rows to {}", rows.len(), file_name);
        Ok(Some(ExportArtifact {
            file_name,
            mime_type: writer.mime_type(),
            bytes,
        }))
    }
}
