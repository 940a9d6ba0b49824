//! Delimited-text export.

use crate::error::ExportError;

use super::{ExportRecord, ExportWriter};

/// UTF-8 byte-order mark, so spreadsheet tools detect the encoding.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Writes records as delimited text with a leading BOM.
///
/// Records end in CRLF. Fields containing the delimiter, a quote or a line
/// break are quoted, with embedded quotes doubled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvWriter {
    delimiter: u8,
}

impl Default for CsvWriter {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvWriter {
    /// Use another delimiter. Non-ASCII delimiters fall back to a comma.
    pub fn with_delimiter(delimiter: char) -> Self {
        let delimiter = if delimiter.is_ascii() {
            delimiter as u8
        } else {
            log::warn!("csv: delimiter {:?} is not ASCII, using ','", delimiter);
            b','
        };
        Self { delimiter }
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }
}

impl ExportWriter for CsvWriter {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn mime_type(&self) -> &'static str {
        "text/csv;charset=utf-8"
    }

    fn write(&self, headers: &[String], records: &[ExportRecord]) -> Result<Vec<u8>, ExportError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .quote_style(csv::QuoteStyle::Necessary)
            .double_quote(true)
            .terminator(csv::Terminator::CRLF)
            .from_writer(UTF8_BOM.to_vec());

        writer.write_record(headers)?;
        for record in records {
            writer.write_record(record.values())?;
        }
        writer
            .into_inner()
            .map_err(|e| ExportError::Io(e.into_error()))
    }
}
