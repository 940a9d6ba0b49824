//! Workbook export as SpreadsheetML 2003 XML.

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};

use crate::error::ExportError;

use super::{ExportRecord, ExportWriter};

const SPREADSHEET_NS: &str = "urn:schemas-microsoft-com:office:spreadsheet";

/// Writes a single-sheet workbook: a header row followed by one row per record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkbookWriter {
    sheet_name: String,
}

impl Default for WorkbookWriter {
    fn default() -> Self {
        Self {
            sheet_name: "Sheet1".to_string(),
        }
    }
}

impl WorkbookWriter {
    pub fn with_sheet_name(sheet_name: impl Into<String>) -> Self {
        Self {
            sheet_name: sheet_name.into(),
        }
    }
}

fn write_row<'a, W: std::io::Write>(
    xml: &mut Writer<W>,
    cells: impl IntoIterator<Item = &'a str>,
) -> std::io::Result<()> {
    xml.write_event(Event::Start(BytesStart::new("Row")))?;
    for cell in cells {
        xml.write_event(Event::Start(BytesStart::new("Cell")))?;
        let mut data = BytesStart::new("Data");
        data.push_attribute(("ss:Type", "String"));
        xml.write_event(Event::Start(data))?;
        xml.write_event(Event::Text(BytesText::new(cell)))?;
        xml.write_event(Event::End(BytesEnd::new("Data")))?;
        xml.write_event(Event::End(BytesEnd::new("Cell")))?;
    }
    xml.write_event(Event::End(BytesEnd::new("Row")))?;
    Ok(())
}

impl ExportWriter for WorkbookWriter {
    fn extension(&self) -> &'static str {
        "xls"
    }

    fn mime_type(&self) -> &'static str {
        "application/vnd.ms-excel"
    }

    fn write(&self, headers: &[String], records: &[ExportRecord]) -> Result<Vec<u8>, ExportError> {
        let mut xml = Writer::new_with_indent(Vec::new(), b' ', 1);

        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        xml.write_event(Event::PI(BytesPI::new(r#"mso-application progid="Excel.Sheet""#)))?;

        let mut workbook = BytesStart::new("Workbook");
        workbook.push_attribute(("xmlns", SPREADSHEET_NS));
        workbook.push_attribute(("xmlns:ss", SPREADSHEET_NS));
        xml.write_event(Event::Start(workbook))?;

        let mut sheet = BytesStart::new("Worksheet");
        sheet.push_attribute(("ss:Name", self.sheet_name.as_str()));
        xml.write_event(Event::Start(sheet))?;
        xml.write_event(Event::Start(BytesStart::new("Table")))?;

        write_row(&mut xml, headers.iter().map(String::as_str))?;
        for record in records {
            write_row(&mut xml, record.values())?;
        }

        xml.write_event(Event::End(BytesEnd::new("Table")))?;
        xml.write_event(Event::End(BytesEnd::new("Worksheet")))?;
        xml.write_event(Event::End(BytesEnd::new("Workbook")))?;

        Ok(xml.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escapes_cell_text() {
        let record = ExportRecord {
            fields: vec![("Name".to_string(), "A & <B>".to_string())],
        };
        let bytes = WorkbookWriter::default()
            .write(&["Name".to_string()], &[record])
            .unwrap();
        let xml = String::from_utf8(bytes).unwrap();
        assert!(xml.contains("A &amp; &lt;B&gt;"));
        assert!(xml.contains(r#"<Worksheet ss:Name="Sheet1">"#));
        assert_eq!(xml.matches("<Row>").count(), 2);
    }
}
