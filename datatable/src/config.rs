//! Table configuration.

use std::time::Duration;

use serde::{Deserialize, Deserializer};

/// Shared defaults for a table instance.
///
/// Deserializes from JSON with every field optional; missing fields take the
/// defaults below. `debounceMs` is given in milliseconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableConfig {
    /// Delay before typed search text is applied.
    #[serde(rename = "debounceMs", deserialize_with = "duration_ms")]
    pub debounce: Duration,

    /// Page size of uncontrolled pagination.
    pub default_page_size: usize,

    /// Choices offered by the page size selector.
    pub page_size_options: Vec<usize>,

    pub search_placeholder: String,

    /// Shown in place of rows when the row model is empty.
    pub empty_message: String,

    /// Base name of exported files, before the date suffix.
    pub export_file_name: String,

    /// Field delimiter of the delimited-text export.
    pub csv_delimiter: char,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            default_page_size: 10,
            page_size_options: vec![10, 20, 30, 50, 100],
            search_placeholder: "Search...".to_string(),
            empty_message: "No data available.".to_string(),
            export_file_name: "export".to_string(),
            csv_delimiter: ',',
        }
    }
}

impl TableConfig {
    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Set the search debounce delay.
    pub fn debounce(mut self, delay: Duration) -> Self {
        self.debounce = delay;
        self
    }

    /// Set the default page size (at least 1).
    pub fn default_page_size(mut self, size: usize) -> Self {
        self.default_page_size = size.max(1);
        self
    }

    pub fn page_size_options(mut self, options: Vec<usize>) -> Self {
        self.page_size_options = options;
        self
    }

    pub fn search_placeholder(mut self, text: impl Into<String>) -> Self {
        self.search_placeholder = text.into();
        self
    }

    pub fn empty_message(mut self, text: impl Into<String>) -> Self {
        self.empty_message = text.into();
        self
    }

    pub fn export_file_name(mut self, name: impl Into<String>) -> Self {
        self.export_file_name = name.into();
        self
    }

    pub fn csv_delimiter(mut self, delimiter: char) -> Self {
        self.csv_delimiter = delimiter;
        self
    }
}

fn duration_ms<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    u64::deserialize(deserializer).map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TableConfig::default();
        assert_eq!(config.debounce, Duration::from_millis(300));
        assert_eq!(config.default_page_size, 10);
    }

    #[test]
    fn test_partial_json() {
        let config = TableConfig::from_json(r#"{ "debounceMs": 150, "exportFileName": "employees" }"#)
            .unwrap();
        assert_eq!(config.debounce, Duration::from_millis(150));
        assert_eq!(config.export_file_name, "employees");
        assert_eq!(config.csv_delimiter, ',');
    }
}
