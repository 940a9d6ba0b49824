//! Row access: cell values, the `TableRow` trait and row identity.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// CellValue
// =============================================================================

/// A single cell read out of a row through a column accessor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl CellValue {
    /// Check if the cell holds no value.
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Ordering used for ascending sorts.
    ///
    /// Numbers compare numerically, text case-insensitively, `false < true`,
    /// numbers sort before booleans before text, and `Null` is always last.
    pub fn sort_cmp(&self, other: &CellValue) -> Ordering {
        fn rank(v: &CellValue) -> u8 {
            match v {
                CellValue::Int(_) | CellValue::Float(_) => 0,
                CellValue::Bool(_) => 1,
                CellValue::Text(_) => 2,
                CellValue::Null => 3,
            }
        }

        match (self, other) {
            (CellValue::Text(a), CellValue::Text(b)) => a
                .to_lowercase()
                .cmp(&b.to_lowercase())
                .then_with(|| a.cmp(b)),
            (CellValue::Bool(a), CellValue::Bool(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => rank(self).cmp(&rank(other)),
            },
        }
    }
}

/// The export/search form of a cell. `Null` renders as the empty string.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(x) => write!(f, "{}", x),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<f64> for CellValue {
    fn from(x: f64) -> Self {
        CellValue::Float(x)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(CellValue::Null)
    }
}

impl From<&Value> for CellValue {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => n
                .as_i64()
                .map(CellValue::Int)
                .or_else(|| n.as_f64().map(CellValue::Float))
                .unwrap_or(CellValue::Null),
            Value::String(s) => CellValue::Text(s.clone()),
            // Nested values are shown in their JSON form.
            other => CellValue::Text(other.to_string()),
        }
    }
}

// =============================================================================
// TableRow Trait
// =============================================================================

/// Trait for rows that can be displayed in a table.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone)]
/// struct Employee {
///     id: u32,
///     name: String,
///     salary: Option<i64>,
/// }
///
/// impl TableRow for Employee {
///     fn cell(&self, accessor: &str) -> CellValue {
///         match accessor {
///             "name" => self.name.as_str().into(),
///             "salary" => self.salary.into(),
///             _ => CellValue::Null,
///         }
///     }
/// }
/// ```
pub trait TableRow: Clone + Send + Sync + 'static {
    /// Read the cell behind an accessor key. Unknown keys yield `Null`.
    fn cell(&self, accessor: &str) -> CellValue;
}

impl TableRow for Map<String, Value> {
    fn cell(&self, accessor: &str) -> CellValue {
        self.get(accessor).map(CellValue::from).unwrap_or_default()
    }
}

impl TableRow for Value {
    fn cell(&self, accessor: &str) -> CellValue {
        self.get(accessor).map(CellValue::from).unwrap_or_default()
    }
}

// =============================================================================
// Row identity
// =============================================================================

/// Caller-supplied row id accessor.
pub struct RowIdAccessor<R>(Arc<dyn Fn(&R) -> String + Send + Sync>);

impl<R> RowIdAccessor<R> {
    pub fn new(f: impl Fn(&R) -> String + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    /// Resolve the id of a row.
    pub fn id(&self, row: &R) -> String {
        (self.0)(row)
    }
}

impl<R> Clone for RowIdAccessor<R> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<R> fmt::Debug for RowIdAccessor<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RowIdAccessor(..)")
    }
}

/// Resolve a row id: the accessor when supplied, otherwise the row's position
/// within the current page.
pub fn resolve_row_id<R>(accessor: Option<&RowIdAccessor<R>>, row: &R, page_position: usize) -> String {
    match accessor {
        Some(accessor) => accessor.id(row),
        None => page_position.to_string(),
    }
}
