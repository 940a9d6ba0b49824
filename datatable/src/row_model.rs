//! Row model computation: filter, sort and paginate raw rows.
//!
//! The engine only calls into a [`RowComputation`] in client-side mode. The
//! default [`ClientRowModel`] filters with case-insensitive substring atoms
//! from nucleo-matcher, sorts by the honored sort entry and slices out the
//! current page.

use std::cmp::Ordering;

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};

use crate::column::ColumnDef;
use crate::row::{CellValue, TableRow};
use crate::sorting::{SortDirection, SortingState};
use crate::state::{ColumnFilters, PaginationState};

/// Separates cells when a whole row is matched against the global filter, so
/// a term never matches across a cell boundary.
const CELL_SEPARATOR: char = '\u{0}';

/// Inputs to a row model computation.
#[derive(Debug, Clone, Copy)]
pub struct ComputeRequest<'a> {
    pub columns: &'a [ColumnDef],
    pub sorting: &'a SortingState,
    pub column_filters: &'a ColumnFilters,
    pub global_filter: &'a str,
    pub pagination: PaginationState,
}

/// Output of a row model computation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedRows {
    /// Indices into the raw rows, in display order, for the current page.
    pub page: Vec<usize>,
    /// Rows left after filtering, across all pages.
    pub filtered_count: usize,
}

/// Pluggable client-side row computation.
pub trait RowComputation<R: TableRow>: Send + Sync {
    fn compute(&self, rows: &[R], request: &ComputeRequest<'_>) -> ComputedRows;
}

/// Default in-memory row computation.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientRowModel;

impl<R: TableRow> RowComputation<R> for ClientRowModel {
    fn compute(&self, rows: &[R], request: &ComputeRequest<'_>) -> ComputedRows {
        let mut indices = filter_rows(rows, request);
        sort_rows(rows, &mut indices, request);
        let filtered_count = indices.len();
        let range = request.pagination.row_range(filtered_count);
        log::trace!(
            "row model: {} rows, {} after filtering, page {:?}",
            rows.len(),
            filtered_count,
            range
        );
        ComputedRows {
            page: indices[range].to_vec(),
            filtered_count,
        }
    }
}

/// Case-insensitive substring matcher over whitespace-separated terms.
pub struct TextMatcher {
    pattern: Pattern,
    matcher: Matcher,
    buf: Vec<char>,
}

impl TextMatcher {
    /// Build a matcher. Returns `None` for a blank query, which matches
    /// everything.
    pub fn new(query: &str) -> Option<Self> {
        if query.trim().is_empty() {
            return None;
        }
        Some(Self {
            pattern: Pattern::new(
                query,
                CaseMatching::Ignore,
                Normalization::Smart,
                AtomKind::Substring,
            ),
            matcher: Matcher::new(Config::DEFAULT),
            buf: Vec::new(),
        })
    }

    /// Check if every term occurs in `haystack`.
    pub fn matches(&mut self, haystack: &str) -> bool {
        let haystack = Utf32Str::new(haystack, &mut self.buf);
        self.pattern.score(haystack, &mut self.matcher).is_some()
    }
}

fn filter_rows<R: TableRow>(rows: &[R], request: &ComputeRequest<'_>) -> Vec<usize> {
    let searchable: Vec<&str> = request
        .columns
        .iter()
        .filter_map(|col| col.accessor.as_deref())
        .collect();

    let mut global = TextMatcher::new(request.global_filter);
    let mut per_column: Vec<(&str, TextMatcher)> = request
        .column_filters
        .iter()
        .filter_map(|(id, needle)| {
            let accessor = request
                .columns
                .iter()
                .find(|col| col.id == id)?
                .accessor
                .as_deref()?;
            Some((accessor, TextMatcher::new(needle)?))
        })
        .collect();

    rows.iter()
        .enumerate()
        .filter(|(_, row)| {
            let columns_pass = per_column
                .iter_mut()
                .all(|(accessor, matcher)| matcher.matches(&row.cell(accessor).to_string()));
            if !columns_pass {
                return false;
            }
            match global.as_mut() {
                Some(matcher) => {
                    let joined = searchable
                        .iter()
                        .map(|accessor| row.cell(accessor).to_string())
                        .collect::<Vec<_>>()
                        .join(&CELL_SEPARATOR.to_string());
                    matcher.matches(&joined)
                }
                None => true,
            }
        })
        .map(|(i, _)| i)
        .collect()
}

fn sort_rows<R: TableRow>(rows: &[R], indices: &mut [usize], request: &ComputeRequest<'_>) {
    let Some(sort) = request.sorting.primary() else {
        return;
    };
    let Some(accessor) = request
        .columns
        .iter()
        .find(|col| col.id == sort.column_id && col.can_sort())
        .and_then(|col| col.accessor.as_deref())
    else {
        return;
    };

    let mut keyed: Vec<(usize, CellValue)> =
        indices.iter().map(|&i| (i, rows[i].cell(accessor))).collect();
    keyed.sort_by(|(_, a), (_, b)| compare_directed(a, b, sort.direction));
    for (slot, (i, _)) in indices.iter_mut().zip(keyed) {
        *slot = i;
    }
}

/// Compare two cells for a direction. Nulls stay last either way.
fn compare_directed(a: &CellValue, b: &CellValue, direction: SortDirection) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => match direction {
            SortDirection::Asc => a.sort_cmp(b),
            SortDirection::Desc => b.sort_cmp(a),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::accessor("name", "Name"),
            ColumnDef::accessor("dept", "Department"),
            ColumnDef::accessor("salary", "Salary"),
        ]
    }

    fn rows() -> Vec<Value> {
        vec![
            json!({ "name": "Park", "dept": "Sales", "salary": 300 }),
            json!({ "name": "Kim", "dept": "Engineering", "salary": null }),
            json!({ "name": "Lee", "dept": "Engineering", "salary": 500 }),
            json!({ "name": "Choi", "dept": "Sales", "salary": 100 }),
        ]
    }

    fn compute(sorting: &SortingState, filters: &ColumnFilters, global: &str, page: PaginationState) -> ComputedRows {
        let cols = columns();
        let request = ComputeRequest {
            columns: &cols,
            sorting,
            column_filters: filters,
            global_filter: global,
            pagination: page,
        };
        ClientRowModel.compute(&rows(), &request)
    }

    #[test]
    fn test_sort_desc_keeps_nulls_last() {
        let out = compute(
            &SortingState::by("salary", SortDirection::Desc),
            &ColumnFilters::new(),
            "",
            PaginationState::first(10),
        );
        assert_eq!(out.page, vec![2, 0, 3, 1]);
    }

    #[test]
    fn test_global_filter_is_case_insensitive() {
        let out = compute(&SortingState::none(), &ColumnFilters::new(), "engin", PaginationState::first(10));
        assert_eq!(out.page, vec![1, 2]);
        assert_eq!(out.filtered_count, 2);
    }

    #[test]
    fn test_global_terms_may_hit_different_cells() {
        let out = compute(&SortingState::none(), &ColumnFilters::new(), "lee engineering", PaginationState::first(10));
        assert_eq!(out.page, vec![2]);
    }

    #[test]
    fn test_column_filter() {
        let filters = ColumnFilters::new().with("dept", "sales");
        let out = compute(&SortingState::by("name", SortDirection::Asc), &filters, "", PaginationState::first(10));
        assert_eq!(out.page, vec![3, 0]);
    }

    #[test]
    fn test_paginates_after_filtering() {
        let out = compute(
            &SortingState::by("name", SortDirection::Asc),
            &ColumnFilters::new(),
            "",
            PaginationState::new(1, 3),
        );
        assert_eq!(out.page, vec![0]);
        assert_eq!(out.filtered_count, 4);
    }
}
