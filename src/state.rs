use std::collections::BTreeSet;

use crate::analysis::pivot::{Aggregation, pivot_table};
use crate::color::ColorMap;
use crate::data::filter::{FilterState, filtered_indices, init_filter_state};
use crate::data::model::{CellValue, EmployeeTable};

// ---------------------------------------------------------------------------
// Dashboard tabs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Breakdown,
    Drivers,
    Demographics,
    Data,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Overview,
        Tab::Breakdown,
        Tab::Drivers,
        Tab::Demographics,
        Tab::Data,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Breakdown => "Attrition Breakdown",
            Tab::Drivers => "Drivers & KPIs",
            Tab::Demographics => "Demographics",
            Tab::Data => "Data & Downloads",
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering. The loaded table is
/// immutable for the session; the filter selection and pivot choices are the
/// only inputs that change between render passes, and every derived view is
/// recomputed from (table, filters) on each pass.
pub struct AppState {
    /// Loaded dataset (None until the default file or a chosen file loads).
    pub table: Option<EmployeeTable>,

    /// Per-column filter selections.
    pub filters: FilterState,

    /// Indices of records passing the current filters (cached per pass).
    pub visible_indices: Vec<usize>,

    /// Currently shown tab.
    pub active_tab: Tab,

    /// Pivot-builder selections; the pivot is computed only once all three
    /// are chosen.
    pub pivot_row: Option<String>,
    pub pivot_col: Option<String>,
    pub pivot_agg: Option<Aggregation>,

    /// Last successfully computed pivot; kept unchanged when a new request
    /// fails with an aggregation error.
    pub pivot: Option<crate::analysis::pivot::PivotTable>,

    /// Warning from the last failed pivot request.
    pub pivot_warning: Option<String>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table: None,
            filters: FilterState::default(),
            visible_indices: Vec::new(),
            active_tab: Tab::Overview,
            pivot_row: None,
            pivot_col: None,
            pivot_agg: None,
            pivot: None,
            pivot_warning: None,
            status_message: None,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded table and initialise filters.
    pub fn set_table(&mut self, table: EmployeeTable) {
        self.filters = init_filter_state(&table);
        self.visible_indices = (0..table.len()).collect();
        self.pivot_row = None;
        self.pivot_col = None;
        self.pivot_agg = None;
        self.pivot = None;
        self.pivot_warning = None;
        self.status_message = None;
        self.table = Some(table);
    }

    /// Recompute `visible_indices` after a filter change, and refresh the
    /// pivot since it is derived from the filtered rows.
    pub fn refilter(&mut self) {
        if let Some(table) = &self.table {
            self.visible_indices = filtered_indices(table, &self.filters);
        }
        self.recompute_pivot();
    }

    /// Toggle a single value in a column's filter.
    pub fn toggle_filter_value(&mut self, column: &str, value: &CellValue) {
        let selected = self.filters.entry(column.to_string()).or_default();
        if selected.contains(value) {
            selected.remove(value);
        } else {
            selected.insert(value.clone());
        }
        self.refilter();
    }

    /// Select all values in a column.
    pub fn select_all(&mut self, column: &str) {
        if let Some(table) = &self.table {
            if let Some(all_vals) = table.unique_values.get(column) {
                self.filters.insert(column.to_string(), all_vals.clone());
                self.refilter();
            }
        }
    }

    /// Clear a column's selection. An empty selection is unconstrained, so
    /// this resets the column to "all rows pass".
    pub fn clear_filter(&mut self, column: &str) {
        self.filters.insert(column.to_string(), BTreeSet::new());
        self.refilter();
    }

    /// Recompute the pivot once row, column, and aggregation are all chosen.
    /// A failed request keeps the previous pivot and records a warning.
    pub fn recompute_pivot(&mut self) {
        let Some(table) = &self.table else {
            return;
        };
        let (Some(row), Some(col), Some(agg)) =
            (&self.pivot_row, &self.pivot_col, self.pivot_agg)
        else {
            return;
        };
        match pivot_table(table, &self.visible_indices, row, col, agg) {
            Ok(pt) => {
                self.pivot = Some(pt);
                self.pivot_warning = None;
            }
            Err(e) => {
                log::warn!("pivot request failed: {e}");
                self.pivot_warning = Some(e.to_string());
            }
        }
    }

    /// Colour map for a categorical column's unique values.
    pub fn color_map_for(&self, column: &str) -> Option<ColorMap> {
        let table = self.table.as_ref()?;
        table
            .unique_values
            .get(column)
            .map(|vals| ColorMap::new(column, vals))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::pivot::Aggregation;
    use crate::data::loader::read_csv;

    fn state_with(csv: &str) -> AppState {
        let mut state = AppState::default();
        state.set_table(read_csv(csv.as_bytes()).unwrap());
        state
    }

    #[test]
    fn initial_filters_show_everything() {
        let state = state_with("Department,Attrition\nA,Yes\nB,No\n");
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert!(state.filters.contains_key("Department"));
        // Attrition is not a filterable column.
        assert!(!state.filters.contains_key("Attrition"));
    }

    #[test]
    fn toggling_a_value_filters_rows() {
        let mut state = state_with("Department,Attrition\nA,Yes\nB,No\n");
        state.toggle_filter_value("Department", &CellValue::String("B".into()));
        assert_eq!(state.visible_indices, vec![0]);
        state.toggle_filter_value("Department", &CellValue::String("B".into()));
        assert_eq!(state.visible_indices, vec![0, 1]);
    }

    #[test]
    fn clear_filter_is_unconstrained() {
        let mut state = state_with("Department,Attrition\nA,Yes\nB,No\n");
        state.clear_filter("Department");
        assert_eq!(state.visible_indices, vec![0, 1]);
    }

    #[test]
    fn failed_pivot_keeps_previous_view_state() {
        let mut state = state_with(
            "Department,Attrition,Age\nA,Yes,30\nA,No,40\nB,No,50\n",
        );
        state.pivot_row = Some("Department".to_string());
        state.pivot_col = Some("Attrition".to_string());
        state.pivot_agg = Some(Aggregation::Mean);
        state.recompute_pivot();
        assert!(state.pivot.is_some());
        assert!(state.pivot_warning.is_none());

        // Same request against a table with no numeric value column.
        let mut state2 = state_with("Department,Attrition\nA,Yes\nA,No\nB,No\n");
        state2.pivot_row = Some("Department".to_string());
        state2.pivot_col = Some("Attrition".to_string());
        state2.pivot_agg = Some(Aggregation::Mean);
        state2.recompute_pivot();
        assert!(state2.pivot.is_none());
        assert!(state2.pivot_warning.is_some());
    }

    #[test]
    fn failing_request_keeps_the_earlier_pivot() {
        let mut state = state_with(
            "Department,Attrition,Age\nA,Yes,30\nA,No,40\nB,No,50\n",
        );
        state.pivot_row = Some("Department".to_string());
        state.pivot_col = Some("Attrition".to_string());
        state.pivot_agg = Some(Aggregation::Mean);
        state.recompute_pivot();
        assert!(state.pivot.is_some());

        // Re-pivoting on Age leaves only the non-numeric Department as a
        // value column: the request fails, the old pivot stays.
        state.pivot_row = Some("Age".to_string());
        state.recompute_pivot();
        assert!(state.pivot_warning.is_some());
        let pivot = state.pivot.as_ref().unwrap();
        assert_eq!(pivot.row_column, "Department");
        assert_eq!(pivot.value_columns, vec!["Age"]);
    }
}
