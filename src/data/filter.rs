use std::collections::{BTreeMap, BTreeSet};

use super::model::{CellValue, EmployeeTable, FILTER_COLUMNS};

// ---------------------------------------------------------------------------
// Filter predicate: which unique values are selected per column
// ---------------------------------------------------------------------------

/// Per-column selection state: maps column_name → set of selected values.
/// A column absent from the map, or mapped to an empty set, is unconstrained
/// (all rows pass for that column).
pub type FilterState = BTreeMap<String, BTreeSet<CellValue>>;

/// Initialise a [`FilterState`] with every value of every filterable column
/// selected (i.e., show everything).
pub fn init_filter_state(table: &EmployeeTable) -> FilterState {
    FILTER_COLUMNS
        .iter()
        .filter_map(|col| {
            table
                .unique_values
                .get(*col)
                .map(|vals| (col.to_string(), vals.clone()))
        })
        .collect()
}

/// Return indices of records that pass all active filters.
///
/// A record passes a column filter when:
/// * The column is not in `filters`, or its set is empty → passes (no
///   constraint)
/// * The column is not present in the table → passes (vacuous filter)
/// * The record's value for that column is in the selected set → passes
///
/// The result is the conjunction of the per-column tests, so filter order
/// never matters, and selecting every value of every column returns the
/// table unchanged.
pub fn filtered_indices(table: &EmployeeTable, filters: &FilterState) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| {
            for (col, selected) in filters {
                if selected.is_empty() {
                    // Nothing selected → no constraint for this column
                    continue;
                }
                if !table.has_column(col) {
                    continue;
                }
                if !selected.contains(rec.get(col)) {
                    return false;
                }
            }
            true
        })
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn cell(s: &str) -> CellValue {
        CellValue::String(s.to_string())
    }

    fn table() -> EmployeeTable {
        let rows = [
            ("A", "Yes"),
            ("A", "No"),
            ("B", "No"),
        ];
        let records = rows
            .iter()
            .map(|(dept, attr)| Record {
                values: [
                    ("Department".to_string(), cell(dept)),
                    ("Attrition".to_string(), cell(attr)),
                ]
                .into_iter()
                .collect(),
            })
            .collect();
        EmployeeTable::from_records(
            vec!["Department".into(), "Attrition".into()],
            records,
        )
    }

    fn select(filters: &mut FilterState, col: &str, values: &[&str]) {
        filters.insert(col.to_string(), values.iter().map(|v| cell(v)).collect());
    }

    #[test]
    fn no_filters_returns_all_rows_in_order() {
        let t = table();
        let idx = filtered_indices(&t, &FilterState::new());
        assert_eq!(idx, vec![0, 1, 2]);
    }

    #[test]
    fn all_values_selected_is_identity() {
        let t = table();
        let filters = init_filter_state(&t);
        assert_eq!(filtered_indices(&t, &filters), vec![0, 1, 2]);
    }

    #[test]
    fn empty_selection_is_unconstrained() {
        let t = table();
        let mut filters = FilterState::new();
        filters.insert("Department".to_string(), BTreeSet::new());
        assert_eq!(filtered_indices(&t, &filters), vec![0, 1, 2]);
    }

    #[test]
    fn filter_on_missing_column_is_vacuous() {
        let t = table();
        let mut filters = FilterState::new();
        select(&mut filters, "OverTime", &["Yes"]);
        assert_eq!(filtered_indices(&t, &filters), vec![0, 1, 2]);
    }

    #[test]
    fn department_filter_selects_subset() {
        let t = table();
        let mut filters = FilterState::new();
        select(&mut filters, "Department", &["A"]);
        assert_eq!(filtered_indices(&t, &filters), vec![0, 1]);
    }

    #[test]
    fn filters_commute_across_columns() {
        let t = table();

        // Apply Department then Attrition in two passes...
        let mut dept_only = FilterState::new();
        select(&mut dept_only, "Department", &["A"]);
        let mut attr_only = FilterState::new();
        select(&mut attr_only, "Attrition", &["No"]);

        let mut both = FilterState::new();
        select(&mut both, "Department", &["A"]);
        select(&mut both, "Attrition", &["No"]);

        let combined = filtered_indices(&t, &both);

        // ...and compare against intersecting the single-column results.
        let a: BTreeSet<usize> = filtered_indices(&t, &dept_only).into_iter().collect();
        let b: BTreeSet<usize> = filtered_indices(&t, &attr_only).into_iter().collect();
        let intersect: Vec<usize> = a.intersection(&b).copied().collect();

        assert_eq!(combined, intersect);
        assert_eq!(combined, vec![1]);
    }

    #[test]
    fn result_is_always_a_subset() {
        let t = table();
        let mut filters = FilterState::new();
        select(&mut filters, "Department", &["B"]);
        let idx = filtered_indices(&t, &filters);
        assert!(idx.iter().all(|&i| i < t.len()));
        assert_eq!(idx, vec![2]);
    }
}
