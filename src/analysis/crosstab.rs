use std::collections::BTreeMap;

use crate::data::model::{CellValue, EmployeeTable};

// ---------------------------------------------------------------------------
// Two-column cross-tabulation
// ---------------------------------------------------------------------------

/// Counts for every observed combination of two categorical columns.
#[derive(Debug, Clone)]
pub struct CrossTab {
    /// Observed values of the grouping (row) column, sorted.
    pub row_values: Vec<CellValue>,
    /// Observed values of the second (column) column, sorted.
    pub col_values: Vec<CellValue>,
    /// `counts[r][c]` = occurrences of (row_values[r], col_values[c]).
    pub counts: Vec<Vec<usize>>,
}

impl CrossTab {
    /// Row totals.
    pub fn row_totals(&self) -> Vec<usize> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    /// Row-normalized frequencies: each row sums to 1 (a conditional
    /// distribution of the column values given the row value). Rows are only
    /// ever present when at least one record was observed, so totals are
    /// never zero.
    pub fn normalized_rows(&self) -> Vec<Vec<f64>> {
        self.counts
            .iter()
            .map(|row| {
                let total: usize = row.iter().sum();
                row.iter().map(|&n| n as f64 / total as f64).collect()
            })
            .collect()
    }
}

/// Cross-tabulate `row_column` × `col_column` over the given rows.
///
/// Returns `None` when either column is absent from the table (the view is
/// omitted entirely, no placeholder) or when no combination was observed.
pub fn crosstab(
    table: &EmployeeTable,
    rows: &[usize],
    row_column: &str,
    col_column: &str,
) -> Option<CrossTab> {
    if !table.has_column(row_column) || !table.has_column(col_column) {
        return None;
    }

    let mut pair_counts: BTreeMap<(CellValue, CellValue), usize> = BTreeMap::new();
    for &i in rows {
        let r = table.value(i, row_column);
        let c = table.value(i, col_column);
        if r.is_null() || c.is_null() {
            continue;
        }
        *pair_counts.entry((r.clone(), c.clone())).or_default() += 1;
    }
    if pair_counts.is_empty() {
        return None;
    }

    let mut row_values: Vec<CellValue> = pair_counts.keys().map(|(r, _)| r.clone()).collect();
    row_values.dedup();
    let mut col_values: Vec<CellValue> = pair_counts.keys().map(|(_, c)| c.clone()).collect();
    col_values.sort();
    col_values.dedup();

    let counts = row_values
        .iter()
        .map(|r| {
            col_values
                .iter()
                .map(|c| {
                    pair_counts
                        .get(&(r.clone(), c.clone()))
                        .copied()
                        .unwrap_or(0)
                })
                .collect()
        })
        .collect();

    Some(CrossTab {
        row_values,
        col_values,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;

    fn scenario_table() -> EmployeeTable {
        read_csv("Department,Attrition\nA,Yes\nA,No\nB,No\n".as_bytes()).unwrap()
    }

    #[test]
    fn counts_per_combination() {
        let t = scenario_table();
        let ct = crosstab(&t, &[0, 1, 2], "Department", "Attrition").unwrap();
        assert_eq!(ct.row_values.len(), 2); // A, B
        assert_eq!(ct.col_values.len(), 2); // No, Yes
        // Row A: one No, one Yes. Row B: one No, zero Yes.
        assert_eq!(ct.counts[0], vec![1, 1]);
        assert_eq!(ct.counts[1], vec![1, 0]);
    }

    #[test]
    fn normalized_rows_sum_to_one() {
        let t = scenario_table();
        let ct = crosstab(&t, &[0, 1, 2], "Department", "Attrition").unwrap();
        for row in ct.normalized_rows() {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn department_a_conditional_distribution() {
        let t = scenario_table();
        // Filtered to Department = A (rows 0, 1).
        let ct = crosstab(&t, &[0, 1], "Department", "Attrition").unwrap();
        assert_eq!(ct.row_values.len(), 1);
        let norm = ct.normalized_rows();
        // {No: 0.5, Yes: 0.5}
        assert!((norm[0][0] - 0.5).abs() < 1e-9);
        assert!((norm[0][1] - 0.5).abs() < 1e-9);
    }

    #[test]
    fn missing_column_omits_the_view() {
        let t = scenario_table();
        assert!(crosstab(&t, &[0, 1, 2], "Department", "OverTime").is_none());
        assert!(crosstab(&t, &[0, 1, 2], "Gender", "Attrition").is_none());
    }

    #[test]
    fn empty_selection_omits_the_view() {
        let t = scenario_table();
        assert!(crosstab(&t, &[], "Department", "Attrition").is_none());
    }
}
