use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::data::model::{CellValue, EmployeeTable};

// ---------------------------------------------------------------------------
// Aggregation functions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    Count,
    Mean,
    Sum,
    Min,
    Max,
}

impl Aggregation {
    pub const ALL: [Aggregation; 5] = [
        Aggregation::Count,
        Aggregation::Mean,
        Aggregation::Sum,
        Aggregation::Min,
        Aggregation::Max,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Aggregation::Count => "count",
            Aggregation::Mean => "mean",
            Aggregation::Sum => "sum",
            Aggregation::Min => "min",
            Aggregation::Max => "max",
        }
    }

    /// Whether this aggregation only applies to numeric value columns.
    /// `count` counts non-null cells of any type.
    pub fn numeric_only(&self) -> bool {
        !matches!(self, Aggregation::Count)
    }

    fn reduce(&self, values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            return None;
        }
        Some(match self {
            Aggregation::Count => values.len() as f64,
            Aggregation::Sum => values.iter().sum(),
            Aggregation::Mean => values.iter().sum::<f64>() / values.len() as f64,
            Aggregation::Min => values.iter().cloned().fold(f64::INFINITY, f64::min),
            Aggregation::Max => values.iter().cloned().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Recoverable pivot failures, surfaced to the user as a warning. The
/// session keeps its previous view state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("column '{0}' is not present in the table")]
    MissingColumn(String),
    #[error("row and column selections must be different columns")]
    SameColumn,
    #[error("'{agg}' requires a numeric value column besides '{row}' and '{col}'")]
    NoNumericValueColumns {
        agg: Aggregation,
        row: String,
        col: String,
    },
    #[error("no value columns left besides '{row}' and '{col}'")]
    NoValueColumns { row: String, col: String },
}

// ---------------------------------------------------------------------------
// Pivot table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PivotTable {
    pub row_column: String,
    pub col_column: String,
    pub aggregation: Aggregation,
    /// Value columns the aggregation was applied to, in header order.
    pub value_columns: Vec<String>,
    /// Observed row-column values, sorted.
    pub row_values: Vec<CellValue>,
    /// Observed column-column values, sorted.
    pub col_values: Vec<CellValue>,
    /// `cells[r][c][v]` = aggregate of value_columns[v] over the group
    /// (row_values[r], col_values[c]); `None` for empty groups.
    pub cells: Vec<Vec<Vec<Option<f64>>>>,
}

/// Group the given rows by (row column, column column) and reduce the
/// remaining value columns with the chosen aggregation.
///
/// Compatibility rules: `count` accepts value columns of any type (counting
/// non-null cells); `mean`, `sum`, `min`, and `max` accept only numeric
/// value columns. A request with no compatible value column is rejected with
/// an [`AggregationError`] instead of aborting the session.
pub fn pivot_table(
    table: &EmployeeTable,
    rows: &[usize],
    row_column: &str,
    col_column: &str,
    aggregation: Aggregation,
) -> Result<PivotTable, AggregationError> {
    if !table.has_column(row_column) {
        return Err(AggregationError::MissingColumn(row_column.to_string()));
    }
    if !table.has_column(col_column) {
        return Err(AggregationError::MissingColumn(col_column.to_string()));
    }
    if row_column == col_column {
        return Err(AggregationError::SameColumn);
    }

    let value_columns: Vec<String> = table
        .column_names
        .iter()
        .filter(|c| c.as_str() != row_column && c.as_str() != col_column)
        .filter(|c| !aggregation.numeric_only() || table.is_numeric(c))
        .cloned()
        .collect();

    if value_columns.is_empty() {
        return Err(if aggregation.numeric_only() {
            AggregationError::NoNumericValueColumns {
                agg: aggregation,
                row: row_column.to_string(),
                col: col_column.to_string(),
            }
        } else {
            AggregationError::NoValueColumns {
                row: row_column.to_string(),
                col: col_column.to_string(),
            }
        });
    }

    // Bucket row indices per (row value, column value).
    let mut groups: BTreeMap<(CellValue, CellValue), Vec<usize>> = BTreeMap::new();
    for &i in rows {
        let r = table.value(i, row_column);
        let c = table.value(i, col_column);
        if r.is_null() || c.is_null() {
            continue;
        }
        groups.entry((r.clone(), c.clone())).or_default().push(i);
    }

    let mut row_values: Vec<CellValue> = groups.keys().map(|(r, _)| r.clone()).collect();
    row_values.dedup();
    let mut col_values: Vec<CellValue> = groups.keys().map(|(_, c)| c.clone()).collect();
    col_values.sort();
    col_values.dedup();

    let cells = row_values
        .iter()
        .map(|r| {
            col_values
                .iter()
                .map(|c| {
                    let members = groups.get(&(r.clone(), c.clone()));
                    value_columns
                        .iter()
                        .map(|vc| {
                            let members = members?;
                            match aggregation {
                                // count: non-null cells of any type; an
                                // existing group with only nulls counts 0
                                Aggregation::Count => {
                                    let n = members
                                        .iter()
                                        .filter(|&&i| !table.value(i, vc).is_null())
                                        .count();
                                    Some(n as f64)
                                }
                                _ => aggregation.reduce(&table.numeric_values(vc, members)),
                            }
                        })
                        .collect()
                })
                .collect()
        })
        .collect();

    Ok(PivotTable {
        row_column: row_column.to_string(),
        col_column: col_column.to_string(),
        aggregation,
        value_columns,
        row_values,
        col_values,
        cells,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;

    fn table() -> EmployeeTable {
        read_csv(
            "Department,Attrition,MonthlyIncome\n\
             Sales,Yes,4000\n\
             Sales,No,6000\n\
             Sales,No,8000\n\
             HR,No,5000\n"
                .as_bytes(),
        )
        .unwrap()
    }

    fn all_rows(t: &EmployeeTable) -> Vec<usize> {
        (0..t.len()).collect()
    }

    #[test]
    fn mean_pivot_over_numeric_column() {
        let t = table();
        let pt = pivot_table(&t, &all_rows(&t), "Department", "Attrition", Aggregation::Mean)
            .unwrap();
        assert_eq!(pt.value_columns, vec!["MonthlyIncome"]);
        // Rows: HR, Sales (sorted). Cols: No, Yes (sorted).
        assert_eq!(pt.cells[0][0][0], Some(5000.0)); // HR / No
        assert_eq!(pt.cells[0][1][0], None); // HR / Yes: empty group
        assert_eq!(pt.cells[1][0][0], Some(7000.0)); // Sales / No
        assert_eq!(pt.cells[1][1][0], Some(4000.0)); // Sales / Yes
    }

    #[test]
    fn count_pivot_counts_non_null_cells() {
        let t = table();
        let pt = pivot_table(&t, &all_rows(&t), "Department", "Attrition", Aggregation::Count)
            .unwrap();
        assert_eq!(pt.cells[1][0][0], Some(2.0)); // Sales / No
    }

    #[test]
    fn count_of_an_all_null_group_is_zero() {
        let t = read_csv("Department,Attrition,Age\nSales,Yes,\nSales,No,41\n".as_bytes())
            .unwrap();
        let pt = pivot_table(&t, &[0, 1], "Department", "Attrition", Aggregation::Count)
            .unwrap();
        assert_eq!(pt.value_columns, vec!["Age"]);
        // Cols sorted: No, Yes. The Sales/Yes group exists but its only Age
        // cell is null.
        assert_eq!(pt.cells[0][1][0], Some(0.0));
        assert_eq!(pt.cells[0][0][0], Some(1.0));
    }

    #[test]
    fn min_max_and_sum() {
        let t = table();
        let rows = all_rows(&t);
        let min = pivot_table(&t, &rows, "Department", "Attrition", Aggregation::Min).unwrap();
        let max = pivot_table(&t, &rows, "Department", "Attrition", Aggregation::Max).unwrap();
        let sum = pivot_table(&t, &rows, "Department", "Attrition", Aggregation::Sum).unwrap();
        assert_eq!(min.cells[1][0][0], Some(6000.0));
        assert_eq!(max.cells[1][0][0], Some(8000.0));
        assert_eq!(sum.cells[1][0][0], Some(14000.0));
    }

    #[test]
    fn mean_without_numeric_value_columns_is_an_error() {
        let t = read_csv("Department,Attrition\nA,Yes\nA,No\nB,No\n".as_bytes()).unwrap();
        let err = pivot_table(&t, &[0, 1, 2], "Department", "Attrition", Aggregation::Mean)
            .unwrap_err();
        assert_eq!(
            err,
            AggregationError::NoNumericValueColumns {
                agg: Aggregation::Mean,
                row: "Department".to_string(),
                col: "Attrition".to_string(),
            }
        );
    }

    #[test]
    fn missing_and_duplicate_columns_are_errors() {
        let t = table();
        let rows = all_rows(&t);
        assert!(matches!(
            pivot_table(&t, &rows, "Nope", "Attrition", Aggregation::Count),
            Err(AggregationError::MissingColumn(_))
        ));
        let err = pivot_table(&t, &rows, "Attrition", "Attrition", Aggregation::Count)
            .unwrap_err();
        assert_eq!(err, AggregationError::SameColumn);
    }
}
