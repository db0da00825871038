use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring common tabular dtypes.
/// Using `BTreeMap` / `BTreeSet` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` for numeric aggregation.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// CSV field text. Unlike `Display` this keeps full float precision so an
    /// exported table reloads to the exact same values. Integral floats get
    /// an explicit decimal so they re-parse as floats, not integers.
    pub fn to_csv_field(&self) -> String {
        match self {
            CellValue::String(s) => s.clone(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(v) => {
                if v.fract() == 0.0 && v.is_finite() {
                    format!("{v:.1}")
                } else {
                    v.to_string()
                }
            }
            CellValue::Bool(b) => b.to_string(),
            CellValue::Null => String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// A single employee record (one row of the source table).
#[derive(Debug, Clone)]
pub struct Record {
    /// Dynamic columns: column_name → value. Columns absent from a row read
    /// back as `Null`.
    pub values: BTreeMap<String, CellValue>,
}

impl Record {
    pub fn get(&self, column: &str) -> &CellValue {
        self.values.get(column).unwrap_or(&CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// EmployeeTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Columns offered as multi-select filters in the side panel. All optional;
/// a filter on a column the table lacks is silently skipped.
pub const FILTER_COLUMNS: &[&str] = &[
    "Department",
    "JobRole",
    "Gender",
    "Education",
    "MaritalStatus",
    "OverTime",
];

/// Binary employment-status column ("Yes"/"No", case-insensitive).
pub const ATTRITION: &str = "Attrition";

/// The full parsed table with pre-computed column indices.
#[derive(Debug, Clone)]
pub struct EmployeeTable {
    /// All records (rows), in source order.
    pub records: Vec<Record>,
    /// Column names in source (header) order.
    pub column_names: Vec<String>,
    /// For each column the sorted set of unique values.
    pub unique_values: BTreeMap<String, BTreeSet<CellValue>>,
}

impl EmployeeTable {
    /// Build column indices from the loaded records. `column_names` keeps the
    /// source header order; columns seen only in row data are appended.
    pub fn from_records(column_names: Vec<String>, records: Vec<Record>) -> Self {
        let mut column_names = column_names;
        let mut unique_values: BTreeMap<String, BTreeSet<CellValue>> = BTreeMap::new();

        for name in &column_names {
            unique_values.entry(name.clone()).or_default();
        }
        for rec in &records {
            for (col, val) in &rec.values {
                if !unique_values.contains_key(col) {
                    column_names.push(col.clone());
                }
                unique_values
                    .entry(col.clone())
                    .or_default()
                    .insert(val.clone());
            }
        }
        EmployeeTable {
            records,
            column_names,
            unique_values,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.unique_values.contains_key(column)
    }

    /// A column counts as numeric when it has at least one numeric cell and
    /// no non-numeric, non-null cells.
    pub fn is_numeric(&self, column: &str) -> bool {
        let Some(values) = self.unique_values.get(column) else {
            return false;
        };
        let mut seen_number = false;
        for v in values {
            match v {
                CellValue::Integer(_) | CellValue::Float(_) => seen_number = true,
                CellValue::Null => {}
                _ => return false,
            }
        }
        seen_number
    }

    /// Numeric columns in header order.
    pub fn numeric_columns(&self) -> Vec<String> {
        self.column_names
            .iter()
            .filter(|c| self.is_numeric(c))
            .cloned()
            .collect()
    }

    /// The filterable columns actually present in this table, in the fixed
    /// filter order.
    pub fn filterable_columns(&self) -> Vec<String> {
        FILTER_COLUMNS
            .iter()
            .filter(|c| self.has_column(c))
            .map(|c| c.to_string())
            .collect()
    }

    /// Cell value at (row, column); `Null` when the row lacks the column.
    pub fn value(&self, row: usize, column: &str) -> &CellValue {
        self.records[row].get(column)
    }

    /// Non-null `f64` values of a column over the given rows.
    pub fn numeric_values(&self, column: &str, rows: &[usize]) -> Vec<f64> {
        rows.iter()
            .filter_map(|&i| self.records[i].get(column).as_f64())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, CellValue)]) -> Record {
        Record {
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        }
    }

    #[test]
    fn numeric_detection_ignores_nulls() {
        let table = EmployeeTable::from_records(
            vec!["Age".into(), "Department".into()],
            vec![
                record(&[
                    ("Age", CellValue::Integer(31)),
                    ("Department", CellValue::String("Sales".into())),
                ]),
                record(&[
                    ("Age", CellValue::Null),
                    ("Department", CellValue::String("HR".into())),
                ]),
            ],
        );
        assert!(table.is_numeric("Age"));
        assert!(!table.is_numeric("Department"));
        assert!(!table.is_numeric("MonthlyIncome"));
        assert_eq!(table.numeric_columns(), vec!["Age".to_string()]);
    }

    #[test]
    fn header_order_is_preserved() {
        let table = EmployeeTable::from_records(
            vec!["Department".into(), "Age".into()],
            vec![record(&[
                ("Age", CellValue::Integer(40)),
                ("Department", CellValue::String("R&D".into())),
            ])],
        );
        assert_eq!(table.column_names, vec!["Department", "Age"]);
    }
}
