use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use super::model::EmployeeTable;

/// Default file name offered by the export dialog.
pub const EXPORT_FILE_NAME: &str = "filtered_EA.csv";

// ---------------------------------------------------------------------------
// Filtered-table CSV export
// ---------------------------------------------------------------------------

/// Serialize the given rows of the table to CSV, preserving the table's
/// column order and the given row order. Reloading the output through the
/// CSV loader yields an identical table.
pub fn write_filtered_csv<W: Write>(
    table: &EmployeeTable,
    rows: &[usize],
    writer: W,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(&table.column_names)
        .context("writing CSV header")?;

    for &row in rows {
        let fields: Vec<String> = table
            .column_names
            .iter()
            .map(|col| table.value(row, col).to_csv_field())
            .collect();
        wtr.write_record(&fields)
            .with_context(|| format!("writing CSV row {row}"))?;
    }

    wtr.flush().context("flushing CSV output")?;
    Ok(())
}

/// Export the filtered table to a file on disk.
pub fn export_filtered_csv(table: &EmployeeTable, rows: &[usize], path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("creating {}", path.display()))?;
    write_filtered_csv(table, rows, file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{FilterState, filtered_indices};
    use crate::data::loader::read_csv;
    use crate::data::model::CellValue;

    #[test]
    fn csv_round_trip_preserves_columns_rows_and_cells() {
        let source = "Department,Attrition,Age,MonthlyIncome\n\
                      Sales,Yes,31,5100.25\n\
                      Sales,No,45,8200.0\n\
                      HR,No,29,3900\n";
        let table = read_csv(source.as_bytes()).unwrap();

        let mut filters = FilterState::new();
        filters.insert(
            "Department".to_string(),
            [CellValue::String("Sales".to_string())].into_iter().collect(),
        );
        let rows = filtered_indices(&table, &filters);
        assert_eq!(rows, vec![0, 1]);

        let mut buf = Vec::new();
        write_filtered_csv(&table, &rows, &mut buf).unwrap();
        let reloaded = read_csv(buf.as_slice()).unwrap();

        assert_eq!(reloaded.column_names, table.column_names);
        assert_eq!(reloaded.len(), rows.len());
        for (out_row, &src_row) in rows.iter().enumerate() {
            for col in &table.column_names {
                assert_eq!(
                    reloaded.value(out_row, col),
                    table.value(src_row, col),
                    "cell mismatch at row {src_row}, column {col}"
                );
            }
        }
    }

    #[test]
    fn integral_floats_stay_floats_after_round_trip() {
        // A float column whose values happen to be whole numbers must not
        // come back as integers.
        let table = read_csv("MonthlyIncome\n3900.0\n".as_bytes()).unwrap();
        assert_eq!(*table.value(0, "MonthlyIncome"), CellValue::Float(3900.0));

        let mut buf = Vec::new();
        write_filtered_csv(&table, &[0], &mut buf).unwrap();
        let reloaded = read_csv(buf.as_slice()).unwrap();
        assert_eq!(
            *reloaded.value(0, "MonthlyIncome"),
            CellValue::Float(3900.0)
        );
    }

    #[test]
    fn unfiltered_export_equals_source() {
        let source = "Department,Age\nSales,31\nHR,45\n";
        let table = read_csv(source.as_bytes()).unwrap();
        let rows: Vec<usize> = (0..table.len()).collect();

        let mut buf = Vec::new();
        write_filtered_csv(&table, &rows, &mut buf).unwrap();

        assert_eq!(String::from_utf8(buf).unwrap(), source);
    }
}
