use crate::data::model::EmployeeTable;

// ---------------------------------------------------------------------------
// Pearson correlation matrix
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    /// Numeric columns in header order.
    pub columns: Vec<String>,
    /// `values[i][j]` = Pearson r between columns i and j; `NaN` when a pair
    /// has fewer than two complete observations or a zero-variance column.
    pub values: Vec<Vec<f64>>,
}

/// Pairwise Pearson correlation over all numeric columns of the filtered
/// table. Nulls are deleted pairwise, matching dataframe `corr()` semantics.
/// `None` with fewer than two numeric columns (the view is omitted).
pub fn correlation_matrix(table: &EmployeeTable, rows: &[usize]) -> Option<CorrelationMatrix> {
    let columns = table.numeric_columns();
    if columns.len() < 2 {
        return None;
    }

    // Per-column cell views with nulls kept as None for pairwise deletion.
    let series: Vec<Vec<Option<f64>>> = columns
        .iter()
        .map(|col| rows.iter().map(|&i| table.value(i, col).as_f64()).collect())
        .collect();

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        values[i][i] = 1.0;
        for j in (i + 1)..n {
            let r = pearson(&series[i], &series[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    Some(CorrelationMatrix { columns, values })
}

fn pearson(a: &[Option<f64>], b: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = a
        .iter()
        .zip(b)
        .filter_map(|(x, y)| Some(((*x)?, (*y)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for &(x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x == 0.0 || var_y == 0.0 {
        return f64::NAN;
    }
    cov / (var_x.sqrt() * var_y.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;

    #[test]
    fn perfectly_correlated_columns() {
        let t = read_csv("Age,MonthlyIncome\n20,2000\n30,3000\n40,4000\n".as_bytes()).unwrap();
        let m = correlation_matrix(&t, &[0, 1, 2]).unwrap();
        assert_eq!(m.columns, vec!["Age", "MonthlyIncome"]);
        assert!((m.values[0][1] - 1.0).abs() < 1e-12);
        assert!((m.values[1][0] - 1.0).abs() < 1e-12);
        assert_eq!(m.values[0][0], 1.0);
    }

    #[test]
    fn anti_correlated_columns() {
        let t = read_csv("Age,YearsAtCompany\n20,30\n30,20\n40,10\n".as_bytes()).unwrap();
        let m = correlation_matrix(&t, &[0, 1, 2]).unwrap();
        assert!((m.values[0][1] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn pairwise_null_deletion() {
        let t = read_csv("Age,MonthlyIncome\n20,2000\n30,\n40,4000\n".as_bytes()).unwrap();
        let m = correlation_matrix(&t, &[0, 1, 2]).unwrap();
        // Rows 0 and 2 remain: a perfect positive pair.
        assert!((m.values[0][1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn omitted_below_two_numeric_columns() {
        let t = read_csv("Department,Age\nSales,31\n".as_bytes()).unwrap();
        assert!(correlation_matrix(&t, &[0]).is_none());
    }

    #[test]
    fn zero_variance_gives_nan() {
        let t = read_csv("Age,JobSatisfaction\n30,3\n30,4\n30,2\n".as_bytes()).unwrap();
        let m = correlation_matrix(&t, &[0, 1, 2]).unwrap();
        assert!(m.values[0][1].is_nan());
    }
}
