use crate::data::model::{ATTRITION, CellValue, EmployeeTable};

// ---------------------------------------------------------------------------
// Attrition rate
// ---------------------------------------------------------------------------

/// Percentage of the given rows whose `Attrition` value, case-normalized,
/// equals "yes". `None` when the column is absent or no rows are selected.
pub fn attrition_rate(table: &EmployeeTable, rows: &[usize]) -> Option<f64> {
    if !table.has_column(ATTRITION) || rows.is_empty() {
        return None;
    }
    let yes = rows
        .iter()
        .filter(|&&i| is_yes(table.value(i, ATTRITION)))
        .count();
    Some(100.0 * yes as f64 / rows.len() as f64)
}

fn is_yes(value: &CellValue) -> bool {
    match value {
        CellValue::String(s) => s.eq_ignore_ascii_case("yes"),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Value counts and grouping (pie chart, box/violin groups)
// ---------------------------------------------------------------------------

/// Occurrences of each value of `column` over the given rows, in sorted
/// value order. Empty when the column is absent.
pub fn value_counts(
    table: &EmployeeTable,
    rows: &[usize],
    column: &str,
) -> Vec<(CellValue, usize)> {
    if !table.has_column(column) {
        return Vec::new();
    }
    let mut counts: std::collections::BTreeMap<CellValue, usize> = Default::default();
    for &i in rows {
        let v = table.value(i, column);
        if !v.is_null() {
            *counts.entry(v.clone()).or_default() += 1;
        }
    }
    counts.into_iter().collect()
}

/// The numeric values of `value_column`, grouped by the values of
/// `group_column`, in sorted group order. Groups with no numeric values are
/// kept (empty vec) so category axes stay stable across filter changes.
pub fn group_numeric(
    table: &EmployeeTable,
    rows: &[usize],
    group_column: &str,
    value_column: &str,
) -> Vec<(CellValue, Vec<f64>)> {
    if !table.has_column(group_column) || !table.has_column(value_column) {
        return Vec::new();
    }
    let mut groups: std::collections::BTreeMap<CellValue, Vec<f64>> = Default::default();
    for &i in rows {
        let key = table.value(i, group_column);
        if key.is_null() {
            continue;
        }
        let entry = groups.entry(key.clone()).or_default();
        if let Some(v) = table.value(i, value_column).as_f64() {
            entry.push(v);
        }
    }
    groups.into_iter().collect()
}

// ---------------------------------------------------------------------------
// Quantiles and five-number summaries
// ---------------------------------------------------------------------------

/// Linear-interpolation quantile over an already-sorted slice.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!(!sorted.is_empty());
    if sorted.len() == 1 {
        return sorted[0];
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Five-number summary feeding box plots. `None` on an empty sample.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    Some(BoxStats {
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

// ---------------------------------------------------------------------------
// Per-column summary statistics (describe-style)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct NumericSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` below two observations.
    pub std: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

#[derive(Debug, Clone)]
pub struct CategoricalSummary {
    pub count: usize,
    pub unique: usize,
    /// Most frequent value and its frequency; `None` when count is zero.
    pub top: Option<(CellValue, usize)>,
}

#[derive(Debug, Clone)]
pub enum ColumnSummary {
    Numeric(NumericSummary),
    Categorical(CategoricalSummary),
}

/// Per-column descriptors over the given rows, in header order.
pub fn summarize(table: &EmployeeTable, rows: &[usize]) -> Vec<(String, ColumnSummary)> {
    table
        .column_names
        .iter()
        .map(|col| {
            let summary = if table.is_numeric(col) {
                ColumnSummary::Numeric(numeric_summary(&table.numeric_values(col, rows)))
            } else {
                ColumnSummary::Categorical(categorical_summary(table, rows, col))
            };
            (col.clone(), summary)
        })
        .collect()
}

fn numeric_summary(values: &[f64]) -> NumericSummary {
    let count = values.len();
    if count == 0 {
        return NumericSummary {
            count: 0,
            mean: f64::NAN,
            std: None,
            min: f64::NAN,
            q1: f64::NAN,
            median: f64::NAN,
            q3: f64::NAN,
            max: f64::NAN,
        };
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mean = sorted.iter().sum::<f64>() / count as f64;
    let std = if count > 1 {
        let var = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
        Some(var.sqrt())
    } else {
        None
    };

    NumericSummary {
        count,
        mean,
        std,
        min: sorted[0],
        q1: quantile(&sorted, 0.25),
        median: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
        max: sorted[count - 1],
    }
}

fn categorical_summary(table: &EmployeeTable, rows: &[usize], column: &str) -> CategoricalSummary {
    let counts = value_counts(table, rows, column);
    let count: usize = counts.iter().map(|(_, n)| n).sum();
    let top = counts
        .iter()
        .max_by_key(|(_, n)| *n)
        .map(|(v, n)| (v.clone(), *n));
    CategoricalSummary {
        count,
        unique: counts.len(),
        top,
    }
}

// ---------------------------------------------------------------------------
// Histogram binning
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Histogram {
    /// `bins + 1` ascending bin edges.
    pub edges: Vec<f64>,
    /// Count per bin; last bin is closed on both sides.
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn bin_center(&self, bin: usize) -> f64 {
        (self.edges[bin] + self.edges[bin + 1]) / 2.0
    }

    pub fn bin_width(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }
}

/// Equal-width histogram over precomputed edges shared between groups.
pub fn histogram_with_edges(values: &[f64], edges: &[f64]) -> Histogram {
    let bins = edges.len() - 1;
    let lo = edges[0];
    let width = edges[1] - edges[0];
    let mut counts = vec![0usize; bins];
    for &v in values {
        let mut bin = if width > 0.0 {
            ((v - lo) / width).floor() as isize
        } else {
            0
        };
        bin = bin.clamp(0, bins as isize - 1);
        counts[bin as usize] += 1;
    }
    Histogram {
        edges: edges.to_vec(),
        counts,
    }
}

/// Edges spanning the full value range, split into `bins` equal-width bins.
/// `None` when there are no values.
pub fn histogram_edges(values: &[f64], bins: usize) -> Option<Vec<f64>> {
    if values.is_empty() || bins == 0 {
        return None;
    }
    let lo = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let hi = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    // Degenerate range: pad so every value lands in a real bin.
    let (lo, hi) = if hi > lo { (lo, hi) } else { (lo - 0.5, lo + 0.5) };
    let width = (hi - lo) / bins as f64;
    Some((0..=bins).map(|i| lo + i as f64 * width).collect())
}

/// Histograms of `value_column` per value of `group_column`, over shared bin
/// edges so the groups overlay cleanly. Empty when either column is absent
/// or no numeric values exist.
pub fn grouped_histograms(
    table: &EmployeeTable,
    rows: &[usize],
    group_column: &str,
    value_column: &str,
    bins: usize,
) -> Vec<(CellValue, Histogram)> {
    let all_values = table.numeric_values(value_column, rows);
    let Some(edges) = histogram_edges(&all_values, bins) else {
        return Vec::new();
    };
    group_numeric(table, rows, group_column, value_column)
        .into_iter()
        .map(|(group, values)| (group, histogram_with_edges(&values, &edges)))
        .collect()
}

// ---------------------------------------------------------------------------
// Kernel density estimate (violin plots)
// ---------------------------------------------------------------------------

/// Gaussian KDE silhouette of a sample, evaluated at `points` positions over
/// the padded data range. Bandwidth is Silverman's rule of thumb with a
/// floor for degenerate (constant) samples. `None` on an empty sample.
pub fn kde_curve(values: &[f64], points: usize) -> Option<Vec<(f64, f64)>> {
    if values.is_empty() || points < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let std = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let iqr = quantile(&sorted, 0.75) - quantile(&sorted, 0.25);

    let spread = if iqr > 0.0 {
        std.min(iqr / 1.34)
    } else {
        std
    };
    let bandwidth = (0.9 * spread * n.powf(-0.2)).max(1e-3);

    let lo = sorted[0] - 3.0 * bandwidth;
    let hi = sorted[sorted.len() - 1] + 3.0 * bandwidth;
    let step = (hi - lo) / (points - 1) as f64;

    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let curve = (0..points)
        .map(|i| {
            let x = lo + i as f64 * step;
            let density: f64 = values
                .iter()
                .map(|&v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum::<f64>()
                * norm;
            (x, density)
        })
        .collect();
    Some(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::read_csv;

    fn scenario_table() -> EmployeeTable {
        // 3 rows: (A,Yes), (A,No), (B,No)
        read_csv(
            "Department,Attrition\nA,Yes\nA,No\nB,No\n".as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn attrition_rate_for_department_a() {
        let t = scenario_table();
        let rate = attrition_rate(&t, &[0, 1]).unwrap();
        assert!((rate - 50.0).abs() < 1e-9);
    }

    #[test]
    fn attrition_rate_is_total_on_constant_column() {
        let t = read_csv("Attrition\nYES\nyes\n".as_bytes()).unwrap();
        assert_eq!(attrition_rate(&t, &[0, 1]), Some(100.0));
        let t = read_csv("Attrition\nNo\nNo\n".as_bytes()).unwrap();
        assert_eq!(attrition_rate(&t, &[0, 1]), Some(0.0));
    }

    #[test]
    fn attrition_rate_unavailable_without_column_or_rows() {
        let t = read_csv("Department\nA\n".as_bytes()).unwrap();
        assert_eq!(attrition_rate(&t, &[0]), None);
        let t = scenario_table();
        assert_eq!(attrition_rate(&t, &[]), None);
    }

    #[test]
    fn value_counts_in_sorted_order() {
        let t = scenario_table();
        let counts = value_counts(&t, &[0, 1, 2], "Department");
        assert_eq!(counts.len(), 2);
        assert_eq!(counts[0].1, 2); // A
        assert_eq!(counts[1].1, 1); // B
    }

    #[test]
    fn quantiles_interpolate_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!((quantile(&sorted, 0.5) - 2.5).abs() < 1e-12);
        assert!((quantile(&sorted, 0.25) - 1.75).abs() < 1e-12);
        assert!((quantile(&sorted, 1.0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn numeric_summary_matches_describe() {
        let s = numeric_summary(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(s.count, 4);
        assert!((s.mean - 2.5).abs() < 1e-12);
        let std = s.std.unwrap();
        assert!((std - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
    }

    #[test]
    fn histogram_counts_every_value_once() {
        let values = [1.0, 1.5, 2.0, 9.9, 10.0];
        let edges = histogram_edges(&values, 3).unwrap();
        let hist = histogram_with_edges(&values, &edges);
        assert_eq!(hist.counts.iter().sum::<usize>(), values.len());
        // Max value lands in the last (double-closed) bin.
        assert!(hist.counts[2] >= 2);
    }

    #[test]
    fn histogram_of_constant_sample_uses_padded_range() {
        let values = [5.0, 5.0, 5.0];
        let edges = histogram_edges(&values, 4).unwrap();
        let hist = histogram_with_edges(&values, &edges);
        assert_eq!(hist.counts.iter().sum::<usize>(), 3);
    }

    #[test]
    fn kde_is_positive_and_centered() {
        let curve = kde_curve(&[1.0, 2.0, 3.0], 50).unwrap();
        assert_eq!(curve.len(), 50);
        assert!(curve.iter().all(|&(_, d)| d >= 0.0));
        let peak = curve
            .iter()
            .cloned()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert!(peak.0 > 0.5 && peak.0 < 3.5);
    }

    #[test]
    fn box_stats_five_numbers() {
        let b = box_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(b.min, 1.0);
        assert_eq!(b.max, 4.0);
        assert!((b.median - 2.5).abs() < 1e-12);
        assert_eq!(box_stats(&[]), None);
    }
}
