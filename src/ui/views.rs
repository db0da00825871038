use std::collections::BTreeMap;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::analysis::corr::correlation_matrix;
use crate::analysis::crosstab::{CrossTab, crosstab};
use crate::analysis::pivot::Aggregation;
use crate::analysis::stats::{
    ColumnSummary, attrition_rate, box_stats, group_numeric, grouped_histograms, kde_curve,
    summarize, value_counts,
};
use crate::color::ColorMap;
use crate::data::export::{EXPORT_FILE_NAME, export_filtered_csv};
use crate::data::model::{ATTRITION, CellValue, EmployeeTable};
use crate::state::AppState;
use crate::ui::charts;

/// Bin count used by every numeric histogram.
const HIST_BINS: usize = 20;
const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Overview tab
// ---------------------------------------------------------------------------

pub fn overview(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        return;
    };
    let rows = &state.visible_indices;

    ui.heading("Attrition Rate Overview");
    ui.label("Percentage of employees who have left the organization.");
    let rate_text = match attrition_rate(table, rows) {
        Some(rate) => format!("{rate:.2}"),
        None => "N/A".to_string(),
    };
    ui.label(
        RichText::new(format!("Overall Attrition Rate (%): {rate_text}"))
            .size(24.0)
            .strong(),
    );
    ui.separator();

    if table.has_column(ATTRITION) {
        ui.strong("Attrition Distribution");
        let cm = state.color_map_for(ATTRITION);
        let slices: Vec<(String, usize, Color32)> = value_counts(table, rows, ATTRITION)
            .into_iter()
            .map(|(v, n)| {
                let color = cm
                    .as_ref()
                    .map(|cm| cm.color_for(&v))
                    .unwrap_or(Color32::LIGHT_BLUE);
                (v.to_string(), n, color)
            })
            .collect();
        charts::pie_chart(ui, &slices);
        ui.separator();
    }

    attrition_rate_bars(ui, state, table, "Department", "Attrition Rate by Department");
    attrition_count_bars(ui, state, table, "Gender", "Attrition by Gender");
}

// ---------------------------------------------------------------------------
// Attrition Breakdown tab
// ---------------------------------------------------------------------------

pub fn breakdown(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        return;
    };
    let rows = &state.visible_indices;

    ui.heading("Attrition Breakdown by Role, Age, Tenure");

    attrition_count_bars(ui, state, table, "JobRole", "Attrition by Job Role");

    if table.has_column("Age") && table.has_column(ATTRITION) {
        ui.strong("Age Distribution by Attrition");
        let groups = histogram_groups_by_attrition(state, table, rows, "Age");
        charts::histogram_chart(ui, "age_hist", CHART_HEIGHT, &groups, "Age", true);
        ui.separator();
    }

    attrition_box(ui, state, table, "MonthlyIncome", "Monthly Income by Attrition");
    attrition_violin(ui, state, table, "YearsAtCompany", "Years at Company vs Attrition");
    attrition_rate_bars(ui, state, table, "MaritalStatus", "Attrition by Marital Status");
}

// ---------------------------------------------------------------------------
// Drivers & KPIs tab
// ---------------------------------------------------------------------------

pub fn drivers(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        return;
    };
    let rows = &state.visible_indices;

    ui.heading("Drivers and Predictors of Attrition");

    attrition_rate_bars(ui, state, table, "OverTime", "Attrition by Overtime");
    attrition_box(ui, state, table, "JobSatisfaction", "Job Satisfaction by Attrition");
    attrition_box(ui, state, table, "WorkLifeBalance", "Work-Life Balance by Attrition");
    attrition_box(
        ui,
        state,
        table,
        "YearsSinceLastPromotion",
        "Years Since Last Promotion by Attrition",
    );

    if let Some(matrix) = correlation_matrix(table, rows) {
        ui.strong("Correlation Between Numeric Features");
        charts::correlation_heatmap(ui, "corr_heatmap", 320.0, &matrix);
    }
}

// ---------------------------------------------------------------------------
// Demographics tab
// ---------------------------------------------------------------------------

pub fn demographics(ui: &mut Ui, state: &AppState) {
    let Some(table) = &state.table else {
        return;
    };
    let rows = &state.visible_indices;

    ui.heading("Demographic Insights");

    if table.has_column("Education") {
        if table.has_column(ATTRITION) {
            attrition_count_bars(ui, state, table, "Education", "Education Levels");
        } else {
            ui.strong("Education Levels");
            let counts = value_counts(table, rows, "Education");
            let categories: Vec<String> = counts.iter().map(|(v, _)| v.to_string()).collect();
            let values: Vec<f64> = counts.iter().map(|(_, n)| *n as f64).collect();
            let series = vec![("Employees".to_string(), Color32::LIGHT_BLUE, values)];
            charts::grouped_bars(ui, "education_counts", CHART_HEIGHT, &categories, &series, "count");
            ui.separator();
        }
    }

    if table.has_column("Age") && table.has_column("Gender") {
        ui.strong("Age Distribution by Gender");
        let cm = state.color_map_for("Gender");
        let groups: Vec<(String, Color32, _)> =
            grouped_histograms(table, rows, "Gender", "Age", HIST_BINS)
                .into_iter()
                .map(|(g, hist)| {
                    let color = cm
                        .as_ref()
                        .map(|cm| cm.color_for(&g))
                        .unwrap_or(Color32::LIGHT_BLUE);
                    (g.to_string(), color, hist)
                })
                .collect();
        charts::histogram_chart(ui, "age_gender_hist", CHART_HEIGHT, &groups, "Age", true);
        ui.separator();
    }

    if ["Department", "JobRole", ATTRITION]
        .iter()
        .all(|c| table.has_column(c))
    {
        ui.strong("Organization Hierarchy Sunburst (Department → Job Role → Attrition)");
        let roots = sunburst_tree(state, table, rows);
        charts::sunburst(ui, &roots);
        ui.separator();
    }

    ui.strong("Sample of the Filtered Data (first 10 rows)");
    data_table(ui, table, &rows[..rows.len().min(10)], "sample_table");
}

// ---------------------------------------------------------------------------
// Data & Downloads tab
// ---------------------------------------------------------------------------

pub fn data_downloads(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = &state.table else {
        return;
    };
    let table = table.clone();
    let rows = state.visible_indices.clone();

    ui.heading("Data and Downloads");

    if ui.button("Download Filtered Data").clicked() {
        export_dialog(state, &table, &rows);
    }
    ui.separator();

    ui.strong("Summary Statistics");
    summary_table(ui, &table, &rows);
    ui.separator();

    ui.strong("Pivot Table Builder");
    pivot_builder(ui, state, &table);
}

fn export_dialog(state: &mut AppState, table: &EmployeeTable, rows: &[usize]) {
    let file = rfd::FileDialog::new()
        .set_title("Save filtered data")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        match export_filtered_csv(table, rows, &path) {
            Ok(()) => {
                log::info!("Exported {} rows to {}", rows.len(), path.display());
                state.status_message =
                    Some(format!("Saved {} rows to {}", rows.len(), path.display()));
            }
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Pivot builder
// ---------------------------------------------------------------------------

fn pivot_builder(ui: &mut Ui, state: &mut AppState, table: &EmployeeTable) {
    let columns = table.column_names.clone();
    let mut changed = false;

    ui.horizontal(|ui: &mut Ui| {
        egui::ComboBox::from_label("Row")
            .selected_text(state.pivot_row.clone().unwrap_or_default())
            .show_ui(ui, |ui: &mut Ui| {
                for col in &columns {
                    if ui
                        .selectable_label(state.pivot_row.as_deref() == Some(col), col)
                        .clicked()
                    {
                        state.pivot_row = Some(col.clone());
                        changed = true;
                    }
                }
            });

        egui::ComboBox::from_label("Column")
            .selected_text(state.pivot_col.clone().unwrap_or_default())
            .show_ui(ui, |ui: &mut Ui| {
                for col in &columns {
                    if ui
                        .selectable_label(state.pivot_col.as_deref() == Some(col), col)
                        .clicked()
                    {
                        state.pivot_col = Some(col.clone());
                        changed = true;
                    }
                }
            });

        egui::ComboBox::from_label("Aggregation")
            .selected_text(
                state
                    .pivot_agg
                    .map(|a| a.label().to_string())
                    .unwrap_or_default(),
            )
            .show_ui(ui, |ui: &mut Ui| {
                for agg in Aggregation::ALL {
                    if ui
                        .selectable_label(state.pivot_agg == Some(agg), agg.label())
                        .clicked()
                    {
                        state.pivot_agg = Some(agg);
                        changed = true;
                    }
                }
            });
    });

    if changed {
        state.recompute_pivot();
    }

    if let Some(warning) = &state.pivot_warning {
        ui.label(RichText::new(format!("Pivot error: {warning}")).color(Color32::YELLOW));
    }

    let Some(pivot) = state.pivot.clone() else {
        ui.label("Choose a row column, a column column, and an aggregation.");
        return;
    };

    let multi_value = pivot.value_columns.len() > 1;
    let n_cols = 1 + pivot.col_values.len() * pivot.value_columns.len();

    ui.push_id("pivot_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .columns(Column::auto().at_least(70.0), n_cols)
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong(format!("{} \\ {}", pivot.row_column, pivot.col_column));
                });
                for cv in &pivot.col_values {
                    for vc in &pivot.value_columns {
                        header.col(|ui| {
                            if multi_value {
                                ui.strong(format!("{cv} ({vc})"));
                            } else {
                                ui.strong(cv.to_string());
                            }
                        });
                    }
                }
            })
            .body(|mut body| {
                body.rows(18.0, pivot.row_values.len(), |mut row| {
                    let r = row.index();
                    row.col(|ui| {
                        ui.label(pivot.row_values[r].to_string());
                    });
                    for c in 0..pivot.col_values.len() {
                        for v in 0..pivot.value_columns.len() {
                            row.col(|ui| {
                                let text = match pivot.cells[r][c][v] {
                                    Some(x) if pivot.aggregation == Aggregation::Count => {
                                        format!("{}", x as i64)
                                    }
                                    Some(x) => format!("{x:.2}"),
                                    None => "–".to_string(),
                                };
                                ui.label(text);
                            });
                        }
                    }
                });
            });
    });
}

// ---------------------------------------------------------------------------
// Shared chart builders
// ---------------------------------------------------------------------------

/// Row-normalized crosstab of `group_col` × Attrition as grouped bars
/// (conditional attrition rates). Omitted when either column is absent.
fn attrition_rate_bars(
    ui: &mut Ui,
    state: &AppState,
    table: &EmployeeTable,
    group_col: &str,
    title: &str,
) {
    let Some(ct) = crosstab(table, &state.visible_indices, group_col, ATTRITION) else {
        return;
    };
    ui.strong(title);
    let cm = state.color_map_for(ATTRITION);
    let (categories, series) = crosstab_series(&ct, cm.as_ref(), true);
    charts::grouped_bars(
        ui,
        &format!("rate_{group_col}"),
        CHART_HEIGHT,
        &categories,
        &series,
        "share",
    );
    ui.separator();
}

/// Raw crosstab counts of `group_col` × Attrition as grouped bars.
fn attrition_count_bars(
    ui: &mut Ui,
    state: &AppState,
    table: &EmployeeTable,
    group_col: &str,
    title: &str,
) {
    let Some(ct) = crosstab(table, &state.visible_indices, group_col, ATTRITION) else {
        return;
    };
    ui.strong(title);
    let cm = state.color_map_for(ATTRITION);
    let (categories, series) = crosstab_series(&ct, cm.as_ref(), false);
    charts::grouped_bars(
        ui,
        &format!("count_{group_col}"),
        CHART_HEIGHT,
        &categories,
        &series,
        "count",
    );
    ui.separator();
}

/// Turn a crosstab into (category labels, one bar series per column value).
fn crosstab_series(
    ct: &CrossTab,
    cm: Option<&ColorMap>,
    normalized: bool,
) -> (Vec<String>, Vec<(String, Color32, Vec<f64>)>) {
    let categories: Vec<String> = ct.row_values.iter().map(|v| v.to_string()).collect();
    let data: Vec<Vec<f64>> = if normalized {
        ct.normalized_rows()
    } else {
        ct.counts
            .iter()
            .map(|row| row.iter().map(|&n| n as f64).collect())
            .collect()
    };

    let series = ct
        .col_values
        .iter()
        .enumerate()
        .map(|(j, cv)| {
            let color = cm
                .map(|cm| cm.color_for(cv))
                .unwrap_or(Color32::LIGHT_BLUE);
            let values = data.iter().map(|row| row[j]).collect();
            (cv.to_string(), color, values)
        })
        .collect();

    (categories, series)
}

fn attrition_box(ui: &mut Ui, state: &AppState, table: &EmployeeTable, value_col: &str, title: &str) {
    if !table.has_column(value_col) || !table.has_column(ATTRITION) {
        return;
    }
    ui.strong(title);
    let cm = state.color_map_for(ATTRITION);
    let groups: Vec<(String, Color32, _)> =
        group_numeric(table, &state.visible_indices, ATTRITION, value_col)
            .into_iter()
            .filter_map(|(g, values)| {
                let stats = box_stats(&values)?;
                let color = cm
                    .as_ref()
                    .map(|cm| cm.color_for(&g))
                    .unwrap_or(Color32::LIGHT_BLUE);
                Some((g.to_string(), color, stats))
            })
            .collect();
    charts::box_chart(ui, &format!("box_{value_col}"), CHART_HEIGHT, &groups, value_col);
    ui.separator();
}

fn attrition_violin(
    ui: &mut Ui,
    state: &AppState,
    table: &EmployeeTable,
    value_col: &str,
    title: &str,
) {
    if !table.has_column(value_col) || !table.has_column(ATTRITION) {
        return;
    }
    ui.strong(title);
    let cm = state.color_map_for(ATTRITION);
    let groups: Vec<(String, Color32, Vec<(f64, f64)>)> =
        group_numeric(table, &state.visible_indices, ATTRITION, value_col)
            .into_iter()
            .filter_map(|(g, values)| {
                let curve = kde_curve(&values, 80)?;
                let color = cm
                    .as_ref()
                    .map(|cm| cm.color_for(&g))
                    .unwrap_or(Color32::LIGHT_BLUE);
                Some((g.to_string(), color, curve))
            })
            .collect();
    charts::violin_chart(ui, &format!("violin_{value_col}"), CHART_HEIGHT, &groups, value_col);
    ui.separator();
}

fn histogram_groups_by_attrition(
    state: &AppState,
    table: &EmployeeTable,
    rows: &[usize],
    value_col: &str,
) -> Vec<(String, Color32, crate::analysis::stats::Histogram)> {
    let cm = state.color_map_for(ATTRITION);
    grouped_histograms(table, rows, ATTRITION, value_col, HIST_BINS)
        .into_iter()
        .map(|(g, hist)| {
            let color = cm
                .as_ref()
                .map(|cm| cm.color_for(&g))
                .unwrap_or(Color32::LIGHT_BLUE);
            (g.to_string(), color, hist)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Sunburst tree: Department → JobRole → Attrition
// ---------------------------------------------------------------------------

fn sunburst_tree(
    state: &AppState,
    table: &EmployeeTable,
    rows: &[usize],
) -> Vec<charts::SunburstNode> {
    // Nested counts keyed by (Department, JobRole, Attrition).
    let mut tree: BTreeMap<CellValue, BTreeMap<CellValue, BTreeMap<CellValue, usize>>> =
        BTreeMap::new();
    for &i in rows {
        let dept = table.value(i, "Department");
        let role = table.value(i, "JobRole");
        let attr = table.value(i, ATTRITION);
        if dept.is_null() || role.is_null() || attr.is_null() {
            continue;
        }
        *tree
            .entry(dept.clone())
            .or_default()
            .entry(role.clone())
            .or_default()
            .entry(attr.clone())
            .or_default() += 1;
    }

    let dept_cm = state.color_map_for("Department");
    let attr_cm = state.color_map_for(ATTRITION);

    tree.into_iter()
        .map(|(dept, roles)| {
            let dept_color = dept_cm
                .as_ref()
                .map(|cm| cm.color_for(&dept))
                .unwrap_or(Color32::LIGHT_BLUE);
            let children: Vec<charts::SunburstNode> = roles
                .into_iter()
                .map(|(role, attrs)| {
                    let leaves: Vec<charts::SunburstNode> = attrs
                        .into_iter()
                        .map(|(attr, count)| charts::SunburstNode {
                            label: attr.to_string(),
                            count,
                            color: attr_cm
                                .as_ref()
                                .map(|cm| cm.color_for(&attr))
                                .unwrap_or(Color32::GRAY),
                            children: Vec::new(),
                        })
                        .collect();
                    charts::SunburstNode {
                        label: role.to_string(),
                        count: leaves.iter().map(|l| l.count).sum(),
                        color: dept_color.gamma_multiply(0.7),
                        children: leaves,
                    }
                })
                .collect();
            charts::SunburstNode {
                label: dept.to_string(),
                count: children.iter().map(|c| c.count).sum(),
                color: dept_color,
                children,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

/// Plain grid of the given rows in header order.
fn data_table(ui: &mut Ui, table: &EmployeeTable, rows: &[usize], id: &str) {
    let columns = table.column_names.clone();
    ui.push_id(id, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .columns(Column::auto().at_least(60.0), columns.len())
                .header(20.0, |mut header| {
                    for col in &columns {
                        header.col(|ui| {
                            ui.strong(col);
                        });
                    }
                })
                .body(|mut body| {
                    body.rows(16.0, rows.len(), |mut row| {
                        let i = rows[row.index()];
                        for col in &columns {
                            row.col(|ui| {
                                ui.label(table.value(i, col).to_string());
                            });
                        }
                    });
                });
        });
    });
}

/// Describe-style summary of every column over the filtered rows.
fn summary_table(ui: &mut Ui, table: &EmployeeTable, rows: &[usize]) {
    let summaries = summarize(table, rows);
    let headers = [
        "Column", "count", "mean", "std", "min", "25%", "50%", "75%", "max", "unique", "top",
        "freq",
    ];

    fn num(v: f64) -> String {
        if v.is_nan() {
            "–".to_string()
        } else {
            format!("{v:.2}")
        }
    }

    ui.push_id("summary_table", |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .columns(Column::auto().at_least(55.0), headers.len())
                .header(20.0, |mut header| {
                    for h in headers {
                        header.col(|ui| {
                            ui.strong(h);
                        });
                    }
                })
                .body(|mut body| {
                    body.rows(16.0, summaries.len(), |mut row| {
                        let (name, summary) = &summaries[row.index()];
                        let cells: Vec<String> = match summary {
                            ColumnSummary::Numeric(s) => vec![
                                name.clone(),
                                s.count.to_string(),
                                num(s.mean),
                                s.std.map(num).unwrap_or_else(|| "–".to_string()),
                                num(s.min),
                                num(s.q1),
                                num(s.median),
                                num(s.q3),
                                num(s.max),
                                "–".to_string(),
                                "–".to_string(),
                                "–".to_string(),
                            ],
                            ColumnSummary::Categorical(s) => {
                                let (top, freq) = s
                                    .top
                                    .as_ref()
                                    .map(|(v, n)| (v.to_string(), n.to_string()))
                                    .unwrap_or(("–".to_string(), "–".to_string()));
                                vec![
                                    name.clone(),
                                    s.count.to_string(),
                                    "–".to_string(),
                                    "–".to_string(),
                                    "–".to_string(),
                                    "–".to_string(),
                                    "–".to_string(),
                                    "–".to_string(),
                                    "–".to_string(),
                                    s.unique.to_string(),
                                    top,
                                    freq,
                                ]
                            }
                        };
                        for cell in cells {
                            row.col(|ui| {
                                ui.label(cell);
                            });
                        }
                    });
                });
        });
    });
}
