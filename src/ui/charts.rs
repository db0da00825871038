use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Sense, Stroke, Ui, Vec2};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, Legend, Plot, PlotPoints, Polygon,
};

use crate::analysis::corr::CorrelationMatrix;
use crate::analysis::stats::{BoxStats, Histogram};
use crate::color::diverging_color;

// ---------------------------------------------------------------------------
// Pie / donut chart (painter-drawn; egui_plot has no pie primitive)
// ---------------------------------------------------------------------------

/// Donut chart of category counts with a legend on the right.
pub fn pie_chart(ui: &mut Ui, slices: &[(String, usize, Color32)]) {
    let total: usize = slices.iter().map(|(_, n, _)| n).sum();
    if total == 0 {
        ui.label("No data for the current filters.");
        return;
    }

    ui.horizontal(|ui: &mut Ui| {
        let size = 220.0_f32.min(ui.available_width() * 0.6);
        let (response, painter) = ui.allocate_painter(Vec2::splat(size), Sense::hover());
        let center = response.rect.center();
        let r_out = size * 0.48;
        let r_in = r_out * 0.4;

        let mut angle = -std::f32::consts::FRAC_PI_2;
        for (_, count, color) in slices {
            let span = (*count as f32 / total as f32) * std::f32::consts::TAU;
            annulus_segment(&painter, center, r_in, r_out, angle, angle + span, *color);
            angle += span;
        }

        ui.vertical(|ui: &mut Ui| {
            for (label, count, color) in slices {
                let pct = 100.0 * *count as f64 / total as f64;
                ui.label(
                    RichText::new(format!("■ {label}  {count} ({pct:.1}%)")).color(*color),
                );
            }
        });
    });
}

/// Fill an annular segment between `a0` and `a1` (radians) as a fan of small
/// convex quads.
fn annulus_segment(
    painter: &egui::Painter,
    center: Pos2,
    r_in: f32,
    r_out: f32,
    a0: f32,
    a1: f32,
    color: Color32,
) {
    const STEP: f32 = 0.05;
    let steps = (((a1 - a0) / STEP).ceil() as usize).max(1);
    let delta = (a1 - a0) / steps as f32;

    let point = |r: f32, a: f32| center + Vec2::new(a.cos(), a.sin()) * r;
    for i in 0..steps {
        let b0 = a0 + i as f32 * delta;
        let b1 = b0 + delta;
        let quad = vec![
            point(r_in, b0),
            point(r_out, b0),
            point(r_out, b1),
            point(r_in, b1),
        ];
        painter.add(egui::Shape::convex_polygon(quad, color, Stroke::NONE));
    }
}

// ---------------------------------------------------------------------------
// Grouped bar chart over a category axis
// ---------------------------------------------------------------------------

/// Bars for each (series, category) pair, grouped side by side per category.
/// Feeds both crosstab views (rates) and categorical count views.
pub fn grouped_bars(
    ui: &mut Ui,
    id: &str,
    height: f32,
    categories: &[String],
    series: &[(String, Color32, Vec<f64>)],
    y_label: &str,
) {
    if categories.is_empty() || series.is_empty() {
        ui.label("No data for the current filters.");
        return;
    }

    let n_series = series.len();
    let width = 0.8 / n_series as f64;
    let labels = categories.to_vec();

    Plot::new(id)
        .legend(Legend::default())
        .height(height)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round() as i64;
            if i >= 0 && (mark.value - i as f64).abs() < 1e-6 {
                labels.get(i as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (s_idx, (name, color, values)) in series.iter().enumerate() {
                let offset = (s_idx as f64 - (n_series as f64 - 1.0) / 2.0) * width;
                let bars: Vec<Bar> = values
                    .iter()
                    .enumerate()
                    .map(|(c_idx, &v)| Bar::new(c_idx as f64 + offset, v).width(width * 0.95))
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).color(*color).name(name));
            }
        });
}

// ---------------------------------------------------------------------------
// Histogram of a numeric column, one series per group
// ---------------------------------------------------------------------------

/// Histogram bars over shared bin edges. `overlay` draws translucent bars on
/// top of each other; otherwise groups are placed side by side within a bin.
pub fn histogram_chart(
    ui: &mut Ui,
    id: &str,
    height: f32,
    groups: &[(String, Color32, Histogram)],
    x_label: &str,
    overlay: bool,
) {
    if groups.is_empty() {
        ui.label("No data for the current filters.");
        return;
    }

    let n_groups = groups.len();
    Plot::new(id)
        .legend(Legend::default())
        .height(height)
        .x_axis_label(x_label)
        .y_axis_label("count")
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (g_idx, (name, color, hist)) in groups.iter().enumerate() {
                let bin_width = hist.bin_width();
                let (bar_width, offset) = if overlay {
                    (bin_width, 0.0)
                } else {
                    let w = bin_width / n_groups as f64;
                    (w, (g_idx as f64 - (n_groups as f64 - 1.0) / 2.0) * w)
                };
                let color = if overlay {
                    color.gamma_multiply(0.6)
                } else {
                    *color
                };
                let bars: Vec<Bar> = hist
                    .counts
                    .iter()
                    .enumerate()
                    .filter(|(_, &n)| n > 0)
                    .map(|(bin, &n)| {
                        Bar::new(hist.bin_center(bin) + offset, n as f64).width(bar_width * 0.95)
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).color(color).name(name));
            }
        });
}

// ---------------------------------------------------------------------------
// Box plot per group
// ---------------------------------------------------------------------------

pub fn box_chart(
    ui: &mut Ui,
    id: &str,
    height: f32,
    groups: &[(String, Color32, BoxStats)],
    y_label: &str,
) {
    if groups.is_empty() {
        ui.label("No data for the current filters.");
        return;
    }

    let labels: Vec<String> = groups.iter().map(|(l, _, _)| l.clone()).collect();
    Plot::new(id)
        .legend(Legend::default())
        .height(height)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round() as i64;
            if i >= 0 && (mark.value - i as f64).abs() < 1e-6 {
                labels.get(i as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (g_idx, (name, color, stats)) in groups.iter().enumerate() {
                let elem = BoxElem::new(
                    g_idx as f64,
                    BoxSpread::new(stats.min, stats.q1, stats.median, stats.q3, stats.max),
                )
                .box_width(0.5)
                .fill(color.gamma_multiply(0.5))
                .stroke(Stroke::new(1.5, *color));
                plot_ui.box_plot(BoxPlot::new(vec![elem]).name(name));
            }
        });
}

// ---------------------------------------------------------------------------
// Violin plot per group (mirrored KDE silhouettes)
// ---------------------------------------------------------------------------

/// Each group's KDE curve is scaled to a maximum half-width of 0.4 and
/// mirrored around its category position.
pub fn violin_chart(
    ui: &mut Ui,
    id: &str,
    height: f32,
    groups: &[(String, Color32, Vec<(f64, f64)>)],
    y_label: &str,
) {
    if groups.is_empty() {
        ui.label("No data for the current filters.");
        return;
    }

    let labels: Vec<String> = groups.iter().map(|(l, _, _)| l.clone()).collect();
    Plot::new(id)
        .legend(Legend::default())
        .height(height)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round() as i64;
            if i >= 0 && (mark.value - i as f64).abs() < 1e-6 {
                labels.get(i as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (g_idx, (name, color, curve)) in groups.iter().enumerate() {
                let max_density = curve.iter().map(|&(_, d)| d).fold(0.0, f64::max);
                if max_density <= 0.0 {
                    continue;
                }
                let scale = 0.4 / max_density;
                let x0 = g_idx as f64;

                let mut points: Vec<[f64; 2]> = curve
                    .iter()
                    .map(|&(v, d)| [x0 + d * scale, v])
                    .collect();
                points.extend(curve.iter().rev().map(|&(v, d)| [x0 - d * scale, v]));

                let polygon = Polygon::new(PlotPoints::from(points))
                    .fill_color(color.gamma_multiply(0.4))
                    .stroke(Stroke::new(1.0, *color))
                    .name(name);
                plot_ui.polygon(polygon);
            }
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

/// One colored square per column pair, blue (-1) → white (0) → red (+1).
pub fn correlation_heatmap(ui: &mut Ui, id: &str, height: f32, matrix: &CorrelationMatrix) {
    let n = matrix.columns.len();
    let x_labels = matrix.columns.clone();
    let y_labels = matrix.columns.clone();

    Plot::new(id)
        .height(height)
        .x_axis_formatter(move |mark, _range| {
            let i = mark.value.round() as i64;
            if i >= 0 && (mark.value - i as f64).abs() < 1e-6 {
                x_labels.get(i as usize).cloned().unwrap_or_default()
            } else {
                String::new()
            }
        })
        .y_axis_formatter(move |mark, _range| {
            let i = mark.value.round() as i64;
            if i >= 0 && (mark.value - i as f64).abs() < 1e-6 {
                // Row 0 is drawn at the top.
                let i = i as usize;
                if i < y_labels.len() {
                    y_labels[y_labels.len() - 1 - i].clone()
                } else {
                    String::new()
                }
            } else {
                String::new()
            }
        })
        .show_grid(false)
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for i in 0..n {
                for j in 0..n {
                    let r = matrix.values[i][j];
                    let y = (n - 1 - i) as f64;
                    let x = j as f64;
                    let square = vec![
                        [x - 0.5, y - 0.5],
                        [x + 0.5, y - 0.5],
                        [x + 0.5, y + 0.5],
                        [x - 0.5, y + 0.5],
                    ];
                    plot_ui.polygon(
                        Polygon::new(PlotPoints::from(square))
                            .fill_color(diverging_color(r))
                            .stroke(Stroke::new(0.5, Color32::from_gray(60))),
                    );
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Sunburst (painter-drawn concentric rings)
// ---------------------------------------------------------------------------

/// One node of the sunburst hierarchy; angular span is proportional to
/// `count` within the parent's span.
pub struct SunburstNode {
    pub label: String,
    pub count: usize,
    pub color: Color32,
    pub children: Vec<SunburstNode>,
}

/// Hierarchical ring chart (e.g. Department → JobRole → Attrition).
pub fn sunburst(ui: &mut Ui, roots: &[SunburstNode]) {
    let total: usize = roots.iter().map(|n| n.count).sum();
    if total == 0 {
        ui.label("No data for the current filters.");
        return;
    }

    let depth = max_depth(roots);
    let size = 320.0_f32.min(ui.available_width());
    let (response, painter) = ui.allocate_painter(Vec2::splat(size), Sense::hover());
    let center = response.rect.center();
    let band = size * 0.48 / (depth as f32 + 0.5);

    draw_ring(
        &painter,
        center,
        band,
        0,
        roots,
        total,
        -std::f32::consts::FRAC_PI_2,
        std::f32::consts::TAU,
    );
}

fn max_depth(nodes: &[SunburstNode]) -> usize {
    nodes
        .iter()
        .map(|n| 1 + max_depth(&n.children))
        .max()
        .unwrap_or(0)
}

#[allow(clippy::too_many_arguments)]
fn draw_ring(
    painter: &egui::Painter,
    center: Pos2,
    band: f32,
    depth: usize,
    nodes: &[SunburstNode],
    parent_total: usize,
    start: f32,
    span: f32,
) {
    let r_in = band * (depth as f32 + 0.5);
    let r_out = r_in + band;

    let mut angle = start;
    for node in nodes {
        if node.count == 0 {
            continue;
        }
        let node_span = span * node.count as f32 / parent_total as f32;
        annulus_segment(painter, center, r_in, r_out, angle, angle + node_span, node.color);

        // Label segments wide enough to hold text.
        if node_span > 0.35 {
            let mid = angle + node_span / 2.0;
            let r_mid = (r_in + r_out) / 2.0;
            let pos = center + Vec2::new(mid.cos(), mid.sin()) * r_mid;
            painter.text(
                pos,
                Align2::CENTER_CENTER,
                &node.label,
                FontId::proportional(10.0),
                Color32::WHITE,
            );
        }

        if !node.children.is_empty() {
            draw_ring(
                painter,
                center,
                band,
                depth + 1,
                &node.children,
                node.count,
                angle,
                node_span,
            );
        }
        angle += node_span;
    }
}
