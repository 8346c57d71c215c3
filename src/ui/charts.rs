use std::collections::{BTreeMap, BTreeSet};
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{
    self, Align2, Color32, CornerRadius, FontId, RichText, Sense, Stroke, Ui, Vec2,
};
use egui_plot::{
    Bar, BarChart, BoxElem, BoxPlot, BoxSpread, GridMark, Legend, Line, LineStyle, MarkerShape,
    Plot, Points,
};

use crate::color::CategoryColors;
use crate::data::aggregate::{DashboardAggregates, IncomeComposition, KpiSummary};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Dashboard (central panel)
// ---------------------------------------------------------------------------

/// Render the KPI tiles and the eight charts.
pub fn dashboard(ui: &mut Ui, state: &AppState) {
    let Some(aggregates) = &state.aggregates else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a sales file to explore it  (File → Open…)");
        });
        return;
    };

    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            kpi_row(ui, aggregates.kpis.as_ref());
            ui.separator();

            ui.columns(2, |cols| {
                chart_section(&mut cols[0], "Revenue over time", |ui| {
                    revenue_over_time(ui, aggregates);
                });
                chart_section(&mut cols[1], "Revenue by product line", |ui| {
                    revenue_by_product_line(ui, state, aggregates);
                });
            });
            ui.columns(2, |cols| {
                chart_section(&mut cols[0], "Rating distribution", |ui| {
                    rating_distribution(ui, aggregates);
                });
                chart_section(&mut cols[1], "Spending by customer type", |ui| {
                    spending_by_customer_type(ui, state, aggregates);
                });
            });
            ui.columns(2, |cols| {
                chart_section(&mut cols[0], "Payment methods", |ui| {
                    payment_methods(ui, state, aggregates);
                });
                chart_section(&mut cols[1], "Gross income composition", |ui| {
                    income_composition(ui, state, aggregates);
                });
            });
            chart_section(ui, "Cost vs. gross income", |ui| {
                cogs_income(ui, state, aggregates);
            });
            chart_section(ui, "Correlation between numeric columns", |ui| {
                correlation_heatmap(ui, aggregates);
            });
        });
}

fn chart_section(ui: &mut Ui, title: &str, add_contents: impl FnOnce(&mut Ui)) {
    ui.add_space(6.0);
    ui.strong(title);
    add_contents(ui);
}

/// The explicit "no data" placeholder every aggregate can fall back to.
fn no_data(ui: &mut Ui) {
    ui.add_space(24.0);
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(
            RichText::new("No data for the current filters")
                .weak()
                .italics(),
        );
    });
    ui.add_space(24.0);
}

// ---------------------------------------------------------------------------
// KPI tiles
// ---------------------------------------------------------------------------

fn kpi_row(ui: &mut Ui, kpis: Option<&KpiSummary>) {
    match kpis {
        Some(k) => {
            ui.columns(4, |cols| {
                kpi_tile(&mut cols[0], "Total revenue", money(k.total_revenue));
                kpi_tile(&mut cols[1], "Gross income", money(k.gross_income));
                kpi_tile(
                    &mut cols[2],
                    "Average rating",
                    format!("{:.2} ★", k.mean_rating),
                );
                kpi_tile(&mut cols[3], "Transactions", k.transactions.to_string());
            });
        }
        None => {
            let warn = ui.visuals().warn_fg_color;
            ui.label(
                RichText::new("No data for the selected filters. Adjust them to recover.")
                    .color(warn),
            );
        }
    }
}

fn kpi_tile(ui: &mut Ui, label: &str, value: String) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.label(RichText::new(label).weak());
        ui.label(RichText::new(value).heading());
    });
}

/// `1234567.8` → `$1,234,567.80`.
fn money(v: f64) -> String {
    let s = format!("{:.2}", v.abs());
    let (int, frac) = s.split_once('.').unwrap_or((s.as_str(), "00"));
    let mut grouped = String::new();
    for (i, c) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if v < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{frac}")
}

// ---------------------------------------------------------------------------
// Individual charts
// ---------------------------------------------------------------------------

fn revenue_over_time(ui: &mut Ui, aggregates: &DashboardAggregates) {
    let Some(series) = &aggregates.revenue_over_time else {
        return no_data(ui);
    };
    let points: Vec<[f64; 2]> = series
        .iter()
        .map(|(day, total)| [day.num_days_from_ce() as f64, *total])
        .collect();
    let line = Line::new(points)
        .name("Total")
        .color(Color32::LIGHT_BLUE)
        .width(1.5);
    Plot::new("revenue_over_time")
        .height(CHART_HEIGHT)
        .y_axis_label("Revenue ($)")
        .x_axis_formatter(|mark: GridMark, _range: &RangeInclusive<f64>| {
            NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
                .map(|d| d.format("%b %d").to_string())
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.line(line);
        });
}

fn revenue_by_product_line(ui: &mut Ui, state: &AppState, aggregates: &DashboardAggregates) {
    let Some(groups) = &aggregates.revenue_by_product_line else {
        return no_data(ui);
    };
    category_bars(
        ui,
        "revenue_by_product_line",
        "Revenue ($)",
        groups,
        &state.product_colors,
    );
}

fn rating_distribution(ui: &mut Ui, aggregates: &DashboardAggregates) {
    let Some(dist) = &aggregates.rating_distribution else {
        return no_data(ui);
    };
    let bars: Vec<Bar> = dist
        .buckets
        .iter()
        .map(|b| {
            Bar::new((b.lo + b.hi) / 2.0, b.count as f64)
                .width(((b.hi - b.lo) * 0.95).max(0.05))
        })
        .collect();
    let histogram = BarChart::new(bars)
        .name(format!("Ratings (n={})", dist.sorted_ratings.len()))
        .color(Color32::LIGHT_BLUE);

    // Marginal box above the bars, like the original rendering.
    let max_count = dist.buckets.iter().map(|b| b.count).max().unwrap_or(1) as f64;
    let s = dist.summary;
    let marginal = BoxPlot::new(vec![BoxElem::new(
        max_count * 1.25,
        BoxSpread::new(s.min, s.q1, s.median, s.q3, s.max),
    )
    .box_width(max_count * 0.18)])
    .horizontal()
    .name("Spread");

    Plot::new("rating_distribution")
        .height(CHART_HEIGHT)
        .x_axis_label("Rating")
        .y_axis_label("Frequency")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(histogram);
            plot_ui.box_plot(marginal);
        });
}

fn spending_by_customer_type(ui: &mut Ui, state: &AppState, aggregates: &DashboardAggregates) {
    let Some(groups) = &aggregates.spending_by_customer_type else {
        return no_data(ui);
    };
    let mut boxes = Vec::with_capacity(groups.len());
    let mut outliers = Vec::new();
    for (i, g) in groups.iter().enumerate() {
        let color = state.customer_colors.color_for(&g.customer_type);
        boxes.push(
            BoxElem::new(
                i as f64,
                BoxSpread::new(
                    g.whisker_low,
                    g.summary.q1,
                    g.summary.median,
                    g.summary.q3,
                    g.whisker_high,
                ),
            )
            .name(format!("{} (n={})", g.customer_type, g.totals.len()))
            .fill(color.gamma_multiply(0.4))
            .stroke(Stroke::new(1.5, color)),
        );
        if !g.outliers.is_empty() {
            let pts: Vec<[f64; 2]> = g.outliers.iter().map(|&v| [i as f64, v]).collect();
            outliers.push(
                Points::new(pts)
                    .color(color)
                    .radius(2.0)
                    .shape(MarkerShape::Circle),
            );
        }
    }
    let labels: Vec<String> = groups.iter().map(|g| g.customer_type.clone()).collect();
    Plot::new("spending_by_customer_type")
        .height(CHART_HEIGHT)
        .y_axis_label("Total ($)")
        .x_axis_formatter(category_axis(labels))
        .show(ui, |plot_ui| {
            plot_ui.box_plot(BoxPlot::new(boxes));
            for pts in outliers {
                plot_ui.points(pts);
            }
        });
}

fn payment_methods(ui: &mut Ui, state: &AppState, aggregates: &DashboardAggregates) {
    let Some(counts) = &aggregates.payment_counts else {
        return no_data(ui);
    };
    let groups: Vec<(String, f64)> = counts
        .iter()
        .map(|(name, count)| (name.clone(), *count as f64))
        .collect();
    category_bars(
        ui,
        "payment_methods",
        "Transactions",
        &groups,
        &state.payment_colors,
    );
}

fn income_composition(ui: &mut Ui, state: &AppState, aggregates: &DashboardAggregates) {
    let Some(composition) = &aggregates.income_composition else {
        return no_data(ui);
    };
    match composition {
        IncomeComposition::ByProductLine(groups) => {
            category_bars(
                ui,
                "income_composition",
                "Gross income ($)",
                groups,
                &state.product_colors,
            );
        }
        IncomeComposition::Stacked(branches) => {
            // One series per product line across branches, stacked per branch.
            let mut lines: BTreeSet<&str> = BTreeSet::new();
            for b in branches {
                for (line, _) in &b.segments {
                    lines.insert(line);
                }
            }
            let mut charts: Vec<BarChart> = Vec::new();
            for line in &lines {
                let bars: Vec<Bar> = branches
                    .iter()
                    .enumerate()
                    .map(|(i, b)| {
                        let value = b
                            .segments
                            .iter()
                            .find(|(l, _)| l.as_str() == *line)
                            .map(|(_, v)| *v)
                            .unwrap_or(0.0);
                        Bar::new(i as f64, value).width(0.6)
                    })
                    .collect();
                let mut chart = BarChart::new(bars)
                    .name(*line)
                    .color(state.product_colors.color_for(line));
                let below: Vec<&BarChart> = charts.iter().collect();
                chart = chart.stack_on(&below);
                charts.push(chart);
            }
            let labels: Vec<String> = branches
                .iter()
                .map(|b| format!("Branch {}", b.branch))
                .collect();
            Plot::new("income_composition_stacked")
                .height(CHART_HEIGHT)
                .legend(Legend::default())
                .y_axis_label("Gross income ($)")
                .x_axis_formatter(category_axis(labels))
                .show(ui, |plot_ui| {
                    for chart in charts {
                        plot_ui.bar_chart(chart);
                    }
                });
        }
    }
}

fn cogs_income(ui: &mut Ui, state: &AppState, aggregates: &DashboardAggregates) {
    let Some(relation) = &aggregates.cogs_income else {
        return no_data(ui);
    };
    let mut by_line: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for p in &relation.points {
        by_line
            .entry(p.product_line.as_str())
            .or_default()
            .push([p.cogs, p.gross_income]);
    }
    Plot::new("cogs_income")
        .height(320.0)
        .legend(Legend::default())
        .x_axis_label("COGS ($)")
        .y_axis_label("Gross income ($)")
        .show(ui, |plot_ui| {
            for (line, pts) in by_line {
                plot_ui.points(
                    Points::new(pts)
                        .name(line)
                        .color(state.product_colors.color_for(line))
                        .radius(2.0),
                );
            }
            if let Some(trend) = relation.trend {
                let (min_x, max_x) = relation
                    .points
                    .iter()
                    .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                        (lo.min(p.cogs), hi.max(p.cogs))
                    });
                let fit = Line::new(vec![
                    [min_x, trend.at(min_x)],
                    [max_x, trend.at(max_x)],
                ])
                .name("Trend")
                .color(Color32::GRAY)
                .style(LineStyle::Dashed { length: 6.0 });
                plot_ui.line(fit);
            }
        });
}

fn correlation_heatmap(ui: &mut Ui, aggregates: &DashboardAggregates) {
    let Some(matrix) = &aggregates.correlation else {
        return no_data(ui);
    };
    let n = matrix.columns.len();
    let label_w = 88.0_f32;
    let header_h = 20.0_f32;
    let cell = ((ui.available_width() - label_w) / n as f32).clamp(28.0, 64.0);
    let size = Vec2::new(label_w + cell * n as f32, header_h + cell * n as f32);

    let text_color = ui.visuals().text_color();
    let blank = ui.visuals().faint_bg_color;
    let (response, painter) = ui.allocate_painter(size, Sense::hover());
    let rect = response.rect;
    let font = FontId::proportional(10.0);

    for (j, col) in matrix.columns.iter().enumerate() {
        let x = rect.left() + label_w + (j as f32 + 0.5) * cell;
        painter.text(
            egui::pos2(x, rect.top() + header_h * 0.5),
            Align2::CENTER_CENTER,
            col.short_label(),
            font.clone(),
            text_color,
        );
    }
    for (i, col) in matrix.columns.iter().enumerate() {
        let y = rect.top() + header_h + (i as f32 + 0.5) * cell;
        painter.text(
            egui::pos2(rect.left() + label_w - 6.0, y),
            Align2::RIGHT_CENTER,
            col.label(),
            font.clone(),
            text_color,
        );
        for j in 0..n {
            let r = matrix.get(i, j);
            let cell_rect = egui::Rect::from_min_size(
                egui::pos2(
                    rect.left() + label_w + j as f32 * cell,
                    rect.top() + header_h + i as f32 * cell,
                ),
                Vec2::splat(cell),
            )
            .shrink(1.0);
            if r.is_finite() {
                painter.rect_filled(cell_rect, CornerRadius::same(2), correlation_color(r));
                painter.text(
                    cell_rect.center(),
                    Align2::CENTER_CENTER,
                    format!("{r:.2}"),
                    font.clone(),
                    contrast_color(r),
                );
            } else {
                // Zero-variance pair: blank cell instead of a fake zero.
                painter.rect_filled(cell_rect, CornerRadius::same(2), blank);
            }
        }
    }
}

/// Diverging blue → white → red over [-1, 1] (the RdBu scale, reversed).
fn correlation_color(r: f64) -> Color32 {
    let t = r.clamp(-1.0, 1.0) as f32;
    let lerp = |a: u8, b: u8, t: f32| (a as f32 + (b as f32 - a as f32) * t) as u8;
    if t < 0.0 {
        let t = -t;
        Color32::from_rgb(lerp(235, 59, t), lerp(235, 76, t), lerp(235, 192, t))
    } else {
        Color32::from_rgb(lerp(235, 180, t), lerp(235, 4, t), lerp(235, 38, t))
    }
}

fn contrast_color(r: f64) -> Color32 {
    if r.abs() > 0.6 {
        Color32::WHITE
    } else {
        Color32::from_rgb(40, 40, 40)
    }
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// One coloured bar per category, legend naming, labelled x ticks.
fn category_bars(
    ui: &mut Ui,
    id: &str,
    y_label: &str,
    groups: &[(String, f64)],
    colors: &CategoryColors,
) {
    let mut charts = Vec::with_capacity(groups.len());
    for (i, (name, value)) in groups.iter().enumerate() {
        let bar = Bar::new(i as f64, *value).width(0.7);
        charts.push(
            BarChart::new(vec![bar])
                .name(name)
                .color(colors.color_for(name)),
        );
    }
    let labels: Vec<String> = groups.iter().map(|(name, _)| name.clone()).collect();
    Plot::new(id.to_string())
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label(y_label)
        .x_axis_formatter(category_axis(labels))
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

/// Axis formatter that shows the category name at integral positions.
fn category_axis(
    labels: Vec<String>,
) -> impl Fn(GridMark, &RangeInclusive<f64>) -> String + 'static {
    move |mark, _range| {
        let rounded = mark.value.round();
        if (mark.value - rounded).abs() > 1e-6 || rounded < 0.0 {
            return String::new();
        }
        labels.get(rounded as usize).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_groups_thousands() {
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1234567.891), "$1,234,567.89");
        assert_eq!(money(-45.5), "-$45.50");
    }

    #[test]
    fn category_axis_labels_integral_marks_only() {
        let fmt = category_axis(vec!["Cash".into(), "Ewallet".into()]);
        let mark = |value: f64| GridMark {
            value,
            step_size: 1.0,
        };
        assert_eq!(fmt(mark(0.0), &(0.0..=2.0)), "Cash");
        assert_eq!(fmt(mark(1.0), &(0.0..=2.0)), "Ewallet");
        assert_eq!(fmt(mark(0.5), &(0.0..=2.0)), "");
        assert_eq!(fmt(mark(5.0), &(0.0..=2.0)), "");
    }
}
