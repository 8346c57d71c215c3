use eframe::egui::{self, Color32, ComboBox, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::data::filter::CategoryFilter;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state below.
    let branches = dataset.branches.clone();
    let product_lines = dataset.product_lines.clone();
    let customer_types = dataset.customer_types.clone();
    let date_span = dataset.date_span;
    let default_selection = crate::data::filter::FilterSelection::full_span(dataset);

    let mut selection = state.selection.clone();
    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            changed |= category_combo(ui, "Branch", &branches, &mut selection.branch);
            changed |= category_combo(
                ui,
                "Product line",
                &product_lines,
                &mut selection.product_line,
            );
            changed |= category_combo(
                ui,
                "Customer type",
                &customer_types,
                &mut selection.customer_type,
            );

            ui.separator();
            ui.strong("Date range");
            if let Some((min_date, max_date)) = date_span {
                let mut filter_dates = selection.date_bounds().is_some();
                if ui.checkbox(&mut filter_dates, "Filter by date").changed() {
                    if filter_dates {
                        selection.date_start = Some(min_date);
                        selection.date_end = Some(max_date);
                    } else {
                        selection.date_start = None;
                        selection.date_end = None;
                    }
                    changed = true;
                }

                if let (Some(mut start), Some(mut end)) =
                    (selection.date_start, selection.date_end)
                {
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label("From");
                        if ui
                            .add(DatePickerButton::new(&mut start).id_salt("date_start"))
                            .changed()
                        {
                            changed = true;
                        }
                    });
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label("To");
                        if ui
                            .add(DatePickerButton::new(&mut end).id_salt("date_end"))
                            .changed()
                        {
                            changed = true;
                        }
                    });
                    // The picker is not span-aware; keep both ends inside it.
                    selection.date_start = Some(start.clamp(min_date, max_date));
                    selection.date_end = Some(end.clamp(min_date, max_date));
                }
            }

            ui.separator();
            if ui.button("Reset filters").clicked() {
                selection = default_selection.clone();
                changed = true;
            }
        });

    if changed {
        state.set_selection(selection);
    }
}

/// "All" plus one entry per unique value; returns whether the filter changed.
fn category_combo(
    ui: &mut Ui,
    label: &str,
    values: &[String],
    filter: &mut CategoryFilter,
) -> bool {
    let mut changed = false;
    ui.strong(label);
    ComboBox::from_id_salt(label)
        .selected_text(filter.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            if ui
                .selectable_label(matches!(filter, CategoryFilter::All), "All")
                .clicked()
            {
                *filter = CategoryFilter::All;
                changed = true;
            }
            for value in values {
                let is_selected = filter.selected() == Some(value.as_str());
                if ui.selectable_label(is_selected, value).clicked() {
                    *filter = CategoryFilter::One(value.clone());
                    changed = true;
                }
            }
        });
    ui.add_space(4.0);
    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} sales loaded, {} match filters",
                ds.len(),
                state.visible_indices.len()
            ));
            if state.rows_dropped > 0 {
                ui.label(
                    RichText::new(format!(
                        "({} of {} rows dropped as malformed)",
                        state.rows_dropped, state.rows_read
                    ))
                    .weak(),
                );
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
