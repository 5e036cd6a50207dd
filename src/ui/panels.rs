use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::color::band_color;
use crate::data::grade::Band;
use crate::data::loader::ColumnSelector;
use crate::data::model::SeriesRole;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – inputs and metrics
// ---------------------------------------------------------------------------

/// Render the left panel: input slots, column choice, actions, metrics.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Inputs");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for role in [SeriesRole::Predicted, SeriesRole::Actual] {
                slot_widget(ui, state, role);
                ui.add_space(4.0);
            }
            ui.separator();

            // ---- Value column ----
            ui.strong("Value column");
            match state.selector.clone() {
                ColumnSelector::Position(current) => {
                    let mut pos = current;
                    let changed = ui
                        .add(egui::DragValue::new(&mut pos).range(0..=255).prefix("#"))
                        .changed();
                    if changed {
                        state.set_selector(ColumnSelector::Position(pos));
                    }
                }
                ColumnSelector::Named(name) => {
                    ui.horizontal(|ui: &mut Ui| {
                        ui.label(format!("by name: {name}"));
                        if ui.small_button("Use #1").clicked() {
                            state.set_selector(ColumnSelector::default());
                        }
                    });
                }
            }
            ui.separator();

            // ---- Actions ----
            ui.horizontal(|ui: &mut Ui| {
                let ready = state.predicted.is_some() && state.actual.is_some();
                if ui.add_enabled(ready, egui::Button::new("Compare")).clicked() {
                    state.run_compare();
                }
                if ui.button("Reset").clicked() {
                    state.reset();
                }
            });
            ui.separator();

            metrics_table(ui, state);
        });
}

fn slot_widget(ui: &mut Ui, state: &mut AppState, role: SeriesRole) {
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(role.to_string());
        if ui.small_button("Load…").clicked() {
            open_file_dialog(state, role);
        }
    });
    match state.slot(role) {
        Some(slot) => {
            ui.label(&slot.series.label);
            let mut text = format!("{} values", slot.series.len());
            if slot.series.dropped > 0 {
                text.push_str(&format!(", {} rows skipped", slot.series.dropped));
            }
            ui.label(RichText::new(text).weak());
        }
        None => {
            ui.label(RichText::new("no file loaded").weak());
        }
    }
}

fn metrics_table(ui: &mut Ui, state: &AppState) {
    let (Some(cmp), Some(grades)) = (&state.comparison, &state.grades) else {
        return;
    };
    let r = &cmp.result;

    ui.heading("Metrics");
    let rows: [(&str, String, Option<Band>); 6] = [
        ("RMSE", format!("{:.4}", r.rmse), Some(grades.rmse)),
        ("R²", format!("{:.4}", r.r_squared), Some(grades.r_squared)),
        ("Correlation", format!("{:.4}", r.correlation), Some(grades.correlation)),
        ("Samples", r.n.to_string(), None),
        ("Mean X", format!("{:.4}", r.mean_x), None),
        ("Mean Y", format!("{:.4}", r.mean_y), None),
    ];

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto())
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Metric");
            });
            header.col(|ui| {
                ui.strong("Value");
            });
        })
        .body(|mut body| {
            for (name, value, band) in rows {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(name);
                    });
                    row.col(|ui| {
                        let mut text = RichText::new(value).monospace();
                        if let Some(band) = band {
                            text = text.color(band_color(band));
                        }
                        ui.label(text);
                    });
                });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open predicted…").clicked() {
                open_file_dialog(state, SeriesRole::Predicted);
                ui.close_menu();
            }
            if ui.button("Open actual…").clicked() {
                open_file_dialog(state, SeriesRole::Actual);
                ui.close_menu();
            }
            if ui.button("Open combined forecast…").clicked() {
                open_combined_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Clear cache").clicked() {
                state.clear_cache();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(cmp) = &state.comparison {
            ui.label(format!("{} pairs compared", cmp.result.n));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, role: SeriesRole) {
    let file = rfd::FileDialog::new()
        .set_title(format!("Open {role} data"))
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_file(role, &path);
    }
}

pub fn open_combined_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open forecast with PREDICTED / TARGET columns")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_combined(&path);
    }
}
