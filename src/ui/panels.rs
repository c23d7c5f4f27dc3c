use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::Slot;
use crate::data::export::export_records;
use crate::data::loader::SPREADSHEET_EXTENSIONS;
use crate::state::{AppState, View};

// ---------------------------------------------------------------------------
// Left side panel – uploads and selectors
// ---------------------------------------------------------------------------

/// Render the left panel: upload slots, then rate index and scenario pickers.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Upload Excel Files");
    ui.separator();

    for slot in Slot::ALL {
        upload_slot(ui, state, slot);
        ui.add_space(6.0);
    }
    ui.separator();

    let dataset = match &state.dataset {
        Some(ds) => ds,
        None => {
            ui.label("Both files are needed before charts render.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the closures.
    let rate_indices: Vec<String> = dataset.rate_indices.iter().cloned().collect();
    let scenarios: Vec<String> = dataset.scenarios.iter().cloned().collect();

    // ---- Rate index (single choice) ----
    ui.strong("Rate Index");
    let current = state.rate_index.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt("rate_index")
        .selected_text(&current)
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for index in &rate_indices {
                if ui.selectable_label(current == *index, index).clicked() {
                    state.set_rate_index(index.clone());
                }
            }
        });
    ui.add_space(8.0);

    // ---- Scenarios (multi choice) ----
    let header_text = format!(
        "Scenario  ({}/{})",
        state.selected_scenarios.len(),
        scenarios.len()
    );
    ui.strong(header_text);
    ui.horizontal(|ui: &mut Ui| {
        if ui.small_button("All").clicked() {
            state.select_all_scenarios();
        }
        if ui.small_button("None").clicked() {
            state.select_no_scenarios();
        }
    });

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for scenario in &scenarios {
                let mut checked = state.selected_scenarios.contains(scenario);
                if ui.checkbox(&mut checked, scenario).changed() {
                    state.toggle_scenario(scenario);
                }
            }
        });
}

fn upload_slot(ui: &mut Ui, state: &mut AppState, slot: Slot) {
    ui.horizontal(|ui: &mut Ui| {
        if ui.button(slot.upload_caption()).clicked() {
            open_file_dialog(state, slot);
        }
        if state.upload(slot).is_some() && ui.small_button("✖").on_hover_text("Clear").clicked() {
            state.clear_upload(slot);
        }
    });

    let Some(upload) = state.upload(slot) else {
        ui.weak("No file");
        return;
    };
    let t = &upload.transformed;
    ui.label(&upload.file_name);
    ui.weak(format!(
        "{} records, valuation {}",
        t.records.len(),
        t.valuation_date
    ));

    let stats = t.stats;
    egui::CollapsingHeader::new("Dropped rows")
        .id_salt(slot.upload_caption())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new((slot.upload_caption(), "drops"))
                .num_columns(2)
                .show(ui, |ui: &mut Ui| {
                    for (label, count) in [
                        ("Rows read", stats.rows_read),
                        ("Rows dropped", stats.rows_dropped()),
                        ("No rate index", stats.rows_missing_rate_index),
                        ("No scenario", stats.rows_missing_scenario),
                        ("Non-date columns", stats.cells_bad_date),
                        ("Missing rates", stats.cells_bad_rate),
                    ] {
                        ui.label(label);
                        ui.label(count.to_string());
                        ui.end_row();
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            for slot in Slot::ALL {
                if ui.button(format!("{}…", slot.upload_caption())).clicked() {
                    open_file_dialog(state, slot);
                    ui.close_menu();
                }
            }
            ui.separator();
            let has_data = state.dataset.is_some();
            if ui
                .add_enabled(has_data, egui::Button::new("Export long-form data…"))
                .clicked()
            {
                export_dataset_dialog(state);
                ui.close_menu();
            }
            let has_figure = matches!(state.figure, Some(Ok(_)));
            if ui
                .add_enabled(has_figure, egui::Button::new("Export figure JSON…"))
                .clicked()
            {
                export_figure_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if ui.selectable_label(state.view == View::Chart, "Chart").clicked() {
            state.view = View::Chart;
        }
        if ui.selectable_label(state.view == View::Table, "Table").clicked() {
            state.view = View::Table;
        }

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records, {} rate indices, {} scenarios",
                ds.len(),
                ds.rate_indices.len(),
                ds.scenarios.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState, slot: Slot) {
    let file = rfd::FileDialog::new()
        .set_title(slot.upload_caption())
        .add_filter("Spreadsheets", SPREADSHEET_EXTENSIONS)
        .add_filter("CSV export", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_upload(slot, &path);
    }
}

fn export_dataset_dialog(state: &mut AppState) {
    let Some(ds) = &state.dataset else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export long-form data")
        .set_file_name("rate_curves.csv")
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet"])
        .save_file();

    if let Some(path) = file {
        match export_records(&path, &ds.records) {
            Ok(()) => log::info!("Exported {} records to {path:?}", ds.len()),
            Err(e) => {
                log::error!("Export failed: {e:#}");
                state.status_message = Some(format!("Export failed: {e:#}"));
            }
        }
    }
}

fn export_figure_dialog(state: &mut AppState) {
    let Some(Ok(figure)) = &state.figure else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export figure")
        .set_file_name(format!("{}.json", figure.title))
        .add_filter("JSON", &["json"])
        .save_file();

    if let Some(path) = file {
        let written = figure
            .to_json()
            .map_err(anyhow::Error::from)
            .and_then(|json| std::fs::write(&path, json).map_err(anyhow::Error::from));
        if let Err(e) = written {
            log::error!("Figure export failed: {e:#}");
            state.status_message = Some(format!("Figure export failed: {e:#}"));
        }
    }
}
