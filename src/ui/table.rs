use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::state::AppState;

const HEADERS: [&str; 6] = ["Scenario", "Rate Index", "Snapshot", "Date", "Month", "Rate"];

/// Render the records behind the current chart as a table.
pub fn records_table(ui: &mut Ui, state: &AppState) {
    let records = state.charted_records();
    if records.is_empty() {
        ui.label("No records for the current selection.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(Column::auto().at_least(120.0))
        .columns(Column::auto().at_least(80.0), HEADERS.len() - 2)
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in HEADERS {
                header.col(|ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, records.len(), |mut row| {
                let r = records[row.index()];
                row.col(|ui| {
                    ui.label(&r.scenario);
                });
                row.col(|ui| {
                    ui.label(&r.rate_index);
                });
                row.col(|ui| {
                    ui.label(&r.snapshot);
                });
                row.col(|ui| {
                    ui.label(r.date.to_string());
                });
                row.col(|ui| {
                    ui.label(format!("T{}", r.month_offset));
                });
                row.col(|ui| {
                    ui.label(format!("{:.4}", r.rate));
                });
            });
        });
}
