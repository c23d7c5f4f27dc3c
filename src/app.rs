use eframe::egui;

use crate::state::{AppState, View};
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RateCurvesApp {
    pub state: AppState,
}

impl eframe::App for RateCurvesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: uploads and selectors ----
        egui::SidePanel::left("selection_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: chart or table ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            View::Chart => plot::figure_view(ui, &self.state),
            View::Table => table::records_table(ui, &self.state),
        });
    }
}
