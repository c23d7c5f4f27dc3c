mod app;
mod chart;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::RateCurvesApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Market Forecast Rate Indexes")
            .with_inner_size([1500.0, 950.0])
            .with_min_inner_size([700.0, 450.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Market Forecast Rate Indexes",
        options,
        Box::new(|_cc| Ok(Box::new(RateCurvesApp::default()))),
    )
}
