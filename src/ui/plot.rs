use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_plot::{GridMark, Line, Plot, PlotPoint, Points, uniform_grid_spacer};

use crate::chart::figure::{FigureSpec, Panel};
use crate::color::GroupColors;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Figure view (central panel)
// ---------------------------------------------------------------------------

/// Render the current figure, the empty-selection advisory, or the upload
/// prompt.
pub fn figure_view(ui: &mut Ui, state: &AppState) {
    if state.dataset.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Please upload both Excel files to proceed.");
        });
        return;
    }

    match &state.figure {
        Some(Ok(figure)) => draw_figure(ui, figure),
        Some(Err(advisory)) => {
            ui.label(RichText::new(advisory.to_string()).color(Color32::YELLOW));
        }
        None => {}
    }
}

fn draw_figure(ui: &mut Ui, figure: &FigureSpec) {
    let colors = GroupColors::new(&figure.legend_groups());

    ui.heading(&figure.title);
    ui.horizontal(|ui: &mut Ui| {
        ui.strong(&figure.legend_title);
        for entry in figure.legend_entries() {
            ui.label(RichText::new("●").color(colors.color_for(entry)));
            ui.label(entry);
        }
    });
    ui.separator();

    let panel_width = figure.width / figure.cols as f32;
    let panel_height = figure.height / figure.rows as f32;

    ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("figure_grid")
                .num_columns(figure.cols)
                .spacing([24.0, 24.0])
                .show(ui, |ui: &mut Ui| {
                    for row in 0..figure.rows {
                        for col in 0..figure.cols {
                            match figure.panels.iter().find(|p| p.row == row && p.col == col) {
                                Some(panel) => {
                                    draw_panel(ui, panel, &colors, panel_width, panel_height)
                                }
                                None => {
                                    ui.label("");
                                }
                            }
                        }
                        ui.end_row();
                    }
                });
        });
}

/// Map a plot coordinate back to its category label.
fn category_at(categories: &[String], x: f64) -> Option<&str> {
    let rounded = x.round();
    if (x - rounded).abs() > 1e-6 || rounded < 0.0 {
        return None;
    }
    categories.get(rounded as usize).map(String::as_str)
}

/// One subplot. Categories ("T0", "T1", …) sit at x = 0, 1, … in first-seen
/// order, like a categorical axis.
fn draw_panel(ui: &mut Ui, panel: &Panel, colors: &GroupColors, width: f32, height: f32) {
    let categories: Arc<Vec<String>> =
        Arc::new(panel.categories().into_iter().map(str::to_string).collect());
    let tick_labels = Arc::clone(&categories);
    let hover_labels = Arc::clone(&categories);

    ui.vertical(|ui: &mut Ui| {
        ui.strong(&panel.title);

        Plot::new(("panel", panel.row, panel.col))
            .width(width)
            .height(height - 24.0)
            .x_axis_label(panel.x_title.as_str())
            .y_axis_label(panel.y_title.as_str())
            .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
            .x_axis_formatter(move |mark: GridMark, _range| {
                category_at(&tick_labels, mark.value)
                    .unwrap_or_default()
                    .to_string()
            })
            .label_formatter(move |name: &str, value: &PlotPoint| {
                let month = category_at(&hover_labels, value.x).unwrap_or("");
                format!("{name}\nMonth: {month}\nRate: {:.2}", value.y)
            })
            .allow_scroll(false)
            .show(ui, |plot_ui| {
                for trace in &panel.traces {
                    let color = colors.color_for(&trace.legend_group);
                    let points: Vec<[f64; 2]> = trace
                        .x
                        .iter()
                        .zip(&trace.y)
                        .filter_map(|(label, &y)| {
                            let x = categories.iter().position(|c| c == label)?;
                            Some([x as f64, y])
                        })
                        .collect();

                    plot_ui.line(
                        Line::new(points.clone())
                            .name(&trace.name)
                            .color(color)
                            .width(2.0),
                    );
                    plot_ui.points(
                        Points::new(points)
                            .name(&trace.name)
                            .color(color)
                            .radius(3.0),
                    );
                }
            });
    });
}
