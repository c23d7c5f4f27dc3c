use thiserror::Error;

use super::figure::{FigureSpec, Panel, Trace, TraceMode};
use crate::data::model::{ForecastDataset, LongRecord};

/// At most this many panels per grid row.
pub const MAX_COLUMNS: usize = 2;
pub const PANEL_WIDTH: f32 = 700.0;
pub const PANEL_HEIGHT: f32 = 400.0;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("Please select at least one scenario.")]
    EmptySelection,
}

/// Records for one rate index and a set of scenarios, ordered by month offset.
///
/// The sort is stable, so records sharing an offset keep dataset order.
pub fn select_records<'a>(
    dataset: &'a ForecastDataset,
    rate_index: &str,
    scenarios: &[String],
) -> Vec<&'a LongRecord> {
    let mut rows: Vec<&LongRecord> = dataset
        .records
        .iter()
        .filter(|r| r.rate_index == rate_index && scenarios.contains(&r.scenario))
        .collect();
    rows.sort_by_key(|r| r.month_offset);
    rows
}

/// Build the comparison figure: one panel per scenario, one trace per
/// snapshot within each panel.
pub fn compose(
    dataset: &ForecastDataset,
    rate_index: &str,
    scenarios: &[String],
) -> Result<FigureSpec, ComposeError> {
    if scenarios.is_empty() {
        return Err(ComposeError::EmptySelection);
    }

    let rows = select_records(dataset, rate_index, scenarios);

    let mut snapshots: Vec<&str> = Vec::new();
    for r in &rows {
        if !snapshots.contains(&r.snapshot.as_str()) {
            snapshots.push(&r.snapshot);
        }
    }

    let cols = scenarios.len().min(MAX_COLUMNS);
    let grid_rows = scenarios.len().div_ceil(cols);

    let panels = scenarios
        .iter()
        .enumerate()
        .map(|(i, scenario)| {
            let traces = snapshots
                .iter()
                .filter_map(|snap| {
                    let sub: Vec<&&LongRecord> = rows
                        .iter()
                        .filter(|r| &r.scenario == scenario && r.snapshot == *snap)
                        .collect();
                    if sub.is_empty() {
                        return None;
                    }
                    Some(Trace {
                        name: snap.to_string(),
                        legend_group: snap.to_string(),
                        show_legend: i == 0,
                        mode: TraceMode::LinesMarkers,
                        x: sub.iter().map(|r| format!("T{}", r.month_offset)).collect(),
                        y: sub.iter().map(|r| r.rate).collect(),
                    })
                })
                .collect();

            Panel {
                title: scenario.clone(),
                row: i / cols,
                col: i % cols,
                x_title: "Month".to_string(),
                y_title: "Rate".to_string(),
                traces,
            }
        })
        .collect();

    log::debug!(
        "composed '{rate_index}': {} records, {grid_rows}x{cols} grid",
        rows.len()
    );

    Ok(FigureSpec {
        title: rate_index.to_string(),
        legend_title: "Snapshot".to_string(),
        rows: grid_rows,
        cols,
        width: PANEL_WIDTH * cols as f32,
        height: PANEL_HEIGHT * grid_rows as f32,
        panels,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const PREV: &str = "Previous Rate";
    const CURR: &str = "Current Rate";

    fn rec(scenario: &str, index: &str, snapshot: &str, offset: i32, rate: f64) -> LongRecord {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .checked_add_months(chrono::Months::new(offset as u32))
            .unwrap();
        LongRecord {
            scenario: scenario.to_string(),
            rate_index: index.to_string(),
            date,
            rate,
            month_offset: offset,
            snapshot: snapshot.to_string(),
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    /// Two snapshots, five points each, stored out of offset order.
    fn two_snapshot_dataset() -> ForecastDataset {
        let mut records = Vec::new();
        for (snap, bump) in [(PREV, 0.0), (CURR, 0.5)] {
            for offset in [3, 0, 4, 1, 2] {
                records.push(rec("Base", "SOFR", snap, offset, offset as f64 + bump));
            }
            records.push(rec("Base", "Prime", snap, 0, 8.0));
            records.push(rec("Stress", "SOFR", snap, 0, 6.0 + bump));
        }
        ForecastDataset::from_records(records)
    }

    #[test]
    fn empty_selection_is_an_advisory() {
        let ds = two_snapshot_dataset();
        let err = compose(&ds, "SOFR", &[]).unwrap_err();
        assert_eq!(err, ComposeError::EmptySelection);
        assert_eq!(err.to_string(), "Please select at least one scenario.");
    }

    #[test]
    fn traces_are_sorted_and_aligned() {
        let ds = two_snapshot_dataset();
        let fig = compose(&ds, "SOFR", &names(&["Base"])).unwrap();

        assert_eq!((fig.rows, fig.cols), (1, 1));
        let panel = &fig.panels[0];
        assert_eq!(panel.traces.len(), 2);

        let prev = &panel.traces[0];
        assert_eq!(prev.name, PREV);
        assert_eq!(prev.x, vec!["T0", "T1", "T2", "T3", "T4"]);
        assert_eq!(prev.y, vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(prev.mode, TraceMode::LinesMarkers);

        let curr = &panel.traces[1];
        assert_eq!(curr.name, CURR);
        assert_eq!(curr.y, vec![0.5, 1.5, 2.5, 3.5, 4.5]);
    }

    #[test]
    fn three_scenarios_fill_a_two_by_two_grid() {
        let ds = two_snapshot_dataset();
        let fig = compose(&ds, "SOFR", &names(&["Stress", "Base", "Missing"])).unwrap();

        assert_eq!((fig.rows, fig.cols), (2, 2));
        let cells: Vec<(usize, usize, &str)> = fig
            .panels
            .iter()
            .map(|p| (p.row, p.col, p.title.as_str()))
            .collect();
        assert_eq!(
            cells,
            vec![(0, 0, "Stress"), (0, 1, "Base"), (1, 0, "Missing")]
        );
        assert_eq!(fig.width, 2.0 * PANEL_WIDTH);
        assert_eq!(fig.height, 2.0 * PANEL_HEIGHT);
        assert_eq!(fig.title, "SOFR");
        assert_eq!(fig.legend_title, "Snapshot");
        assert!(fig.panels.iter().all(|p| p.x_title == "Month" && p.y_title == "Rate"));

        // A scenario without data keeps its cell but draws nothing.
        assert!(fig.panels[2].traces.is_empty());
    }

    #[test]
    fn legend_lists_each_snapshot_once() {
        let ds = two_snapshot_dataset();
        let fig = compose(&ds, "SOFR", &names(&["Base", "Stress", "Missing"])).unwrap();

        assert_eq!(fig.legend_entries(), vec![PREV, CURR]);
        assert_eq!(fig.legend_groups(), vec![PREV, CURR]);
        assert!(fig.panels[1].traces.iter().all(|t| !t.show_legend));
        assert_eq!(fig.panels[1].traces.len(), 2);
    }

    #[test]
    fn single_snapshot_pair_is_skipped() {
        let records = vec![
            rec("Base", "SOFR", PREV, 0, 1.0),
            rec("Base", "SOFR", CURR, 0, 1.1),
            rec("Stress", "SOFR", CURR, 0, 2.0),
        ];
        let ds = ForecastDataset::from_records(records);
        let fig = compose(&ds, "SOFR", &names(&["Base", "Stress"])).unwrap();

        assert_eq!(fig.panels[0].traces.len(), 2);
        let stress: Vec<&str> = fig.panels[1].traces.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(stress, vec![CURR]);
    }

    #[test]
    fn ties_keep_dataset_order() {
        let records = vec![
            rec("Base", "SOFR", PREV, 1, 10.0),
            rec("Base", "SOFR", PREV, 0, 20.0),
            rec("Base", "SOFR", PREV, 1, 30.0),
        ];
        let ds = ForecastDataset::from_records(records);
        let rows = select_records(&ds, "SOFR", &names(&["Base"]));
        let rates: Vec<f64> = rows.iter().map(|r| r.rate).collect();
        assert_eq!(rates, vec![20.0, 10.0, 30.0]);
    }

    #[test]
    fn figure_serializes_to_json() {
        let ds = two_snapshot_dataset();
        let fig = compose(&ds, "SOFR", &names(&["Base"])).unwrap();
        let json = fig.to_json().unwrap();
        assert!(json.contains("\"legend_group\": \"Previous Rate\""));
        assert!(json.contains("\"lines_markers\""));
    }
}
