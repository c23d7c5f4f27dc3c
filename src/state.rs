use std::path::Path;

use crate::chart::compose::{ComposeError, compose, select_records};
use crate::chart::figure::FigureSpec;
use crate::config::{SheetConfig, Slot};
use crate::data::loader::load_sheet;
use crate::data::model::{ForecastDataset, LongRecord, RawSheet};
use crate::data::transform::{TransformError, Transformed, transform};

// ---------------------------------------------------------------------------
// Uploads
// ---------------------------------------------------------------------------

/// A successfully transformed upload.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub transformed: Transformed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Chart,
    Table,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Default)]
pub struct AppState {
    pub config: SheetConfig,

    /// Previous / current uploads, indexed by [`Slot`].
    uploads: [Option<Upload>; 2],

    /// Both snapshots concatenated (None until both uploads succeed).
    pub dataset: Option<ForecastDataset>,

    /// Selected rate index.
    pub rate_index: Option<String>,

    /// Selected scenarios, in the order they were picked.
    pub selected_scenarios: Vec<String>,

    /// Result of the last pipeline run (None without a dataset).
    pub figure: Option<Result<FigureSpec, ComposeError>>,

    pub view: View,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

fn slot_index(slot: Slot) -> usize {
    match slot {
        Slot::Previous => 0,
        Slot::Current => 1,
    }
}

impl AppState {
    pub fn upload(&self, slot: Slot) -> Option<&Upload> {
        self.uploads[slot_index(slot)].as_ref()
    }

    /// Read and transform a file into `slot`. On failure the slot is emptied
    /// and the error is kept as the status message.
    pub fn load_upload(&mut self, slot: Slot, path: &Path) {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let result = load_sheet(path, &self.config)
            .and_then(|raw| self.ingest(slot, &file_name, &raw).map_err(anyhow::Error::from));

        if let Err(e) = result {
            log::warn!("Failed to load {file_name}: {e:#}");
            self.status_message = Some(format!("{file_name}: {e:#}"));
            self.clear_upload(slot);
        }
    }

    /// Transform an already-read sheet into `slot` and rebuild the dataset.
    pub fn ingest(
        &mut self,
        slot: Slot,
        file_name: &str,
        raw: &RawSheet,
    ) -> Result<(), TransformError> {
        let label = self.config.label_for(slot).to_string();
        let transformed = transform(raw, &self.config, &label).inspect_err(|e| {
            let kind = if e.is_schema() {
                "unexpected sheet layout"
            } else {
                "no dated columns"
            };
            log::debug!("{file_name} rejected ({kind}): {e}");
        })?;
        log::info!(
            "Loaded {file_name} as '{label}': {} records, valuation date {}",
            transformed.records.len(),
            transformed.valuation_date
        );

        self.uploads[slot_index(slot)] = Some(Upload {
            file_name: file_name.to_string(),
            transformed,
        });
        self.status_message = None;
        self.rebuild_dataset();
        Ok(())
    }

    pub fn clear_upload(&mut self, slot: Slot) {
        self.uploads[slot_index(slot)] = None;
        self.rebuild_dataset();
    }

    /// Concatenate previous then current, keep still-valid selections and
    /// fall back to the first rate index / scenario alphabetically.
    fn rebuild_dataset(&mut self) {
        let combined = match &self.uploads {
            [Some(prev), Some(curr)] => Some(ForecastDataset::concat([
                prev.transformed.records.clone(),
                curr.transformed.records.clone(),
            ])),
            _ => None,
        };
        let Some(dataset) = combined else {
            self.dataset = None;
            self.recompute();
            return;
        };

        if !self
            .rate_index
            .as_ref()
            .is_some_and(|r| dataset.rate_indices.contains(r))
        {
            self.rate_index = dataset.rate_indices.first().cloned();
        }

        self.selected_scenarios
            .retain(|s| dataset.scenarios.contains(s));
        if self.selected_scenarios.is_empty() {
            self.selected_scenarios
                .extend(dataset.scenarios.first().cloned());
        }

        self.dataset = Some(dataset);
        self.recompute();
    }

    /// Run the pipeline from the current dataset and selections.
    pub fn recompute(&mut self) {
        self.figure = match (&self.dataset, &self.rate_index) {
            (Some(ds), Some(index)) => Some(compose(ds, index, &self.selected_scenarios)),
            _ => None,
        };
    }

    pub fn set_rate_index(&mut self, index: String) {
        self.rate_index = Some(index);
        self.recompute();
    }

    /// Add or remove one scenario from the selection.
    pub fn toggle_scenario(&mut self, scenario: &str) {
        if let Some(pos) = self.selected_scenarios.iter().position(|s| s == scenario) {
            self.selected_scenarios.remove(pos);
        } else {
            self.selected_scenarios.push(scenario.to_string());
        }
        self.recompute();
    }

    pub fn select_all_scenarios(&mut self) {
        if let Some(ds) = &self.dataset {
            self.selected_scenarios = ds.scenarios.iter().cloned().collect();
            self.recompute();
        }
    }

    pub fn select_no_scenarios(&mut self) {
        self.selected_scenarios.clear();
        self.recompute();
    }

    /// Records behind the current chart, in plotting order.
    pub fn charted_records(&self) -> Vec<&LongRecord> {
        match (&self.dataset, &self.rate_index) {
            (Some(ds), Some(index)) => select_records(ds, index, &self.selected_scenarios),
            _ => Vec::new(),
        }
    }
}
