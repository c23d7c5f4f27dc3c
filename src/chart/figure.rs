use serde::Serialize;

// ---------------------------------------------------------------------------
// FigureSpec – renderer-independent description of a multi-panel chart
// ---------------------------------------------------------------------------

/// A grid of panels sharing one legend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FigureSpec {
    /// Figure title (the rate index name).
    pub title: String,
    pub legend_title: String,
    pub rows: usize,
    pub cols: usize,
    /// Total size in pixels.
    pub width: f32,
    pub height: f32,
    /// Panels in row-major order.
    pub panels: Vec<Panel>,
}

/// One subplot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Panel {
    pub title: String,
    /// 0-based grid position.
    pub row: usize,
    pub col: usize,
    pub x_title: String,
    pub y_title: String,
    pub traces: Vec<Trace>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceMode {
    LinesMarkers,
}

/// One line-plus-marker series. `x` and `y` are positionally aligned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    pub name: String,
    /// Traces sharing a group share a legend entry and colour.
    pub legend_group: String,
    pub show_legend: bool,
    pub mode: TraceMode,
    pub x: Vec<String>,
    pub y: Vec<f64>,
}

impl FigureSpec {
    /// Legend entries in order, one per group.
    pub fn legend_entries(&self) -> Vec<&str> {
        self.panels
            .iter()
            .flat_map(|p| &p.traces)
            .filter(|t| t.show_legend)
            .map(|t| t.legend_group.as_str())
            .collect()
    }

    /// Distinct legend groups across all panels, first-seen order.
    pub fn legend_groups(&self) -> Vec<&str> {
        let mut groups: Vec<&str> = Vec::new();
        for trace in self.panels.iter().flat_map(|p| &p.traces) {
            if !groups.contains(&trace.legend_group.as_str()) {
                groups.push(&trace.legend_group);
            }
        }
        groups
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Panel {
    /// Category labels across this panel's traces, first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for label in self.traces.iter().flat_map(|t| &t.x) {
            if !out.contains(&label.as_str()) {
                out.push(label);
            }
        }
        out
    }
}
