// ---------------------------------------------------------------------------
// Sheet configuration
// ---------------------------------------------------------------------------

/// Where to find the forecast table inside an uploaded workbook and how to
/// label the two snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetConfig {
    /// Worksheet holding the forecast table.
    pub sheet_name: String,
    /// 0-based sheet row carrying the column labels.
    pub header_row: usize,
    pub previous_label: String,
    pub current_label: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Market Forecast Rate Indexes".to_string(),
            header_row: 5,
            previous_label: "Previous Rate".to_string(),
            current_label: "Current Rate".to_string(),
        }
    }
}

impl SheetConfig {
    /// Snapshot label for an upload slot.
    pub fn label_for(&self, slot: Slot) -> &str {
        match slot {
            Slot::Previous => &self.previous_label,
            Slot::Current => &self.current_label,
        }
    }
}

/// The two upload slots, in concatenation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Previous,
    Current,
}

impl Slot {
    pub const ALL: [Slot; 2] = [Slot::Previous, Slot::Current];

    pub fn upload_caption(self) -> &'static str {
        match self {
            Slot::Previous => "Upload Previous Rate File",
            Slot::Current => "Upload Current Rate File",
        }
    }
}
