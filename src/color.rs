use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            // Offset so the first two series land on blue and orange.
            let hue = (210.0 + (i as f32 / n as f32) * 360.0) % 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Legend group → Color32
// ---------------------------------------------------------------------------

/// Assigns one colour per legend group so a snapshot looks the same in
/// every panel.
#[derive(Debug, Clone)]
pub struct GroupColors {
    mapping: Vec<(String, Color32)>,
    default_color: Color32,
}

impl GroupColors {
    pub fn new(groups: &[&str]) -> Self {
        let mapping = groups
            .iter()
            .zip(generate_palette(groups.len()))
            .map(|(g, c)| (g.to_string(), c))
            .collect();
        GroupColors {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, group: &str) -> Color32 {
        self.mapping
            .iter()
            .find(|(g, _)| g == group)
            .map_or(self.default_color, |(_, c)| *c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let colors = generate_palette(2);
        assert_eq!(colors.len(), 2);
        assert_ne!(colors[0], colors[1]);
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_group_falls_back_to_gray() {
        let colors = GroupColors::new(&["Previous Rate", "Current Rate"]);
        assert_ne!(colors.color_for("Previous Rate"), colors.color_for("Current Rate"));
        assert_eq!(colors.color_for("Other"), Color32::GRAY);
    }
}
