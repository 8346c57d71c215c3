use std::collections::BTreeMap;

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
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.70, 0.55);
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
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Maps the unique values of one categorical column (product line, customer
/// type, payment method) to distinct colours.
#[derive(Debug, Clone)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
    fallback: Color32,
}

impl Default for CategoryColors {
    fn default() -> Self {
        CategoryColors::new(&[])
    }
}

impl CategoryColors {
    /// Build a colour map from a column's unique values.
    pub fn new(values: &[String]) -> Self {
        let palette = generate_palette(values.len());
        let mapping: BTreeMap<String, Color32> =
            values.iter().cloned().zip(palette).collect();
        CategoryColors {
            mapping,
            fallback: Color32::GRAY,
        }
    }

    /// Look up the colour for a category value.
    pub fn color_for(&self, value: &str) -> Color32 {
        self.mapping.get(value).copied().unwrap_or(self.fallback)
    }
}
