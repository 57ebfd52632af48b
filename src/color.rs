use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::model::TechCategory;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
///
/// `offset` rotates the whole wheel, in degrees.
pub fn generate_palette(n: usize, offset: f32) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (offset + (i as f32 / n as f32) * 360.0) % 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.55);
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
// Dashboard colours
// ---------------------------------------------------------------------------

/// Index trend line.
pub const INDEX_LINE: Color32 = Color32::from_rgb(37, 99, 235);
pub const RISE: Color32 = Color32::from_rgb(22, 163, 74);
pub const FALL: Color32 = Color32::from_rgb(220, 38, 38);
pub const ERROR_TEXT: Color32 = Color32::from_rgb(185, 28, 28);

/// One colour per technology category, stable across frames.
#[derive(Debug, Clone)]
pub struct CategoryPalette {
    colors: [Color32; 4],
}

impl Default for CategoryPalette {
    fn default() -> Self {
        // Start on violet so AI does not collide with the blue index line.
        let generated = generate_palette(TechCategory::ALL.len(), 260.0);
        let mut colors = [Color32::GRAY; 4];
        for (slot, c) in colors.iter_mut().zip(generated) {
            *slot = c;
        }
        Self { colors }
    }
}

impl CategoryPalette {
    pub fn color_for(&self, category: TechCategory) -> Color32 {
        self.colors[category as usize]
    }

    /// Colour for a signed change.
    pub fn delta_color(delta: f64) -> Color32 {
        if delta >= 0.0 {
            RISE
        } else {
            FALL
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_palette() {
        assert!(generate_palette(0, 0.0).is_empty());
    }

    #[test]
    fn category_colours_are_distinct() {
        let palette = CategoryPalette::default();
        for (i, a) in TechCategory::ALL.iter().enumerate() {
            for b in &TechCategory::ALL[i + 1..] {
                assert_ne!(palette.color_for(*a), palette.color_for(*b));
            }
        }
    }

    #[test]
    fn delta_colour_follows_sign() {
        assert_eq!(CategoryPalette::delta_color(0.0), RISE);
        assert_eq!(CategoryPalette::delta_color(-0.5), FALL);
    }
}
