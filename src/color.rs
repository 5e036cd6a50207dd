use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::data::grade::Band;

// ---------------------------------------------------------------------------
// Residual colour ramp
// ---------------------------------------------------------------------------

/// Hue for a perfect prediction (green) and for the worst one (red).
const HUE_BEST: f32 = 120.0;
const HUE_WORST: f32 = 0.0;

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let hsl = Hsl::new(hue, saturation, lightness);
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0).round() as u8,
        (rgb.green * 255.0).round() as u8,
        (rgb.blue * 255.0).round() as u8,
    )
}

/// Maps absolute residuals `|actual - predicted|` onto a green → red ramp.
#[derive(Debug, Clone, Copy)]
pub struct ResidualColorMap {
    max_residual: f64,
}

impl ResidualColorMap {
    /// Scale the ramp so the largest residual in `residuals` is fully red.
    pub fn new(residuals: impl IntoIterator<Item = f64>) -> Self {
        let max_residual = residuals.into_iter().fold(0.0_f64, f64::max);
        ResidualColorMap { max_residual }
    }

    pub fn color_for(&self, residual: f64) -> Color32 {
        let t = if self.max_residual > 0.0 {
            (residual.abs() / self.max_residual).clamp(0.0, 1.0) as f32
        } else {
            0.0
        };
        hsl_to_color32(HUE_BEST + (HUE_WORST - HUE_BEST) * t, 0.75, 0.5)
    }

    /// Sample `steps` evenly spaced legend entries (label → colour).
    pub fn legend_entries(&self, steps: usize) -> Vec<(String, Color32)> {
        if steps < 2 {
            return vec![(format!("{:.2}", self.max_residual), self.color_for(self.max_residual))];
        }
        (0..steps)
            .map(|i| {
                let r = self.max_residual * i as f64 / (steps - 1) as f64;
                (format!("|err| {r:.2}"), self.color_for(r))
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Band colours
// ---------------------------------------------------------------------------

pub fn band_color(band: Band) -> Color32 {
    match band {
        Band::Good => hsl_to_color32(HUE_BEST, 0.6, 0.4),
        Band::Fair => hsl_to_color32(45.0, 0.9, 0.45),
        Band::Poor => hsl_to_color32(HUE_WORST, 0.7, 0.5),
    }
}
