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
            hsl_to_color32(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

fn hsl_to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red * 255.0) as u8,
        (rgb.green * 255.0) as u8,
        (rgb.blue * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Sequential scale: mean score → fill colour (choropleth)
// ---------------------------------------------------------------------------

/// Maps a score range onto a single-hue lightness ramp, light for the low
/// end and dark for the high end.
#[derive(Debug, Clone, Copy)]
pub struct ScoreScale {
    min: f64,
    max: f64,
}

impl ScoreScale {
    const HUE: f32 = 215.0;

    pub fn new(min: f64, max: f64) -> Self {
        ScoreScale { min, max }
    }

    /// Build a scale spanning the given values; `None` when there are none.
    pub fn from_values<'a>(values: impl Iterator<Item = &'a f64>) -> Option<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &v in values {
            min = min.min(v);
            max = max.max(v);
        }
        (min <= max).then_some(ScoreScale { min, max })
    }

    /// Fill colour for a value; values outside the range clamp to the ends.
    pub fn color_for(&self, value: f64) -> Color32 {
        let span = self.max - self.min;
        let t = if span <= f64::EPSILON {
            0.5
        } else {
            ((value - self.min) / span).clamp(0.0, 1.0)
        };
        let lightness = 0.85 - 0.55 * t as f32;
        hsl_to_color32(Hsl::new(Self::HUE, 0.65, lightness))
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
