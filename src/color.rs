use std::collections::HashMap;

use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

use crate::data::aggregate::CategoryCount;

/// An sRGB triple, 0–255 per channel.
pub type Rgb = [u8; 3];

/// Fixed palette for the top map species, in rank order.
pub const MAP_PALETTE: [Rgb; 10] = [
    [230, 25, 75],
    [60, 180, 75],
    [255, 225, 25],
    [0, 130, 200],
    [245, 130, 48],
    [145, 30, 180],
    [70, 240, 240],
    [240, 50, 230],
    [210, 245, 60],
    [250, 190, 190],
];

/// Everything outside the top-N shares this gray.
pub const DEFAULT_COLOR: Rgb = [180, 180, 180];

/// Key colors of matplotlib's viridis at 0, 1/8, …, 1.
const VIRIDIS_STOPS: [Rgb; 9] = [
    [68, 1, 84],
    [71, 44, 122],
    [59, 81, 139],
    [44, 113, 142],
    [33, 144, 141],
    [39, 173, 129],
    [92, 200, 99],
    [170, 220, 50],
    [253, 231, 37],
];

// ---------------------------------------------------------------------------
// Palette generators
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Rgb> {
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let rgb: Srgb = Hsl::new(hue, 0.75, 0.55).into_color();
            to_rgb(rgb)
        })
        .collect()
}

/// `n` evenly spaced samples of the viridis gradient, dark to light.
pub fn viridis(n: usize) -> Vec<Rgb> {
    let segments = (VIRIDIS_STOPS.len() - 1) as f32;
    (0..n)
        .map(|i| {
            let t = if n > 1 { i as f32 / (n - 1) as f32 } else { 0.0 };
            let pos = t * segments;
            let lo = (pos.floor() as usize).min(VIRIDIS_STOPS.len() - 2);
            let a = linear(VIRIDIS_STOPS[lo]);
            let b = linear(VIRIDIS_STOPS[lo + 1]);
            to_rgb(Srgb::from_linear(a.mix(b, pos - lo as f32)))
        })
        .collect()
}

fn linear([r, g, b]: Rgb) -> LinSrgb {
    Srgb::new(r, g, b).into_format::<f32>().into_linear()
}

fn to_rgb(rgb: Srgb) -> Rgb {
    let rgb: Srgb<u8> = rgb.into_format();
    [rgb.red, rgb.green, rgb.blue]
}

// ---------------------------------------------------------------------------
// Color mapping: category → Rgb
// ---------------------------------------------------------------------------

/// Colors for the ranked categories; the rest fall back to a default.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorMap {
    legend: Vec<(String, Rgb)>,
    mapping: HashMap<String, Rgb>,
    default_color: Rgb,
}

impl ColorMap {
    /// Pair each ranked category with the palette color of its rank.
    /// Categories past the end of the palette keep the default color.
    pub fn from_ranking(ranking: &[CategoryCount], palette: &[Rgb], default_color: Rgb) -> Self {
        let legend: Vec<(String, Rgb)> = ranking
            .iter()
            .zip(palette)
            .map(|(entry, color)| (entry.category.clone(), *color))
            .collect();
        let mapping = legend.iter().cloned().collect();

        ColorMap {
            legend,
            mapping,
            default_color,
        }
    }

    /// Look up the colour for a category; `None` gets the default.
    pub fn color_for(&self, category: Option<&str>) -> Rgb {
        category
            .and_then(|c| self.mapping.get(c))
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Ranked (category, colour) pairs for the legend.
    pub fn legend_entries(&self) -> &[(String, Rgb)] {
        &self.legend
    }

    pub fn default_color(&self) -> Rgb {
        self.default_color
    }
}
