pub mod home;
pub mod panels;
pub mod plot;
pub mod table;

use eframe::egui::Color32;

use boston_trees::color::Rgb;

pub fn color32([r, g, b]: Rgb) -> Color32 {
    Color32::from_rgb(r, g, b)
}
