use eframe::egui::{RichText, Ui};

use boston_trees::config::Page;
use boston_trees::state::AppState;

pub fn home_page(ui: &mut Ui, state: &AppState) {
    ui.label(
        "Explore the city's inventory of street and park trees. Pick a page on \
         the left; each page keeps its own filters.",
    );
    ui.add_space(8.0);

    for page in Page::ALL {
        let blurb = match page {
            Page::Table => "every tree, filterable by species, neighborhood, street and diameter",
            Page::Map => "a sample of the matching trees, colored by their most common species",
            Page::BarChart => "the thirty most planted species",
            Page::Scatter => "measured diameters per neighborhood, one color per species, filterable by diameter",
            Page::Home => continue,
        };
        ui.horizontal(|ui: &mut Ui| {
            ui.strong(page.title());
            ui.label(blurb);
        });
    }

    ui.add_space(12.0);
    match &state.dataset {
        Some(ds) if !ds.trees.is_empty() => {
            ui.label(format!(
                "Loaded {} trees from {} ({} with a recorded diameter).",
                ds.trees.len(),
                ds.source.display(),
                ds.measured.len()
            ));
        }
        _ => {
            ui.label(RichText::new("No trees loaded. Use File → Open… to pick an inventory file.").italics());
        }
    }
}
