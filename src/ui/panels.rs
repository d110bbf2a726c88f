use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use boston_trees::config::Page;
use boston_trees::data::filter::DiameterRange;
use boston_trees::state::{AppState, FilterField};

// ---------------------------------------------------------------------------
// Left side panel – navigation and filter widgets
// ---------------------------------------------------------------------------

/// Render the left panel: page selector, then the current page's filters.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Pages");
    for page in Page::ALL {
        if ui.selectable_label(state.page == page, page.title()).clicked() {
            state.set_page(page);
        }
    }
    ui.separator();

    let page = state.page;
    if page.filter_fields().is_empty() && !page.has_diameter_filter() {
        return;
    }
    if !state.has_data() {
        ui.label("No dataset loaded.");
        return;
    }

    ui.heading("Filters");
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for &field in page.filter_fields() {
                multiselect(ui, state, page, field);
            }
            if page.has_diameter_filter() {
                diameter_slider(ui, state, page);
            }
            ui.separator();
            let rows = state.filtered(page).len();
            ui.strong(format!("Rows after filtering: {rows}"));
        });
}

/// One collapsible multi-select. Nothing checked means no filtering.
fn multiselect(ui: &mut Ui, state: &mut AppState, page: Page, field: FilterField) {
    let options = state.filter_options(page);
    let all_values = field.options(&options);
    let selected = field.selected(&state.filter_spec(page)).clone();

    let header_text = format!("{}  ({}/{})", field.label(), selected.len(), all_values.len());
    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt((page, field))
        .default_open(!selected.is_empty())
        .show(ui, |ui: &mut Ui| {
            let search_id = ui.make_persistent_id((page, field, "search"));
            let mut query: String = ui.data_mut(|d| d.get_temp(search_id)).unwrap_or_default();

            ui.horizontal(|ui: &mut Ui| {
                ui.add(egui::TextEdit::singleline(&mut query).hint_text("Search…"));
                if ui.small_button("Clear").clicked() {
                    state.clear_filter(page, field);
                }
            });
            let needle = query.to_lowercase();
            ui.data_mut(|d| d.insert_temp(search_id, query));

            ScrollArea::vertical()
                .id_salt((page, field, "values"))
                .max_height(220.0)
                .show(ui, |ui: &mut Ui| {
                    for value in all_values
                        .iter()
                        .filter(|v| needle.is_empty() || v.to_lowercase().contains(&needle))
                    {
                        let mut checked = selected.contains(value);
                        if ui.checkbox(&mut checked, value.as_str()).changed() {
                            state.toggle_filter_value(page, field, value);
                        }
                    }
                });
        });
}

fn diameter_slider(ui: &mut Ui, state: &mut AppState, page: Page) {
    let Some(bounds) = state.filter_options(page).diameter else {
        return;
    };
    let current = state.filter_spec(page).diameter;
    let DiameterRange { mut min, mut max } = current.unwrap_or(bounds);

    ui.separator();
    ui.strong("Diameter (in)");
    let mut changed = false;
    changed |= ui
        .add(egui::Slider::new(&mut min, bounds.min..=bounds.max).text("min"))
        .changed();
    changed |= ui
        .add(egui::Slider::new(&mut max, bounds.min..=bounds.max).text("max"))
        .changed();
    if changed {
        state.set_diameter(page, Some(DiameterRange::new(min.min(max), max.max(min))));
    }
    if current.is_some() && ui.small_button("Any diameter").clicked() {
        state.set_diameter(page, None);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{}: {} trees, {} with a diameter",
                ds.source.display(),
                ds.trees.len(),
                ds.measured.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open tree inventory")
        .add_filter("Supported files", &["csv", "txt", "tsv", "json"])
        .add_filter("CSV", &["csv", "txt"])
        .add_filter("TSV", &["tsv"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        state.open_file(path);
    }
}
