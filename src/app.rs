use eframe::egui;

use boston_trees::config::{AppConfig, Page};
use boston_trees::state::AppState;

use crate::ui::{home, panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct BostonTreesApp {
    pub state: AppState,
}

impl BostonTreesApp {
    pub fn new(config: AppConfig) -> Self {
        Self {
            state: AppState::new(config),
        }
    }
}

impl eframe::App for BostonTreesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation + filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading(self.state.page.title());
            ui.separator();
            match self.state.page {
                Page::Home => home::home_page(ui, &self.state),
                Page::Table => table::tree_table(ui, &mut self.state),
                Page::Map => plot::tree_map(ui, &mut self.state),
                Page::BarChart => plot::species_bars(ui, &mut self.state),
                Page::Scatter => plot::diameter_scatter(ui, &mut self.state),
            }
        });
    }
}
