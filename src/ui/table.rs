use eframe::egui::{self, Ui};
use egui_extras::{Column as TableCol, TableBuilder};

use boston_trees::config::Page;
use boston_trees::state::AppState;
use boston_trees::views::table_columns;

const ROW_HEIGHT: f32 = 18.0;

/// Filtered trees in a scrollable grid; only visible rows are formatted.
pub fn tree_table(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = state.dataset.clone() else {
        return;
    };
    let indices = state.filtered(Page::Table);
    let trees = dataset.table(Page::Table.base());
    let columns = table_columns(trees);

    ui.label(format!("{} of {} trees", indices.len(), trees.len()));
    ui.add_space(4.0);

    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .columns(TableCol::auto().at_least(60.0).clip(true), columns.len())
            .header(ROW_HEIGHT + 4.0, |mut header| {
                for column in &columns {
                    header.col(|ui| {
                        ui.strong(column.header());
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, indices.len(), |mut row| {
                    let Some(tree) = indices.get(row.index()).and_then(|&i| trees.records.get(i))
                    else {
                        return;
                    };
                    for column in &columns {
                        row.col(|ui| {
                            ui.label(column.cell(tree));
                        });
                    }
                });
            });
    });
}
