use std::ops::RangeInclusive;

use eframe::egui::{RichText, Ui};
use egui_plot::{Bar, BarChart, GridMark, Legend, MarkerShape, Plot, PlotPoint, PlotPoints, Points};

use boston_trees::color::Rgb;
use boston_trees::state::AppState;
use boston_trees::views::MapPoint;

use super::color32;

fn empty_notice(ui: &mut Ui, state: &AppState) -> bool {
    if state.has_data() {
        return false;
    }
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("No trees loaded  (File → Open…)");
    });
    true
}

/// Name of the category sitting at an integer axis mark, if any.
fn category_at(mark: f64, names: &[String]) -> String {
    let rounded = mark.round();
    if (mark - rounded).abs() > 1e-6 || rounded < 0.0 {
        return String::new();
    }
    names.get(rounded as usize).cloned().unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Map of trees
// ---------------------------------------------------------------------------

/// Scatter the sampled trees over longitude/latitude, one series per color.
pub fn tree_map(ui: &mut Ui, state: &mut AppState) {
    if empty_notice(ui, state) {
        return;
    }
    let Some(view) = state.map_view() else {
        return;
    };

    ui.horizontal(|ui: &mut Ui| {
        ui.label(format!(
            "Showing {} of {} matching trees",
            view.points.len(),
            view.matched
        ));
        if let Some((lat, lon)) = view.center {
            ui.separator();
            ui.label(format!("Median position {lat:.4}, {lon:.4}"));
        }
    });

    let aspect = view
        .center
        .map(|(lat, _)| 1.0 / lat.to_radians().cos())
        .unwrap_or(1.0);

    let buckets: Vec<(String, Rgb)> = view
        .legend
        .iter()
        .cloned()
        .chain(std::iter::once(("Other".to_string(), view.other_color)))
        .collect();

    let hover_view = view.clone();
    Plot::new("tree_map")
        .legend(Legend::default())
        .data_aspect(aspect as f32)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .label_formatter(move |_name: &str, value: &PlotPoint| {
            nearest(&hover_view.points, value, aspect)
                .map(MapPoint::tooltip)
                .unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for (name, color) in &buckets {
                let coords: Vec<[f64; 2]> = view
                    .points
                    .iter()
                    .filter(|p| p.color == *color)
                    .map(|p| [p.lon, p.lat])
                    .collect();
                if coords.is_empty() {
                    continue;
                }
                plot_ui.points(
                    Points::new(PlotPoints::new(coords))
                        .name(name)
                        .color(color32(*color))
                        .shape(MarkerShape::Circle)
                        .radius(2.5),
                );
            }
        });
}

fn nearest<'a>(points: &'a [MapPoint], at: &PlotPoint, aspect: f64) -> Option<&'a MapPoint> {
    let distance = |p: &MapPoint| {
        let dx = (p.lon - at.x) / aspect;
        let dy = p.lat - at.y;
        dx * dx + dy * dy
    };
    points
        .iter()
        .min_by(|a, b| distance(a).total_cmp(&distance(b)))
}

// ---------------------------------------------------------------------------
// Top species bar chart
// ---------------------------------------------------------------------------

/// Horizontal bars, most common species on top.
pub fn species_bars(ui: &mut Ui, state: &mut AppState) {
    if empty_notice(ui, state) {
        return;
    }
    let Some(entries) = state.bar_entries() else {
        return;
    };

    let n = entries.len();
    // Position 0 is the bottom bar.
    let names: Vec<String> = entries.iter().rev().map(|e| e.species.clone()).collect();
    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(rank, entry)| {
            Bar::new((n - 1 - rank) as f64, entry.count as f64)
                .name(&entry.species)
                .fill(color32(entry.color))
                .width(0.8)
        })
        .collect();

    Plot::new("species_bars")
        .x_axis_label("Number of trees")
        .y_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_at(mark.value, &names)
        })
        .show_grid([true, false])
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
        });
}

// ---------------------------------------------------------------------------
// Diameter by neighborhood
// ---------------------------------------------------------------------------

/// One colored series per species over the selected neighborhoods.
pub fn diameter_scatter(ui: &mut Ui, state: &mut AppState) {
    if empty_notice(ui, state) {
        return;
    }
    let Some(view) = state.scatter_view() else {
        return;
    };
    if view.is_empty() {
        ui.label(RichText::new("Select at least one neighborhood with measured trees.").italics());
        return;
    }
    ui.label(format!("{} trees", view.len()));

    let names = view.neighborhoods.clone();
    let hover_names = view.neighborhoods.clone();
    Plot::new("diameter_scatter")
        .legend(Legend::default())
        .x_axis_label("Neighborhood")
        .y_axis_label("Diameter (in)")
        .x_axis_formatter(move |mark: GridMark, _range: &RangeInclusive<f64>| {
            category_at(mark.value, &names)
        })
        .label_formatter(move |name: &str, value: &PlotPoint| {
            let neighborhood = category_at(value.x.round(), &hover_names);
            format!("{name}\n{neighborhood}\nDBH: {:.1}", value.y)
        })
        .show(ui, |plot_ui| {
            for series in &view.series {
                let coords: Vec<[f64; 2]> = series
                    .points
                    .iter()
                    .map(|p| [p.x as f64, p.dbh_in])
                    .collect();
                plot_ui.points(
                    Points::new(PlotPoints::new(coords))
                        .name(&series.species)
                        .color(color32(series.color))
                        .shape(MarkerShape::Circle)
                        .radius(3.0),
                );
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_marks_only_on_integers() {
        let names = vec!["Allston".to_string(), "Back Bay".to_string()];
        assert_eq!(category_at(1.0, &names), "Back Bay");
        assert_eq!(category_at(0.5, &names), "");
        assert_eq!(category_at(-1.0, &names), "");
        assert_eq!(category_at(7.0, &names), "");
    }
}
