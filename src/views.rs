//! View models the pages draw from. They only depend on the data layer, so
//! everything here can be checked without a window.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::color::{self, ColorMap, Rgb, DEFAULT_COLOR, MAP_PALETTE};
use crate::data::aggregate::top_n;
use crate::data::model::{format_number, Column, TreeRecord, TreeTable};

// ---------------------------------------------------------------------------
// Table view
// ---------------------------------------------------------------------------

/// A column of the table view, with its display header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableColumn {
    Canonical(Column),
    /// A source column outside the schema, shown under its own name.
    Extra(String),
}

impl TableColumn {
    pub fn header(&self) -> &str {
        match self {
            TableColumn::Canonical(column) => column.display_label(),
            TableColumn::Extra(name) => name,
        }
    }

    pub fn cell(&self, tree: &TreeRecord) -> String {
        match self {
            TableColumn::Canonical(column) => tree.get(*column).to_string(),
            TableColumn::Extra(name) => tree
                .extra
                .get(name)
                .map(|v| v.to_string())
                .unwrap_or_default(),
        }
    }
}

/// Columns of `table` in order, relabelled for display.
pub fn table_columns(table: &TreeTable) -> Vec<TableColumn> {
    table
        .columns
        .iter()
        .map(|name| match Column::from_name(name) {
            Some(column) => TableColumn::Canonical(column),
            None => TableColumn::Extra(name.clone()),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Map view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct MapPoint {
    pub lon: f64,
    pub lat: f64,
    pub color: Rgb,
    pub species: Option<String>,
    pub dbh_in: Option<f64>,
    pub street_name: Option<String>,
}

impl MapPoint {
    /// Hover text: species, diameter and street.
    pub fn tooltip(&self) -> String {
        format!(
            "Species: {}\nDBH: {}\nStreet: {}",
            self.species.as_deref().unwrap_or("-"),
            self.dbh_in.map(format_number).unwrap_or_else(|| "-".into()),
            self.street_name.as_deref().unwrap_or("-"),
        )
    }
}

/// Sampled, colored points for the map page.
#[derive(Debug, Clone, PartialEq)]
pub struct MapView {
    pub points: Vec<MapPoint>,
    /// Top species and their colors, in rank order.
    pub legend: Vec<(String, Rgb)>,
    pub other_color: Rgb,
    /// Median (lat, lon) of the drawn points.
    pub center: Option<(f64, f64)>,
    /// Trees matching the filters before sampling.
    pub matched: usize,
}

impl MapView {
    /// Color the matching trees by their top-`top` species rank, then draw
    /// a seeded sample of at most `max_points`.
    pub fn build(
        table: &TreeTable,
        indices: &[usize],
        top: usize,
        max_points: usize,
        seed: u64,
    ) -> Self {
        let trees: Vec<&TreeRecord> = indices
            .iter()
            .filter_map(|&i| table.records.get(i))
            .collect();
        let ranking = top_n(trees.iter().copied(), Column::SpeciesCommon, top);
        let colors = ColorMap::from_ranking(&ranking, &MAP_PALETTE, DEFAULT_COLOR);

        let points: Vec<MapPoint> = sample_indices(trees.len(), max_points, seed)
            .into_iter()
            .map(|i| {
                let tree = trees[i];
                MapPoint {
                    lon: tree.lon,
                    lat: tree.lat,
                    color: colors.color_for(tree.species_common.as_deref()),
                    species: tree.species_common.clone(),
                    dbh_in: tree.dbh_in,
                    street_name: tree.street_name.clone(),
                }
            })
            .collect();

        let center = match (
            median(points.iter().map(|p| p.lat)),
            median(points.iter().map(|p| p.lon)),
        ) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        };

        MapView {
            points,
            legend: colors.legend_entries().to_vec(),
            other_color: colors.default_color(),
            center,
            matched: trees.len(),
        }
    }
}

/// Positions `0..len` to draw, at most `max`, in ascending order.
///
/// The same `(len, max, seed)` always yields the same sample.
pub fn sample_indices(len: usize, max: usize, seed: u64) -> Vec<usize> {
    if len <= max {
        return (0..len).collect();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, len, max).into_vec();
    picked.sort_unstable();
    picked
}

fn median(values: impl Iterator<Item = f64>) -> Option<f64> {
    let mut values: Vec<f64> = values.collect();
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

// ---------------------------------------------------------------------------
// Bar view
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct BarEntry {
    pub species: String,
    pub count: usize,
    pub color: Rgb,
}

/// The `n` most common species, shaded along viridis by rank.
pub fn bar_entries(table: &TreeTable, n: usize) -> Vec<BarEntry> {
    top_n(&table.records, Column::SpeciesCommon, n)
        .into_iter()
        .zip(color::viridis(n))
        .map(|(entry, color)| BarEntry {
            species: entry.category,
            count: entry.count,
            color,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Scatter view
// ---------------------------------------------------------------------------

pub const UNKNOWN_SPECIES: &str = "(unknown)";

#[derive(Debug, Clone, PartialEq)]
pub struct ScatterPoint {
    /// Position of the neighborhood on the x axis.
    pub x: usize,
    pub dbh_in: f64,
    pub park_name: Option<String>,
    pub street_name: Option<String>,
}

/// All points of one species.
#[derive(Debug, Clone, PartialEq)]
pub struct ScatterSeries {
    pub species: String,
    pub color: Rgb,
    pub points: Vec<ScatterPoint>,
}

/// Diameter by neighborhood, one series per species.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScatterView {
    /// x-axis categories, sorted.
    pub neighborhoods: Vec<String>,
    pub series: Vec<ScatterSeries>,
}

impl ScatterView {
    /// Trees without a neighborhood or diameter have no place on the chart
    /// and are left out.
    pub fn build(table: &TreeTable, indices: &[usize]) -> Self {
        let plotted: Vec<(&str, f64, &TreeRecord)> = indices
            .iter()
            .filter_map(|&i| table.records.get(i))
            .filter_map(|tree| Some((tree.neighborhood.as_deref()?, tree.dbh_in?, tree)))
            .collect();

        let neighborhoods: Vec<String> = plotted
            .iter()
            .map(|(n, _, _)| *n)
            .collect::<std::collections::BTreeSet<&str>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut by_species: BTreeMap<&str, Vec<ScatterPoint>> = BTreeMap::new();
        for (neighborhood, dbh_in, tree) in plotted {
            let x = neighborhoods
                .binary_search_by(|n| n.as_str().cmp(neighborhood))
                .unwrap_or_default();
            by_species
                .entry(tree.species_common.as_deref().unwrap_or(UNKNOWN_SPECIES))
                .or_default()
                .push(ScatterPoint {
                    x,
                    dbh_in,
                    park_name: tree.park_name.clone(),
                    street_name: tree.street_name.clone(),
                });
        }

        let palette = color::generate_palette(by_species.len());
        let series = by_species
            .into_iter()
            .zip(palette)
            .map(|((species, points), color)| ScatterSeries {
                species: species.to_string(),
                color,
                points,
            })
            .collect();

        ScatterView {
            neighborhoods,
            series,
        }
    }

    pub fn len(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::CellValue;

    fn tree(species: &str, neighborhood: Option<&str>, dbh: Option<f64>, lat: f64) -> TreeRecord {
        TreeRecord {
            tree_id: None,
            species_common: Some(species.to_string()),
            species_botanical: None,
            num_stems: None,
            dbh_range: None,
            dbh_in: dbh,
            date_planted: None,
            neighborhood: neighborhood.map(str::to_string),
            park_name: Some("Common".to_string()),
            park_id: None,
            street_number: None,
            street_name: Some("Beacon".to_string()),
            suffix: None,
            lon: -71.0,
            lat,
            extra: [("ward".to_string(), CellValue::Text("5".into()))].into(),
        }
    }

    fn table() -> TreeTable {
        TreeTable {
            records: vec![
                tree("Oak", Some("Back Bay"), Some(10.0), 42.0),
                tree("Maple", Some("Allston"), Some(8.0), 42.25),
                tree("Oak", None, Some(12.0), 42.5),
                tree("Elm", Some("Back Bay"), None, 42.75),
            ],
            columns: ["tree_id", "species_common", "dbh_in", "lon", "lat", "ward"]
                .map(String::from)
                .to_vec(),
        }
    }

    #[test]
    fn table_columns_use_display_labels() {
        let table = table();
        let columns = table_columns(&table);
        let headers: Vec<&str> = columns.iter().map(|c| c.header()).collect();
        assert_eq!(
            headers,
            vec!["Tree ID", "Species Common", "Diameter (in)", "Longitude", "Latitude", "ward"]
        );
        assert_eq!(columns[2].cell(&table.records[0]), "10");
        assert_eq!(columns[5].cell(&table.records[0]), "5");
        assert_eq!(columns[0].cell(&table.records[0]), "");
    }

    #[test]
    fn map_colors_top_species_before_sampling() {
        let table = table();
        let view = MapView::build(&table, &[0, 1, 2, 3], 1, 3000, 42);
        assert_eq!(view.matched, 4);
        assert_eq!(view.points.len(), 4);
        assert_eq!(view.legend, vec![("Oak".to_string(), MAP_PALETTE[0])]);
        assert_eq!(view.points[0].color, MAP_PALETTE[0]);
        assert_eq!(view.points[1].color, DEFAULT_COLOR);
        assert_eq!(view.center, Some((42.375, -71.0)));
    }

    #[test]
    fn map_sample_is_bounded_and_repeatable() {
        let a = sample_indices(10_000, 3000, 42);
        let b = sample_indices(10_000, 3000, 42);
        assert_eq!(a.len(), 3000);
        assert_eq!(a, b);
        assert!(a.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(sample_indices(5, 3000, 42), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn empty_map_has_no_center() {
        let view = MapView::build(&TreeTable::default(), &[], 10, 3000, 42);
        assert!(view.points.is_empty());
        assert!(view.legend.is_empty());
        assert_eq!(view.center, None);
    }

    #[test]
    fn bars_follow_ranking_with_viridis_colors() {
        let bars = bar_entries(&table(), 30);
        assert_eq!(bars.len(), 3);
        assert_eq!((bars[0].species.as_str(), bars[0].count), ("Oak", 2));
        assert_eq!(bars[0].color, color::viridis(30)[0]);
        assert_ne!(bars[0].color, bars[1].color);
    }

    #[test]
    fn scatter_groups_by_species_over_sorted_neighborhoods() {
        let view = ScatterView::build(&table(), &[0, 1, 2, 3]);
        assert_eq!(view.neighborhoods, vec!["Allston", "Back Bay"]);
        assert_eq!(view.len(), 2);
        let species: Vec<&str> = view.series.iter().map(|s| s.species.as_str()).collect();
        assert_eq!(species, vec!["Maple", "Oak"]);
        assert_eq!(view.series[0].points[0].x, 0);
        assert_eq!(view.series[1].points[0].x, 1);
        assert_eq!(view.series[1].points[0].park_name.as_deref(), Some("Common"));
    }
}
