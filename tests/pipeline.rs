use std::io::Write;

use boston_trees::color::{ColorMap, DEFAULT_COLOR, MAP_PALETTE};
use boston_trees::data::aggregate::{top_n, CategoryCount};
use boston_trees::data::filter::{apply, filtered_indices, DiameterRange, FilterOptions, FilterSpec};
use boston_trees::data::loader::{self, LoadOptions};
use boston_trees::data::model::{CellValue, Column, Table, TreeTable};
use boston_trees::data::normalize::normalize;
use boston_trees::data::load_trees;
use proptest::prelude::*;

fn csv_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn three_tree_csv() -> tempfile::NamedTempFile {
    csv_file(
        "SPP_COM,Y_LATITUDE,X_LONGITUDE,DBH\n\
         Oak,42.3,-71.0,10\n\
         Oak,,-71.1,12\n\
         Maple,42.4,-71.2,8\n",
    )
}

#[test]
fn three_rows_normalize_to_two_and_rank_first_seen() {
    let file = three_tree_csv();
    let trees = load_trees(file.path(), &LoadOptions::default());
    assert_eq!(trees.len(), 2);

    let ranking = top_n(&trees.records, Column::SpeciesCommon, 5);
    assert_eq!(
        ranking,
        vec![
            CategoryCount { category: "Oak".into(), count: 1 },
            CategoryCount { category: "Maple".into(), count: 1 },
        ]
    );
}

#[test]
fn diameter_between_nine_and_eleven_keeps_the_oak() {
    let file = three_tree_csv();
    let trees = load_trees(file.path(), &LoadOptions::default());
    let spec = FilterSpec {
        diameter: Some(DiameterRange::new(9.0, 11.0)),
        ..Default::default()
    };
    let matched = apply(&trees, &spec);
    assert_eq!(matched.len(), 1);
    assert_eq!(matched.records[0].species_common.as_deref(), Some("Oak"));
    assert_eq!(matched.records[0].dbh_in, Some(10.0));
}

#[test]
fn empty_file_flows_through_every_stage() {
    let file = csv_file("");
    let table = loader::try_load(file.path(), &LoadOptions::default()).unwrap();
    assert!(table.is_empty());

    let normalized = normalize(table);
    assert!(normalized.is_empty());
    let trees = TreeTable::from_table(&normalized);
    assert!(trees.is_empty());
    assert!(filtered_indices(&trees, &FilterSpec::default()).is_empty());
    let spec = FilterSpec {
        species: ["Oak".to_string()].into(),
        diameter: Some(DiameterRange::new(0.0, 50.0)),
        ..Default::default()
    };
    assert!(apply(&trees, &spec).is_empty());
    assert!(top_n(&trees.records, Column::SpeciesCommon, 30).is_empty());
}

#[test]
fn missing_value_markers_never_become_categories() {
    let file = csv_file(
        "SPP_COM,NEIGHBORHOOD,X_LONGITUDE,Y_LATITUDE\n\
         NA,N/A,-71.0,42.3\n\
         nan,null,-71.1,42.3\n\
         Oak,Roxbury,-71.2,42.4\n",
    );
    let trees = load_trees(file.path(), &LoadOptions::default());
    assert_eq!(trees.len(), 3);

    let options = FilterOptions::from_table(&trees);
    assert_eq!(options.species, vec!["Oak"]);
    assert_eq!(options.neighborhoods, vec!["Roxbury"]);
    assert_eq!(
        top_n(&trees.records, Column::SpeciesCommon, 30),
        vec![CategoryCount { category: "Oak".into(), count: 1 }]
    );
}

#[test]
fn unreadable_file_degrades_to_empty() {
    let dir = tempfile::tempdir().unwrap();
    let trees = load_trees(&dir.path().join("nope.csv"), &LoadOptions::default());
    assert!(trees.is_empty());
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

const SOURCE_COLUMNS: [&str; 6] = ["SPP_COM", "DBH", "NEIGHBORHOOD", "STREET", "X_LONGITUDE", "Y_LATITUDE"];

fn text_cell(values: &'static [&'static str]) -> impl Strategy<Value = CellValue> {
    prop_oneof![
        1 => Just(CellValue::Null),
        4 => prop::sample::select(values).prop_map(|s| CellValue::Text(s.to_string())),
    ]
}

fn number_cell(range: std::ops::Range<f64>) -> impl Strategy<Value = CellValue> {
    prop_oneof![
        1 => Just(CellValue::Null),
        1 => Just(CellValue::Text("n/a".into())),
        6 => range.prop_map(|v| CellValue::Text(v.to_string())),
    ]
}

fn raw_table() -> impl Strategy<Value = Table> {
    let row = (
        text_cell(&["Oak", " Oak ", "Maple", "Elm", "Linden", ""]),
        number_cell(0.0..40.0),
        text_cell(&["Roxbury", "Allston", "Fenway"]),
        text_cell(&["Beacon", "Centre", "Tremont"]),
        number_cell(-71.2..-70.9),
        number_cell(42.2..42.4),
    )
        .prop_map(|(a, b, c, d, e, f)| vec![a, b, c, d, e, f]);
    prop::collection::vec(row, 0..40).prop_map(|rows| {
        Table::new(SOURCE_COLUMNS.iter().map(|c| c.to_string()).collect(), rows)
    })
}

fn spec_strategy() -> impl Strategy<Value = FilterSpec> {
    (
        prop::collection::btree_set(prop::sample::select(vec!["Oak", "Maple", "Elm"]), 0..3),
        prop::collection::btree_set(prop::sample::select(vec!["Roxbury", "Fenway"]), 0..2),
        prop::option::of((0.0..20.0f64, 0.0..20.0f64)),
    )
        .prop_map(|(species, neighborhoods, diameter)| FilterSpec {
            species: species.into_iter().map(str::to_string).collect(),
            neighborhoods: neighborhoods.into_iter().map(str::to_string).collect(),
            streets: Default::default(),
            diameter: diameter.map(|(a, b)| DiameterRange::new(a.min(b), a.max(b))),
        })
}

proptest! {
    #[test]
    fn prop_normalize_is_idempotent(table in raw_table()) {
        let once = normalize(table);
        let twice = normalize(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_normalized_rows_have_coordinates(table in raw_table()) {
        let normalized = normalize(table);
        let lat = normalized.column_index("lat");
        let lon = normalized.column_index("lon");
        for row in &normalized.rows {
            for idx in [lat, lon] {
                let idx = idx.expect("coordinate columns survive renaming");
                prop_assert!(row[idx].as_f64().is_some());
            }
        }
        prop_assert_eq!(TreeTable::from_table(&normalized).len(), normalized.len());
    }

    #[test]
    fn prop_empty_filter_is_identity(table in raw_table()) {
        let trees = TreeTable::from_table(&normalize(table));
        prop_assert_eq!(apply(&trees, &FilterSpec::default()), trees);
    }

    #[test]
    fn prop_adding_predicates_never_grows_result(table in raw_table(), spec in spec_strategy()) {
        let trees = TreeTable::from_table(&normalize(table));
        let base = filtered_indices(&trees, &spec);
        prop_assert!(base.len() <= trees.len());

        let mut narrower = spec.clone();
        narrower.streets.insert("Beacon".to_string());
        let narrowed = filtered_indices(&trees, &narrower);
        prop_assert!(narrowed.len() <= base.len());
        prop_assert!(narrowed.iter().all(|i| base.contains(i)));
    }

    #[test]
    fn prop_top_n_is_sorted_and_bounded(table in raw_table(), n in 0usize..8) {
        let trees = TreeTable::from_table(&normalize(table));
        let ranking = top_n(&trees.records, Column::SpeciesCommon, n);

        let distinct: std::collections::BTreeSet<&str> = trees
            .records
            .iter()
            .filter_map(|t| t.species_common.as_deref())
            .collect();
        let non_null = trees.records.iter().filter(|t| t.species_common.is_some()).count();

        prop_assert_eq!(ranking.len(), n.min(distinct.len()));
        prop_assert!(ranking.windows(2).all(|w| w[0].count >= w[1].count));
        prop_assert!(ranking.iter().map(|c| c.count).sum::<usize>() <= non_null);
    }

    #[test]
    fn prop_color_assignment_is_deterministic(table in raw_table()) {
        let trees = TreeTable::from_table(&normalize(table));
        let first = ColorMap::from_ranking(
            &top_n(&trees.records, Column::SpeciesCommon, 10),
            &MAP_PALETTE,
            DEFAULT_COLOR,
        );
        let second = ColorMap::from_ranking(
            &top_n(&trees.records, Column::SpeciesCommon, 10),
            &MAP_PALETTE,
            DEFAULT_COLOR,
        );
        prop_assert_eq!(first, second);
    }
}
