use std::collections::BTreeSet;

use super::model::{Column, TreeRecord, TreeTable};

// ---------------------------------------------------------------------------
// Filter predicates chosen in the sidebar
// ---------------------------------------------------------------------------

/// Inclusive diameter bounds, in inches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiameterRange {
    pub min: f64,
    pub max: f64,
}

impl DiameterRange {
    pub fn new(min: f64, max: f64) -> Self {
        DiameterRange { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// The predicate set of one page. All active predicates are AND-combined.
///
/// An empty selection set means "no filter" for that column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub species: BTreeSet<String>,
    pub neighborhoods: BTreeSet<String>,
    pub streets: BTreeSet<String>,
    /// `None` leaves diameters unconstrained. While set, trees without a
    /// recorded diameter never match.
    pub diameter: Option<DiameterRange>,
}

impl FilterSpec {
    /// Returns true if no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
            && self.neighborhoods.is_empty()
            && self.streets.is_empty()
            && self.diameter.is_none()
    }
}

/// Return indices of trees that pass all active filters, in table order.
///
/// Predicates on a column the dataset does not have are skipped.
pub fn filtered_indices(table: &TreeTable, spec: &FilterSpec) -> Vec<usize> {
    if spec.is_empty() {
        return (0..table.len()).collect();
    }

    let memberships: Vec<(Column, &BTreeSet<String>)> = [
        (Column::SpeciesCommon, &spec.species),
        (Column::Neighborhood, &spec.neighborhoods),
        (Column::StreetName, &spec.streets),
    ]
    .into_iter()
    .filter(|(column, selected)| !selected.is_empty() && table.has(*column))
    .collect();
    let diameter = spec.diameter.filter(|_| table.has(Column::DbhIn));

    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, tree)| matches_all(tree, &memberships, diameter))
        .map(|(i, _)| i)
        .collect()
}

/// Materialize the matching trees as a new table.
pub fn apply(table: &TreeTable, spec: &FilterSpec) -> TreeTable {
    table.select(&filtered_indices(table, spec))
}

fn matches_all(
    tree: &TreeRecord,
    memberships: &[(Column, &BTreeSet<String>)],
    diameter: Option<DiameterRange>,
) -> bool {
    for (column, selected) in memberships {
        match tree.text(*column) {
            Some(value) if selected.contains(value) => {}
            _ => return false,
        }
    }
    match (diameter, tree.dbh_in) {
        (None, _) => true,
        (Some(range), Some(dbh)) => range.contains(dbh),
        (Some(_), None) => false,
    }
}

// ---------------------------------------------------------------------------
// Option universes for the sidebar widgets
// ---------------------------------------------------------------------------

/// What each filter widget can offer, computed once from the unfiltered
/// base table so that filtering never narrows the choices.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions {
    pub species: Vec<String>,
    pub neighborhoods: Vec<String>,
    pub streets: Vec<String>,
    /// Smallest and largest recorded diameter; `None` without any.
    pub diameter: Option<DiameterRange>,
}

impl FilterOptions {
    pub fn from_table(table: &TreeTable) -> Self {
        let distinct = |column: Column| -> Vec<String> {
            table
                .records
                .iter()
                .filter_map(|tree| tree.text(column))
                .collect::<BTreeSet<&str>>()
                .into_iter()
                .map(str::to_string)
                .collect()
        };

        let diameter = table
            .records
            .iter()
            .filter_map(|tree| tree.dbh_in)
            .fold(None, |acc: Option<DiameterRange>, d| match acc {
                None => Some(DiameterRange::new(d, d)),
                Some(r) => Some(DiameterRange::new(r.min.min(d), r.max.max(d))),
            });

        FilterOptions {
            species: distinct(Column::SpeciesCommon),
            neighborhoods: distinct(Column::Neighborhood),
            streets: distinct(Column::StreetName),
            diameter,
        }
    }
}
