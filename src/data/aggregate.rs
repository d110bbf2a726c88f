use std::collections::HashMap;

use super::model::{CellValue, Column, TreeRecord};

/// One ranked category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

/// The `n` most frequent non-null values of `column`.
///
/// Sorted by count, descending; equal counts keep the order in which the
/// values were first seen.
pub fn top_n<'a>(
    records: impl IntoIterator<Item = &'a TreeRecord>,
    column: Column,
    n: usize,
) -> Vec<CategoryCount> {
    // value -> (first seen position, count)
    let mut counts: HashMap<CellValue, (usize, usize)> = HashMap::new();
    for tree in records {
        let value = tree.get(column);
        if value.is_null() {
            continue;
        }
        let next = counts.len();
        counts.entry(value).or_insert((next, 0)).1 += 1;
    }

    let mut ranked: Vec<(CellValue, usize, usize)> = counts
        .into_iter()
        .map(|(value, (first, count))| (value, first, count))
        .collect();
    ranked.sort_by(|a, b| b.2.cmp(&a.2).then(a.1.cmp(&b.1)));
    ranked.truncate(n);

    ranked
        .into_iter()
        .map(|(value, _, count)| CategoryCount {
            category: value.to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn tree(species: Option<&str>, dbh: Option<f64>) -> TreeRecord {
        TreeRecord {
            tree_id: None,
            species_common: species.map(str::to_string),
            species_botanical: None,
            num_stems: None,
            dbh_range: None,
            dbh_in: dbh,
            date_planted: None,
            neighborhood: None,
            park_name: None,
            park_id: None,
            street_number: None,
            street_name: None,
            suffix: None,
            lon: -71.0,
            lat: 42.3,
            extra: BTreeMap::new(),
        }
    }

    fn counts(ranking: &[CategoryCount]) -> Vec<(&str, usize)> {
        ranking
            .iter()
            .map(|c| (c.category.as_str(), c.count))
            .collect()
    }

    #[test]
    fn ranks_by_count_then_first_seen() {
        let trees = vec![
            tree(Some("Linden"), None),
            tree(Some("Oak"), None),
            tree(Some("Maple"), None),
            tree(Some("Oak"), None),
            tree(None, None),
            tree(Some("Maple"), None),
            tree(Some("Elm"), None),
        ];
        let ranking = top_n(&trees, Column::SpeciesCommon, 10);
        assert_eq!(
            counts(&ranking),
            vec![("Oak", 2), ("Maple", 2), ("Linden", 1), ("Elm", 1)]
        );
    }

    #[test]
    fn truncates_to_n() {
        let trees = vec![
            tree(Some("Oak"), None),
            tree(Some("Maple"), None),
            tree(Some("Elm"), None),
        ];
        assert_eq!(top_n(&trees, Column::SpeciesCommon, 2).len(), 2);
        assert!(top_n(&trees, Column::SpeciesCommon, 0).is_empty());
    }

    #[test]
    fn numeric_columns_rank_by_value() {
        let trees = vec![tree(None, Some(4.0)), tree(None, Some(4.0)), tree(None, Some(6.5))];
        let ranking = top_n(&trees, Column::DbhIn, 5);
        assert_eq!(counts(&ranking), vec![("4", 2), ("6.5", 1)]);
    }

    #[test]
    fn empty_input_gives_empty_ranking() {
        let trees: Vec<TreeRecord> = Vec::new();
        assert!(top_n(&trees, Column::SpeciesCommon, 30).is_empty());
    }
}
