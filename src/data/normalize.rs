use chrono::{DateTime, NaiveDate, NaiveDateTime};

use super::model::{CellValue, Column, Table};

/// Columns coerced to numbers; failures become null.
const NUMERIC_COLUMNS: [Column; 4] = [Column::DbhIn, Column::NumStems, Column::Lon, Column::Lat];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Bring a loaded table onto the canonical schema.
///
/// Lowercases and renames columns, coerces the numeric and date columns,
/// drops rows without both coordinates and trims common species names.
/// Running it on its own output changes nothing.
pub fn normalize(mut table: Table) -> Table {
    if table.is_empty() {
        return table;
    }

    rename_columns(&mut table.columns);

    for column in NUMERIC_COLUMNS {
        map_column(&mut table, column, coerce_number);
    }
    map_column(&mut table, Column::DatePlanted, coerce_date);
    map_column(&mut table, Column::SpeciesCommon, trim_text);

    let before = table.len();
    match (
        table.column_index(Column::Lat.name()),
        table.column_index(Column::Lon.name()),
    ) {
        (Some(lat), Some(lon)) => {
            let present =
                |row: &Vec<CellValue>, idx: usize| row.get(idx).is_some_and(|c| !c.is_null());
            table
                .rows
                .retain(|row| present(row, lat) && present(row, lon));
        }
        _ => {
            log::warn!("Dataset has no lat/lon columns; every row is dropped");
            table.rows.clear();
        }
    }
    let dropped = before - table.len();
    if dropped > 0 {
        log::info!("Dropped {dropped} of {before} rows without valid coordinates");
    }

    table
}

/// Lowercase, then map source names onto canonical ones. A source column is
/// left alone when its canonical name is already taken.
fn rename_columns(columns: &mut [String]) {
    for name in columns.iter_mut() {
        *name = name.to_lowercase();
    }
    for idx in 0..columns.len() {
        let Some(column) = Column::from_source_name(&columns[idx]) else {
            continue;
        };
        let target = column.name();
        if columns[idx] != target && !columns.iter().any(|c| c == target) {
            columns[idx] = target.to_string();
        }
    }
}

fn map_column(table: &mut Table, column: Column, f: fn(CellValue) -> CellValue) {
    let Some(idx) = table.column_index(column.name()) else {
        log::debug!("Column '{}' not present, skipping", column.name());
        return;
    };
    for cell in table.rows.iter_mut().filter_map(|row| row.get_mut(idx)) {
        *cell = f(std::mem::replace(cell, CellValue::Null));
    }
}

fn coerce_number(cell: CellValue) -> CellValue {
    let parsed = match &cell {
        CellValue::Number(n) => Some(*n),
        CellValue::Text(s) => s.trim().parse::<f64>().ok(),
        CellValue::Date(_) | CellValue::Null => None,
    };
    match parsed {
        Some(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Null,
    }
}

fn coerce_date(cell: CellValue) -> CellValue {
    match cell {
        CellValue::Date(_) => cell,
        CellValue::Text(s) => parse_date(&s).map_or(CellValue::Null, CellValue::Date),
        CellValue::Number(_) | CellValue::Null => CellValue::Null,
    }
}

fn trim_text(cell: CellValue) -> CellValue {
    match cell {
        CellValue::Text(s) if s.trim().len() != s.len() => CellValue::Text(s.trim().to_string()),
        other => other,
    }
}

/// Parse the date forms seen in the inventory exports. Time-of-day and
/// zone suffixes (`2019/04/15 00:00:00+00`) are discarded.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Some(date) = DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
    {
        return Some(date);
    }
    let without_zone = strip_zone(s);
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(without_zone, fmt).ok())
        .map(|dt| dt.date())
}

/// Drop a trailing `Z`, `+hh`, `+hhmm` or `-hh:mm` after a time-of-day.
fn strip_zone(s: &str) -> &str {
    if let Some(rest) = s.strip_suffix('Z') {
        return rest;
    }
    let Some(time_start) = s.find([' ', 'T']) else {
        return s;
    };
    match s[time_start..].rfind(['+', '-']) {
        Some(offset) => &s[..time_start + offset],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn source_table() -> Table {
        Table::new(
            vec![
                "SPP_COM".into(),
                "DBH".into(),
                "Date_Plant".into(),
                "X_LONGITUDE".into(),
                "Y_LATITUDE".into(),
                "Ward".into(),
            ],
            vec![
                vec![text(" Oak "), text("10"), text("2019/04/15 00:00:00+00"), text("-71.0"), text("42.3"), text("3")],
                vec![text("Oak"), text("12"), CellValue::Null, text("-71.1"), CellValue::Null, text("4")],
                vec![text("Maple"), text("n/a"), text("someday"), text("-71.2"), text("42.4"), CellValue::Null],
            ],
        )
    }

    #[test]
    fn renames_coerces_and_drops() {
        let table = normalize(source_table());

        assert_eq!(
            table.columns,
            vec!["species_common", "dbh_in", "date_planted", "lon", "lat", "ward"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0][0], text("Oak"));
        assert_eq!(table.rows[0][1], CellValue::Number(10.0));
        assert_eq!(
            table.rows[0][2],
            CellValue::Date(NaiveDate::from_ymd_opt(2019, 4, 15).unwrap())
        );
        assert_eq!(table.rows[0][5], text("3"));
        assert_eq!(table.rows[1][0], text("Maple"));
        assert_eq!(table.rows[1][1], CellValue::Null);
        assert_eq!(table.rows[1][2], CellValue::Null);
    }

    #[test]
    fn normalizing_twice_changes_nothing() {
        let once = normalize(source_table());
        let twice = normalize(once.clone());
        assert_eq!(once, twice);
    }

    #[test]
    fn empty_table_passes_through() {
        assert_eq!(normalize(Table::empty()), Table::empty());
    }

    #[test]
    fn missing_coordinate_column_drops_every_row() {
        let table = Table::new(vec!["spp_com".into()], vec![vec![text("Oak")]]);
        let table = normalize(table);
        assert!(table.is_empty());
        assert_eq!(table.columns, vec!["species_common"]);
    }

    #[test]
    fn existing_canonical_name_wins_over_source_name() {
        let mut columns = vec!["STREET".to_string(), "street_name".to_string()];
        rename_columns(&mut columns);
        assert_eq!(columns, vec!["street", "street_name"]);
    }

    #[test]
    fn non_finite_numbers_become_null() {
        assert_eq!(coerce_number(text("NaN")), CellValue::Null);
        assert_eq!(coerce_number(text("inf")), CellValue::Null);
        assert_eq!(coerce_number(text(" 7.5 ")), CellValue::Number(7.5));
    }

    #[test]
    fn parses_common_date_forms() {
        let d = NaiveDate::from_ymd_opt(2015, 6, 1).unwrap();
        assert_eq!(parse_date("2015-06-01"), Some(d));
        assert_eq!(parse_date("2015/06/01"), Some(d));
        assert_eq!(parse_date("06/01/2015"), Some(d));
        assert_eq!(parse_date("2015-06-01T08:30:00Z"), Some(d));
        assert_eq!(parse_date("2015-06-01 08:30:00-05:00"), Some(d));
        assert_eq!(parse_date("2015/06/01 00:00:00+00"), Some(d));
        assert_eq!(parse_date("2015-06-01 08:30"), Some(d));
        assert_eq!(parse_date("2015-06-01 00:00:00.000"), Some(d));
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("2015-13-45"), None);
    }
}
