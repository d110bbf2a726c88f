use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell. The loader produces `Text`/`Null` (plus `Number`
/// for JSON input); the normalizer coerces the known numeric and date columns.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Null,
}

// -- Manual Eq/Ord/Hash so cells can key maps and sets --

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn rank(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Number(_) => 1,
                Date(_) => 2,
                Text(_) => 3,
            }
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Number(a), Number(b)) => a.total_cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => rank(self).cmp(&rank(other)),
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) => s.hash(state),
            CellValue::Number(n) => n.to_bits().hash(state),
            CellValue::Date(d) => d.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(n) => write!(f, "{}", format_number(*n)),
            CellValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text view of the cell; numbers are rendered so that numeric ids
    /// coming from JSON input still read as ids.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }
}

/// Whole numbers print without a fractional part (`12`, not `12.0`).
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// ---------------------------------------------------------------------------
// Table – untyped rows as produced by the loader
// ---------------------------------------------------------------------------

/// Column names plus rows of cells. Every row has exactly `columns.len()`
/// cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Table { columns, rows }
    }

    /// Zero rows, zero columns.
    pub fn empty() -> Self {
        Table::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

// ---------------------------------------------------------------------------
// Column – the canonical schema
// ---------------------------------------------------------------------------

/// Canonical tree-inventory columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    TreeId,
    SpeciesCommon,
    SpeciesBotanical,
    NumStems,
    DbhRange,
    DbhIn,
    DatePlanted,
    Neighborhood,
    ParkName,
    ParkId,
    StreetNumber,
    StreetName,
    Suffix,
    Lon,
    Lat,
}

impl Column {
    /// Schema order.
    pub const ALL: [Column; 15] = [
        Column::TreeId,
        Column::SpeciesCommon,
        Column::SpeciesBotanical,
        Column::NumStems,
        Column::DbhRange,
        Column::DbhIn,
        Column::DatePlanted,
        Column::Neighborhood,
        Column::ParkName,
        Column::ParkId,
        Column::StreetNumber,
        Column::StreetName,
        Column::Suffix,
        Column::Lon,
        Column::Lat,
    ];

    /// Canonical (normalized) column name.
    pub fn name(self) -> &'static str {
        match self {
            Column::TreeId => "tree_id",
            Column::SpeciesCommon => "species_common",
            Column::SpeciesBotanical => "species_botanical",
            Column::NumStems => "num_stems",
            Column::DbhRange => "dbh_range",
            Column::DbhIn => "dbh_in",
            Column::DatePlanted => "date_planted",
            Column::Neighborhood => "neighborhood",
            Column::ParkName => "park_name",
            Column::ParkId => "park_id",
            Column::StreetNumber => "street_number",
            Column::StreetName => "street_name",
            Column::Suffix => "suffix",
            Column::Lon => "lon",
            Column::Lat => "lat",
        }
    }

    /// Lowercased name of the column in the published inventory CSV.
    pub fn source_name(self) -> &'static str {
        match self {
            Column::TreeId => "id",
            Column::SpeciesCommon => "spp_com",
            Column::SpeciesBotanical => "spp_bot",
            Column::NumStems => "numberof_st",
            Column::DbhRange => "dbh_range",
            Column::DbhIn => "dbh",
            Column::DatePlanted => "date_plant",
            Column::Neighborhood => "neighborhood",
            Column::ParkName => "park",
            Column::ParkId => "os_id",
            Column::StreetNumber => "address",
            Column::StreetName => "street",
            Column::Suffix => "suffix",
            Column::Lon => "x_longitude",
            Column::Lat => "y_latitude",
        }
    }

    /// Human-readable label used by the table view.
    pub fn display_label(self) -> &'static str {
        match self {
            Column::TreeId => "Tree ID",
            Column::SpeciesCommon => "Species Common",
            Column::SpeciesBotanical => "Species Botanical",
            Column::NumStems => "Number of Stems",
            Column::DbhRange => "Diameter Range (in)",
            Column::DbhIn => "Diameter (in)",
            Column::DatePlanted => "Date Planted",
            Column::Neighborhood => "Neighborhood",
            Column::ParkName => "Park Name",
            Column::ParkId => "Park ID",
            Column::StreetNumber => "Street Number",
            Column::StreetName => "Street Name",
            Column::Suffix => "Suffix",
            Column::Lon => "Longitude",
            Column::Lat => "Latitude",
        }
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }

    pub fn from_source_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.source_name() == name)
    }
}

// ---------------------------------------------------------------------------
// TreeRecord – one tree, schema-checked
// ---------------------------------------------------------------------------

/// One row of the normalized inventory. Coordinates are mandatory; every
/// other canonical field may be missing in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct TreeRecord {
    pub tree_id: Option<String>,
    pub species_common: Option<String>,
    pub species_botanical: Option<String>,
    pub num_stems: Option<f64>,
    pub dbh_range: Option<String>,
    pub dbh_in: Option<f64>,
    pub date_planted: Option<NaiveDate>,
    pub neighborhood: Option<String>,
    pub park_name: Option<String>,
    pub park_id: Option<String>,
    pub street_number: Option<String>,
    pub street_name: Option<String>,
    pub suffix: Option<String>,
    pub lon: f64,
    pub lat: f64,
    /// Columns outside the canonical schema, carried through untouched.
    pub extra: BTreeMap<String, CellValue>,
}

impl TreeRecord {
    /// Text fields as borrowed strings; `None` for numeric/date columns.
    pub fn text(&self, column: Column) -> Option<&str> {
        let field = match column {
            Column::TreeId => &self.tree_id,
            Column::SpeciesCommon => &self.species_common,
            Column::SpeciesBotanical => &self.species_botanical,
            Column::DbhRange => &self.dbh_range,
            Column::Neighborhood => &self.neighborhood,
            Column::ParkName => &self.park_name,
            Column::ParkId => &self.park_id,
            Column::StreetNumber => &self.street_number,
            Column::StreetName => &self.street_name,
            Column::Suffix => &self.suffix,
            Column::NumStems | Column::DbhIn | Column::DatePlanted | Column::Lon | Column::Lat => {
                return None
            }
        };
        field.as_deref()
    }

    /// Any canonical field as a cell.
    pub fn get(&self, column: Column) -> CellValue {
        let number = |v: Option<f64>| v.map_or(CellValue::Null, CellValue::Number);
        match column {
            Column::NumStems => number(self.num_stems),
            Column::DbhIn => number(self.dbh_in),
            Column::Lon => CellValue::Number(self.lon),
            Column::Lat => CellValue::Number(self.lat),
            Column::DatePlanted => self.date_planted.map_or(CellValue::Null, CellValue::Date),
            text => self
                .text(text)
                .map_or(CellValue::Null, |s| CellValue::Text(s.to_string())),
        }
    }
}

const NULL_CELL: &CellValue = &CellValue::Null;

// ---------------------------------------------------------------------------
// TreeTable – the typed, read-only dataset
// ---------------------------------------------------------------------------

/// Typed view of a normalized [`Table`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeTable {
    pub records: Vec<TreeRecord>,
    /// Column names in table order (canonical and pass-through).
    pub columns: Vec<String>,
}

impl TreeTable {
    /// Check the schema once and lift rows into [`TreeRecord`]s.
    ///
    /// Rows without both coordinates as numbers are skipped, so a table that
    /// did not go through the normalizer still upholds the invariant.
    pub fn from_table(table: &Table) -> Self {
        let canonical: BTreeMap<Column, usize> = Column::ALL
            .iter()
            .filter_map(|&c| table.column_index(c.name()).map(|idx| (c, idx)))
            .collect();
        let extra_columns: Vec<(usize, &String)> = table
            .columns
            .iter()
            .enumerate()
            .filter(|(_, name)| Column::from_name(name).is_none())
            .collect();

        let mut records = Vec::with_capacity(table.len());
        let mut skipped = 0usize;

        for row in &table.rows {
            let cell = |c: Column| {
                canonical
                    .get(&c)
                    .and_then(|&idx| row.get(idx))
                    .unwrap_or(NULL_CELL)
            };
            let (Some(lon), Some(lat)) = (cell(Column::Lon).as_f64(), cell(Column::Lat).as_f64())
            else {
                skipped += 1;
                continue;
            };
            let extra = extra_columns
                .iter()
                .map(|(idx, name)| {
                    let value = row.get(*idx).cloned().unwrap_or(CellValue::Null);
                    ((*name).clone(), value)
                })
                .collect();

            records.push(TreeRecord {
                tree_id: cell(Column::TreeId).as_text(),
                species_common: cell(Column::SpeciesCommon).as_text(),
                species_botanical: cell(Column::SpeciesBotanical).as_text(),
                num_stems: cell(Column::NumStems).as_f64(),
                dbh_range: cell(Column::DbhRange).as_text(),
                dbh_in: cell(Column::DbhIn).as_f64(),
                date_planted: cell(Column::DatePlanted).as_date(),
                neighborhood: cell(Column::Neighborhood).as_text(),
                park_name: cell(Column::ParkName).as_text(),
                park_id: cell(Column::ParkId).as_text(),
                street_number: cell(Column::StreetNumber).as_text(),
                street_name: cell(Column::StreetName).as_text(),
                suffix: cell(Column::Suffix).as_text(),
                lon,
                lat,
                extra,
            });
        }

        if skipped > 0 {
            log::warn!("Skipped {skipped} rows without numeric coordinates");
        }

        TreeTable {
            records,
            columns: table.columns.clone(),
        }
    }

    /// Whether the source carried this canonical column at all.
    pub fn has(&self, column: Column) -> bool {
        self.columns.iter().any(|c| c == column.name())
    }

    /// New table holding the records at `indices`, in the given order.
    pub fn select(&self, indices: &[usize]) -> TreeTable {
        TreeTable {
            records: indices
                .iter()
                .filter_map(|&i| self.records.get(i).cloned())
                .collect(),
            columns: self.columns.clone(),
        }
    }

    /// New table with the records matching `keep`.
    pub fn subset(&self, keep: impl Fn(&TreeRecord) -> bool) -> TreeTable {
        TreeTable {
            records: self.records.iter().filter(|r| keep(r)).cloned().collect(),
            columns: self.columns.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
