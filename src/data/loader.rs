use std::path::Path;

use anyhow::{bail, Context, Result};
use serde_json::Value as JsonValue;

use super::model::{CellValue, Table};
use crate::error::LoadError;

/// Options for reading the inventory file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LoadOptions {
    /// Stop after this many data rows. `None` reads the whole file.
    pub max_rows: Option<usize>,
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a table, degrading to an empty table on any failure.
///
/// The failure is logged; the caller decides how to tell the user
/// (an empty table means "no data").
pub fn load(path: &Path, options: &LoadOptions) -> Table {
    match try_load(path, options) {
        Ok(table) => table,
        Err(e) => {
            log::error!("Failed to load dataset {}: {e:#}", path.display());
            Table::empty()
        }
    }
}

/// Load a table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv` / `.txt` – comma-delimited with a header row
/// * `.tsv`          – tab-delimited with a header row
/// * `.json`         – `[{ "SPP_COM": "Oak", ... }, ...]`
pub fn try_load(path: &Path, options: &LoadOptions) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" | "txt" => load_delimited(path, b',', options)?,
        "tsv" => load_delimited(path, b'\t', options)?,
        "json" => load_json(path, options)?,
        other => bail!(LoadError::UnsupportedFormat(other.to_string())),
    };

    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );
    Ok(table)
}

// ---------------------------------------------------------------------------
// Delimited loader
// ---------------------------------------------------------------------------

/// Header row with column names, one tree per line.
/// Every cell stays text; typing happens in the normalizer.
fn load_delimited(path: &Path, delimiter: u8, options: &LoadOptions) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let columns: Vec<String> = reader
        .byte_headers()
        .context("reading header row")?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();

    if columns.is_empty() {
        return Ok(Table::empty());
    }

    let mut rows = Vec::new();
    for (row_no, result) in reader.byte_records().enumerate() {
        if options.max_rows.is_some_and(|max| rows.len() >= max) {
            break;
        }
        let record = result.with_context(|| format!("reading row {row_no}"))?;
        if record.len() > columns.len() {
            bail!(LoadError::TooManyFields {
                row: row_no,
                found: record.len(),
                expected: columns.len(),
            });
        }

        let mut row: Vec<CellValue> = record
            .iter()
            .map(|field| text_cell(&String::from_utf8_lossy(field)))
            .collect();
        // Short rows are padded, the way a dataframe reader fills NaN.
        row.resize(columns.len(), CellValue::Null);
        rows.push(row);
    }

    Ok(Table::new(columns, rows))
}

/// Field values a dataframe reader takes as missing by default.
const NULL_MARKERS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn text_cell(s: &str) -> CellValue {
    if NULL_MARKERS.contains(&s) {
        CellValue::Null
    } else {
        CellValue::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "ID": 1, "SPP_COM": "Oak", "X_LONGITUDE": -71.05, "Y_LATITUDE": 42.35 },
///   ...
/// ]
/// ```
///
/// Columns appear in first-seen key order; missing keys are null.
fn load_json(path: &Path, options: &LoadOptions) -> Result<Table> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    if text.trim().is_empty() {
        return Ok(Table::empty());
    }
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;
    let records = root.as_array().ok_or(LoadError::NotARecordArray)?;

    let limit = options.max_rows.unwrap_or(usize::MAX);
    let mut columns: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len().min(limit));

    for (row, rec) in records.iter().take(limit).enumerate() {
        let obj = rec
            .as_object()
            .ok_or(LoadError::RecordNotAnObject { row })?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
        objects.push(obj);
    }

    let rows = objects
        .into_iter()
        .map(|obj| {
            columns
                .iter()
                .map(|col| obj.get(col).map_or(CellValue::Null, json_to_cell))
                .collect()
        })
        .collect();

    Ok(Table::new(columns, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => text_cell(s),
        JsonValue::Number(n) => n.as_f64().map_or(CellValue::Null, CellValue::Number),
        JsonValue::Bool(b) => CellValue::Text(b.to_string()),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}
