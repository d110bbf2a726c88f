use thiserror::Error;

/// Why an input file could not be turned into a table.
///
/// Raised inside the loader and wrapped in `anyhow` context; callers of
/// [`crate::data::loader::load`] only ever see an empty table.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("expected a top-level JSON array of records")]
    NotARecordArray,

    #[error("record {row} is not a JSON object")]
    RecordNotAnObject { row: usize },

    #[error("row {row} has {found} fields but the header has {expected}")]
    TooManyFields {
        row: usize,
        found: usize,
        expected: usize,
    },
}

/// Invalid startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("data path is empty")]
    EmptyDataPath,
}
