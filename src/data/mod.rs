//! Data layer: core types, loading, cleaning, filtering and ranking.
//!
//! Architecture:
//! ```text
//!  bprd_trees.csv / .tsv / .json
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → Table (text cells)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ normalize  │  canonical names, numbers, dates, coordinates → Table
//!   └───────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ TreeTable  │  typed TreeRecords, schema checked once
//!   └───────────┘
//!        │
//!        ├──────────────┐
//!        ▼              ▼
//!   ┌──────────┐   ┌───────────┐
//!   │  filter   │   │ aggregate  │  top-N counts
//!   └──────────┘   └───────────┘
//! ```
//!
//! `cache` memoizes the first three stages per file and the filter per page.

pub mod aggregate;
pub mod cache;
pub mod filter;
pub mod loader;
pub mod model;
pub mod normalize;

use std::path::Path;

use loader::LoadOptions;
use model::TreeTable;

/// Run loader, normalizer and schema check in one go.
///
/// Never fails: an unreadable file gives an empty table.
pub fn load_trees(path: &Path, options: &LoadOptions) -> TreeTable {
    TreeTable::from_table(&normalize::normalize(loader::load(path, options)))
}
