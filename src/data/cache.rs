use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;

use super::filter::{filtered_indices, FilterSpec};
use super::loader::{self, LoadOptions};
use super::model::TreeTable;
use super::normalize::normalize;

// ---------------------------------------------------------------------------
// Dataset – one load of the inventory file
// ---------------------------------------------------------------------------

/// Which table of a [`Dataset`] a view works from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base {
    /// Every tree with coordinates.
    All,
    /// Only trees with a recorded diameter.
    Measured,
}

/// Normalized inventory plus the derived tables the pages start from.
#[derive(Debug)]
pub struct Dataset {
    pub source: PathBuf,
    /// Distinguishes successive loads; part of every memo key.
    pub generation: u64,
    pub trees: TreeTable,
    pub measured: TreeTable,
    /// Set when the file could not be read; the tables are empty then.
    pub notice: Option<String>,
}

impl Dataset {
    fn load(path: &Path, options: &LoadOptions, generation: u64) -> Self {
        let (trees, notice) = match loader::try_load(path, options) {
            Ok(table) => (TreeTable::from_table(&normalize(table)), None),
            Err(e) => {
                log::error!("Failed to load dataset {}: {e:#}", path.display());
                (
                    TreeTable::default(),
                    Some(format!("Could not load {}: {e:#}", path.display())),
                )
            }
        };
        let measured = trees.subset(|tree| tree.dbh_in.is_some());
        log::info!(
            "Dataset generation {generation}: {} trees, {} with a diameter",
            trees.len(),
            measured.len()
        );

        Dataset {
            source: path.to_path_buf(),
            generation,
            trees,
            measured,
            notice,
        }
    }

    pub fn table(&self, base: Base) -> &TreeTable {
        match base {
            Base::All => &self.trees,
            Base::Measured => &self.measured,
        }
    }
}

// ---------------------------------------------------------------------------
// DatasetCache – loader + normalizer memo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct FileKey {
    path: PathBuf,
    modified: Option<SystemTime>,
    len: Option<u64>,
    options: LoadOptions,
}

impl FileKey {
    fn probe(path: &Path, options: &LoadOptions) -> Self {
        let meta = std::fs::metadata(path).ok();
        FileKey {
            path: path.to_path_buf(),
            modified: meta.as_ref().and_then(|m| m.modified().ok()),
            len: meta.as_ref().map(|m| m.len()),
            options: options.clone(),
        }
    }
}

/// Holds the most recent [`Dataset`], keyed by file identity and
/// modification time. Entries are swapped whole, so readers on other
/// threads only ever see a complete dataset.
#[derive(Debug, Default)]
pub struct DatasetCache {
    slot: RwLock<Option<(FileKey, Arc<Dataset>)>>,
    generations: AtomicU64,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, reloading when the file changed
    /// on disk since it was read.
    pub fn get_or_load(&self, path: &Path, options: &LoadOptions) -> Arc<Dataset> {
        let key = FileKey::probe(path, options);
        if let Some((cached, dataset)) = self.slot.read().as_ref() {
            if *cached == key {
                log::debug!("Dataset cache hit for {}", path.display());
                return Arc::clone(dataset);
            }
        }

        let generation = self.generations.fetch_add(1, Ordering::Relaxed) + 1;
        let dataset = Arc::new(Dataset::load(path, options, generation));
        *self.slot.write() = Some((key, Arc::clone(&dataset)));
        dataset
    }

    /// Forget the cached dataset; the next request reloads.
    pub fn invalidate(&self) {
        *self.slot.write() = None;
    }
}

// ---------------------------------------------------------------------------
// FilterMemo – filter engine memo
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct FilterKey {
    generation: u64,
    base: Base,
    spec: FilterSpec,
}

/// Remembers the last filter result of one page.
#[derive(Debug, Default)]
pub struct FilterMemo {
    last: Option<(FilterKey, Arc<Vec<usize>>)>,
}

impl FilterMemo {
    /// Indices into `dataset.table(base)` matching `spec`.
    pub fn get_or_compute(
        &mut self,
        dataset: &Dataset,
        base: Base,
        spec: &FilterSpec,
    ) -> Arc<Vec<usize>> {
        let key = FilterKey {
            generation: dataset.generation,
            base,
            spec: spec.clone(),
        };
        if let Some((cached, indices)) = &self.last {
            if *cached == key {
                return Arc::clone(indices);
            }
        }

        let indices = Arc::new(filtered_indices(dataset.table(base), spec));
        log::debug!("Filter on {base:?}: {} rows", indices.len());
        self.last = Some((key, Arc::clone(&indices)));
        indices
    }
}
