use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{AppConfig, Page, SCATTER_DEFAULT_NEIGHBORHOODS};
use crate::data::cache::{Base, Dataset, DatasetCache, FilterMemo};
use crate::data::filter::{DiameterRange, FilterOptions, FilterSpec};
use crate::views::{bar_entries, BarEntry, MapView, ScatterView};

// ---------------------------------------------------------------------------
// Which multi-select a sidebar widget drives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterField {
    Species,
    Neighborhood,
    Street,
}

impl FilterField {
    pub fn label(self) -> &'static str {
        match self {
            FilterField::Species => "Species",
            FilterField::Neighborhood => "Neighborhood",
            FilterField::Street => "Street Name",
        }
    }

    pub fn selected(self, spec: &FilterSpec) -> &std::collections::BTreeSet<String> {
        match self {
            FilterField::Species => &spec.species,
            FilterField::Neighborhood => &spec.neighborhoods,
            FilterField::Street => &spec.streets,
        }
    }

    fn selected_mut(self, spec: &mut FilterSpec) -> &mut std::collections::BTreeSet<String> {
        match self {
            FilterField::Species => &mut spec.species,
            FilterField::Neighborhood => &mut spec.neighborhoods,
            FilterField::Street => &mut spec.streets,
        }
    }

    pub fn options(self, options: &FilterOptions) -> &[String] {
        match self {
            FilterField::Species => &options.species,
            FilterField::Neighborhood => &options.neighborhoods,
            FilterField::Street => &options.streets,
        }
    }
}

impl Page {
    /// The table a page filters; the scatter plot only shows measured trees.
    pub fn base(self) -> Base {
        match self {
            Page::Scatter => Base::Measured,
            _ => Base::All,
        }
    }

    /// Multi-select widgets shown in the sidebar, top to bottom.
    pub fn filter_fields(self) -> &'static [FilterField] {
        match self {
            Page::Table | Page::Map => &[
                FilterField::Species,
                FilterField::Neighborhood,
                FilterField::Street,
            ],
            Page::Scatter => &[FilterField::Neighborhood, FilterField::Species],
            Page::Home | Page::BarChart => &[],
        }
    }

    pub fn has_diameter_filter(self) -> bool {
        matches!(self, Page::Table | Page::Map | Page::Scatter)
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
///
/// Each page owns its own [`FilterSpec`]; nothing is shared between pages
/// except the read-only dataset.
pub struct AppState {
    pub config: AppConfig,
    pub page: Page,
    cache: DatasetCache,

    /// Current dataset (empty tables when the file could not be read).
    pub dataset: Option<Arc<Dataset>>,

    /// Option universes per base table.
    options: HashMap<Base, Arc<FilterOptions>>,

    filters: HashMap<Page, FilterSpec>,
    memos: HashMap<Page, FilterMemo>,

    map_view: Option<(Arc<Vec<usize>>, Arc<MapView>)>,
    scatter_view: Option<(Arc<Vec<usize>>, Arc<ScatterView>)>,
    bars: Option<(u64, Arc<Vec<BarEntry>>)>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let mut state = Self {
            page: config.start_page,
            config,
            cache: DatasetCache::new(),
            dataset: None,
            options: HashMap::new(),
            filters: HashMap::new(),
            memos: HashMap::new(),
            map_view: None,
            scatter_view: None,
            bars: None,
            status_message: None,
        };
        state.refresh();
        state
    }

    /// Fetch the dataset for the configured path. Cheap when the file is
    /// unchanged; a changed file resets every page's filters.
    pub fn refresh(&mut self) {
        let dataset = self
            .cache
            .get_or_load(&self.config.data_path, &self.config.load_options());
        self.status_message = dataset.notice.clone();

        let fresh = self
            .dataset
            .as_ref()
            .map_or(true, |old| old.generation != dataset.generation);
        if fresh {
            self.set_dataset(dataset);
        }
    }

    /// Ingest a newly loaded dataset, initialise options and filters.
    fn set_dataset(&mut self, dataset: Arc<Dataset>) {
        self.options = [Base::All, Base::Measured]
            .into_iter()
            .map(|base| (base, Arc::new(FilterOptions::from_table(dataset.table(base)))))
            .collect();

        self.filters.clear();
        let scatter_defaults: std::collections::BTreeSet<String> = self.options[&Base::Measured]
            .neighborhoods
            .iter()
            .take(SCATTER_DEFAULT_NEIGHBORHOODS)
            .cloned()
            .collect();
        self.filters.insert(
            Page::Scatter,
            FilterSpec {
                neighborhoods: scatter_defaults,
                ..Default::default()
            },
        );

        self.memos.clear();
        self.map_view = None;
        self.scatter_view = None;
        self.bars = None;
        self.dataset = Some(dataset);
    }

    /// Navigate; every page visit re-requests the dataset.
    pub fn set_page(&mut self, page: Page) {
        if self.page != page {
            log::debug!("Switching to page {page:?}");
            self.page = page;
            self.refresh();
        }
    }

    /// Point the app at another file.
    pub fn open_file(&mut self, path: PathBuf) {
        log::info!("Opening {}", path.display());
        self.config.data_path = path;
        self.refresh();
    }

    /// Drop the cached dataset and read the file again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        self.refresh();
    }

    pub fn has_data(&self) -> bool {
        self.dataset.as_ref().is_some_and(|ds| !ds.trees.is_empty())
    }

    // -- Filters -----------------------------------------------------------

    pub fn filter_spec(&self, page: Page) -> FilterSpec {
        self.filters.get(&page).cloned().unwrap_or_default()
    }

    pub fn filter_options(&self, page: Page) -> Arc<FilterOptions> {
        self.options.get(&page.base()).cloned().unwrap_or_default()
    }

    /// Toggle a single value in one of the page's multi-selects.
    pub fn toggle_filter_value(&mut self, page: Page, field: FilterField, value: &str) {
        let selected = field.selected_mut(self.filters.entry(page).or_default());
        if !selected.remove(value) {
            selected.insert(value.to_string());
        }
    }

    /// Deselect every value of a multi-select, i.e. stop filtering on it.
    pub fn clear_filter(&mut self, page: Page, field: FilterField) {
        field.selected_mut(self.filters.entry(page).or_default()).clear();
    }

    /// `None` lifts the diameter constraint.
    pub fn set_diameter(&mut self, page: Page, range: Option<DiameterRange>) {
        self.filters.entry(page).or_default().diameter = range;
    }

    /// Indices into the page's base table that pass its filters.
    pub fn filtered(&mut self, page: Page) -> Arc<Vec<usize>> {
        let Some(dataset) = self.dataset.clone() else {
            return Arc::new(Vec::new());
        };
        let spec = self.filters.get(&page).cloned().unwrap_or_default();
        self.memos
            .entry(page)
            .or_default()
            .get_or_compute(&dataset, page.base(), &spec)
    }

    // -- Views ---------------------------------------------------------------

    pub fn map_view(&mut self) -> Option<Arc<MapView>> {
        let dataset = self.dataset.clone()?;
        let indices = self.filtered(Page::Map);
        if let Some((cached, view)) = &self.map_view {
            if Arc::ptr_eq(cached, &indices) {
                return Some(Arc::clone(view));
            }
        }
        let view = Arc::new(MapView::build(
            dataset.table(Page::Map.base()),
            &indices,
            self.config.map_top_n,
            self.config.map_max_points,
            self.config.sample_seed,
        ));
        self.map_view = Some((indices, Arc::clone(&view)));
        Some(view)
    }

    pub fn scatter_view(&mut self) -> Option<Arc<ScatterView>> {
        let dataset = self.dataset.clone()?;
        let indices = self.filtered(Page::Scatter);
        if let Some((cached, view)) = &self.scatter_view {
            if Arc::ptr_eq(cached, &indices) {
                return Some(Arc::clone(view));
            }
        }
        let view = Arc::new(ScatterView::build(dataset.table(Page::Scatter.base()), &indices));
        self.scatter_view = Some((indices, Arc::clone(&view)));
        Some(view)
    }

    /// Species ranking over the whole dataset; the bar page has no filters.
    pub fn bar_entries(&mut self) -> Option<Arc<Vec<BarEntry>>> {
        let dataset = self.dataset.clone()?;
        if let Some((generation, bars)) = &self.bars {
            if *generation == dataset.generation {
                return Some(Arc::clone(bars));
            }
        }
        let bars = Arc::new(bar_entries(&dataset.trees, self.config.bar_top_n));
        self.bars = Some((dataset.generation, Arc::clone(&bars)));
        Some(bars)
    }
}
