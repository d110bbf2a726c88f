use std::path::PathBuf;

use crate::data::loader::LoadOptions;
use crate::error::ConfigError;

pub const APP_NAME: &str = "Boston Trees Explorer";
pub const DEFAULT_DATA_FILE: &str = "bprd_trees.csv";

/// Upper bound on points drawn by the map.
pub const MAP_MAX_POINTS: usize = 3000;
/// Seed of the map sample, so repeated renders pick the same trees.
pub const SAMPLE_SEED: u64 = 42;
/// Species colored individually on the map.
pub const MAP_TOP_N: usize = 10;
/// Bars in the species ranking.
pub const BAR_TOP_N: usize = 30;
/// Neighborhoods preselected on the scatter page.
pub const SCATTER_DEFAULT_NEIGHBORHOODS: usize = 5;

/// The pages reachable from the sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, clap::ValueEnum)]
pub enum Page {
    #[default]
    Home,
    Table,
    Map,
    BarChart,
    Scatter,
}

impl Page {
    pub const ALL: [Page; 5] = [Page::Home, Page::Table, Page::Map, Page::BarChart, Page::Scatter];

    pub fn title(self) -> &'static str {
        match self {
            Page::Home => "Home",
            Page::Table => "Interactive Table",
            Page::Map => "Map of Trees",
            Page::BarChart => "Top 30 Trees Chart",
            Page::Scatter => "Diameter by Neighborhood",
        }
    }
}

/// Settings for one run of the application.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub data_path: PathBuf,
    pub max_rows: Option<usize>,
    pub start_page: Page,
    pub map_max_points: usize,
    pub sample_seed: u64,
    pub map_top_n: usize,
    pub bar_top_n: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            max_rows: None,
            start_page: Page::Home,
            map_max_points: MAP_MAX_POINTS,
            sample_seed: SAMPLE_SEED,
            map_top_n: MAP_TOP_N,
            bar_top_n: BAR_TOP_N,
        }
    }
}

impl AppConfig {
    /// Reject settings that would make a page meaningless.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.data_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataPath);
        }
        let counts = [
            ("max_rows", self.max_rows.unwrap_or(1)),
            ("map_max_points", self.map_max_points),
            ("map_top_n", self.map_top_n),
            ("bar_top_n", self.bar_top_n),
        ];
        match counts.into_iter().find(|(_, v)| *v == 0) {
            Some((field, _)) => Err(ConfigError::Zero { field }),
            None => Ok(()),
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            max_rows: self.max_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_counts_are_rejected() {
        let config = AppConfig {
            map_max_points: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Zero { field: "map_max_points" })
        ));

        let config = AppConfig {
            max_rows: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Zero { field: "max_rows" })
        ));
    }

    #[test]
    fn empty_path_is_rejected() {
        let config = AppConfig {
            data_path: PathBuf::new(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::EmptyDataPath)));
    }
}
