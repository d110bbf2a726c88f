mod app;
mod ui;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use eframe::egui;

use app::BostonTreesApp;
use boston_trees::config::{self, AppConfig, Page};

/// Explore Boston's street and park tree inventory.
#[derive(Parser, Debug)]
#[command(name = "boston-trees", version, about)]
struct Cli {
    /// Tree inventory file (.csv, .tsv or .json)
    #[arg(short, long, default_value = config::DEFAULT_DATA_FILE)]
    data: PathBuf,

    /// Page shown at startup
    #[arg(short, long, value_enum, default_value_t = Page::Home)]
    page: Page,

    /// Read at most this many records
    #[arg(long)]
    max_rows: Option<usize>,

    /// Maximum number of trees drawn on the map
    #[arg(long, default_value_t = config::MAP_MAX_POINTS)]
    map_points: usize,

    /// Seed for the map sample
    #[arg(long, default_value_t = config::SAMPLE_SEED)]
    seed: u64,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn into_config(self) -> AppConfig {
        AppConfig {
            data_path: self.data,
            max_rows: self.max_rows,
            start_page: self.page,
            map_max_points: self.map_points,
            sample_seed: self.seed,
            ..Default::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = cli.into_config();
    config.validate().context("Invalid configuration")?;
    log::info!("Starting {} with {}", config::APP_NAME, config.data_path.display());

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 820.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        config::APP_NAME,
        options,
        Box::new(|_cc| Ok(Box::new(BostonTreesApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
