//! Philippines Maternal Health Dashboard
//!
//! ```bash
//! ph-maternal-dashboard                              # Desktop dashboard
//! ph-maternal-dashboard --config dashboard.json      # Paths and defaults from a file
//! ph-maternal-dashboard --export report/ --island Visayas --search sepsis
//! ```

use anyhow::{anyhow, Context};
use clap::Parser;
use eframe::egui;
use log::info;
use ph_maternal_dashboard::config::DashboardConfig;
use ph_maternal_dashboard::data::{
    AgeGroup, DataLoader, DataProcessor, FilterSelection, IslandGroup,
};
use ph_maternal_dashboard::export::ReportExporter;
use ph_maternal_dashboard::gui::DashboardApp;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ph-maternal-dashboard")]
#[command(about = "Philippines maternal mortality dashboard (PSA 2021)", long_about = None)]
struct Cli {
    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Deaths by place and age group (table 19)
    #[arg(long)]
    geography: Option<PathBuf>,

    /// Deaths by cause and age group (table 20)
    #[arg(long)]
    causes: Option<PathBuf>,

    /// Write the report to this folder instead of opening the dashboard
    #[arg(short, long)]
    export: Option<PathBuf>,

    /// Age groups to include, e.g. "20-24,25-29"
    #[arg(long, value_delimiter = ',')]
    age: Vec<AgeGroup>,

    /// Include every age group
    #[arg(long, conflicts_with = "age")]
    all_ages: bool,

    /// Island groups to include (Luzon, Visayas, Mindanao)
    #[arg(long, value_delimiter = ',')]
    island: Vec<IslandGroup>,

    /// Case-insensitive substring of the cause name
    #[arg(short, long)]
    search: Option<String>,
}

impl Cli {
    /// Config file (or defaults) with the command-line overrides applied.
    fn config(&self) -> anyhow::Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => DashboardConfig::load(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?,
            None => DashboardConfig::default(),
        };

        if let Some(path) = &self.geography {
            config.geography_path = path.clone();
        }
        if let Some(path) = &self.causes {
            config.cause_path = path.clone();
        }
        if self.all_ages {
            config.default_age_groups = AgeGroup::ALL.to_vec();
        } else if !self.age.is_empty() {
            config.default_age_groups = self.age.clone();
        }
        if !self.island.is_empty() {
            config.default_island_groups = self.island.clone();
        }
        Ok(config)
    }

    /// Starting filter selection: configured defaults plus the search flag.
    fn selection(&self, config: &DashboardConfig) -> FilterSelection {
        let mut selection = config.default_selection();
        if let Some(search) = &self.search {
            selection.cause_search = search.clone();
        }
        selection
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = cli.config()?;
    let selection = cli.selection(&config);

    match &cli.export {
        Some(out_dir) => run_export(&config, &selection, out_dir),
        None => run_dashboard(config, selection),
    }
}

/// Headless: load, filter, write the report.
fn run_export(
    config: &DashboardConfig,
    selection: &FilterSelection,
    out_dir: &Path,
) -> anyhow::Result<()> {
    let data = DataLoader::load(&config.sources())?;
    let view = DataProcessor::build_view(&data, selection)?;
    let files = ReportExporter::export(&view, selection, out_dir)?;
    info!("Exported {} files to {}", files.len(), out_dir.display());
    Ok(())
}

fn run_dashboard(config: DashboardConfig, selection: FilterSelection) -> anyhow::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Philippines Maternal Health Dashboard"),
        ..Default::default()
    };

    eframe::run_native(
        "Philippines Maternal Health Dashboard",
        options,
        Box::new(move |cc| Ok(Box::new(DashboardApp::new(cc, &config, selection)))),
    )
    .map_err(|e| anyhow!("Dashboard failed: {}", e))
}
