//! Dashboard Main Application
//! Main window with the filter panel, chart viewer and footer.

use crate::charts::{egui_color, ACCENT, BACKGROUND, CARD_BACKGROUND, MUTED_TEXT};
use crate::config::DashboardConfig;
use crate::data::{
    DashboardData, DataLoader, DataProcessor, FilterSelection, SourceFingerprints, TableCache,
};
use crate::export::ReportExporter;
use crate::gui::{ChartViewer, ControlPanel, ControlPanelAction};
use egui::{Color32, RichText, SidePanel, TopBottomPanel};
use log::{error, info, warn};
use std::sync::mpsc::{channel, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const SOURCE_URL: &str = "https://psa.gov.ph/statistics/vital-statistics/report";

/// Table loading result from background thread
enum LoadResult {
    Complete {
        data: Arc<DashboardData>,
        fingerprints: SourceFingerprints,
    },
    Error(String),
}

/// Main application window.
pub struct DashboardApp {
    cache: TableCache,
    control_panel: ControlPanel,
    chart_viewer: ChartViewer,

    // Async table loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,

    /// Set once a load fails; replaces the whole dashboard
    fatal_error: Option<String>,
    refresh_interval: Duration,
    last_check: Instant,
}

impl DashboardApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: &DashboardConfig,
        selection: FilterSelection,
    ) -> Self {
        cc.egui_ctx.set_visuals(Self::visuals());

        let mut app = Self {
            cache: TableCache::new(config.sources()),
            control_panel: ControlPanel::new(selection),
            chart_viewer: ChartViewer::new(),
            load_rx: None,
            is_loading: false,
            fatal_error: None,
            refresh_interval: config.refresh_interval(),
            last_check: Instant::now(),
        };
        app.start_load();
        app
    }

    /// Dark theme with the red accent.
    fn visuals() -> egui::Visuals {
        let mut visuals = egui::Visuals::dark();
        visuals.panel_fill = egui_color(BACKGROUND);
        visuals.window_fill = egui_color(CARD_BACKGROUND);
        visuals.extreme_bg_color = egui_color(CARD_BACKGROUND);
        visuals.selection.bg_fill = egui_color(ACCENT);
        visuals.hyperlink_color = egui_color(ACCENT);
        visuals
    }

    /// Load both tables in a background thread. The current tables stay on
    /// screen until the load completes.
    fn start_load(&mut self) {
        if self.is_loading {
            return;
        }

        let sources = self.cache.sources().clone();
        // Captured before reading so a write during the load triggers another one
        let fingerprints = SourceFingerprints::capture(&sources);

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.is_loading = true;
        self.control_panel.busy = true;
        self.control_panel.set_status("Loading data...");

        thread::spawn(move || {
            let result = match DataLoader::load(&sources) {
                Ok(data) => LoadResult::Complete {
                    data: Arc::new(data),
                    fingerprints,
                },
                Err(e) => LoadResult::Error(e.to_string()),
            };
            let _ = tx.send(result);
        });
    }

    /// Check for table loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        match rx.try_recv() {
            Ok(LoadResult::Complete { data, fingerprints }) => {
                self.cache.store(data, fingerprints);
                self.finish_load();
                self.rebuild_view();
            }
            Ok(LoadResult::Error(e)) => {
                error!("{}", e);
                self.finish_load();
                self.fatal_error = Some(e);
            }
            Err(_) => self.load_rx = Some(rx),
        }
    }

    fn finish_load(&mut self) {
        self.is_loading = false;
        self.control_panel.busy = false;
        self.last_check = Instant::now();
    }

    /// Reload when the source files changed since the cached load.
    fn poll_for_changes(&mut self) {
        if self.is_loading || self.last_check.elapsed() < self.refresh_interval {
            return;
        }
        self.last_check = Instant::now();
        if self.cache.is_stale() {
            info!("Source files changed, reloading");
            self.start_load();
        }
    }

    /// Recompute the view for the current selection.
    fn rebuild_view(&mut self) {
        let Some(data) = self.cache.current() else {
            return;
        };
        match DataProcessor::build_view(&data, &self.control_panel.selection) {
            Ok(view) => {
                self.control_panel.set_status(&format!(
                    "Loaded {} geography rows, {} cause rows",
                    data.geography.len(),
                    data.causes.len()
                ));
                self.chart_viewer.set_view(view);
            }
            Err(e) => {
                error!("Filter pipeline failed: {}", e);
                self.fatal_error = Some(e.to_string());
            }
        }
    }

    /// Handle report export - pick a folder, write JSON and charts, open it
    fn handle_export(&mut self) {
        let Some(view) = self.chart_viewer.view.as_ref() else {
            self.control_panel.set_status("Nothing to export yet");
            return;
        };

        let Some(dir) = rfd::FileDialog::new()
            .set_title("Export dashboard report")
            .pick_folder()
        else {
            return; // User cancelled
        };

        match ReportExporter::export(view, &self.control_panel.selection, &dir) {
            Ok(files) => {
                self.control_panel
                    .set_status(&format!("Exported {} files", files.len()));
                if let Err(e) = open::that(&dir) {
                    warn!("Cannot open {}: {}", dir.display(), e);
                }
            }
            Err(e) => {
                error!("{}", e);
                self.control_panel
                    .set_status(&format!("Export Error: {}", e));
            }
        }
    }

    fn show_fatal_error(ctx: &egui::Context, message: &str) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(80.0);
                ui.label(
                    RichText::new("⚠ Data Error")
                        .size(28.0)
                        .strong()
                        .color(Color32::from_rgb(220, 53, 69)),
                );
                ui.add_space(12.0);
                ui.label(RichText::new(message).size(15.0));
            });
        });
    }

    fn show_footer(ui: &mut egui::Ui) {
        let muted = egui_color(MUTED_TEXT);
        ui.vertical_centered(|ui| {
            ui.add_space(6.0);
            ui.label(
                RichText::new(
                    "Maternal Mortality Risk Profiler: Analyzing common complications \
                     leading to maternal deaths in rural areas.",
                )
                .size(12.0)
                .strong()
                .color(muted),
            );
            ui.horizontal(|ui| {
                ui.label(RichText::new("Data Source:").size(12.0).color(muted));
                ui.hyperlink_to(
                    "Philippine Statistics Authority (PSA) Vital Statistics Report 2021",
                    SOURCE_URL,
                );
            });
            ui.add_space(6.0);
        });
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if let Some(message) = &self.fatal_error {
            Self::show_fatal_error(ctx, message);
            return;
        }

        self.poll_for_changes();
        if self.is_loading {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(self.refresh_interval);
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(260.0)
            .max_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    match self.control_panel.show(ui) {
                        ControlPanelAction::FiltersChanged => self.rebuild_view(),
                        ControlPanelAction::ReloadData => self.start_load(),
                        ControlPanelAction::ExportReport => self.handle_export(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        TopBottomPanel::bottom("footer").show(ctx, Self::show_footer);

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            self.chart_viewer.show(ui);
        });
    }
}
