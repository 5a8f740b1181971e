//! Chart Viewer Widget
//! Central scrollable area: title, metric cards and the three charts.

use crate::charts::{
    egui_color as color, ChartKind, ChartPlotter, ACCENT, CARD_BACKGROUND, MUTED_TEXT,
};
use crate::data::{format_count, DashboardView};
use egui::{RichText, ScrollArea, Stroke};

const CHART_SPACING: f32 = 15.0;
const CHART_HEIGHT: f32 = 400.0;
const CARD_HEIGHT: f32 = 90.0;

/// Scrollable dashboard body for the current view.
#[derive(Default)]
pub struct ChartViewer {
    pub view: Option<DashboardView>,
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_view(&mut self, view: DashboardView) {
        self.view = Some(view);
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        let Some(view) = &self.view else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new("Loading data...").size(20.0));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.label(
                    RichText::new("Philippines Maternal Health Dashboard (2021)")
                        .size(28.0)
                        .strong(),
                );
                ui.label(
                    RichText::new("Analysis of Maternal Mortality Risks")
                        .size(18.0)
                        .italics()
                        .color(color(MUTED_TEXT)),
                );
                ui.separator();
                ui.add_space(CHART_SPACING);

                Self::draw_metrics(ui, view);
                ui.add_space(CHART_SPACING * 2.0);

                // Causes 2/3, age share 1/3
                let avail = ui.available_width();
                let left_width = (avail - CHART_SPACING) * 2.0 / 3.0;
                let right_width = avail - CHART_SPACING - left_width;
                ui.horizontal_top(|ui| {
                    ui.vertical(|ui| {
                        ui.set_width(left_width);
                        Self::chart_heading(ui, "🩺", ChartKind::TopCauses);
                        ChartPlotter::draw(ui, ChartKind::TopCauses, view, CHART_HEIGHT);
                    });
                    ui.add_space(CHART_SPACING);
                    ui.vertical(|ui| {
                        ui.set_width(right_width);
                        Self::chart_heading(ui, "👥", ChartKind::AgeShare);
                        ChartPlotter::draw(ui, ChartKind::AgeShare, view, CHART_HEIGHT);
                    });
                });

                ui.add_space(CHART_SPACING * 2.0);
                Self::chart_heading(ui, "📍", ChartKind::RegionTotals);
                ChartPlotter::draw(ui, ChartKind::RegionTotals, view, CHART_HEIGHT);
                ui.add_space(CHART_SPACING);
            });
    }

    fn chart_heading(ui: &mut egui::Ui, icon: &str, kind: ChartKind) {
        ui.label(
            RichText::new(format!("{} {}", icon, kind.title()))
                .size(18.0)
                .strong(),
        );
        ui.add_space(8.0);
    }

    fn draw_metrics(ui: &mut egui::Ui, view: &DashboardView) {
        let cards = [
            ("Total Deaths (Selection)", format_count(view.total_deaths)),
            (
                "Deaths in Selected Islands",
                format_count(view.island_selection_deaths),
            ),
            ("Leading Complication", view.leading_cause.clone()),
        ];

        let width = (ui.available_width() - CHART_SPACING * 2.0) / 3.0;
        ui.horizontal(|ui| {
            for (label, value) in cards {
                Self::metric_card(ui, label, &value, width);
                ui.add_space(CHART_SPACING);
            }
        });
    }

    /// Card with a red accent bar on the left edge.
    fn metric_card(ui: &mut egui::Ui, label: &str, value: &str, width: f32) {
        let response = egui::Frame::none()
            .fill(color(CARD_BACKGROUND))
            .rounding(5.0)
            .inner_margin(egui::Margin {
                left: 16.0,
                right: 12.0,
                top: 12.0,
                bottom: 12.0,
            })
            .show(ui, |ui| {
                ui.set_width(width - 28.0);
                ui.set_min_height(CARD_HEIGHT - 24.0);
                ui.label(RichText::new(label).size(13.0).color(color(MUTED_TEXT)));
                ui.add_space(4.0);
                ui.add(egui::Label::new(RichText::new(value).size(26.0).strong()).truncate());
            })
            .response;

        let rect = response.rect;
        ui.painter().line_segment(
            [
                rect.left_top() + egui::vec2(2.5, 0.0),
                rect.left_bottom() + egui::vec2(2.5, 0.0),
            ],
            Stroke::new(5.0, color(ACCENT)),
        );
    }
}
