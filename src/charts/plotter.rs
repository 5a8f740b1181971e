//! Chart Plotter Module
//! Creates interactive visualizations using egui_plot.

use super::{
    red_scale, series_max, slice_rgb, teal_scale, truncate_label, ChartKind, Rgb, MUTED_TEXT, TEXT,
};
use crate::data::{format_count, CategoryTotal, DashboardView};
use egui::{vec2, Align2, Color32, FontId, Pos2, RichText, Sense, Shape, Stroke};
use egui_plot::{Bar, BarChart, GridMark, Plot};
use std::f32::consts::{FRAC_PI_2, TAU};

const INFO_COLOR: Color32 = Color32::from_rgb(100, 149, 237);
const WARNING_COLOR: Color32 = Color32::from_rgb(243, 156, 18);

/// Axis label length before truncation
const CAUSE_LABEL_CHARS: usize = 32;
const REGION_LABEL_CHARS: usize = 18;

pub fn color(rgb: Rgb) -> Color32 {
    Color32::from_rgb(rgb.0, rgb.1, rgb.2)
}

fn slice_color(category: &str, fallback_index: usize) -> Color32 {
    color(slice_rgb(category, fallback_index))
}

fn polar(center: Pos2, radius: f32, angle: f32) -> Pos2 {
    center + vec2(angle.cos(), angle.sin()) * radius
}

/// Grid marks on every integer position `0..n`, one per bar.
fn category_marks(n: usize) -> Vec<GridMark> {
    (0..n)
        .map(|i| GridMark {
            value: i as f64,
            step_size: 1.0,
        })
        .collect()
}

/// Axis label for a category mark; blank between categories.
fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if idx < 0.0 || (value - idx).abs() > 1e-6 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

/// Draws the dashboard charts with egui_plot and the egui painter.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Draw one chart of the view, or its notice when there is nothing to show.
    pub fn draw(ui: &mut egui::Ui, kind: ChartKind, view: &DashboardView, height: f32) {
        if kind.is_empty(view) {
            let notice_color = match kind {
                ChartKind::RegionTotals => WARNING_COLOR,
                _ => INFO_COLOR,
            };
            if let Some(text) = kind.empty_notice() {
                Self::draw_notice(ui, text, notice_color);
            }
            return;
        }

        let series = kind.series(view);
        match kind {
            ChartKind::TopCauses => Self::draw_top_causes(ui, series, height),
            ChartKind::AgeShare => Self::draw_age_share(ui, series, height),
            ChartKind::RegionTotals => Self::draw_region_totals(ui, series, height),
        }
    }

    fn draw_notice(ui: &mut egui::Ui, text: &str, notice_color: Color32) {
        egui::Frame::none()
            .fill(notice_color.gamma_multiply(0.15))
            .stroke(Stroke::new(1.0, notice_color))
            .rounding(5.0)
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new(text).color(notice_color));
            });
    }

    /// Horizontal bars, largest cause at the top, colored by value.
    pub fn draw_top_causes(ui: &mut egui::Ui, items: &[CategoryTotal], height: f32) {
        let n = items.len();
        let max = series_max(items);

        // Row 0 is drawn at the bottom, so walk the ranking backwards
        let labels: Vec<String> = items
            .iter()
            .rev()
            .map(|c| truncate_label(&c.category, CAUSE_LABEL_CHARS))
            .collect();
        let bars: Vec<Bar> = items
            .iter()
            .rev()
            .enumerate()
            .map(|(row, item)| {
                Bar::new(row as f64, item.deaths)
                    .width(0.7)
                    .name(format!("{}: {}", item.category, format_count(item.deaths)))
                    .fill(color(red_scale(item.deaths, max)))
            })
            .collect();

        Plot::new("top_causes")
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show_x(false)
            .show_y(false)
            .x_axis_label("Number of Deaths")
            .include_x(0.0)
            .include_x(max * 1.1)
            .y_grid_spacer(move |_input| category_marks(n))
            .y_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).horizontal().name("Deaths"));
            });
    }

    /// Vertical bars of region totals, in the given (descending) order.
    pub fn draw_region_totals(ui: &mut egui::Ui, items: &[CategoryTotal], height: f32) {
        let n = items.len();
        let max = series_max(items);

        let labels: Vec<String> = items
            .iter()
            .map(|c| truncate_label(&c.category, REGION_LABEL_CHARS))
            .collect();
        let bars: Vec<Bar> = items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Bar::new(i as f64, item.deaths)
                    .width(0.7)
                    .name(format!("{}: {}", item.category, format_count(item.deaths)))
                    .fill(color(teal_scale(item.deaths, max)))
            })
            .collect();

        Plot::new("region_totals")
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show_x(false)
            .show_y(false)
            .x_axis_label("Region")
            .y_axis_label("Deaths")
            .include_y(0.0)
            .include_y(max * 1.1)
            .x_grid_spacer(move |_input| category_marks(n))
            .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).name("Deaths"));
            });
    }

    /// Donut of deaths per age group with a legend underneath.
    pub fn draw_age_share(ui: &mut egui::Ui, items: &[CategoryTotal], height: f32) {
        let total: f64 = items.iter().map(|c| c.deaths).sum();
        let legend_height = 60.0;
        let diameter = (height - legend_height)
            .min(ui.available_width())
            .max(40.0);

        let (rect, response) =
            ui.allocate_exact_size(vec2(ui.available_width(), diameter), Sense::hover());
        let painter = ui.painter_at(rect);
        let center = rect.center();
        let outer = diameter / 2.0;
        let inner = outer * 0.5;

        // Angle under the pointer, in the same [-pi/2, 3pi/2) frame as the slices
        let hover_angle = response.hover_pos().and_then(|pos| {
            let d = pos - center;
            let r = d.length();
            if r < inner || r > outer {
                return None;
            }
            let mut a = d.y.atan2(d.x);
            if a < -FRAC_PI_2 {
                a += TAU;
            }
            Some(a)
        });

        let mut hovered: Option<&CategoryTotal> = None;
        let mut start = -FRAC_PI_2;
        if total > 0.0 {
            for (i, item) in items.iter().enumerate() {
                if item.deaths <= 0.0 {
                    continue;
                }
                let sweep = (item.deaths / total) as f32 * TAU;
                let fill = slice_color(&item.category, i);
                let steps = ((sweep / TAU) * 120.0).ceil().max(1.0) as usize;

                for s in 0..steps {
                    let a0 = start + sweep * s as f32 / steps as f32;
                    let a1 = start + sweep * (s + 1) as f32 / steps as f32;
                    painter.add(Shape::convex_polygon(
                        vec![
                            polar(center, outer, a0),
                            polar(center, outer, a1),
                            polar(center, inner, a1),
                            polar(center, inner, a0),
                        ],
                        fill,
                        Stroke::NONE,
                    ));
                }

                if hover_angle.is_some_and(|a| a >= start && a < start + sweep) {
                    hovered = Some(item);
                }
                start += sweep;
            }
        }

        painter.text(
            center,
            Align2::CENTER_CENTER,
            format_count(total),
            FontId::proportional(18.0),
            color(TEXT),
        );

        if let Some(item) = hovered {
            response.on_hover_text(format!(
                "{}: {} ({:.1}%)",
                item.category,
                format_count(item.deaths),
                item.deaths / total * 100.0
            ));
        }

        ui.add_space(8.0);
        ui.horizontal_wrapped(|ui| {
            for (i, item) in items.iter().enumerate() {
                let (swatch, _) = ui.allocate_exact_size(vec2(12.0, 12.0), Sense::hover());
                ui.painter()
                    .rect_filled(swatch, 2.0, slice_color(&item.category, i));
                let share = if total > 0.0 {
                    item.deaths / total * 100.0
                } else {
                    0.0
                };
                ui.label(
                    RichText::new(format!("{} ({:.1}%)", item.category, share))
                        .size(12.0)
                        .color(color(MUTED_TEXT)),
                );
                ui.add_space(8.0);
            }
        });
    }
}
