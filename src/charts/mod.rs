//! Charts module - Chart rendering
//!
//! Both the interactive plotter and the static renderer draw the same three
//! views of a [`DashboardView`] with the same colors.

mod plotter;
mod renderer;

pub use plotter::{color as egui_color, ChartPlotter};
pub use renderer::{RenderError, StaticChartRenderer};

use crate::data::{AgeGroup, CategoryTotal, DashboardView};

/// The three aggregate charts of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    /// Horizontal bars, largest cause at the top
    TopCauses,
    /// Donut of deaths per age group
    AgeShare,
    /// Vertical bars of deaths per region
    RegionTotals,
}

impl ChartKind {
    pub const ALL: [ChartKind; 3] = [ChartKind::TopCauses, ChartKind::AgeShare, ChartKind::RegionTotals];

    pub fn title(self) -> &'static str {
        match self {
            ChartKind::TopCauses => "Top 10 Complications",
            ChartKind::AgeShare => "Age Group Share",
            ChartKind::RegionTotals => "Regional Analysis",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ChartKind::TopCauses => "top_causes.png",
            ChartKind::AgeShare => "age_share.png",
            ChartKind::RegionTotals => "region_totals.png",
        }
    }

    /// Message shown in place of the chart when it has nothing to draw. The
    /// age share sits beside the top causes, which already carries the notice,
    /// so it stays blank.
    pub fn empty_notice(self) -> Option<&'static str> {
        match self {
            ChartKind::TopCauses => Some("No data found for current filters."),
            ChartKind::AgeShare => None,
            ChartKind::RegionTotals => Some("No regions match your filter."),
        }
    }

    pub fn series(self, view: &DashboardView) -> &[CategoryTotal] {
        match self {
            ChartKind::TopCauses => &view.top_causes,
            ChartKind::AgeShare => &view.age_group_share,
            ChartKind::RegionTotals => &view.region_totals,
        }
    }

    /// Whether the chart is replaced by its notice.
    pub fn is_empty(self, view: &DashboardView) -> bool {
        self.series(view).is_empty()
    }
}

/// RGB triple shared by both rendering back ends.
pub type Rgb = (u8, u8, u8);

pub const BACKGROUND: Rgb = (14, 17, 23);
pub const CARD_BACKGROUND: Rgb = (38, 39, 48);
pub const CARD_BORDER: Rgb = (65, 68, 78);
pub const ACCENT: Rgb = (255, 75, 75);
pub const TEXT: Rgb = (250, 250, 250);
pub const MUTED_TEXT: Rgb = (189, 195, 199);

/// Qualitative palette for the age group donut.
pub const PASTEL: [Rgb; 11] = [
    (102, 197, 204),
    (246, 207, 113),
    (248, 156, 116),
    (220, 176, 242),
    (135, 197, 95),
    (158, 185, 243),
    (254, 136, 177),
    (201, 219, 116),
    (139, 224, 164),
    (180, 151, 231),
    (179, 179, 179),
];

const REDS: (Rgb, Rgb) = ((252, 187, 161), (165, 15, 21));
const TEALS: (Rgb, Rgb) = ((209, 238, 234), (42, 86, 116));

fn lerp(scale: (Rgb, Rgb), t: f64) -> Rgb {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    let ((r0, g0, b0), (r1, g1, b1)) = scale;
    (mix(r0, r1), mix(g0, g1), mix(b0, b1))
}

/// Continuous red scale by value relative to `max`.
pub fn red_scale(value: f64, max: f64) -> Rgb {
    lerp(REDS, if max > 0.0 { value / max } else { 0.0 })
}

/// Continuous teal scale by value relative to `max`.
pub fn teal_scale(value: f64, max: f64) -> Rgb {
    lerp(TEALS, if max > 0.0 { value / max } else { 0.0 })
}

/// Donut slice color for a category, stable per age bracket.
pub fn slice_rgb(category: &str, fallback_index: usize) -> Rgb {
    let idx = category
        .parse::<AgeGroup>()
        .ok()
        .and_then(|g| AgeGroup::ALL.iter().position(|a| *a == g))
        .unwrap_or(fallback_index);
    PASTEL[idx % PASTEL.len()]
}

/// Largest value of a series, 0 when empty.
pub fn series_max(series: &[CategoryTotal]) -> f64 {
    series.iter().map(|c| c.deaths).fold(0.0, f64::max)
}

/// Shorten long axis labels to `max_chars`, ending with an ellipsis.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut short: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    short.push('…');
    short
}
