//! Static Chart Renderer
//! Renders the dashboard charts to PNG bytes with plotters, for export.
//!
//! Layout per image:
//! 1. Title centered at the top
//! 2. Chart body: horizontal bars, donut with legend, or vertical bars
//! 3. The empty-state notice, if the chart has one, instead of an empty body

use super::{
    red_scale, series_max, slice_rgb, teal_scale, truncate_label, ChartKind, Rgb, BACKGROUND,
    CARD_BORDER, MUTED_TEXT, TEXT,
};
use crate::data::{format_count, CategoryTotal, DashboardView};
use image::{ImageFormat, RgbImage};
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::f64::consts::{FRAC_PI_2, TAU};
use std::io::Cursor;
use thiserror::Error;

const FONT: &str = "sans-serif";

const BG_COLOR: RGBColor = RGBColor(BACKGROUND.0, BACKGROUND.1, BACKGROUND.2);
const BORDER_COLOR: RGBColor = RGBColor(CARD_BORDER.0, CARD_BORDER.1, CARD_BORDER.2);
const TEXT_COLOR: RGBColor = RGBColor(TEXT.0, TEXT.1, TEXT.2);
const MUTED_COLOR: RGBColor = RGBColor(MUTED_TEXT.0, MUTED_TEXT.1, MUTED_TEXT.2);

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Drawing error: {0}")]
    Drawing(String),
    #[error("Image buffer does not match {0}x{1}")]
    BufferSize(u32, u32),
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

fn draw_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> RenderError {
    RenderError::Drawing(e.to_string())
}

fn rgb(c: Rgb) -> RGBColor {
    RGBColor(c.0, c.1, c.2)
}

type Area<'a> = DrawingArea<BitMapBackend<'a>, Shift>;

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render one chart of the view as PNG bytes.
    pub fn render_png(
        kind: ChartKind,
        view: &DashboardView,
        width: u32,
        height: u32,
    ) -> Result<Vec<u8>, RenderError> {
        let mut buffer = vec![0u8; (width as usize) * (height as usize) * 3];
        {
            let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
            root.fill(&BG_COLOR).map_err(draw_err)?;
            let body = root
                .titled(kind.title(), (FONT, 24).into_font().color(&TEXT_COLOR))
                .map_err(draw_err)?;

            if kind.is_empty(view) {
                if let Some(text) = kind.empty_notice() {
                    Self::draw_notice(&body, text)?;
                }
            } else {
                let series = kind.series(view);
                match kind {
                    ChartKind::TopCauses => Self::draw_horizontal_bars(&body, series)?,
                    ChartKind::AgeShare => Self::draw_donut(&body, series)?,
                    ChartKind::RegionTotals => Self::draw_vertical_bars(&body, series)?,
                }
            }
            root.present().map_err(draw_err)?;
        }
        Self::encode_png(buffer, width, height)
    }

    fn encode_png(buffer: Vec<u8>, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let img =
            RgbImage::from_raw(width, height, buffer).ok_or(RenderError::BufferSize(width, height))?;
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
        Ok(bytes)
    }

    fn draw_notice(area: &Area, text: &str) -> Result<(), RenderError> {
        let (w, h) = area.dim_in_pixel();
        let style = (FONT, 18)
            .into_font()
            .color(&MUTED_COLOR)
            .pos(Pos::new(HPos::Center, VPos::Center));
        area.draw(&Text::new(text.to_string(), (w as i32 / 2, h as i32 / 2), style))
            .map_err(draw_err)
    }

    /// Top causes: one bar per row, largest at the top.
    fn draw_horizontal_bars(area: &Area, items: &[CategoryTotal]) -> Result<(), RenderError> {
        let n = items.len() as u32;
        let max = series_max(items).max(1.0);
        // Row 0 is the bottom segment
        let labels: Vec<String> = items
            .iter()
            .rev()
            .map(|c| truncate_label(&c.category, 36))
            .collect();
        let label_of = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        };

        let mut chart = ChartBuilder::on(area)
            .margin(16)
            .x_label_area_size(40)
            .y_label_area_size(280)
            .build_cartesian_2d(0f64..max * 1.1, (0u32..n).into_segmented())
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(items.len())
            .y_label_formatter(&label_of)
            .x_desc("Number of Deaths")
            .axis_style(BORDER_COLOR)
            .bold_line_style(BORDER_COLOR.mix(0.5))
            .light_line_style(BORDER_COLOR.mix(0.2))
            .label_style((FONT, 13).into_font().color(&TEXT_COLOR))
            .axis_desc_style((FONT, 14).into_font().color(&TEXT_COLOR))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(items.iter().rev().enumerate().map(|(row, item)| {
                let row = row as u32;
                let mut bar = Rectangle::new(
                    [
                        (0.0, SegmentValue::Exact(row)),
                        (item.deaths, SegmentValue::Exact(row + 1)),
                    ],
                    rgb(red_scale(item.deaths, max)).filled(),
                );
                bar.set_margin(4, 4, 0, 0);
                bar
            }))
            .map_err(draw_err)?;
        Ok(())
    }

    /// Region totals: one column per region, in the given order.
    fn draw_vertical_bars(area: &Area, items: &[CategoryTotal]) -> Result<(), RenderError> {
        let n = items.len() as u32;
        let max = series_max(items).max(1.0);
        let labels: Vec<String> = items
            .iter()
            .map(|c| truncate_label(&c.category, 22))
            .collect();
        let label_of = |v: &SegmentValue<u32>| match v {
            SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
            _ => String::new(),
        };

        let mut chart = ChartBuilder::on(area)
            .margin(16)
            .x_label_area_size(160)
            .y_label_area_size(60)
            .build_cartesian_2d((0u32..n).into_segmented(), 0f64..max * 1.1)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(items.len())
            .x_label_formatter(&label_of)
            .x_label_style(
                (FONT, 12)
                    .into_font()
                    .transform(FontTransform::Rotate90)
                    .color(&TEXT_COLOR),
            )
            .y_desc("Deaths")
            .axis_style(BORDER_COLOR)
            .bold_line_style(BORDER_COLOR.mix(0.5))
            .light_line_style(BORDER_COLOR.mix(0.2))
            .label_style((FONT, 13).into_font().color(&TEXT_COLOR))
            .axis_desc_style((FONT, 14).into_font().color(&TEXT_COLOR))
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(items.iter().enumerate().map(|(i, item)| {
                let i = i as u32;
                let mut bar = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), item.deaths),
                    ],
                    rgb(teal_scale(item.deaths, max)).filled(),
                );
                bar.set_margin(0, 0, 6, 6);
                bar
            }))
            .map_err(draw_err)?;
        Ok(())
    }

    /// Age share: donut on the left, legend with shares on the right.
    fn draw_donut(area: &Area, items: &[CategoryTotal]) -> Result<(), RenderError> {
        let (w, h) = area.dim_in_pixel();
        let total: f64 = items.iter().map(|c| c.deaths).sum();
        let chart_w = (w as f64 * 0.62).round();
        let center = (chart_w / 2.0, h as f64 / 2.0);
        let outer = (chart_w.min(h as f64) / 2.0 - 20.0).max(10.0);
        let inner = outer * 0.5;
        let polar = |r: f64, a: f64| {
            (
                (center.0 + r * a.cos()).round() as i32,
                (center.1 + r * a.sin()).round() as i32,
            )
        };

        if total > 0.0 {
            let mut start = -FRAC_PI_2;
            for (i, item) in items.iter().enumerate() {
                if item.deaths <= 0.0 {
                    continue;
                }
                let sweep = item.deaths / total * TAU;
                let steps = ((sweep / TAU) * 180.0).ceil().max(2.0) as usize;
                let mut points = Vec::with_capacity(2 * (steps + 1));
                for s in 0..=steps {
                    points.push(polar(outer, start + sweep * s as f64 / steps as f64));
                }
                for s in (0..=steps).rev() {
                    points.push(polar(inner, start + sweep * s as f64 / steps as f64));
                }
                area.draw(&Polygon::new(points, rgb(slice_rgb(&item.category, i)).filled()))
                    .map_err(draw_err)?;
                start += sweep;
            }
        }

        let centered = (FONT, 22)
            .into_font()
            .color(&TEXT_COLOR)
            .pos(Pos::new(HPos::Center, VPos::Center));
        area.draw(&Text::new(
            format_count(total),
            (center.0 as i32, center.1 as i32),
            centered,
        ))
        .map_err(draw_err)?;

        let legend_x = chart_w as i32 + 10;
        let mut y = (h as i32 / 2) - (items.len() as i32 * 26) / 2;
        for (i, item) in items.iter().enumerate() {
            area.draw(&Rectangle::new(
                [(legend_x, y), (legend_x + 14, y + 14)],
                rgb(slice_rgb(&item.category, i)).filled(),
            ))
            .map_err(draw_err)?;
            let share = if total > 0.0 {
                item.deaths / total * 100.0
            } else {
                0.0
            };
            area.draw(&Text::new(
                format!("{}  {} ({:.1}%)", item.category, format_count(item.deaths), share),
                (legend_x + 22, y),
                (FONT, 15).into_font().color(&TEXT_COLOR),
            ))
            .map_err(draw_err)?;
            y += 26;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_png_checks_buffer_size() {
        let err = StaticChartRenderer::encode_png(vec![0; 10], 4, 4).unwrap_err();
        assert!(matches!(err, RenderError::BufferSize(4, 4)));
    }

    #[test]
    fn test_encode_png_writes_png_signature() {
        let bytes = StaticChartRenderer::encode_png(vec![128; 4 * 4 * 3], 4, 4).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
