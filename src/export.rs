//! Report Export Module
//! Writes the current dashboard view to a folder: the aggregates as JSON and
//! one PNG per chart.

use crate::charts::{ChartKind, RenderError, StaticChartRenderer};
use crate::data::{DashboardView, FilterSelection};
use log::info;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the JSON summary inside the export folder.
pub const SUMMARY_FILE: &str = "dashboard.json";

/// Pixel size of each exported chart
const CHART_WIDTH: u32 = 1200;
const CHART_HEIGHT: u32 = 700;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Cannot write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("Cannot serialize dashboard: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Cannot render {chart}: {source}")]
    Render {
        chart: &'static str,
        #[source]
        source: RenderError,
    },
}

#[derive(Serialize)]
struct Summary<'a> {
    selection: &'a FilterSelection,
    view: &'a DashboardView,
}

pub struct ReportExporter;

impl ReportExporter {
    /// Write the JSON summary only. Returns its path.
    pub fn write_summary(
        view: &DashboardView,
        selection: &FilterSelection,
        out_dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(out_dir)?;
        let path = out_dir.join(SUMMARY_FILE);
        let json = serde_json::to_string_pretty(&Summary { selection, view })?;
        fs::write(&path, json)?;
        info!("Wrote {}", path.display());
        Ok(path)
    }

    /// Write the JSON summary and every chart image. Returns the written paths,
    /// summary first.
    pub fn export(
        view: &DashboardView,
        selection: &FilterSelection,
        out_dir: &Path,
    ) -> Result<Vec<PathBuf>, ExportError> {
        let mut written = vec![Self::write_summary(view, selection, out_dir)?];

        // Charts are independent, render them in parallel
        let images: Vec<(ChartKind, Vec<u8>)> = ChartKind::ALL
            .par_iter()
            .map(|&kind| {
                StaticChartRenderer::render_png(kind, view, CHART_WIDTH, CHART_HEIGHT)
                    .map(|bytes| (kind, bytes))
                    .map_err(|source| ExportError::Render {
                        chart: kind.title(),
                        source,
                    })
            })
            .collect::<Result<_, _>>()?;

        for (kind, bytes) in images {
            let path = out_dir.join(kind.file_name());
            fs::write(&path, bytes)?;
            info!("Wrote {}", path.display());
            written.push(path);
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        AgeGroup, CauseRecord, CauseTable, DashboardData, DataProcessor, GeographyTable,
        IslandGroup,
    };

    fn sample_view(selection: &FilterSelection) -> DashboardView {
        let causes = CauseTable::from_records(&[CauseRecord {
            icd_code: "O72".into(),
            cause: Some("Postpartum hemorrhage".into()),
            age_group: AgeGroup::From25To29,
            deaths: 1200.0,
        }])
        .unwrap();
        let data = DashboardData {
            geography: GeographyTable::from_records(&[]).unwrap(),
            causes,
        };
        DataProcessor::build_view(&data, selection).unwrap()
    }

    #[test]
    fn test_write_summary_creates_folder_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/report");
        let selection = FilterSelection {
            island_groups: [IslandGroup::Visayas].into_iter().collect(),
            ..Default::default()
        };
        let view = sample_view(&selection);

        let path = ReportExporter::write_summary(&view, &selection, &out).unwrap();
        assert_eq!(path, out.join(SUMMARY_FILE));

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["view"]["total_deaths"], 1200.0);
        assert_eq!(json["view"]["leading_cause"], "Postpartum hemorrhage");
        assert_eq!(json["selection"]["island_groups"][0], "Visayas");
        assert!(json["view"].get("causes").is_none());
    }
}
