//! CSV Data Loader Module
//! Reads the geography and cause tables with Polars, normalizes them and
//! reshapes the per-age columns into long form.

use super::classify;
use super::schema::columns::{AGE_GROUP, CAUSE, DEATHS, ICD_CODE, ISLAND_GROUP, IS_REGION, PLACE};
use super::schema::AgeGroup;
use super::table::{CauseTable, DashboardData, GeographyTable};
use log::{debug, info, trace};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Lines before the first geography data row: two preamble rows plus the header.
pub const GEOGRAPHY_SKIP_ROWS: usize = 3;
/// Place, total, nine age brackets.
pub const GEOGRAPHY_COLUMNS: usize = 11;
/// Lines before the first cause data row: one preamble row plus the header.
pub const CAUSE_SKIP_ROWS: usize = 2;
/// ICD code, cause, total, nine age brackets.
pub const CAUSE_COLUMNS: usize = 12;
/// Header label that marks a repeated header row inside the cause table.
pub const CAUSE_HEADER_LABEL: &str = "ICD-10 Code";

const GEOGRAPHY_FIRST_AGE_COLUMN: usize = 2;
const CAUSE_FIRST_AGE_COLUMN: usize = 3;

/// Why a source file could not be loaded.
#[derive(Error, Debug)]
pub enum LoadFailure {
    #[error("file not found")]
    Missing,
    #[error("cannot read file: {0}")]
    Unreadable(#[from] std::io::Error),
    #[error("failed to parse CSV: {0}")]
    Csv(#[from] PolarsError),
    #[error("expected at least {expected} columns, found {found}")]
    ColumnCount { expected: usize, found: usize },
}

/// A source table could not be loaded. Fatal for the dashboard.
#[derive(Error, Debug)]
#[error("Failed to load '{}': {}", .path.display(), .source)]
pub struct DataLoadError {
    pub path: PathBuf,
    #[source]
    pub source: LoadFailure,
}

impl DataLoadError {
    fn new(path: &Path, source: impl Into<LoadFailure>) -> Self {
        Self {
            path: path.to_path_buf(),
            source: source.into(),
        }
    }
}

/// Locations of the two source tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSources {
    pub geography: PathBuf,
    pub causes: PathBuf,
}

/// Loads and normalizes the source tables.
pub struct DataLoader;

impl DataLoader {
    /// Load both tables.
    pub fn load(sources: &TableSources) -> Result<DashboardData, DataLoadError> {
        let geography = Self::load_geography(&sources.geography)?;
        let causes = Self::load_causes(&sources.causes)?;
        Ok(DashboardData { geography, causes })
    }

    /// Load the geography table and melt it into (place, age group) rows.
    pub fn load_geography(path: &Path) -> Result<GeographyTable, DataLoadError> {
        let raw = Self::read_raw(path, GEOGRAPHY_SKIP_ROWS, GEOGRAPHY_COLUMNS)
            .map_err(|e| DataLoadError::new(path, e))?;
        let table = Self::normalize_geography(&raw).map_err(|e| DataLoadError::new(path, e))?;
        info!(
            "Loaded geography table {}: {} raw rows -> {} long rows",
            path.display(),
            raw.height(),
            table.len()
        );
        Ok(table)
    }

    /// Load the cause table and melt it into (cause, age group) rows.
    pub fn load_causes(path: &Path) -> Result<CauseTable, DataLoadError> {
        let raw = Self::read_raw(path, CAUSE_SKIP_ROWS, CAUSE_COLUMNS)
            .map_err(|e| DataLoadError::new(path, e))?;
        let table = Self::normalize_causes(&raw).map_err(|e| DataLoadError::new(path, e))?;
        info!(
            "Loaded cause table {}: {} raw rows -> {} long rows",
            path.display(),
            raw.height(),
            table.len()
        );
        Ok(table)
    }

    /// Read a CSV file as all-string columns, skipping the preamble and header
    /// lines. Columns beyond `width` are ignored.
    fn read_raw(path: &Path, skip_rows: usize, width: usize) -> Result<DataFrame, LoadFailure> {
        if !path.exists() {
            return Err(LoadFailure::Missing);
        }
        // Surface permission problems as I/O errors rather than parser errors
        std::fs::File::open(path)?;

        let df = LazyCsvReader::new(path)
            .with_has_header(false)
            .with_skip_rows(skip_rows)
            .with_infer_schema_length(Some(0))
            .with_truncate_ragged_lines(true)
            .with_encoding(CsvEncoding::LossyUtf8)
            .finish()?
            .collect()?;

        if df.width() < width {
            return Err(LoadFailure::ColumnCount {
                expected: width,
                found: df.width(),
            });
        }
        debug!(
            "Read {}: {} rows x {} columns",
            path.display(),
            df.height(),
            df.width()
        );
        Ok(df)
    }

    /// Trimmed cell values of the column at `idx`; blank cells become `None`.
    fn string_cells(df: &DataFrame, idx: usize) -> PolarsResult<Vec<Option<String>>> {
        let column = df.get_columns()[idx].cast(&DataType::String)?;
        let cells = column
            .str()?
            .into_iter()
            .map(|cell| {
                cell.map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
            .collect();
        Ok(cells)
    }

    /// The nine age-bracket columns starting at `first`, as death counts.
    fn age_counts(df: &DataFrame, first: usize) -> PolarsResult<Vec<Vec<f64>>> {
        AgeGroup::ALL
            .iter()
            .enumerate()
            .map(|(offset, _)| {
                Ok(Self::string_cells(df, first + offset)?
                    .iter()
                    .map(|cell| parse_deaths(cell.as_deref()))
                    .collect())
            })
            .collect()
    }

    /// Geography rows: drop blank places, classify, then melt the age columns.
    pub(crate) fn normalize_geography(raw: &DataFrame) -> PolarsResult<GeographyTable> {
        let places = Self::string_cells(raw, 0)?;
        let counts = Self::age_counts(raw, GEOGRAPHY_FIRST_AGE_COLUMN)?;

        // (row index, place, is_region, island group)
        let rows: Vec<(usize, &str, bool, &'static str)> = places
            .iter()
            .enumerate()
            .filter_map(|(i, place)| {
                let place = place.as_deref()?;
                let island = classify::island_group(place);
                let region = classify::is_region(place);
                debug!("Classified '{}': island={}, region={}", place, island, region);
                Some((i, place, region, island.label()))
            })
            .collect();

        let capacity = rows.len() * AgeGroup::ALL.len();
        let mut place_col: Vec<String> = Vec::with_capacity(capacity);
        let mut region_col: Vec<bool> = Vec::with_capacity(capacity);
        let mut island_col: Vec<&str> = Vec::with_capacity(capacity);
        let mut age_col: Vec<&str> = Vec::with_capacity(capacity);
        let mut deaths_col: Vec<f64> = Vec::with_capacity(capacity);

        for (age, values) in AgeGroup::ALL.iter().zip(&counts) {
            for &(row, place, region, island) in &rows {
                place_col.push(place.to_string());
                region_col.push(region);
                island_col.push(island);
                age_col.push(age.label());
                deaths_col.push(values[row]);
            }
        }

        let df = DataFrame::new(vec![
            Column::new(PLACE.into(), place_col),
            Column::new(IS_REGION.into(), region_col),
            Column::new(ISLAND_GROUP.into(), island_col),
            Column::new(AGE_GROUP.into(), age_col),
            Column::new(DEATHS.into(), deaths_col),
        ])?;

        Ok(GeographyTable::from_frame(df))
    }

    /// Cause rows: drop blank codes and echoed header rows, then melt the age columns.
    pub(crate) fn normalize_causes(raw: &DataFrame) -> PolarsResult<CauseTable> {
        let codes = Self::string_cells(raw, 0)?;
        let causes = Self::string_cells(raw, 1)?;
        let counts = Self::age_counts(raw, CAUSE_FIRST_AGE_COLUMN)?;

        let rows: Vec<(usize, &str)> = codes
            .iter()
            .enumerate()
            .filter_map(|(i, code)| {
                let code = code.as_deref()?;
                if code == CAUSE_HEADER_LABEL {
                    debug!("Dropping repeated header row at line {}", i);
                    return None;
                }
                Some((i, code))
            })
            .collect();

        let capacity = rows.len() * AgeGroup::ALL.len();
        let mut code_col: Vec<String> = Vec::with_capacity(capacity);
        let mut cause_col: Vec<Option<String>> = Vec::with_capacity(capacity);
        let mut age_col: Vec<&str> = Vec::with_capacity(capacity);
        let mut deaths_col: Vec<f64> = Vec::with_capacity(capacity);

        for (age, values) in AgeGroup::ALL.iter().zip(&counts) {
            for &(row, code) in &rows {
                code_col.push(code.to_string());
                cause_col.push(causes[row].clone());
                age_col.push(age.label());
                deaths_col.push(values[row]);
            }
        }

        let df = DataFrame::new(vec![
            Column::new(ICD_CODE.into(), code_col),
            Column::new(CAUSE.into(), cause_col),
            Column::new(AGE_GROUP.into(), age_col),
            Column::new(DEATHS.into(), deaths_col),
        ])?;

        Ok(CauseTable::from_frame(df))
    }
}

/// Coerce a raw cell to a non-negative death count.
///
/// Thousands separators are accepted; anything else non-numeric, negative or
/// missing becomes 0.
pub fn parse_deaths(cell: Option<&str>) -> f64 {
    let Some(cell) = cell else {
        return 0.0;
    };
    match cell.trim().replace(',', "").parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => v,
        _ => {
            trace!("Coercing death count '{}' to 0", cell);
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_frame(rows: &[&[&str]], width: usize) -> DataFrame {
        let columns = (0..width)
            .map(|c| {
                let values: Vec<Option<String>> = rows
                    .iter()
                    .map(|r| r.get(c).filter(|s| !s.is_empty()).map(|s| s.to_string()))
                    .collect();
                Column::new(format!("column_{}", c + 1).into(), values)
            })
            .collect();
        DataFrame::new(columns).unwrap()
    }

    #[test]
    fn test_parse_deaths_coercion() {
        assert_eq!(parse_deaths(Some("12")), 12.0);
        assert_eq!(parse_deaths(Some(" 3 ")), 3.0);
        assert_eq!(parse_deaths(Some("1,204")), 1204.0);
        assert_eq!(parse_deaths(Some("-")), 0.0);
        assert_eq!(parse_deaths(Some("n/a")), 0.0);
        assert_eq!(parse_deaths(Some("-4")), 0.0);
        assert_eq!(parse_deaths(Some("NaN")), 0.0);
        assert_eq!(parse_deaths(None), 0.0);
    }

    #[test]
    fn test_region_row_melts_to_nine_records() {
        let raw = raw_frame(
            &[&["Region IV-A", "10", "0", "0", "1", "2", "3", "2", "1", "1", "0"]],
            GEOGRAPHY_COLUMNS,
        );
        let table = DataLoader::normalize_geography(&raw).unwrap();
        let records = table.records().unwrap();

        assert_eq!(records.len(), 9);
        assert!(records.iter().all(|r| r.is_region));
        assert!(records
            .iter()
            .all(|r| r.island_group == crate::data::IslandGroup::Luzon));
        assert_eq!(records.iter().map(|r| r.deaths).sum::<f64>(), 10.0);
        let ages: Vec<AgeGroup> = records.iter().map(|r| r.age_group).collect();
        assert_eq!(ages, AgeGroup::ALL.to_vec());
    }

    #[test]
    fn test_geography_blank_places_dropped() {
        let raw = raw_frame(
            &[
                &["NCR", "3", "0", "1", "1", "1", "0", "0", "0", "0", "0"],
                &["", "9", "9", "0", "0", "0", "0", "0", "0", "0", "0"],
                &["Cebu City", "2", "0", "0", "0", "x", "2", "0", "0", "0", "0"],
            ],
            GEOGRAPHY_COLUMNS,
        );
        let table = DataLoader::normalize_geography(&raw).unwrap();
        assert_eq!(table.len(), 2 * 9);
        assert_eq!(table.total_deaths(), 5.0);
    }

    #[test]
    fn test_melt_orders_by_age_then_row() {
        let raw = raw_frame(
            &[
                &["NCR", "1", "1", "0", "0", "0", "0", "0", "0", "0", "0"],
                &["CAR", "1", "0", "1", "0", "0", "0", "0", "0", "0", "0"],
            ],
            GEOGRAPHY_COLUMNS,
        );
        let records = DataLoader::normalize_geography(&raw)
            .unwrap()
            .records()
            .unwrap();
        assert_eq!(records[0].place, "NCR");
        assert_eq!(records[0].age_group, AgeGroup::Under15);
        assert_eq!(records[1].place, "CAR");
        assert_eq!(records[1].age_group, AgeGroup::Under15);
        assert_eq!(records[3].place, "CAR");
        assert_eq!(records[3].deaths, 1.0);
    }

    #[test]
    fn test_cause_header_echo_and_blank_codes_dropped() {
        let raw = raw_frame(
            &[
                &["O72", "Postpartum hemorrhage", "5", "0", "1", "2", "2", "0", "0", "0", "0", "0"],
                &["ICD-10 Code", "Cause", "Total", "Under 15", "15-19", "20-24", "25-29", "30-34", "35-39", "40-44", "45-49", "50+"],
                &["", "Subtotal", "5", "0", "1", "2", "2", "0", "0", "0", "0", "0"],
                &["O66", "", "1", "0", "0", "0", "0", "1", "0", "0", "0", "0"],
            ],
            CAUSE_COLUMNS,
        );
        let table = DataLoader::normalize_causes(&raw).unwrap();
        let records = table.records().unwrap();

        assert_eq!(records.len(), 2 * 9);
        assert!(records.iter().all(|r| r.icd_code != CAUSE_HEADER_LABEL));
        assert!(records
            .iter()
            .filter(|r| r.icd_code == "O66")
            .all(|r| r.cause.is_none()));
        assert_eq!(table.total_deaths(), 6.0);
    }

    #[test]
    fn test_missing_file_is_load_error() {
        let path = Path::new("definitely/not/here/table19.csv");
        let err = DataLoader::load_geography(path).unwrap_err();
        assert_eq!(err.path, path);
        assert!(matches!(err.source, LoadFailure::Missing));
        assert!(err.to_string().contains("table19.csv"));
    }
}
