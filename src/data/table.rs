//! Normalized Tables
//! Typed wrappers around the long-form Polars frames produced by the loader.

use super::schema::columns::{AGE_GROUP, CAUSE, DEATHS, ICD_CODE, ISLAND_GROUP, IS_REGION, PLACE};
use super::schema::{AgeGroup, CauseRecord, GeographyRecord, IslandGroup};
use polars::prelude::*;
use std::str::FromStr;

fn parse_label<T: FromStr<Err = String>>(label: Option<&str>, column: &str) -> PolarsResult<T> {
    let label = label.ok_or_else(|| {
        PolarsError::ComputeError(format!("Null value in column '{}'", column).into())
    })?;
    label
        .parse()
        .map_err(|e: String| PolarsError::ComputeError(e.into()))
}

fn frame_total_deaths(df: &DataFrame) -> f64 {
    df.column(DEATHS)
        .ok()
        .and_then(|col| col.f64().ok().and_then(|ca| ca.sum()))
        .unwrap_or(0.0)
}

/// Long-form geography table: place, is_region, island_group, age_group, deaths.
#[derive(Debug, Clone)]
pub struct GeographyTable {
    df: DataFrame,
}

impl GeographyTable {
    /// Wrap a frame that already carries the geography columns.
    pub(crate) fn from_frame(df: DataFrame) -> Self {
        Self { df }
    }

    /// Build a table from typed records.
    pub fn from_records(records: &[GeographyRecord]) -> PolarsResult<Self> {
        let df = DataFrame::new(vec![
            Column::new(
                PLACE.into(),
                records.iter().map(|r| r.place.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                IS_REGION.into(),
                records.iter().map(|r| r.is_region).collect::<Vec<_>>(),
            ),
            Column::new(
                ISLAND_GROUP.into(),
                records
                    .iter()
                    .map(|r| r.island_group.label().to_string())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                AGE_GROUP.into(),
                records
                    .iter()
                    .map(|r| r.age_group.label().to_string())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                DEATHS.into(),
                records.iter().map(|r| r.deaths).collect::<Vec<_>>(),
            ),
        ])?;
        Ok(Self { df })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn total_deaths(&self) -> f64 {
        frame_total_deaths(&self.df)
    }

    /// Materialize the rows as typed records.
    pub fn records(&self) -> PolarsResult<Vec<GeographyRecord>> {
        let places = self.df.column(PLACE)?.str()?;
        let regions = self.df.column(IS_REGION)?.bool()?;
        let islands = self.df.column(ISLAND_GROUP)?.str()?;
        let ages = self.df.column(AGE_GROUP)?.str()?;
        let deaths = self.df.column(DEATHS)?.f64()?;

        let mut records = Vec::with_capacity(self.df.height());
        for i in 0..self.df.height() {
            records.push(GeographyRecord {
                place: places.get(i).unwrap_or_default().to_string(),
                is_region: regions.get(i).unwrap_or(false),
                island_group: parse_label::<IslandGroup>(islands.get(i), ISLAND_GROUP)?,
                age_group: parse_label::<AgeGroup>(ages.get(i), AGE_GROUP)?,
                deaths: deaths.get(i).unwrap_or(0.0),
            });
        }
        Ok(records)
    }
}

impl PartialEq for GeographyTable {
    fn eq(&self, other: &Self) -> bool {
        self.df.equals_missing(&other.df)
    }
}

/// Long-form cause table: icd_code, cause, age_group, deaths.
#[derive(Debug, Clone)]
pub struct CauseTable {
    df: DataFrame,
}

impl CauseTable {
    pub(crate) fn from_frame(df: DataFrame) -> Self {
        Self { df }
    }

    /// Build a table from typed records.
    pub fn from_records(records: &[CauseRecord]) -> PolarsResult<Self> {
        let df = DataFrame::new(vec![
            Column::new(
                ICD_CODE.into(),
                records.iter().map(|r| r.icd_code.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                CAUSE.into(),
                records.iter().map(|r| r.cause.clone()).collect::<Vec<_>>(),
            ),
            Column::new(
                AGE_GROUP.into(),
                records
                    .iter()
                    .map(|r| r.age_group.label().to_string())
                    .collect::<Vec<_>>(),
            ),
            Column::new(
                DEATHS.into(),
                records.iter().map(|r| r.deaths).collect::<Vec<_>>(),
            ),
        ])?;
        Ok(Self { df })
    }

    pub fn frame(&self) -> &DataFrame {
        &self.df
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub fn total_deaths(&self) -> f64 {
        frame_total_deaths(&self.df)
    }

    /// Materialize the rows as typed records.
    pub fn records(&self) -> PolarsResult<Vec<CauseRecord>> {
        let codes = self.df.column(ICD_CODE)?.str()?;
        let causes = self.df.column(CAUSE)?.str()?;
        let ages = self.df.column(AGE_GROUP)?.str()?;
        let deaths = self.df.column(DEATHS)?.f64()?;

        let mut records = Vec::with_capacity(self.df.height());
        for i in 0..self.df.height() {
            records.push(CauseRecord {
                icd_code: codes.get(i).unwrap_or_default().to_string(),
                cause: causes.get(i).map(str::to_string),
                age_group: parse_label::<AgeGroup>(ages.get(i), AGE_GROUP)?,
                deaths: deaths.get(i).unwrap_or(0.0),
            });
        }
        Ok(records)
    }
}

impl PartialEq for CauseTable {
    fn eq(&self, other: &Self) -> bool {
        self.df.equals_missing(&other.df)
    }
}

/// Both normalized tables, shared read-only across every view computation.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardData {
    pub geography: GeographyTable,
    pub causes: CauseTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cause_records_round_trip_keeps_null_cause() {
        let records = vec![
            CauseRecord {
                icd_code: "O72".to_string(),
                cause: Some("Postpartum hemorrhage".to_string()),
                age_group: AgeGroup::From20To24,
                deaths: 4.0,
            },
            CauseRecord {
                icd_code: "O99".to_string(),
                cause: None,
                age_group: AgeGroup::From50,
                deaths: 1.0,
            },
        ];
        let table = CauseTable::from_records(&records).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.total_deaths(), 5.0);
        assert_eq!(table.records().unwrap(), records);
    }

    #[test]
    fn test_empty_geography_table() {
        let table = GeographyTable::from_records(&[]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.total_deaths(), 0.0);
        assert!(table.records().unwrap().is_empty());
    }
}
