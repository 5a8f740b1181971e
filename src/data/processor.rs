//! Data Processor Module
//! Filter & aggregate pipeline: turns the normalized tables and a filter
//! selection into the dashboard's view model.

use super::schema::columns::{AGE_GROUP, CAUSE, DEATHS, ISLAND_GROUP, IS_REGION, PLACE};
use super::schema::{AgeGroup, IslandGroup};
use super::table::{CauseTable, DashboardData, GeographyTable};
use log::debug;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// Number of causes shown in the top complications chart.
pub const TOP_CAUSES_LIMIT: usize = 10;
/// Leading cause reported when no cause has any deaths.
pub const NO_LEADING_CAUSE: &str = "None";

#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// User filter state. Empty sets and an empty search mean "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub age_groups: BTreeSet<AgeGroup>,
    pub island_groups: BTreeSet<IslandGroup>,
    pub cause_search: String,
}

/// One (category, total deaths) row of an aggregate view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub deaths: f64,
}

/// Everything the dashboard renders for one filter selection.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub total_deaths: f64,
    pub island_selection_deaths: f64,
    pub leading_cause: String,
    pub top_causes: Vec<CategoryTotal>,
    pub age_group_share: Vec<CategoryTotal>,
    pub region_totals: Vec<CategoryTotal>,
    #[serde(skip)]
    pub causes: CauseTable,
    #[serde(skip)]
    pub geography: GeographyTable,
}

/// Pure filter and aggregation operations over the normalized tables.
pub struct DataProcessor;

impl DataProcessor {
    /// Run the full pipeline for one selection.
    pub fn build_view(
        data: &DashboardData,
        selection: &FilterSelection,
    ) -> Result<DashboardView, ProcessorError> {
        let causes = Self::filter_causes(&data.causes, selection)?;
        let geography = Self::filter_geography(&data.geography, selection)?;

        let ranked = Self::rank_causes(&causes)?;
        let leading_cause = ranked
            .first()
            .map(|c| c.category.clone())
            .unwrap_or_else(|| NO_LEADING_CAUSE.to_string());
        let top_causes = ranked.into_iter().take(TOP_CAUSES_LIMIT).collect();

        let view = DashboardView {
            total_deaths: causes.total_deaths(),
            island_selection_deaths: Self::region_rows(&geography)?.total_deaths(),
            leading_cause,
            top_causes,
            age_group_share: Self::age_group_share(&causes)?,
            region_totals: Self::region_totals(&geography)?,
            causes,
            geography,
        };

        debug!(
            "View: {} cause rows, {} geography rows, total={}, leading='{}'",
            view.causes.len(),
            view.geography.len(),
            view.total_deaths,
            view.leading_cause
        );
        Ok(view)
    }

    /// Cause rows passing the age-group and search filters.
    pub fn filter_causes(
        table: &CauseTable,
        selection: &FilterSelection,
    ) -> Result<CauseTable, ProcessorError> {
        let df = Self::filter_in(
            table.frame(),
            AGE_GROUP,
            selection.age_groups.iter().map(|g| g.label()),
        )?;
        let df = Self::filter_by_cause_search(&df, &selection.cause_search)?;
        Ok(CauseTable::from_frame(df))
    }

    /// Geography rows passing the age-group and island-group filters.
    pub fn filter_geography(
        table: &GeographyTable,
        selection: &FilterSelection,
    ) -> Result<GeographyTable, ProcessorError> {
        let df = Self::filter_in(
            table.frame(),
            AGE_GROUP,
            selection.age_groups.iter().map(|g| g.label()),
        )?;
        let df = Self::filter_in(
            &df,
            ISLAND_GROUP,
            selection.island_groups.iter().map(|g| g.label()),
        )?;
        Ok(GeographyTable::from_frame(df))
    }

    /// Keep rows whose `column` equals one of `values`; no values keeps every row.
    fn filter_in<'a>(
        df: &DataFrame,
        column: &str,
        values: impl Iterator<Item = &'a str>,
    ) -> Result<DataFrame, ProcessorError> {
        let predicate = values
            .map(|v| col(column).eq(lit(v)))
            .reduce(|acc, e| acc.or(e));

        let Some(predicate) = predicate else {
            return Ok(df.clone());
        };
        Ok(df.clone().lazy().filter(predicate).collect()?)
    }

    /// Case-insensitive substring match on the cause label. Null causes never
    /// match a non-empty search.
    fn filter_by_cause_search(df: &DataFrame, search: &str) -> Result<DataFrame, ProcessorError> {
        if search.is_empty() {
            return Ok(df.clone());
        }
        let needle = search.to_lowercase();
        let mask: BooleanChunked = df
            .column(CAUSE)?
            .str()?
            .into_iter()
            .map(|cause| Some(cause.is_some_and(|c| c.to_lowercase().contains(&needle))))
            .collect();
        Ok(df.filter(&mask)?)
    }

    /// Geography rows flagged as administrative regions.
    pub fn region_rows(table: &GeographyTable) -> Result<GeographyTable, ProcessorError> {
        let df = table
            .frame()
            .clone()
            .lazy()
            .filter(col(IS_REGION).eq(lit(true)))
            .collect()?;
        Ok(GeographyTable::from_frame(df))
    }

    /// Sum deaths per distinct non-null `key`, largest first. Ties keep the
    /// key's ascending order.
    fn sum_by(df: &DataFrame, key: &str) -> Result<Vec<CategoryTotal>, ProcessorError> {
        let grouped = df
            .clone()
            .lazy()
            .filter(col(key).is_not_null())
            .group_by([col(key)])
            .agg([col(DEATHS).sum()])
            .sort(
                [DEATHS, key],
                SortMultipleOptions::default().with_order_descending_multi([true, false]),
            )
            .collect()?;

        let keys = grouped.column(key)?.str()?;
        let sums = grouped.column(DEATHS)?.f64()?;
        Ok(keys
            .into_iter()
            .zip(sums.into_iter())
            .filter_map(|(k, v)| {
                Some(CategoryTotal {
                    category: k?.to_string(),
                    deaths: v.unwrap_or(0.0),
                })
            })
            .collect())
    }

    /// Every named cause, largest first. Empty when the table holds no deaths
    /// at all, so an all-zero selection has no leading cause.
    pub fn rank_causes(table: &CauseTable) -> Result<Vec<CategoryTotal>, ProcessorError> {
        if table.total_deaths() <= 0.0 {
            return Ok(Vec::new());
        }
        Self::sum_by(table.frame(), CAUSE)
    }

    /// Name of the cause with the greatest total, or `"None"`.
    pub fn leading_cause(table: &CauseTable) -> Result<String, ProcessorError> {
        Ok(Self::rank_causes(table)?
            .into_iter()
            .next()
            .map(|c| c.category)
            .unwrap_or_else(|| NO_LEADING_CAUSE.to_string()))
    }

    /// The ten causes with the greatest totals.
    pub fn top_causes(table: &CauseTable) -> Result<Vec<CategoryTotal>, ProcessorError> {
        Ok(Self::rank_causes(table)?
            .into_iter()
            .take(TOP_CAUSES_LIMIT)
            .collect())
    }

    /// Deaths per age group, in bracket order.
    pub fn age_group_share(table: &CauseTable) -> Result<Vec<CategoryTotal>, ProcessorError> {
        let mut share = Self::sum_by(table.frame(), AGE_GROUP)?;
        share.sort_by_key(|c| c.category.parse::<AgeGroup>().ok());
        Ok(share)
    }

    /// Deaths per region, largest first.
    pub fn region_totals(table: &GeographyTable) -> Result<Vec<CategoryTotal>, ProcessorError> {
        Self::sum_by(Self::region_rows(table)?.frame(), PLACE)
    }
}

/// Format a count with `,` thousands separators, e.g. `1234.0` -> `"1,234"`.
pub fn format_count(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
