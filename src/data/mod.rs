//! Data module - table loading, normalization and the filter pipeline

mod cache;
pub mod classify;
mod loader;
mod processor;
mod schema;
mod table;

pub use cache::{FileFingerprint, SourceFingerprints, TableCache};
pub use loader::{parse_deaths, DataLoadError, DataLoader, LoadFailure, TableSources};
pub use processor::{
    format_count, CategoryTotal, DashboardView, DataProcessor, FilterSelection, ProcessorError,
    NO_LEADING_CAUSE, TOP_CAUSES_LIMIT,
};
pub use schema::{columns, AgeGroup, CauseRecord, GeographyRecord, IslandGroup};
pub use table::{CauseTable, DashboardData, GeographyTable};
