//! Table Cache
//! Keeps the normalized tables for the process lifetime and reloads them only
//! when the source files change.

use super::loader::{DataLoadError, DataLoader, TableSources};
use super::table::DashboardData;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Identity and modification state of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFingerprint {
    pub path: PathBuf,
    pub len: u64,
    pub modified: Option<SystemTime>,
}

impl FileFingerprint {
    /// `None` when the file cannot be stat'ed.
    pub fn of(path: &Path) -> Option<Self> {
        let meta = fs::metadata(path).ok()?;
        Some(Self {
            path: path.to_path_buf(),
            len: meta.len(),
            modified: meta.modified().ok(),
        })
    }
}

/// Fingerprints of both source tables; the cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFingerprints {
    pub geography: Option<FileFingerprint>,
    pub causes: Option<FileFingerprint>,
}

impl SourceFingerprints {
    pub fn capture(sources: &TableSources) -> Self {
        Self {
            geography: FileFingerprint::of(&sources.geography),
            causes: FileFingerprint::of(&sources.causes),
        }
    }
}

/// Memoized loader result keyed by the source files' fingerprints.
pub struct TableCache {
    sources: TableSources,
    key: Option<SourceFingerprints>,
    data: Option<Arc<DashboardData>>,
}

impl TableCache {
    pub fn new(sources: TableSources) -> Self {
        Self {
            sources,
            key: None,
            data: None,
        }
    }

    pub fn sources(&self) -> &TableSources {
        &self.sources
    }

    /// Currently cached tables, if any load has succeeded.
    pub fn current(&self) -> Option<Arc<DashboardData>> {
        self.data.clone()
    }

    /// Whether nothing is cached yet or the files changed since the cached load.
    pub fn is_stale(&self) -> bool {
        match (&self.key, &self.data) {
            (Some(key), Some(_)) => *key != SourceFingerprints::capture(&self.sources),
            _ => true,
        }
    }

    /// Return the cached tables, loading them first if stale.
    pub fn get_or_load(&mut self) -> Result<Arc<DashboardData>, DataLoadError> {
        if let (false, Some(data)) = (self.is_stale(), &self.data) {
            debug!("Table cache hit");
            return Ok(Arc::clone(data));
        }

        let key = SourceFingerprints::capture(&self.sources);
        let data = Arc::new(DataLoader::load(&self.sources)?);
        self.store(Arc::clone(&data), key);
        Ok(data)
    }

    /// Install tables loaded elsewhere (e.g. on a background thread), along
    /// with the fingerprints captured before that load started.
    pub fn store(&mut self, data: Arc<DashboardData>, key: SourceFingerprints) {
        info!(
            "Cached tables: {} geography rows, {} cause rows",
            data.geography.len(),
            data.causes.len()
        );
        self.key = Some(key);
        self.data = Some(data);
    }
}
