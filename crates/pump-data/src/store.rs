//! Date-labelled dataset storage.
//!
//! Every uploaded export is stored as `<YYYY-MM-DD>.csv` in a single
//! directory, keyed by the day it was uploaded.  Uploading twice on the same
//! day replaces the earlier file.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use pump_core::error::{DashboardError, Result};
use pump_core::models::RawEvent;
use pump_core::time_utils::date_label;
use tracing::{info, warn};

use crate::reader::{load_events, read_events};

/// A directory of date-labelled CSV datasets.
#[derive(Debug, Clone)]
pub struct DatasetStore {
    dir: PathBuf,
}

impl DatasetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File path for a dataset label.
    pub fn path_for(&self, label: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", label))
    }

    /// Labels of all stored datasets, sorted ascending.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.is_dir() {
            return Err(DashboardError::DataDirNotFound(self.dir.clone()));
        }

        let mut labels: Vec<String> = walkdir::WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!("Skipping unreadable entry in {}: {}", self.dir.display(), e);
                    None
                }
            })
            .filter(|entry| {
                entry.file_type().is_file()
                    && entry
                        .path()
                        .extension()
                        .map(|ext| ext == "csv")
                        .unwrap_or(false)
            })
            .filter_map(|entry| {
                entry
                    .path()
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
            })
            .collect();

        labels.sort();
        Ok(labels)
    }

    /// Pick the dataset to open.
    ///
    /// An explicit label must exist; otherwise the first label in sort order
    /// is chosen.
    pub fn resolve(&self, label: Option<&str>) -> Result<String> {
        match label {
            Some(l) => {
                if self.path_for(l).is_file() {
                    Ok(l.to_string())
                } else {
                    Err(DashboardError::DatasetNotFound(l.to_string()))
                }
            }
            None => self
                .list()?
                .into_iter()
                .next()
                .ok_or_else(|| DashboardError::NoDatasets(self.dir.clone())),
        }
    }

    /// Read every row of a stored dataset from disk.
    pub fn load(&self, label: &str) -> Result<Vec<RawEvent>> {
        let path = self.path_for(label);
        if !path.is_file() {
            return Err(DashboardError::DatasetNotFound(label.to_string()));
        }
        load_events(&path)
    }

    /// Store `src` under the label for `today`, replacing any file already
    /// stored for that day.  The source must parse as a care-log CSV.
    ///
    /// Returns the label the dataset was stored under.
    pub fn upload(&self, src: &Path, today: NaiveDate) -> Result<String> {
        let bytes = std::fs::read(src).map_err(|source| DashboardError::FileRead {
            path: src.to_path_buf(),
            source,
        })?;
        let rows = read_events(bytes.as_slice())?.len();

        std::fs::create_dir_all(&self.dir)?;

        let label = date_label(today);
        let dest = self.path_for(&label);
        std::fs::write(&dest, &bytes).map_err(|source| DashboardError::FileRead {
            path: dest.clone(),
            source,
        })?;

        info!("Stored {} rows from {} as {}", rows, src.display(), dest.display());
        Ok(label)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
