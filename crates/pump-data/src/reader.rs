//! CSV loading for care-log exports.
//!
//! Reads every row into a [`RawEvent`], keeping its position in the file so
//! that per-session labels can be derived later.  Nothing is filtered here;
//! classification happens in [`crate::classifier`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use pump_core::error::{DashboardError, Result};
use pump_core::models::RawEvent;
use tracing::debug;

/// Load all rows of the CSV file at `path`.
pub fn load_events(path: &Path) -> Result<Vec<RawEvent>> {
    let file = File::open(path).map_err(|source| DashboardError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let events = read_events(file)?;
    debug!("Loaded {} rows from {}", events.len(), path.display());
    Ok(events)
}

/// Parse CSV rows from any reader.
///
/// Rows may have differing field counts; header names are trimmed.  Columns
/// the dashboard does not use are ignored and empty cells become `None`.
pub fn read_events<R: Read>(reader: R) -> Result<Vec<RawEvent>> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut events = Vec::new();
    for (row_index, record) in rdr.deserialize::<RawEvent>().enumerate() {
        let mut event = record?;
        event.row_index = row_index;
        events.push(event);
    }

    Ok(events)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
