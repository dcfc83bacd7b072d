//! Splits a raw care log into pumping sessions and nursing feeds.

use pump_core::error::Result;
use pump_core::models::{
    EventKind, FeedEvent, GroupKey, PumpSession, PumpType, RawEvent, XAxisUnit,
};
use pump_core::time_utils::{optional_minutes, parse_start_timestamp, parse_volume_ml};
use tracing::debug;

/// Feeds only count as nursing time when they start here.
pub const NURSING_LOCATION: &str = "Breast";

/// The pump and feed subsets of one dataset.
#[derive(Debug, Clone, Default)]
pub struct Classified {
    pub pumps: Vec<PumpSession>,
    pub feeds: Vec<FeedEvent>,
}

/// Classify every row of `events`.
///
/// Rows whose `Type` is neither `Pump` nor `Feed` are skipped.  Any parse
/// failure on a kept row aborts the whole classification.
pub fn classify(events: &[RawEvent], x_unit: XAxisUnit) -> Result<Classified> {
    let pumps = classify_pumps(events, x_unit)?;
    let feeds = classify_feeds(events)?;

    debug!(
        "Classified {} rows: {} pump sessions, {} nursing feeds",
        events.len(),
        pumps.len(),
        feeds.len()
    );

    Ok(Classified { pumps, feeds })
}

/// Build [`PumpSession`]s from the `Pump` rows, in file order.
///
/// With [`XAxisUnit::PerSession`] the k-th pump row is keyed by the original
/// row index of the k-th pump row counted from the end of the file.
pub fn classify_pumps(events: &[RawEvent], x_unit: XAxisUnit) -> Result<Vec<PumpSession>> {
    let rows: Vec<&RawEvent> = events
        .iter()
        .filter(|e| EventKind::from_tag(&e.kind) == Some(EventKind::Pump))
        .collect();

    let session_labels: Vec<usize> = rows.iter().rev().map(|e| e.row_index).collect();

    rows.iter()
        .zip(session_labels)
        .map(|(event, session)| {
            let start = parse_start_timestamp(&event.start)?;
            let key = match x_unit {
                XAxisUnit::PerDay => GroupKey::Date(start.date()),
                XAxisUnit::PerSession => GroupKey::Session(session),
            };

            Ok(PumpSession {
                row_index: event.row_index,
                start,
                key,
                duration_min: optional_minutes(event.duration.as_deref())?,
                left_ml: parse_volume_ml(event.start_condition.as_deref())?,
                right_ml: parse_volume_ml(event.end_condition.as_deref())?,
                pump_type: PumpType::detect(event.notes.as_deref()),
            })
        })
        .collect()
}

/// Build [`FeedEvent`]s from `Feed` rows that started at the breast.
///
/// The location match is exact and case-sensitive.
pub fn classify_feeds(events: &[RawEvent]) -> Result<Vec<FeedEvent>> {
    events
        .iter()
        .filter(|e| EventKind::from_tag(&e.kind) == Some(EventKind::Feed))
        .filter(|e| e.start_location.as_deref() == Some(NURSING_LOCATION))
        .map(|event| {
            let start = parse_start_timestamp(&event.start)?;
            Ok(FeedEvent {
                row_index: event.row_index,
                start,
                date: start.date(),
                duration_min: optional_minutes(event.duration.as_deref())?,
            })
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
