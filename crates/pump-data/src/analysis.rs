//! Chart-ready analysis pipelines.
//!
//! Each function takes the raw rows of one dataset plus explicit
//! [`RenderParams`] and recomputes everything from scratch; nothing is cached
//! between calls.

use chrono::NaiveDate;
use pump_core::error::Result;
use pump_core::models::{EventKind, RawEvent, RenderParams, XAxisUnit};
use pump_core::time_utils::parse_start_timestamp;
use tracing::debug;

use crate::aggregator::{DurationRow, SessionAggregator, VolumeRow};
use crate::classifier::{classify, classify_feeds, classify_pumps};
use crate::normalizer::{normalize, RateRow};

// ── Volume chart ──────────────────────────────────────────────────────────────

/// Aggregates behind one pumped-volume chart.
#[derive(Debug, Clone)]
pub struct VolumeAnalysis {
    pub params: RenderParams,
    /// Per-breast volume (rolling means when `params.rolling` is set).
    pub volume: Vec<VolumeRow>,
    /// Pumping time per group (rolling means when `params.rolling` is set).
    pub duration: Vec<DurationRow>,
    /// Joined throughput rows; `Some` only when `params.normalize` is set.
    pub rates: Option<Vec<RateRow>>,
}

/// Run the pumping pipeline: classify → melt → aggregate → [roll] → [join].
pub fn analyze_volume(events: &[RawEvent], params: &RenderParams) -> Result<VolumeAnalysis> {
    let split = params.split_by_pump_type;
    let pumps = classify_pumps(events, params.x_unit)?;

    let melted = SessionAggregator::melt_breasts(&pumps);
    let mut volume = SessionAggregator::aggregate_volume(&melted, split);
    let mut duration = SessionAggregator::aggregate_duration(&pumps, split);

    if let Some(window) = params.rolling {
        volume = SessionAggregator::rolling_volume(&volume, window, split);
        duration = SessionAggregator::rolling_duration(&duration, window, split);
    }

    let rates = params
        .normalize
        .then(|| normalize(&duration, &volume, split));

    debug!(
        "Volume pipeline: {} sessions, {} volume rows, {} duration rows, {} rate rows",
        pumps.len(),
        volume.len(),
        duration.len(),
        rates.as_ref().map_or(0, Vec::len)
    );

    Ok(VolumeAnalysis {
        params: *params,
        volume,
        duration,
        rates,
    })
}

// ── Feeding-duration chart ────────────────────────────────────────────────────

/// Daily time totals for the feeding-duration comparison.
#[derive(Debug, Clone, Default)]
pub struct FeedingAnalysis {
    /// Pumping minutes per calendar date.
    pub pumping: Vec<(NaiveDate, f64)>,
    /// Nursing minutes per calendar date (feeds started at the breast).
    pub nursing: Vec<(NaiveDate, f64)>,
    /// Sum of both, only for dates present in both series.
    pub combined: Vec<(NaiveDate, f64)>,
}

/// Total pumping and nursing time per day.
///
/// Pumping is always keyed by calendar date here, whatever x-axis unit the
/// volume charts use.
pub fn analyze_feeding(events: &[RawEvent]) -> Result<FeedingAnalysis> {
    let pumps = classify_pumps(events, XAxisUnit::PerDay)?;
    let feeds = classify_feeds(events)?;

    let pumping = SessionAggregator::minutes_by_date(
        pumps.iter().map(|p| (p.start.date(), p.duration_min)),
    );
    let nursing =
        SessionAggregator::minutes_by_date(feeds.iter().map(|f| (f.date, f.duration_min)));

    let combined: Vec<(NaiveDate, f64)> = pumping
        .iter()
        .filter_map(|(date, pumped)| nursing.get(date).map(|nursed| (*date, pumped + nursed)))
        .collect();

    Ok(FeedingAnalysis {
        pumping: pumping.into_iter().collect(),
        nursing: nursing.into_iter().collect(),
        combined,
    })
}

// ── Summary ───────────────────────────────────────────────────────────────────

/// Headline counts for a loaded dataset.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct DatasetSummary {
    pub rows: usize,
    pub pump_sessions: usize,
    pub nursing_feeds: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub total_pumped_ml: f64,
}

/// Count rows and find the covered date range of pump and feed events.
pub fn summarize(events: &[RawEvent]) -> Result<DatasetSummary> {
    let classified = classify(events, XAxisUnit::PerDay)?;

    let mut dates = Vec::new();
    for event in events
        .iter()
        .filter(|e| EventKind::from_tag(&e.kind).is_some())
    {
        if let Ok(ts) = parse_start_timestamp(&event.start) {
            dates.push(ts.date());
        }
    }

    Ok(DatasetSummary {
        rows: events.len(),
        pump_sessions: classified.pumps.len(),
        nursing_feeds: classified.feeds.len(),
        first_date: dates.iter().min().copied(),
        last_date: dates.iter().max().copied(),
        total_pumped_ml: classified.pumps.iter().map(|p| p.total_ml()).sum(),
    })
}

// ── Whole dashboard ───────────────────────────────────────────────────────────

/// Everything the dashboard draws for one dataset.
#[derive(Debug, Clone)]
pub struct DashboardAnalysis {
    pub summary: DatasetSummary,
    pub per_timepoint: VolumeAnalysis,
    pub feeding: FeedingAnalysis,
    pub rolling: VolumeAnalysis,
}

/// Run every pipeline against the same rows.
///
/// `rolling` is used as given; callers set its `rolling` window.
pub fn analyze_dataset(
    events: &[RawEvent],
    per_timepoint: &RenderParams,
    rolling: &RenderParams,
) -> Result<DashboardAnalysis> {
    Ok(DashboardAnalysis {
        summary: summarize(events)?,
        per_timepoint: analyze_volume(events, per_timepoint)?,
        feeding: analyze_feeding(events)?,
        rolling: analyze_volume(events, rolling)?,
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pump_core::models::{Breast, GroupKey, PumpType, RollingWindow};

    fn pump(row: usize, start: &str, dur: &str, left: &str, right: &str, notes: &str) -> RawEvent {
        RawEvent {
            row_index: row,
            kind: "Pump".to_string(),
            start: start.to_string(),
            duration: Some(dur.to_string()),
            start_condition: Some(left.to_string()),
            end_condition: Some(right.to_string()),
            notes: Some(notes.to_string()),
            start_location: None,
        }
    }

    fn feed(row: usize, start: &str, dur: &str, location: &str) -> RawEvent {
        RawEvent {
            row_index: row,
            kind: "Feed".to_string(),
            start: start.to_string(),
            duration: Some(dur.to_string()),
            start_location: Some(location.to_string()),
            ..Default::default()
        }
    }

    fn two_device_day() -> Vec<RawEvent> {
        vec![
            pump(0, "2024-03-01 07:00", "0:20", "10mL", "8mL", "Elvie"),
            pump(1, "2024-03-01 13:00", "0:25", "12mL", "14mL", "spectra at work"),
        ]
    }

    fn split() -> RenderParams {
        RenderParams {
            normalize: false,
            split_by_pump_type: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_split_day_has_four_volume_rows_and_two_durations() {
        let analysis = analyze_volume(&two_device_day(), &split()).unwrap();

        assert_eq!(analysis.volume.len(), 4);
        assert_eq!(analysis.duration.len(), 2);
        assert!(analysis.rates.is_none());

        let elvie_left = analysis
            .volume
            .iter()
            .find(|r| r.breast == Breast::Left && r.pump_type == Some(PumpType::Elvie))
            .unwrap();
        assert_eq!(elvie_left.volume_ml, 10.0);
    }

    #[test]
    fn test_unsplit_day_sums_devices() {
        let params = RenderParams {
            normalize: false,
            ..Default::default()
        };
        let analysis = analyze_volume(&two_device_day(), &params).unwrap();

        assert_eq!(analysis.volume.len(), 2);
        assert_eq!(analysis.volume[0].volume_ml, 22.0);
        assert_eq!(analysis.volume[1].volume_ml, 22.0);
        assert_eq!(analysis.duration.len(), 1);
        assert_eq!(analysis.duration[0].duration_min, 45.0);
    }

    #[test]
    fn test_normalized_rates_per_day() {
        let analysis = analyze_volume(&two_device_day(), &RenderParams::default()).unwrap();
        let rates = analysis.rates.unwrap();

        assert_eq!(rates.len(), 2);
        assert!(rates.iter().all(|r| (r.rate - 22.0 / 45.0).abs() < 1e-12));
    }

    #[test]
    fn test_per_session_keys() {
        let params = RenderParams {
            normalize: false,
            x_unit: XAxisUnit::PerSession,
            ..Default::default()
        };
        let analysis = analyze_volume(&two_device_day(), &params).unwrap();
        let keys: Vec<GroupKey> = analysis.duration.iter().map(|d| d.key).collect();
        assert_eq!(keys, vec![GroupKey::Session(0), GroupKey::Session(1)]);
    }

    #[test]
    fn test_rolling_pipeline_applies_window() {
        let events: Vec<RawEvent> = (1..=10)
            .map(|d| {
                pump(
                    d as usize,
                    &format!("2024-03-{:02} 07:00", d),
                    "0:10",
                    &format!("{}mL", d),
                    "1mL",
                    "",
                )
            })
            .collect();
        let params = RenderParams {
            normalize: false,
            rolling: Some(RollingWindow::new(7).unwrap()),
            ..Default::default()
        };

        let analysis = analyze_volume(&events, &params).unwrap();
        let left: Vec<&VolumeRow> = analysis
            .volume
            .iter()
            .filter(|r| r.breast == Breast::Left)
            .collect();
        assert_eq!(left.len(), 3);
        assert_eq!(left[0].volume_ml, 9.0);
        assert_eq!(analysis.duration.len(), 3);
    }

    #[test]
    fn test_rolling_split_then_normalize() {
        let events: Vec<RawEvent> = (1..=8u32)
            .flat_map(|d| {
                [
                    pump(
                        2 * d as usize,
                        &format!("2024-03-{:02} 07:00", d),
                        "0:10",
                        &format!("{}mL", d),
                        "0mL",
                        "Elvie",
                    ),
                    pump(
                        2 * d as usize + 1,
                        &format!("2024-03-{:02} 13:00", d),
                        "0:20",
                        &format!("{}mL", 2 * d),
                        "0mL",
                        "Spectra",
                    ),
                ]
            })
            .collect();
        let params = RenderParams {
            normalize: true,
            split_by_pump_type: true,
            rolling: Some(RollingWindow::new(5).unwrap()),
            ..Default::default()
        };

        let analysis = analyze_volume(&events, &params).unwrap();
        let rates = analysis.rates.unwrap();
        assert_eq!(rates.len(), 6);
        assert!(rates.iter().all(|r| r.breast == Breast::Left));

        let date = |d: u32| GroupKey::Date(NaiveDate::from_ymd_opt(2024, 3, d).unwrap());
        let rate_at = |d: u32, pump_type: PumpType| {
            rates
                .iter()
                .find(|r| r.key == date(d) && r.pump_type == Some(pump_type))
                .unwrap()
        };

        let elvie = rate_at(6, PumpType::Elvie);
        assert!((elvie.volume_ml - 7.0).abs() < 1e-12);
        assert!((elvie.duration_min - 10.0).abs() < 1e-12);
        assert!((elvie.rate - 0.7).abs() < 1e-12);

        let spectra = rate_at(6, PumpType::Spectra);
        assert!((spectra.volume_ml - 14.0).abs() < 1e-12);
        assert!((spectra.rate - 0.7).abs() < 1e-12);

        assert!((rate_at(7, PumpType::Elvie).rate - 0.75).abs() < 1e-12);
        assert!((rate_at(8, PumpType::Spectra).rate - 0.8).abs() < 1e-12);
        assert!(rates.iter().all(|r| r.key >= date(6)));
    }

    #[test]
    fn test_feeding_combined_only_on_shared_dates() {
        let events = vec![
            pump(0, "2024-03-01 07:00", "0:20", "10mL", "8mL", ""),
            pump(1, "2024-03-02 07:00", "0:30", "10mL", "8mL", ""),
            feed(2, "2024-03-02 09:00", "0:15", "Breast"),
            feed(3, "2024-03-03 09:00", "0:40", "Breast"),
            feed(4, "2024-03-02 11:00", "0:50", "Bottle"),
        ];
        let analysis = analyze_feeding(&events).unwrap();

        assert_eq!(analysis.pumping.len(), 2);
        assert_eq!(analysis.nursing.len(), 2);
        assert_eq!(analysis.nursing[0].1, 15.0);
        assert_eq!(analysis.combined.len(), 1);
        assert_eq!(
            analysis.combined[0],
            (NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(), 45.0)
        );
    }

    #[test]
    fn test_summary_counts() {
        let mut events = two_device_day();
        events.push(feed(2, "2024-03-04 09:00", "0:15", "Breast"));
        events.push(RawEvent {
            row_index: 3,
            kind: "Diaper".to_string(),
            start: "whenever".to_string(),
            ..Default::default()
        });

        let summary = summarize(&events).unwrap();
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.pump_sessions, 2);
        assert_eq!(summary.nursing_feeds, 1);
        assert_eq!(summary.first_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(summary.last_date, NaiveDate::from_ymd_opt(2024, 3, 4));
        assert_eq!(summary.total_pumped_ml, 44.0);
    }

    #[test]
    fn test_analyze_dataset_runs_all_pipelines() {
        let rolling = RenderParams {
            rolling: Some(RollingWindow::default()),
            ..Default::default()
        };
        let analysis =
            analyze_dataset(&two_device_day(), &RenderParams::default(), &rolling).unwrap();

        assert_eq!(analysis.summary.pump_sessions, 2);
        assert!(analysis.per_timepoint.rates.is_some());
        assert_eq!(analysis.feeding.pumping.len(), 1);
        assert!(analysis.rolling.volume.is_empty());
    }
}
