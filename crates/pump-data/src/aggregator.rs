//! Volume and duration aggregation over dates or sessions.
//!
//! All outputs are sorted by their grouping key so that downstream rolling
//! windows and charts see each series in x-axis order.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use pump_core::models::{Breast, GroupKey, PumpSession, PumpType, RollingWindow};
use tracing::debug;

// ── Rows ──────────────────────────────────────────────────────────────────────

/// Pumped volume for one side within one group.
///
/// Also used for the "long" per-session rows produced by
/// [`SessionAggregator::melt_breasts`].
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeRow {
    pub key: GroupKey,
    pub breast: Breast,
    /// `None` outside split-by-device mode, or for sessions with no
    /// recognised device.
    pub pump_type: Option<PumpType>,
    pub volume_ml: f64,
}

/// Total pumping time within one group.
#[derive(Debug, Clone, PartialEq)]
pub struct DurationRow {
    pub key: GroupKey,
    pub pump_type: Option<PumpType>,
    pub duration_min: f64,
}

// ── SessionAggregator ─────────────────────────────────────────────────────────

/// Stateless helper that groups pump sessions by date or session label.
pub struct SessionAggregator;

impl SessionAggregator {
    /// Reshape each session into one row per side, dropping zero volumes.
    pub fn melt_breasts(pumps: &[PumpSession]) -> Vec<VolumeRow> {
        pumps
            .iter()
            .flat_map(|p| {
                Breast::BOTH.into_iter().map(move |breast| VolumeRow {
                    key: p.key,
                    breast,
                    pump_type: p.pump_type,
                    volume_ml: p.volume(breast),
                })
            })
            .filter(|row| row.volume_ml != 0.0)
            .collect()
    }

    /// Sum melted volumes per (key, breast) or, when `split`, per
    /// (key, breast, pump type).  Rows without a device are dropped in split
    /// mode.
    pub fn aggregate_volume(melted: &[VolumeRow], split: bool) -> Vec<VolumeRow> {
        let mut sums: BTreeMap<(GroupKey, Breast, Option<PumpType>), f64> = BTreeMap::new();

        for row in melted {
            let Some(pump_type) = device_key(row.pump_type, split) else {
                continue;
            };
            *sums.entry((row.key, row.breast, pump_type)).or_insert(0.0) += row.volume_ml;
        }

        let rows: Vec<VolumeRow> = sums
            .into_iter()
            .map(|((key, breast, pump_type), volume_ml)| VolumeRow {
                key,
                breast,
                pump_type,
                volume_ml,
            })
            .collect();

        debug!("Aggregated {} melted rows into {} volume rows", melted.len(), rows.len());
        rows
    }

    /// Sum session durations per key or, when `split`, per (key, pump type).
    ///
    /// Sessions without a duration are skipped, as are sessions without a
    /// device in split mode.
    pub fn aggregate_duration(pumps: &[PumpSession], split: bool) -> Vec<DurationRow> {
        let mut sums: BTreeMap<(GroupKey, Option<PumpType>), f64> = BTreeMap::new();

        for p in pumps {
            let Some(minutes) = p.duration_min else {
                continue;
            };
            let Some(pump_type) = device_key(p.pump_type, split) else {
                continue;
            };
            *sums.entry((p.key, pump_type)).or_insert(0.0) += minutes;
        }

        sums.into_iter()
            .map(|((key, pump_type), duration_min)| DurationRow {
                key,
                pump_type,
                duration_min,
            })
            .collect()
    }

    /// Replace aggregated volumes by forward rolling means, per breast (and
    /// per device when `split`).
    pub fn rolling_volume(
        rows: &[VolumeRow],
        window: RollingWindow,
        split: bool,
    ) -> Vec<VolumeRow> {
        let mut groups: BTreeMap<(Breast, Option<PumpType>), Vec<(GroupKey, f64)>> =
            BTreeMap::new();
        for row in rows {
            let Some(pump_type) = device_key(row.pump_type, split) else {
                continue;
            };
            groups
                .entry((row.breast, pump_type))
                .or_default()
                .push((row.key, row.volume_ml));
        }

        groups
            .into_iter()
            .flat_map(|((breast, pump_type), mut series)| {
                series.sort_by_key(|(key, _)| *key);
                forward_rolling_mean(&series, window.size())
                    .into_iter()
                    .map(move |(key, volume_ml)| VolumeRow {
                        key,
                        breast,
                        pump_type,
                        volume_ml,
                    })
            })
            .collect()
    }

    /// Replace aggregated durations by forward rolling means, per device when
    /// `split`, otherwise over the whole series.
    pub fn rolling_duration(
        rows: &[DurationRow],
        window: RollingWindow,
        split: bool,
    ) -> Vec<DurationRow> {
        let mut groups: BTreeMap<Option<PumpType>, Vec<(GroupKey, f64)>> = BTreeMap::new();
        for row in rows {
            let Some(pump_type) = device_key(row.pump_type, split) else {
                continue;
            };
            groups
                .entry(pump_type)
                .or_default()
                .push((row.key, row.duration_min));
        }

        groups
            .into_iter()
            .flat_map(|(pump_type, mut series)| {
                series.sort_by_key(|(key, _)| *key);
                forward_rolling_mean(&series, window.size())
                    .into_iter()
                    .map(move |(key, duration_min)| DurationRow {
                        key,
                        pump_type,
                        duration_min,
                    })
            })
            .collect()
    }

    /// Total minutes per calendar date, skipping entries without a duration.
    pub fn minutes_by_date(
        entries: impl IntoIterator<Item = (NaiveDate, Option<f64>)>,
    ) -> BTreeMap<NaiveDate, f64> {
        let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        for (date, minutes) in entries {
            if let Some(m) = minutes {
                *sums.entry(date).or_insert(0.0) += m;
            }
        }
        sums
    }
}

/// Forward-looking rolling mean over an ordered series.
///
/// Emits one point for every index `i` in `window..len`, labelled with the
/// key at `i` and holding the mean of `values[i..i + window]`.  Near the end
/// of the series the slice is clipped to the points that exist, so the last
/// point averages itself alone.  Series with `len <= window` produce nothing.
pub fn forward_rolling_mean(series: &[(GroupKey, f64)], window: usize) -> Vec<(GroupKey, f64)> {
    if window == 0 {
        return Vec::new();
    }

    (window..series.len())
        .map(|i| {
            let end = (i + window).min(series.len());
            let slice = &series[i..end];
            let mean = slice.iter().map(|(_, v)| v).sum::<f64>() / slice.len() as f64;
            (series[i].0, mean)
        })
        .collect()
}

/// Grouping device for a row: `Some(None)` when not splitting, `Some(Some(_))`
/// for a known device under split, `None` when the row must be dropped.
fn device_key(pump_type: Option<PumpType>, split: bool) -> Option<Option<PumpType>> {
    if split {
        pump_type.map(Some)
    } else {
        Some(None)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
