//! Volume-per-minute throughput.

use std::collections::HashMap;

use pump_core::models::{Breast, GroupKey, PumpType};

use crate::aggregator::{DurationRow, VolumeRow};

/// A volume row joined with the pumping time of its group.
#[derive(Debug, Clone, PartialEq)]
pub struct RateRow {
    pub key: GroupKey,
    pub breast: Breast,
    pub pump_type: Option<PumpType>,
    pub volume_ml: f64,
    pub duration_min: f64,
    /// `volume_ml / duration_min`; infinite or NaN when the duration is zero.
    pub rate: f64,
}

/// Inner-join durations and volumes on the key (and pump type when `split`)
/// and divide.
///
/// Volume rows with no matching duration, and durations with no matching
/// volume, produce no output.  Output follows the duration order, with the
/// matching volume rows in their own order inside each duration.
pub fn normalize(durations: &[DurationRow], volumes: &[VolumeRow], split: bool) -> Vec<RateRow> {
    let join_key = |key: GroupKey, pump_type: Option<PumpType>| {
        (key, if split { pump_type } else { None })
    };

    let mut by_key: HashMap<(GroupKey, Option<PumpType>), Vec<&VolumeRow>> = HashMap::new();
    for v in volumes {
        by_key
            .entry(join_key(v.key, v.pump_type))
            .or_default()
            .push(v);
    }

    durations
        .iter()
        .flat_map(|d| {
            by_key
                .get(&join_key(d.key, d.pump_type))
                .into_iter()
                .flatten()
                .map(move |v| RateRow {
                    key: v.key,
                    breast: v.breast,
                    pump_type: v.pump_type,
                    volume_ml: v.volume_ml,
                    duration_min: d.duration_min,
                    rate: v.volume_ml / d.duration_min,
                })
        })
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
