use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// One row of a care-log CSV export, before classification.
///
/// Only the columns the dashboard reads are mapped; anything else in the
/// export is ignored.  Empty cells deserialize to `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawEvent {
    /// 0-based position of the row within the file.
    #[serde(skip)]
    pub row_index: usize,
    /// Activity type, e.g. `"Pump"`, `"Feed"`, `"Diaper"`.
    #[serde(rename = "Type")]
    pub kind: String,
    /// Start timestamp as written in the export.
    #[serde(rename = "Start")]
    pub start: String,
    /// `H:MM` duration, absent for instantaneous events.
    #[serde(rename = "Duration", default)]
    pub duration: Option<String>,
    /// Left-side volume for pump rows (`"<n>mL"`).
    #[serde(rename = "Start Condition", default)]
    pub start_condition: Option<String>,
    /// Right-side volume for pump rows (`"<n>mL"`).
    #[serde(rename = "End Condition", default)]
    pub end_condition: Option<String>,
    /// Free-text notes; scanned for pump device names.
    #[serde(rename = "Notes", default)]
    pub notes: Option<String>,
    /// Where a feed started, e.g. `"Breast"` or `"Bottle"`.
    #[serde(rename = "Start Location", default)]
    pub start_location: Option<String>,
}

/// The event-type tags the dashboard processes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Pump,
    Feed,
}

impl EventKind {
    /// Exact, case-sensitive match on the `Type` column.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "Pump" => Some(Self::Pump),
            "Feed" => Some(Self::Feed),
            _ => None,
        }
    }
}

// ── Devices and sides ─────────────────────────────────────────────────────────

/// Pump hardware recognised in session notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PumpType {
    Elvie,
    Spectra,
}

impl PumpType {
    /// Detect the device from free-text notes.
    ///
    /// Case-insensitive substring search; `"elvie"` is checked before
    /// `"spectra"` and the first hit wins.  Missing notes or no hit yield
    /// `None`.
    pub fn detect(notes: Option<&str>) -> Option<Self> {
        let lower = notes?.to_lowercase();
        if lower.contains("elvie") {
            Some(Self::Elvie)
        } else if lower.contains("spectra") {
            Some(Self::Spectra)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Elvie => "Elvie",
            Self::Spectra => "Spectra",
        }
    }
}

impl fmt::Display for PumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which side a melted volume row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breast {
    Left,
    Right,
}

impl Breast {
    pub const BOTH: [Breast; 2] = [Breast::Left, Breast::Right];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }
}

impl fmt::Display for Breast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Grouping key ──────────────────────────────────────────────────────────────

/// X-axis position of an aggregate row.
///
/// `Session` carries the reversed positional row index used in per-session
/// mode; it is a label, not a chronological ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GroupKey {
    Date(NaiveDate),
    Session(usize),
}

impl GroupKey {
    /// Numeric x coordinate for plotting: days since the common era for
    /// dates, the label itself for sessions.
    pub fn as_plot_x(&self) -> f64 {
        match self {
            Self::Date(d) => f64::from(d.num_days_from_ce()),
            Self::Session(n) => *n as f64,
        }
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(d) => Some(*d),
            Self::Session(_) => None,
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Session(n) => write!(f, "#{}", n),
        }
    }
}

// ── Classified records ────────────────────────────────────────────────────────

/// A classified pumping session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PumpSession {
    /// Original file row position.
    pub row_index: usize,
    pub start: NaiveDateTime,
    /// Calendar date or session label, depending on the x-axis unit.
    pub key: GroupKey,
    /// Session length in minutes; `None` when the export left it blank.
    pub duration_min: Option<f64>,
    pub left_ml: f64,
    pub right_ml: f64,
    pub pump_type: Option<PumpType>,
}

impl PumpSession {
    pub fn total_ml(&self) -> f64 {
        self.left_ml + self.right_ml
    }

    /// Volume recorded for one side.
    pub fn volume(&self, breast: Breast) -> f64 {
        match breast {
            Breast::Left => self.left_ml,
            Breast::Right => self.right_ml,
        }
    }
}

/// A classified nursing event (feeds started at the breast only).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEvent {
    pub row_index: usize,
    pub start: NaiveDateTime,
    pub date: NaiveDate,
    pub duration_min: Option<f64>,
}

// ── Render parameters ─────────────────────────────────────────────────────────

/// X-axis time unit for volume charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum XAxisUnit {
    #[default]
    PerDay,
    PerSession,
}

impl XAxisUnit {
    pub fn toggled(self) -> Self {
        match self {
            Self::PerDay => Self::PerSession,
            Self::PerSession => Self::PerDay,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PerDay => "Per Day",
            Self::PerSession => "Per Session",
        }
    }
}

/// Number of aggregated points averaged by the rolling charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingWindow(usize);

impl RollingWindow {
    pub const MIN: usize = 5;
    pub const MAX: usize = 14;
    pub const DEFAULT: usize = 7;

    pub fn new(size: usize) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&size) {
            Ok(Self(size))
        } else {
            Err(DashboardError::InvalidWindow(size))
        }
    }

    pub fn size(&self) -> usize {
        self.0
    }

    /// One step larger, saturating at [`Self::MAX`].
    pub fn increment(self) -> Self {
        Self((self.0 + 1).min(Self::MAX))
    }

    /// One step smaller, saturating at [`Self::MIN`].
    pub fn decrement(self) -> Self {
        Self(self.0.saturating_sub(1).max(Self::MIN))
    }
}

impl Default for RollingWindow {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Everything a single chart render depends on.
///
/// Passed explicitly into the pipelines and the composer; there is no
/// ambient UI state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderParams {
    /// Plot volume per minute instead of raw volume.
    pub normalize: bool,
    /// Partition series by detected pump device.
    pub split_by_pump_type: bool,
    pub x_unit: XAxisUnit,
    /// `Some` switches the volume chart to rolling-mean mode.
    pub rolling: Option<RollingWindow>,
}

impl Default for RenderParams {
    fn default() -> Self {
        Self {
            normalize: true,
            split_by_pump_type: false,
            x_unit: XAxisUnit::PerDay,
            rolling: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pump_type_detect_elvie() {
        assert_eq!(
            PumpType::detect(Some("Elvie pump session")),
            Some(PumpType::Elvie)
        );
    }

    #[test]
    fn test_pump_type_detect_spectra_case_insensitive() {
        assert_eq!(PumpType::detect(Some("used SPECTRA")), Some(PumpType::Spectra));
        assert_eq!(PumpType::detect(Some("used spectra")), Some(PumpType::Spectra));
    }

    #[test]
    fn test_pump_type_detect_elvie_wins_over_spectra() {
        assert_eq!(
            PumpType::detect(Some("spectra then elvie")),
            Some(PumpType::Elvie)
        );
    }

    #[test]
    fn test_pump_type_detect_none() {
        assert_eq!(PumpType::detect(Some("manual")), None);
        assert_eq!(PumpType::detect(None), None);
    }

    #[test]
    fn test_event_kind_is_case_sensitive() {
        assert_eq!(EventKind::from_tag("Pump"), Some(EventKind::Pump));
        assert_eq!(EventKind::from_tag("Feed"), Some(EventKind::Feed));
        assert_eq!(EventKind::from_tag("pump"), None);
        assert_eq!(EventKind::from_tag("Diaper"), None);
    }

    #[test]
    fn test_group_key_ordering_by_date() {
        let a = GroupKey::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        let b = GroupKey::Date(NaiveDate::from_ymd_opt(2024, 1, 10).unwrap());
        assert!(a < b);
        assert!(GroupKey::Session(3) < GroupKey::Session(12));
    }

    #[test]
    fn test_group_key_display() {
        let d = GroupKey::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(d.to_string(), "2024-03-05");
        assert_eq!(GroupKey::Session(7).to_string(), "#7");
    }

    #[test]
    fn test_group_key_serializes_untagged() {
        let d = GroupKey::Date(NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"2024-03-05\"");
        assert_eq!(serde_json::to_string(&GroupKey::Session(4)).unwrap(), "4");
    }

    #[test]
    fn test_group_key_plot_x_consecutive_days() {
        let a = GroupKey::Date(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
        let b = GroupKey::Date(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(b.as_plot_x() - a.as_plot_x(), 1.0);
    }

    #[test]
    fn test_pump_session_total() {
        let s = PumpSession {
            row_index: 0,
            start: NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            key: GroupKey::Session(0),
            duration_min: Some(20.0),
            left_ml: 20.0,
            right_ml: 15.0,
            pump_type: None,
        };
        assert_eq!(s.total_ml(), 35.0);
        assert_eq!(s.volume(Breast::Left), 20.0);
        assert_eq!(s.volume(Breast::Right), 15.0);
    }

    #[test]
    fn test_rolling_window_bounds() {
        assert!(RollingWindow::new(4).is_err());
        assert!(RollingWindow::new(15).is_err());
        assert_eq!(RollingWindow::new(5).unwrap().size(), 5);
        assert_eq!(RollingWindow::new(14).unwrap().size(), 14);
        assert_eq!(RollingWindow::default().size(), 7);
    }

    #[test]
    fn test_rolling_window_saturates() {
        let max = RollingWindow::new(14).unwrap();
        assert_eq!(max.increment().size(), 14);
        let min = RollingWindow::new(5).unwrap();
        assert_eq!(min.decrement().size(), 5);
        assert_eq!(min.increment().size(), 6);
    }

    #[test]
    fn test_render_params_defaults() {
        let p = RenderParams::default();
        assert!(p.normalize);
        assert!(!p.split_by_pump_type);
        assert_eq!(p.x_unit, XAxisUnit::PerDay);
        assert!(p.rolling.is_none());
    }

    #[test]
    fn test_x_axis_unit_toggle() {
        assert_eq!(XAxisUnit::PerDay.toggled(), XAxisUnit::PerSession);
        assert_eq!(XAxisUnit::PerSession.toggled(), XAxisUnit::PerDay);
    }
}
