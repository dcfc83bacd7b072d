//! Builds renderer-neutral [`Figure`]s from analysis results.
//!
//! A figure is a list of line traces plus axis titles.  The terminal view and
//! the Plotly export both draw from the same figure, so every styling
//! decision (which series exist, their names, dash style, axis) is made here.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use pump_core::models::{Breast, GroupKey, PumpType};
use pump_data::analysis::{DashboardAnalysis, FeedingAnalysis, VolumeAnalysis};
use serde::Serialize;

pub const VOLUME_AXIS_TITLE: &str = "Volume (mL)";
pub const RATE_AXIS_TITLE: &str = "Volume (mL) / min";
pub const DURATION_AXIS_TITLE: &str = "Duration (min)";
pub const DATE_AXIS_TITLE: &str = "Date";
pub const FEEDING_AXIS_TITLE: &str = "Total Time (minutes)";

/// Legend group of the duration trace when not split by device.
pub const ALL_SESSIONS_GROUP: &str = "All";

pub const PUMPING_SERIES: &str = "pumping";
pub const NURSING_SERIES: &str = "nursing/SNS";
pub const COMBINED_SERIES: &str = "Both Combined";

// ── Figure model ──────────────────────────────────────────────────────────────

/// Which y axis a trace is scaled against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum YAxisSide {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    Solid,
    Dash,
}

/// Trace colour, resolved to a concrete colour by each renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesColor {
    /// Index into the renderer's qualitative palette.
    Palette(usize),
    /// Uniform grey.
    Neutral,
}

/// One line on a chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trace {
    /// Legend label.
    pub name: String,
    /// Colour key the trace was built from, e.g. `"left: Elvie"`.
    pub legend_group: String,
    pub x: Vec<GroupKey>,
    pub y: Vec<f64>,
    pub color: SeriesColor,
    pub dash: LineDash,
    pub markers: bool,
    pub axis: YAxisSide,
}

impl Trace {
    /// `(x, y)` pairs in the order they were added.
    pub fn points(&self) -> impl Iterator<Item = (GroupKey, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisLabel {
    pub title: String,
}

impl AxisLabel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// A complete chart description.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Figure {
    pub title: String,
    pub x_axis: AxisLabel,
    pub y_axis: AxisLabel,
    /// Right-hand axis, present only when some trace uses it.
    pub y2_axis: Option<AxisLabel>,
    pub traces: Vec<Trace>,
    pub width: u32,
    pub height: u32,
}

impl Figure {
    pub fn primary_traces(&self) -> impl Iterator<Item = &Trace> {
        self.traces.iter().filter(|t| t.axis == YAxisSide::Primary)
    }

    pub fn secondary_traces(&self) -> impl Iterator<Item = &Trace> {
        self.traces.iter().filter(|t| t.axis == YAxisSide::Secondary)
    }

    pub fn is_empty(&self) -> bool {
        self.traces.iter().all(|t| t.x.is_empty())
    }
}

// ── Volume chart ──────────────────────────────────────────────────────────────

/// Compose the pumped-volume chart.
///
/// One solid line with markers per breast (or per `"breast: device"` when
/// split), plotting volume or, when normalized, volume per minute.  Without
/// normalization the pumping time is overlaid as dashed lines on a second y
/// axis, one per device when split, otherwise a single grey line.
pub fn compose_volume_figure(analysis: &VolumeAnalysis, title: &str) -> Figure {
    let params = analysis.params;
    let split = params.split_by_pump_type;

    let mut primary: BTreeMap<(Breast, Option<PumpType>), Vec<(GroupKey, f64)>> = BTreeMap::new();
    match &analysis.rates {
        Some(rates) => {
            for r in rates {
                primary
                    .entry((r.breast, r.pump_type))
                    .or_default()
                    .push((r.key, r.rate));
            }
        }
        None => {
            for v in &analysis.volume {
                primary
                    .entry((v.breast, v.pump_type))
                    .or_default()
                    .push((v.key, v.volume_ml));
            }
        }
    }

    let mut traces: Vec<Trace> = primary
        .into_iter()
        .enumerate()
        .map(|(i, ((breast, pump_type), points))| {
            let group = volume_color_key(breast, pump_type, split);
            line_trace(group.clone(), group, points, SeriesColor::Palette(i))
        })
        .collect();

    if params.normalize {
        return Figure {
            title: title.to_string(),
            x_axis: AxisLabel::new(DATE_AXIS_TITLE),
            y_axis: AxisLabel::new(RATE_AXIS_TITLE),
            y2_axis: None,
            traces,
            width: 1000,
            height: 500,
        };
    }

    let mut durations: BTreeMap<Option<PumpType>, Vec<(GroupKey, f64)>> = BTreeMap::new();
    for d in &analysis.duration {
        durations
            .entry(if split { d.pump_type } else { None })
            .or_default()
            .push((d.key, d.duration_min));
    }

    traces.extend(
        durations
            .into_iter()
            .enumerate()
            .map(|(i, (pump_type, points))| {
                let group = match pump_type {
                    Some(p) if split => p.to_string(),
                    _ => ALL_SESSIONS_GROUP.to_string(),
                };
                let color = if split {
                    SeriesColor::Palette(i)
                } else {
                    SeriesColor::Neutral
                };
                let mut trace = line_trace(format!("{}: Duration", group), group, points, color);
                trace.dash = LineDash::Dash;
                trace.markers = false;
                trace.axis = YAxisSide::Secondary;
                trace
            }),
    );

    Figure {
        title: title.to_string(),
        x_axis: AxisLabel::new(DATE_AXIS_TITLE),
        y_axis: AxisLabel::new(VOLUME_AXIS_TITLE),
        y2_axis: Some(AxisLabel::new(DURATION_AXIS_TITLE)),
        traces,
        width: 1100,
        height: 500,
    }
}

/// `"left"` or, when split by device, `"left: Elvie"`.
pub fn volume_color_key(breast: Breast, pump_type: Option<PumpType>, split: bool) -> String {
    match pump_type {
        Some(p) if split => format!("{}: {}", breast, p),
        _ => breast.to_string(),
    }
}

// ── Feeding chart ─────────────────────────────────────────────────────────────

/// Compose the daily pumping vs nursing time comparison.
pub fn compose_feeding_figure(analysis: &FeedingAnalysis, title: &str) -> Figure {
    let series = [
        (PUMPING_SERIES, &analysis.pumping),
        (NURSING_SERIES, &analysis.nursing),
        (COMBINED_SERIES, &analysis.combined),
    ];

    let traces = series
        .into_iter()
        .enumerate()
        .map(|(i, (name, points))| {
            line_trace(
                name.to_string(),
                name.to_string(),
                date_points(points),
                SeriesColor::Palette(i),
            )
        })
        .collect();

    Figure {
        title: title.to_string(),
        x_axis: AxisLabel::new(DATE_AXIS_TITLE),
        y_axis: AxisLabel::new(FEEDING_AXIS_TITLE),
        y2_axis: None,
        traces,
        width: 1000,
        height: 500,
    }
}

// ── Whole dashboard ───────────────────────────────────────────────────────────

/// Title of the rolling-window chart for a given window size.
pub fn rolling_title(window: usize) -> String {
    format!("Pumping: {}-point rolling mean", window)
}

/// The three dashboard charts in page order: pumping, nursing, rolling.
pub fn compose_dashboard(analysis: &DashboardAnalysis) -> Vec<Figure> {
    let window = analysis
        .rolling
        .params
        .rolling
        .map(|w| w.size())
        .unwrap_or_default();

    vec![
        compose_volume_figure(&analysis.per_timepoint, "Pumping"),
        compose_feeding_figure(&analysis.feeding, "Total Nipple Stimulation"),
        compose_volume_figure(&analysis.rolling, &rolling_title(window)),
    ]
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn line_trace(
    name: String,
    legend_group: String,
    points: Vec<(GroupKey, f64)>,
    color: SeriesColor,
) -> Trace {
    let (x, y) = points.into_iter().unzip();
    Trace {
        name,
        legend_group,
        x,
        y,
        color,
        dash: LineDash::Solid,
        markers: true,
        axis: YAxisSide::Primary,
    }
}

fn date_points(points: &[(NaiveDate, f64)]) -> Vec<(GroupKey, f64)> {
    points
        .iter()
        .map(|(date, v)| (GroupKey::Date(*date), *v))
        .collect()
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pump_core::models::{RawEvent, RenderParams, RollingWindow};
    use pump_data::analysis::{analyze_dataset, analyze_feeding, analyze_volume};

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

    fn two_device_day() -> Vec<RawEvent> {
        vec![
            pump(0, "2024-03-01 07:00", "0:20", "10mL", "8mL", "Elvie"),
            pump(1, "2024-03-01 13:00", "0:25", "12mL", "14mL", "Spectra"),
        ]
    }

    fn names(figure: &Figure) -> Vec<&str> {
        figure.traces.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_split_volume_figure_has_four_lines_and_two_dashed() {
        let params = RenderParams {
            normalize: false,
            split_by_pump_type: true,
            ..Default::default()
        };
        let analysis = analyze_volume(&two_device_day(), &params).unwrap();
        let figure = compose_volume_figure(&analysis, "Pumping");

        assert_eq!(figure.primary_traces().count(), 4);
        assert_eq!(figure.secondary_traces().count(), 2);
        assert_eq!(
            names(&figure),
            vec![
                "left: Elvie",
                "left: Spectra",
                "right: Elvie",
                "right: Spectra",
                "Elvie: Duration",
                "Spectra: Duration"
            ]
        );
        assert!(figure
            .secondary_traces()
            .all(|t| t.dash == LineDash::Dash && !t.markers));
        assert!(figure
            .secondary_traces()
            .all(|t| matches!(t.color, SeriesColor::Palette(_))));
        assert_eq!(figure.y_axis.title, VOLUME_AXIS_TITLE);
        assert_eq!(
            figure.y2_axis.as_ref().map(|a| a.title.as_str()),
            Some(DURATION_AXIS_TITLE)
        );
        assert_eq!(figure.x_axis.title, DATE_AXIS_TITLE);
    }

    #[test]
    fn test_unsplit_duration_is_single_grey_line() {
        let params = RenderParams {
            normalize: false,
            ..Default::default()
        };
        let analysis = analyze_volume(&two_device_day(), &params).unwrap();
        let figure = compose_volume_figure(&analysis, "Pumping");

        assert_eq!(names(&figure), vec!["left", "right", "All: Duration"]);
        let duration = figure.secondary_traces().next().unwrap();
        assert_eq!(duration.color, SeriesColor::Neutral);
        assert_eq!(duration.y, vec![45.0]);
    }

    #[test]
    fn test_normalized_figure_has_single_axis() {
        let analysis = analyze_volume(&two_device_day(), &RenderParams::default()).unwrap();
        let figure = compose_volume_figure(&analysis, "Pumping");

        assert!(figure.y2_axis.is_none());
        assert_eq!(figure.secondary_traces().count(), 0);
        assert_eq!(figure.y_axis.title, RATE_AXIS_TITLE);
        assert_eq!(figure.traces.len(), 2);
        assert!(figure.traces.iter().all(|t| t.markers));
    }

    #[test]
    fn test_normalized_zero_duration_keeps_non_finite_point() {
        let events = vec![pump(0, "2024-03-01 07:00", "0:00", "10mL", "8mL", "")];
        let analysis = analyze_volume(&events, &RenderParams::default()).unwrap();
        let figure = compose_volume_figure(&analysis, "Pumping");

        assert!(figure.traces[0].y[0].is_infinite());
    }

    #[test]
    fn test_feeding_figure_series() {
        let events = vec![
            pump(0, "2024-03-01 07:00", "0:20", "10mL", "8mL", ""),
            pump(1, "2024-03-02 07:00", "0:30", "10mL", "8mL", ""),
            RawEvent {
                row_index: 2,
                kind: "Feed".to_string(),
                start: "2024-03-02 09:00".to_string(),
                duration: Some("0:15".to_string()),
                start_location: Some("Breast".to_string()),
                ..Default::default()
            },
        ];
        let analysis = analyze_feeding(&events).unwrap();
        let figure = compose_feeding_figure(&analysis, "Feeding");

        assert_eq!(names(&figure), vec![PUMPING_SERIES, NURSING_SERIES, COMBINED_SERIES]);
        assert_eq!(figure.traces[0].x.len(), 2);
        assert_eq!(figure.traces[1].x.len(), 1);
        assert_eq!(figure.traces[2].y, vec![45.0]);
        assert_eq!(figure.y_axis.title, FEEDING_AXIS_TITLE);
        assert!(figure.y2_axis.is_none());
    }

    #[test]
    fn test_compose_dashboard_titles() {
        let rolling = RenderParams {
            rolling: Some(RollingWindow::new(9).unwrap()),
            ..Default::default()
        };
        let analysis =
            analyze_dataset(&two_device_day(), &RenderParams::default(), &rolling).unwrap();
        let figures = compose_dashboard(&analysis);

        assert_eq!(figures.len(), 3);
        assert_eq!(figures[0].title, "Pumping");
        assert_eq!(figures[2].title, "Pumping: 9-point rolling mean");
        assert!(figures[2].is_empty());
    }

    #[test]
    fn test_volume_color_key() {
        assert_eq!(volume_color_key(Breast::Left, None, false), "left");
        assert_eq!(
            volume_color_key(Breast::Right, Some(PumpType::Spectra), true),
            "right: Spectra"
        );
        assert_eq!(
            volume_color_key(Breast::Right, Some(PumpType::Spectra), false),
            "right"
        );
    }
}
