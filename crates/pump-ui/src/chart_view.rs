//! Draws a [`Figure`] as a ratatui line chart.
//!
//! Terminal charts have a single y axis, so secondary-axis traces are
//! rescaled into the primary range and their real scale is printed in a
//! gutter to the right of the plot.

use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    symbols::Marker,
    text::{Line, Span, Text},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, LegendPosition, Paragraph},
    Frame,
};

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use pump_core::formatting::{format_number, format_rate, format_time};
use pump_core::models::GroupKey;

use crate::composer::{
    Figure, LineDash, Trace, YAxisSide, DURATION_AXIS_TITLE, FEEDING_AXIS_TITLE,
    RATE_AXIS_TITLE,
};
use crate::themes::Theme;

const Y2_GUTTER_WIDTH: u16 = 12;

// ── Bounds ────────────────────────────────────────────────────────────────────

/// Closed numeric range of an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisBounds {
    pub lo: f64,
    pub hi: f64,
}

impl AxisBounds {
    /// Smallest range covering every finite value, or `None` if there are
    /// none.  A single repeated value is widened by one unit each way.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        let (lo, hi) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(f64, f64)>, v| match acc {
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
                None => Some((v, v)),
            })?;

        if lo == hi {
            Some(Self {
                lo: lo - 1.0,
                hi: hi + 1.0,
            })
        } else {
            Some(Self { lo, hi })
        }
    }

    /// Y axes start at zero for non-negative data and get 5 % headroom.
    pub fn for_y(self) -> Self {
        let lo = if self.lo >= 0.0 { 0.0 } else { self.lo };
        Self {
            lo,
            hi: self.hi + (self.hi - lo) * 0.05,
        }
    }

    pub fn span(&self) -> f64 {
        self.hi - self.lo
    }

    pub fn mid(&self) -> f64 {
        (self.lo + self.hi) / 2.0
    }

    /// Map `value` from this range onto `target` linearly.
    pub fn scale_into(&self, value: f64, target: AxisBounds) -> f64 {
        if self.span() == 0.0 {
            return target.lo;
        }
        target.lo + (value - self.lo) / self.span() * target.span()
    }

    fn as_array(&self) -> [f64; 2] {
        [self.lo, self.hi]
    }
}

// ── Series preparation ────────────────────────────────────────────────────────

/// A trace's points in chart coordinates.
#[derive(Debug, Clone)]
pub struct PlotSeries<'f> {
    pub trace: &'f Trace,
    pub points: Vec<(f64, f64)>,
}

/// Everything needed to draw one figure.
#[derive(Debug, Clone)]
pub struct PlotLayout<'f> {
    pub series: Vec<PlotSeries<'f>>,
    pub x: AxisBounds,
    pub y: AxisBounds,
    /// Real range of the secondary traces, if any.
    pub y2: Option<AxisBounds>,
    pub dates: bool,
}

/// Convert a figure into chart coordinates, dropping non-finite points and
/// rescaling secondary traces onto the primary y range.
///
/// Returns `None` when no trace has a finite point.
pub fn layout_figure(figure: &Figure) -> Option<PlotLayout<'_>> {
    let finite = |trace: &Trace| -> Vec<(f64, f64)> {
        trace
            .points()
            .map(|(k, v)| (k.as_plot_x(), v))
            .filter(|(_, v)| v.is_finite())
            .collect()
    };

    let x = AxisBounds::from_values(
        figure
            .traces
            .iter()
            .flat_map(|t| finite(t).into_iter().map(|(x, _)| x)),
    )?;

    let y2 = AxisBounds::from_values(
        figure
            .secondary_traces()
            .flat_map(|t| t.y.iter().copied()),
    )
    .map(AxisBounds::for_y);

    // With only secondary data the primary range borrows the secondary one.
    let y = AxisBounds::from_values(figure.primary_traces().flat_map(|t| t.y.iter().copied()))
        .map(AxisBounds::for_y)
        .or(y2)?;

    let series = figure
        .traces
        .iter()
        .map(|trace| {
            let mut points = finite(trace);
            if let (YAxisSide::Secondary, Some(real)) = (trace.axis, y2) {
                for p in &mut points {
                    p.1 = real.scale_into(p.1, y);
                }
            }
            PlotSeries { trace, points }
        })
        .collect();

    let dates = figure
        .traces
        .iter()
        .flat_map(|t| t.x.first())
        .next()
        .map_or(true, |k| matches!(k, GroupKey::Date(_)));

    Some(PlotLayout {
        series,
        x,
        y,
        y2,
        dates,
    })
}

/// Axis tick text for an x coordinate.
pub fn x_label(x: f64, dates: bool) -> String {
    if dates {
        let days = x.round() as i32;
        NaiveDate::from_num_days_from_ce_opt(days)
            .map(|d| d.format("%m-%d").to_string())
            .unwrap_or_default()
    } else {
        format!("#{}", x.round() as i64)
    }
}

/// Tick text for a value on the axis titled `title`.
pub fn y_tick(title: &str, value: f64) -> String {
    match title {
        RATE_AXIS_TITLE => format_rate(value),
        DURATION_AXIS_TITLE | FEEDING_AXIS_TITLE => format_time(value),
        _ => format_number(value, 1),
    }
}

fn y_labels(bounds: AxisBounds, title: &str) -> Vec<String> {
    [bounds.lo, bounds.mid(), bounds.hi]
        .into_iter()
        .map(|v| y_tick(title, v))
        .collect()
}

// ── Rendering ─────────────────────────────────────────────────────────────────

/// Render `figure` into `area`, or a placeholder when it has nothing to draw.
pub fn render_figure(frame: &mut Frame, area: Rect, figure: &Figure, theme: &Theme) {
    let Some(plot) = layout_figure(figure) else {
        render_no_data(frame, area, &figure.title, theme);
        return;
    };

    let (chart_area, gutter) = match (&figure.y2_axis, plot.y2) {
        (Some(_), Some(_)) if area.width > Y2_GUTTER_WIDTH * 3 => {
            let [chart, gutter] =
                Layout::horizontal([Constraint::Min(0), Constraint::Length(Y2_GUTTER_WIDTH)])
                    .areas(area);
            (chart, Some(gutter))
        }
        _ => (area, None),
    };

    let datasets: Vec<Dataset> = plot
        .series
        .iter()
        .map(|s| {
            let color = theme.series_color(s.trace.color);
            let (marker, graph_type) = match s.trace.dash {
                LineDash::Solid => (Marker::Braille, GraphType::Line),
                LineDash::Dash => (Marker::Dot, GraphType::Scatter),
            };
            Dataset::default()
                .name(s.trace.name.clone())
                .marker(marker)
                .graph_type(graph_type)
                .style(Style::default().fg(color))
                .data(&s.points)
        })
        .collect();

    let x_labels: Vec<Span> = [plot.x.lo, plot.x.mid(), plot.x.hi]
        .into_iter()
        .map(|x| Span::styled(x_label(x, plot.dates), theme.axis))
        .collect();
    let y_ticks: Vec<Span> = y_labels(plot.y, &figure.y_axis.title)
        .into_iter()
        .map(|l| Span::styled(l, theme.axis))
        .collect();

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.chart_border)
                .title(Span::styled(format!(" {} ", figure.title), theme.header)),
        )
        .x_axis(
            Axis::default()
                .title(Span::styled(figure.x_axis.title.clone(), theme.label))
                .style(theme.axis)
                .bounds(plot.x.as_array())
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title(Span::styled(figure.y_axis.title.clone(), theme.label))
                .style(theme.axis)
                .bounds(plot.y.as_array())
                .labels(y_ticks),
        )
        .legend_position(Some(LegendPosition::TopLeft))
        .hidden_legend_constraints((Constraint::Ratio(1, 1), Constraint::Ratio(1, 1)));

    frame.render_widget(chart, chart_area);

    if let (Some(gutter), Some(y2), Some(axis)) = (gutter, plot.y2, &figure.y2_axis) {
        render_y2_gutter(frame, gutter, &axis.title, y2, theme);
    }
}

/// Print the secondary axis scale top to bottom in a narrow column.
fn render_y2_gutter(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    bounds: AxisBounds,
    theme: &Theme,
) {
    let labels = y_labels(bounds, title);
    let inner_height = area.height.saturating_sub(2) as usize;

    let mut lines: Vec<Line> = Vec::with_capacity(inner_height.max(4));
    lines.push(Line::from(Span::styled(labels[2].clone(), theme.axis)));
    let filler = inner_height.saturating_sub(4) / 2;
    lines.extend(std::iter::repeat(Line::from("")).take(filler));
    lines.push(Line::from(Span::styled(labels[1].clone(), theme.axis)));
    lines.extend(std::iter::repeat(Line::from("")).take(filler));
    lines.push(Line::from(Span::styled(labels[0].clone(), theme.axis)));
    lines.push(Line::from(Span::styled(
        fit_width(title, area.width as usize),
        theme.dim,
    )));

    let paragraph = Paragraph::new(Text::from(lines))
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::TOP | Borders::BOTTOM)
                .border_style(theme.chart_border),
        );
    frame.render_widget(paragraph, area);
}

/// Truncate `text` to `max` display columns, ending in `…` when cut.
pub fn fit_width(text: &str, max: usize) -> String {
    if text.width() <= max {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Placeholder for a chart with no plottable points.
pub fn render_no_data(frame: &mut Frame, area: Rect, title: &str, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("No data to plot", theme.dim)),
        Line::from(""),
        Line::from(Span::styled(
            "Pick another dataset or adjust the view toggles",
            theme.info,
        )),
    ];
    let paragraph = Paragraph::new(Text::from(text))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.chart_border)
                .title(format!(" {} ", title)),
        );
    frame.render_widget(paragraph, area);
}

// ── Tests ─────────────────────────────────────────────────────────────────────
