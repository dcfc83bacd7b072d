//! Plotly JSON and standalone HTML output for composed figures.

use std::fmt;
use std::str::FromStr;

use pump_core::models::GroupKey;
use pump_data::analysis::DatasetSummary;
use serde_json::{json, Value};

use crate::composer::{Figure, LineDash, Trace, YAxisSide};
use crate::themes::plotly_color;

pub const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Output format of `--export`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Html,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Html => "html",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "html" => Ok(ExportFormat::Html),
            other => Err(format!("unknown export format '{}', expected json or html", other)),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// ── Plotly JSON ───────────────────────────────────────────────────────────────

/// Convert a figure into a Plotly `{data, layout}` document.
///
/// Non-finite y values become `null`, which Plotly draws as a gap.
pub fn to_plotly_json(figure: &Figure) -> Value {
    let data: Vec<Value> = figure.traces.iter().map(trace_json).collect();

    let mut layout = json!({
        "title": { "text": figure.title },
        "width": figure.width,
        "height": figure.height,
        "xaxis": { "title": { "text": figure.x_axis.title } },
        "yaxis": { "title": { "text": figure.y_axis.title } },
        "legend": { "orientation": "v" },
    });

    if let Some(y2) = &figure.y2_axis {
        layout["yaxis2"] = json!({
            "title": { "text": y2.title },
            "overlaying": "y",
            "side": "right",
        });
    }

    json!({ "data": data, "layout": layout })
}

fn trace_json(trace: &Trace) -> Value {
    let x: Vec<Value> = trace.x.iter().map(x_value).collect();
    let y: Vec<Value> = trace
        .y
        .iter()
        .map(|v| if v.is_finite() { json!(v) } else { Value::Null })
        .collect();

    let mut value = json!({
        "type": "scatter",
        "mode": if trace.markers { "lines+markers" } else { "lines" },
        "name": trace.name,
        "legendgroup": trace.legend_group,
        "showlegend": true,
        "x": x,
        "y": y,
        "line": {
            "color": plotly_color(trace.color),
            "dash": match trace.dash {
                LineDash::Solid => "solid",
                LineDash::Dash => "dash",
            },
        },
    });

    if trace.axis == YAxisSide::Secondary {
        value["yaxis"] = json!("y2");
    }
    value
}

fn x_value(key: &GroupKey) -> Value {
    match key {
        GroupKey::Date(date) => json!(date.format("%Y-%m-%d").to_string()),
        GroupKey::Session(n) => json!(n),
    }
}

/// Machine-readable dump of a whole dashboard.
pub fn export_dashboard_json(label: &str, summary: &DatasetSummary, figures: &[Figure]) -> Value {
    json!({
        "dataset": label,
        "summary": summary,
        "figures": figures.iter().map(to_plotly_json).collect::<Vec<_>>(),
    })
}

// ── HTML ──────────────────────────────────────────────────────────────────────

/// A self-contained page drawing every figure with Plotly from its CDN.
pub fn to_html_page(label: &str, figures: &[Figure]) -> String {
    let title = html_escape(&format!("Pump dashboard: {}", label));

    let mut page = String::new();
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str(&format!("<title>{}</title>\n", title));
    page.push_str(&format!("<script src=\"{}\"></script>\n", PLOTLY_CDN));
    page.push_str("</head>\n<body>\n");
    page.push_str(&format!("<h1>{}</h1>\n", title));

    for (i, figure) in figures.iter().enumerate() {
        let id = format!("figure-{}", i);
        let doc = to_plotly_json(figure);
        page.push_str(&format!("<div id=\"{}\"></div>\n", id));
        page.push_str(&format!(
            "<script>Plotly.newPlot(\"{}\", {}, {});</script>\n",
            id,
            script_safe(&doc["data"]),
            script_safe(&doc["layout"]),
        ));
    }

    page.push_str("</body>\n</html>\n");
    page
}

fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON text that cannot close the surrounding `<script>` element.
fn script_safe(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
