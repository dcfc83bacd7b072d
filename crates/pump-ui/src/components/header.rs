use ratatui::text::{Line, Span};

use pump_core::formatting::format_volume;
use pump_data::analysis::DatasetSummary;

use crate::app::Page;
use crate::themes::Theme;

/// Decoration placed either side of the application title.
pub const ACCENT: &str = "◦ ◦ ◦";

/// Dashboard header rendering four lines:
///
/// 1. Application title.
/// 2. A 60-column `=` separator.
/// 3. Page tabs, the active one highlighted.
/// 4. `[ dataset | summary ]` for the loaded dataset.
pub struct Header<'a> {
    pub dataset: &'a str,
    pub page: Page,
    /// `None` while the dataset failed to load.
    pub summary: Option<&'a DatasetSummary>,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(
        dataset: &'a str,
        page: Page,
        summary: Option<&'a DatasetSummary>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            dataset,
            page,
            summary,
            theme,
        }
    }

    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(60);

        vec![
            Line::from(vec![
                Span::styled(ACCENT, self.theme.header_accent),
                Span::styled(" PUMP DASHBOARD ", self.theme.header),
                Span::styled(ACCENT, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            self.tabs_line(),
            self.summary_line(),
        ]
    }

    fn tabs_line(&self) -> Line<'a> {
        let mut spans = Vec::with_capacity(Page::ALL.len() * 2);
        for (i, page) in Page::ALL.into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            let style = if page == self.page {
                self.theme.tab_active
            } else {
                self.theme.tab_inactive
            };
            spans.push(Span::styled(format!(" {} {} ", i + 1, page.title()), style));
        }
        Line::from(spans)
    }

    fn summary_line(&self) -> Line<'a> {
        let mut spans = vec![
            Span::styled("[ ", self.theme.label),
            Span::styled(self.dataset.to_string(), self.theme.value),
        ];

        if let Some(summary) = self.summary {
            let range = match (summary.first_date, summary.last_date) {
                (Some(first), Some(last)) => format!("{} → {}", first, last),
                _ => "no dates".to_string(),
            };
            let fields = [
                format!("{} rows", summary.rows),
                format!("{} pump sessions", summary.pump_sessions),
                format!("{} feeds", summary.nursing_feeds),
                range,
            ];
            for field in fields {
                spans.push(Span::styled(" | ", self.theme.label));
                spans.push(Span::styled(field, self.theme.text));
            }
            spans.push(Span::styled(" | ", self.theme.label));
            spans.push(Span::styled(
                format!("{} pumped", format_volume(summary.total_pumped_ml)),
                self.theme.success,
            ));
        }

        spans.push(Span::styled(" ]", self.theme.label));
        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
