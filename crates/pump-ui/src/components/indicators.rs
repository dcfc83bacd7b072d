use ratatui::text::{Line, Span};

use pump_core::models::{RenderParams, XAxisUnit};

use crate::app::Page;
use crate::themes::Theme;

// ── ToggleIndicator ──────────────────────────────────────────────────────────

/// A boolean view option with the key that flips it, e.g. `"[n] ● normalize"`.
pub struct ToggleIndicator<'a> {
    pub key: char,
    pub label: &'a str,
    pub on: bool,
    pub theme: &'a Theme,
}

impl<'a> ToggleIndicator<'a> {
    pub fn new(key: char, label: &'a str, on: bool, theme: &'a Theme) -> Self {
        Self {
            key,
            label,
            on,
            theme,
        }
    }

    pub fn to_spans(&self) -> Vec<Span<'a>> {
        let mark = if self.on { "●" } else { "○" };
        vec![
            Span::styled(format!("[{}] ", self.key), self.theme.dim),
            Span::styled(format!("{} {}", mark, self.label), self.theme.toggle_style(self.on)),
        ]
    }
}

// ── ControlsBar ──────────────────────────────────────────────────────────────

/// Footer listing the toggles of the visible page and the quit key.
///
/// The nursing page has no toggles; its chart always groups by date.
pub struct ControlsBar<'a> {
    pub page: Page,
    pub params: RenderParams,
    pub theme: &'a Theme,
}

impl<'a> ControlsBar<'a> {
    pub fn new(page: Page, params: RenderParams, theme: &'a Theme) -> Self {
        Self {
            page,
            params,
            theme,
        }
    }

    pub fn to_line(&self) -> Line<'a> {
        let gap = || Span::raw("  ");
        let mut spans: Vec<Span<'a>> = Vec::new();

        if self.page != Page::Nursing {
            let per_session = self.params.x_unit == XAxisUnit::PerSession;
            let split = self.params.split_by_pump_type;
            let toggles = [
                ToggleIndicator::new('n', "normalize", self.params.normalize, self.theme),
                ToggleIndicator::new('s', "split by pump", split, self.theme),
                ToggleIndicator::new('x', "per session", per_session, self.theme),
            ];
            for toggle in toggles {
                spans.extend(toggle.to_spans());
                spans.push(gap());
            }
        }

        if let Some(window) = self.params.rolling {
            spans.push(Span::styled("[+/-] ", self.theme.dim));
            spans.push(Span::styled(format!("window {}", window.size()), self.theme.value));
            spans.push(gap());
        }

        spans.push(Span::styled("[1-3/Tab] page  [q] quit", self.theme.dim));
        Line::from(spans)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pump_core::models::RollingWindow;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_toggle_indicator_marks() {
        let theme = Theme::dark();
        let on: String = ToggleIndicator::new('n', "normalize", true, &theme)
            .to_spans()
            .iter()
            .map(|s| s.content.to_string())
            .collect();
        let off: String = ToggleIndicator::new('s', "split", false, &theme)
            .to_spans()
            .iter()
            .map(|s| s.content.to_string())
            .collect();
        assert_eq!(on, "[n] ● normalize");
        assert_eq!(off, "[s] ○ split");
    }

    #[test]
    fn test_toggle_indicator_styles() {
        let theme = Theme::dark();
        let spans = ToggleIndicator::new('n', "normalize", false, &theme).to_spans();
        assert_eq!(spans[1].style, theme.toggle_off);
    }

    #[test]
    fn test_controls_for_pumping_page() {
        let theme = Theme::dark();
        let line = ControlsBar::new(Page::Pumping, RenderParams::default(), &theme).to_line();
        let t = text(&line);
        assert!(t.contains("● normalize"));
        assert!(t.contains("○ split by pump"));
        assert!(!t.contains("window"));
        assert!(t.ends_with("[q] quit"));
    }

    #[test]
    fn test_controls_show_window_on_rolling_page() {
        let theme = Theme::dark();
        let params = RenderParams {
            rolling: Some(RollingWindow::new(9).unwrap()),
            ..Default::default()
        };
        let t = text(&ControlsBar::new(Page::Rolling, params, &theme).to_line());
        assert!(t.contains("[+/-] window 9"));
    }

    #[test]
    fn test_controls_nursing_page_has_no_toggles() {
        let theme = Theme::dark();
        let t = text(&ControlsBar::new(Page::Nursing, RenderParams::default(), &theme).to_line());
        assert!(!t.contains("normalize"));
        assert!(t.contains("[q] quit"));
    }
}
