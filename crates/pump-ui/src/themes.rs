use ratatui::style::{Color, Modifier, Style};

use crate::composer::SeriesColor;

/// Plotly's default qualitative palette, shared by the HTML export.
pub const PLOTLY_PALETTE: [&str; 10] = [
    "#636efa", "#EF553B", "#00cc96", "#ab63fa", "#FFA15A", "#19d3f3", "#FF6692", "#B6E880",
    "#FF97FF", "#FECB52",
];

/// Colour of ungrouped duration lines in the HTML export.
pub const PLOTLY_NEUTRAL: &str = "#7f7f7f";

/// Terminal background type detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BackgroundType {
    Dark,
    Light,
    Unknown,
}

/// Detect terminal background type from the `COLORFGBG` environment variable.
///
/// The variable has the format `"foreground;background"`.  Background values
/// 0–6 are considered dark; 7–15 are considered light.  If the variable is
/// absent or unparseable, `BackgroundType::Dark` is returned.
pub fn detect_background() -> BackgroundType {
    if let Ok(val) = std::env::var("COLORFGBG") {
        if let Some(bg) = val.split(';').next_back() {
            if let Ok(bg_num) = bg.parse::<u8>() {
                return if bg_num <= 6 {
                    BackgroundType::Dark
                } else {
                    BackgroundType::Light
                };
            }
        }
    }
    BackgroundType::Dark
}

/// Every style the dashboard draws with.
#[derive(Debug, Clone)]
pub struct Theme {
    // ── Header ───────────────────────────────────────────────────────────────
    pub header: Style,
    pub header_accent: Style,
    pub separator: Style,

    // ── Text ─────────────────────────────────────────────────────────────────
    pub text: Style,
    pub dim: Style,
    pub label: Style,
    pub value: Style,

    // ── Status ───────────────────────────────────────────────────────────────
    pub info: Style,
    pub success: Style,
    pub error: Style,

    // ── Tabs and toggles ─────────────────────────────────────────────────────
    pub tab_active: Style,
    pub tab_inactive: Style,
    pub toggle_on: Style,
    pub toggle_off: Style,

    // ── Charts ───────────────────────────────────────────────────────────────
    pub chart_border: Style,
    pub axis: Style,
    /// Line colours cycled by [`SeriesColor::Palette`] index.
    pub series: Vec<Color>,
    /// Colour of [`SeriesColor::Neutral`] lines.
    pub series_neutral: Color,
}

impl Theme {
    // ── Constructors ─────────────────────────────────────────────────────────

    /// Dark-background terminal theme (default).
    ///
    /// Series colours are the RGB values of Plotly's default palette so the
    /// terminal charts match the exported ones.
    pub fn dark() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),

            tab_active: Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::Gray),
            toggle_on: Style::default().fg(Color::Green),
            toggle_off: Style::default().fg(Color::DarkGray),

            chart_border: Style::default().fg(Color::DarkGray),
            axis: Style::default().fg(Color::Gray),
            series: plotly_rgb(),
            series_neutral: Color::Gray,
        }
    }

    /// Light-background terminal theme.
    pub fn light() -> Self {
        Self {
            header: Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            header_accent: Style::default().fg(Color::Magenta),
            separator: Style::default().fg(Color::Gray),

            text: Style::default().fg(Color::Black),
            dim: Style::default().fg(Color::Gray),
            label: Style::default().fg(Color::DarkGray),
            value: Style::default()
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            info: Style::default().fg(Color::Blue),
            success: Style::default().fg(Color::Green),
            error: Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),

            tab_active: Style::default()
                .fg(Color::White)
                .bg(Color::Blue)
                .add_modifier(Modifier::BOLD),
            tab_inactive: Style::default().fg(Color::DarkGray),
            toggle_on: Style::default().fg(Color::Green),
            toggle_off: Style::default().fg(Color::Gray),

            chart_border: Style::default().fg(Color::Gray),
            axis: Style::default().fg(Color::DarkGray),
            series: plotly_rgb(),
            series_neutral: Color::DarkGray,
        }
    }

    /// Classic terminal theme using only the basic 8-colour ANSI palette.
    ///
    /// No bold modifiers, for minimal terminal emulators.
    pub fn classic() -> Self {
        Self {
            header: Style::default().fg(Color::Cyan),
            header_accent: Style::default().fg(Color::White),
            separator: Style::default().fg(Color::DarkGray),

            text: Style::default().fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            label: Style::default().fg(Color::Gray),
            value: Style::default().fg(Color::White),

            info: Style::default().fg(Color::Cyan),
            success: Style::default().fg(Color::Green),
            error: Style::default().fg(Color::Red),

            tab_active: Style::default().fg(Color::Black).bg(Color::White),
            tab_inactive: Style::default().fg(Color::Gray),
            toggle_on: Style::default().fg(Color::Green),
            toggle_off: Style::default().fg(Color::DarkGray),

            chart_border: Style::default().fg(Color::DarkGray),
            axis: Style::default().fg(Color::White),
            series: vec![
                Color::Blue,
                Color::Red,
                Color::Green,
                Color::Magenta,
                Color::Yellow,
                Color::Cyan,
            ],
            series_neutral: Color::Gray,
        }
    }

    /// Choose a theme automatically based on the detected terminal background.
    pub fn auto_detect() -> Self {
        match detect_background() {
            BackgroundType::Light => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Construct a theme by name.  Falls back to `auto_detect` for unknown
    /// names.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "dark" => Self::dark(),
            "classic" => Self::classic(),
            _ => Self::auto_detect(),
        }
    }

    // ── Style helpers ────────────────────────────────────────────────────────

    /// Resolve a trace colour against this theme's palette.
    pub fn series_color(&self, color: SeriesColor) -> Color {
        match color {
            SeriesColor::Palette(i) if !self.series.is_empty() => {
                self.series[i % self.series.len()]
            }
            _ => self.series_neutral,
        }
    }

    pub fn toggle_style(&self, on: bool) -> Style {
        if on {
            self.toggle_on
        } else {
            self.toggle_off
        }
    }
}

/// Hex colour string of a trace for Plotly output.
pub fn plotly_color(color: SeriesColor) -> &'static str {
    match color {
        SeriesColor::Palette(i) => PLOTLY_PALETTE[i % PLOTLY_PALETTE.len()],
        SeriesColor::Neutral => PLOTLY_NEUTRAL,
    }
}

fn plotly_rgb() -> Vec<Color> {
    PLOTLY_PALETTE
        .iter()
        .filter_map(|hex| hex_to_rgb(hex))
        .collect()
}

fn hex_to_rgb(hex: &str) -> Option<Color> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(digits.get(range)?, 16).ok();
    Some(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dark_theme_creation() {
        let t = Theme::dark();
        assert_eq!(t.header.fg, Some(Color::Cyan));
        assert_eq!(t.success.fg, Some(Color::Green));
        assert_eq!(t.error.fg, Some(Color::Red));
        assert_eq!(t.series.len(), PLOTLY_PALETTE.len());
        assert_eq!(t.series[0], Color::Rgb(0x63, 0x6e, 0xfa));
    }

    #[test]
    fn test_light_theme_creation() {
        let t = Theme::light();
        assert_eq!(t.header.fg, Some(Color::Blue));
        assert_eq!(t.text.fg, Some(Color::Black));
        assert_eq!(t.series_neutral, Color::DarkGray);
    }

    #[test]
    fn test_classic_theme_has_no_bold_and_ansi_series() {
        let t = Theme::classic();
        assert!(!t.value.add_modifier.contains(Modifier::BOLD));
        assert!(!t.error.add_modifier.contains(Modifier::BOLD));
        assert!(t.series.iter().all(|c| !matches!(c, Color::Rgb(..))));
    }

    #[test]
    fn test_from_name() {
        assert_eq!(Theme::from_name("dark").header.fg, Some(Color::Cyan));
        assert_eq!(Theme::from_name("light").header.fg, Some(Color::Blue));
        let classic = Theme::from_name("classic");
        assert!(!classic.header.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn test_from_name_unknown_falls_back() {
        let t = Theme::from_name("does-not-exist");
        assert!(t.header.fg.is_some());
    }

    #[test]
    fn test_series_color_wraps_palette() {
        let t = Theme::classic();
        assert_eq!(t.series_color(SeriesColor::Palette(0)), Color::Blue);
        assert_eq!(t.series_color(SeriesColor::Palette(6)), Color::Blue);
        assert_eq!(t.series_color(SeriesColor::Neutral), Color::Gray);
    }

    #[test]
    fn test_plotly_color() {
        assert_eq!(plotly_color(SeriesColor::Palette(1)), "#EF553B");
        assert_eq!(plotly_color(SeriesColor::Palette(11)), "#EF553B");
        assert_eq!(plotly_color(SeriesColor::Neutral), PLOTLY_NEUTRAL);
    }

    #[test]
    fn test_hex_to_rgb_rejects_garbage() {
        assert_eq!(hex_to_rgb("#FECB52"), Some(Color::Rgb(0xfe, 0xcb, 0x52)));
        assert_eq!(hex_to_rgb("FECB52"), None);
        assert_eq!(hex_to_rgb("#FFF"), None);
        assert_eq!(hex_to_rgb("#GGGGGG"), None);
    }

    #[test]
    fn test_toggle_style() {
        let t = Theme::dark();
        assert_eq!(t.toggle_style(true).fg, Some(Color::Green));
        assert_eq!(t.toggle_style(false).fg, Some(Color::DarkGray));
    }
}
