//! Application state and TUI event loop for the pump dashboard.
//!
//! [`App`] owns the theme, the selected dataset, and one set of
//! [`RenderParams`] per volume page.  Every page switch or parameter change
//! reloads the dataset from disk and recomputes all charts.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing::{debug, info, warn};

use pump_core::error::Result;
use pump_core::models::RenderParams;
use pump_data::analysis::{analyze_dataset, DatasetSummary};
use pump_data::store::DatasetStore;

use crate::chart_view;
use crate::components::header::Header;
use crate::components::indicators::ControlsBar;
use crate::composer::{compose_dashboard, Figure};
use crate::themes::Theme;

// ── Page ──────────────────────────────────────────────────────────────────────

/// Which dashboard chart is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// Per-timepoint pumped volume.
    Pumping,
    /// Daily pumping vs nursing time.
    Nursing,
    /// Rolling-window pumped volume.
    Rolling,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::Pumping, Page::Nursing, Page::Rolling];

    pub fn title(&self) -> &'static str {
        match self {
            Page::Pumping => "Pumping",
            Page::Nursing => "Nursing",
            Page::Rolling => "Rolling",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Page::Pumping => 0,
            Page::Nursing => 1,
            Page::Rolling => 2,
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

// ── Rendered ──────────────────────────────────────────────────────────────────

/// Output of one successful reload.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub summary: DatasetSummary,
    /// One figure per [`Page`], in [`Page::ALL`] order.
    pub figures: Vec<Figure>,
}

/// Load `label` from `store` and build every dashboard figure.
pub fn render_dataset(
    store: &DatasetStore,
    label: &str,
    pumping: &RenderParams,
    rolling: &RenderParams,
) -> Result<Rendered> {
    let events = store.load(label)?;
    let analysis = analyze_dataset(&events, pumping, rolling)?;
    Ok(Rendered {
        figures: compose_dashboard(&analysis),
        summary: analysis.summary,
    })
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    store: DatasetStore,
    label: String,
    pub page: Page,
    /// Toggles of the per-timepoint chart.
    pub pumping: RenderParams,
    /// Toggles and window of the rolling chart.
    pub rolling: RenderParams,
    /// Latest render, or the message of the error that stopped it.
    pub state: std::result::Result<Rendered, String>,
    pub should_quit: bool,
}

impl App {
    /// Construct the app and perform the first load.
    pub fn new(
        theme: Theme,
        store: DatasetStore,
        label: String,
        pumping: RenderParams,
        rolling: RenderParams,
    ) -> Self {
        let mut app = Self {
            theme,
            store,
            label,
            page: Page::Pumping,
            pumping,
            rolling,
            state: Err(String::new()),
            should_quit: false,
        };
        app.reload();
        app
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Re-read the dataset and recompute every chart.
    pub fn reload(&mut self) {
        self.state = match render_dataset(&self.store, &self.label, &self.pumping, &self.rolling) {
            Ok(rendered) => {
                debug!("Rendered {} ({} rows)", self.label, rendered.summary.rows);
                Ok(rendered)
            }
            Err(e) => {
                warn!("Failed to render {}: {}", self.label, e);
                Err(e.to_string())
            }
        };
    }

    /// Toggles the visible page responds to; the nursing chart has none.
    fn page_params_mut(&mut self) -> Option<&mut RenderParams> {
        match self.page {
            Page::Pumping => Some(&mut self.pumping),
            Page::Rolling => Some(&mut self.rolling),
            Page::Nursing => None,
        }
    }

    /// Apply one key press.  Returns `true` when the app should exit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }

        let before = (self.page, self.pumping, self.rolling);

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => self.should_quit = true,
            KeyCode::Char('1') => self.page = Page::Pumping,
            KeyCode::Char('2') => self.page = Page::Nursing,
            KeyCode::Char('3') => self.page = Page::Rolling,
            KeyCode::Tab => self.page = self.page.next(),
            KeyCode::BackTab => self.page = self.page.prev(),
            KeyCode::Char('n') => {
                if let Some(p) = self.page_params_mut() {
                    p.normalize = !p.normalize;
                }
            }
            KeyCode::Char('s') => {
                if let Some(p) = self.page_params_mut() {
                    p.split_by_pump_type = !p.split_by_pump_type;
                }
            }
            KeyCode::Char('x') => {
                if let Some(p) = self.page_params_mut() {
                    p.x_unit = p.x_unit.toggled();
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.rolling.rolling = self.rolling.rolling.map(|w| w.increment());
            }
            KeyCode::Char('-') => {
                self.rolling.rolling = self.rolling.rolling.map(|w| w.decrement());
            }
            _ => {}
        }

        if (self.page, self.pumping, self.rolling) != before {
            self.reload();
        }

        self.should_quit
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until `q`, `Q`, or `Ctrl+C`.
    ///
    /// Blocks on `crossterm::event::poll` with a 250 ms timeout.
    pub fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        info!("Dashboard opened on dataset {}", self.label);
        let tick_rate = Duration::from_millis(250);

        let result = loop {
            if let Err(e) = terminal.draw(|frame| self.render(frame)) {
                break Err(e);
            }

            match event::poll(tick_rate) {
                Ok(true) => match event::read() {
                    Ok(Event::Key(key)) => {
                        if self.handle_key(key) {
                            break Ok(());
                        }
                    }
                    Ok(_) => {}
                    Err(e) => break Err(e),
                },
                Ok(false) => {}
                Err(e) => break Err(e),
            }
        };

        // Restore terminal state unconditionally.
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Draw the header, the current page's chart, and the controls footer.
    pub fn render(&self, frame: &mut Frame) {
        let [header_area, body, footer] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let summary = self.state.as_ref().ok().map(|r| &r.summary);
        let header = Header::new(&self.label, self.page, summary, &self.theme);
        frame.render_widget(Paragraph::new(Text::from(header.to_lines())), header_area);

        match &self.state {
            Ok(rendered) => match rendered.figures.get(self.page.index()) {
                Some(figure) => chart_view::render_figure(frame, body, figure, &self.theme),
                None => chart_view::render_no_data(frame, body, self.page.title(), &self.theme),
            },
            Err(message) => self.render_error(frame, body, message),
        }

        let params = match self.page {
            Page::Rolling => self.rolling,
            _ => self.pumping,
        };
        let controls = ControlsBar::new(self.page, params, &self.theme);
        frame.render_widget(Paragraph::new(controls.to_line()), footer);
    }

    fn render_error(&self, frame: &mut Frame, area: Rect, message: &str) {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                format!("Could not render dataset {}", self.label),
                self.theme.error,
            )),
            Line::from(""),
            Line::from(Span::styled(message.to_string(), self.theme.text)),
            Line::from(""),
            Line::from(Span::styled("Press 'q' or Ctrl+C to exit", self.theme.dim)),
        ];
        let paragraph = Paragraph::new(Text::from(text))
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(self.theme.error)
                    .title(" Error "),
            );
        frame.render_widget(paragraph, area);
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
