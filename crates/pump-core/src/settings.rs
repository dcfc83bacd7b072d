use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::{RenderParams, RollingWindow, XAxisUnit};

/// Name of the per-user application directory under `$HOME`.
pub const APP_DIR_NAME: &str = ".pump-dashboard";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Pumping and nursing trends from care-log CSV exports
#[derive(Parser, Debug, Clone)]
#[command(
    name = "pump-dashboard",
    about = "Pumping and nursing trends from care-log CSV exports",
    version
)]
pub struct Settings {
    /// Directory holding one CSV per upload date
    #[arg(long, env = "PUMP_DASHBOARD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Dataset date label to open (YYYY-MM-DD); defaults to the first stored dataset
    #[arg(long)]
    pub dataset: Option<String>,

    /// Copy a CSV export into the store under today's date and open it
    #[arg(long)]
    pub upload: Option<PathBuf>,

    /// List stored datasets and exit
    #[arg(long)]
    pub list: bool,

    /// Write the charts instead of starting the terminal dashboard
    #[arg(long, value_parser = ["json", "html"])]
    pub export: Option<String>,

    /// Output file for --export (stdout when omitted)
    #[arg(long, requires = "export")]
    pub output: Option<PathBuf>,

    /// Plot raw volume instead of volume per minute
    #[arg(long)]
    pub no_normalize: bool,

    /// Split series by detected pump device
    #[arg(long)]
    pub split_by_pump: bool,

    /// Use session labels instead of calendar dates on the x axis
    #[arg(long)]
    pub per_session: bool,

    /// How many points the rolling charts average (5-14)
    #[arg(long, default_value = "7", value_parser = clap::value_parser!(u32).range(5..=14))]
    pub window: u32,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.pump-dashboard/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<u32>,
}

impl LastUsedParams {
    /// Default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&home_dir())
    }

    /// Config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(APP_DIR_NAME).join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path, creating parent
    /// directories if needed.
    pub fn save_to(&self, path: &Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation; accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(args: Vec<std::ffi::OsString>, config_path: &Path) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI always wins.  clap keys args by field name, not flag spelling.
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "window") {
            if let Some(v) = last.window.filter(|w| RollingWindow::new(*w as usize).is_ok()) {
                settings.window = v;
            }
        }
        if settings.data_dir.is_none() {
            settings.data_dir = last.data_dir;
        }

        settings = Self::apply_debug(settings);

        let params = LastUsedParams::from(&settings);
        let _ = params.save_to(config_path);

        settings
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Dataset directory: `--data-dir` or `~/.pump-dashboard/datasets`.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| home_dir().join(APP_DIR_NAME).join("datasets"))
    }

    /// Rolling window chosen on the command line.
    pub fn rolling_window(&self) -> RollingWindow {
        RollingWindow::new(self.window as usize).unwrap_or_default()
    }

    /// Render parameters for the per-timepoint volume chart.
    pub fn render_params(&self) -> RenderParams {
        RenderParams {
            normalize: !self.no_normalize,
            split_by_pump_type: self.split_by_pump,
            x_unit: if self.per_session {
                XAxisUnit::PerSession
            } else {
                XAxisUnit::PerDay
            },
            rolling: None,
        }
    }

    /// Render parameters for the rolling-window volume chart.
    pub fn rolling_render_params(&self) -> RenderParams {
        RenderParams {
            rolling: Some(self.rolling_window()),
            ..self.render_params()
        }
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            theme: Some(s.theme.clone()),
            data_dir: s.data_dir.clone(),
            window: Some(s.window),
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────────

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
