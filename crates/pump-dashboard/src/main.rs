mod bootstrap;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use pump_core::models::RenderParams;
use pump_core::settings::Settings;
use pump_data::store::DatasetStore;
use pump_ui::app::{render_dataset, App};
use pump_ui::export::{export_dashboard_json, to_html_page, ExportFormat};
use pump_ui::themes::Theme;

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("Pump Dashboard v{} starting", env!("CARGO_PKG_VERSION"));

    let store = DatasetStore::new(settings.resolved_data_dir());
    tracing::info!(
        "Datasets: {}, Theme: {}, Window: {}",
        store.dir().display(),
        settings.theme,
        settings.window
    );

    let uploaded = match &settings.upload {
        Some(src) => Some(
            store
                .upload(src, Local::now().date_naive())
                .with_context(|| format!("upload of {} failed", src.display()))?,
        ),
        None => None,
    };

    if settings.list {
        for label in store.list()? {
            println!("{}", label);
        }
        return Ok(());
    }

    let label = match uploaded {
        Some(label) => label,
        None => store.resolve(settings.dataset.as_deref())?,
    };

    let pumping = settings.render_params();
    let rolling = settings.rolling_render_params();

    if let Some(format) = settings.export.as_deref() {
        let format: ExportFormat = format.parse().map_err(anyhow::Error::msg)?;
        let body = export_dataset(&store, &label, &pumping, &rolling, format)?;
        write_output(settings.output.as_deref(), &body)?;
        tracing::info!("Exported {} as {}", label, format);
        return Ok(());
    }

    let app = App::new(
        Theme::from_name(&settings.theme),
        store,
        label,
        pumping,
        rolling,
    );
    app.run()?;

    Ok(())
}

/// Render every chart of `label` into an export document.
fn export_dataset(
    store: &DatasetStore,
    label: &str,
    pumping: &RenderParams,
    rolling: &RenderParams,
    format: ExportFormat,
) -> Result<String> {
    let rendered = render_dataset(store, label, pumping, rolling)
        .with_context(|| format!("cannot render dataset {}", label))?;

    Ok(match format {
        ExportFormat::Json => serde_json::to_string_pretty(&export_dashboard_json(
            label,
            &rendered.summary,
            &rendered.figures,
        ))?,
        ExportFormat::Html => to_html_page(label, &rendered.figures),
    })
}

/// Write `body` to `output`, or to stdout when no path is given.
fn write_output(output: Option<&Path>, body: &str) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, body)
            .with_context(|| format!("cannot write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(body.as_bytes())?;
            stdout.write_all(b"\n")?;
            Ok(())
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
