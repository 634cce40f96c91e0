use anyhow::Result;
use chrono::Utc;
use serde::Serialize;
use std::path::PathBuf;
use tracing::debug;

use crate::cli::output::{self, OutputFormat, OutputOptions};
use crate::cli::renderer;
use crate::core::aggregator::{aggregate, window_start};
use crate::core::config::AppConfig;
use crate::core::cost::scanner;
use crate::core::error::ReportError;
use crate::core::layout::LayoutSpec;
use crate::core::models::report::{Aggregation, ReportMode};

/// Exit code for a terminal too narrow to hold the report.
const EXIT_TOO_NARROW: i32 = 2;

/// How far back a report looks; `None` falls back to the configured window.
#[derive(Debug, Clone, Copy, Default)]
pub struct Window {
    pub hours: Option<u32>,
    pub days: Option<u32>,
}

#[derive(Serialize)]
struct ReportPayload<'a> {
    #[serde(flatten)]
    aggregation: &'a Aggregation,
    #[serde(skip_serializing_if = "Option::is_none")]
    since: Option<String>,
}

pub fn run(
    mode: ReportMode,
    window: Window,
    data_dirs: &[PathBuf],
    opts: &OutputOptions,
) -> Result<()> {
    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: {} (using defaults)", e);
            AppConfig::default()
        }
    };
    let settings = &config.settings;

    let roots = if data_dirs.is_empty() {
        scanner::default_roots(&settings.data_dirs)
    } else {
        data_dirs.to_vec()
    };
    debug!(roots = ?roots, "scanning usage logs");
    let events = scanner::scan(&roots);

    let hours = window.hours.unwrap_or(settings.hourly_window_hours).max(1);
    let days = window.days.unwrap_or(settings.daily_window_days).max(1);
    let since = window_start(mode, settings.timezone, Utc::now(), hours, days);
    let aggregation = aggregate(&events, mode, settings.timezone, since);

    match opts.format {
        OutputFormat::Json => {
            let payload = ReportPayload {
                aggregation: &aggregation,
                since: since.map(|s| s.to_rfc3339()),
            };
            let json = if opts.pretty {
                serde_json::to_string_pretty(&payload)?
            } else {
                serde_json::to_string(&payload)?
            };
            println!("{}", json);
        }
        OutputFormat::Text => {
            let width = output::resolve_width(opts.width, settings.width);
            let layout = match LayoutSpec::compute(width) {
                Ok(l) => l,
                Err(e @ ReportError::LayoutTooNarrow { .. }) => {
                    eprintln!("{}", e);
                    std::process::exit(EXIT_TOO_NARROW);
                }
                Err(e) => return Err(e.into()),
            };
            debug!(width = layout.width, tier = ?layout.tier, "layout");

            let use_color = output::detect_color(opts.color_flag, &settings.color);
            colored::control::set_override(use_color);

            let lines = renderer::render(&aggregation, &layout)?;
            let text: Vec<String> = lines
                .iter()
                .map(|line| output::paint(line, use_color))
                .collect();
            println!("{}", text.join("\n"));
        }
    }

    Ok(())
}
