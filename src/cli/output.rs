use colored::{ColoredString, Colorize};
use std::io::IsTerminal;

use crate::cli::renderer::{LineKind, ReportLine};

const FALLBACK_WIDTH: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format: OutputFormat,
    pub pretty: bool,
    /// `false` when `--no-color` was given.
    pub color_flag: bool,
    /// `--width`, if given.
    pub width: Option<usize>,
}

/// Decide whether to emit ANSI colors.
///
/// `--no-color` and `color = "never"` always win; `color = "always"` forces colors even when
/// piped. Otherwise colors need a terminal on stdout and no `NO_COLOR`.
pub fn detect_color(color_flag: bool, color_setting: &str) -> bool {
    if !color_flag {
        return false;
    }
    match color_setting {
        "never" => false,
        "always" => true,
        _ => std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal(),
    }
}

/// Pick the report width: flag, then config, then `$COLUMNS`, then the terminal itself.
pub fn resolve_width(flag: Option<usize>, configured: Option<usize>) -> usize {
    flag.or(configured)
        .or_else(columns_env)
        .or_else(terminal_width)
        .unwrap_or(FALLBACK_WIDTH)
}

fn columns_env() -> Option<usize> {
    std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|w| *w > 0)
}

fn terminal_width() -> Option<usize> {
    if !std::io::stdout().is_terminal() {
        return None;
    }
    crossterm::terminal::size()
        .ok()
        .map(|(w, _)| w as usize)
        .filter(|w| *w > 0)
}

/// Style a whole line; colors never change its visible width.
pub fn paint(line: &ReportLine, use_color: bool) -> String {
    if !use_color {
        return line.text.clone();
    }
    let styled: ColoredString = match line.kind {
        LineKind::Border => line.text.as_str().dimmed(),
        LineKind::Header => line.text.as_str().cyan(),
        LineKind::Group => line.text.as_str().bold(),
        LineKind::Row => line.text.as_str().normal(),
        LineKind::Totals => line.text.as_str().bold(),
        LineKind::Footer => line.text.as_str().green(),
    };
    styled.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_color_flag_wins() {
        assert!(!detect_color(false, "always"));
        assert!(!detect_color(false, "auto"));
    }

    #[test]
    fn color_setting_never_and_always() {
        assert!(!detect_color(true, "never"));
        assert!(detect_color(true, "always"));
    }

    #[test]
    fn width_flag_beats_config() {
        assert_eq!(resolve_width(Some(100), Some(120)), 100);
        assert_eq!(resolve_width(None, Some(120)), 120);
    }

    #[test]
    fn plain_paint_is_unchanged() {
        let line = ReportLine {
            kind: LineKind::Totals,
            text: "│ Total │".to_string(),
        };
        assert_eq!(paint(&line, false), "│ Total │");
    }

    #[test]
    fn colored_paint_keeps_text() {
        colored::control::set_override(true);
        let line = ReportLine {
            kind: LineKind::Header,
            text: "│ Model │".to_string(),
        };
        let painted = paint(&line, true);
        colored::control::unset_override();
        assert!(painted.contains("│ Model │"));
        assert!(painted.starts_with('\u{1b}'));
    }
}
