use std::fmt;

use crate::core::error::ReportError;
use crate::core::formatter::{format_cost_fixed, format_tokens_fixed, format_usd};
use crate::core::layout::{
    LayoutSpec, COLUMN_GAP, COST_COLUMN_WIDTH, TOKEN_COLUMNS, TOKEN_COLUMN_WIDTH,
};
use crate::core::models::report::{Aggregation, Period, Totals, UsageBucket};
use crate::core::models::usage::TokenCounts;

const TOKEN_HEADERS: [&str; TOKEN_COLUMNS] = ["Input", "Output", "Cache Rd", "Cache Wr"];
const COST_HEADER: &str = "Cost";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Border,
    Header,
    Group,
    Row,
    Totals,
    Footer,
}

/// One finished report line, exactly as wide as the layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    pub kind: LineKind,
    pub text: String,
}

impl ReportLine {
    fn new(kind: LineKind, text: String) -> Self {
        Self { kind, text }
    }

    pub fn width(&self) -> usize {
        self.text.chars().count()
    }
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Render an aggregation as a box-drawn table.
///
/// Layout (summary, 69 columns):
/// ```text
/// ╭─ Claude Usage - Summary ──────────────────────────────────────────╮
/// │ Model           Input     Output   Cache Rd   Cache Wr       Cost │
/// ├───────────────────────────────────────────────────────────────────┤
/// │ opus-4-5     1.2 Mtok 310.0 Ktok  45.1 Mtok   2.0 Mtok  48.97 USD │
/// ├───────────────────────────────────────────────────────────────────┤
/// │ Total        1.2 Mtok 310.0 Ktok  45.1 Mtok   2.0 Mtok  48.97 USD │
/// │ Total cost                                              48.97 USD │
/// │ Cache savings                                          202.95 USD │
/// ╰───────────────────────────────────────────────────────────────────╯
/// ```
/// Hourly and daily reports put a group row per period (period cost in the Cost column)
/// above that period's model rows.
pub fn render(agg: &Aggregation, layout: &LayoutSpec) -> Result<Vec<ReportLine>, ReportError> {
    let mut lines = Vec::new();

    lines.push(ReportLine::new(
        LineKind::Border,
        top_border(&format!("Claude Usage - {}", agg.mode.title()), layout.width),
    ));

    let header_label = if agg.mode.is_time_bucketed() {
        "Period / Model"
    } else {
        "Model"
    };
    lines.push(framed(
        LineKind::Header,
        format!(
            "{}{}",
            label_cell(header_label, 0, layout.label_width),
            header_cells()
        ),
        layout,
    ));
    lines.push(ReportLine::new(LineKind::Border, separator(layout.width)));

    let body = if agg.mode.is_time_bucketed() {
        period_rows(&agg.periods, layout)?
    } else {
        agg.overall
            .iter()
            .map(|b| bucket_row(b, layout.primary_indent, layout))
            .collect::<Result<Vec<_>, _>>()?
    };
    if !body.is_empty() {
        lines.extend(body);
        lines.push(ReportLine::new(LineKind::Border, separator(layout.width)));
    }

    lines.extend(totals_rows(&agg.totals, layout)?);
    lines.push(ReportLine::new(LineKind::Border, bottom_border(layout.width)));

    Ok(lines)
}

fn period_rows(
    buckets: &[UsageBucket],
    layout: &LayoutSpec,
) -> Result<Vec<ReportLine>, ReportError> {
    let mut periods: Vec<Period> = buckets.iter().map(|b| b.period).collect();
    periods.sort();
    periods.dedup();

    let mut lines = Vec::new();
    for period in periods {
        let members: Vec<&UsageBucket> = buckets.iter().filter(|b| b.period == period).collect();
        let cost: f64 = members.iter().map(|b| b.cost).sum();
        lines.push(group_row(&period.to_string(), cost, layout)?);
        for bucket in members {
            lines.push(bucket_row(bucket, layout.secondary_indent, layout)?);
        }
    }
    Ok(lines)
}

fn bucket_row(
    bucket: &UsageBucket,
    indent: usize,
    layout: &LayoutSpec,
) -> Result<ReportLine, ReportError> {
    let content = format!(
        "{}{}",
        label_cell(bucket.model.as_str(), indent, layout.label_width),
        numeric_cells(&bucket.tokens, bucket.cost)?
    );
    Ok(framed(LineKind::Row, content, layout))
}

/// Period label across the label and token columns, period cost in the Cost column.
fn group_row(label: &str, cost: f64, layout: &LayoutSpec) -> Result<ReportLine, ReportError> {
    let span = layout.label_width + TOKEN_COLUMNS * (COLUMN_GAP + TOKEN_COLUMN_WIDTH);
    let content = format!(
        "{}{}{}",
        label_cell(label, layout.primary_indent, span),
        gap(),
        format_cost_fixed(cost, COST_COLUMN_WIDTH)?
    );
    Ok(framed(LineKind::Group, content, layout))
}

fn totals_rows(totals: &Totals, layout: &LayoutSpec) -> Result<Vec<ReportLine>, ReportError> {
    let row = format!(
        "{}{}",
        label_cell("Total", 0, layout.label_width),
        numeric_cells(&totals.tokens, totals.cost)?
    );
    Ok(vec![
        framed(LineKind::Totals, row, layout),
        framed(
            LineKind::Footer,
            spread("Total cost", &format_usd(totals.cost), layout.content_width),
            layout,
        ),
        framed(
            LineKind::Footer,
            spread(
                "Cache savings",
                &format_usd(totals.cache_savings),
                layout.content_width,
            ),
            layout,
        ),
    ])
}

fn numeric_cells(tokens: &TokenCounts, cost: f64) -> Result<String, ReportError> {
    let mut out = String::new();
    for value in [tokens.input, tokens.output, tokens.cache_read, tokens.cache_write] {
        out.push_str(&gap());
        out.push_str(&format_tokens_fixed(value, TOKEN_COLUMN_WIDTH)?);
    }
    out.push_str(&gap());
    out.push_str(&format_cost_fixed(cost, COST_COLUMN_WIDTH)?);
    Ok(out)
}

fn header_cells() -> String {
    let mut out = String::new();
    for name in TOKEN_HEADERS {
        out.push_str(&format!("{}{:>w$}", gap(), name, w = TOKEN_COLUMN_WIDTH));
    }
    out.push_str(&format!("{}{:>w$}", gap(), COST_HEADER, w = COST_COLUMN_WIDTH));
    out
}

fn gap() -> String {
    " ".repeat(COLUMN_GAP)
}

/// `text` indented by `indent`, then cut or padded to exactly `width` characters.
fn label_cell(text: &str, indent: usize, width: usize) -> String {
    let indented = format!("{}{}", " ".repeat(indent), text);
    fit(&indented, width)
}

/// Label on the left, value flush right, exactly `width` characters. The label gives way first.
fn spread(label: &str, value: &str, width: usize) -> String {
    let value = fit_right(value, width);
    let room = width - value.chars().count();
    if room == 0 {
        return value;
    }
    format!("{} {}", fit(label, room - 1), value)
}

fn fit(text: &str, width: usize) -> String {
    let cut: String = text.chars().take(width).collect();
    let len = cut.chars().count();
    format!("{}{}", cut, " ".repeat(width - len))
}

/// Keep at most `width` characters, dropping from the left.
fn fit_right(text: &str, width: usize) -> String {
    let len = text.chars().count();
    text.chars().skip(len.saturating_sub(width)).collect()
}

fn framed(kind: LineKind, content: String, layout: &LayoutSpec) -> ReportLine {
    debug_assert_eq!(content.chars().count(), layout.content_width);
    ReportLine::new(kind, format!("│ {} │", content))
}

fn top_border(title: &str, width: usize) -> String {
    let inner = width - 2;
    // "─ " + title + " " must leave room for at least one trailing rule
    let title: String = title.chars().take(inner.saturating_sub(4)).collect();
    let used = title.chars().count() + 3;
    format!("╭─ {} {}╮", title, "─".repeat(inner - used))
}

fn separator(width: usize) -> String {
    format!("├{}┤", "─".repeat(width - 2))
}

fn bottom_border(width: usize) -> String {
    format!("╰{}╯", "─".repeat(width - 2))
}
