use thiserror::Error;

/// Failures intrinsic to laying out and formatting a report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Terminal width {width} is too narrow for the report (minimum {minimum} columns)")]
    LayoutTooNarrow { width: usize, minimum: usize },
    #[error("Field width {width} cannot hold the suffix {suffix:?}")]
    FieldTooNarrow { width: usize, suffix: &'static str },
}
