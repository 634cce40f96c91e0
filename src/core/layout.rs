use crate::core::error::ReportError;

/// Reports never grow wider than this, however wide the terminal.
pub const MAX_WIDTH: usize = 200;
/// Two border characters plus one padding column on each side.
pub const FRAME_WIDTH: usize = 4;

pub const TOKEN_COLUMN_WIDTH: usize = 10;
pub const COST_COLUMN_WIDTH: usize = 10;
pub const TOKEN_COLUMNS: usize = 4;
/// Blank columns in front of every numeric column.
pub const COLUMN_GAP: usize = 1;
/// Room for the longest model key ("sonnet-4-5") with no indentation.
pub const MIN_LABEL_WIDTH: usize = 10;

/// Width of the numeric columns to the right of the label, gaps included.
pub const NUMERIC_WIDTH: usize =
    TOKEN_COLUMNS * (COLUMN_GAP + TOKEN_COLUMN_WIDTH) + COLUMN_GAP + COST_COLUMN_WIDTH;

/// Smallest terminal that holds the frame, the narrowest label and every numeric column.
pub const MIN_WIDTH: usize = FRAME_WIDTH + MIN_LABEL_WIDTH + NUMERIC_WIDTH;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutTier {
    Wide,
    Comfortable,
    Narrow,
}

struct Breakpoint {
    min_width: usize,
    tier: LayoutTier,
    primary: usize,
    secondary: usize,
}

/// Widest first; the first row whose `min_width` the terminal reaches wins.
static BREAKPOINTS: &[Breakpoint] = &[
    Breakpoint {
        min_width: 86,
        tier: LayoutTier::Wide,
        primary: 2,
        secondary: 4,
    },
    Breakpoint {
        min_width: 80,
        tier: LayoutTier::Comfortable,
        primary: 1,
        secondary: 3,
    },
    Breakpoint {
        min_width: 0,
        tier: LayoutTier::Narrow,
        primary: 0,
        secondary: 0,
    },
];

/// Column anchors shared by every line of one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSpec {
    /// Total line width, borders included.
    pub width: usize,
    /// Width between the padding columns.
    pub content_width: usize,
    /// Width left for row labels once the numeric columns are placed.
    pub label_width: usize,
    pub tier: LayoutTier,
    /// Indent for top-level row labels.
    pub primary_indent: usize,
    /// Indent for rows nested under a group row.
    pub secondary_indent: usize,
}

impl LayoutSpec {
    /// Lay out a report for a terminal `terminal_width` columns wide.
    ///
    /// The tier is chosen from the width as reported; the report itself is capped at
    /// [`MAX_WIDTH`].
    pub fn compute(terminal_width: usize) -> Result<Self, ReportError> {
        if terminal_width < MIN_WIDTH {
            return Err(ReportError::LayoutTooNarrow {
                width: terminal_width,
                minimum: MIN_WIDTH,
            });
        }

        let width = terminal_width.min(MAX_WIDTH);
        let content_width = width - FRAME_WIDTH;
        let bp = BREAKPOINTS
            .iter()
            .find(|b| terminal_width >= b.min_width)
            .unwrap_or(&BREAKPOINTS[BREAKPOINTS.len() - 1]);

        Ok(Self {
            width,
            content_width,
            label_width: content_width - NUMERIC_WIDTH,
            tier: bp.tier,
            primary_indent: bp.primary,
            secondary_indent: bp.secondary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimum_width_is_69() {
        assert_eq!(MIN_WIDTH, 69);
    }

    #[test]
    fn wide_tier() {
        let layout = LayoutSpec::compute(86).unwrap();
        assert_eq!(layout.tier, LayoutTier::Wide);
        assert_eq!(layout.primary_indent, 2);
        assert_eq!(layout.secondary_indent, 4);
    }

    #[test]
    fn comfortable_tier() {
        let layout = LayoutSpec::compute(80).unwrap();
        assert_eq!(layout.tier, LayoutTier::Comfortable);
        assert_eq!(layout.primary_indent, 1);
        assert_eq!(layout.secondary_indent, 3);

        let upper = LayoutSpec::compute(85).unwrap();
        assert_eq!(upper.tier, LayoutTier::Comfortable);
    }

    #[test]
    fn narrow_tier() {
        let layout = LayoutSpec::compute(70).unwrap();
        assert_eq!(layout.tier, LayoutTier::Narrow);
        assert_eq!(layout.primary_indent, 0);
        assert_eq!(layout.secondary_indent, 0);
    }

    #[test]
    fn minimum_width_is_narrow() {
        let layout = LayoutSpec::compute(69).unwrap();
        assert_eq!(layout.primary_indent, 0);
        assert_eq!(layout.secondary_indent, 0);
        assert_eq!(layout.label_width, MIN_LABEL_WIDTH);
    }

    #[test]
    fn caps_at_200() {
        let layout = LayoutSpec::compute(300).unwrap();
        assert_eq!(layout.width, 200);
        assert_eq!(layout.content_width, 196);
        assert_eq!(layout.tier, LayoutTier::Wide);
    }

    #[test]
    fn content_width_reserves_frame() {
        for w in MIN_WIDTH..=MAX_WIDTH {
            let layout = LayoutSpec::compute(w).unwrap();
            assert_eq!(layout.width, w);
            assert_eq!(layout.content_width + FRAME_WIDTH, w);
            assert_eq!(layout.label_width + NUMERIC_WIDTH, layout.content_width);
            assert!(layout.secondary_indent < layout.label_width);
        }
    }

    #[test]
    fn too_narrow_is_an_error() {
        assert_eq!(
            LayoutSpec::compute(68),
            Err(ReportError::LayoutTooNarrow {
                width: 68,
                minimum: 69
            })
        );
        assert!(LayoutSpec::compute(0).is_err());
    }
}
