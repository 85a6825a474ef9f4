//! The fixed logical slide grid and the `GridSpan` rectangle placed on it.
//!
//! Slides are laid out on a 32 × 18 grid over a 1920 × 1080 logical canvas.
//! Positions use CSS grid-line numbering: lines are 1-based and a span is
//! inclusive of its start line and exclusive of its end line, so a full-width
//! element spans columns `1/33`.
//!
//! The canonical external form of one axis is the `"start/end"` string
//! (`grid-row` / `grid-column` syntax). Parsing never fails loudly: missing
//! or malformed input falls back to a default span, and every span that
//! enters the system passes through [`GridSpan::normalized`].

use crate::geometry::clamp_span;
use serde::{Deserialize, Serialize};
use std::fmt;
use winnow::ascii::{digit1, space0};
use winnow::combinator::{delimited, separated_pair};
use winnow::prelude::*;

pub const GRID_COLUMNS: u16 = 32;
pub const GRID_ROWS: u16 = 18;

pub const CANVAS_WIDTH: f32 = 1920.0;
pub const CANVAS_HEIGHT: f32 = 1080.0;

/// Highest legal end line on the column axis.
pub const MAX_COL_LINE: u16 = GRID_COLUMNS + 1;
/// Highest legal end line on the row axis.
pub const MAX_ROW_LINE: u16 = GRID_ROWS + 1;

/// Minimum extent of an element, in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MinSize {
    pub rows: u16,
    pub cols: u16,
}

impl MinSize {
    pub const fn new(rows: u16, cols: u16) -> Self {
        Self { rows, cols }
    }
}

impl Default for MinSize {
    fn default() -> Self {
        Self::new(1, 1)
    }
}

/// A rectangle on the slide grid, in grid-line coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridSpan {
    pub row_start: u16,
    pub row_end: u16,
    pub col_start: u16,
    pub col_end: u16,
}

impl GridSpan {
    /// Build a span without validation. Use [`GridSpan::normalized`] before
    /// storing anything that came from outside.
    pub const fn new(row_start: u16, row_end: u16, col_start: u16, col_end: u16) -> Self {
        Self {
            row_start,
            row_end,
            col_start,
            col_end,
        }
    }

    /// The whole slide.
    pub const fn full() -> Self {
        Self::new(1, MAX_ROW_LINE, 1, MAX_COL_LINE)
    }

    pub fn rows(&self) -> u16 {
        self.row_end.saturating_sub(self.row_start)
    }

    pub fn cols(&self) -> u16 {
        self.col_end.saturating_sub(self.col_start)
    }

    /// Whether the span lies on the grid and meets `min`.
    pub fn is_valid(&self, min: MinSize) -> bool {
        self.row_start >= 1
            && self.col_start >= 1
            && self.row_start < self.row_end
            && self.col_start < self.col_end
            && self.row_end <= MAX_ROW_LINE
            && self.col_end <= MAX_COL_LINE
            && self.rows() >= min.rows
            && self.cols() >= min.cols
    }

    /// Clamp onto the grid and grow to `min`. Translation is preferred over
    /// shrinking: a span hanging off an edge is shifted back, not cut.
    pub fn normalized(self, min: MinSize) -> Self {
        let (row_start, row_end) = clamp_span(
            i32::from(self.row_start),
            i32::from(self.row_end),
            1,
            i32::from(MAX_ROW_LINE),
            i32::from(min.rows),
        );
        let (col_start, col_end) = clamp_span(
            i32::from(self.col_start),
            i32::from(self.col_end),
            1,
            i32::from(MAX_COL_LINE),
            i32::from(min.cols),
        );
        Self::new(row_start, row_end, col_start, col_end)
    }

    /// `grid-row` value, e.g. `"6/12"`.
    pub fn row_lines(&self) -> String {
        format_lines(self.row_start, self.row_end)
    }

    /// `grid-column` value, e.g. `"5/28"`.
    pub fn column_lines(&self) -> String {
        format_lines(self.col_start, self.col_end)
    }

    /// Build a span from `grid-row` / `grid-column` strings. Each axis that is
    /// missing or malformed takes the matching axis of `fallback`.
    pub fn from_lines(
        grid_row: Option<&str>,
        grid_column: Option<&str>,
        fallback: GridSpan,
        min: MinSize,
    ) -> Self {
        let axis = |input: Option<&str>, name: &str, default: (u16, u16)| match input {
            Some(s) => parse_lines(s).unwrap_or_else(|| {
                log::debug!("malformed {name} {s:?}; using {}/{}", default.0, default.1);
                default
            }),
            None => default,
        };
        let (row_start, row_end) = axis(grid_row, "grid-row", (fallback.row_start, fallback.row_end));
        let (col_start, col_end) =
            axis(grid_column, "grid-column", (fallback.col_start, fallback.col_end));
        Self::new(row_start, row_end, col_start, col_end).normalized(min)
    }
}

impl fmt::Display for GridSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} col {}", self.row_lines(), self.column_lines())
    }
}

/// Format a line pair as `"start/end"`.
pub fn format_lines(start: u16, end: u16) -> String {
    format!("{start}/{end}")
}

/// Parse a `"start/end"` line pair. Whitespace around either number is
/// accepted. Returns `None` for anything else, including `start >= end` and
/// line zero.
pub fn parse_lines(input: &str) -> Option<(u16, u16)> {
    let (start, end) = line_pair.parse(input).ok()?;
    (start >= 1 && start < end).then_some((start, end))
}

fn grid_line(input: &mut &str) -> ModalResult<u16> {
    delimited(space0, digit1, space0)
        .try_map(str::parse::<u16>)
        .parse_next(input)
}

fn line_pair(input: &mut &str) -> ModalResult<(u16, u16)> {
    separated_pair(grid_line, '/', grid_line).parse_next(input)
}
