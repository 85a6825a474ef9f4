//! Geometry engine: pointer pixels → grid cells, span clamping, and the
//! eight resize handles.
//!
//! Everything here is a pure function of its arguments. The only state that
//! exists during a gesture lives in the interaction controller, which passes
//! the viewport and starting span in explicitly.

use crate::grid::{GRID_COLUMNS, GRID_ROWS, GridSpan, MAX_COL_LINE, MAX_ROW_LINE, MinSize};
use serde::{Deserialize, Serialize};

/// On-screen size of the slide surface, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: crate::grid::CANVAS_WIDTH,
            height: crate::grid::CANVAS_HEIGHT,
        }
    }
}

impl Viewport {
    /// Both sides finite and positive.
    pub fn is_usable(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }

    pub fn cell_width(&self) -> f32 {
        self.width / f32::from(GRID_COLUMNS)
    }

    pub fn cell_height(&self) -> f32 {
        self.height / f32::from(GRID_ROWS)
    }

    /// The 1-based `(col, row)` of the cell under a point, or `None` when the
    /// point is off the slide.
    pub fn cell_at(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if self.width <= 0.0 || self.height <= 0.0 {
            return None;
        }
        if x < 0.0 || y < 0.0 || x >= self.width || y >= self.height {
            return None;
        }
        let col = (x / self.cell_width()).floor() as u16 + 1;
        let row = (y / self.cell_height()).floor() as u16 + 1;
        Some((col.min(GRID_COLUMNS), row.min(GRID_ROWS)))
    }

    /// Pixel rectangle covered by a span.
    pub fn span_rect(&self, span: &GridSpan) -> PixelRect {
        let cw = self.cell_width();
        let ch = self.cell_height();
        PixelRect {
            x: f32::from(span.col_start.saturating_sub(1)) * cw,
            y: f32::from(span.row_start.saturating_sub(1)) * ch,
            width: f32::from(span.cols()) * cw,
            height: f32::from(span.rows()) * ch,
        }
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl PixelRect {
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x && px < self.x + self.width && py >= self.y && py < self.y + self.height
    }
}

/// Whole-cell movement derived from a pointer delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GridDelta {
    pub cols: i32,
    pub rows: i32,
}

impl GridDelta {
    pub const fn new(cols: i32, rows: i32) -> Self {
        Self { cols, rows }
    }

    pub fn is_zero(&self) -> bool {
        self.cols == 0 && self.rows == 0
    }

    /// Limit each axis to the grid's extent. Anything larger clamps to the
    /// same span anyway.
    pub fn bounded(self) -> Self {
        let cols = i32::from(GRID_COLUMNS);
        let rows = i32::from(GRID_ROWS);
        Self {
            cols: self.cols.clamp(-cols, cols),
            rows: self.rows.clamp(-rows, rows),
        }
    }
}

/// Convert a pixel delta into whole cells at the viewport's current scale.
/// Each axis rounds to the nearest cell, so one cell is the granularity at
/// any zoom level. No delta exceeds the grid's own extent.
pub fn pixel_delta_to_grid_delta(dx: f32, dy: f32, viewport: Viewport) -> GridDelta {
    let cw = viewport.cell_width();
    let ch = viewport.cell_height();
    if !(cw > 0.0 && ch > 0.0) || !dx.is_finite() || !dy.is_finite() {
        return GridDelta::default();
    }
    let cells = |d: f32, size: f32, limit: u16| {
        let limit = f32::from(limit);
        (d / size).round().clamp(-limit, limit) as i32
    };
    GridDelta {
        cols: cells(dx, cw, GRID_COLUMNS),
        rows: cells(dy, ch, GRID_ROWS),
    }
}

/// Clamp one axis of a span to `[min, max]` with at least `min_span` cells.
///
/// A span that is too short grows at its end. A span that hangs off either
/// bound is shifted back while keeping its length; only a span longer than
/// the whole axis is cut down to `[min, max]`.
pub fn clamp_span(start: i32, end: i32, min: i32, max: i32, min_span: i32) -> (u16, u16) {
    let room = (max - min).max(1);
    let min_span = min_span.clamp(1, room);

    let mut start = start;
    let mut len = end - start;
    if len < min_span {
        len = min_span;
    }
    if len >= room {
        return (min as u16, max as u16);
    }
    if start < min {
        start = min;
    }
    if start.saturating_add(len) > max {
        start = max - len;
    }
    (start as u16, (start + len) as u16)
}

/// Move a span by whole cells, holding its size and stopping at the edges.
pub fn translate(span: GridSpan, delta: GridDelta, min: MinSize) -> GridSpan {
    let delta = delta.bounded();
    let (row_start, row_end) = clamp_span(
        i32::from(span.row_start) + delta.rows,
        i32::from(span.row_end) + delta.rows,
        1,
        i32::from(MAX_ROW_LINE),
        i32::from(min.rows),
    );
    let (col_start, col_end) = clamp_span(
        i32::from(span.col_start) + delta.cols,
        i32::from(span.col_end) + delta.cols,
        1,
        i32::from(MAX_COL_LINE),
        i32::from(min.cols),
    );
    GridSpan::new(row_start, row_end, col_start, col_end)
}

/// The eight resize affordances, named by compass direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    N,
    S,
    E,
    W,
    Ne,
    Nw,
    Se,
    Sw,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::Nw,
        ResizeHandle::N,
        ResizeHandle::Ne,
        ResizeHandle::E,
        ResizeHandle::Se,
        ResizeHandle::S,
        ResizeHandle::Sw,
        ResizeHandle::W,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::N => "n",
            Self::S => "s",
            Self::E => "e",
            Self::W => "w",
            Self::Ne => "ne",
            Self::Nw => "nw",
            Self::Se => "se",
            Self::Sw => "sw",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|h| h.name() == name)
    }

    /// CSS cursor shown over the handle.
    pub fn cursor(self) -> &'static str {
        match self {
            Self::N | Self::S => "ns-resize",
            Self::E | Self::W => "ew-resize",
            Self::Ne | Self::Sw => "nesw-resize",
            Self::Nw | Self::Se => "nwse-resize",
        }
    }

    pub fn moves_row_start(self) -> bool {
        matches!(self, Self::N | Self::Ne | Self::Nw)
    }

    pub fn moves_row_end(self) -> bool {
        matches!(self, Self::S | Self::Se | Self::Sw)
    }

    pub fn moves_col_start(self) -> bool {
        matches!(self, Self::W | Self::Nw | Self::Sw)
    }

    pub fn moves_col_end(self) -> bool {
        matches!(self, Self::E | Self::Ne | Self::Se)
    }

    /// Anchor point of the handle on a pixel rectangle.
    pub fn anchor(self, rect: &PixelRect) -> (f32, f32) {
        let left = rect.x;
        let right = rect.x + rect.width;
        let top = rect.y;
        let bottom = rect.y + rect.height;
        let mid_x = rect.x + rect.width / 2.0;
        let mid_y = rect.y + rect.height / 2.0;
        match self {
            Self::N => (mid_x, top),
            Self::S => (mid_x, bottom),
            Self::E => (right, mid_y),
            Self::W => (left, mid_y),
            Self::Ne => (right, top),
            Self::Nw => (left, top),
            Self::Se => (right, bottom),
            Self::Sw => (left, bottom),
        }
    }
}

/// Apply a handle drag to `current`. Only the edges named by the handle move;
/// each moving edge stops at the grid boundary or where the opposite edge
/// would leave less than `min`.
pub fn resize_for_handle(
    handle: ResizeHandle,
    current: GridSpan,
    delta: GridDelta,
    min: MinSize,
) -> GridSpan {
    let current = current.normalized(min);
    let delta = delta.bounded();
    let min_rows = i32::from(min.rows.max(1));
    let min_cols = i32::from(min.cols.max(1));

    let mut row_start = i32::from(current.row_start);
    let mut row_end = i32::from(current.row_end);
    let mut col_start = i32::from(current.col_start);
    let mut col_end = i32::from(current.col_end);

    if handle.moves_row_start() {
        row_start = (row_start + delta.rows).clamp(1, row_end - min_rows);
    }
    if handle.moves_row_end() {
        row_end = (row_end + delta.rows).clamp(row_start + min_rows, i32::from(MAX_ROW_LINE));
    }
    if handle.moves_col_start() {
        col_start = (col_start + delta.cols).clamp(1, col_end - min_cols);
    }
    if handle.moves_col_end() {
        col_end = (col_end + delta.cols).clamp(col_start + min_cols, i32::from(MAX_COL_LINE));
    }

    GridSpan::new(
        row_start as u16,
        row_end as u16,
        col_start as u16,
        col_end as u16,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const VIEWPORT: Viewport = Viewport {
        width: 1920.0,
        height: 1080.0,
    };

    #[test]
    fn pixel_delta_rounds_to_nearest_cell() {
        // 60 × 60 px cells at full scale.
        assert_eq!(pixel_delta_to_grid_delta(120.0, 60.0, VIEWPORT), GridDelta::new(2, 1));
        assert_eq!(pixel_delta_to_grid_delta(29.0, -31.0, VIEWPORT), GridDelta::new(0, -1));
    }

    #[test]
    fn pixel_delta_scales_with_viewport() {
        let half = Viewport {
            width: 960.0,
            height: 540.0,
        };
        assert_eq!(pixel_delta_to_grid_delta(60.0, 30.0, half), GridDelta::new(2, 1));
    }

    #[test]
    fn pixel_delta_degenerate_viewport_is_zero() {
        let empty = Viewport {
            width: 0.0,
            height: 0.0,
        };
        assert!(pixel_delta_to_grid_delta(500.0, 500.0, empty).is_zero());
        assert!(pixel_delta_to_grid_delta(f32::NAN, 0.0, VIEWPORT).is_zero());
    }

    #[test]
    fn pixel_delta_on_tiny_viewport_stays_within_grid() {
        let tiny = Viewport {
            width: 1e-30,
            height: 1e-30,
        };
        let delta = pixel_delta_to_grid_delta(10.0, -10.0, tiny);
        assert_eq!(delta, GridDelta::new(32, -18));

        let span = GridSpan::new(6, 12, 5, 28);
        let min = MinSize::new(2, 2);
        assert_eq!(translate(span, delta, min), GridSpan::new(1, 7, 10, 33));
        assert_eq!(
            resize_for_handle(ResizeHandle::Se, span, delta, min),
            GridSpan::new(6, 8, 5, 33)
        );
    }

    #[test]
    fn extreme_deltas_are_bounded_by_the_grid() {
        let span = GridSpan::new(6, 12, 5, 28);
        let min = MinSize::new(2, 2);
        let far = GridDelta::new(i32::MAX, i32::MIN);
        assert_eq!(translate(span, far, min), GridSpan::new(1, 7, 10, 33));
        assert_eq!(
            resize_for_handle(ResizeHandle::Nw, span, far, min),
            GridSpan::new(1, 12, 26, 28)
        );
    }

    #[test]
    fn clamp_span_holds_length_when_translating() {
        assert_eq!(clamp_span(-3, 4, 1, 33, 1), (1, 8));
        assert_eq!(clamp_span(30, 40, 1, 33, 1), (23, 33));
    }

    #[test]
    fn clamp_span_enforces_minimum() {
        assert_eq!(clamp_span(5, 5, 1, 19, 3), (5, 8));
        assert_eq!(clamp_span(18, 19, 1, 19, 3), (16, 19));
    }

    #[test]
    fn clamp_span_cuts_oversized() {
        assert_eq!(clamp_span(-10, 50, 1, 19, 1), (1, 19));
    }

    #[test]
    fn translate_stops_at_edges() {
        let span = GridSpan::new(1, 5, 30, 33);
        let moved = translate(span, GridDelta::new(4, -3), MinSize::default());
        assert_eq!(moved, span);
    }

    #[test]
    fn resize_each_edge_handle() {
        let span = GridSpan::new(5, 10, 5, 10);
        let d = GridDelta::new(2, 2);
        let min = MinSize::default();
        assert_eq!(resize_for_handle(ResizeHandle::N, span, d, min), GridSpan::new(7, 10, 5, 10));
        assert_eq!(resize_for_handle(ResizeHandle::S, span, d, min), GridSpan::new(5, 12, 5, 10));
        assert_eq!(resize_for_handle(ResizeHandle::E, span, d, min), GridSpan::new(5, 10, 5, 12));
        assert_eq!(resize_for_handle(ResizeHandle::W, span, d, min), GridSpan::new(5, 10, 7, 10));
    }

    #[test]
    fn resize_corner_moves_two_edges() {
        let span = GridSpan::new(5, 10, 5, 10);
        let d = GridDelta::new(-1, 3);
        let min = MinSize::default();
        assert_eq!(resize_for_handle(ResizeHandle::Se, span, d, min), GridSpan::new(5, 13, 5, 9));
        assert_eq!(resize_for_handle(ResizeHandle::Sw, span, d, min), GridSpan::new(5, 13, 4, 10));
        assert_eq!(resize_for_handle(ResizeHandle::Ne, span, d, min), GridSpan::new(8, 10, 5, 9));
        assert_eq!(resize_for_handle(ResizeHandle::Nw, span, d, min), GridSpan::new(8, 10, 4, 10));
    }

    #[test]
    fn resize_nw_on_chart_stops_at_minimum() {
        let chart_min = MinSize::new(3, 4);
        let span = GridSpan::new(4, 17, 2, 32);

        let resized = resize_for_handle(ResizeHandle::Nw, span, GridDelta::new(10, 10), chart_min);
        assert_eq!(resized, GridSpan::new(14, 17, 12, 32));

        let resized = resize_for_handle(ResizeHandle::Nw, span, GridDelta::new(40, 40), chart_min);
        assert_eq!(resized, GridSpan::new(14, 17, 28, 32));
        assert_eq!(resized.rows(), 3);
        assert_eq!(resized.cols(), 4);
    }

    #[test]
    fn resize_never_leaves_grid() {
        let span = GridSpan::new(2, 4, 2, 4);
        let out = resize_for_handle(ResizeHandle::Nw, span, GridDelta::new(-10, -10), MinSize::default());
        assert_eq!(out, GridSpan::new(1, 4, 1, 4));
        let out = resize_for_handle(ResizeHandle::Se, span, GridDelta::new(99, 99), MinSize::default());
        assert_eq!(out, GridSpan::new(2, MAX_ROW_LINE, 2, MAX_COL_LINE));
    }

    #[test]
    fn cell_at_maps_pixels() {
        assert_eq!(VIEWPORT.cell_at(0.0, 0.0), Some((1, 1)));
        assert_eq!(VIEWPORT.cell_at(1919.0, 1079.0), Some((32, 18)));
        assert_eq!(VIEWPORT.cell_at(-1.0, 10.0), None);
        assert_eq!(VIEWPORT.cell_at(1920.0, 10.0), None);
    }

    #[test]
    fn span_rect_matches_cells() {
        let rect = VIEWPORT.span_rect(&GridSpan::new(2, 4, 3, 5));
        assert_eq!(rect, PixelRect { x: 120.0, y: 60.0, width: 120.0, height: 120.0 });
    }

    #[test]
    fn handle_names_round_trip() {
        for handle in ResizeHandle::ALL {
            assert_eq!(ResizeHandle::from_name(handle.name()), Some(handle));
        }
        assert_eq!(ResizeHandle::from_name("x"), None);
    }
}
