//! Hit testing: pixel → element / resize handle lookup.
//!
//! Elements are tested front-to-back by z-index. Handles belong only to the
//! selected element and are tested before any element body, so a handle that
//! overhangs a neighbour still wins.

use sg_core::geometry::{ResizeHandle, Viewport};
use sg_core::id::ElementId;
use sg_core::model::ElementRecord;

/// What a pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Handle(ElementId, ResizeHandle),
    Element(ElementId),
    Background,
}

/// Find the topmost visible element at `(px, py)`.
/// Ties on z-index go to the element listed last.
pub fn hit_test<'a>(
    records: impl IntoIterator<Item = &'a ElementRecord>,
    viewport: Viewport,
    px: f32,
    py: f32,
) -> Option<ElementId> {
    records
        .into_iter()
        .filter(|r| r.is_interactive() && viewport.span_rect(&r.position).contains(px, py))
        .max_by_key(|r| r.z_index)
        .map(|r| r.id)
}

/// Find the handle of `record` nearest to `(px, py)` within `tolerance`
/// pixels. Locked and hidden elements have no live handles.
pub fn hit_test_handle(
    record: &ElementRecord,
    viewport: Viewport,
    px: f32,
    py: f32,
    tolerance: f32,
) -> Option<ResizeHandle> {
    if record.locked || !record.is_interactive() {
        return None;
    }
    let rect = viewport.span_rect(&record.position);
    let limit = tolerance * tolerance;
    ResizeHandle::ALL
        .into_iter()
        .map(|handle| {
            let (hx, hy) = handle.anchor(&rect);
            let (dx, dy) = (px - hx, py - hy);
            (handle, dx * dx + dy * dy)
        })
        .filter(|(_, dist)| *dist <= limit)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(handle, _)| handle)
}

/// Resolve a pointer position to a target: selected element's handles
/// first, then element bodies, then the slide background.
pub fn hit_target<'a>(
    records: impl IntoIterator<Item = &'a ElementRecord>,
    selected: Option<&ElementRecord>,
    viewport: Viewport,
    px: f32,
    py: f32,
    tolerance: f32,
) -> HitTarget {
    if let Some(sel) = selected
        && let Some(handle) = hit_test_handle(sel, viewport, px, py, tolerance)
    {
        return HitTarget::Handle(sel.id, handle);
    }
    match hit_test(records, viewport, px, py) {
        Some(id) => HitTarget::Element(id),
        None => HitTarget::Background,
    }
}
