//! Single-slot clipboard built on registry operations.
//!
//! A snapshot is self-contained (variant, position, payload) and encodes to
//! MessagePack so a host can park it on the system clipboard and hand it
//! back later. Repeated pastes walk away from the source one offset per
//! axis, turning around at a grid edge. A paste never lands on the source's
//! span or on the previous paste's span unless the element fills the slide.

use crate::registry::{InsertOutcome, Registry};
use serde::{Deserialize, Serialize};
use sg_core::error::{EngineError, Result};
use sg_core::geometry::{GridDelta, clamp_span, translate};
use sg_core::grid::{GridSpan, MAX_COL_LINE, MAX_ROW_LINE, MinSize};
use sg_core::model::{ElementRecord, InsertConfig, Payload, Variant};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipboardSnapshot {
    pub variant: Variant,
    pub position: GridSpan,
    pub data: Payload,
}

impl ClipboardSnapshot {
    pub fn of(record: &ElementRecord) -> Self {
        Self {
            variant: record.variant,
            position: record.position,
            data: record.data.clone(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(rmp_serde::from_slice(bytes)?)
    }
}

#[derive(Debug, Clone)]
pub struct Clipboard {
    slot: Option<ClipboardSnapshot>,
    last_paste: Option<GridSpan>,
    /// Paste direction per axis, `(cols, rows)`, each ±1.
    direction: (i32, i32),
    offset: i32,
}

impl Clipboard {
    pub fn new(offset: i32) -> Self {
        Self {
            slot: None,
            last_paste: None,
            direction: (1, 1),
            offset: offset.max(1),
        }
    }

    pub fn snapshot(&self) -> Option<&ClipboardSnapshot> {
        self.slot.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    /// Hold an externally supplied snapshot, as if it had been copied.
    pub fn load(&mut self, snapshot: ClipboardSnapshot) {
        self.slot = Some(snapshot);
        self.last_paste = None;
        self.direction = (1, 1);
    }

    /// Capture the selected element. Only text boxes can be copied.
    pub fn copy(&mut self, registry: &Registry) -> Result<&ClipboardSnapshot> {
        let record = registry.selected().ok_or(EngineError::NothingSelected)?;
        if !record.variant.supports_copy() {
            return Err(EngineError::Unsupported {
                operation: "copy",
                variant: record.variant,
            });
        }
        log::debug!("copied {:?}", record.id);
        let snapshot = ClipboardSnapshot::of(record);
        self.load(snapshot);
        self.slot.as_ref().ok_or(EngineError::ClipboardEmpty)
    }

    /// Copy, then delete the original. A failed copy deletes nothing.
    pub fn cut(&mut self, registry: &mut Registry) -> Result<ElementRecord> {
        self.copy(registry)?;
        let id = registry
            .selected()
            .map(|r| r.id)
            .ok_or(EngineError::NothingSelected)?;
        registry.delete(id)
    }

    /// Insert the held snapshot on the active slide, offset from the
    /// previous paste, and select it.
    pub fn paste(&mut self, registry: &mut Registry) -> Result<InsertOutcome> {
        let snapshot = self.slot.as_ref().ok_or(EngineError::ClipboardEmpty)?;
        let base = self.last_paste.unwrap_or(snapshot.position);
        let min = snapshot.variant.min_size();

        let (col_start, col_end) = step_axis(
            base.col_start,
            base.col_end,
            MAX_COL_LINE,
            min.cols,
            self.offset,
            &mut self.direction.0,
        );
        let (row_start, row_end) = step_axis(
            base.row_start,
            base.row_end,
            MAX_ROW_LINE,
            min.rows,
            self.offset,
            &mut self.direction.1,
        );
        let mut target = GridSpan::new(row_start, row_end, col_start, col_end);
        let taken = [snapshot.position, base];
        if taken.contains(&target) {
            // Near-full spans can bounce straight back onto the source.
            target = detours(base, self.offset, min)
                .find(|span| !taken.contains(span))
                .unwrap_or(target);
        }

        let config = InsertConfig::at(target).with_payload(snapshot.data.clone());
        let outcome = registry.insert(snapshot.variant, registry.active_slide(), config)?;
        registry.select(outcome.element_id)?;
        self.last_paste = registry
            .get_on(outcome.slide_index, outcome.element_id)
            .map(|r| r.position);
        log::debug!("pasted {:?} at {target}", outcome.element_id);
        Ok(outcome)
    }
}

/// Other placements around `base`: diagonals, then single-axis moves, at
/// one and two offsets.
fn detours(base: GridSpan, offset: i32, min: MinSize) -> impl Iterator<Item = GridSpan> {
    const STEPS: [(i32, i32); 8] = [
        (1, 1),
        (-1, -1),
        (1, -1),
        (-1, 1),
        (1, 0),
        (-1, 0),
        (0, 1),
        (0, -1),
    ];
    [offset, 2 * offset].into_iter().flat_map(move |distance| {
        STEPS
            .into_iter()
            .map(move |(dc, dr)| translate(base, GridDelta::new(dc * distance, dr * distance), min))
    })
}

/// Shift one axis by `offset` in `direction`. When the edge blocks the
/// shift, the direction turns around for this and later pastes.
fn step_axis(start: u16, end: u16, max: u16, min_span: u16, offset: i32, direction: &mut i32) -> (u16, u16) {
    let shift = |d: i32| {
        clamp_span(
            i32::from(start) + d * offset,
            i32::from(end) + d * offset,
            1,
            i32::from(max),
            i32::from(min_span),
        )
    };
    let moved = shift(*direction);
    if moved.0 != start {
        return moved;
    }
    *direction = -*direction;
    shift(*direction)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationBridge;
    use pretty_assertions::assert_eq;
    use sg_core::config::EditorConfig;
    use sg_core::error::ErrorKind;
    use sg_render::surface::MemorySurface;

    fn registry() -> Registry {
        let mut registry = Registry::new(
            &EditorConfig::default(),
            MemorySurface::new(),
            NotificationBridge::default(),
        );
        registry.add_slide("s");
        registry
    }

    fn text_at(registry: &mut Registry, span: GridSpan) -> sg_core::id::ElementId {
        let id = registry
            .insert(Variant::TextBox, 0, InsertConfig::at(span))
            .unwrap()
            .element_id;
        registry.select(id).unwrap();
        id
    }

    #[test]
    fn copy_requires_selection() {
        let registry = registry();
        let mut clipboard = Clipboard::new(1);
        assert!(matches!(clipboard.copy(&registry), Err(EngineError::NothingSelected)));
    }

    #[test]
    fn copy_of_chart_is_unsupported() {
        let mut registry = registry();
        let id = registry.insert(Variant::Chart, 0, InsertConfig::default()).unwrap().element_id;
        registry.select(id).unwrap();
        let mut clipboard = Clipboard::new(1);
        let err = clipboard.copy(&registry).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Unsupported);
        assert!(clipboard.is_empty());
    }

    #[test]
    fn paste_on_empty_clipboard() {
        let mut registry = registry();
        let mut clipboard = Clipboard::new(1);
        assert!(matches!(clipboard.paste(&mut registry), Err(EngineError::ClipboardEmpty)));
    }

    #[test]
    fn repeated_pastes_step_diagonally() {
        let mut registry = registry();
        let source = text_at(&mut registry, GridSpan::new(6, 12, 5, 28));
        let mut clipboard = Clipboard::new(1);
        clipboard.copy(&registry).unwrap();

        let first = clipboard.paste(&mut registry).unwrap().element_id;
        let second = clipboard.paste(&mut registry).unwrap().element_id;

        assert_eq!(registry.get(first).unwrap().position, GridSpan::new(7, 13, 6, 29));
        assert_eq!(registry.get(second).unwrap().position, GridSpan::new(8, 14, 7, 30));
        assert_eq!(registry.selected().unwrap().id, second);
        assert_ne!(first, source);
    }

    #[test]
    fn paste_turns_around_at_the_edge() {
        let mut registry = registry();
        let source = GridSpan::new(16, 19, 30, 33);
        text_at(&mut registry, source);
        let mut clipboard = Clipboard::new(1);
        clipboard.copy(&registry).unwrap();

        let first = clipboard.paste(&mut registry).unwrap().element_id;
        let second = clipboard.paste(&mut registry).unwrap().element_id;
        let a = registry.get(first).unwrap().position;
        let b = registry.get(second).unwrap().position;
        assert_eq!(a, GridSpan::new(15, 18, 29, 32));
        assert_eq!(b, GridSpan::new(14, 17, 28, 31));
    }

    #[test]
    fn near_full_slide_pastes_never_repeat_the_source() {
        let mut registry = registry();
        let source = GridSpan::new(1, 18, 1, 32);
        text_at(&mut registry, source);
        let mut clipboard = Clipboard::new(1);
        clipboard.copy(&registry).unwrap();

        let mut previous = source;
        for _ in 0..4 {
            let id = clipboard.paste(&mut registry).unwrap().element_id;
            let span = registry.get(id).unwrap().position;
            assert_ne!(span, source);
            assert_ne!(span, previous);
            previous = span;
        }
    }

    #[test]
    fn second_paste_of_near_full_span_takes_a_detour() {
        let mut registry = registry();
        text_at(&mut registry, GridSpan::new(1, 18, 1, 32));
        let mut clipboard = Clipboard::new(1);
        clipboard.copy(&registry).unwrap();

        let first = clipboard.paste(&mut registry).unwrap().element_id;
        let second = clipboard.paste(&mut registry).unwrap().element_id;
        assert_eq!(registry.get(first).unwrap().position, GridSpan::new(2, 19, 2, 33));
        assert_eq!(registry.get(second).unwrap().position, GridSpan::new(1, 18, 2, 33));
    }

    #[test]
    fn cut_removes_original_and_keeps_content() {
        let mut registry = registry();
        let id = text_at(&mut registry, GridSpan::new(2, 4, 2, 10));
        registry.update_text_box_content(id, "<p>hello</p>").unwrap();

        let mut clipboard = Clipboard::new(1);
        let removed = clipboard.cut(&mut registry).unwrap();
        assert_eq!(removed.id, id);
        assert!(registry.get(id).is_none());
        assert!(registry.selected().is_none());

        let pasted = clipboard.paste(&mut registry).unwrap().element_id;
        assert!(!registry.get(pasted).unwrap().is_placeholder());
    }

    #[test]
    fn failed_cut_deletes_nothing() {
        let mut registry = registry();
        let id = registry.insert(Variant::Shape, 0, InsertConfig::default()).unwrap().element_id;
        registry.select(id).unwrap();
        let mut clipboard = Clipboard::new(1);
        assert!(clipboard.cut(&mut registry).is_err());
        assert!(registry.get(id).is_some());
    }

    #[test]
    fn snapshot_survives_byte_transfer() {
        let mut registry = registry();
        let id = text_at(&mut registry, GridSpan::new(3, 6, 4, 12));
        registry.update_text_box_content(id, "<b>bold</b>").unwrap();
        let mut clipboard = Clipboard::new(1);
        let bytes = clipboard.copy(&registry).unwrap().to_bytes().unwrap();

        let mut other = Clipboard::new(2);
        other.load(ClipboardSnapshot::from_bytes(&bytes).unwrap());
        assert_eq!(other.snapshot(), clipboard.snapshot());

        let pasted = other.paste(&mut registry).unwrap().element_id;
        assert_eq!(registry.get(pasted).unwrap().position, GridSpan::new(5, 8, 6, 14));
    }
}
