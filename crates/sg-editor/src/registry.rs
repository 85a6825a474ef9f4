//! Element registry: the authoritative map of element records.
//!
//! Records live per slide, keyed by `ElementId`, so identity is always
//! slide-local. The registry owns selection, both z-index pools, and the
//! restoration contract; every mutation completes (record, surface node,
//! notification) before the call returns.

use crate::notify::{ChangeType, NotificationBridge};
use serde::Serialize;
use sg_core::config::EditorConfig;
use sg_core::error::{EngineError, Result};
use sg_core::geometry::{GridDelta, translate};
use sg_core::grid::GridSpan;
use sg_core::id::ElementId;
use sg_core::model::{
    ContentUpdate, ElementRecord, ImageContent, InsertConfig, Payload, ShapeContent, TableContent,
    TextStyle, Variant, ZPool,
};
use sg_render::surface::Surface;
use std::collections::HashMap;

// ─── Outcomes ────────────────────────────────────────────────────────────

/// Result of a successful insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    pub element_id: ElementId,
    pub slide_index: usize,
    /// The id was already present on the slide; nothing was changed.
    pub already_exists: bool,
}

/// What a position update did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionChange {
    Moved(GridSpan),
    /// The clamped span equals the current one.
    Unchanged,
    /// The element is locked; the request was ignored.
    Locked,
}

// ─── Z-index pools ───────────────────────────────────────────────────────

/// Two disjoint counters. The general pool is confined below the text base,
/// so every text box layers above every other element.
#[derive(Debug, Clone)]
struct ZCounters {
    general_next: i32,
    text_base: i32,
    text_next: i32,
}

impl ZCounters {
    fn new(general_base: i32, text_base: i32) -> Self {
        Self {
            general_next: general_base,
            text_base,
            text_next: text_base,
        }
    }

    fn range(&self, pool: ZPool) -> (i32, i32) {
        match pool {
            ZPool::General => (1, self.text_base - 1),
            ZPool::Text => (self.text_base, i32::MAX),
        }
    }

    fn allocate(&mut self, pool: ZPool) -> i32 {
        let (_, hi) = self.range(pool);
        let next = match pool {
            ZPool::General => &mut self.general_next,
            ZPool::Text => &mut self.text_next,
        };
        let z = *next;
        if z > hi {
            log::warn!("{pool:?} z pool saturated at {hi}");
            return hi;
        }
        *next = z.saturating_add(1);
        z
    }

    /// Advance the pool past `z` so later allocations land above it.
    fn observe(&mut self, pool: ZPool, z: i32) {
        let next = match pool {
            ZPool::General => &mut self.general_next,
            ZPool::Text => &mut self.text_next,
        };
        *next = (*next).max(z.saturating_add(1));
    }

    /// Bring an externally supplied z into its pool and observe it.
    fn adopt(&mut self, pool: ZPool, z: i32) -> i32 {
        let (lo, hi) = self.range(pool);
        let clamped = z.clamp(lo, hi);
        if clamped != z {
            log::warn!("z-index {z} outside the {pool:?} pool; using {clamped}");
        }
        self.observe(pool, clamped);
        clamped
    }
}

// ─── Registry ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
struct Slide {
    id: String,
    elements: HashMap<ElementId, ElementRecord>,
}

pub struct Registry {
    slides: Vec<Slide>,
    active_slide: usize,
    selection: Option<(usize, ElementId)>,
    z: ZCounters,
    surface: Box<dyn Surface>,
    bridge: NotificationBridge,
}

fn record_mut(
    slides: &mut [Slide],
    slide_index: usize,
    id: ElementId,
) -> Result<&mut ElementRecord> {
    slides
        .get_mut(slide_index)
        .ok_or(EngineError::SlideNotFound(slide_index))?
        .elements
        .get_mut(&id)
        .ok_or_else(|| EngineError::ElementNotFound(id.to_string()))
}

impl Registry {
    pub fn new(
        config: &EditorConfig,
        surface: impl Surface + 'static,
        bridge: NotificationBridge,
    ) -> Self {
        Self {
            slides: Vec::new(),
            active_slide: 0,
            selection: None,
            z: ZCounters::new(config.general_z_base, config.text_z_base),
            surface: Box::new(surface),
            bridge,
        }
    }

    // ─── Slides ──────────────────────────────────────────────────────────

    /// Append a slide surface and return its index.
    pub fn add_slide(&mut self, slide_id: impl Into<String>) -> usize {
        let index = self.slides.len();
        let id = slide_id.into();
        self.surface.mount_slide(index, &id);
        self.slides.push(Slide {
            id,
            elements: HashMap::new(),
        });
        log::debug!("slide {index} added");
        index
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slide_id(&self, slide_index: usize) -> Option<&str> {
        self.slides.get(slide_index).map(|s| s.id.as_str())
    }

    /// The currently visible slide. Paste targets it.
    pub fn active_slide(&self) -> usize {
        self.active_slide
    }

    /// Switch the visible slide. A selection on another slide is cleared.
    pub fn set_active_slide(&mut self, slide_index: usize) -> Result<()> {
        if slide_index >= self.slides.len() {
            return Err(EngineError::SlideNotFound(slide_index));
        }
        if self.active_slide != slide_index {
            if matches!(self.selection, Some((s, _)) if s != slide_index) {
                self.clear_selection();
            }
            self.active_slide = slide_index;
        }
        Ok(())
    }

    // ─── Insert ──────────────────────────────────────────────────────────

    /// Insert an element, or restore one when `config.id` is set.
    ///
    /// Restoring an id already present on the slide reports success with
    /// `already_exists` and touches nothing. Restores are silent; only new
    /// elements are announced.
    pub fn insert(
        &mut self,
        variant: Variant,
        slide_index: usize,
        config: InsertConfig,
    ) -> Result<InsertOutcome> {
        let slide = self
            .slides
            .get(slide_index)
            .ok_or(EngineError::SlideNotFound(slide_index))?;

        let restoring = config.id.is_some();
        let id = match config.id.as_deref() {
            Some(raw) => {
                let id = ElementId::intern(raw);
                if slide.elements.contains_key(&id) {
                    log::debug!("restore of {id:?} on slide {slide_index} skipped: already present");
                    return Ok(InsertOutcome {
                        element_id: id,
                        slide_index,
                        already_exists: true,
                    });
                }
                id
            }
            None => {
                let mut id = ElementId::generate(&slide.id, variant);
                while slide.elements.contains_key(&id) {
                    id = ElementId::generate(&slide.id, variant);
                }
                id
            }
        };

        let data = match config.payload {
            Some(payload) if payload.variant() != variant => {
                return Err(EngineError::PayloadMismatch {
                    variant,
                    payload: payload.variant(),
                });
            }
            Some(payload) => payload,
            None => Payload::placeholder(variant),
        };

        let pool = variant.z_pool();
        let z_index = match config.z_index {
            Some(z) => self.z.adopt(pool, z),
            None => self.z.allocate(pool),
        };

        let record = ElementRecord {
            id,
            variant,
            slide_index,
            position: config.position.resolve(variant),
            z_index,
            selected: false,
            locked: config.locked,
            visible: config.visible.unwrap_or(true),
            data,
        };

        self.surface.mount(&record);
        log::debug!(
            "{} {variant} {id:?} on slide {slide_index} at {} z={z_index}",
            if restoring { "restored" } else { "inserted" },
            record.position
        );
        if let Some(slide) = self.slides.get_mut(slide_index) {
            slide.elements.insert(id, record);
        }
        if !restoring {
            self.bridge
                .content_changed(slide_index, ChangeType::Add, variant);
        }

        Ok(InsertOutcome {
            element_id: id,
            slide_index,
            already_exists: false,
        })
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Slide holding `id`, checking the active slide first.
    pub fn locate(&self, id: ElementId) -> Result<usize> {
        if let Some(slide) = self.slides.get(self.active_slide)
            && slide.elements.contains_key(&id)
        {
            return Ok(self.active_slide);
        }
        self.slides
            .iter()
            .position(|s| s.elements.contains_key(&id))
            .ok_or_else(|| EngineError::ElementNotFound(id.to_string()))
    }

    pub fn get(&self, id: ElementId) -> Option<&ElementRecord> {
        let slide_index = self.locate(id).ok()?;
        self.get_on(slide_index, id)
    }

    pub fn get_on(&self, slide_index: usize, id: ElementId) -> Option<&ElementRecord> {
        self.slides.get(slide_index)?.elements.get(&id)
    }

    /// Records on a slide, back to front.
    pub fn elements_on(&self, slide_index: usize) -> Vec<&ElementRecord> {
        let Some(slide) = self.slides.get(slide_index) else {
            return Vec::new();
        };
        let mut records: Vec<_> = slide.elements.values().collect();
        records.sort_by(|a, b| {
            a.z_index
                .cmp(&b.z_index)
                .then_with(|| a.id.as_str().cmp(b.id.as_str()))
        });
        records
    }

    pub fn element_count(&self, slide_index: usize) -> usize {
        self.slides
            .get(slide_index)
            .map_or(0, |s| s.elements.len())
    }

    pub fn selected(&self) -> Option<&ElementRecord> {
        let (slide_index, id) = self.selection?;
        self.get_on(slide_index, id)
    }

    // ─── Position ────────────────────────────────────────────────────────

    /// Commit a new span. Clamped to the grid and the variant minimum;
    /// a locked element is left alone.
    pub fn update_position(&mut self, id: ElementId, span: GridSpan) -> Result<PositionChange> {
        let slide_index = self.locate(id)?;
        self.update_position_on(slide_index, id, span)
    }

    pub fn update_position_on(
        &mut self,
        slide_index: usize,
        id: ElementId,
        span: GridSpan,
    ) -> Result<PositionChange> {
        let record = record_mut(&mut self.slides, slide_index, id)?;
        if record.locked {
            log::debug!("ignoring move of locked {id:?}");
            return Ok(PositionChange::Locked);
        }
        let span = span.normalized(record.min_size());
        if span == record.position {
            return Ok(PositionChange::Unchanged);
        }
        record.position = span;
        self.surface.update(record);
        self.bridge
            .content_changed(slide_index, ChangeType::Modify, record.variant);
        log::debug!("moved {id:?} to {span}");
        Ok(PositionChange::Moved(span))
    }

    /// Translate by whole cells, stopping at the grid edges.
    pub fn nudge(&mut self, id: ElementId, d_cols: i32, d_rows: i32) -> Result<PositionChange> {
        let slide_index = self.locate(id)?;
        let record = record_mut(&mut self.slides, slide_index, id)?;
        if record.locked {
            return Ok(PositionChange::Locked);
        }
        let target = translate(
            record.position,
            GridDelta::new(d_cols, d_rows),
            record.min_size(),
        );
        self.update_position_on(slide_index, id, target)
    }

    /// Show `span` on the surface without touching the record.
    pub fn preview_position(&mut self, slide_index: usize, id: ElementId, span: GridSpan) {
        log::trace!("preview {id:?} at {span}");
        self.surface.preview(slide_index, id, span);
    }

    // ─── Delete ──────────────────────────────────────────────────────────

    /// Remove an element and its node. Z-index values are not reclaimed.
    pub fn delete(&mut self, id: ElementId) -> Result<ElementRecord> {
        let slide_index = self.locate(id)?;
        if self.selection == Some((slide_index, id)) {
            self.clear_selection();
        }
        let record = self
            .slides
            .get_mut(slide_index)
            .and_then(|s| s.elements.remove(&id))
            .ok_or_else(|| EngineError::ElementNotFound(id.to_string()))?;
        self.surface.unmount(slide_index, id);
        self.bridge
            .content_changed(slide_index, ChangeType::Delete, record.variant);
        log::debug!("deleted {id:?} from slide {slide_index}");
        Ok(record)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// Select `id`, deselecting the previous element first. Selecting the
    /// current selection again does nothing. Hidden elements are not
    /// selectable.
    pub fn select(&mut self, id: ElementId) -> Result<()> {
        let slide_index = self.locate(id)?;
        if self.selection == Some((slide_index, id)) {
            return Ok(());
        }
        if self.get_on(slide_index, id).is_some_and(|r| !r.visible) {
            log::debug!("ignoring select of hidden {id:?}");
            return Ok(());
        }
        self.clear_selection();

        let record = record_mut(&mut self.slides, slide_index, id)?;
        record.selected = true;
        self.selection = Some((slide_index, id));
        self.surface.update(record);
        self.bridge.selected(record);
        Ok(())
    }

    pub fn deselect_all(&mut self) {
        self.clear_selection();
    }

    /// Drop the current selection, emitting its deselection. Returns whether
    /// anything was selected.
    fn clear_selection(&mut self) -> bool {
        let Some((slide_index, id)) = self.selection.take() else {
            return false;
        };
        match record_mut(&mut self.slides, slide_index, id) {
            Ok(record) => {
                record.selected = false;
                self.surface.update(record);
                self.bridge.deselected(record);
                true
            }
            Err(_) => false,
        }
    }

    // ─── Z-order ─────────────────────────────────────────────────────────

    /// Move above every other element of the same pool on the slide.
    pub fn bring_to_front(&mut self, id: ElementId) -> Result<i32> {
        self.restack(id, true)
    }

    /// Move below every other element of the same pool on the slide.
    pub fn send_to_back(&mut self, id: ElementId) -> Result<i32> {
        self.restack(id, false)
    }

    fn restack(&mut self, id: ElementId, to_front: bool) -> Result<i32> {
        let slide_index = self.locate(id)?;
        let Some(record) = self.get_on(slide_index, id) else {
            return Err(EngineError::ElementNotFound(id.to_string()));
        };
        let pool = record.variant.z_pool();
        let current = record.z_index;
        let others: Vec<(ElementId, i32)> = self.slides[slide_index]
            .elements
            .values()
            .filter(|r| r.id != id && r.variant.z_pool() == pool)
            .map(|r| (r.id, r.z_index))
            .collect();
        let (Some(low), Some(high)) = (
            others.iter().map(|&(_, z)| z).min(),
            others.iter().map(|&(_, z)| z).max(),
        ) else {
            return Ok(current);
        };

        let target = match to_front {
            true if current <= high => high.saturating_add(1),
            false if current >= low => low.saturating_sub(1),
            _ => return Ok(current),
        };
        // At a pool edge the rest of the pool steps one away from it.
        let (lo, hi) = self.z.range(pool);
        let (z_index, shift) = if target > hi {
            (hi, if low > lo { -1 } else { 0 })
        } else if target < lo {
            (lo, if high < hi { 1 } else { 0 })
        } else {
            (target, 0)
        };
        if z_index != target && shift == 0 {
            log::warn!("{pool:?} z pool saturated; {id:?} stays at {z_index}");
        }
        if z_index == current && shift == 0 {
            return Ok(current);
        }

        if shift != 0 {
            log::debug!("renumbering {} {pool:?} elements by {shift}", others.len());
            for &(other, z) in &others {
                self.modify(slide_index, other, |r| {
                    r.z_index = z + shift;
                    Ok(true)
                })?;
            }
            self.z.observe(pool, high + shift);
        }
        self.z.observe(pool, z_index);
        self.modify(slide_index, id, |r| {
            let changed = r.z_index != z_index;
            r.z_index = z_index;
            Ok(changed)
        })?;
        Ok(z_index)
    }

    // ─── Flags & content ─────────────────────────────────────────────────

    pub fn set_locked(&mut self, id: ElementId, locked: bool) -> Result<()> {
        let slide_index = self.locate(id)?;
        self.modify(slide_index, id, |r| {
            let changed = r.locked != locked;
            r.locked = locked;
            Ok(changed)
        })?;
        Ok(())
    }

    /// Show or hide. Hiding the selected element deselects it.
    pub fn set_visible(&mut self, id: ElementId, visible: bool) -> Result<()> {
        let slide_index = self.locate(id)?;
        if !visible && self.selection == Some((slide_index, id)) {
            self.clear_selection();
        }
        self.modify(slide_index, id, |r| {
            let changed = r.visible != visible;
            r.visible = visible;
            Ok(changed)
        })?;
        Ok(())
    }

    pub fn update_text_style(&mut self, id: ElementId, style: TextStyle) -> Result<()> {
        let slide_index = self.locate(id)?;
        self.modify(slide_index, id, |r| match &mut r.data {
            Payload::TextBox(text) => {
                let changed = text.style != style;
                text.style = style;
                Ok(changed)
            }
            _ => Err(EngineError::Unsupported {
                operation: "update_text_style",
                variant: r.variant,
            }),
        })?;
        Ok(())
    }

    /// Fill in an element's content. There is no way back to placeholder.
    pub fn update_content(&mut self, id: ElementId, update: ContentUpdate) -> Result<()> {
        let slide_index = self.locate(id)?;
        self.modify(slide_index, id, |r| {
            r.data.apply_content(update)?;
            Ok(true)
        })?;
        Ok(())
    }

    pub fn update_text_box_content(&mut self, id: ElementId, html: impl Into<String>) -> Result<()> {
        self.update_content(id, ContentUpdate::TextBox(html.into()))
    }

    pub fn update_image_content(&mut self, id: ElementId, image: ImageContent) -> Result<()> {
        self.update_content(id, ContentUpdate::Image(image))
    }

    pub fn update_table_content(&mut self, id: ElementId, table: TableContent) -> Result<()> {
        self.update_content(id, ContentUpdate::Table(table))
    }

    pub fn update_chart_content(&mut self, id: ElementId, chart: serde_json::Value) -> Result<()> {
        self.update_content(id, ContentUpdate::Chart(chart))
    }

    pub fn update_shape_content(&mut self, id: ElementId, shape: ShapeContent) -> Result<()> {
        self.update_content(id, ContentUpdate::Shape(shape))
    }

    pub fn update_diagram_content(&mut self, id: ElementId, diagram: serde_json::Value) -> Result<()> {
        self.update_content(id, ContentUpdate::Diagram(diagram))
    }

    pub fn update_infographic_content(
        &mut self,
        id: ElementId,
        infographic: serde_json::Value,
    ) -> Result<()> {
        self.update_content(id, ContentUpdate::Infographic(infographic))
    }

    pub fn update_content_block(&mut self, id: ElementId, content: serde_json::Value) -> Result<()> {
        self.update_content(id, ContentUpdate::Content(content))
    }

    /// Apply `change` to a record. When it reports a change the node is
    /// re-projected and the change is announced.
    fn modify<F>(&mut self, slide_index: usize, id: ElementId, change: F) -> Result<bool>
    where
        F: FnOnce(&mut ElementRecord) -> Result<bool>,
    {
        let record = record_mut(&mut self.slides, slide_index, id)?;
        if !change(record)? {
            return Ok(false);
        }
        self.surface.update(record);
        self.bridge
            .content_changed(slide_index, ChangeType::Modify, record.variant);
        log::debug!("modified {id:?} on slide {slide_index}");
        Ok(true)
    }
}
