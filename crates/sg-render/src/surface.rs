//! Presentation surfaces.
//!
//! The registry drives a `Surface` so that each live record has exactly one
//! presentation node: `mount` on insert, `update` after every committed
//! change, `unmount` on delete. `preview` repositions a node during a gesture
//! without touching the record.

use crate::project::{NodeProjection, project, span_declarations};
use sg_core::grid::GridSpan;
use sg_core::id::ElementId;
use sg_core::model::ElementRecord;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub trait Surface {
    /// A slide container now exists at `slide_index`.
    fn mount_slide(&mut self, slide_index: usize, slide_id: &str);

    /// Create the node for a new record.
    fn mount(&mut self, record: &ElementRecord);

    /// Re-project an existing record.
    fn update(&mut self, record: &ElementRecord);

    /// Show `span` for a node without committing it.
    fn preview(&mut self, slide_index: usize, id: ElementId, span: GridSpan);

    /// Remove the node for a deleted record.
    fn unmount(&mut self, slide_index: usize, id: ElementId);
}

impl<S: Surface> Surface for Rc<RefCell<S>> {
    fn mount_slide(&mut self, slide_index: usize, slide_id: &str) {
        self.borrow_mut().mount_slide(slide_index, slide_id);
    }

    fn mount(&mut self, record: &ElementRecord) {
        self.borrow_mut().mount(record);
    }

    fn update(&mut self, record: &ElementRecord) {
        self.borrow_mut().update(record);
    }

    fn preview(&mut self, slide_index: usize, id: ElementId, span: GridSpan) {
        self.borrow_mut().preview(slide_index, id, span);
    }

    fn unmount(&mut self, slide_index: usize, id: ElementId) {
        self.borrow_mut().unmount(slide_index, id);
    }
}

/// A node held by [`MemorySurface`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryNode {
    pub projection: NodeProjection,
    /// Span currently shown; differs from the record during a gesture.
    pub shown: GridSpan,
}

/// Headless surface. Used by tests and by hosts that render elsewhere.
#[derive(Debug, Default)]
pub struct MemorySurface {
    slides: Vec<String>,
    nodes: HashMap<(usize, ElementId), MemoryNode>,
    /// Mount calls that found a node already present.
    pub duplicate_mounts: usize,
    /// Update/preview/unmount calls that found no node.
    pub orphan_calls: usize,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn slide_ids(&self) -> &[String] {
        &self.slides
    }

    pub fn node(&self, slide_index: usize, id: ElementId) -> Option<&MemoryNode> {
        self.nodes.get(&(slide_index, id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn nodes_on(&self, slide_index: usize) -> usize {
        self.nodes.keys().filter(|(s, _)| *s == slide_index).count()
    }
}

impl Surface for MemorySurface {
    fn mount_slide(&mut self, slide_index: usize, slide_id: &str) {
        if slide_index >= self.slides.len() {
            self.slides.resize(slide_index + 1, String::new());
        }
        self.slides[slide_index] = slide_id.to_string();
    }

    fn mount(&mut self, record: &ElementRecord) {
        let key = (record.slide_index, record.id);
        if self.nodes.contains_key(&key) {
            log::warn!("duplicate mount of {:?} on slide {}", record.id, record.slide_index);
            self.duplicate_mounts += 1;
        }
        self.nodes.insert(
            key,
            MemoryNode {
                projection: project(record),
                shown: record.position,
            },
        );
    }

    fn update(&mut self, record: &ElementRecord) {
        match self.nodes.get_mut(&(record.slide_index, record.id)) {
            Some(node) => {
                node.projection = project(record);
                node.shown = record.position;
            }
            None => self.orphan_calls += 1,
        }
    }

    fn preview(&mut self, slide_index: usize, id: ElementId, span: GridSpan) {
        match self.nodes.get_mut(&(slide_index, id)) {
            Some(node) => {
                node.shown = span;
                for (property, value) in span_declarations(&span) {
                    if let Some(slot) = node
                        .projection
                        .declarations
                        .iter_mut()
                        .find(|(p, _)| *p == property)
                    {
                        slot.1 = value;
                    }
                }
            }
            None => self.orphan_calls += 1,
        }
    }

    fn unmount(&mut self, slide_index: usize, id: ElementId) {
        if self.nodes.remove(&(slide_index, id)).is_none() {
            log::warn!("unmount of unknown node {id:?} on slide {slide_index}");
            self.orphan_calls += 1;
        }
    }
}
