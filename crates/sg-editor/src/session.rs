//! Interaction controller: the drag / resize session state machine.
//!
//! At most one session exists at a time. Moves only preview on the surface;
//! the registry sees a single commit when the session ends, and nothing at
//! all when it is cancelled.

use crate::registry::{PositionChange, Registry};
use sg_core::error::Result;
use sg_core::geometry::{ResizeHandle, Viewport, pixel_delta_to_grid_delta, resize_for_handle, translate};
use sg_core::grid::{GridSpan, MinSize};
use sg_core::id::ElementId;
use sg_render::hit::HitTarget;

/// One pointer gesture on one element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gesture {
    pub id: ElementId,
    pub slide_index: usize,
    /// Pointer position at press.
    pub origin: (f32, f32),
    /// Span at press. Every move is computed from here, not incrementally.
    pub start: GridSpan,
    /// Span last previewed.
    pub current: GridSpan,
    pub min: MinSize,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Session {
    #[default]
    Idle,
    Dragging(Gesture),
    Resizing {
        gesture: Gesture,
        handle: ResizeHandle,
    },
}

impl Session {
    pub fn gesture(&self) -> Option<&Gesture> {
        match self {
            Self::Idle => None,
            Self::Dragging(gesture) | Self::Resizing { gesture, .. } => Some(gesture),
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// How a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// There was no session to end.
    NoSession,
    /// The pointer came back to the starting span.
    Unchanged,
    Committed(GridSpan),
    /// The element was locked while the gesture ran.
    Locked,
    /// Cancelled; the preview was reverted.
    Aborted,
}

#[derive(Debug, Clone)]
pub struct InteractionController {
    session: Session,
    editable: bool,
    viewport: Viewport,
}

impl InteractionController {
    pub fn new(viewport: Viewport, editable: bool) -> Self {
        Self {
            session: Session::Idle,
            editable,
            viewport,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn is_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn editable(&self) -> bool {
        self.editable
    }

    pub fn set_editable(&mut self, editable: bool) {
        self.editable = editable;
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The surface was resized. Cell size follows on the next move.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Pointer pressed on `target`. Selects what was hit and, when allowed,
    /// starts a session. Returns whether a session started.
    pub fn begin(
        &mut self,
        registry: &mut Registry,
        target: HitTarget,
        x: f32,
        y: f32,
        on_interactive_child: bool,
    ) -> Result<bool> {
        if self.session.is_active() {
            return Ok(false);
        }
        let (id, handle) = match target {
            HitTarget::Background => {
                registry.deselect_all();
                return Ok(false);
            }
            HitTarget::Element(id) => (id, None),
            HitTarget::Handle(id, handle) => (id, Some(handle)),
        };

        registry.select(id)?;
        if !self.editable || (handle.is_none() && on_interactive_child) {
            return Ok(false);
        }
        let slide_index = registry.locate(id)?;
        let Some(record) = registry.get_on(slide_index, id) else {
            return Ok(false);
        };
        if record.locked || !record.visible {
            return Ok(false);
        }

        let gesture = Gesture {
            id,
            slide_index,
            origin: (x, y),
            start: record.position,
            current: record.position,
            min: record.min_size(),
        };
        self.session = match handle {
            Some(handle) => Session::Resizing { gesture, handle },
            None => Session::Dragging(gesture),
        };
        log::debug!("session started on {id:?}: {:?}", self.session);
        Ok(true)
    }

    /// Pointer moved. Previews the new span when it differs from the last
    /// one and returns it.
    pub fn update(&mut self, registry: &mut Registry, x: f32, y: f32) -> Option<GridSpan> {
        let viewport = self.viewport;
        let (gesture, next) = match &mut self.session {
            Session::Idle => return None,
            Session::Dragging(gesture) => {
                let delta = pixel_delta_to_grid_delta(x - gesture.origin.0, y - gesture.origin.1, viewport);
                let next = translate(gesture.start, delta, gesture.min);
                (gesture, next)
            }
            Session::Resizing { gesture, handle } => {
                let delta = pixel_delta_to_grid_delta(x - gesture.origin.0, y - gesture.origin.1, viewport);
                let next = resize_for_handle(*handle, gesture.start, delta, gesture.min);
                (gesture, next)
            }
        };
        if next == gesture.current {
            return None;
        }
        gesture.current = next;
        registry.preview_position(gesture.slide_index, gesture.id, next);
        Some(next)
    }

    /// Pointer released. Commits the final span once.
    pub fn end(&mut self, registry: &mut Registry, x: f32, y: f32) -> Result<SessionEnd> {
        self.update(registry, x, y);
        let Some(gesture) = self.session.gesture().copied() else {
            return Ok(SessionEnd::NoSession);
        };
        self.session = Session::Idle;

        if gesture.current == gesture.start {
            return Ok(SessionEnd::Unchanged);
        }
        match registry.update_position_on(gesture.slide_index, gesture.id, gesture.current)? {
            PositionChange::Moved(span) => Ok(SessionEnd::Committed(span)),
            PositionChange::Unchanged => Ok(SessionEnd::Unchanged),
            PositionChange::Locked => {
                registry.preview_position(gesture.slide_index, gesture.id, gesture.start);
                Ok(SessionEnd::Locked)
            }
        }
    }

    /// Pointer capture lost. Reverts the preview and commits nothing.
    pub fn cancel(&mut self, registry: &mut Registry) -> SessionEnd {
        let Some(gesture) = self.session.gesture().copied() else {
            return SessionEnd::NoSession;
        };
        self.session = Session::Idle;
        if gesture.current != gesture.start {
            registry.preview_position(gesture.slide_index, gesture.id, gesture.start);
        }
        log::debug!("session on {:?} aborted", gesture.id);
        SessionEnd::Aborted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{BridgeEvent, NotificationBridge};
    use pretty_assertions::assert_eq;
    use sg_core::config::EditorConfig;
    use sg_core::model::{InsertConfig, Variant};
    use sg_render::surface::MemorySurface;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::mpsc::{self, Receiver};

    fn setup() -> (Registry, Rc<RefCell<MemorySurface>>, Receiver<BridgeEvent>) {
        let surface = Rc::new(RefCell::new(MemorySurface::new()));
        let (tx, rx) = mpsc::channel();
        let mut registry = Registry::new(
            &EditorConfig::default(),
            surface.clone(),
            NotificationBridge::new(tx),
        );
        registry.add_slide("s");
        (registry, surface, rx)
    }

    fn controller() -> InteractionController {
        InteractionController::new(Viewport::default(), true)
    }

    #[test]
    fn moves_preview_without_committing() {
        let (mut registry, surface, rx) = setup();
        let id = registry
            .insert(Variant::Shape, 0, InsertConfig::at(GridSpan::new(2, 4, 2, 4)))
            .unwrap()
            .element_id;
        let mut ctl = controller();

        assert!(ctl.begin(&mut registry, HitTarget::Element(id), 100.0, 100.0, false).unwrap());
        rx.try_iter().count();

        assert_eq!(ctl.update(&mut registry, 160.0, 100.0), Some(GridSpan::new(2, 4, 3, 5)));
        // Same cell: no new preview.
        assert_eq!(ctl.update(&mut registry, 170.0, 100.0), None);
        assert_eq!(ctl.update(&mut registry, 220.0, 100.0), Some(GridSpan::new(2, 4, 4, 6)));

        assert_eq!(registry.get(id).unwrap().position, GridSpan::new(2, 4, 2, 4));
        assert_eq!(surface.borrow().node(0, id).unwrap().shown, GridSpan::new(2, 4, 4, 6));
        assert_eq!(rx.try_iter().count(), 0);

        let end = ctl.end(&mut registry, 220.0, 100.0).unwrap();
        assert_eq!(end, SessionEnd::Committed(GridSpan::new(2, 4, 4, 6)));
        assert_eq!(rx.try_iter().count(), 1);
        assert!(!ctl.is_active());
    }

    #[test]
    fn release_at_origin_commits_nothing() {
        let (mut registry, _surface, rx) = setup();
        let id = registry.insert(Variant::Shape, 0, InsertConfig::default()).unwrap().element_id;
        let mut ctl = controller();
        ctl.begin(&mut registry, HitTarget::Element(id), 800.0, 500.0, false).unwrap();
        ctl.update(&mut registry, 900.0, 500.0);
        rx.try_iter().count();
        assert_eq!(ctl.end(&mut registry, 801.0, 499.0).unwrap(), SessionEnd::Unchanged);
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn second_press_during_session_is_ignored() {
        let (mut registry, _surface, _rx) = setup();
        let a = registry.insert(Variant::Shape, 0, InsertConfig::default()).unwrap().element_id;
        let b = registry.insert(Variant::Image, 0, InsertConfig::default()).unwrap().element_id;
        let mut ctl = controller();
        assert!(ctl.begin(&mut registry, HitTarget::Element(a), 0.0, 0.0, false).unwrap());
        assert!(!ctl.begin(&mut registry, HitTarget::Element(b), 0.0, 0.0, false).unwrap());
        assert_eq!(ctl.session().gesture().unwrap().id, a);
        assert_eq!(registry.selected().unwrap().id, a);
    }

    #[test]
    fn locked_element_selects_without_session() {
        let (mut registry, _surface, _rx) = setup();
        let id = registry
            .insert(Variant::Image, 0, InsertConfig { locked: true, ..InsertConfig::default() })
            .unwrap()
            .element_id;
        let mut ctl = controller();
        assert!(!ctl.begin(&mut registry, HitTarget::Element(id), 0.0, 0.0, false).unwrap());
        assert_eq!(registry.selected().unwrap().id, id);
    }

    #[test]
    fn interactive_child_and_read_only_start_no_session() {
        let (mut registry, _surface, _rx) = setup();
        let id = registry.insert(Variant::TextBox, 0, InsertConfig::default()).unwrap().element_id;
        let mut ctl = controller();
        assert!(!ctl.begin(&mut registry, HitTarget::Element(id), 0.0, 0.0, true).unwrap());

        ctl.set_editable(false);
        assert!(!ctl.begin(&mut registry, HitTarget::Element(id), 0.0, 0.0, false).unwrap());
        assert!(!ctl.begin(&mut registry, HitTarget::Handle(id, ResizeHandle::Se), 0.0, 0.0, false).unwrap());
    }

    #[test]
    fn background_press_deselects() {
        let (mut registry, _surface, _rx) = setup();
        let id = registry.insert(Variant::Shape, 0, InsertConfig::default()).unwrap().element_id;
        registry.select(id).unwrap();
        let mut ctl = controller();
        assert!(!ctl.begin(&mut registry, HitTarget::Background, 5.0, 5.0, false).unwrap());
        assert!(registry.selected().is_none());
    }

    #[test]
    fn cancel_reverts_preview() {
        let (mut registry, surface, _rx) = setup();
        let start = GridSpan::new(4, 8, 5, 29);
        let id = registry.insert(Variant::TextBox, 0, InsertConfig::at(start)).unwrap().element_id;
        let mut ctl = controller();
        ctl.begin(&mut registry, HitTarget::Handle(id, ResizeHandle::E), 1680.0, 300.0, false)
            .unwrap();
        ctl.update(&mut registry, 1500.0, 300.0);
        assert_ne!(surface.borrow().node(0, id).unwrap().shown, start);

        assert_eq!(ctl.cancel(&mut registry), SessionEnd::Aborted);
        assert_eq!(surface.borrow().node(0, id).unwrap().shown, start);
        assert_eq!(registry.get(id).unwrap().position, start);
        assert_eq!(ctl.cancel(&mut registry), SessionEnd::NoSession);
    }

    #[test]
    fn lock_during_session_reverts_on_release() {
        let (mut registry, surface, _rx) = setup();
        let start = GridSpan::new(2, 4, 2, 4);
        let id = registry.insert(Variant::Shape, 0, InsertConfig::at(start)).unwrap().element_id;
        let mut ctl = controller();
        ctl.begin(&mut registry, HitTarget::Element(id), 100.0, 100.0, false).unwrap();
        ctl.update(&mut registry, 400.0, 100.0);
        registry.set_locked(id, true).unwrap();
        assert_eq!(ctl.end(&mut registry, 400.0, 100.0).unwrap(), SessionEnd::Locked);
        assert_eq!(surface.borrow().node(0, id).unwrap().shown, start);
    }

    #[test]
    fn drag_granularity_follows_viewport_scale() {
        let (mut registry, _surface, _rx) = setup();
        let id = registry
            .insert(Variant::Shape, 0, InsertConfig::at(GridSpan::new(2, 4, 2, 4)))
            .unwrap()
            .element_id;
        let mut ctl = controller();
        ctl.set_viewport(Viewport {
            width: 960.0,
            height: 540.0,
        });
        ctl.begin(&mut registry, HitTarget::Element(id), 50.0, 50.0, false).unwrap();
        // 30 px cells at half scale.
        let end = ctl.end(&mut registry, 110.0, 80.0).unwrap();
        assert_eq!(end, SessionEnd::Committed(GridSpan::new(3, 5, 4, 6)));
    }
}
