//! Editor facade: routes normalized input to the controller, the registry,
//! and the clipboard.

use crate::clipboard::Clipboard;
use crate::input::{InputEvent, PointerKind};
use crate::notify::NotificationBridge;
use crate::registry::Registry;
use crate::session::{InteractionController, SessionEnd};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use sg_core::config::EditorConfig;
use sg_core::error::{EngineError, Result};
use sg_core::geometry::Viewport;
use sg_core::grid::GridSpan;
use sg_render::hit::{HitTarget, hit_target};
use sg_render::surface::Surface;

/// What an input event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    Ignored,
    /// Pointer pressed; `session` tells whether a drag/resize began.
    Pressed { target: HitTarget, session: bool },
    /// A session previewed a new span.
    Previewed(GridSpan),
    Released(SessionEnd),
    Shortcut(ShortcutAction),
}

pub struct Editor {
    registry: Registry,
    controller: InteractionController,
    clipboard: Clipboard,
    config: EditorConfig,
}

impl Editor {
    pub fn new(
        config: EditorConfig,
        surface: impl Surface + 'static,
        bridge: NotificationBridge,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            registry: Registry::new(&config, surface, bridge),
            controller: InteractionController::new(config.viewport(), config.editable),
            clipboard: Clipboard::new(config.paste_offset),
            config,
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn controller(&self) -> &InteractionController {
        &self.controller
    }

    pub fn clipboard(&self) -> &Clipboard {
        &self.clipboard
    }

    pub fn clipboard_mut(&mut self) -> &mut Clipboard {
        &mut self.clipboard
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn editable(&self) -> bool {
        self.controller.editable()
    }

    /// Leaving editable mode aborts any running session.
    pub fn set_editable(&mut self, editable: bool) {
        if !editable {
            self.controller.cancel(&mut self.registry);
        }
        self.controller.set_editable(editable);
    }

    /// The surface was resized on screen. Empty or non-finite sizes are
    /// rejected and the previous viewport stays.
    pub fn resize_viewport(&mut self, width: f32, height: f32) -> Result<()> {
        let viewport = Viewport { width, height };
        if !viewport.is_usable() {
            return Err(EngineError::InvalidConfig(format!(
                "viewport must be non-empty, got {width}x{height}"
            )));
        }
        self.controller.set_viewport(viewport);
        Ok(())
    }

    /// What lies under a point on the active slide.
    pub fn hit(&self, x: f32, y: f32) -> HitTarget {
        self.hit_with(x, y, PointerKind::Mouse)
    }

    /// Like `hit`, with the handle radius widened for touch.
    pub fn hit_with(&self, x: f32, y: f32, pointer: PointerKind) -> HitTarget {
        let active = self.registry.active_slide();
        let selected = self
            .registry
            .selected()
            .filter(|r| r.slide_index == active);
        hit_target(
            self.registry.elements_on(active),
            selected,
            self.controller.viewport(),
            x,
            y,
            pointer.handle_tolerance(self.config.handle_tolerance),
        )
    }

    pub fn handle(&mut self, event: &InputEvent) -> Result<Response> {
        match event {
            InputEvent::PointerDown {
                x,
                y,
                pointer,
                on_interactive_child,
            } => {
                let target = self.hit_with(*x, *y, *pointer);
                let session =
                    self.controller
                        .begin(&mut self.registry, target, *x, *y, *on_interactive_child)?;
                Ok(Response::Pressed { target, session })
            }
            InputEvent::PointerMove { x, y, .. } => Ok(self
                .controller
                .update(&mut self.registry, *x, *y)
                .map_or(Response::Ignored, Response::Previewed)),
            InputEvent::PointerUp { x, y, .. } => {
                let end = self.controller.end(&mut self.registry, *x, *y)?;
                Ok(Response::Released(end))
            }
            InputEvent::PointerCancel => Ok(Response::Released(
                self.controller.cancel(&mut self.registry),
            )),
            InputEvent::Key { key, modifiers } => {
                let Some(action) = ShortcutMap::resolve(
                    key,
                    modifiers.ctrl,
                    modifiers.shift,
                    modifiers.alt,
                    modifiers.meta,
                ) else {
                    return Ok(Response::Ignored);
                };
                if self.dispatch(action)? {
                    Ok(Response::Shortcut(action))
                } else {
                    Ok(Response::Ignored)
                }
            }
        }
    }

    /// Run a shortcut action on the current selection. Returns whether it
    /// ran: actions are ignored during a session, mutations are ignored
    /// outside editable mode, and selection-bound actions need a selection.
    pub fn dispatch(&mut self, action: ShortcutAction) -> Result<bool> {
        if self.controller.is_active() {
            return Ok(false);
        }
        let read_only = matches!(action, ShortcutAction::Copy | ShortcutAction::Deselect);
        if !self.controller.editable() && !read_only {
            return Ok(false);
        }

        let selected = self.registry.selected().map(|r| r.id);
        match action {
            ShortcutAction::Deselect => {
                self.registry.deselect_all();
                Ok(true)
            }
            ShortcutAction::Copy => {
                self.clipboard.copy(&self.registry)?;
                Ok(true)
            }
            ShortcutAction::Cut => {
                self.clipboard.cut(&mut self.registry)?;
                Ok(true)
            }
            ShortcutAction::Paste => {
                self.clipboard.paste(&mut self.registry)?;
                Ok(true)
            }
            ShortcutAction::Delete => {
                let Some(id) = selected else { return Ok(false) };
                self.registry.delete(id)?;
                Ok(true)
            }
            ShortcutAction::BringToFront => {
                let Some(id) = selected else { return Ok(false) };
                self.registry.bring_to_front(id)?;
                Ok(true)
            }
            ShortcutAction::SendToBack => {
                let Some(id) = selected else { return Ok(false) };
                self.registry.send_to_back(id)?;
                Ok(true)
            }
            ShortcutAction::NudgeLeft
            | ShortcutAction::NudgeRight
            | ShortcutAction::NudgeUp
            | ShortcutAction::NudgeDown => {
                let (Some(id), Some((dc, dr))) = (selected, action.nudge_delta()) else {
                    return Ok(false);
                };
                let step = self.config.nudge_step;
                self.registry.nudge(id, dc * step, dr * step)?;
                Ok(true)
            }
        }
    }
}
