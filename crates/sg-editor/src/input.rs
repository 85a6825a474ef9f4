//! Input abstraction layer.
//!
//! Normalizes mouse, touch, and pen events into a unified `InputEvent`
//! consumed by the interaction controller. Touch is treated exactly like a
//! primary pointer: the first touch point drives the gesture.

/// Which device produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerKind {
    #[default]
    Mouse,
    Touch,
    Pen,
}

impl PointerKind {
    /// Map a DOM `PointerEvent.pointerType`.
    pub fn from_dom(pointer_type: &str) -> Self {
        match pointer_type {
            "touch" => Self::Touch,
            "pen" => Self::Pen,
            _ => Self::Mouse,
        }
    }

    /// Handle hit radius for this device. A fingertip covers about twice
    /// what a cursor does.
    pub fn handle_tolerance(self, base: f32) -> f32 {
        match self {
            Self::Touch => base * 2.0,
            Self::Mouse | Self::Pen => base,
        }
    }
}

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };
}

/// A normalized input event. Coordinates are pixels relative to the slide
/// surface's top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Pointer pressed (mouse down, touch start, pen contact).
    PointerDown {
        x: f32,
        y: f32,
        pointer: PointerKind,
        /// The press landed on an input, editable region, canvas, or button
        /// inside an element. Such presses never start a drag.
        on_interactive_child: bool,
    },

    /// Pointer moved while pressed.
    PointerMove { x: f32, y: f32, pointer: PointerKind },

    /// Pointer released.
    PointerUp { x: f32, y: f32, pointer: PointerKind },

    /// Pointer capture lost (window blur, touch cancel).
    PointerCancel,

    /// Key pressed.
    Key { key: String, modifiers: Modifiers },
}

impl InputEvent {
    pub fn pointer_down(x: f32, y: f32) -> Self {
        Self::PointerDown {
            x,
            y,
            pointer: PointerKind::Mouse,
            on_interactive_child: false,
        }
    }

    pub fn pointer_move(x: f32, y: f32) -> Self {
        Self::PointerMove {
            x,
            y,
            pointer: PointerKind::Mouse,
        }
    }

    pub fn pointer_up(x: f32, y: f32) -> Self {
        Self::PointerUp {
            x,
            y,
            pointer: PointerKind::Mouse,
        }
    }

    /// First touch point of a `touchstart`.
    pub fn touch_start(touches: &[(f32, f32)]) -> Option<Self> {
        let &(x, y) = touches.first()?;
        Some(Self::PointerDown {
            x,
            y,
            pointer: PointerKind::Touch,
            on_interactive_child: false,
        })
    }

    pub fn touch_move(touches: &[(f32, f32)]) -> Option<Self> {
        let &(x, y) = touches.first()?;
        Some(Self::PointerMove {
            x,
            y,
            pointer: PointerKind::Touch,
        })
    }

    /// `touchend` carries the lifted points in `changedTouches`. With none
    /// left there is nothing to commit, so the gesture is cancelled.
    pub fn touch_end(changed: &[(f32, f32)]) -> Self {
        match changed.first() {
            Some(&(x, y)) => Self::PointerUp {
                x,
                y,
                pointer: PointerKind::Touch,
            },
            None => Self::PointerCancel,
        }
    }

    pub fn key(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self::Key {
            key: key.into(),
            modifiers,
        }
    }

    /// Extract position if this is a positioned pointer event.
    pub fn position(&self) -> Option<(f32, f32)> {
        match self {
            Self::PointerDown { x, y, .. }
            | Self::PointerMove { x, y, .. }
            | Self::PointerUp { x, y, .. } => Some((*x, *y)),
            _ => None,
        }
    }
}
