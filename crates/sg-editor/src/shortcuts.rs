//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s. The map lives in
//! Rust so the browser bridge and native hosts share one table.

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Nudge (one grid cell) ──
    NudgeLeft,
    NudgeRight,
    NudgeUp,
    NudgeDown,

    // ── Edit ──
    Delete,
    Copy,
    Cut,
    Paste,

    // ── Z-order ──
    BringToFront,
    SendToBack,

    // ── Selection ──
    Deselect,
}

impl ShortcutAction {
    /// Grid delta `(cols, rows)` for nudge actions.
    pub fn nudge_delta(self) -> Option<(i32, i32)> {
        match self {
            Self::NudgeLeft => Some((-1, 0)),
            Self::NudgeRight => Some((1, 0)),
            Self::NudgeUp => Some((0, -1)),
            Self::NudgeDown => Some((0, 1)),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::NudgeLeft => "nudgeLeft",
            Self::NudgeRight => "nudgeRight",
            Self::NudgeUp => "nudgeUp",
            Self::NudgeDown => "nudgeDown",
            Self::Delete => "delete",
            Self::Copy => "copy",
            Self::Cut => "cut",
            Self::Paste => "paste",
            Self::BringToFront => "bringToFront",
            Self::SendToBack => "sendToBack",
            Self::Deselect => "deselect",
        }
    }
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"c"`, `"ArrowLeft"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(
        key: &str,
        ctrl: bool,
        shift: bool,
        _alt: bool,
        meta: bool,
    ) -> Option<ShortcutAction> {
        let cmd = ctrl || meta;

        if cmd && shift {
            return match key {
                "]" | "}" => Some(ShortcutAction::BringToFront),
                "[" | "{" => Some(ShortcutAction::SendToBack),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "c" | "C" => Some(ShortcutAction::Copy),
                "x" | "X" => Some(ShortcutAction::Cut),
                "v" | "V" => Some(ShortcutAction::Paste),
                _ => None,
            };
        }

        if shift {
            return None;
        }

        match key {
            "ArrowLeft" => Some(ShortcutAction::NudgeLeft),
            "ArrowRight" => Some(ShortcutAction::NudgeRight),
            "ArrowUp" => Some(ShortcutAction::NudgeUp),
            "ArrowDown" => Some(ShortcutAction::NudgeDown),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_arrows() {
        assert_eq!(
            ShortcutMap::resolve("ArrowLeft", false, false, false, false),
            Some(ShortcutAction::NudgeLeft)
        );
        assert_eq!(
            ShortcutMap::resolve("ArrowDown", false, false, false, false),
            Some(ShortcutAction::NudgeDown)
        );
        assert_eq!(ShortcutAction::NudgeUp.nudge_delta(), Some((0, -1)));
        assert_eq!(ShortcutAction::Copy.nudge_delta(), None);
    }

    #[test]
    fn resolve_delete() {
        assert_eq!(
            ShortcutMap::resolve("Delete", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
        assert_eq!(
            ShortcutMap::resolve("Backspace", false, false, false, false),
            Some(ShortcutAction::Delete)
        );
    }

    #[test]
    fn resolve_clipboard() {
        assert_eq!(
            ShortcutMap::resolve("c", false, false, false, true),
            Some(ShortcutAction::Copy)
        );
        assert_eq!(
            ShortcutMap::resolve("x", true, false, false, false),
            Some(ShortcutAction::Cut)
        );
        assert_eq!(
            ShortcutMap::resolve("v", false, false, false, true),
            Some(ShortcutAction::Paste)
        );
    }

    #[test]
    fn resolve_z_order() {
        assert_eq!(
            ShortcutMap::resolve("]", false, true, false, true),
            Some(ShortcutAction::BringToFront)
        );
        assert_eq!(
            ShortcutMap::resolve("{", true, true, false, false),
            Some(ShortcutAction::SendToBack)
        );
        assert_eq!(ShortcutMap::resolve("]", false, false, false, true), None);
    }

    #[test]
    fn resolve_modifier_precedence() {
        assert_eq!(ShortcutMap::resolve("c", false, false, false, false), None);
        assert_eq!(
            ShortcutMap::resolve("ArrowLeft", false, true, false, false),
            None
        );
        assert_eq!(
            ShortcutMap::resolve("Escape", false, false, false, false),
            Some(ShortcutAction::Deselect)
        );
    }
}
