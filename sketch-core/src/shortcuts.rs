//! Keyboard shortcut mapping.
//!
//! Maps `KeyboardEvent.key` plus modifiers to an [`EditorAction`]. The map
//! lives here so browser and native hosts share it.

use crate::tools::Tool;

/// Actions a key press can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    /// Step back in history.
    Undo,
    /// Step forward in history.
    Redo,
    /// Select every visible object.
    SelectAll,
    /// One zoom step in.
    ZoomIn,
    /// One zoom step out.
    ZoomOut,
    /// Back to 100% with no pan.
    ResetZoom,
    /// Zoom to show all content.
    FitContent,
    /// Switch the active tool.
    SetTool(Tool),
}

/// Resolves key events into editor actions.
///
/// `ctrl` and `meta` are interchangeable so Ctrl on Linux/Windows and ⌘ on
/// macOS behave the same.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event. Returns `None` for unbound combos.
    #[must_use]
    pub fn resolve(key: &str, ctrl: bool, shift: bool, meta: bool) -> Option<EditorAction> {
        let key = key.to_lowercase();
        let cmd = ctrl || meta;

        if cmd {
            let action = match key.as_str() {
                "z" if shift => Some(EditorAction::Redo),
                "z" => Some(EditorAction::Undo),
                "y" => Some(EditorAction::Redo),
                "a" => Some(EditorAction::SelectAll),
                "+" | "=" => Some(EditorAction::ZoomIn),
                "-" => Some(EditorAction::ZoomOut),
                "0" => Some(EditorAction::ResetZoom),
                _ => None,
            };
            if action.is_some() {
                return action;
            }
        }

        if key == "f" {
            return Some(EditorAction::FitContent);
        }

        if cmd {
            return None;
        }

        let tool = match key.as_str() {
            "v" => Tool::Select,
            "h" | " " => Tool::Pan,
            "p" => Tool::Free,
            "r" => Tool::Rect,
            "t" => Tool::Triangle,
            "c" => Tool::Circle,
            "x" => Tool::Text,
            "l" => Tool::Line,
            "a" => Tool::Arrow,
            "i" => Tool::Image,
            _ => return None,
        };
        Some(EditorAction::SetTool(tool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_history() {
        assert_eq!(
            ShortcutMap::resolve("z", true, false, false),
            Some(EditorAction::Undo)
        );
        assert_eq!(
            ShortcutMap::resolve("Z", false, true, true),
            Some(EditorAction::Redo)
        );
        assert_eq!(
            ShortcutMap::resolve("y", false, false, true),
            Some(EditorAction::Redo)
        );
    }

    #[test]
    fn resolve_zoom() {
        assert_eq!(
            ShortcutMap::resolve("=", true, false, false),
            Some(EditorAction::ZoomIn)
        );
        assert_eq!(
            ShortcutMap::resolve("+", true, true, false),
            Some(EditorAction::ZoomIn)
        );
        assert_eq!(
            ShortcutMap::resolve("-", false, false, true),
            Some(EditorAction::ZoomOut)
        );
        assert_eq!(
            ShortcutMap::resolve("0", true, false, false),
            Some(EditorAction::ResetZoom)
        );
        assert_eq!(ShortcutMap::resolve("0", false, false, false), None);
        assert_eq!(
            ShortcutMap::resolve("f", false, false, false),
            Some(EditorAction::FitContent)
        );
    }

    #[test]
    fn resolve_tools_without_modifiers() {
        let cases = [
            ("v", Tool::Select),
            ("h", Tool::Pan),
            (" ", Tool::Pan),
            ("p", Tool::Free),
            ("r", Tool::Rect),
            ("t", Tool::Triangle),
            ("c", Tool::Circle),
            ("x", Tool::Text),
            ("l", Tool::Line),
            ("a", Tool::Arrow),
            ("i", Tool::Image),
        ];
        for (key, tool) in cases {
            assert_eq!(
                ShortcutMap::resolve(key, false, false, false),
                Some(EditorAction::SetTool(tool)),
                "key {key:?}"
            );
        }
    }

    #[test]
    fn modifier_combos_do_not_switch_tools() {
        assert_eq!(
            ShortcutMap::resolve("a", true, false, false),
            Some(EditorAction::SelectAll)
        );
        assert_eq!(ShortcutMap::resolve("v", true, false, false), None);
        assert_eq!(ShortcutMap::resolve("q", false, false, false), None);
    }
}
