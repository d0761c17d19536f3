//! Engine-neutral input events.
//!
//! The hosting toolkit translates its native pointer and keyboard events into
//! these structures before handing them to [`crate::Canvas::handle_input`].
//! All types are serde-serializable so input sessions can be recorded and
//! replayed by the `probemap` binary.
//!
//! # Example
//!
//! ```
//! use probemap::domain::{InputEvent, MouseButton, Point, PointerAction, PointerEvent};
//!
//! let press = InputEvent::Pointer(PointerEvent::new(
//!     PointerAction::Pressed,
//!     Point::new(10, 10),
//!     Some(MouseButton::Primary),
//! ));
//! assert!(matches!(press, InputEvent::Pointer(_)));
//! ```

use super::geometry::Point;
use serde::{Deserialize, Serialize};

/// Pointer buttons the controller distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

/// What happened to the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerAction {
    Pressed,
    Released,
    /// A press and release without movement; `click_count` carries multi-clicks.
    Clicked,
    Moved,
    Dragged,
    /// Wheel movement in notches; positive values scroll towards the user.
    Wheel { rotation: i32 },
}

/// Modifier keys held while a pointer event occurred.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ctrl: false,
        alt: false,
    };
}

/// A pointer event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub action: PointerAction,
    pub position: Point,
    #[serde(default)]
    pub button: Option<MouseButton>,
    #[serde(default = "default_click_count")]
    pub click_count: u32,
    #[serde(default)]
    pub modifiers: Modifiers,
}

const fn default_click_count() -> u32 {
    1
}

impl PointerEvent {
    /// Creates a single-click event with no modifiers held.
    #[must_use]
    pub const fn new(action: PointerAction, position: Point, button: Option<MouseButton>) -> Self {
        Self {
            action,
            position,
            button,
            click_count: 1,
            modifiers: Modifiers::NONE,
        }
    }

    #[must_use]
    pub const fn with_click_count(mut self, click_count: u32) -> Self {
        self.click_count = click_count;
        self
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// True when the primary button triggered this event.
    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.button == Some(MouseButton::Primary)
    }
}

/// Keys that can drive controller transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Key {
    Shift,
    Ctrl,
    Alt,
    /// Any other key, identified by the toolkit's key code.
    Other(u32),
}

/// Direction of a key-chord edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyEdge {
    Pressed,
    Released,
}

/// A discrete press or release of one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub edge: KeyEdge,
}

impl KeyEvent {
    #[must_use]
    pub const fn pressed(key: Key) -> Self {
        Self {
            key,
            edge: KeyEdge::Pressed,
        }
    }

    #[must_use]
    pub const fn released(key: Key) -> Self {
        Self {
            key,
            edge: KeyEdge::Released,
        }
    }
}

/// Any raw input the canvas consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputEvent {
    Pointer(PointerEvent),
    Key(KeyEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_event_defaults_fill_in_when_deserializing() {
        let json = r#"{"pointer":{"action":"dragged","position":{"x":3,"y":4}}}"#;
        let event: InputEvent = serde_json::from_str(json).unwrap();

        let InputEvent::Pointer(pointer) = event else {
            panic!("expected pointer event");
        };
        assert_eq!(pointer.action, PointerAction::Dragged);
        assert_eq!(pointer.button, None);
        assert_eq!(pointer.click_count, 1);
        assert_eq!(pointer.modifiers, Modifiers::NONE);
    }

    #[test]
    fn wheel_and_key_events_parse_from_script_json() {
        let wheel: InputEvent = serde_json::from_str(
            r#"{"pointer":{"action":{"wheel":{"rotation":-2}},"position":{"x":0,"y":0}}}"#,
        )
        .unwrap();
        assert!(matches!(
            wheel,
            InputEvent::Pointer(PointerEvent {
                action: PointerAction::Wheel { rotation: -2 },
                ..
            })
        ));

        let key: InputEvent =
            serde_json::from_str(r#"{"key":{"key":"ctrl","edge":"pressed"}}"#).unwrap();
        assert_eq!(key, InputEvent::Key(KeyEvent::pressed(Key::Ctrl)));
    }
}
