//! Controller mode state types.
//!
//! This module defines the state machine enums that decide which input
//! handler interprets pointer events on the canvas.
//!
//! # State Machine
//!
//! The controller operates in one of two base modes, each with an override
//! sub-state entered while a modifier key is held:
//! - **Panning**: Default; dragging moves the map
//! - **`PanningSelectOverride`**: Panning base, selection temporarily active
//! - **Selecting**: Dragging draws a selection rectangle
//! - **`SelectingPanOverride`**: Selecting base, panning temporarily active
//!
//! # Example
//!
//! ```
//! use probemap::controller::{ControllerKind, ControllerMode};
//!
//! let mode: ControllerMode = "selecting-pan-override".parse().unwrap();
//! assert_eq!(mode.handler_kind(), ControllerKind::Panning);
//! assert_eq!(mode.base(), ControllerMode::Selecting);
//! ```

use std::fmt;
use std::str::FromStr;

/// The concrete input handlers the controller can activate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ControllerKind {
    /// Drag pans, wheel and double-click zoom.
    Panning,
    /// Drag draws a selection rectangle, click selects a component.
    Selecting,
}

/// Active input-interpretation state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ControllerMode {
    /// Initial mode. Pointer drags pan the map.
    #[default]
    Panning = 0,

    /// Panning base with the selecting handler active while SHIFT is held.
    PanningSelectOverride = 1,

    /// Pointer drags draw a selection rectangle.
    Selecting = 2,

    /// Selecting base with the panning handler active while CTRL is held.
    SelectingPanOverride = 3,
}

impl ControllerMode {
    pub const ALL: [Self; 4] = [
        Self::Panning,
        Self::PanningSelectOverride,
        Self::Selecting,
        Self::SelectingPanOverride,
    ];

    /// The handler that receives pointer events in this mode.
    #[must_use]
    pub const fn handler_kind(self) -> ControllerKind {
        match self {
            Self::Panning | Self::SelectingPanOverride => ControllerKind::Panning,
            Self::PanningSelectOverride | Self::Selecting => ControllerKind::Selecting,
        }
    }

    /// The mode with any key-held override removed.
    #[must_use]
    pub const fn base(self) -> Self {
        match self {
            Self::Panning | Self::PanningSelectOverride => Self::Panning,
            Self::Selecting | Self::SelectingPanOverride => Self::Selecting,
        }
    }

    /// Stable name used for persistence.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Panning => "panning",
            Self::PanningSelectOverride => "panning-select-override",
            Self::Selecting => "selecting",
            Self::SelectingPanOverride => "selecting-pan-override",
        }
    }

    pub(crate) const fn to_u8(self) -> u8 {
        self as u8
    }

    pub(crate) const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::PanningSelectOverride,
            2 => Self::Selecting,
            3 => Self::SelectingPanOverride,
            _ => Self::Panning,
        }
    }
}

impl fmt::Display for ControllerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a persisted mode name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown controller mode: {0}")]
pub struct UnknownMode(pub String);

impl FromStr for ControllerMode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|mode| mode.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_case_insensitively() {
        for mode in ControllerMode::ALL {
            assert_eq!(mode.name().to_uppercase().parse::<ControllerMode>(), Ok(mode));
            assert_eq!(ControllerMode::from_u8(mode.to_u8()), mode);
        }
    }

    #[test]
    fn garbage_is_rejected() {
        assert_eq!(
            "zoom".parse::<ControllerMode>(),
            Err(UnknownMode("zoom".to_string()))
        );
        assert_eq!(
            UnknownMode("zoom".to_string()).to_string(),
            "unknown controller mode: zoom"
        );
    }

    #[test]
    fn overrides_route_to_the_opposite_handler() {
        assert_eq!(ControllerMode::PanningSelectOverride.handler_kind(), ControllerKind::Selecting);
        assert_eq!(ControllerMode::SelectingPanOverride.handler_kind(), ControllerKind::Panning);
        assert_eq!(ControllerMode::PanningSelectOverride.base(), ControllerMode::Panning);
    }
}
