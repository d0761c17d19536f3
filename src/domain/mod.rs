//! Domain layer for the probemap canvas core.
//!
//! Plain data types shared by every other layer, independent of the hosting
//! toolkit: errors, component-space geometry, and engine-neutral input events.
//!
//! # Organization
//!
//! - [`error`]: Error types and result aliases
//! - [`geometry`]: Points and normalized rectangles
//! - [`input`]: Pointer and key events consumed by the controller

pub mod error;
pub mod geometry;
pub mod input;

pub use error::{ProbeMapError, Result};
pub use geometry::{Point, Rect};
pub use input::{
    InputEvent, Key, KeyEdge, KeyEvent, Modifiers, MouseButton, PointerAction, PointerEvent,
};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a selectable component drawn by a layer (a probe marker, a
/// fume cell), as reported by [`crate::layers::LayerContent::hit_test`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub String);

impl ComponentId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
