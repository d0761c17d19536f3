//! A single stratum of the canvas: base map, fume overlay, markers, tools.

use crate::domain::{ComponentId, Point};
use std::fmt;
use std::sync::Arc;

/// Renderable content of a layer, opaque to the control core.
///
/// The rendering collaborator downcasts or otherwise knows its own content
/// types; the core only ever asks for hit testing.
pub trait LayerContent: fmt::Debug + Send + Sync {
    /// Returns the component drawn at `point`, if this layer draws selectable ones.
    fn hit_test(&self, point: Point) -> Option<ComponentId> {
        let _ = point;
        None
    }
}

/// Content for layers that draw nothing selectable (the tile map, tool chrome).
#[derive(Debug, Default, Clone, Copy)]
pub struct EmptyContent;

impl LayerContent for EmptyContent {}

/// One named, ordered, toggleable layer.
#[derive(Debug, Clone)]
pub struct Layer {
    id: String,
    z_order: i32,
    visible: bool,
    pub(crate) sequence: u64,
    content: Arc<dyn LayerContent>,
}

impl Layer {
    /// Creates a visible layer.
    #[must_use]
    pub fn new(id: impl Into<String>, z_order: i32, content: Arc<dyn LayerContent>) -> Self {
        Self {
            id: id.into(),
            z_order,
            visible: true,
            sequence: 0,
            content,
        }
    }

    /// Creates a visible layer with [`EmptyContent`].
    #[must_use]
    pub fn empty(id: impl Into<String>, z_order: i32) -> Self {
        Self::new(id, z_order, Arc::new(EmptyContent))
    }

    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub const fn z_order(&self) -> i32 {
        self.z_order
    }

    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn content(&self) -> &Arc<dyn LayerContent> {
        &self.content
    }

    pub(crate) fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub(crate) fn set_z_order(&mut self, z_order: i32) {
        self.z_order = z_order;
    }

    pub(crate) fn replace_with(&mut self, other: Self) {
        self.z_order = other.z_order;
        self.visible = other.visible;
        self.content = other.content;
    }

    pub(crate) fn sort_key(&self) -> (i32, u64) {
        (self.z_order, self.sequence)
    }
}

impl PartialEq for Layer {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.z_order == other.z_order
            && self.visible == other.visible
            && Arc::ptr_eq(&self.content, &other.content)
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.id, self.z_order)
    }
}
