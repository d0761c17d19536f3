//! Ordered, named collection of canvas layers.
//!
//! [`LayerStack`] keeps its layers sorted by `(z_order, insertion index)` so
//! iteration order is paint order: the bottom layer is painted first. An id →
//! position index is rebuilt after every reorder, which keeps lookups O(1) and
//! consistent with the sequence.
//!
//! # Example
//!
//! ```
//! use probemap::layers::{Layer, LayerStack};
//!
//! let mut stack = LayerStack::detached();
//! stack.add(Layer::empty("markers", 5));
//! stack.add(Layer::empty("tiles", 3));
//! stack.add(Layer::empty("tools", 5));
//!
//! let order: Vec<&str> = stack.iter().map(Layer::id).collect();
//! assert_eq!(order, ["tiles", "markers", "tools"]);
//! ```

use super::layer::Layer;
use super::view::MapView;
use crate::bus::{CanvasBus, CanvasBusExt, CanvasEvent};
use crate::domain::{ComponentId, Point};
use std::collections::HashMap;

/// Layer stack plus the map transform it is drawn with.
#[derive(Debug)]
pub struct LayerStack {
    layers: Vec<Layer>,
    index: HashMap<String, usize>,
    next_sequence: u64,
    view: MapView,
    bus: Option<CanvasBus>,
}

impl LayerStack {
    /// Creates an empty stack that announces additions on `bus`.
    #[must_use]
    pub fn new(bus: CanvasBus) -> Self {
        Self {
            bus: Some(bus),
            ..Self::detached()
        }
    }

    /// Creates an empty stack that publishes nothing.
    #[must_use]
    pub fn detached() -> Self {
        Self {
            layers: Vec::new(),
            index: HashMap::new(),
            next_sequence: 0,
            view: MapView::default(),
            bus: None,
        }
    }

    /// Inserts `layer` at its z-order and publishes `LayerAdded`.
    ///
    /// A layer whose id is already present replaces that entry's content,
    /// z-order and visibility but keeps its original insertion position among
    /// equal z-orders.
    pub fn add(&mut self, mut layer: Layer) {
        let _span = tracing::debug_span!("layer_add", id = %layer.id(), z = layer.z_order()).entered();

        let published = if let Some(&position) = self.index.get(layer.id()) {
            tracing::warn!("layer id already registered, replacing entry");
            let existing = &mut self.layers[position];
            existing.replace_with(layer);
            existing.clone()
        } else {
            layer.sequence = self.next_sequence;
            self.next_sequence += 1;
            self.layers.push(layer.clone());
            layer
        };

        self.resort();
        tracing::debug!(count = self.layers.len(), "layer added");

        if let Some(bus) = &self.bus {
            bus.emit(CanvasEvent::LayerAdded(published));
        }
    }

    /// Looks up a layer by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Layer> {
        self.index.get(id).map(|&position| &self.layers[position])
    }

    /// Returns the layer at `position` counting from the bottom, or `None`
    /// when out of range.
    #[must_use]
    pub fn by_order(&self, position: usize) -> Option<&Layer> {
        self.layers.get(position)
    }

    /// Shows or hides a layer. Returns `false` for unknown ids.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        let Some(&position) = self.index.get(id) else {
            tracing::debug!(id, "set_visible on unknown layer ignored");
            return false;
        };
        self.layers[position].set_visible(visible);
        tracing::trace!(id, visible, "layer visibility changed");
        true
    }

    /// Moves a layer to a new z-order. Returns `false` for unknown ids.
    pub fn set_z_order(&mut self, id: &str, z_order: i32) -> bool {
        let Some(&position) = self.index.get(id) else {
            tracing::debug!(id, "set_z_order on unknown layer ignored");
            return false;
        };
        if self.layers[position].z_order() != z_order {
            self.layers[position].set_z_order(z_order);
            self.resort();
        }
        tracing::trace!(id, z_order, "layer z-order changed");
        true
    }

    /// Layers in paint order, bottom first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Layer> + ExactSizeIterator {
        self.layers.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Finds the topmost visible component under `point`.
    #[must_use]
    pub fn hit_test(&self, point: Point) -> Option<ComponentId> {
        self.layers
            .iter()
            .rev()
            .filter(|layer| layer.is_visible())
            .find_map(|layer| layer.content().hit_test(point))
    }

    #[must_use]
    pub const fn view(&self) -> &MapView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut MapView {
        &mut self.view
    }

    fn resort(&mut self) {
        // sort_by_key is stable, and the sequence breaks ties anyway
        self.layers.sort_by_key(Layer::sort_key);
        self.index.clear();
        for (position, layer) in self.layers.iter().enumerate() {
            self.index.insert(layer.id().to_string(), position);
        }
    }
}

impl<'a> IntoIterator for &'a LayerStack {
    type Item = &'a Layer;
    type IntoIter = std::slice::Iter<'a, Layer>;

    fn into_iter(self) -> Self::IntoIter {
        self.layers.iter()
    }
}
