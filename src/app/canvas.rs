//! The canvas facade wiring every control-core component together.

use super::host::CanvasHost;
use crate::animation::{ScheduledTaskManager, StrokeAnimator};
use crate::bus::{CanvasBus, CanvasBusExt, CanvasEvent, Dispatcher, EventBus};
use crate::controller::{
    ControllerMode, ControllerOptions, HandlerContext, InputController, InputHandler, ModeReader,
    PanningHandler, SelectingHandler,
};
use crate::domain::error::Result;
use crate::domain::{ComponentId, InputEvent};
use crate::layers::{Layer, LayerStack};
use crate::overlay::SelectionOverlay;
use crate::storage::{CanvasPreferences, JsonPreferences, MemoryPreferences, PreferenceStore};
use crate::Config;
use std::sync::Arc;
use std::time::Duration;

/// Interactive canvas control core.
///
/// All methods are meant to be called from the UI thread. Listeners registered
/// on [`Canvas::bus`] run on dispatch threads.
///
/// # Example
///
/// ```
/// use probemap::app::{Canvas, HeadlessHost};
/// use probemap::controller::ControllerMode;
/// use probemap::domain::{Key, KeyEvent, InputEvent};
/// use probemap::storage::MemoryPreferences;
/// use probemap::Config;
/// use std::sync::Arc;
///
/// let mut canvas = Canvas::new(
///     &Config::default(),
///     Arc::new(HeadlessHost),
///     Box::new(MemoryPreferences::new()),
/// )?;
///
/// canvas.set_mode(ControllerMode::Selecting);
/// canvas.handle_input(&InputEvent::Key(KeyEvent::pressed(Key::Ctrl)));
/// assert_eq!(canvas.mode(), ControllerMode::SelectingPanOverride);
/// # Ok::<(), probemap::ProbeMapError>(())
/// ```
pub struct Canvas {
    bus: CanvasBus,
    tasks: Arc<ScheduledTaskManager>,
    animator: Arc<StrokeAnimator>,
    overlay: Arc<SelectionOverlay>,
    layers: LayerStack,
    controller: InputController,
    host: Arc<dyn CanvasHost>,
    store: Box<dyn PreferenceStore>,
    preferences: CanvasPreferences,
}

impl std::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Canvas")
            .field("mode", &self.controller.mode())
            .field("layers", &self.layers.len())
            .field("preferences", &self.preferences)
            .finish_non_exhaustive()
    }
}

impl Canvas {
    /// Assembles a canvas and restores its preferences from `store`.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatch or scheduler threads cannot be spawned.
    pub fn new(
        config: &Config,
        host: Arc<dyn CanvasHost>,
        store: Box<dyn PreferenceStore>,
    ) -> Result<Self> {
        let dispatcher = Dispatcher::new("probemap-dispatch", config.dispatch_threads)?;
        let bus: CanvasBus = EventBus::new(dispatcher);
        let tasks = Arc::new(ScheduledTaskManager::new()?);

        let animator = Arc::new(StrokeAnimator::new(
            Arc::clone(&tasks),
            bus.clone(),
            Duration::from_millis(config.stroke_initial_delay_ms),
            Duration::from_millis(config.stroke_period_ms),
        ));

        let overlay = SelectionOverlay::new(Arc::clone(&host));
        overlay.attach(&bus);

        let preferences = CanvasPreferences::load(store.as_ref());

        let handlers: Vec<Box<dyn InputHandler>> = vec![
            Box::new(PanningHandler::new(bus.clone())),
            Box::new(SelectingHandler::new(
                bus.clone(),
                Arc::clone(&overlay),
                Arc::clone(&animator),
            )),
        ];
        let controller = InputController::new(
            handlers,
            preferences.mode,
            ControllerOptions {
                symmetric_overrides: config.symmetric_overrides,
            },
        );

        tracing::debug!(
            mode = %preferences.mode,
            dispatch_threads = config.dispatch_threads,
            "canvas assembled"
        );

        Ok(Self {
            layers: LayerStack::new(bus.clone()),
            bus,
            tasks,
            animator,
            overlay,
            controller,
            host,
            store,
            preferences,
        })
    }

    /// Like [`Canvas::new`], choosing the preference store from
    /// `config.preferences_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the preference file cannot be opened or the
    /// background threads cannot be spawned.
    pub fn from_config(config: &Config, host: Arc<dyn CanvasHost>) -> Result<Self> {
        let store: Box<dyn PreferenceStore> = match &config.preferences_path {
            Some(path) => Box::new(JsonPreferences::open(path)?),
            None => Box::new(MemoryPreferences::new()),
        };
        Self::new(config, host, store)
    }

    /// Routes one input event: key edges to the controller, pointer events to
    /// the active handler.
    pub fn handle_input(&mut self, event: &InputEvent) {
        match event {
            InputEvent::Key(key) => {
                self.controller.handle_key(key);
            }
            InputEvent::Pointer(pointer) => {
                let mut ctx = HandlerContext::new(&mut self.layers, self.host.as_ref());
                self.controller.handle_pointer(pointer, &mut ctx);
            }
        }
    }

    pub fn set_mode(&mut self, mode: ControllerMode) {
        let ctx = HandlerContext::new(&mut self.layers, self.host.as_ref());
        self.controller.set_mode(mode, &ctx);
    }

    #[must_use]
    pub fn mode(&self) -> ControllerMode {
        self.controller.mode()
    }

    #[must_use]
    pub fn mode_reader(&self) -> ModeReader {
        self.controller.mode_reader()
    }

    #[must_use]
    pub const fn layers(&self) -> &LayerStack {
        &self.layers
    }

    pub fn add_layer(&mut self, layer: Layer) {
        self.layers.add(layer);
        self.host.request_repaint();
    }

    /// Returns `false` when no layer has `id`.
    pub fn set_layer_visible(&mut self, id: &str, visible: bool) -> bool {
        let found = self.layers.set_visible(id, visible);
        if found {
            self.host.request_repaint();
        }
        found
    }

    /// Returns `false` when no layer has `id`.
    pub fn set_layer_z_order(&mut self, id: &str, z_order: i32) -> bool {
        let found = self.layers.set_z_order(id, z_order);
        if found {
            self.host.request_repaint();
        }
        found
    }

    #[must_use]
    pub fn overlay(&self) -> &SelectionOverlay {
        &self.overlay
    }

    #[must_use]
    pub const fn bus(&self) -> &CanvasBus {
        &self.bus
    }

    /// Removes `component` from the selection.
    pub fn deselect(&self, component: ComponentId) {
        tracing::debug!(%component, "deselecting component");
        self.bus.emit(CanvasEvent::DeselectOne(component));
    }

    #[must_use]
    pub const fn pan_palette_visible(&self) -> bool {
        self.preferences.pan_palette_visible
    }

    pub fn set_pan_palette_visible(&mut self, visible: bool) {
        self.preferences.pan_palette_visible = visible;
        self.host.request_repaint();
    }

    #[must_use]
    pub const fn select_palette_visible(&self) -> bool {
        self.preferences.select_palette_visible
    }

    pub fn set_select_palette_visible(&mut self, visible: bool) {
        self.preferences.select_palette_visible = visible;
        self.host.request_repaint();
    }

    /// Writes the current mode and palette flags to the preference store.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot persist the values.
    pub fn save_preferences(&mut self) -> Result<()> {
        self.preferences.mode = self.controller.mode().base();
        self.preferences.save(self.store.as_mut())?;
        tracing::debug!(mode = %self.preferences.mode, "preferences saved");
        Ok(())
    }

    /// Blocks until every published event has been delivered.
    pub fn wait_idle(&self) {
        self.bus.wait_idle();
    }
}

impl Drop for Canvas {
    fn drop(&mut self) {
        self.animator.stop();
        self.overlay.detach(&self.bus);
        tracing::trace!(active = self.tasks.is_active(crate::animation::STROKE_TASK_KEY), "canvas dropped");
    }
}
