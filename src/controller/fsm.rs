//! Modal input controller deciding which handler owns pointer input.
//!
//! The controller owns an explicit registry from [`ControllerKind`] to boxed
//! [`InputHandler`]s and an atomic mode cell. Modifier-key edges drive the
//! transitions below; every other chord is ignored.
//!
//! | From                    | Trigger        | To                      |
//! |-------------------------|----------------|-------------------------|
//! | `PanningSelectOverride` | SHIFT released | `Panning`               |
//! | `Selecting`             | CTRL pressed   | `SelectingPanOverride`  |
//! | `Panning`               | SHIFT pressed  | `PanningSelectOverride` (opt-in) |
//! | `SelectingPanOverride`  | CTRL released  | `Selecting` (opt-in)    |
//! | any                     | `set_mode(m)`  | `m`                     |
//!
//! The opt-in rows are only active with `symmetric_overrides`.
//!
//! Key transitions use compare-and-set on the mode cell, so an edge that
//! arrives after another thread already moved the mode is dropped instead of
//! producing a double transition.

use super::handler::{HandlerContext, InputHandler};
use super::modes::{ControllerKind, ControllerMode};
use crate::domain::{Key, KeyEdge, KeyEvent, PointerEvent};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

/// Read-only, thread-safe view of the controller's current mode.
#[derive(Debug, Clone)]
pub struct ModeReader {
    cell: Arc<AtomicU8>,
}

impl ModeReader {
    #[must_use]
    pub fn get(&self) -> ControllerMode {
        ControllerMode::from_u8(self.cell.load(Ordering::Acquire))
    }
}

/// Behavior switches for the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControllerOptions {
    /// Enables SHIFT-press and CTRL-release override transitions.
    pub symmetric_overrides: bool,
}

/// The input controller state machine.
pub struct InputController {
    mode: Arc<AtomicU8>,
    handlers: BTreeMap<ControllerKind, Box<dyn InputHandler>>,
    active: Option<ControllerKind>,
    options: ControllerOptions,
}

impl fmt::Debug for InputController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputController")
            .field("mode", &self.mode())
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("active", &self.active)
            .field("options", &self.options)
            .finish()
    }
}

impl InputController {
    /// Builds a controller from its handler registry and starts the handler
    /// for `initial`.
    ///
    /// Handlers are keyed by their own [`InputHandler::kind`]; a later handler
    /// of the same kind replaces an earlier one.
    #[must_use]
    pub fn new(
        handlers: Vec<Box<dyn InputHandler>>,
        initial: ControllerMode,
        options: ControllerOptions,
    ) -> Self {
        let handlers: BTreeMap<_, _> = handlers
            .into_iter()
            .map(|handler| (handler.kind(), handler))
            .collect();

        let mut controller = Self {
            mode: Arc::new(AtomicU8::new(initial.to_u8())),
            handlers,
            active: None,
            options,
        };
        controller.activate(initial.handler_kind());
        tracing::debug!(mode = %initial, ?options, "controller initialized");
        controller
    }

    /// Current mode. Safe to call while a transition is in flight elsewhere.
    #[must_use]
    pub fn mode(&self) -> ControllerMode {
        ControllerMode::from_u8(self.mode.load(Ordering::Acquire))
    }

    /// A cloneable reader for other threads.
    #[must_use]
    pub fn mode_reader(&self) -> ModeReader {
        ModeReader {
            cell: Arc::clone(&self.mode),
        }
    }

    /// The handler currently receiving pointer events.
    #[must_use]
    pub const fn active_kind(&self) -> Option<ControllerKind> {
        self.active
    }

    #[must_use]
    pub const fn options(&self) -> ControllerOptions {
        self.options
    }

    /// Forwards a pointer event to the active handler.
    pub fn handle_pointer(&mut self, event: &PointerEvent, ctx: &mut HandlerContext<'_>) {
        let Some(kind) = self.active else {
            return;
        };
        if let Some(handler) = self.handlers.get_mut(&kind) {
            handler.handle_pointer(event, ctx);
        }
    }

    /// Applies a key-chord edge. Returns the new mode when a transition fired.
    pub fn handle_key(&mut self, event: &KeyEvent) -> Option<ControllerMode> {
        let symmetric = self.options.symmetric_overrides;
        let (from, to) = match (event.key, event.edge) {
            (Key::Shift, KeyEdge::Released) => {
                (ControllerMode::PanningSelectOverride, ControllerMode::Panning)
            }
            (Key::Ctrl, KeyEdge::Pressed) => {
                (ControllerMode::Selecting, ControllerMode::SelectingPanOverride)
            }
            (Key::Shift, KeyEdge::Pressed) if symmetric => {
                (ControllerMode::Panning, ControllerMode::PanningSelectOverride)
            }
            (Key::Ctrl, KeyEdge::Released) if symmetric => {
                (ControllerMode::SelectingPanOverride, ControllerMode::Selecting)
            }
            _ => return None,
        };

        if self
            .mode
            .compare_exchange(from.to_u8(), to.to_u8(), Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::trace!(key = ?event.key, edge = ?event.edge, mode = %self.mode(), "key edge ignored in current mode");
            return None;
        }

        tracing::debug!(%from, %to, "controller mode transition");
        self.activate(to.handler_kind());
        Some(to)
    }

    /// Switches to `mode` unconditionally, asking the host for input focus.
    pub fn set_mode(&mut self, mode: ControllerMode, ctx: &HandlerContext<'_>) {
        let previous = ControllerMode::from_u8(self.mode.swap(mode.to_u8(), Ordering::AcqRel));
        if previous != mode {
            tracing::debug!(from = %previous, to = %mode, "controller mode set");
        }
        self.activate(mode.handler_kind());
        ctx.host.request_focus();
    }

    fn activate(&mut self, kind: ControllerKind) {
        if self.active == Some(kind) {
            return;
        }

        if let Some(previous) = self.active.take() {
            if let Some(handler) = self.handlers.get_mut(&previous) {
                handler.stop();
            }
        }

        match self.handlers.get_mut(&kind) {
            Some(handler) => {
                handler.start();
                self.active = Some(kind);
                tracing::trace!(?kind, "handler activated");
            }
            None => {
                tracing::warn!(?kind, "no handler registered for kind");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::CanvasHost;
    use crate::domain::{MouseButton, Point, PointerAction};
    use crate::layers::LayerStack;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct FocusHost {
        focus_requests: AtomicUsize,
    }

    impl CanvasHost for FocusHost {
        fn request_repaint(&self) {}

        fn request_focus(&self) {
            self.focus_requests.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Handler that journals lifecycle calls and pointer events.
    struct Probe {
        kind: ControllerKind,
        journal: Arc<Mutex<Vec<String>>>,
    }

    impl InputHandler for Probe {
        fn kind(&self) -> ControllerKind {
            self.kind
        }

        fn start(&mut self) {
            self.journal.lock().unwrap().push(format!("start {:?}", self.kind));
        }

        fn stop(&mut self) {
            self.journal.lock().unwrap().push(format!("stop {:?}", self.kind));
        }

        fn handle_pointer(&mut self, _event: &PointerEvent, _ctx: &mut HandlerContext<'_>) {
            self.journal.lock().unwrap().push(format!("event {:?}", self.kind));
        }
    }

    fn build(initial: ControllerMode, options: ControllerOptions) -> (InputController, Arc<Mutex<Vec<String>>>) {
        let journal = Arc::new(Mutex::new(Vec::new()));
        let handlers: Vec<Box<dyn InputHandler>> = vec![
            Box::new(Probe {
                kind: ControllerKind::Panning,
                journal: Arc::clone(&journal),
            }),
            Box::new(Probe {
                kind: ControllerKind::Selecting,
                journal: Arc::clone(&journal),
            }),
        ];
        (InputController::new(handlers, initial, options), journal)
    }

    fn shift(edge: KeyEdge) -> KeyEvent {
        KeyEvent { key: Key::Shift, edge }
    }

    fn ctrl(edge: KeyEdge) -> KeyEvent {
        KeyEvent { key: Key::Ctrl, edge }
    }

    #[test]
    fn starts_in_panning_with_panning_handler() {
        let (controller, journal) = build(ControllerMode::default(), ControllerOptions::default());
        assert_eq!(controller.mode(), ControllerMode::Panning);
        assert_eq!(controller.active_kind(), Some(ControllerKind::Panning));
        assert_eq!(*journal.lock().unwrap(), ["start Panning"]);
    }

    #[test]
    fn shift_cycle_from_panning_is_a_no_op() {
        let (mut controller, journal) = build(ControllerMode::Panning, ControllerOptions::default());

        assert_eq!(controller.handle_key(&shift(KeyEdge::Pressed)), None);
        assert_eq!(controller.handle_key(&shift(KeyEdge::Released)), None);

        assert_eq!(controller.mode(), ControllerMode::Panning);
        assert_eq!(controller.active_kind(), Some(ControllerKind::Panning));
        assert_eq!(journal.lock().unwrap().len(), 1);
    }

    #[test]
    fn ctrl_press_in_selecting_stops_selecting_before_starting_panning() {
        let (mut controller, journal) = build(ControllerMode::Selecting, ControllerOptions::default());

        assert_eq!(
            controller.handle_key(&ctrl(KeyEdge::Pressed)),
            Some(ControllerMode::SelectingPanOverride)
        );
        assert_eq!(controller.active_kind(), Some(ControllerKind::Panning));
        assert_eq!(
            *journal.lock().unwrap(),
            ["start Selecting", "stop Selecting", "start Panning"]
        );

        // the dormant release transition stays off by default
        assert_eq!(controller.handle_key(&ctrl(KeyEdge::Released)), None);
        assert_eq!(controller.mode(), ControllerMode::SelectingPanOverride);
    }

    #[test]
    fn shift_release_leaves_select_override() {
        let (mut controller, _journal) =
            build(ControllerMode::PanningSelectOverride, ControllerOptions::default());
        assert_eq!(controller.active_kind(), Some(ControllerKind::Selecting));

        assert_eq!(controller.handle_key(&shift(KeyEdge::Released)), Some(ControllerMode::Panning));
        assert_eq!(controller.active_kind(), Some(ControllerKind::Panning));
    }

    #[test]
    fn symmetric_overrides_enable_entry_and_exit_edges() {
        let options = ControllerOptions {
            symmetric_overrides: true,
        };
        let (mut controller, _journal) = build(ControllerMode::Panning, options);

        controller.handle_key(&shift(KeyEdge::Pressed));
        assert_eq!(controller.mode(), ControllerMode::PanningSelectOverride);
        assert_eq!(controller.active_kind(), Some(ControllerKind::Selecting));
        controller.handle_key(&shift(KeyEdge::Released));
        assert_eq!(controller.mode(), ControllerMode::Panning);

        let (mut controller, _journal) = build(ControllerMode::Selecting, options);
        controller.handle_key(&ctrl(KeyEdge::Pressed));
        controller.handle_key(&ctrl(KeyEdge::Released));
        assert_eq!(controller.mode(), ControllerMode::Selecting);
        assert_eq!(controller.active_kind(), Some(ControllerKind::Selecting));
    }

    #[test]
    fn other_keys_are_ignored() {
        let (mut controller, _journal) = build(ControllerMode::Selecting, ControllerOptions::default());
        assert_eq!(controller.handle_key(&KeyEvent::pressed(Key::Alt)), None);
        assert_eq!(controller.handle_key(&KeyEvent::pressed(Key::Other(65))), None);
        assert_eq!(controller.mode(), ControllerMode::Selecting);
    }

    #[test]
    fn set_mode_switches_handler_and_requests_focus() {
        let (mut controller, journal) = build(ControllerMode::Selecting, ControllerOptions::default());
        let mut layers = LayerStack::detached();
        let host = FocusHost::default();
        let mut ctx = HandlerContext::new(&mut layers, &host);

        controller.set_mode(ControllerMode::Panning, &ctx);
        assert_eq!(controller.mode(), ControllerMode::Panning);
        assert_eq!(host.focus_requests.load(Ordering::SeqCst), 1);

        controller.handle_pointer(
            &PointerEvent::new(PointerAction::Pressed, Point::new(0, 0), Some(MouseButton::Primary)),
            &mut ctx,
        );
        assert_eq!(
            *journal.lock().unwrap(),
            ["start Selecting", "stop Selecting", "start Panning", "event Panning"]
        );
    }

    #[test]
    fn mode_reader_observes_transitions_from_another_thread() {
        let (mut controller, _journal) = build(ControllerMode::Selecting, ControllerOptions::default());
        let reader = controller.mode_reader();

        controller.handle_key(&ctrl(KeyEdge::Pressed));
        let seen = std::thread::spawn(move || reader.get()).join().unwrap();
        assert_eq!(seen, ControllerMode::SelectingPanOverride);
    }
}
