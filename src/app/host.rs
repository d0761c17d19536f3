//! Callbacks from the control core into the embedding UI.

use std::fmt;

/// The rendering surface the canvas draws on.
///
/// Implementations must be callable from any thread: stroke updates request
/// repaints from dispatch threads.
pub trait CanvasHost: fmt::Debug + Send + Sync {
    /// Schedules a repaint. Coalescing is up to the host.
    fn request_repaint(&self);

    /// Asks for keyboard focus so modifier-key edges reach the controller.
    fn request_focus(&self) {}
}

/// Host that ignores every request, for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessHost;

impl CanvasHost for HeadlessHost {
    fn request_repaint(&self) {}
}
