//! Headless replay driver for the canvas control core.
//!
//! Feeds a scripted sequence of input events through a [`Canvas`] and logs
//! every event published on the bus. Useful for reproducing interaction bugs
//! without a UI toolkit.
//!
//! # Usage
//!
//! ```text
//! probemap <script.json> [config.toml]
//! ```
//!
//! # Script Format
//!
//! A JSON array of steps:
//!
//! ```json
//! [
//!   {"set_mode": "selecting"},
//!   {"input": {"pointer": {"action": "pressed", "position": {"x": 10, "y": 10}, "button": "primary"}}},
//!   {"input": {"pointer": {"action": "dragged", "position": {"x": 50, "y": 40}, "button": "primary"}}},
//!   {"sleep_ms": 300},
//!   {"input": {"pointer": {"action": "released", "position": {"x": 50, "y": 40}, "button": "primary"}}},
//!   {"input": {"key": {"key": "ctrl", "edge": "pressed"}}}
//! ]
//! ```

use probemap::bus::{CanvasEvent, CanvasListener, EventKind};
use probemap::domain::InputEvent;
use probemap::observability::init_tracing;
use probemap::{Canvas, CanvasHost, Config, ControllerMode, ProbeMapError, Result};
use serde::Deserialize;
use std::path::Path;
use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// One scripted step.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Step {
    Input(InputEvent),
    SetMode(String),
    SleepMs(u64),
}

/// Host that logs requests instead of painting.
#[derive(Debug, Default)]
struct LoggingHost {
    repaints: AtomicU64,
}

impl CanvasHost for LoggingHost {
    fn request_repaint(&self) {
        let count = self.repaints.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::trace!(count, "repaint requested");
    }

    fn request_focus(&self) {
        tracing::debug!("focus requested");
    }
}

fn load_script(path: &Path) -> Result<Vec<Step>> {
    let text = std::fs::read_to_string(path)?;
    serde_json::from_str(&text)
        .map_err(|e| ProbeMapError::Config(format!("{}: invalid script: {e}", path.display())))
}

fn replay(canvas: &mut Canvas, steps: &[Step]) {
    let span = tracing::info_span!("replay", steps = steps.len());
    let _guard = span.enter();

    for (index, step) in steps.iter().enumerate() {
        tracing::debug!(index, ?step, "replaying step");
        match step {
            Step::Input(event) => canvas.handle_input(event),
            Step::SetMode(name) => match name.parse::<ControllerMode>() {
                Ok(mode) => canvas.set_mode(mode),
                Err(e) => tracing::warn!(index, error = %e, "skipping step"),
            },
            Step::SleepMs(ms) => std::thread::sleep(Duration::from_millis(*ms)),
        }
    }
}

fn run(script_path: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = match config_path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    init_tracing(&config);

    let steps = load_script(script_path)?;
    let host = Arc::new(LoggingHost::default());
    let mut canvas = probemap::initialize(&config, host.clone())?;

    for kind in EventKind::ALL {
        let logger = CanvasListener::new(|event: &CanvasEvent| {
            tracing::info!(kind = ?event.kind(), ?event, "event delivered");
        });
        canvas.bus().subscribe(kind, &logger);
    }

    replay(&mut canvas, &steps);
    canvas.wait_idle();

    tracing::info!(
        mode = %canvas.mode(),
        repaints = host.repaints.load(Ordering::Relaxed),
        "replay finished"
    );
    canvas.save_preferences()
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let (script, config) = match args.as_slice() {
        [script] => (Path::new(script), None),
        [script, config] => (Path::new(script), Some(Path::new(config))),
        _ => {
            eprintln!("usage: probemap <script.json> [config.toml]");
            return ExitCode::from(2);
        }
    };

    match run(script, config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "replay failed");
            eprintln!("probemap: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_steps_parse() {
        let steps: Vec<Step> = serde_json::from_str(
            r#"[
                {"set_mode": "selecting"},
                {"sleep_ms": 5},
                {"input": {"key": {"key": "ctrl", "edge": "pressed"}}}
            ]"#,
        )
        .unwrap();

        assert!(matches!(&steps[0], Step::SetMode(name) if name == "selecting"));
        assert!(matches!(steps[1], Step::SleepMs(5)));
        assert!(matches!(steps[2], Step::Input(InputEvent::Key(_))));
    }

    #[test]
    fn replay_drives_the_canvas() {
        let steps: Vec<Step> = serde_json::from_str(
            r#"[
                {"set_mode": "selecting"},
                {"set_mode": "not-a-mode"},
                {"input": {"key": {"key": "ctrl", "edge": "pressed"}}}
            ]"#,
        )
        .unwrap();

        let mut canvas =
            probemap::initialize(&Config::default(), Arc::new(LoggingHost::default())).unwrap();
        replay(&mut canvas, &steps);
        assert_eq!(canvas.mode(), ControllerMode::SelectingPanOverride);
    }
}
