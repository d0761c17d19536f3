//! Tracing setup: stderr logging plus optional span export to a file.
//!
//! ```text
//! tracing macros ─▶ EnvFilter ─┬─▶ fmt layer ─▶ stderr
//!                              └─▶ tracing-opentelemetry ─▶ FileSpanExporter ─▶ rotating JSONL file
//! ```
//!
//! Filter priority:
//! 1. `RUST_LOG` environment variable
//! 2. `trace_level` in [`crate::Config`]
//! 3. Default: `"info"`
//!
//! # Modules
//!
//! - `init`: Subscriber installation
//! - `exporter`: OpenTelemetry span exporter writing JSON lines
//! - `file_writer`: Size-rotated line writer

mod exporter;
mod file_writer;
mod init;

pub use init::init_tracing;
