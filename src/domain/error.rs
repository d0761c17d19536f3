//! Error types for the probemap canvas core.
//!
//! This module defines the centralized error type [`ProbeMapError`] and a type
//! alias [`Result`] used by the few fallible surfaces of the crate: spawning
//! background threads, preference file I/O, and configuration parsing.
//!
//! Interaction paths (input handling, event dispatch, layer lookups) never
//! return errors. They degrade to "no visible effect" and a log line.

use thiserror::Error;

/// The main error type for probemap operations.
///
/// # Examples
///
/// ```
/// use probemap::ProbeMapError;
///
/// fn validate_threads(threads: usize) -> Result<(), ProbeMapError> {
///     if threads == 0 {
///         return Err(ProbeMapError::Config("dispatch_threads must be positive".to_string()));
///     }
///     Ok(())
/// }
///
/// assert!(validate_threads(0).is_err());
/// ```
#[derive(Debug, Error)]
pub enum ProbeMapError {
    /// Reading or writing the preference store failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or thread-spawn I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration is invalid or could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The periodic task scheduler is unavailable.
    #[error("Scheduler error: {0}")]
    Scheduler(String),

    /// The event dispatch pool is unavailable.
    #[error("Dispatch error: {0}")]
    Dispatch(String),
}

/// A specialized `Result` type for probemap operations.
pub type Result<T> = std::result::Result<T, ProbeMapError>;
