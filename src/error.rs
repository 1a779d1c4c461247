//! Error types for the realtime analysis engine

use std::fmt;

/// Errors that can occur at the engine boundary
///
/// Steady-state analysis is total: every DSP stage accepts any valid frame
/// and expresses degenerate inputs (silence, missing bass peak) through its
/// outputs rather than through errors. The only failure surfaces are
/// construction-time configuration validation and per-tick frame validation.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Configuration rejected at construction time
    InvalidConfig {
        /// Name of the offending configuration field
        field: &'static str,
        /// Why the value was rejected
        message: String,
    },

    /// Frame rejected before analysis (length change without reset, bad sample rate)
    InvalidFrame(String),

    /// Timeline event index out of range
    InvalidEvent(usize),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidConfig { field, message } => {
                write!(f, "Invalid config `{}`: {}", field, message)
            }
            EngineError::InvalidFrame(msg) => write!(f, "Invalid frame: {}", msg),
            EngineError::InvalidEvent(index) => {
                write!(f, "Invalid timeline event index: {}", index)
            }
        }
    }
}

impl std::error::Error for EngineError {}
