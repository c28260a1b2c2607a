//! Error types for the Lumen3D engine
//!
//! This module defines the error types used throughout the engine:
//! rejected frustum/camera parameters, operations that are not valid for
//! the current projection, and engine initialization failures.

use std::fmt;

/// Result type for Lumen3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Lumen3D engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A parameter was outside its valid range (near distance, focal length, ...)
    InvalidParameter(String),

    /// The operation is not supported in the current state
    /// (e.g. oblique near clipping on an orthographic frustum)
    UnsupportedOperation(String),

    /// Initialization failed (engine, subsystems)
    InitializationFailed(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            Error::UnsupportedOperation(msg) => write!(f, "Unsupported operation: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Build an `Error::InvalidParameter`, logging it at ERROR severity first.
///
/// # Example
///
/// ```ignore
/// return Err(engine_err!("lumen3d::Frustum", "near must be > 0, got {}", near));
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::lumen3d::Error::InvalidParameter(message)
    }};
}

/// Log and return an `Error::InvalidParameter` from the current function.
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
