//! Error types for the Grid3D engine
//!
//! Configuration problems are the only hard failures in the engine.
//! Lookup misses (unknown entity, unknown node ID, out-of-bounds
//! position) are reported through `bool` / `Option` / empty results
//! and never reach this type.

use std::fmt;

/// Result type for Grid3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Grid3D engine errors
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// A configuration value is out of range (non-positive cell size, zero cells, ...)
    InvalidConfiguration(String),

    /// A required object (node, entity) does not exist
    NotFound(String),

    /// The operation is not allowed in the current state (e.g. world already shut down)
    InvalidState(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidConfiguration(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::NotFound(msg) => write!(f, "Not found: {}", msg),
            Error::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

// ===== ERROR MACROS =====

/// Log an ERROR and build an `Error::InvalidState` from the same message.
///
/// # Example
///
/// ```ignore
/// let err = engine_err!("grid3d::World", "World has been shut down");
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::grid3d::Error::InvalidState(message)
    }};
}

/// Log an ERROR and build an `Error::InvalidConfiguration`.
#[macro_export]
macro_rules! engine_config_err {
    ($source:expr, $($arg:tt)*) => {{
        let message = format!($($arg)*);
        $crate::engine_error!($source, "{}", message);
        $crate::grid3d::Error::InvalidConfiguration(message)
    }};
}

/// Log an ERROR and return early with `Error::InvalidState`.
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
