//! Error types shared across the crate.

use std::fmt;
use std::io;

/// The main error type for svscape operations.
#[derive(Debug)]
pub enum SvError {
    /// Error during IO operations (file reading, etc.)
    Io(io::Error),
    /// Input file not in the expected format
    InvalidFormat(String),
    /// A variant carries unusable data (e.g. a malformed breakpoint window)
    InvalidVariantData(String),
    /// Invalid configuration or parameters
    InvalidConfig(String),
}

impl fmt::Display for SvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SvError::Io(err) => write!(f, "IO error: {}", err),
            SvError::InvalidFormat(msg) => write!(f, "Invalid format: {}", msg),
            SvError::InvalidVariantData(msg) => write!(f, "Invalid variant data: {}", msg),
            SvError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for SvError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SvError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SvError {
    fn from(err: io::Error) -> Self {
        SvError::Io(err)
    }
}

/// Result type alias for svscape operations.
pub type SvResult<T> = Result<T, SvError>;
