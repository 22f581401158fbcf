//! Error types for coverage_navigation

use std::fmt;

/// Main error type for coverage generation and waypoint navigation
#[derive(Debug)]
pub enum CoverageError {
    /// Invalid parameter (cell size, curve order, resolution, ...)
    InvalidParameter(String),
    /// Navigation task could not be submitted or did not report a result
    NavigationError(String),
    /// Mission configuration could not be parsed
    ConfigError(String),
    /// I/O error
    IoError(std::io::Error),
    /// Visualization error
    VisualizationError(String),
}

impl fmt::Display for CoverageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoverageError::InvalidParameter(msg) => write!(f, "Invalid parameter: {}", msg),
            CoverageError::NavigationError(msg) => write!(f, "Navigation error: {}", msg),
            CoverageError::ConfigError(msg) => write!(f, "Config error: {}", msg),
            CoverageError::IoError(e) => write!(f, "I/O error: {}", e),
            CoverageError::VisualizationError(msg) => write!(f, "Visualization error: {}", msg),
        }
    }
}

impl std::error::Error for CoverageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CoverageError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for CoverageError {
    fn from(e: std::io::Error) -> Self {
        CoverageError::IoError(e)
    }
}

impl From<toml::de::Error> for CoverageError {
    fn from(e: toml::de::Error) -> Self {
        CoverageError::ConfigError(e.to_string())
    }
}

/// Result type alias for coverage operations
pub type CoverageResult<T> = Result<T, CoverageError>;
