//! Error types for the exposure engine.
//!
//! The pure calculation stages never fail: missing fields, empty selections
//! and correction-table gaps all resolve to documented defaults. Errors only
//! arise while loading configuration or source tables, while storing a new
//! package, and while validating an incoming request.

use thiserror::Error;

/// The main error type for the exposure engine.
///
/// # Example
///
/// ```
/// use exposure_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/engine.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/engine.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A source table file was missing or unreadable.
    #[error("Source table '{table}' not found at {path}")]
    DataNotFound {
        /// The logical table name (e.g. "kpi").
        table: String,
        /// The file path that was looked up.
        path: String,
    },

    /// A source table file could not be parsed.
    #[error("Failed to parse source table '{table}': {message}")]
    DataParseError {
        /// The logical table name.
        table: String,
        /// A description of the parse error.
        message: String,
    },

    /// The concurrent table load was interrupted before every table arrived.
    #[error("Source table load failed: {message}")]
    DataLoadFailed {
        /// A description of the failure.
        message: String,
    },

    /// A package with the same name is already stored.
    #[error("Package already exists: {name}")]
    PackageExists {
        /// The duplicated package name.
        name: String,
    },

    /// A package could not be stored because its definition is incomplete.
    #[error("Invalid package '{name}': {message}")]
    InvalidPackage {
        /// The package name as supplied.
        name: String,
        /// What made the package invalid.
        message: String,
    },

    /// A report request contained a value outside its domain.
    #[error("Invalid request field '{field}': {message}")]
    InvalidRequest {
        /// The offending field.
        field: String,
        /// What made the field invalid.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
