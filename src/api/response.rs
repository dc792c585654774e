//! Response types for the exposure engine API.
//!
//! This module defines the error response structures, the mapping from
//! engine errors to HTTP statuses, and the small listing bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::PackageType;

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::ConfigNotFound { path } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration error",
                    format!("Configuration file not found: {}", path),
                ),
            },
            EngineError::ConfigParseError { path, message } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details(
                    "CONFIG_ERROR",
                    "Configuration parse error",
                    format!("Failed to parse {}: {}", path, message),
                ),
            },
            error @ (EngineError::DataNotFound { .. }
            | EngineError::DataParseError { .. }
            | EngineError::DataLoadFailed { .. }) => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::with_details("DATA_ERROR", "Source data error", error.to_string()),
            },
            EngineError::PackageExists { name } => ApiErrorResponse {
                status: StatusCode::CONFLICT,
                error: ApiError::with_details(
                    "PACKAGE_EXISTS",
                    format!("Package already exists: {}", name),
                    "Choose a different package name",
                ),
            },
            EngineError::InvalidPackage { name, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "INVALID_PACKAGE",
                    format!("Invalid package '{}': {}", name, message),
                    "The package definition is incomplete",
                ),
            },
            EngineError::InvalidRequest { field, message } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "VALIDATION_ERROR",
                    format!("Invalid request field '{}': {}", field, message),
                    format!("Check the '{}' field of the request", field),
                ),
            },
        }
    }
}

/// Body of `GET /months`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthsResponse {
    /// Distinct months, most recent first.
    pub months: Vec<String>,
}

/// Body of `GET /packages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackagesResponse {
    /// The synthetic all-unit options followed by stored package names.
    pub packages: Vec<String>,
}

/// Body of a successful `POST /packages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageCreatedResponse {
    /// Stored package name.
    pub name: String,
    /// Stored package type.
    pub package_type: PackageType,
    /// Number of memberships stored.
    pub unit_count: usize,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "ok" when the server answers.
    pub status: String,
    /// Engine version.
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_serialization() {
        let error = ApiError::new("TEST_ERROR", "Test message");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"code\":\"TEST_ERROR\""));
        assert!(json.contains("\"message\":\"Test message\""));
        assert!(!json.contains("details"));
    }

    #[test]
    fn test_package_exists_maps_to_conflict() {
        let api_error: ApiErrorResponse = EngineError::PackageExists {
            name: "강남D".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::CONFLICT);
        assert_eq!(api_error.error.code, "PACKAGE_EXISTS");
    }

    #[test]
    fn test_invalid_request_maps_to_bad_request() {
        let api_error: ApiErrorResponse = EngineError::InvalidRequest {
            field: "age".to_string(),
            message: "age must be between 0 and 7".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::BAD_REQUEST);
        assert!(api_error.error.message.contains("age"));
    }

    #[test]
    fn test_data_errors_map_to_internal_error() {
        let api_error: ApiErrorResponse = EngineError::DataLoadFailed {
            message: "task panicked".to_string(),
        }
        .into();
        assert_eq!(api_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(api_error.error.code, "DATA_ERROR");
        assert!(api_error.error.details.unwrap().contains("task panicked"));
    }
}
