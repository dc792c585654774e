//! HTTP API module for the exposure engine.
//!
//! This module provides the REST API endpoints for building exposure
//! reports, listing months and packages, and storing new packages.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{ContextRequest, ContextTypesRequest, CreatePackageRequest, ReportRequest};
pub use response::{
    ApiError, ApiErrorResponse, HealthResponse, MonthsResponse, PackageCreatedResponse,
    PackagesResponse,
};
pub use state::AppState;
