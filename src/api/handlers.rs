//! HTTP request handlers for the exposure engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::calculation::{
    build_report, context_types, found_unit_ids, package_options, parse_custom_ids,
};
use crate::error::EngineError;

use super::request::{ContextTypesRequest, CreatePackageRequest, ReportRequest};
use super::response::{
    ApiError, ApiErrorResponse, HealthResponse, MonthsResponse, PackageCreatedResponse,
    PackagesResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/report", post(report_handler))
        .route("/context-types", post(context_types_handler))
        .route("/months", get(months_handler))
        .route("/packages", get(packages_handler).post(create_package_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Handler for POST /report endpoint.
///
/// Resolves the requested selection and returns the full exposure report.
/// An empty selection is still a 200 with a `no_data` status.
async fn report_handler(
    State(state): State<AppState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing report request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let (query, options) = match request.into_query(state.config().config().defaults()) {
        Ok(parts) => parts,
        Err(err) => return error_response(err, correlation_id),
    };

    let start_time = Instant::now();
    // The read guard lives only for the synchronous build; appends wait on it.
    let report = {
        let packages = state.packages();
        build_report(
            state.dataset(),
            &packages,
            state.config().named_weights(),
            &query,
            &options,
        )
    };

    info!(
        correlation_id = %correlation_id,
        report_id = %report.report_id,
        month = %report.month,
        context = %report.selection.context,
        units = report.full_selection.unit_count,
        displayed = report.displayed.unit_count,
        total_reach = report.displayed.total_reach,
        warnings = report.audit_trace.warnings.len(),
        duration_us = start_time.elapsed().as_micros() as u64,
        "Report completed successfully"
    );

    json_response(StatusCode::OK, &report)
}

/// Handler for POST /context-types endpoint.
async fn context_types_handler(
    State(state): State<AppState>,
    payload: Result<Json<ContextTypesRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let context = match request.context.into_context() {
        Ok(context) => context,
        Err(err) => return error_response(err, correlation_id),
    };

    let packages = state.packages();
    let types = context_types(state.dataset(), &packages, request.month.trim(), &context);
    json_response(StatusCode::OK, &types)
}

/// Handler for GET /months endpoint.
async fn months_handler(State(state): State<AppState>) -> Response {
    json_response(
        StatusCode::OK,
        &MonthsResponse {
            months: state.dataset().months(),
        },
    )
}

/// Handler for GET /packages endpoint.
async fn packages_handler(State(state): State<AppState>) -> Response {
    let packages = package_options(&state.packages());
    json_response(StatusCode::OK, &PackagesResponse { packages })
}

/// Handler for POST /packages endpoint.
///
/// Stores a new named package from the ids that exist in the given month.
/// 201 on success, 409 when the name exists, 400 when no id is found.
async fn create_package_handler(
    State(state): State<AppState>,
    payload: Result<Json<CreatePackageRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing package request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return rejection_response(rejection, correlation_id),
    };

    let month = request.month.trim();
    if month.is_empty() {
        return error_response(
            EngineError::InvalidRequest {
                field: "month".to_string(),
                message: "month must not be empty".to_string(),
            },
            correlation_id,
        );
    }

    let requested = parse_custom_ids(&request.ids);
    let found = found_unit_ids(state.dataset(), month, &requested);
    if found.is_empty() && !requested.is_empty() {
        return error_response(
            EngineError::InvalidPackage {
                name: request.name.trim().to_string(),
                message: format!("none of the entered ids exist in {}", month),
            },
            correlation_id,
        );
    }
    if found.len() < requested.len() {
        info!(
            correlation_id = %correlation_id,
            requested = requested.len(),
            found = found.len(),
            "Dropping ids without data for the month"
        );
    }

    let stored = state
        .packages_mut()
        .append(&request.name, request.package_type, &found);

    match stored {
        Ok(unit_count) => json_response(
            StatusCode::CREATED,
            &PackageCreatedResponse {
                name: request.name.trim().to_string(),
                package_type: request.package_type,
                unit_count,
            },
        ),
        Err(err) => error_response(err, correlation_id),
    }
}

/// Handler for GET /health endpoint.
async fn health_handler(State(state): State<AppState>) -> Response {
    json_response(
        StatusCode::OK,
        &HealthResponse {
            status: "ok".to_string(),
            version: state.config().metadata().version.clone(),
        },
    )
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(err: EngineError, correlation_id: Uuid) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %err,
        "Request failed"
    );
    let api_error: ApiErrorResponse = err.into();
    json_response(api_error.status, &api_error.error)
}

/// Converts a JSON extraction failure into a 400 response.
fn rejection_response(rejection: JsonRejection, correlation_id: Uuid) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            ApiError::validation_error(body_text)
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, &error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::data::DatasetLoader;
    use crate::models::{ExposureReport, ReportStatus};
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    async fn create_test_state() -> AppState {
        let config = ConfigLoader::load("./config/default").expect("Failed to load config");
        let tables = DatasetLoader::load("./data/sample")
            .await
            .expect("Failed to load data");
        AppState::new(config, tables)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_report_returns_200_with_json() {
        let router = create_router(create_test_state().await);

        let response = router
            .oneshot(post_json(
                "/report",
                r#"{"month":"202501","context":{"kind":"all_poster"}}"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response.headers().get("content-type").unwrap();
        assert_eq!(content_type, "application/json");

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let report: ExposureReport = serde_json::from_slice(&body).unwrap();
        assert_eq!(report.status, ReportStatus::Ok);
        assert_eq!(report.full_selection.unit_count, 5);
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let router = create_router(create_test_state().await);

        let response = router
            .oneshot(post_json("/report", "{invalid json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_month_returns_validation_error() {
        let router = create_router(create_test_state().await);

        let response = router
            .oneshot(post_json("/report", r#"{"context":{"kind":"all_poster"}}"#))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(error.message.contains("month"));
    }

    #[tokio::test]
    async fn test_health_reports_version() {
        let router = create_router(create_test_state().await);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, "0.1.0");
    }
}
