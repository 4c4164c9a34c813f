// SWIFT Registry - REST API
// Handlers, error-to-status mapping and the router

use crate::error::{ErrorKind, RegistryError};
use crate::projection::{CountryView, SwiftCodeView};
use crate::service::{MessageResponse, SwiftCodeService};
use crate::validation::SwiftCodeRequest;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub const INTERNAL_ERROR_MESSAGE: &str = "An internal server error occurred. Please try again later.";

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: SwiftCodeService,
}

/// Error body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

// ============================================================================
// Error Handling
// ============================================================================

pub struct ApiError(pub StatusCode, pub Json<ErrorResponse>);

impl ApiError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        ApiError(status, Json(ErrorResponse { message: msg.into() }))
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }
}

impl From<RegistryError> for ApiError {
    fn from(e: RegistryError) -> Self {
        let status = match e.kind() {
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::InconsistentData | ErrorKind::ValidationFailed => StatusCode::BAD_REQUEST,
            ErrorKind::Internal => {
                tracing::error!("An unexpected error occurred processing the request: {}", e);
                return Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE);
            }
        };

        Self::new(status, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::warn!("Rejected request body: {}", rejection.body_text());
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                Self::new(StatusCode::UNSUPPORTED_MEDIA_TYPE, "Unsupported Media Type.")
            }
            _ => Self::bad_request("Request body is missing or malformed."),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /v1/swift-codes/:swift_code
pub async fn get_swift_code(
    State(state): State<AppState>,
    Path(swift_code): Path<String>,
) -> Result<Json<SwiftCodeView>, ApiError> {
    tracing::info!("Received request to get details for SWIFT code: {}", swift_code);
    let view = state.service.get_details(&swift_code)?;
    Ok(Json(view))
}

/// GET /v1/swift-codes/country/:country_iso2
pub async fn get_country(
    State(state): State<AppState>,
    Path(country_iso2): Path<String>,
) -> Result<Json<CountryView>, ApiError> {
    tracing::info!("Received request to get details by country with ISO2 code {}", country_iso2);
    let view = state.service.get_by_country(&country_iso2)?;
    Ok(Json(view))
}

/// POST /v1/swift-codes
pub async fn add_swift_code(
    State(state): State<AppState>,
    payload: Result<Json<SwiftCodeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<MessageResponse>), ApiError> {
    let Json(request) = payload?;
    tracing::info!("Received POST request to add SWIFT code: {}", request.swift_code);

    let ack = state.service.add(&request)?;
    Ok((StatusCode::CREATED, Json(ack)))
}

/// DELETE /v1/swift-codes/:swift_code
pub async fn delete_swift_code(
    State(state): State<AppState>,
    Path(swift_code): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    tracing::info!("Received DELETE request for SWIFT code: {}", swift_code);
    let ack = state.service.delete(&swift_code)?;
    Ok(Json(ack))
}

async fn fallback(uri: Uri) -> ApiError {
    tracing::warn!("No handler found for {}", uri);
    ApiError::not_found(format!(
        "The requested resource path '{}' could not be found on this server.",
        uri.path()
    ))
}

// ============================================================================
// Router
// ============================================================================

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/swift-codes", post(add_swift_code))
        .route("/v1/swift-codes/country/:country_iso2", get(get_country))
        .route(
            "/v1/swift-codes/:swift_code",
            get(get_swift_code).delete(delete_swift_code),
        )
        .fallback(fallback)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
