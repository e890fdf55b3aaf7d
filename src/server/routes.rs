//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::error::Error;
use crate::geocode::{GeocodeResult, ReverseGeocoder};
use crate::geometry::{self, encode_ewkb_hex, encode_ewkt, ByteOrder, GeometryWireValue, Point};
use crate::picker::PickerSnapshot;
use crate::server::state::{AppState, DEFAULT_SESSION};

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/geometry/decode", post(decode_handler))
        .route("/api/geometry/encode", post(encode_handler))
        .route("/api/geocode", get(geocode_handler))
        .route("/api/picker", get(picker_handler).delete(picker_clear_handler))
        .route("/api/picker/click", post(picker_click_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = match self.code.as_str() {
            "PICKER_ERROR" => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::BAD_REQUEST,
        };
        (status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidCoordinates(_) => "INVALID_COORDINATES",
            Error::Geometry(_) => "DECODE_FAILED",
            Error::Picker(_) => "PICKER_ERROR",
            Error::Config(_) => "CONFIG_ERROR",
            _ => "INTERNAL_ERROR",
        };
        ApiError {
            error: err.to_string(),
            code: code.to_string(),
        }
    }
}

/// Status response
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub version: String,
    /// Geocoding backend name
    pub geocoder: String,
    /// Whether an access token is available to the geocoder
    pub geocoder_configured: bool,
}

/// Server status endpoint
///
/// GET /api/status
async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        running: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
        geocoder: state.geocoder.name().to_string(),
        geocoder_configured: state.geocoder.has_token(),
    })
}

/// Decode request body
#[derive(Debug, Deserialize)]
pub struct DecodeRequest {
    /// Stored geometry value, text or hex
    pub wire: String,
}

/// Decoded geometry
#[derive(Debug, Serialize, Deserialize)]
pub struct DecodeResponse {
    pub point: Point,
    /// "text" or "binary"
    pub form: String,
}

/// Decode a stored geometry value
///
/// POST /api/geometry/decode
async fn decode_handler(Json(req): Json<DecodeRequest>) -> Result<Json<DecodeResponse>, ApiError> {
    let wire = GeometryWireValue::classify(&req.wire);
    let point = geometry::decode(&req.wire).map_err(|e| ApiError::from(Error::from(e)))?;

    Ok(Json(DecodeResponse {
        point,
        form: wire.form().to_string(),
    }))
}

/// Encode request body
#[derive(Debug, Deserialize)]
pub struct EncodeRequest {
    pub lng: f64,
    pub lat: f64,
    /// Emit hex EWKB instead of text
    #[serde(default)]
    pub binary: bool,
    /// Spatial reference id to embed
    #[serde(default)]
    pub srid: Option<u32>,
    /// Byte order for binary output
    #[serde(default)]
    pub byte_order: ByteOrder,
}

/// Encoded geometry
#[derive(Debug, Serialize, Deserialize)]
pub struct EncodeResponse {
    pub wire: String,
}

/// Encode a point for storage
///
/// POST /api/geometry/encode
async fn encode_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EncodeRequest>,
) -> Result<Json<EncodeResponse>, ApiError> {
    let point = Point::new(req.lng, req.lat).map_err(ApiError::from)?;

    let wire = match (req.binary, req.srid) {
        (true, srid) => encode_ewkb_hex(&point, req.byte_order, srid),
        (false, Some(srid)) => encode_ewkt(&point, srid),
        (false, None) => geometry::encode_with_precision(&point, state.precision().await),
    };

    Ok(Json(EncodeResponse { wire }))
}

/// Coordinate query parameters
#[derive(Debug, Deserialize)]
pub struct CoordinateQuery {
    pub lng: f64,
    pub lat: f64,
}

/// Reverse geocode a coordinate
///
/// GET /api/geocode?lng=..&lat=..
async fn geocode_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CoordinateQuery>,
) -> Result<Json<GeocodeResult>, ApiError> {
    let point = Point::new(query.lng, query.lat).map_err(ApiError::from)?;
    Ok(Json(state.geocoder.reverse_geocode(point).await))
}

/// Click request body
#[derive(Debug, Deserialize)]
pub struct ClickRequest {
    pub lng: f64,
    pub lat: f64,
}

/// Click outcome
#[derive(Debug, Serialize, Deserialize)]
pub struct ClickResponse {
    /// False when the coordinate was out of range and ignored
    pub accepted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
}

/// Which form's picker a request addresses
///
/// Every map form passes its own `session` so that concurrent operators
/// never supersede each other's lookups. Omitting it selects a shared
/// default session.
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(default = "default_session")]
    pub session: String,
}

fn default_session() -> String {
    DEFAULT_SESSION.to_string()
}

/// Deliver a map click to the session's picker
///
/// POST /api/picker/click?session=...
async fn picker_click_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
    Json(req): Json<ClickRequest>,
) -> Result<Json<ClickResponse>, ApiError> {
    let sequence = state
        .picker(&query.session)
        .await
        .click(req.lng, req.lat)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(ClickResponse {
        accepted: sequence.is_some(),
        sequence,
    }))
}

/// Current picker state and selection; idle for unknown sessions
///
/// GET /api/picker?session=...
async fn picker_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Json<PickerSnapshot> {
    let snapshot = match state.existing_picker(&query.session).await {
        Some(picker) => picker.snapshot(),
        None => PickerSnapshot::default(),
    };
    Json(snapshot)
}

/// Discard the session's selection and stop its picker
///
/// Called when the owning form saves or unmounts.
///
/// DELETE /api/picker?session=...
async fn picker_clear_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SessionQuery>,
) -> Result<StatusCode, ApiError> {
    state
        .close_picker(&query.session)
        .await
        .map_err(ApiError::from)?;
    Ok(StatusCode::NO_CONTENT)
}
