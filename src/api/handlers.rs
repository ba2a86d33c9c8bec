//! REST API handlers for warehouse assignment and delivery estimates
//!
//! These handlers use the shared LogisticsService.

use axum::{
    body::Bytes,
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Form, Json,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, warn};

use super::service::LogisticsService;
use crate::error::LogisticsError;
use crate::logistics::Shipment;
use crate::models::{PestPrediction, RouteEstimate, WarehouseLocation};
use crate::pests::{allowed_file, UploadKind};
use crate::pipeline::BatchAssignment;

/// Multipart field carrying the inventory CSV
pub const INVENTORY_FIELD: &str = "inventory_file";

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct AssignmentSummary {
    pub rows_in: usize,
    pub rows_matched: usize,
    pub rows_dropped: usize,
    pub threshold: Option<f64>,
    pub counts: BTreeMap<String, usize>,
    pub processed_at: String,
}

#[derive(Serialize)]
pub struct AssignmentResponse {
    pub show_prediction: bool,
    pub warehouses: Vec<WarehouseLocation>,
    pub summary: AssignmentSummary,
}

impl From<BatchAssignment> for AssignmentResponse {
    fn from(b: BatchAssignment) -> Self {
        Self {
            show_prediction: b.show_prediction,
            warehouses: b.warehouses,
            summary: AssignmentSummary {
                rows_in: b.rows_in,
                rows_matched: b.rows_matched,
                rows_dropped: b.rows_dropped,
                threshold: b.threshold,
                counts: b.counts.into_iter().collect(),
                processed_at: b.processed_at.to_rfc3339(),
            },
        }
    }
}

#[derive(Serialize)]
pub struct RemedyResponse {
    pub pest_type: String,
    pub remedy: String,
}

#[derive(Serialize)]
pub struct ClassifyResponse {
    pub prediction: PestPrediction,
    pub remedy: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct LogisticsForm {
    pub delivery_district: Option<String>,
    pub product_quantity: Option<String>,
    pub product_weight: Option<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<LogisticsService>;

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(ErrorResponse { error: message.into() }))
}

impl From<LogisticsError> for (StatusCode, Json<ErrorResponse>) {
    fn from(e: LogisticsError) -> Self {
        let status = match &e {
            LogisticsError::Validation(_) => StatusCode::BAD_REQUEST,
            LogisticsError::Classifier(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("Request failed: {}", e);
        }
        api_error(status, e.to_string())
    }
}

/// GET /api/v1/health
pub async fn health(State(service): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "model_loaded": service.has_model(),
    }))
}

/// GET /api/v1/districts
pub async fn get_districts(State(service): State<AppState>) -> Json<Vec<String>> {
    Json(service.districts())
}

/// GET /api/v1/warehouses/candidates
pub async fn get_candidates(
    State(service): State<AppState>,
) -> Result<Json<Vec<WarehouseLocation>>, ApiError> {
    Ok(Json(service.candidates()?))
}

/// POST /api/v1/warehouses/assign (multipart, field `inventory_file`)
pub async fn assign_warehouses(
    State(service): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AssignmentResponse>, ApiError> {
    let mut upload: Option<Bytes> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some(INVENTORY_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(api_error(StatusCode::BAD_REQUEST, "No selected file"));
        }
        if !allowed_file(&filename, UploadKind::Table) {
            warn!("Rejected inventory upload '{}'", filename);
            return Err(api_error(
                StatusCode::BAD_REQUEST,
                format!("Unsupported file type: {}", filename),
            ));
        }
        let data = field
            .bytes()
            .await
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e.to_string()))?;
        upload = Some(data);
        break;
    }

    let upload = upload.ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "No file part"))?;
    let result = service.assign_inventory(&upload)?;
    Ok(Json(AssignmentResponse::from(result)))
}

/// POST /api/v1/logistics (form: delivery_district, product_quantity, product_weight)
pub async fn estimate_delivery(
    State(service): State<AppState>,
    Form(form): Form<LogisticsForm>,
) -> Result<Json<RouteEstimate>, ApiError> {
    let district = form
        .delivery_district
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "delivery_district is required"))?;

    let shipment = Shipment::parse(
        form.product_quantity.as_deref().unwrap_or("0"),
        form.product_weight.as_deref().unwrap_or("0"),
    )?;

    Ok(Json(service.estimate(district, shipment)?))
}

/// GET /api/v1/pests/:pest/remedy
pub async fn get_remedy(
    State(service): State<AppState>,
    Path(pest): Path<String>,
) -> Json<RemedyResponse> {
    let remedy = service.remedy(&pest).to_string();
    Json(RemedyResponse {
        pest_type: pest,
        remedy,
    })
}

/// POST /api/v1/pests/classify (raw image body)
pub async fn classify_pest(
    State(service): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ClassifyResponse>, ApiError> {
    if service.classifier().is_none() {
        return Err(api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Pest classifier is not configured",
        ));
    }
    if body.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "No image supplied"));
    }
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");

    let prediction = service.classify(body.to_vec(), content_type).await?;
    let remedy = service.remedy(&prediction.pest_type).to_string();
    Ok(Json(ClassifyResponse { prediction, remedy }))
}
