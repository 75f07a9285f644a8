//! REST handlers for campaigns, weekly allocation edits, summaries,
//! versions, sync, and operational endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use budget_allocation::summary::{self, BudgetSummary, ChannelSummary, ObjectiveSummary};
use budget_core::error::BudgetError;
use budget_core::types::Campaign;
use budget_core::week::WeekKey;
use budget_import::SheetsClient;
use budget_store::{
    AuditLogEntry, CampaignStore, CampaignVersion, CreateCampaignRequest, CreateVersionRequest,
    PersistenceBackend, SyncReport, UpdateCampaignRequest,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;
use uuid::Uuid;

/// Shared application state for REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CampaignStore>,
    pub backend: Arc<dyn PersistenceBackend>,
    pub sheets: Arc<SheetsClient>,
    pub max_import_bytes: u64,
    pub start_time: Instant,
}

/// Builds the application router with every endpoint mounted.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness))
        .route("/live", get(liveness))
        .route(
            "/api/v1/campaigns",
            get(list_campaigns).post(create_campaign),
        )
        .route(
            "/api/v1/campaigns/:id",
            get(get_campaign)
                .put(update_campaign)
                .delete(delete_campaign),
        )
        .route("/api/v1/campaigns/:id/pause", post(pause_campaign))
        .route("/api/v1/campaigns/:id/resume", post(resume_campaign))
        .route(
            "/api/v1/campaigns/:id/weeks/:week/percentage",
            put(set_week_percentage),
        )
        .route(
            "/api/v1/campaigns/:id/weeks/:week/amount",
            put(set_week_amount),
        )
        .route(
            "/api/v1/campaigns/:id/weeks/:week/actual",
            put(set_week_actual),
        )
        .route("/api/v1/campaigns/:id/total-budget", put(set_total_budget))
        .route(
            "/api/v1/campaigns/:id/versions",
            get(list_versions).post(create_version),
        )
        .route("/api/v1/summary", get(overall_summary))
        .route("/api/v1/summary/channels", get(channel_summaries))
        .route("/api/v1/summary/objectives", get(objective_summaries))
        .route("/api/v1/import/csv", post(crate::import_rest::import_csv))
        .route("/api/v1/import/json", post(crate::import_rest::import_json))
        .route(
            "/api/v1/import/paste",
            post(crate::import_rest::import_paste),
        )
        .route(
            "/api/v1/import/sheets",
            post(crate::import_rest::import_sheets),
        )
        .route(
            "/api/v1/templates/csv",
            get(crate::import_rest::download_csv_template),
        )
        .route(
            "/api/v1/templates/json",
            get(crate::import_rest::download_json_template),
        )
        .route("/api/v1/sync", post(run_sync))
        .route("/api/v1/audit-log", get(audit_log))
        .with_state(state)
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Maps a domain error onto a status code and a stable error code.
pub fn reject(err: BudgetError) -> ApiError {
    let (status, code) = match &err {
        BudgetError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        BudgetError::PercentageOverflow { .. } => (StatusCode::BAD_REQUEST, "percentage_overflow"),
        BudgetError::MissingRequiredColumns(_) => {
            (StatusCode::BAD_REQUEST, "missing_required_columns")
        }
        BudgetError::RowProcessing { .. } => (StatusCode::BAD_REQUEST, "row_processing_error"),
        BudgetError::InvalidWeek(_) => (StatusCode::BAD_REQUEST, "invalid_week"),
        BudgetError::CampaignNotFound(_) => (StatusCode::NOT_FOUND, "campaign_not_found"),
        BudgetError::RemoteFetch(_) => (StatusCode::BAD_GATEWAY, "remote_fetch_failed"),
        BudgetError::Serialization(_) | BudgetError::Io(_) | BudgetError::Internal(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    };
    if status.is_client_error() {
        metrics::counter!("api.rejections").increment(1);
    }
    (
        status,
        Json(ErrorResponse {
            error: code.to_string(),
            message: err.to_string(),
        }),
    )
}

fn parse_week(raw: &str) -> Result<WeekKey, ApiError> {
    raw.parse::<WeekKey>().map_err(|e| reject(e.into()))
}

/// Validate a campaign creation request at the API boundary.
fn validate_create(req: &CreateCampaignRequest) -> Result<(), &'static str> {
    if req.campaign_name.trim().is_empty() {
        return Err("campaign 'campaignName' must not be empty");
    }
    if !req.total_budget.is_finite() || req.total_budget < 0.0 {
        return Err("campaign 'totalBudget' must be a non-negative number");
    }
    if req.duration_days == 0 {
        return Err("campaign 'durationDays' must be positive");
    }
    Ok(())
}

// Campaign CRUD

pub async fn list_campaigns(State(state): State<AppState>) -> Json<Vec<Campaign>> {
    Json(state.store.list_campaigns())
}

pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, ApiError> {
    state
        .store
        .get_campaign(id)
        .map(Json)
        .ok_or_else(|| reject(BudgetError::CampaignNotFound(id)))
}

pub async fn create_campaign(
    State(state): State<AppState>,
    Json(req): Json<CreateCampaignRequest>,
) -> Result<(StatusCode, Json<Campaign>), ApiError> {
    if let Err(msg) = validate_create(&req) {
        warn!(campaign = %req.campaign_name, error = msg, "Campaign creation rejected");
        return Err(reject(BudgetError::Validation(msg.to_string())));
    }
    let campaign = state.store.create_campaign(req);
    metrics::counter!("api.campaigns.created").increment(1);
    Ok((StatusCode::CREATED, Json(campaign)))
}

pub async fn update_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCampaignRequest>,
) -> Result<Json<Campaign>, ApiError> {
    state
        .store
        .update_campaign(id, req)
        .map(Json)
        .map_err(reject)
}

pub async fn delete_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.store.delete_campaign(id).map_err(reject)?;
    metrics::counter!("api.campaigns.deleted").increment(1);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn pause_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, ApiError> {
    state.store.pause_campaign(id).map(Json).map_err(reject)
}

pub async fn resume_campaign(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Campaign>, ApiError> {
    state.store.resume_campaign(id).map(Json).map_err(reject)
}

// Weekly allocation edits

/// Body of every single-value edit (percentage, amount, actual, total budget).
#[derive(Debug, Deserialize)]
pub struct ValueRequest {
    pub value: f64,
}

pub async fn set_week_percentage(
    State(state): State<AppState>,
    Path((id, week)): Path<(Uuid, String)>,
    Json(req): Json<ValueRequest>,
) -> Result<Json<Campaign>, ApiError> {
    let week = parse_week(&week)?;
    state
        .store
        .set_week_percentage(id, week, req.value)
        .map(Json)
        .map_err(reject)
}

pub async fn set_week_amount(
    State(state): State<AppState>,
    Path((id, week)): Path<(Uuid, String)>,
    Json(req): Json<ValueRequest>,
) -> Result<Json<Campaign>, ApiError> {
    let week = parse_week(&week)?;
    state
        .store
        .set_week_amount(id, week, req.value)
        .map(Json)
        .map_err(reject)
}

pub async fn set_week_actual(
    State(state): State<AppState>,
    Path((id, week)): Path<(Uuid, String)>,
    Json(req): Json<ValueRequest>,
) -> Result<Json<Campaign>, ApiError> {
    let week = parse_week(&week)?;
    state
        .store
        .set_week_actual(id, week, req.value)
        .map(Json)
        .map_err(reject)
}

pub async fn set_total_budget(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ValueRequest>,
) -> Result<Json<Campaign>, ApiError> {
    state
        .store
        .set_total_budget(id, req.value)
        .map(Json)
        .map_err(reject)
}

// Versions

pub async fn create_version(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateVersionRequest>,
) -> Result<(StatusCode, Json<CampaignVersion>), ApiError> {
    state
        .store
        .create_version(id, req)
        .map(|version| (StatusCode::CREATED, Json(version)))
        .map_err(reject)
}

pub async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<CampaignVersion>>, ApiError> {
    if state.store.get_campaign(id).is_none() {
        return Err(reject(BudgetError::CampaignNotFound(id)));
    }
    Ok(Json(state.store.list_versions(id)))
}

// Summaries

pub async fn overall_summary(State(state): State<AppState>) -> Json<BudgetSummary> {
    Json(summary::budget_summary(&state.store.list_campaigns()))
}

pub async fn channel_summaries(State(state): State<AppState>) -> Json<Vec<ChannelSummary>> {
    Json(summary::channel_summaries(&state.store.list_campaigns()))
}

pub async fn objective_summaries(State(state): State<AppState>) -> Json<Vec<ObjectiveSummary>> {
    Json(summary::objective_summaries(&state.store.list_campaigns()))
}

// Persistence and audit

pub async fn run_sync(State(state): State<AppState>) -> Result<Json<SyncReport>, ApiError> {
    let report = state.store.sync(state.backend.as_ref()).map_err(reject)?;
    if report.performed {
        metrics::counter!("api.sync.runs").increment(1);
    }
    Ok(Json(report))
}

pub async fn audit_log(State(state): State<AppState>) -> Json<Vec<AuditLogEntry>> {
    Json(state.store.audit_log())
}

// Operational endpoints

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub campaigns: usize,
    pub uptime_secs: u64,
}

/// GET /health — Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        campaigns: state.store.count(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /ready — Readiness probe for Kubernetes.
/// The store is in-process, so the service can accept traffic as soon as
/// state exists.
pub async fn readiness(State(state): State<AppState>) -> StatusCode {
    let _ = state.store.count();
    StatusCode::OK
}

/// GET /live — Liveness probe for Kubernetes.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}
