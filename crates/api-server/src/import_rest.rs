//! Import endpoints: file uploads, pasted grids, Google Sheets ranges,
//! and template downloads.

use crate::rest::{reject, ApiError, AppState};
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use budget_core::error::BudgetError;
use budget_import::{parse_csv, parse_json, parse_rows, ImportReport, RowFailure};
use budget_import::{template, validate};
use serde::{Deserialize, Serialize};
use tracing::info;

/// Body of a file upload. The UI reads the file client-side and ships
/// its text content.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileImportRequest {
    pub filename: String,
    pub content: String,
    /// When true the batch merges into the existing collection instead
    /// of replacing it.
    #[serde(default)]
    pub merge: bool,
}

#[derive(Debug, Deserialize)]
pub struct PasteImportRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SheetsImportRequest {
    /// Spreadsheet URL or bare spreadsheet id.
    pub source: String,
    /// Optional A1-notation range overriding the configured one.
    #[serde(default)]
    pub range: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportResponse {
    pub total_rows: usize,
    /// Rows that parsed into campaigns, duplicates included.
    pub imported: usize,
    pub added: usize,
    pub skipped_duplicates: usize,
    pub adjusted_rows: usize,
    pub failures: Vec<RowFailure>,
}

/// Commits a parsed batch to the store, replacing or merging per the
/// request, and reports the outcome.
fn commit(state: &AppState, report: ImportReport, merge: bool) -> ImportResponse {
    let ImportReport {
        campaigns,
        total_rows,
        adjusted_rows,
        failures,
    } = report;
    let imported = campaigns.len();
    let merged = if merge {
        state.store.merge_import(campaigns)
    } else {
        state.store.replace_with_import(campaigns)
    };
    metrics::counter!("api.imports").increment(1);
    info!(
        total_rows,
        imported,
        added = merged.added,
        skipped = merged.skipped_duplicates,
        merge,
        "Import committed"
    );
    ImportResponse {
        total_rows,
        imported,
        added: merged.added,
        skipped_duplicates: merged.skipped_duplicates,
        adjusted_rows,
        failures,
    }
}

/// POST /api/v1/import/csv — CSV file upload. A fresh upload replaces
/// the collection unless `merge` is set.
pub async fn import_csv(
    State(state): State<AppState>,
    Json(req): Json<FileImportRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    validate::validate_file(
        &req.filename,
        req.content.len(),
        state.max_import_bytes as usize,
    )
    .map_err(reject)?;
    let report = parse_csv(&req.content).map_err(reject)?;
    Ok(Json(commit(&state, report, req.merge)))
}

/// POST /api/v1/import/json — JSON document upload.
pub async fn import_json(
    State(state): State<AppState>,
    Json(req): Json<FileImportRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    validate::validate_file(
        &req.filename,
        req.content.len(),
        state.max_import_bytes as usize,
    )
    .map_err(reject)?;
    let report = parse_json(&req.content).map_err(reject)?;
    Ok(Json(commit(&state, report, req.merge)))
}

/// POST /api/v1/import/paste — a grid pasted from a spreadsheet. Pasted
/// rows always merge; pasting is an additive gesture.
pub async fn import_paste(
    State(state): State<AppState>,
    Json(req): Json<PasteImportRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    if req.content.trim().is_empty() {
        return Err(reject(BudgetError::Validation(
            "pasted content is empty".to_string(),
        )));
    }
    let report = parse_csv(&req.content).map_err(reject)?;
    Ok(Json(commit(&state, report, true)))
}

/// POST /api/v1/import/sheets — import a Google Sheets range. Remote
/// rows always merge.
pub async fn import_sheets(
    State(state): State<AppState>,
    Json(req): Json<SheetsImportRequest>,
) -> Result<Json<ImportResponse>, ApiError> {
    let rows = state
        .sheets
        .fetch_rows(&req.source, req.range.as_deref())
        .await
        .map_err(reject)?;
    let report = parse_rows(rows).map_err(reject)?;
    Ok(Json(commit(&state, report, true)))
}

/// GET /api/v1/templates/csv — downloadable CSV template.
pub async fn download_csv_template() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    template::CSV_TEMPLATE_FILENAME
                ),
            ),
        ],
        template::csv_template(),
    )
}

/// GET /api/v1/templates/json — downloadable JSON template.
pub async fn download_json_template() -> impl IntoResponse {
    (
        [
            (
                header::CONTENT_TYPE,
                "application/json; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!(
                    "attachment; filename=\"{}\"",
                    template::JSON_TEMPLATE_FILENAME
                ),
            ),
        ],
        template::json_template(),
    )
}
