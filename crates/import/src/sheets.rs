//! Google Sheets import: fetches a range through the public values API
//! and hands the raw grid to the tabular pipeline.

use budget_core::config::SheetsConfig;
use budget_core::error::{BudgetError, BudgetResult};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Spreadsheet ids are long URL-safe tokens; anything shorter is part of
/// the surrounding URL.
const MIN_SPREADSHEET_ID_LEN: usize = 25;

/// Client for the Google Sheets values API.
#[derive(Debug, Clone)]
pub struct SheetsClient {
    http: reqwest::Client,
    api_key: String,
    range: String,
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl SheetsClient {
    pub fn new(config: &SheetsConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            http,
            api_key: config.api_key.clone(),
            range: config.range.clone(),
        }
    }

    /// Fetches the raw cell grid for a spreadsheet URL or bare id.
    ///
    /// The configured range applies unless the caller overrides it. The
    /// first row of the result is the header row; a sheet with no data
    /// rows is an error, not an empty import.
    pub async fn fetch_rows(
        &self,
        source: &str,
        range_override: Option<&str>,
    ) -> BudgetResult<Vec<Vec<String>>> {
        let spreadsheet_id = extract_spreadsheet_id(source).ok_or_else(|| {
            BudgetError::RemoteFetch(
                "no spreadsheet id found in the given URL".to_string(),
            )
        })?;
        if self.api_key.trim().is_empty() {
            return Err(BudgetError::RemoteFetch(
                "Google Sheets API key is not configured; set BUDGET_PILOT__SHEETS__API_KEY"
                    .to_string(),
            ));
        }

        let range = range_override.unwrap_or(&self.range);
        let url = format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{spreadsheet_id}/values/{range}?key={key}",
            key = self.api_key
        );
        debug!(spreadsheet_id, range, "Fetching Google Sheets range");

        let response = self.http.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                BudgetError::RemoteFetch("the Google Sheets request timed out".to_string())
            } else {
                BudgetError::RemoteFetch(format!("request failed: {e}"))
            }
        })?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Google Sheets API returned an error");
            return Err(BudgetError::RemoteFetch(status_message(status.as_u16())));
        }

        let body: ValuesResponse = response
            .json()
            .await
            .map_err(|e| BudgetError::RemoteFetch(format!("invalid response body: {e}")))?;
        if body.values.is_empty() {
            return Err(BudgetError::RemoteFetch(
                "no data found in the requested range".to_string(),
            ));
        }
        if body.values.len() == 1 {
            return Err(BudgetError::RemoteFetch(
                "the sheet contains only a header row and no data".to_string(),
            ));
        }
        Ok(values_to_rows(body.values))
    }
}

fn status_message(status: u16) -> String {
    match status {
        403 => "access denied; share the document publicly and check the API key".to_string(),
        404 => "spreadsheet or tab not found; check the URL and the sheet name".to_string(),
        400 => "invalid request; check the range format, e.g. Sheet1!A1:Z1000".to_string(),
        other => format!("Google Sheets API returned status {other}"),
    }
}

/// Extracts the spreadsheet id: the first run of 25 or more URL-safe id
/// characters in the source. Accepts a full URL or a bare id.
pub fn extract_spreadsheet_id(source: &str) -> Option<&str> {
    let mut start = None;
    for (idx, ch) in source.char_indices() {
        let is_id_char = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_';
        match (is_id_char, start) {
            (true, None) => start = Some(idx),
            (false, Some(begin)) => {
                if idx - begin >= MIN_SPREADSHEET_ID_LEN {
                    return Some(&source[begin..idx]);
                }
                start = None;
            }
            _ => {}
        }
    }
    match start {
        Some(begin) if source.len() - begin >= MIN_SPREADSHEET_ID_LEN => Some(&source[begin..]),
        _ => None,
    }
}

/// Sheets cells arrive as JSON strings, numbers, or booleans depending
/// on the render option; everything becomes a plain cell string.
fn values_to_rows(values: Vec<Vec<serde_json::Value>>) -> Vec<Vec<String>> {
    values
        .into_iter()
        .map(|row| {
            row.into_iter()
                .map(|cell| match cell {
                    serde_json::Value::String(s) => s,
                    serde_json::Value::Number(n) => n.to_string(),
                    serde_json::Value::Bool(b) => b.to_string(),
                    _ => String::new(),
                })
                .collect()
        })
        .collect()
}
