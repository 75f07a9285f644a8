//! Store domain types — campaign requests, version snapshots, audit log.

use budget_core::types::{
    Campaign, MarketingObjective, MediaChannel, DEFAULT_AUDIENCE,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Campaign requests ─────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignRequest {
    pub campaign_name: String,
    #[serde(default)]
    pub media_channel: MediaChannel,
    #[serde(default)]
    pub marketing_objective: MarketingObjective,
    #[serde(default = "default_audience")]
    pub target_audience: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub total_budget: f64,
    #[serde(default = "default_duration_days")]
    pub duration_days: u32,
}

fn default_audience() -> String {
    DEFAULT_AUDIENCE.to_string()
}

fn default_duration_days() -> u32 {
    30
}

/// Scalar field updates. The total budget is deliberately absent: it
/// moves through its own operation, which rebalances the weekly amounts.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCampaignRequest {
    pub campaign_name: Option<String>,
    pub media_channel: Option<MediaChannel>,
    pub marketing_objective: Option<MarketingObjective>,
    pub target_audience: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub duration_days: Option<u32>,
}

// ─── Versions ──────────────────────────────────────────────────────────────

/// A named point-in-time snapshot of one campaign.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CampaignVersion {
    pub id: Uuid,
    pub campaign_id: Uuid,
    pub version_name: String,
    pub version_notes: Option<String>,
    pub snapshot: Campaign,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVersionRequest {
    pub version_name: String,
    #[serde(default)]
    pub version_notes: Option<String>,
}

// ─── Audit log ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: Uuid,
    pub action: AuditAction,
    pub resource_type: String,
    pub resource_id: String,
    pub details: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Delete,
    Pause,
    Resume,
    Import,
    Sync,
    Version,
}

// ─── Reports ───────────────────────────────────────────────────────────────

/// Outcome of merging an import batch into the store.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeReport {
    pub added: usize,
    pub skipped_duplicates: usize,
}

/// Outcome of one sync pass against the persistence backend.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub synced_campaigns: usize,
    /// False when the store had no pending changes.
    pub performed: bool,
}
