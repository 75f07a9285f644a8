//! In-memory campaign store backed by DashMap.
//!
//! Persistence is snapshot-based: mutations set a dirty flag and `sync`
//! pushes the full campaign set to the configured backend.

use crate::models::*;
use crate::persist::PersistenceBackend;
use budget_allocation::engine;
use budget_core::error::{BudgetError, BudgetResult};
use budget_core::types::{Campaign, CampaignStatus, MarketingObjective, MediaChannel};
use budget_core::week::WeekKey;
use chrono::{Duration, NaiveDate, Utc};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};
use uuid::Uuid;

/// Thread-safe in-memory store for campaigns, version snapshots, and the
/// audit log.
pub struct CampaignStore {
    campaigns: DashMap<Uuid, Campaign>,
    versions: DashMap<Uuid, CampaignVersion>,
    audit_log: DashMap<Uuid, AuditLogEntry>,
    dirty: AtomicBool,
}

impl CampaignStore {
    pub fn new() -> Self {
        info!("Campaign store initialized (in-memory)");
        Self {
            campaigns: DashMap::new(),
            versions: DashMap::new(),
            audit_log: DashMap::new(),
            dirty: AtomicBool::new(false),
        }
    }

    // ─── Campaigns ─────────────────────────────────────────────────────────

    pub fn list_campaigns(&self) -> Vec<Campaign> {
        let mut campaigns: Vec<Campaign> =
            self.campaigns.iter().map(|r| r.value().clone()).collect();
        campaigns.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        campaigns
    }

    pub fn get_campaign(&self, id: Uuid) -> Option<Campaign> {
        self.campaigns.get(&id).map(|r| r.value().clone())
    }

    pub fn count(&self) -> usize {
        self.campaigns.len()
    }

    pub fn create_campaign(&self, req: CreateCampaignRequest) -> Campaign {
        let campaign = Campaign::new(
            req.media_channel,
            req.campaign_name,
            req.marketing_objective,
            req.target_audience,
            req.start_date,
            req.total_budget,
            req.duration_days,
        );
        let id = campaign.id;
        self.campaigns.insert(id, campaign.clone());
        self.log_audit(
            AuditAction::Create,
            "campaign",
            &id.to_string(),
            serde_json::json!({"campaignName": &campaign.campaign_name}),
        );
        self.mark_dirty();
        campaign
    }

    pub fn update_campaign(&self, id: Uuid, req: UpdateCampaignRequest) -> BudgetResult<Campaign> {
        self.edit_campaign(id, AuditAction::Update, serde_json::json!({}), |c| {
            if let Some(name) = req.campaign_name {
                c.campaign_name = name;
            }
            if let Some(channel) = req.media_channel {
                c.media_channel = channel;
            }
            if let Some(objective) = req.marketing_objective {
                c.marketing_objective = objective;
            }
            if let Some(audience) = req.target_audience {
                c.target_audience = audience;
            }
            if let Some(date) = req.start_date {
                c.start_date = date;
            }
            if let Some(days) = req.duration_days {
                c.duration_days = days;
            }
            Ok(())
        })
    }

    pub fn delete_campaign(&self, id: Uuid) -> BudgetResult<()> {
        if self.campaigns.remove(&id).is_none() {
            return Err(BudgetError::CampaignNotFound(id));
        }
        let version_ids: Vec<Uuid> = self
            .versions
            .iter()
            .filter(|r| r.value().campaign_id == id)
            .map(|r| *r.key())
            .collect();
        for vid in version_ids {
            self.versions.remove(&vid);
        }
        self.log_audit(
            AuditAction::Delete,
            "campaign",
            &id.to_string(),
            serde_json::json!({}),
        );
        self.mark_dirty();
        Ok(())
    }

    pub fn pause_campaign(&self, id: Uuid) -> BudgetResult<Campaign> {
        self.edit_campaign(id, AuditAction::Pause, serde_json::json!({}), |c| {
            c.status = CampaignStatus::Paused;
            Ok(())
        })
    }

    pub fn resume_campaign(&self, id: Uuid) -> BudgetResult<Campaign> {
        self.edit_campaign(id, AuditAction::Resume, serde_json::json!({}), |c| {
            c.status = CampaignStatus::Active;
            Ok(())
        })
    }

    // ─── Weekly allocation ─────────────────────────────────────────────────

    pub fn set_week_percentage(
        &self,
        id: Uuid,
        week: WeekKey,
        percentage: f64,
    ) -> BudgetResult<Campaign> {
        let details =
            serde_json::json!({"week": week.to_string(), "percentage": percentage});
        self.edit_campaign(id, AuditAction::Update, details, |c| {
            engine::set_week_percentage(c, week, percentage)
        })
    }

    pub fn set_week_amount(&self, id: Uuid, week: WeekKey, amount: f64) -> BudgetResult<Campaign> {
        let details = serde_json::json!({"week": week.to_string(), "amount": amount});
        self.edit_campaign(id, AuditAction::Update, details, |c| {
            engine::set_week_amount(c, week, amount)
        })
    }

    pub fn set_week_actual(&self, id: Uuid, week: WeekKey, amount: f64) -> BudgetResult<Campaign> {
        let details = serde_json::json!({"week": week.to_string(), "actual": amount});
        self.edit_campaign(id, AuditAction::Update, details, |c| {
            engine::set_week_actual(c, week, amount)
        })
    }

    pub fn set_total_budget(&self, id: Uuid, new_total: f64) -> BudgetResult<Campaign> {
        let details = serde_json::json!({"totalBudget": new_total});
        self.edit_campaign(id, AuditAction::Update, details, |c| {
            engine::set_total_budget(c, new_total)
        })
    }

    /// Applies `edit` to the campaign under its shard lock. The audit
    /// entry and dirty flag happen only after the edit succeeds, so a
    /// rejected edit leaves no trace.
    fn edit_campaign<F>(
        &self,
        id: Uuid,
        action: AuditAction,
        details: serde_json::Value,
        edit: F,
    ) -> BudgetResult<Campaign>
    where
        F: FnOnce(&mut Campaign) -> BudgetResult<()>,
    {
        let mut entry = self
            .campaigns
            .get_mut(&id)
            .ok_or(BudgetError::CampaignNotFound(id))?;
        let campaign = entry.value_mut();
        edit(campaign)?;
        campaign.updated_at = Utc::now();
        let updated = campaign.clone();
        drop(entry);

        self.log_audit(action, "campaign", &id.to_string(), details);
        self.mark_dirty();
        Ok(updated)
    }

    // ─── Import merge ──────────────────────────────────────────────────────

    /// Replaces the whole collection with an import batch (fresh import).
    /// Batch-internal duplicates are still skipped and counted.
    pub fn replace_with_import(&self, campaigns: Vec<Campaign>) -> MergeReport {
        self.campaigns.clear();
        self.mark_dirty();
        self.merge_import(campaigns)
    }

    /// Merges an import batch. A campaign whose identity key (channel +
    /// name, case-insensitive) already exists in the store or earlier in
    /// the batch is skipped, not overwritten.
    pub fn merge_import(&self, campaigns: Vec<Campaign>) -> MergeReport {
        let mut seen: HashSet<String> = self
            .campaigns
            .iter()
            .map(|r| r.value().identity_key())
            .collect();

        let mut report = MergeReport::default();
        for campaign in campaigns {
            if !seen.insert(campaign.identity_key()) {
                report.skipped_duplicates += 1;
                continue;
            }
            self.campaigns.insert(campaign.id, campaign);
            report.added += 1;
        }

        if report.added > 0 {
            self.log_audit(
                AuditAction::Import,
                "import",
                &Uuid::new_v4().to_string(),
                serde_json::json!({
                    "added": report.added,
                    "skippedDuplicates": report.skipped_duplicates,
                }),
            );
            self.mark_dirty();
        }
        info!(
            added = report.added,
            skipped = report.skipped_duplicates,
            "Import batch merged"
        );
        report
    }

    // ─── Versions ──────────────────────────────────────────────────────────

    pub fn create_version(
        &self,
        campaign_id: Uuid,
        req: CreateVersionRequest,
    ) -> BudgetResult<CampaignVersion> {
        let snapshot = self
            .get_campaign(campaign_id)
            .ok_or(BudgetError::CampaignNotFound(campaign_id))?;
        let version = CampaignVersion {
            id: Uuid::new_v4(),
            campaign_id,
            version_name: req.version_name,
            version_notes: req.version_notes,
            snapshot,
            created_at: Utc::now(),
        };
        self.versions.insert(version.id, version.clone());
        self.log_audit(
            AuditAction::Version,
            "version",
            &version.id.to_string(),
            serde_json::json!({
                "campaignId": campaign_id,
                "versionName": &version.version_name,
            }),
        );
        Ok(version)
    }

    pub fn list_versions(&self, campaign_id: Uuid) -> Vec<CampaignVersion> {
        let mut versions: Vec<CampaignVersion> = self
            .versions
            .iter()
            .filter(|r| r.value().campaign_id == campaign_id)
            .map(|r| r.value().clone())
            .collect();
        versions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        versions
    }

    // ─── Audit log ─────────────────────────────────────────────────────────

    pub fn audit_log(&self) -> Vec<AuditLogEntry> {
        let mut entries: Vec<AuditLogEntry> =
            self.audit_log.iter().map(|r| r.value().clone()).collect();
        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        entries
    }

    fn log_audit(
        &self,
        action: AuditAction,
        resource_type: &str,
        resource_id: &str,
        details: serde_json::Value,
    ) {
        let entry = AuditLogEntry {
            id: Uuid::new_v4(),
            action,
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            details,
            timestamp: Utc::now(),
        };
        self.audit_log.insert(entry.id, entry);
    }

    // ─── Sync ──────────────────────────────────────────────────────────────

    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    /// Pushes the campaign set to the backend when there are pending
    /// changes. A failed push re-arms the dirty flag so the next sync
    /// retries.
    pub fn sync(&self, backend: &dyn PersistenceBackend) -> BudgetResult<SyncReport> {
        if !self.dirty.swap(false, Ordering::SeqCst) {
            return Ok(SyncReport {
                synced_campaigns: 0,
                performed: false,
            });
        }

        let campaigns = self.list_campaigns();
        if let Err(err) = backend.replace_all(&campaigns) {
            warn!(error = %err, "Snapshot sync failed; keeping changes pending");
            self.mark_dirty();
            return Err(err);
        }

        self.log_audit(
            AuditAction::Sync,
            "snapshot",
            &Uuid::new_v4().to_string(),
            serde_json::json!({"campaigns": campaigns.len()}),
        );
        Ok(SyncReport {
            synced_campaigns: campaigns.len(),
            performed: true,
        })
    }

    // ─── Demo data ─────────────────────────────────────────────────────────

    /// Seeds the eight demo campaigns with deterministic weekly spreads:
    /// each campaign splits 100% evenly across its active weeks starting
    /// at the week of its start date, and the first twelve weeks of the
    /// year carry actuals with a fixed variance cycle.
    pub fn seed_demo_data(&self) {
        let now = Utc::now();
        let seeds: [(MediaChannel, &str, MarketingObjective, &str, (i32, u32, u32), f64, u32, u32); 8] = [
            (MediaChannel::Meta, "Vacances Été Famille", MarketingObjective::Conversion, "Famille avec enfants 3-12 ans", (2025, 1, 15), 120_000.0, 90, 13),
            (MediaChannel::Google, "Search Generique Ski", MarketingObjective::Conversion, "Skieurs actifs 25-45 ans", (2025, 1, 5), 85_000.0, 70, 10),
            (MediaChannel::Youtube, "Branding Printemps", MarketingObjective::Awareness, "CSP+ urbains 30-55 ans", (2025, 3, 1), 150_000.0, 60, 9),
            (MediaChannel::Programmatic, "Retargeting Été", MarketingObjective::Consideration, "Visiteurs site non convertis", (2025, 4, 15), 65_000.0, 120, 17),
            (MediaChannel::Meta, "Promo Flash Printemps", MarketingObjective::Conversion, "Clients base CRM actifs", (2025, 3, 20), 45_000.0, 15, 2),
            (MediaChannel::Influencers, "Ambassadeurs Montagne", MarketingObjective::Awareness, "Familles sportives 30-45 ans", (2025, 1, 10), 95_000.0, 60, 9),
            (MediaChannel::Email, "Newsletter Offre Exclusive", MarketingObjective::Loyalty, "Clients fidèles +2 séjours", (2025, 2, 1), 15_000.0, 7, 1),
            (MediaChannel::Native, "Native Ads Magazine Voyage", MarketingObjective::Consideration, "CSP+ 35-60 ans", (2025, 5, 10), 70_000.0, 45, 7),
        ];

        for (idx, (channel, name, objective, audience, (y, m, d), budget, days, weeks)) in
            seeds.into_iter().enumerate()
        {
            let start_date = NaiveDate::from_ymd_opt(y, m, d).unwrap_or_else(|| {
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default()
            });
            let mut campaign = Campaign::new(
                channel,
                name.to_string(),
                objective,
                audience.to_string(),
                start_date,
                budget,
                days,
            );
            campaign.created_at = now - Duration::minutes(idx as i64);
            campaign.updated_at = campaign.created_at;

            let start_week = WeekKey::for_date(start_date).number() as u32;
            let share = 100.0 / weeks as f64;
            for offset in 0..weeks {
                let number = ((start_week + offset - 1) % 52 + 1) as u8;
                let Some(week) = WeekKey::new(number) else {
                    continue;
                };
                let amount = share / 100.0 * budget;
                campaign.weekly_budget_percentages.insert(week, share);
                campaign.weekly_budgets.insert(week, amount);
                if number <= 12 {
                    let factor = match number % 4 {
                        0 => 0.92,
                        1 => 1.08,
                        2 => 0.97,
                        _ => 1.05,
                    };
                    campaign
                        .weekly_actuals
                        .insert(week, (amount * factor).round());
                }
            }

            self.campaigns.insert(campaign.id, campaign);
        }
        self.mark_dirty();
        info!(count = self.campaigns.len(), "Demo campaigns seeded");
    }
}

impl Default for CampaignStore {
    fn default() -> Self {
        Self::new()
    }
}
