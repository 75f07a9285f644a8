//! Aggregate planned-versus-actual rollups across a campaign collection.

use budget_core::types::{Campaign, MarketingObjective, MediaChannel};
use serde::Serialize;
use std::collections::BTreeMap;

/// Collection-wide totals. Variance is `actual - planned`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    /// Sum of the campaign budget ceilings, not of the weekly plans.
    pub total_budget: f64,
    pub total_planned: f64,
    pub total_actual: f64,
    pub variance: f64,
    /// `variance / planned * 100` (0.0 when nothing is planned).
    pub variance_percentage: f64,
    pub campaign_count: usize,
}

/// Planned-versus-actual rollup for one media channel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSummary {
    pub channel: MediaChannel,
    pub planned: f64,
    pub actual: f64,
    pub variance: f64,
}

/// Planned-versus-actual rollup for one marketing objective.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectiveSummary {
    pub objective: MarketingObjective,
    pub planned: f64,
    pub actual: f64,
    pub variance: f64,
}

/// Planned spend across all weeks of one campaign.
pub fn planned_total(campaign: &Campaign) -> f64 {
    campaign.weekly_budgets.values().sum()
}

/// Actual spend across all weeks of one campaign.
pub fn actual_total(campaign: &Campaign) -> f64 {
    campaign.weekly_actuals.values().sum()
}

/// Rolls up planned, actual, and variance across the whole collection.
pub fn budget_summary(campaigns: &[Campaign]) -> BudgetSummary {
    let total_budget: f64 = campaigns.iter().map(|c| c.total_budget).sum();
    let total_planned: f64 = campaigns.iter().map(planned_total).sum();
    let total_actual: f64 = campaigns.iter().map(actual_total).sum();
    let variance = total_actual - total_planned;
    let variance_percentage = if total_planned > 0.0 {
        variance / total_planned * 100.0
    } else {
        0.0
    };
    BudgetSummary {
        total_budget,
        total_planned,
        total_actual,
        variance,
        variance_percentage,
        campaign_count: campaigns.len(),
    }
}

/// Per-channel rollups, one entry per channel present, in channel order.
pub fn channel_summaries(campaigns: &[Campaign]) -> Vec<ChannelSummary> {
    let mut buckets: BTreeMap<MediaChannel, (f64, f64)> = BTreeMap::new();
    for campaign in campaigns {
        let entry = buckets.entry(campaign.media_channel).or_insert((0.0, 0.0));
        entry.0 += planned_total(campaign);
        entry.1 += actual_total(campaign);
    }
    buckets
        .into_iter()
        .map(|(channel, (planned, actual))| ChannelSummary {
            channel,
            planned,
            actual,
            variance: actual - planned,
        })
        .collect()
}

/// Per-objective rollups, one entry per objective present.
pub fn objective_summaries(campaigns: &[Campaign]) -> Vec<ObjectiveSummary> {
    let mut buckets: BTreeMap<MarketingObjective, (f64, f64)> = BTreeMap::new();
    for campaign in campaigns {
        let entry = buckets
            .entry(campaign.marketing_objective)
            .or_insert((0.0, 0.0));
        entry.0 += planned_total(campaign);
        entry.1 += actual_total(campaign);
    }
    buckets
        .into_iter()
        .map(|(objective, (planned, actual))| ObjectiveSummary {
            objective,
            planned,
            actual,
            variance: actual - planned,
        })
        .collect()
}
