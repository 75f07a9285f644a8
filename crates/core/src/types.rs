use crate::week::WeekKey;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Media channel a campaign runs on. Unrecognized imports collapse to
/// `Other` rather than failing the row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MediaChannel {
    Meta,
    Google,
    Youtube,
    Programmatic,
    Influencers,
    Email,
    Native,
    Other,
}

impl MediaChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Meta => "META",
            Self::Google => "GOOGLE",
            Self::Youtube => "YOUTUBE",
            Self::Programmatic => "PROGRAMMATIC",
            Self::Influencers => "INFLUENCERS",
            Self::Email => "EMAIL",
            Self::Native => "NATIVE",
            Self::Other => "OTHER",
        }
    }

    /// Parses an imported cell, case-insensitively. Anything unknown is
    /// `Other`.
    pub fn from_import(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "META" => Self::Meta,
            "GOOGLE" => Self::Google,
            "YOUTUBE" => Self::Youtube,
            "PROGRAMMATIC" => Self::Programmatic,
            "INFLUENCERS" => Self::Influencers,
            "EMAIL" => Self::Email,
            "NATIVE" => Self::Native,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for MediaChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for MediaChannel {
    fn default() -> Self {
        MediaChannel::Other
    }
}

/// Marketing objective a campaign optimizes for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketingObjective {
    Awareness,
    Consideration,
    Conversion,
    Loyalty,
    Retention,
    Other,
}

impl MarketingObjective {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Awareness => "AWARENESS",
            Self::Consideration => "CONSIDERATION",
            Self::Conversion => "CONVERSION",
            Self::Loyalty => "LOYALTY",
            Self::Retention => "RETENTION",
            Self::Other => "OTHER",
        }
    }

    pub fn from_import(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "AWARENESS" => Self::Awareness,
            "CONSIDERATION" => Self::Consideration,
            "CONVERSION" => Self::Conversion,
            "LOYALTY" => Self::Loyalty,
            "RETENTION" => Self::Retention,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for MarketingObjective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for MarketingObjective {
    fn default() -> Self {
        MarketingObjective::Other
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignStatus {
    Active,
    Paused,
    Deleted,
}

/// Audience label used when a campaign gives none.
pub const DEFAULT_AUDIENCE: &str = "Audience générale";

/// A marketing campaign with its planned and actual spend across the 52
/// weekly buckets of the year.
///
/// The three weekly maps are kept dense: every key `S1`..`S52` is present,
/// zeros included. `weekly_budget_percentages` holds each week's share of
/// `total_budget`; `weekly_budgets` holds the derived (or directly edited)
/// planned amounts; `weekly_actuals` holds observed spend.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    pub id: Uuid,
    pub media_channel: MediaChannel,
    pub campaign_name: String,
    pub marketing_objective: MarketingObjective,
    pub target_audience: String,
    pub start_date: NaiveDate,
    pub total_budget: f64,
    pub duration_days: u32,
    pub status: CampaignStatus,
    pub weekly_budget_percentages: BTreeMap<WeekKey, f64>,
    pub weekly_budgets: BTreeMap<WeekKey, f64>,
    pub weekly_actuals: BTreeMap<WeekKey, f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Campaign {
    /// A fresh active campaign with all 52 weeks zeroed in every map.
    pub fn new(
        media_channel: MediaChannel,
        campaign_name: String,
        marketing_objective: MarketingObjective,
        target_audience: String,
        start_date: NaiveDate,
        total_budget: f64,
        duration_days: u32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            media_channel,
            campaign_name,
            marketing_objective,
            target_audience,
            start_date,
            total_budget,
            duration_days,
            status: CampaignStatus::Active,
            weekly_budget_percentages: zero_weeks(),
            weekly_budgets: zero_weeks(),
            weekly_actuals: zero_weeks(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Duplicate-detection key: lower-cased channel and name joined with a
    /// dash. Two campaigns with the same key are the same campaign.
    pub fn identity_key(&self) -> String {
        format!(
            "{}-{}",
            self.media_channel.as_str().to_lowercase(),
            self.campaign_name.trim().to_lowercase()
        )
    }
}

/// A dense weekly map with every week of the year zeroed.
pub fn zero_weeks() -> BTreeMap<WeekKey, f64> {
    WeekKey::all().map(|week| (week, 0.0)).collect()
}
