//! JSON import: a single campaign object or an array of them, in the
//! canonical serialization. Unlike the tabular path, JSON values are
//! taken as-is; percentages are never rescaled, so exporting and
//! re-importing a document is lossless.

use crate::csv::{ImportReport, RowFailure};
use crate::dates;
use crate::rows::{DEFAULT_AUDIENCE, DEFAULT_DURATION_DAYS};
use budget_core::error::{BudgetError, BudgetResult};
use budget_core::types::{
    zero_weeks, Campaign, CampaignStatus, MarketingObjective, MediaChannel,
};
use budget_core::week::WeekKey;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;
use uuid::Uuid;

/// One campaign as it appears in an import document. Every field is
/// optional; missing ones take the same defaults as tabular rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignImport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_channel: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campaign_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marketing_objective: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_budget: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_budget_percentages: Option<BTreeMap<WeekKey, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_budgets: Option<BTreeMap<WeekKey, f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weekly_actuals: Option<BTreeMap<WeekKey, f64>>,
}

/// Parses a JSON import payload. A single object is treated as an array
/// of one; malformed elements are skipped and reported while the rest of
/// the batch proceeds.
pub fn parse_json(payload: &str) -> BudgetResult<ImportReport> {
    let document: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| BudgetError::Validation(format!("invalid JSON: {e}")))?;
    let elements = match document {
        serde_json::Value::Array(items) => items,
        other => vec![other],
    };

    let mut report = ImportReport::default();
    for (offset, element) in elements.into_iter().enumerate() {
        let row_number = offset + 1;
        report.total_rows += 1;

        let outcome = serde_json::from_value::<CampaignImport>(element)
            .map_err(|e| BudgetError::RowProcessing {
                row: row_number,
                reason: format!("malformed campaign object: {e}"),
            })
            .and_then(|import| build_campaign(row_number, import));
        match outcome {
            Ok(campaign) => report.campaigns.push(campaign),
            Err(err) => {
                warn!(row = row_number, error = %err, "Skipping unprocessable import element");
                metrics::counter!("import.rows.failed").increment(1);
                report.failures.push(RowFailure {
                    row: row_number,
                    reason: err.to_string(),
                });
            }
        }
    }

    metrics::counter!("import.rows.processed").increment(report.total_rows as u64);
    Ok(report)
}

/// Converts one import object. When only one of the two weekly maps is
/// present the other is derived from it; when both are present they are
/// trusted as given.
fn build_campaign(row_number: usize, import: CampaignImport) -> BudgetResult<Campaign> {
    let total_budget = import.total_budget.unwrap_or(0.0);
    if total_budget < 0.0 {
        return Err(BudgetError::RowProcessing {
            row: row_number,
            reason: format!("negative total budget ({total_budget})"),
        });
    }
    for map in [
        &import.weekly_budget_percentages,
        &import.weekly_budgets,
        &import.weekly_actuals,
    ]
    .into_iter()
    .flatten()
    {
        if let Some((week, value)) = map.iter().find(|(_, v)| **v < 0.0) {
            return Err(BudgetError::RowProcessing {
                row: row_number,
                reason: format!("negative value for week {week} ({value})"),
            });
        }
    }

    let mut percentages = zero_weeks();
    let mut budgets = zero_weeks();
    match (&import.weekly_budget_percentages, &import.weekly_budgets) {
        (Some(given_pcts), Some(given_budgets)) => {
            overlay(&mut percentages, given_pcts);
            overlay(&mut budgets, given_budgets);
        }
        (Some(given_pcts), None) => {
            overlay(&mut percentages, given_pcts);
            for (week, pct) in &percentages {
                budgets.insert(*week, pct / 100.0 * total_budget);
            }
        }
        (None, Some(given_budgets)) => {
            overlay(&mut budgets, given_budgets);
            if total_budget > 0.0 {
                for (week, amount) in &budgets {
                    percentages.insert(*week, amount / total_budget * 100.0);
                }
            }
        }
        (None, None) => {}
    }
    let mut actuals = zero_weeks();
    if let Some(given) = &import.weekly_actuals {
        overlay(&mut actuals, given);
    }

    let campaign_name = match import.campaign_name {
        Some(name) if !name.trim().is_empty() => name,
        _ => format!("Campagne importée {row_number}"),
    };
    let target_audience = match import.target_audience {
        Some(audience) if !audience.trim().is_empty() => audience,
        _ => DEFAULT_AUDIENCE.to_string(),
    };
    let duration_days = match import.duration_days {
        None | Some(0) => DEFAULT_DURATION_DAYS,
        Some(days) => days,
    };

    let now = Utc::now();
    Ok(Campaign {
        id: Uuid::new_v4(),
        media_channel: MediaChannel::from_import(import.media_channel.as_deref().unwrap_or("")),
        campaign_name,
        marketing_objective: MarketingObjective::from_import(
            import.marketing_objective.as_deref().unwrap_or(""),
        ),
        target_audience,
        start_date: dates::normalize_date(import.start_date.as_deref().unwrap_or("")),
        total_budget,
        duration_days,
        status: CampaignStatus::Active,
        weekly_budget_percentages: percentages,
        weekly_budgets: budgets,
        weekly_actuals: actuals,
        created_at: now,
        updated_at: now,
    })
}

fn overlay(base: &mut BTreeMap<WeekKey, f64>, given: &BTreeMap<WeekKey, f64>) {
    for (week, value) in given {
        base.insert(*week, *value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn s(n: u8) -> WeekKey {
        WeekKey::new(n).unwrap()
    }

    #[test]
    fn test_single_object_is_treated_as_an_array_of_one() {
        let payload = r#"{
            "mediaChannel": "META",
            "campaignName": "Solo",
            "marketingObjective": "CONVERSION",
            "startDate": "2025-04-01",
            "totalBudget": 10000,
            "durationDays": 30,
            "weeklyBudgetPercentages": {"S1": 60, "S2": 40}
        }"#;
        let report = parse_json(payload).unwrap();
        assert_eq!(report.imported(), 1);
        let c = &report.campaigns[0];
        assert_eq!(c.media_channel, MediaChannel::Meta);
        assert_eq!(c.start_date, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        // Budgets derived from the percentages.
        assert!((c.weekly_budgets[&s(1)] - 6000.0).abs() < 1e-9);
        assert!((c.weekly_budgets[&s(2)] - 4000.0).abs() < 1e-9);
        assert_eq!(c.weekly_budgets.len(), 52);
    }

    #[test]
    fn test_budgets_derive_percentages() {
        let payload = r#"[{
            "campaignName": "Dérivée",
            "totalBudget": 50000,
            "weeklyBudgets": {"S3": 25000}
        }]"#;
        let report = parse_json(payload).unwrap();
        let c = &report.campaigns[0];
        assert!((c.weekly_budget_percentages[&s(3)] - 50.0).abs() < 1e-9);
        assert!((c.weekly_budgets[&s(3)] - 25000.0).abs() < 1e-9);
    }

    #[test]
    fn test_json_percentages_are_never_rescaled() {
        // 90% total would be normalized on the tabular path; JSON keeps it.
        let payload = r#"[{
            "campaignName": "Telle Quelle",
            "totalBudget": 1000,
            "weeklyBudgetPercentages": {"S1": 50, "S2": 40}
        }]"#;
        let report = parse_json(payload).unwrap();
        assert_eq!(report.adjusted_rows, 0);
        let c = &report.campaigns[0];
        let sum: f64 = c.weekly_budget_percentages.values().sum();
        assert!((sum - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let report = parse_json(r#"[{}]"#).unwrap();
        let c = &report.campaigns[0];
        assert_eq!(c.media_channel, MediaChannel::Other);
        assert_eq!(c.marketing_objective, MarketingObjective::Other);
        assert_eq!(c.campaign_name, "Campagne importée 1");
        assert_eq!(c.target_audience, DEFAULT_AUDIENCE);
        assert_eq!(c.start_date, dates::fallback_date());
        assert_eq!(c.duration_days, DEFAULT_DURATION_DAYS);
        assert!(c.weekly_budgets.values().all(|v| *v == 0.0));
    }

    #[test]
    fn test_bad_elements_are_skipped_not_fatal() {
        let payload = r#"[
            {"campaignName": "Bonne", "totalBudget": 1000},
            42,
            {"campaignName": "Négative", "totalBudget": -5}
        ]"#;
        let report = parse_json(payload).unwrap();
        assert_eq!(report.imported(), 1);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].row, 2);
        assert_eq!(report.failures[1].row, 3);
        assert!(report.failures[1].reason.contains("negative total budget"));
    }

    #[test]
    fn test_malformed_json_is_a_validation_error() {
        assert!(matches!(
            parse_json("{not json"),
            Err(BudgetError::Validation(_))
        ));
    }
}
