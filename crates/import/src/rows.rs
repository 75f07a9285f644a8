//! Row conversion: resolved raw cells into canonical campaigns, with the
//! defaulting rules that keep a messy row importable.

use crate::dates;
use crate::headers::{Field, HeaderLayout};
use crate::value;
use budget_core::error::{BudgetError, BudgetResult};
use budget_core::types::{
    zero_weeks, Campaign, CampaignStatus, MarketingObjective, MediaChannel,
};
use budget_core::week::WeekKey;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

pub use budget_core::types::DEFAULT_AUDIENCE;

/// Duration substituted when the source value has no usable digits.
pub const DEFAULT_DURATION_DAYS: u32 = 30;

/// One data row's cells, keyed by resolved logical field, plus its week
/// cells in column order.
#[derive(Debug, Clone)]
pub struct RawRow {
    fields: HashMap<Field, String>,
    weeks: Vec<(WeekKey, String)>,
}

impl RawRow {
    /// Pulls the resolved cells for one data row out of a split line.
    /// Cells beyond the end of a short row read as empty.
    pub fn extract(layout: &HeaderLayout, cells: &[String]) -> Self {
        let mut fields = HashMap::new();
        for field in Field::ALL {
            let raw = layout
                .column(field)
                .and_then(|idx| cells.get(idx))
                .map(|c| c.trim().to_string())
                .unwrap_or_default();
            fields.insert(field, raw);
        }
        let weeks = layout
            .week_columns
            .iter()
            .filter_map(|(idx, week)| cells.get(*idx).map(|c| (*week, c.trim().to_string())))
            .collect();
        Self { fields, weeks }
    }

    fn field(&self, field: Field) -> &str {
        self.fields.get(&field).map(String::as_str).unwrap_or("")
    }

    /// A row is blank when every resolved cell is empty. Blank rows are
    /// dropped silently; anything else is defaulted into a campaign.
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|v| v.is_empty()) && self.weeks.iter().all(|(_, v)| v.is_empty())
    }
}

/// Conversion outcome for one row.
#[derive(Debug, Clone)]
pub struct RowOutcome {
    pub campaign: Campaign,
    /// Whether the normalization pass rescaled this row's percentages.
    pub adjusted: bool,
}

/// Converts one resolved row into a campaign.
///
/// Unknown channels and objectives collapse to `OTHER`, the audience and
/// date get fixed defaults, and week cells are classified then normalized.
/// Negative money is the one thing a row cannot default its way out of.
pub fn build_campaign(row_number: usize, row: &RawRow) -> BudgetResult<RowOutcome> {
    let media_channel = MediaChannel::from_import(row.field(Field::Channel));
    let campaign_name = {
        let raw = row.field(Field::Name);
        if raw.is_empty() {
            format!("Campagne importée {row_number}")
        } else {
            raw.to_string()
        }
    };
    let marketing_objective = MarketingObjective::from_import(row.field(Field::Objective));
    let target_audience = {
        let raw = row.field(Field::Audience);
        if raw.is_empty() {
            DEFAULT_AUDIENCE.to_string()
        } else {
            raw.to_string()
        }
    };
    let start_date = dates::normalize_date(row.field(Field::StartDate));
    let total_budget = value::clean_numeric(row.field(Field::TotalBudget));
    if total_budget < 0.0 {
        return Err(BudgetError::RowProcessing {
            row: row_number,
            reason: format!("negative total budget ({total_budget})"),
        });
    }
    let duration_days = parse_duration(row.field(Field::Duration));

    let mut percentages = zero_weeks();
    for (week, raw) in &row.weeks {
        let cell = value::classify_week_cell(raw, total_budget);
        let percentage = cell.as_percentage(total_budget);
        if percentage < 0.0 {
            return Err(BudgetError::RowProcessing {
                row: row_number,
                reason: format!("negative value for week {week}"),
            });
        }
        percentages.insert(*week, percentage);
    }
    let (percentages, adjusted) = value::normalize_percentages(percentages);

    let weekly_budgets: BTreeMap<WeekKey, f64> = percentages
        .iter()
        .map(|(week, pct)| (*week, pct / 100.0 * total_budget))
        .collect();

    let now = Utc::now();
    let campaign = Campaign {
        id: Uuid::new_v4(),
        media_channel,
        campaign_name,
        marketing_objective,
        target_audience,
        start_date,
        total_budget,
        duration_days,
        status: CampaignStatus::Active,
        weekly_budget_percentages: percentages,
        weekly_budgets,
        weekly_actuals: zero_weeks(),
        created_at: now,
        updated_at: now,
    };
    Ok(RowOutcome { campaign, adjusted })
}

fn parse_duration(raw: &str) -> u32 {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.parse::<u32>() {
        Ok(0) | Err(_) => DEFAULT_DURATION_DAYS,
        Ok(days) => days,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headers::HeaderLayout;

    fn layout() -> HeaderLayout {
        let headers: Vec<String> = [
            "Levier Média",
            "Nom Campagne",
            "Objectif Marketing",
            "Cible/Audience",
            "Date Début",
            "Budget Total",
            "Durée (jours)",
            "S1",
            "S2",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        HeaderLayout::resolve(&headers).unwrap()
    }

    fn cells(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_builds_a_campaign_from_a_clean_row() {
        let row = RawRow::extract(
            &layout(),
            &cells(&[
                "META",
                "Vacances Été",
                "CONVERSION",
                "Familles",
                "2025-04-01",
                "85000",
                "90",
                "60%",
                "40%",
            ]),
        );
        let outcome = build_campaign(1, &row).unwrap();
        let c = &outcome.campaign;

        assert_eq!(c.media_channel, MediaChannel::Meta);
        assert_eq!(c.campaign_name, "Vacances Été");
        assert_eq!(c.status, CampaignStatus::Active);
        assert_eq!(c.duration_days, 90);
        assert!(!outcome.adjusted);
        assert!((c.weekly_budget_percentages[&WeekKey::new(1).unwrap()] - 60.0).abs() < 1e-9);
        assert!((c.weekly_budgets[&WeekKey::new(1).unwrap()] - 51_000.0).abs() < 1e-9);
        assert_eq!(c.weekly_budget_percentages.len(), 52);
        assert_eq!(c.weekly_actuals.len(), 52);
    }

    #[test]
    fn test_defaults_fill_missing_cells() {
        let row = RawRow::extract(
            &layout(),
            &cells(&["", "Sans Détails", "", "", "", "", ""]),
        );
        let outcome = build_campaign(1, &row).unwrap();
        let c = &outcome.campaign;

        assert_eq!(c.media_channel, MediaChannel::Other);
        assert_eq!(c.marketing_objective, MarketingObjective::Other);
        assert_eq!(c.target_audience, DEFAULT_AUDIENCE);
        assert_eq!(c.start_date, crate::dates::fallback_date());
        assert_eq!(c.total_budget, 0.0);
        assert_eq!(c.duration_days, 30);
    }

    #[test]
    fn test_empty_name_gets_numbered_default() {
        let row = RawRow::extract(&layout(), &cells(&["META", "", "", "", "", "1000", ""]));
        let outcome = build_campaign(7, &row).unwrap();
        assert_eq!(outcome.campaign.campaign_name, "Campagne importée 7");
    }

    #[test]
    fn test_short_rows_read_missing_week_cells_as_empty() {
        let row = RawRow::extract(
            &layout(),
            &cells(&["GOOGLE", "Courte", "", "", "", "50000", "30"]),
        );
        let outcome = build_campaign(1, &row).unwrap();
        assert!(outcome
            .campaign
            .weekly_budgets
            .values()
            .all(|v| *v == 0.0));
    }

    #[test]
    fn test_blank_rows_are_detected() {
        let blank = RawRow::extract(&layout(), &cells(&["", "", "", "", "", "", "", "", ""]));
        assert!(blank.is_blank());
        let not_blank = RawRow::extract(&layout(), &cells(&["", "", "", "", "", "", "", "5", ""]));
        assert!(!not_blank.is_blank());
    }

    #[test]
    fn test_amount_cells_convert_and_normalize() {
        // Week cells carry euros: 30k + 30k on a 60k budget is 50% + 50%.
        let row = RawRow::extract(
            &layout(),
            &cells(&[
                "META", "Montants", "", "", "", "60000", "30", "30000", "30000",
            ]),
        );
        let outcome = build_campaign(1, &row).unwrap();
        let c = &outcome.campaign;
        assert!(!outcome.adjusted);
        assert!((c.weekly_budget_percentages[&WeekKey::new(1).unwrap()] - 50.0).abs() < 1e-9);
        assert!((c.weekly_budgets[&WeekKey::new(2).unwrap()] - 30_000.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_total_budget_fails_the_row() {
        let row = RawRow::extract(
            &layout(),
            &cells(&["META", "Négatif", "", "", "", "-500", "30"]),
        );
        let err = build_campaign(4, &row).unwrap_err();
        match err {
            BudgetError::RowProcessing { row, .. } => assert_eq!(row, 4),
            other => panic!("expected RowProcessing, got {other:?}"),
        }
    }

    #[test]
    fn test_duration_parses_digits_out_of_text() {
        assert_eq!(parse_duration("45 jours"), 45);
        assert_eq!(parse_duration("jours"), 30);
        assert_eq!(parse_duration("0"), 30);
        assert_eq!(parse_duration(""), 30);
    }
}
