//! Weekly allocation edits.
//!
//! Keeps `weekly_budget_percentages` and `weekly_budgets` mutually
//! consistent with `total_budget` under the four edit kinds a planner can
//! make: week percentage, week amount, week actual, and total budget.
//! Percentage edits are capped at 100% across the campaign; an edit that
//! would cross the cap is rejected and leaves the campaign untouched.

use budget_core::error::{BudgetError, BudgetResult};
use budget_core::types::Campaign;
use budget_core::week::WeekKey;
use tracing::warn;

/// Weekly percentages may not sum past this cap.
pub const PERCENTAGE_CAP: f64 = 100.0;

/// Slack on the cap, so re-saving an allocation that already sits at 100%
/// does not trip on floating-point drift.
pub const PERCENTAGE_TOLERANCE: f64 = 0.1;

/// Sum of every weekly percentage currently on the campaign.
pub fn percentage_sum(campaign: &Campaign) -> f64 {
    campaign.weekly_budget_percentages.values().sum()
}

/// Sets one week's percentage share and re-derives that week's planned
/// amount (`percentage / 100 * total_budget`).
///
/// Fails with `PercentageOverflow` when the remaining weeks' percentages
/// plus the new value would exceed the cap.
pub fn set_week_percentage(
    campaign: &mut Campaign,
    week: WeekKey,
    percentage: f64,
) -> BudgetResult<()> {
    check_value(percentage, "percentage")?;

    let other_weeks: f64 = campaign
        .weekly_budget_percentages
        .iter()
        .filter(|(w, _)| **w != week)
        .map(|(_, v)| v)
        .sum();
    let projected_sum = other_weeks + percentage;
    if projected_sum > PERCENTAGE_CAP + PERCENTAGE_TOLERANCE {
        warn!(
            week = %week,
            attempted = percentage,
            projected_sum,
            "Rejected weekly percentage edit: campaign would exceed 100%"
        );
        return Err(BudgetError::PercentageOverflow {
            week,
            attempted: percentage,
            projected_sum,
        });
    }

    campaign.weekly_budget_percentages.insert(week, percentage);
    campaign
        .weekly_budgets
        .insert(week, percentage / 100.0 * campaign.total_budget);
    Ok(())
}

/// Sets one week's planned amount directly.
///
/// When the campaign has a positive total budget the week's percentage is
/// re-derived from the amount; with a zero total the percentage entry is
/// left as it was. Amount edits are authoritative and bypass the cap.
pub fn set_week_amount(campaign: &mut Campaign, week: WeekKey, amount: f64) -> BudgetResult<()> {
    check_value(amount, "amount")?;

    campaign.weekly_budgets.insert(week, amount);
    if campaign.total_budget > 0.0 {
        campaign
            .weekly_budget_percentages
            .insert(week, amount / campaign.total_budget * 100.0);
    }
    Ok(())
}

/// Records one week's actual spend. Actuals never feed back into the
/// planned figures.
pub fn set_week_actual(campaign: &mut Campaign, week: WeekKey, amount: f64) -> BudgetResult<()> {
    check_value(amount, "actual amount")?;

    campaign.weekly_actuals.insert(week, amount);
    Ok(())
}

/// Changes the campaign total and re-derives the planned amount of every
/// week holding a non-zero percentage. Weeks whose amount was set directly
/// against a zero total keep their stale amount until next edited.
pub fn set_total_budget(campaign: &mut Campaign, new_total: f64) -> BudgetResult<()> {
    check_value(new_total, "total budget")?;

    campaign.total_budget = new_total;
    let updates: Vec<(WeekKey, f64)> = campaign
        .weekly_budget_percentages
        .iter()
        .filter(|(_, pct)| **pct != 0.0)
        .map(|(week, pct)| (*week, pct / 100.0 * new_total))
        .collect();
    for (week, amount) in updates {
        campaign.weekly_budgets.insert(week, amount);
    }
    Ok(())
}

fn check_value(value: f64, what: &str) -> BudgetResult<()> {
    if !value.is_finite() {
        return Err(BudgetError::Validation(format!(
            "{what} must be a finite number"
        )));
    }
    if value < 0.0 {
        return Err(BudgetError::Validation(format!(
            "{what} must be non-negative"
        )));
    }
    Ok(())
}
