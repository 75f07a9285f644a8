//! Week-cell interpretation: numeric cleaning, amount-versus-percentage
//! classification, and the off-100% normalization pass.

use budget_core::week::WeekKey;
use std::collections::BTreeMap;
use tracing::debug;

/// Values above this are read as monetary amounts when no `%` marker is
/// present and the row has a positive total budget.
const AMOUNT_THRESHOLD: f64 = 10.0;

/// Percentage sums within this distance of 100 are left alone.
const NORMALIZE_SLACK: f64 = 1.0;

/// A cleaned week cell, classified by what the number means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WeekCell {
    /// Already a percentage of the total budget.
    Percentage(f64),
    /// A raw monetary amount to convert against the total budget.
    Amount(f64),
}

impl WeekCell {
    /// Expresses the cell as a percentage of the given total budget.
    pub fn as_percentage(self, total_budget: f64) -> f64 {
        match self {
            WeekCell::Percentage(v) => v,
            WeekCell::Amount(v) => {
                if total_budget > 0.0 {
                    v / total_budget * 100.0
                } else {
                    0.0
                }
            }
        }
    }
}

/// Strips currency symbols, percent signs, and spacing (non-breaking
/// spaces included), turns a decimal comma into a dot, and parses.
/// Anything unparseable is 0.
pub fn clean_numeric(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '€' | '$' | '%' | ' ' | '\u{a0}' | '\u{202f}'))
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    cleaned.trim().parse().unwrap_or(0.0)
}

/// Decides whether a raw week cell carries a percentage or an amount.
///
/// An explicit `%` marker always means percentage. Otherwise a value above
/// 10 on a row with a positive total budget is read as an amount, since
/// spreadsheets routinely carry euros in week columns; everything else is
/// a percentage.
pub fn classify_week_cell(raw: &str, total_budget: f64) -> WeekCell {
    let value = clean_numeric(raw);
    if raw.contains('%') {
        return WeekCell::Percentage(value);
    }
    if value > AMOUNT_THRESHOLD && total_budget > 0.0 {
        WeekCell::Amount(value)
    } else {
        WeekCell::Percentage(value)
    }
}

/// Rescales a percentage mapping so it sums to 100 when the sum has
/// drifted by more than one percentage point. Returns the mapping and
/// whether it was adjusted; sums of zero and near-100 sums pass through
/// untouched.
pub fn normalize_percentages(
    mut percentages: BTreeMap<WeekKey, f64>,
) -> (BTreeMap<WeekKey, f64>, bool) {
    let sum: f64 = percentages.values().sum();
    if sum <= 0.0 || (sum - 100.0).abs() <= NORMALIZE_SLACK {
        return (percentages, false);
    }

    let factor = 100.0 / sum;
    for value in percentages.values_mut() {
        *value *= factor;
    }
    debug!(original_sum = sum, "Rescaled imported weekly percentages to 100%");
    (percentages, true)
}
