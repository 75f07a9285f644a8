//! Downloadable import templates, pre-filled with example campaigns so
//! the column contract is visible in the file itself.

use crate::json::CampaignImport;
use budget_core::week::WeekKey;
use std::collections::BTreeMap;

/// File name offered for the CSV template download.
pub const CSV_TEMPLATE_FILENAME: &str = "campagnes_template.csv";
/// File name offered for the JSON template download.
pub const JSON_TEMPLATE_FILENAME: &str = "campagnes_template.json";

const SCALAR_HEADERS: [&str; 7] = [
    "Levier Média",
    "Nom Campagne",
    "Objectif Marketing",
    "Cible/Audience",
    "Date Début",
    "Budget Total",
    "Durée (jours)",
];

/// Builds the CSV template: the full header contract plus two example
/// rows. The example week cells carry explicit `%` markers and sum to
/// 100, so re-importing the template yields them unchanged.
pub fn csv_template() -> String {
    let mut headers: Vec<String> = SCALAR_HEADERS.iter().map(|h| h.to_string()).collect();
    headers.extend(WeekKey::all().map(|w| w.to_string()));
    let width = headers.len();

    let rows = [
        example_row(
            &[
                "META",
                "Exemple Campagne Été",
                "CONVERSION",
                "Familles avec enfants",
                "2025-04-01",
                "85000",
                "90",
            ],
            &["10%", "15%", "20%", "25%", "15%", "10%", "5%"],
            width,
        ),
        example_row(
            &[
                "GOOGLE",
                "Exemple Search Hiver",
                "CONSIDERATION",
                "CSP+ 35-55 ans",
                "2025-01-15",
                "50000",
                "60",
            ],
            &["40%", "30%", "20%", "10%"],
            width,
        ),
    ];

    let mut lines = vec![headers.join(",")];
    lines.extend(rows);
    lines.join("\n")
}

fn example_row(scalars: &[&str], week_cells: &[&str], width: usize) -> String {
    let mut cells: Vec<String> = scalars.iter().map(|c| c.to_string()).collect();
    cells.extend(week_cells.iter().map(|c| c.to_string()));
    cells.resize(width, String::new());
    cells.join(",")
}

/// Builds the JSON template: two example campaigns in the canonical
/// serialization, with dense weekly maps showing the `S1`..`S52` keys.
pub fn json_template() -> String {
    let mut weekly_budgets: BTreeMap<WeekKey, f64> =
        WeekKey::all().map(|w| (w, 0.0)).collect();
    let weekly_actuals = weekly_budgets.clone();
    for (week, amount) in WeekKey::all().zip([5000.0, 7500.0, 10000.0]) {
        weekly_budgets.insert(week, amount);
    }

    let examples = vec![
        CampaignImport {
            media_channel: Some("META".to_string()),
            campaign_name: Some("Exemple Campagne Été".to_string()),
            marketing_objective: Some("CONVERSION".to_string()),
            target_audience: Some("Familles avec enfants".to_string()),
            start_date: Some("2025-04-01".to_string()),
            total_budget: Some(85000.0),
            duration_days: Some(90),
            weekly_budgets: Some(weekly_budgets.clone()),
            weekly_actuals: Some(weekly_actuals.clone()),
            ..CampaignImport::default()
        },
        CampaignImport {
            media_channel: Some("GOOGLE".to_string()),
            campaign_name: Some("Exemple Search Hiver".to_string()),
            marketing_objective: Some("CONSIDERATION".to_string()),
            target_audience: Some("CSP+ 35-55 ans".to_string()),
            start_date: Some("2025-01-15".to_string()),
            total_budget: Some(50000.0),
            duration_days: Some(60),
            weekly_budgets: Some(weekly_budgets),
            weekly_actuals: Some(weekly_actuals),
            ..CampaignImport::default()
        },
    ];

    // Serializing a Vec of plain structs cannot fail.
    serde_json::to_string_pretty(&examples).unwrap_or_default()
}
