//! The tabular import pipeline: sniff the delimiter, resolve headers,
//! convert rows one by one, and report per-row failures without stopping
//! the batch.

use crate::headers::HeaderLayout;
use crate::rows::{self, RawRow};
use crate::text;
use budget_core::error::{BudgetError, BudgetResult};
use budget_core::types::Campaign;
use serde::Serialize;
use tracing::{debug, warn};

/// One row that could not be converted.
#[derive(Debug, Clone, Serialize)]
pub struct RowFailure {
    /// 1-based data-row number; the header row is not counted.
    pub row: usize,
    pub reason: String,
}

/// Outcome of one import batch.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub campaigns: Vec<Campaign>,
    /// Data rows seen, blank rows included.
    pub total_rows: usize,
    /// Rows whose percentages the normalization pass rescaled.
    pub adjusted_rows: usize,
    pub failures: Vec<RowFailure>,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.campaigns.len()
    }
}

/// Parses a whole CSV file or pasted grid.
///
/// Missing required headers abort the import; individual bad rows are
/// skipped, recorded, and counted while the rest of the batch proceeds.
pub fn parse_csv(payload: &str) -> BudgetResult<ImportReport> {
    let delimiter = text::detect_delimiter(payload);
    debug!(delimiter = ?delimiter, "Detected import delimiter");
    parse_rows(text::parse_delimited(payload, delimiter))
}

/// Parses pre-split rows (the first non-empty row is the header). Remote
/// sheet imports enter here, having already been split by the API.
pub fn parse_rows(all_rows: Vec<Vec<String>>) -> BudgetResult<ImportReport> {
    let mut rows_iter = all_rows.into_iter();
    let headers = loop {
        match rows_iter.next() {
            Some(row) if row.iter().all(|c| c.trim().is_empty()) => continue,
            Some(row) => break row,
            None => {
                return Err(BudgetError::Validation(
                    "import payload is empty".to_string(),
                ))
            }
        }
    };

    let layout = HeaderLayout::resolve(&headers)?;
    if layout.week_columns.is_empty() {
        debug!("No week columns in import; weekly maps default to zero");
    }

    let mut report = ImportReport::default();
    for (offset, cells) in rows_iter.enumerate() {
        let row_number = offset + 1;
        report.total_rows += 1;

        let raw = RawRow::extract(&layout, &cells);
        if raw.is_blank() {
            continue;
        }

        match rows::build_campaign(row_number, &raw) {
            Ok(outcome) => {
                if outcome.adjusted {
                    report.adjusted_rows += 1;
                }
                report.campaigns.push(outcome.campaign);
            }
            Err(err) => {
                warn!(row = row_number, error = %err, "Skipping unprocessable import row");
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

#[cfg(test)]
mod tests {
    use super::*;
    use budget_core::types::MediaChannel;
    use budget_core::week::WeekKey;

    #[test]
    fn test_imports_a_comma_separated_file() {
        let payload = "\
Levier Média,Nom Campagne,Objectif Marketing,Cible/Audience,Date Début,Budget Total,Durée (jours),S1,S2
META,Été,CONVERSION,Familles,2025-04-01,85000,90,60%,40%
GOOGLE,Hiver,CONSIDERATION,CSP+,2025-01-15,50000,60,50%,50%";

        let report = parse_csv(payload).unwrap();
        assert_eq!(report.imported(), 2);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.adjusted_rows, 0);
        assert!(report.failures.is_empty());
        assert_eq!(report.campaigns[0].media_channel, MediaChannel::Meta);
        assert!(
            (report.campaigns[1].weekly_budgets[&WeekKey::new(1).unwrap()] - 25_000.0).abs()
                < 1e-9
        );
    }

    #[test]
    fn test_amount_cells_without_duration_column() {
        // No duration column, and week cells carrying euros instead of
        // percentages: both are recoverable.
        let payload = "\
Levier Média,Nom Campagne,Objectif,Cible,Date Début,Budget Total,S1,S2
META,Montants,CONVERSION,Tous,2025-03-01,1000,60,50";

        let report = parse_csv(payload).unwrap();
        assert_eq!(report.imported(), 1);
        assert_eq!(report.adjusted_rows, 1);
        let c = &report.campaigns[0];
        assert_eq!(c.duration_days, 30);
        let s1 = WeekKey::new(1).unwrap();
        assert!((c.weekly_budget_percentages[&s1] - 600.0 / 11.0).abs() < 1e-9);
        assert!((c.weekly_budgets[&s1] - 6000.0 / 11.0).abs() < 1e-9);
    }

    #[test]
    fn test_imports_a_pasted_tab_grid() {
        let payload =
            "Levier\tCampagne\tObjectif\tCible\tDébut\tBudget\tDurée\tS1\nMETA\tCollé\tCONVERSION\tTous\t2025-02-01\t10000\t30\t100";
        let report = parse_csv(payload).unwrap();
        assert_eq!(report.imported(), 1);
        assert_eq!(report.campaigns[0].campaign_name, "Collé");
    }

    #[test]
    fn test_missing_required_columns_abort() {
        let payload = "S1,S2\n10,20";
        let err = parse_csv(payload).unwrap_err();
        assert!(matches!(err, BudgetError::MissingRequiredColumns(_)));
    }

    #[test]
    fn test_bad_rows_are_skipped_not_fatal() {
        let payload = "\
Levier Média,Nom Campagne,Objectif Marketing,Cible/Audience,Date Début,Budget Total,Durée (jours),S1
META,Bonne,CONVERSION,Tous,2025-04-01,10000,30,100
META,Mauvaise,CONVERSION,Tous,2025-04-01,-10000,30,100
GOOGLE,Aussi Bonne,AWARENESS,Tous,2025-05-01,5000,30,100";

        let report = parse_csv(payload).unwrap();
        assert_eq!(report.imported(), 2);
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].row, 2);
        assert!(report.failures[0].reason.contains("negative total budget"));
    }

    #[test]
    fn test_blank_rows_are_dropped_silently() {
        let payload = "\
Levier Média,Nom Campagne,Objectif Marketing,Cible/Audience,Date Début,Budget Total,Durée (jours),S1
META,Une,CONVERSION,Tous,2025-04-01,10000,30,100
,,,,,,,
";
        let report = parse_csv(payload).unwrap();
        assert_eq!(report.imported(), 1);
        assert!(report.failures.is_empty());
    }

    #[test]
    fn test_normalization_is_counted_per_row() {
        let payload = "\
Levier Média,Nom Campagne,Objectif Marketing,Cible/Audience,Date Début,Budget Total,Durée (jours),S1,S2
META,Décalée,CONVERSION,Tous,2025-04-01,10000,30,60%,50%
GOOGLE,Exacte,CONVERSION,Tous,2025-04-01,10000,30,60%,40%";

        let report = parse_csv(payload).unwrap();
        assert_eq!(report.adjusted_rows, 1);
        let adjusted = &report.campaigns[0];
        let sum: f64 = adjusted.weekly_budget_percentages.values().sum();
        assert!((sum - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_payload_is_a_validation_error() {
        assert!(matches!(
            parse_csv(""),
            Err(BudgetError::Validation(_))
        ));
        assert!(matches!(
            parse_csv("\n  \n"),
            Err(BudgetError::Validation(_))
        ));
    }
}
