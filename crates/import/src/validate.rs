//! Upload validation applied before any parsing: file type and size.

use budget_core::error::{BudgetError, BudgetResult};

/// Checks an upload's extension and size against the import limits.
///
/// Excel workbooks get a dedicated message pointing at the CSV export
/// path rather than a generic rejection.
pub fn validate_file(filename: &str, size_bytes: usize, max_bytes: usize) -> BudgetResult<()> {
    let extension = filename
        .rfind('.')
        .map(|idx| filename[idx..].to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        ".csv" | ".json" => {}
        ".xlsx" | ".xls" => {
            return Err(BudgetError::Validation(
                "Excel workbooks are not supported; export the sheet as CSV first".to_string(),
            ))
        }
        _ => {
            return Err(BudgetError::Validation(
                "unsupported file type; only .csv and .json imports are accepted".to_string(),
            ))
        }
    }

    if size_bytes > max_bytes {
        return Err(BudgetError::Validation(format!(
            "file is too large; the import limit is {} MB",
            max_bytes / (1024 * 1024)
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE_MB: usize = 5 * 1024 * 1024;

    #[test]
    fn test_accepts_csv_and_json_within_the_limit() {
        assert!(validate_file("campagnes.csv", 1024, FIVE_MB).is_ok());
        assert!(validate_file("CAMPAGNES.JSON", FIVE_MB, FIVE_MB).is_ok());
    }

    #[test]
    fn test_excel_gets_a_pointer_to_csv_export() {
        let err = validate_file("budget.xlsx", 1024, FIVE_MB).unwrap_err();
        match err {
            BudgetError::Validation(message) => assert!(message.contains("CSV")),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert!(validate_file("budget.xls", 1024, FIVE_MB).is_err());
    }

    #[test]
    fn test_unknown_extensions_are_rejected() {
        assert!(validate_file("campagnes.txt", 1024, FIVE_MB).is_err());
        assert!(validate_file("sans_extension", 1024, FIVE_MB).is_err());
    }

    #[test]
    fn test_oversized_files_are_rejected() {
        let err = validate_file("gros.csv", FIVE_MB + 1, FIVE_MB).unwrap_err();
        match err {
            BudgetError::Validation(message) => assert!(message.contains("5 MB")),
            other => panic!("expected Validation, got {other:?}"),
        }
    }
}
