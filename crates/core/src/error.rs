use crate::week::WeekKey;
use thiserror::Error;
use uuid::Uuid;

pub type BudgetResult<T> = Result<T, BudgetError>;

#[derive(Error, Debug)]
pub enum BudgetError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Week {week} percentage {attempted:.2} would bring the campaign total to {projected_sum:.2}%, exceeding the 100% cap")]
    PercentageOverflow {
        week: WeekKey,
        attempted: f64,
        projected_sum: f64,
    },

    #[error("Missing required columns: {}", .0.join(", "))]
    MissingRequiredColumns(Vec<String>),

    #[error("Row {row}: {reason}")]
    RowProcessing { row: usize, reason: String },

    #[error("Remote sheet fetch failed: {0}")]
    RemoteFetch(String),

    #[error("Campaign not found: {0}")]
    CampaignNotFound(Uuid),

    #[error("Invalid week key: {0}")]
    InvalidWeek(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<crate::week::ParseWeekError> for BudgetError {
    fn from(err: crate::week::ParseWeekError) -> Self {
        BudgetError::InvalidWeek(err.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overflow_message_names_week_and_projected_sum() {
        let err = BudgetError::PercentageOverflow {
            week: WeekKey::new(3).unwrap(),
            attempted: 45.0,
            projected_sum: 112.5,
        };
        let message = err.to_string();
        assert!(message.contains("S3"));
        assert!(message.contains("112.50"));
    }

    #[test]
    fn test_missing_columns_are_listed() {
        let err = BudgetError::MissingRequiredColumns(vec![
            "media channel".to_string(),
            "campaign name".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing required columns: media channel, campaign name"
        );
    }

    #[test]
    fn test_week_parse_errors_convert() {
        let parse_err = "S99".parse::<WeekKey>().unwrap_err();
        let err: BudgetError = parse_err.into();
        assert!(matches!(err, BudgetError::InvalidWeek(_)));
    }
}
