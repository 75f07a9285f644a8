pub mod config;
pub mod error;
pub mod types;
pub mod week;

pub use config::AppConfig;
pub use error::{BudgetError, BudgetResult};
pub use types::Campaign;
pub use week::WeekKey;
