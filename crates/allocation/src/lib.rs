//! Budget allocation rules and aggregate variance summaries — the math
//! behind the planning grid.

pub mod engine;
pub mod summary;

pub use engine::{PERCENTAGE_CAP, PERCENTAGE_TOLERANCE};
pub use summary::{BudgetSummary, ChannelSummary, ObjectiveSummary};
