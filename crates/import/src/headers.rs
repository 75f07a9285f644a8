//! Header resolution: maps messy French or English spreadsheet headers
//! onto the logical campaign fields and week columns.

use budget_core::error::{BudgetError, BudgetResult};
use budget_core::week::WeekKey;
use std::collections::HashMap;

/// Logical scalar fields an import row can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Channel,
    Name,
    Objective,
    Audience,
    StartDate,
    TotalBudget,
    Duration,
}

impl Field {
    pub const ALL: [Field; 7] = [
        Field::Channel,
        Field::Name,
        Field::Objective,
        Field::Audience,
        Field::StartDate,
        Field::TotalBudget,
        Field::Duration,
    ];

    /// Header fragments that identify this field, in priority order.
    /// Matched case-insensitively as substrings: the first candidate found
    /// in any header wins, so `début` outranks the generic `date`.
    fn candidates(self) -> &'static [&'static str] {
        match self {
            Field::Channel => &["media", "levier", "channel", "canal"],
            Field::Name => &["campagne", "campaign", "nom"],
            Field::Objective => &["objectif", "objective"],
            Field::Audience => &["cible", "audience", "target"],
            Field::StartDate => &["début", "debut", "start", "date"],
            Field::TotalBudget => &["budget total", "total budget", "budget"],
            Field::Duration => &["durée", "duree", "duration", "jours", "days"],
        }
    }

    /// Whether an unresolvable header aborts the import. Duration is the
    /// one field real exports routinely omit; it defaults per row instead.
    fn is_required(self) -> bool {
        !matches!(self, Field::Duration)
    }

    /// Name used in missing-column error messages.
    pub fn label(self) -> &'static str {
        match self {
            Field::Channel => "media channel",
            Field::Name => "campaign name",
            Field::Objective => "marketing objective",
            Field::Audience => "target audience",
            Field::StartDate => "start date",
            Field::TotalBudget => "total budget",
            Field::Duration => "duration",
        }
    }
}

/// Column layout resolved from one header row.
#[derive(Debug, Clone)]
pub struct HeaderLayout {
    columns: HashMap<Field, usize>,
    /// Week columns in header order, with their canonical key.
    pub week_columns: Vec<(usize, WeekKey)>,
}

impl HeaderLayout {
    /// Resolves every logical field and week column from the raw header
    /// row. When a required field cannot be matched the whole import is
    /// aborted, listing everything that is missing.
    pub fn resolve(headers: &[String]) -> BudgetResult<Self> {
        let lowered: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();

        let mut columns = HashMap::new();
        let mut missing = Vec::new();
        for field in Field::ALL {
            match resolve_field(field, &lowered) {
                Some(idx) => {
                    columns.insert(field, idx);
                }
                None if field.is_required() => missing.push(field.label().to_string()),
                None => {}
            }
        }
        if !missing.is_empty() {
            return Err(BudgetError::MissingRequiredColumns(missing));
        }

        let week_columns = lowered
            .iter()
            .enumerate()
            .filter_map(|(idx, header)| parse_week_header(header).map(|week| (idx, week)))
            .collect();

        Ok(Self {
            columns,
            week_columns,
        })
    }

    /// Column index of a logical field, if its header was found.
    pub fn column(&self, field: Field) -> Option<usize> {
        self.columns.get(&field).copied()
    }
}

fn resolve_field(field: Field, lowered_headers: &[String]) -> Option<usize> {
    for candidate in field.candidates() {
        if let Some(idx) = lowered_headers.iter().position(|h| h.contains(candidate)) {
            return Some(idx);
        }
    }
    None
}

/// Matches a week header: `S<n>`, `Semaine <n>`, `W<n>`, or `Week <n>`,
/// optionally suffixed with `(%)`, for 1 <= n <= 52. Case-insensitive.
pub fn parse_week_header(header: &str) -> Option<WeekKey> {
    let lowered = header.trim().to_lowercase();
    let rest = lowered
        .strip_prefix("semaine")
        .or_else(|| lowered.strip_prefix("week"))
        .or_else(|| lowered.strip_prefix('s'))
        .or_else(|| lowered.strip_prefix('w'))?;

    let rest = rest.trim_start();
    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, tail) = rest.split_at(digits_end);
    if digits.is_empty() {
        return None;
    }
    let tail = tail.trim();
    if !(tail.is_empty() || tail == "(%)") {
        return None;
    }
    let number: u8 = digits.parse().ok()?;
    WeekKey::new(number)
}
