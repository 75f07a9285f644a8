//! Week keys for the 52 weekly buckets of a planning year.

use chrono::{Datelike, NaiveDate};
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Number of weekly buckets in a planning year.
pub const WEEKS_PER_YEAR: u8 = 52;

/// A canonical week key, `S1` through `S52`.
///
/// Ordered numerically (`S2` sorts before `S10`) and serialized as the
/// canonical string, so it can key JSON maps like `{"S1": 5000.0}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WeekKey(u8);

impl WeekKey {
    /// Builds a week key from a 1-based week number. `None` outside 1..=52.
    pub fn new(number: u8) -> Option<Self> {
        if (1..=WEEKS_PER_YEAR).contains(&number) {
            Some(Self(number))
        } else {
            None
        }
    }

    /// The week bucket a calendar date falls into: its ISO week number,
    /// clamped to 52 for dates landing in an ISO week 53.
    pub fn for_date(date: NaiveDate) -> Self {
        Self(date.iso_week().week().min(WEEKS_PER_YEAR as u32) as u8)
    }

    /// The 1-based week number.
    pub fn number(self) -> u8 {
        self.0
    }

    /// All 52 week keys in order, `S1` first.
    pub fn all() -> impl Iterator<Item = WeekKey> {
        (1..=WEEKS_PER_YEAR).map(WeekKey)
    }
}

impl fmt::Display for WeekKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

impl FromStr for WeekKey {
    type Err = ParseWeekError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('S')
            .or_else(|| trimmed.strip_prefix('s'))
            .ok_or_else(|| ParseWeekError(s.to_string()))?;
        let number: u8 = digits
            .trim()
            .parse()
            .map_err(|_| ParseWeekError(s.to_string()))?;
        WeekKey::new(number).ok_or_else(|| ParseWeekError(s.to_string()))
    }
}

/// A week string that is not of the form `S1`..`S52`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseWeekError(pub String);

impl fmt::Display for ParseWeekError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid week key {:?} (expected S1..S{})",
            self.0, WEEKS_PER_YEAR
        )
    }
}

impl std::error::Error for ParseWeekError {}

impl Serialize for WeekKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for WeekKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct WeekVisitor;

        impl Visitor<'_> for WeekVisitor {
            type Value = WeekKey;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "a week key like \"S1\"")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<WeekKey, E> {
                v.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_str(WeekVisitor)
    }
}
