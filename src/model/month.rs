//! A calendar month, the unit of budgets and reports.

use anyhow::{bail, Context};
use chrono::{Datelike, Duration, Local, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// A calendar month. Constructing one always normalizes to the first day, so two `Month` values
/// made from different days of the same month are equal.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Month {
    first: NaiveDate,
}

impl Month {
    /// Creates a month from a year and a 1-based month number.
    pub fn new(year: i32, month: u32) -> crate::error::Res<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .with_context(|| format!("Invalid month {year}-{month:02}"))?;
        Ok(Self { first })
    }

    /// The month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first: date - Duration::days(i64::from(date.day0())),
        }
    }

    /// The month containing today's local date.
    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    /// The true last day of the month, e.g. the 28th or 29th for February.
    pub fn last_day(&self) -> NaiveDate {
        self.next().first - Duration::days(1)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day() && date <= self.last_day()
    }

    pub fn next(&self) -> Self {
        let (year, month) = match self.month() {
            12 => (self.year() + 1, 1),
            m => (self.year(), m + 1),
        };
        Self::first_of(year, month)
    }

    pub fn prev(&self) -> Self {
        let (year, month) = match self.month() {
            1 => (self.year() - 1, 12),
            m => (self.year(), m - 1),
        };
        Self::first_of(year, month)
    }

    /// The `count` months ending with (and including) `self`, oldest first.
    pub fn trailing(&self, count: u32) -> Vec<Month> {
        let mut months = Vec::with_capacity(count as usize);
        let mut month = *self;
        for _ in 0..count {
            months.push(month);
            month = month.prev();
        }
        months.reverse();
        months
    }

    /// A short human label such as `Oct 2025`.
    pub fn label(&self) -> String {
        self.first.format("%b %Y").to_string()
    }

    // `month` always comes from an existing `Month` so the first of it is always valid.
    fn first_of(year: i32, month: u32) -> Self {
        let first = NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN);
        Self { first }
    }
}

impl Display for Month {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

/// Parses `YYYY-MM` or a full `YYYY-MM-DD` date, which is normalized to its month.
impl FromStr for Month {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
            return Ok(Self::of(date));
        }
        let Some((year, month)) = s.split_once('-') else {
            bail!("Invalid month '{s}', expected YYYY-MM")
        };
        let year: i32 = year
            .parse()
            .with_context(|| format!("Invalid year in month '{s}'"))?;
        let month: u32 = month
            .parse()
            .with_context(|| format!("Invalid month number in month '{s}'"))?;
        Self::new(year, month)
    }
}

impl Serialize for Month {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Month {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Month::from_str(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_last_day_uses_true_month_length() {
        assert_eq!(Month::new(2025, 2).unwrap().last_day(), date("2025-02-28"));
        assert_eq!(Month::new(2024, 2).unwrap().last_day(), date("2024-02-29"));
        assert_eq!(Month::new(2025, 4).unwrap().last_day(), date("2025-04-30"));
        assert_eq!(Month::new(2025, 12).unwrap().last_day(), date("2025-12-31"));
    }

    #[test]
    fn test_contains_boundaries() {
        let june = Month::new(2025, 6).unwrap();
        assert!(june.contains(date("2025-06-01")));
        assert!(june.contains(date("2025-06-30")));
        assert!(!june.contains(date("2025-05-31")));
        assert!(!june.contains(date("2025-07-01")));
    }

    #[test]
    fn test_parse_normalizes_to_first_day() {
        let a: Month = "2025-10".parse().unwrap();
        let b: Month = "2025-10-19".parse().unwrap();
        assert_eq!(a, b);
        assert_eq!(b.first_day(), date("2025-10-01"));
        assert_eq!(b.to_string(), "2025-10");
    }

    #[test]
    fn test_parse_errors() {
        assert!("2025-13".parse::<Month>().is_err());
        assert!("October".parse::<Month>().is_err());
        assert!("2025-xx".parse::<Month>().is_err());
    }

    #[test]
    fn test_next_and_prev_cross_years() {
        let jan = Month::new(2026, 1).unwrap();
        assert_eq!(jan.prev(), Month::new(2025, 12).unwrap());
        assert_eq!(jan.prev().next(), jan);
    }

    #[test]
    fn test_trailing_is_oldest_first() {
        let feb = Month::new(2026, 2).unwrap();
        let months: Vec<String> = feb.trailing(4).iter().map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2025-11", "2025-12", "2026-01", "2026-02"]);
        assert!(feb.trailing(0).is_empty());
    }

    #[test]
    fn test_label() {
        assert_eq!(Month::new(2025, 10).unwrap().label(), "Oct 2025");
    }

    #[test]
    fn test_serde() {
        let month = Month::new(2025, 3).unwrap();
        assert_eq!(serde_json::to_string(&month).unwrap(), "\"2025-03\"");
        let parsed: Month = serde_json::from_str("\"2025-03-01\"").unwrap();
        assert_eq!(parsed, month);
    }
}
