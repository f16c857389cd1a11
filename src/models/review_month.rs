//! Periodo de revisión de scorecards en formato `YYYY-MM`

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReviewMonth {
    first_day: NaiveDate,
}

impl ReviewMonth {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// Mes que contiene la fecha dada
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Primer día del mes siguiente (límite exclusivo)
    pub fn next_first_day(&self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date < self.next_first_day()
    }
}

impl fmt::Display for ReviewMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.first_day.year(), self.first_day.month())
    }
}

impl FromStr for ReviewMonth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || format!("invalid month '{}', expected YYYY-MM", s);
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;
        ReviewMonth::new(year, month).ok_or_else(invalid)
    }
}

impl Serialize for ReviewMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ReviewMonth {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let month: ReviewMonth = "2025-03".parse().unwrap();
        assert_eq!(month.to_string(), "2025-03");
        assert_eq!(month.first_day(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!("2025-3".parse::<ReviewMonth>().is_err());
        assert!("2025-13".parse::<ReviewMonth>().is_err());
        assert!("March".parse::<ReviewMonth>().is_err());
    }

    #[test]
    fn test_contains_handles_year_end() {
        let december: ReviewMonth = "2024-12".parse().unwrap();
        assert!(december.contains(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()));
        assert!(!december.contains(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()));
        assert_eq!(december.next_first_day(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }
}
