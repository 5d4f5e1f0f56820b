//! Reporting month value object

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error when parsing a `YYYY-MM` month
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid month '{0}', expected YYYY-MM")]
pub struct ServiceMonthParseError(pub String);

/// A calendar month used to key field-service reports and SMS reminders
///
/// Written as `YYYY-MM`, stored as the first day of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ServiceMonth(NaiveDate);

impl ServiceMonth {
    /// Month for a year and 1-based month number
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self)
    }

    /// Month containing the given date
    pub fn containing(date: NaiveDate) -> Self {
        Self(date.with_day(1).unwrap_or(date))
    }

    /// Current month (UTC)
    pub fn current() -> Self {
        Self::containing(Utc::now().date_naive())
    }

    /// The month before this one
    pub fn previous(&self) -> Self {
        let (year, month) = if self.0.month() == 1 {
            (self.0.year() - 1, 12)
        } else {
            (self.0.year(), self.0.month() - 1)
        };
        Self::new(year, month).unwrap_or(*self)
    }

    /// First day of the month, the storage representation
    #[inline]
    pub fn first_day(&self) -> NaiveDate {
        self.0
    }

    #[inline]
    pub fn year(&self) -> i32 {
        self.0.year()
    }

    #[inline]
    pub fn month(&self) -> u32 {
        self.0.month()
    }
}

impl fmt::Display for ServiceMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.0.year(), self.0.month())
    }
}

impl FromStr for ServiceMonth {
    type Err = ServiceMonthParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ServiceMonthParseError(s.to_string());
        let (year, month) = s.split_once('-').ok_or_else(err)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(err());
        }
        let year = year.parse::<i32>().map_err(|_| err())?;
        let month = month.parse::<u32>().map_err(|_| err())?;
        Self::new(year, month).ok_or_else(err)
    }
}

impl From<NaiveDate> for ServiceMonth {
    fn from(date: NaiveDate) -> Self {
        Self::containing(date)
    }
}

impl Serialize for ServiceMonth {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ServiceMonth {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
