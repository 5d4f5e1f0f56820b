//! Monthly field-service report

use chrono::{DateTime, Utc};

use crate::error::DomainError;
use crate::value_objects::{MemberId, ReportId, ServiceMonth};

/// Upper bound on hours a single month can plausibly hold
pub const MAX_MONTHLY_HOURS: i32 = 24 * 31;

/// Field-service report for one member and month
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldServiceReport {
    pub id: ReportId,
    pub member_id: MemberId,
    pub month: ServiceMonth,
    pub participated: bool,
    pub bible_studies: i32,
    /// Only reported by pioneers
    pub hours: Option<i32>,
    pub remarks: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

impl FieldServiceReport {
    pub fn new(id: ReportId, member_id: MemberId, month: ServiceMonth, participated: bool) -> Self {
        Self {
            id,
            member_id,
            month,
            participated,
            bible_studies: 0,
            hours: None,
            remarks: None,
            submitted_at: Utc::now(),
        }
    }

    /// Check field ranges before the report reaches storage
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.bible_studies < 0 {
            return Err(DomainError::ValidationError(
                "bible_studies cannot be negative".to_string(),
            ));
        }
        if let Some(hours) = self.hours {
            if !(0..=MAX_MONTHLY_HOURS).contains(&hours) {
                return Err(DomainError::ValidationError(format!(
                    "hours must be between 0 and {MAX_MONTHLY_HOURS}"
                )));
            }
        }
        if !self.participated && (self.bible_studies > 0 || self.hours.is_some_and(|h| h > 0)) {
            return Err(DomainError::ValidationError(
                "activity reported for a month without participation".to_string(),
            ));
        }
        Ok(())
    }
}
