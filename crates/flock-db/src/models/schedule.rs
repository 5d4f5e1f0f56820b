//! Duty and report database models

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct DutyModel {
    pub id: Uuid,
    pub kind: String,
    pub date: NaiveDate,
    pub member_id: Uuid,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, FromRow)]
pub struct ReportModel {
    pub id: Uuid,
    pub member_id: Uuid,
    /// First day of the reporting month
    pub month: NaiveDate,
    pub participated: bool,
    pub bible_studies: i32,
    pub hours: Option<i32>,
    pub remarks: Option<String>,
    pub submitted_at: DateTime<Utc>,
}
