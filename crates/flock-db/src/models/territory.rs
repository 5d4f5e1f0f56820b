//! Territory database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct TerritoryModel {
    pub id: Uuid,
    pub number: String,
    pub name: String,
    pub locality: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct AssignmentModel {
    pub id: Uuid,
    pub territory_id: Uuid,
    pub member_id: Uuid,
    pub assigned_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}
