//! Member and group database models

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Row of the `members` table (without the password hash)
#[derive(Debug, Clone, FromRow)]
pub struct MemberModel {
    pub id: Uuid,
    pub full_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projection returned by the member map query
#[derive(Debug, Clone, FromRow)]
pub struct MemberLocationModel {
    pub full_name: String,
    pub phone: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub role: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct GroupModel {
    pub id: Uuid,
    pub name: String,
    pub overseer_id: Option<Uuid>,
    pub assistant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}
