//! PostgreSQL implementations of TerritoryRepository and AssignmentRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use flock_core::entities::{Territory, TerritoryAssignment};
use flock_core::error::DomainError;
use flock_core::traits::{AssignmentRepository, RepoResult, TerritoryRepository};
use flock_core::value_objects::{AssignmentId, TerritoryId};

use crate::models::{AssignmentModel, TerritoryModel};

use super::error::{map_db_error, map_foreign_key_violation, map_unique_violation};

#[derive(Clone)]
pub struct PgTerritoryRepository {
    pool: PgPool,
}

impl PgTerritoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TerritoryRepository for PgTerritoryRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: TerritoryId) -> RepoResult<Option<Territory>> {
        let row = sqlx::query_as::<_, TerritoryModel>(
            "SELECT id, number, name, locality, notes, created_at FROM territories WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Territory::from))
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> RepoResult<Vec<Territory>> {
        // Numbers are text ("12", "12a"); order numerically where possible
        let rows = sqlx::query_as::<_, TerritoryModel>(
            r"
            SELECT id, number, name, locality, notes, created_at
            FROM territories
            ORDER BY length(number), number
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Territory::from).collect())
    }

    #[instrument(skip(self, territory), fields(number = %territory.number))]
    async fn create(&self, territory: &Territory) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO territories (id, number, name, locality, notes, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(territory.id.into_inner())
        .bind(&territory.number)
        .bind(&territory.name)
        .bind(&territory.locality)
        .bind(&territory.notes)
        .bind(territory.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || DomainError::TerritoryNumberExists(territory.number.clone()))
        })?;

        Ok(())
    }
}

const ASSIGNMENT_COLUMNS: &str = "id, territory_id, member_id, assigned_at, completed_at";

#[derive(Clone)]
pub struct PgAssignmentRepository {
    pool: PgPool,
}

impl PgAssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AssignmentRepository for PgAssignmentRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: AssignmentId) -> RepoResult<Option<TerritoryAssignment>> {
        let row = sqlx::query_as::<_, AssignmentModel>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM territory_assignments WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(TerritoryAssignment::from))
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> RepoResult<Vec<TerritoryAssignment>> {
        let rows = sqlx::query_as::<_, AssignmentModel>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM territory_assignments ORDER BY assigned_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(TerritoryAssignment::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_open(
        &self,
        territory_id: TerritoryId,
    ) -> RepoResult<Option<TerritoryAssignment>> {
        let row = sqlx::query_as::<_, AssignmentModel>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM territory_assignments WHERE territory_id = $1 AND completed_at IS NULL"
        ))
        .bind(territory_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(TerritoryAssignment::from))
    }

    #[instrument(skip(self, assignment), fields(territory_id = %assignment.territory_id))]
    async fn create(&self, assignment: &TerritoryAssignment) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO territory_assignments (id, territory_id, member_id, assigned_at, completed_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(assignment.id.into_inner())
        .bind(assignment.territory_id.into_inner())
        .bind(assignment.member_id.into_inner())
        .bind(assignment.assigned_at)
        .bind(assignment.completed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                DomainError::TerritoryAlreadyAssigned
            } else {
                map_foreign_key_violation(e, || {
                    DomainError::TerritoryNotFound(assignment.territory_id)
                })
            }
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn complete(&self, id: AssignmentId, at: DateTime<Utc>) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE territory_assignments
            SET completed_at = GREATEST($2, assigned_at)
            WHERE id = $1 AND completed_at IS NULL
            ",
        )
        .bind(id.into_inner())
        .bind(at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::AssignmentNotFound);
        }
        Ok(())
    }
}
