//! PostgreSQL implementation of GroupRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use flock_core::entities::Group;
use flock_core::error::DomainError;
use flock_core::traits::{GroupRepository, RepoResult};
use flock_core::value_objects::{GroupId, MemberId};

use crate::models::GroupModel;

use super::error::map_db_error;

#[derive(Clone)]
pub struct PgGroupRepository {
    pool: PgPool,
}

impl PgGroupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GroupRepository for PgGroupRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: GroupId) -> RepoResult<Option<Group>> {
        let row = sqlx::query_as::<_, GroupModel>(
            "SELECT id, name, overseer_id, assistant_id, created_at FROM groups WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(row.map(Group::from))
    }

    #[instrument(skip(self))]
    async fn list_all(&self) -> RepoResult<Vec<Group>> {
        let rows = sqlx::query_as::<_, GroupModel>(
            "SELECT id, name, overseer_id, assistant_id, created_at FROM groups ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Group::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_for_member(&self, member_id: MemberId) -> RepoResult<Vec<Group>> {
        let rows = sqlx::query_as::<_, GroupModel>(
            r"
            SELECT g.id, g.name, g.overseer_id, g.assistant_id, g.created_at
            FROM groups g
            WHERE g.overseer_id = $1
               OR g.assistant_id = $1
               OR EXISTS (SELECT 1 FROM members m WHERE m.id = $1 AND m.group_id = g.id)
            ORDER BY g.name
            ",
        )
        .bind(member_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(rows.into_iter().map(Group::from).collect())
    }

    #[instrument(skip(self, group), fields(group_id = %group.id))]
    async fn create(&self, group: &Group) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO groups (id, name, overseer_id, assistant_id, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(group.id.into_inner())
        .bind(&group.name)
        .bind(group.overseer_id.map(MemberId::into_inner))
        .bind(group.assistant_id.map(MemberId::into_inner))
        .bind(group.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self, group), fields(group_id = %group.id))]
    async fn update(&self, group: &Group) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE groups SET name = $2, overseer_id = $3, assistant_id = $4 WHERE id = $1",
        )
        .bind(group.id.into_inner())
        .bind(&group.name)
        .bind(group.overseer_id.map(MemberId::into_inner))
        .bind(group.assistant_id.map(MemberId::into_inner))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::GroupNotFound(group.id));
        }
        Ok(())
    }
}
