//! PostgreSQL implementation of MemberRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use flock_core::entities::{Member, MemberLocation};
use flock_core::error::DomainError;
use flock_core::traits::{MemberRepository, RepoResult};
use flock_core::value_objects::{GroupId, MemberId};

use crate::mappers::members_from_rows;
use crate::models::{MemberLocationModel, MemberModel};

use super::error::{map_db_error, map_foreign_key_violation, map_unique_violation};

const MEMBER_COLUMNS: &str = "id, full_name, phone, email, role, latitude, longitude, group_id, created_at, updated_at";

#[derive(Clone)]
pub struct PgMemberRepository {
    pool: PgPool,
}

impl PgMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MemberRepository for PgMemberRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let row = sqlx::query_as::<_, MemberModel>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(Member::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<Member>> {
        let row = sqlx::query_as::<_, MemberModel>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE lower(email) = lower($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        row.map(Member::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn list(&self, limit: i64, offset: i64) -> RepoResult<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberModel>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members ORDER BY full_name, id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        members_from_rows(rows)
    }

    #[instrument(skip(self))]
    async fn find_with_location(&self, limit: i64) -> RepoResult<Vec<MemberLocation>> {
        let rows = sqlx::query_as::<_, MemberLocationModel>(
            r"
            SELECT full_name, phone, latitude, longitude, role
            FROM members
            WHERE latitude IS NOT NULL AND longitude IS NOT NULL
            ORDER BY full_name
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        rows.into_iter().map(MemberLocation::try_from).collect()
    }

    #[instrument(skip(self))]
    async fn find_with_phone(&self) -> RepoResult<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberModel>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE phone IS NOT NULL AND btrim(phone) <> '' ORDER BY full_name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        members_from_rows(rows)
    }

    #[instrument(skip(self))]
    async fn find_by_group(&self, group_id: GroupId) -> RepoResult<Vec<Member>> {
        let rows = sqlx::query_as::<_, MemberModel>(&format!(
            "SELECT {MEMBER_COLUMNS} FROM members WHERE group_id = $1 ORDER BY full_name"
        ))
        .bind(group_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        members_from_rows(rows)
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM members WHERE lower(email) = lower($1))",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self, member, password_hash), fields(member_id = %member.id))]
    async fn create(&self, member: &Member, password_hash: Option<&str>) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO members (id, full_name, phone, email, password_hash, role, latitude, longitude,
                                 group_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ",
        )
        .bind(member.id.into_inner())
        .bind(&member.full_name)
        .bind(&member.phone)
        .bind(&member.email)
        .bind(password_hash)
        .bind(member.role.as_str())
        .bind(member.location.map(|l| l.latitude))
        .bind(member.location.map(|l| l.longitude))
        .bind(member.group_id.map(GroupId::into_inner))
        .bind(member.created_at)
        .bind(member.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::EmailAlreadyExists))?;

        Ok(())
    }

    #[instrument(skip(self, member), fields(member_id = %member.id))]
    async fn update(&self, member: &Member) -> RepoResult<()> {
        let group_id = member.group_id;
        let result = sqlx::query(
            r"
            UPDATE members
            SET full_name = $2, phone = $3, email = $4, role = $5, latitude = $6, longitude = $7,
                group_id = $8, updated_at = $9
            WHERE id = $1
            ",
        )
        .bind(member.id.into_inner())
        .bind(&member.full_name)
        .bind(&member.phone)
        .bind(&member.email)
        .bind(member.role.as_str())
        .bind(member.location.map(|l| l.latitude))
        .bind(member.location.map(|l| l.longitude))
        .bind(group_id.map(GroupId::into_inner))
        .bind(member.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(|d| d.is_unique_violation()) {
                DomainError::EmailAlreadyExists
            } else {
                map_foreign_key_violation(e, || match group_id {
                    Some(id) => DomainError::GroupNotFound(id),
                    None => DomainError::InternalError("unexpected foreign key failure".to_string()),
                })
            }
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::MemberNotFound(member.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_password_hash(&self, id: MemberId) -> RepoResult<Option<String>> {
        let hash = sqlx::query_scalar::<_, Option<String>>(
            "SELECT password_hash FROM members WHERE id = $1",
        )
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(hash.flatten())
    }
}
