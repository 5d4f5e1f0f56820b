//! Member service
//!
//! Roster management and the member map projection.

use flock_common::auth::{hash_password, validate_password_strength};
use flock_core::entities::{Member, MemberLocation};
use flock_core::value_objects::{GeoLocation, MemberId};
use flock_core::DomainError;
use tracing::{info, instrument};

use crate::dto::{
    ChangeRoleRequest, CreateMemberRequest, MemberResponse, PaginatedResponse, SetGroupRequest,
    UpdateMemberRequest,
};
use crate::gate::Actor;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Resource guarding roster reads
pub const MEMBERS_ROUTE: &str = "/dashboard/members";

/// Member service
pub struct MemberService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MemberService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Members that have both coordinates, for the congregation map
    ///
    /// Capped at the configured location limit.
    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn members_with_location(&self, actor: &Actor) -> ServiceResult<Vec<MemberLocation>> {
        self.ctx.gate().authorize(actor, "members:locations")?;

        let limit = self.ctx.settings().location_limit;
        self.ctx
            .storage(self.ctx.member_repo().find_with_location(limit))
            .await
    }

    /// Page through the roster ordered by name
    #[instrument(skip(self, actor))]
    pub async fn list(
        &self,
        actor: &Actor,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<PaginatedResponse<MemberResponse>> {
        self.ctx.gate().authorize(actor, MEMBERS_ROUTE)?;

        let members = self
            .ctx
            .storage(self.ctx.member_repo().list(limit, offset))
            .await?;
        Ok(PaginatedResponse::new(
            members.iter().map(MemberResponse::from).collect(),
            limit,
            offset,
        ))
    }

    #[instrument(skip(self, actor))]
    pub async fn get(&self, actor: &Actor, member_id: MemberId) -> ServiceResult<MemberResponse> {
        self.ctx.gate().authorize(actor, MEMBERS_ROUTE)?;
        self.load(member_id).await.map(MemberResponse::from)
    }

    /// Add a member to the roster
    ///
    /// A password makes the member able to sign in, which requires an email.
    #[instrument(skip(self, actor, request), fields(actor = %actor.member_id))]
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateMemberRequest,
    ) -> ServiceResult<MemberResponse> {
        self.ctx.gate().authorize(actor, "members:manage")?;

        let location = GeoLocation::from_parts(request.latitude, request.longitude)?;
        let email = normalize_email(request.email);

        if request.role.is_some_and(|r| r != flock_core::Role::default()) {
            self.ctx.gate().authorize(actor, "roles:manage")?;
        }

        let password_hash = match request.password.as_deref() {
            Some(password) => {
                if email.is_none() {
                    return Err(ServiceError::validation(
                        "An email is required for members who can sign in",
                    ));
                }
                validate_password_strength(password)?;
                Some(hash_password(password)?)
            }
            None => None,
        };

        if let Some(email) = email.as_deref() {
            if self
                .ctx
                .storage(self.ctx.member_repo().email_exists(email))
                .await?
            {
                return Err(DomainError::EmailAlreadyExists.into());
            }
        }

        if let Some(group_id) = request.group_id {
            self.ensure_group(group_id).await?;
        }

        let mut member = Member::new(MemberId::new(), request.full_name.trim().to_string());
        member.phone = normalize_phone(request.phone);
        member.email = email;
        member.role = request.role.unwrap_or_default();
        member.location = location;
        member.group_id = request.group_id;

        self.ctx
            .storage(
                self.ctx
                    .member_repo()
                    .create(&member, password_hash.as_deref()),
            )
            .await?;

        info!(member_id = %member.id, role = %member.role, "Member created");
        Ok(MemberResponse::from(&member))
    }

    /// Apply a partial update
    ///
    /// Coordinates are replaced only as a pair; `clear_location` removes them.
    #[instrument(skip(self, actor, request), fields(actor = %actor.member_id))]
    pub async fn update(
        &self,
        actor: &Actor,
        member_id: MemberId,
        request: UpdateMemberRequest,
    ) -> ServiceResult<MemberResponse> {
        self.ctx.gate().authorize(actor, "members:manage")?;

        let location = GeoLocation::from_parts(request.latitude, request.longitude)?;
        if request.clear_location && location.is_some() {
            return Err(ServiceError::validation(
                "clear_location cannot be combined with coordinates",
            ));
        }

        let mut member = self.load(member_id).await?;

        if let Some(email) = normalize_email(request.email) {
            let changed = member
                .email
                .as_deref()
                .map_or(true, |current| !current.eq_ignore_ascii_case(&email));
            if changed
                && self
                    .ctx
                    .storage(self.ctx.member_repo().email_exists(&email))
                    .await?
            {
                return Err(DomainError::EmailAlreadyExists.into());
            }
            member.email = Some(email);
        }

        if let Some(name) = request.full_name {
            member.full_name = name.trim().to_string();
        }
        if request.phone.is_some() {
            member.phone = normalize_phone(request.phone);
        }
        if request.clear_location {
            member.set_location(None);
        } else if location.is_some() {
            member.set_location(location);
        }
        member.updated_at = chrono::Utc::now();

        self.ctx
            .storage(self.ctx.member_repo().update(&member))
            .await?;

        info!(member_id = %member.id, "Member updated");
        Ok(MemberResponse::from(&member))
    }

    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn change_role(
        &self,
        actor: &Actor,
        member_id: MemberId,
        request: ChangeRoleRequest,
    ) -> ServiceResult<MemberResponse> {
        self.ctx.gate().authorize(actor, "roles:manage")?;

        if member_id == actor.member_id && request.role != actor.role {
            return Err(ServiceError::validation("Members cannot change their own role"));
        }

        let mut member = self.load(member_id).await?;
        member.set_role(request.role);
        self.ctx
            .storage(self.ctx.member_repo().update(&member))
            .await?;

        info!(member_id = %member.id, role = %member.role, "Member role changed");
        Ok(MemberResponse::from(&member))
    }

    /// Move a member into a group, or out of every group
    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn set_group(
        &self,
        actor: &Actor,
        member_id: MemberId,
        request: SetGroupRequest,
    ) -> ServiceResult<MemberResponse> {
        self.ctx.gate().authorize(actor, "groups:manage")?;

        if let Some(group_id) = request.group_id {
            self.ensure_group(group_id).await?;
        }

        let mut member = self.load(member_id).await?;
        member.set_group(request.group_id);
        self.ctx
            .storage(self.ctx.member_repo().update(&member))
            .await?;

        Ok(MemberResponse::from(&member))
    }

    async fn load(&self, member_id: MemberId) -> ServiceResult<Member> {
        self.ctx
            .storage(self.ctx.member_repo().find_by_id(member_id))
            .await?
            .ok_or_else(|| DomainError::MemberNotFound(member_id).into())
    }

    async fn ensure_group(&self, group_id: flock_core::GroupId) -> ServiceResult<()> {
        self.ctx
            .storage(self.ctx.group_repo().find_by_id(group_id))
            .await?
            .map(|_| ())
            .ok_or_else(|| DomainError::GroupNotFound(group_id).into())
    }
}

fn normalize_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

fn normalize_phone(phone: Option<String>) -> Option<String> {
    phone
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{actor_for, seed_member, TestEnv};
    use flock_core::Role;

    fn located(lat: Option<f64>, lon: Option<f64>) -> CreateMemberRequest {
        CreateMemberRequest {
            full_name: "Sam Hill".to_string(),
            phone: Some("+15550101".to_string()),
            email: None,
            password: None,
            role: None,
            latitude: lat,
            longitude: lon,
            group_id: None,
        }
    }

    #[tokio::test]
    async fn test_members_with_location_returns_only_located() {
        let env = TestEnv::new();
        let elder = seed_member(&env, "Elder Diaz", Role::Elder);
        let service = MemberService::new(&env.ctx);
        let actor = actor_for(&elder);

        service
            .create(&actor, located(Some(40.0), Some(-75.0)))
            .await
            .unwrap();
        service.create(&actor, located(None, None)).await.unwrap();

        let located = service.members_with_location(&actor).await.unwrap();
        assert_eq!(located.len(), 1);
        assert_eq!(located[0].location, GeoLocation::new(40.0, -75.0).unwrap());
    }

    #[tokio::test]
    async fn test_half_location_rejected_before_storage() {
        let env = TestEnv::new();
        let elder = seed_member(&env, "Elder Diaz", Role::Elder);
        let before = env.store.member_count();

        let err = MemberService::new(&env.ctx)
            .create(&actor_for(&elder), located(Some(40.0), None))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(env.store.member_count(), before);
    }

    #[tokio::test]
    async fn test_publisher_cannot_read_locations_or_create() {
        let env = TestEnv::new();
        let publisher = seed_member(&env, "Pat", Role::Publisher);
        let service = MemberService::new(&env.ctx);
        let actor = actor_for(&publisher);

        assert!(matches!(
            service.members_with_location(&actor).await,
            Err(ServiceError::Unauthorized { .. })
        ));
        let before = env.store.member_count();
        assert!(matches!(
            service.create(&actor, located(Some(1.0), Some(1.0))).await,
            Err(ServiceError::Unauthorized { .. })
        ));
        assert_eq!(env.store.member_count(), before);
    }

    #[tokio::test]
    async fn test_storage_outage_is_data_access() {
        let env = TestEnv::new();
        let elder = seed_member(&env, "Elder Diaz", Role::Elder);
        env.store.set_unavailable(true);

        let err = MemberService::new(&env.ctx)
            .members_with_location(&actor_for(&elder))
            .await
            .unwrap_err();
        assert!(err.is_data_access());
        assert_eq!(err.status_code(), 500);
    }

    #[tokio::test]
    async fn test_update_and_clear_location() {
        let env = TestEnv::new();
        let elder = seed_member(&env, "Elder Diaz", Role::Elder);
        let target = seed_member(&env, "Kim", Role::Publisher);
        let service = MemberService::new(&env.ctx);
        let actor = actor_for(&elder);

        let updated = service
            .update(
                &actor,
                target.id,
                UpdateMemberRequest {
                    latitude: Some(51.5),
                    longitude: Some(-0.1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(updated.location.is_some());

        let cleared = service
            .update(
                &actor,
                target.id,
                UpdateMemberRequest {
                    clear_location: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(cleared.location.is_none());
    }

    #[tokio::test]
    async fn test_role_change_requires_roles_manage() {
        let env = TestEnv::new();
        let elder = seed_member(&env, "Elder Diaz", Role::Elder);
        let admin = seed_member(&env, "Admin", Role::Admin);
        let target = seed_member(&env, "Kim", Role::Publisher);
        let service = MemberService::new(&env.ctx);
        let request = ChangeRoleRequest {
            role: Role::MinisterialServant,
        };

        // Elders manage members but not roles
        assert!(matches!(
            service
                .change_role(&actor_for(&elder), target.id, request.clone())
                .await,
            Err(ServiceError::Unauthorized { .. })
        ));
        let changed = service
            .change_role(&actor_for(&admin), target.id, request)
            .await
            .unwrap();
        assert_eq!(changed.role, Role::MinisterialServant);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let env = TestEnv::new();
        let elder = seed_member(&env, "Elder Diaz", Role::Elder);
        let service = MemberService::new(&env.ctx);
        let actor = actor_for(&elder);

        let mut request = located(None, None);
        request.email = Some("sam@example.com".to_string());
        service.create(&actor, request.clone()).await.unwrap();

        request.email = Some("SAM@example.com".to_string());
        let err = service.create(&actor, request).await.unwrap_err();
        assert_eq!(err.status_code(), 409);
    }
}
