//! Group service
//!
//! Field-service groups. Members with `groups:manage` see every group;
//! everyone else sees only the groups they belong to or lead.

use flock_core::entities::Group;
use flock_core::value_objects::{Capabilities, GroupId};
use flock_core::DomainError;
use tracing::{info, instrument};

use crate::dto::{CreateGroupRequest, GroupResponse, MemberResponse};
use crate::gate::Actor;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

pub const GROUPS_ROUTE: &str = "/dashboard/groups";

pub struct GroupService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> GroupService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Groups visible to the actor
    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn list_for_actor(&self, actor: &Actor) -> ServiceResult<Vec<GroupResponse>> {
        self.ctx.gate().authorize(actor, GROUPS_ROUTE)?;

        let groups = if actor.can(Capabilities::MANAGE_GROUPS) {
            self.ctx.storage(self.ctx.group_repo().list_all()).await?
        } else {
            self.ctx
                .storage(self.ctx.group_repo().find_for_member(actor.member_id))
                .await?
        };

        Ok(groups.into_iter().map(GroupResponse::from).collect())
    }

    /// Members of a group the actor can see
    #[instrument(skip(self, actor), fields(actor = %actor.member_id))]
    pub async fn members(
        &self,
        actor: &Actor,
        group_id: GroupId,
    ) -> ServiceResult<Vec<MemberResponse>> {
        self.ctx.gate().authorize(actor, GROUPS_ROUTE)?;

        if !actor.can(Capabilities::MANAGE_GROUPS) {
            let own = self
                .ctx
                .storage(self.ctx.group_repo().find_for_member(actor.member_id))
                .await?;
            if !own.iter().any(|g| g.id == group_id) {
                return Err(ServiceError::unauthorized(format!(
                    "{GROUPS_ROUTE}/{group_id}"
                )));
            }
        }

        let members = self
            .ctx
            .storage(self.ctx.member_repo().find_by_group(group_id))
            .await?;
        Ok(members.iter().map(MemberResponse::from).collect())
    }

    #[instrument(skip(self, actor, request), fields(actor = %actor.member_id))]
    pub async fn create(
        &self,
        actor: &Actor,
        request: CreateGroupRequest,
    ) -> ServiceResult<GroupResponse> {
        self.ctx.gate().authorize(actor, "groups:manage")?;

        for leader in [request.overseer_id, request.assistant_id].into_iter().flatten() {
            self.ctx
                .storage(self.ctx.member_repo().find_by_id(leader))
                .await?
                .ok_or(DomainError::MemberNotFound(leader))?;
        }

        let mut group = Group::new(GroupId::new(), request.name.trim().to_string());
        group.overseer_id = request.overseer_id;
        group.assistant_id = request.assistant_id;

        self.ctx
            .storage(self.ctx.group_repo().create(&group))
            .await?;

        info!(group_id = %group.id, name = %group.name, "Group created");
        Ok(GroupResponse::from(group))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::SetGroupRequest;
    use crate::services::MemberService;
    use crate::test_support::{actor_for, seed_member, TestEnv};
    use flock_core::Role;

    fn request(name: &str) -> CreateGroupRequest {
        CreateGroupRequest {
            name: name.to_string(),
            overseer_id: None,
            assistant_id: None,
        }
    }

    #[tokio::test]
    async fn test_visibility_by_capability() {
        let env = TestEnv::new();
        let elder = seed_member(&env, "Elder Diaz", Role::Elder);
        let publisher = seed_member(&env, "Pat", Role::Publisher);
        let service = GroupService::new(&env.ctx);
        let elder_actor = actor_for(&elder);

        let north = service.create(&elder_actor, request("North")).await.unwrap();
        service.create(&elder_actor, request("South")).await.unwrap();

        MemberService::new(&env.ctx)
            .set_group(
                &elder_actor,
                publisher.id,
                SetGroupRequest {
                    group_id: Some(north.id),
                },
            )
            .await
            .unwrap();

        assert_eq!(service.list_for_actor(&elder_actor).await.unwrap().len(), 2);

        let own = service.list_for_actor(&actor_for(&publisher)).await.unwrap();
        assert_eq!(own.len(), 1);
        assert_eq!(own[0].name, "North");
    }

    #[tokio::test]
    async fn test_members_of_foreign_group_denied() {
        let env = TestEnv::new();
        let elder = seed_member(&env, "Elder Diaz", Role::Elder);
        let publisher = seed_member(&env, "Pat", Role::Publisher);
        let service = GroupService::new(&env.ctx);

        let south = service
            .create(&actor_for(&elder), request("South"))
            .await
            .unwrap();
        let err = service
            .members(&actor_for(&publisher), south.id)
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[tokio::test]
    async fn test_publisher_cannot_create() {
        let env = TestEnv::new();
        let publisher = seed_member(&env, "Pat", Role::Publisher);
        let err = GroupService::new(&env.ctx)
            .create(&actor_for(&publisher), request("West"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized { .. }));
    }
}
