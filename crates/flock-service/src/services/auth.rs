//! Authentication service
//!
//! Handles login, token refresh, logout, actor resolution and the startup
//! administrator bootstrap.

use flock_common::auth::{
    hash_password, validate_password_strength, verify_against_dummy, verify_password,
};
use flock_common::{AppError, BootstrapAdmin};
use flock_core::entities::Member;
use flock_core::traits::SessionRecord;
use flock_core::value_objects::{MemberId, Role};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::dto::{AuthResponse, CurrentMemberResponse, LoginRequest, RefreshTokenRequest};
use crate::gate::Actor;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Authentication service
pub struct AuthService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> AuthService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Login with email and password
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: LoginRequest) -> ServiceResult<AuthResponse> {
        let Some(member) = self
            .ctx
            .storage(self.ctx.member_repo().find_by_email(&request.email))
            .await?
        else {
            verify_against_dummy(&request.password);
            warn!("Login failed: unknown email");
            return Err(AppError::InvalidCredentials.into());
        };

        let password_hash = self
            .ctx
            .storage(self.ctx.member_repo().get_password_hash(member.id))
            .await?
            .ok_or_else(|| {
                warn!(member_id = %member.id, "Login failed: member has no credentials");
                ServiceError::App(AppError::InvalidCredentials)
            })?;

        if !verify_password(&request.password, &password_hash)? {
            warn!(member_id = %member.id, "Login failed: invalid password");
            return Err(AppError::InvalidCredentials.into());
        }

        let response = self.open_session(&member).await?;
        info!(member_id = %member.id, "Member logged in");
        Ok(response)
    }

    /// Exchange a live refresh token for a new pair, retiring the old session
    #[instrument(skip(self, request))]
    pub async fn refresh(&self, request: RefreshTokenRequest) -> ServiceResult<AuthResponse> {
        let claims = self
            .ctx
            .jwt_service()
            .validate_refresh_token(&request.refresh_token)?;
        let member_id = claims.member_id()?;

        let session = self
            .ctx
            .storage(self.ctx.session_store().validate(&claims.sid))
            .await?
            .filter(|s| s.member_id == member_id)
            .ok_or(ServiceError::App(AppError::InvalidToken))?;

        let member = self
            .ctx
            .storage(self.ctx.member_repo().find_by_id(session.member_id))
            .await?
            .ok_or(ServiceError::App(AppError::InvalidToken))?;

        self.ctx
            .storage(self.ctx.session_store().revoke(&claims.sid))
            .await?;

        self.open_session(&member).await
    }

    /// End the session the access token belongs to
    ///
    /// A refresh token from another session of the same member is revoked
    /// too; anything else in the body is ignored.
    #[instrument(skip(self, refresh_token))]
    pub async fn logout(
        &self,
        member_id: MemberId,
        session_id: &str,
        refresh_token: Option<&str>,
    ) -> ServiceResult<()> {
        let mut revoked = self
            .ctx
            .storage(self.ctx.session_store().revoke(session_id))
            .await?;

        let other_session = refresh_token
            .and_then(|token| self.ctx.jwt_service().validate_refresh_token(token).ok())
            .filter(|claims| claims.sid != session_id)
            .filter(|claims| claims.member_id().is_ok_and(|id| id == member_id));
        if let Some(claims) = other_session {
            revoked |= self
                .ctx
                .storage(self.ctx.session_store().revoke(&claims.sid))
                .await?;
        }

        info!(member_id = %member_id, revoked, "Member logged out");
        Ok(())
    }

    /// End every session of a member
    #[instrument(skip(self))]
    pub async fn logout_everywhere(&self, member_id: MemberId) -> ServiceResult<u32> {
        self.ctx
            .storage(self.ctx.session_store().revoke_all_for_member(member_id))
            .await
    }

    /// Resolve a bearer access token into the acting member
    pub async fn authenticate(&self, access_token: &str) -> ServiceResult<Actor> {
        let claims = self.ctx.jwt_service().validate_access_token(access_token)?;
        let member_id = claims.member_id()?;
        self.actor_for(member_id).await
    }

    /// Actor for a member id taken from a validated token
    pub async fn actor_for(&self, member_id: MemberId) -> ServiceResult<Actor> {
        let member = self
            .ctx
            .storage(self.ctx.member_repo().find_by_id(member_id))
            .await?
            .ok_or(ServiceError::App(AppError::InvalidToken))?;
        Ok(Actor::from(&member))
    }

    /// Profile and capabilities of the signed-in member
    pub async fn current_member(&self, actor: &Actor) -> ServiceResult<CurrentMemberResponse> {
        let member = self
            .ctx
            .storage(self.ctx.member_repo().find_by_id(actor.member_id))
            .await?
            .ok_or_else(|| ServiceError::not_found("Member", actor.member_id.to_string()))?;
        Ok(CurrentMemberResponse::from(&member))
    }

    /// Create the configured administrator unless the email is already taken
    ///
    /// Returns whether a member was created.
    #[instrument(skip(self, admin), fields(email = %admin.email))]
    pub async fn bootstrap_admin(&self, admin: &BootstrapAdmin) -> ServiceResult<bool> {
        if self
            .ctx
            .storage(self.ctx.member_repo().email_exists(&admin.email))
            .await?
        {
            info!("Bootstrap administrator already present");
            return Ok(false);
        }

        validate_password_strength(&admin.password)?;
        let password_hash = hash_password(&admin.password)?;

        let mut member = Member::new(MemberId::new(), admin.full_name.clone());
        member.email = Some(admin.email.clone());
        member.role = Role::Admin;

        self.ctx
            .storage(
                self.ctx
                    .member_repo()
                    .create(&member, Some(&password_hash)),
            )
            .await?;

        info!(member_id = %member.id, "Bootstrap administrator created");
        Ok(true)
    }

    async fn open_session(&self, member: &Member) -> ServiceResult<AuthResponse> {
        let session_id = Uuid::new_v4().to_string();
        let pair = self.ctx.jwt_service().issue(member.id, &session_id)?;

        let record = SessionRecord::new(member.id, session_id.clone());
        self.ctx
            .storage(self.ctx.session_store().store(&session_id, &record))
            .await?;

        Ok(AuthResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: pair.token_type,
            expires_in: pair.expires_in,
            member: CurrentMemberResponse::from(member),
        })
    }
}
