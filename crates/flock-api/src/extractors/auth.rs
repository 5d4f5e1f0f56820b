//! Authentication extractors
//!
//! [`AuthUser`] validates the bearer token only. [`CurrentActor`] also loads
//! the member so the role is current, and is what dashboard handlers take.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use flock_core::MemberId;
use flock_service::services::AuthService;
use flock_service::Actor;

use crate::response::ApiError;
use crate::state::AppState;

/// Token holder extracted from a valid access JWT
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub member_id: MemberId,
    /// Session the token pair belongs to
    pub session_id: String,
}

async fn bearer_token<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<String, ApiError> {
    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::MissingAuth)?;
    Ok(bearer.token().to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts, state).await?;
        let app_state = AppState::from_ref(state);

        let claims = app_state
            .jwt_service()
            .validate_access_token(&token)
            .map_err(|e| {
                tracing::warn!(error = %e, "Invalid access token");
                ApiError::App(e)
            })?;
        let member_id = claims.member_id()?;

        Ok(AuthUser {
            member_id,
            session_id: claims.sid,
        })
    }
}

/// The acting member, resolved per request from the bearer token
#[derive(Debug, Clone)]
pub struct CurrentActor(pub Actor);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        let app_state = AppState::from_ref(state);

        let actor = AuthService::new(app_state.service_context())
            .actor_for(user.member_id)
            .await?;
        Ok(CurrentActor(actor))
    }
}
