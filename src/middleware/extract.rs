use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;

use super::session::SessionContext;
use crate::auth::Claims;
use crate::error::ApiError;

fn session_claims(parts: &Parts) -> Option<Claims> {
    parts.extensions.get::<SessionContext>().and_then(|ctx| ctx.0.clone())
}

/// Signed-in caller. Rejects with 401 when there is no valid session.
#[derive(Clone, Debug)]
pub struct AuthUser(pub Claims);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        session_claims(parts)
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}

/// Signed-in ADMIN. 401 without a session, 403 for any other role.
#[derive(Clone, Debug)]
pub struct AdminUser(pub Claims);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let AuthUser(claims) = AuthUser::from_request_parts(parts, state).await?;
        if !claims.is_admin() {
            tracing::warn!("Admin route refused for {} ({:?})", claims.sub, claims.role);
            return Err(ApiError::forbidden("Admin access required"));
        }
        Ok(AdminUser(claims))
    }
}

/// Session when present, never rejects
#[derive(Clone, Debug)]
pub struct MaybeUser(pub Option<Claims>);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(session_claims(parts)))
    }
}

/// `Json<T>` with rejections reported in the API error envelope
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ValidJson(value)),
            Err(rejection) => Err(json_rejection(rejection)),
        }
    }
}

fn json_rejection(rejection: JsonRejection) -> ApiError {
    match rejection {
        JsonRejection::MissingJsonContentType(_) => ApiError::invalid_json("Expected a JSON request body"),
        other => ApiError::invalid_json(other.body_text()),
    }
}
