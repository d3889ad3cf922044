//! Custom Axum extractors for the caller's identity

use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use sikuwat_core::drafts::Role;

use super::error::ApiError;
use super::server::AppState;
use crate::auth::{parse_bearer, AuthError, AuthUser};

const ADMIN_REQUIRED: &str = "Unauthorized - Admin access required";
const USER_REQUIRED: &str = "Unauthorized - User access required";

/// Missing or rejected credentials get the role-specific message; platform
/// failures keep their own status.
fn role_rejection(err: ApiError, message: &str) -> ApiError {
    match err {
        ApiError::Unauthorized(_) => ApiError::Unauthorized(message.into()),
        other => other,
    }
}

/// Any caller with a valid bearer token
pub struct CurrentUser(pub AuthUser);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_bearer)
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized".into()))?;

        match state.auth.user_for_token(token).await {
            Ok(user) => Ok(Self(user)),
            Err(AuthError::InvalidToken) => Err(ApiError::Unauthorized("Unauthorized".into())),
            Err(e) => {
                tracing::warn!(error = %e, "token check failed");
                Err(e.into())
            }
        }
    }
}

/// Caller whose account role is `admin`
pub struct AdminUser(pub AuthUser);

impl FromRequestParts<Arc<AppState>> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state)
            .await
            .map_err(|e| role_rejection(e, ADMIN_REQUIRED))?;

        if user.is_admin() {
            Ok(Self(user))
        } else {
            Err(ApiError::Unauthorized(ADMIN_REQUIRED.into()))
        }
    }
}

/// Caller whose account role is `user` (a farmer)
pub struct FarmerUser(pub AuthUser);

impl FromRequestParts<Arc<AppState>> for FarmerUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state)
            .await
            .map_err(|e| role_rejection(e, USER_REQUIRED))?;

        if user.role == Some(Role::User) {
            Ok(Self(user))
        } else {
            Err(ApiError::Unauthorized(USER_REQUIRED.into()))
        }
    }
}
