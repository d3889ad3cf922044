//! Sign-up, sign-in and session endpoints

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use sikuwat_core::drafts::Role;

use super::ApiResponse;
use crate::auth::{AuthError, AuthUser, SignUp};
use crate::db::repos::{DbError, ProfileRepo};
use crate::http::error::ApiError;
use crate::http::extractors::CurrentUser;
use crate::http::server::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SignUpRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignInResponse {
    pub access_token: String,
    pub user: AuthUser,
    pub role: Option<Role>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    pub user: AuthUser,
    pub role: Option<Role>,
}

fn filled(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl SignUpRequest {
    fn into_sign_up(self) -> Result<SignUp, ApiError> {
        let (Some(email), Some(password), Some(name), Some(role)) = (
            filled(self.email),
            self.password.filter(|p| !p.is_empty()),
            filled(self.name),
            filled(self.role),
        ) else {
            return Err(ApiError::BadRequest(
                "Email, password, name, and role are required".into(),
            ));
        };

        let role = Role::parse(&role)
            .ok_or_else(|| ApiError::BadRequest("Role must be 'admin' or 'user'".into()))?;

        Ok(SignUp {
            email,
            password,
            name,
            role,
        })
    }
}

/// POST /auth/signup - create an account and its profile
async fn sign_up(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignUpRequest>,
) -> Result<Json<ApiResponse<AuthUser>>, ApiError> {
    let request = req.into_sign_up()?;
    let user = state.auth.sign_up(&request).await?;

    let email = user.email.as_deref().unwrap_or(&request.email);
    ProfileRepo::new(&state.pool)
        .upsert(&user.id, email, &request.name, request.role)
        .await?;

    tracing::info!(user_id = %user.id, role = request.role.as_str(), "account created");
    Ok(ApiResponse::created(user, "User created successfully", Vec::new()))
}

/// POST /auth/signin - password sign-in; farmers must be approved first
async fn sign_in(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> Result<Json<ApiResponse<SignInResponse>>, ApiError> {
    let (Some(email), Some(password)) = (filled(req.email), req.password.filter(|p| !p.is_empty()))
    else {
        return Err(ApiError::BadRequest("Email and password are required".into()));
    };

    let session = match state.auth.sign_in(&email, &password).await {
        Ok(session) => session,
        Err(AuthError::Rejected { message }) => return Err(ApiError::Unauthorized(message)),
        Err(e) => return Err(e.into()),
    };

    if session.user.role == Some(Role::User) {
        let approved = match ProfileRepo::new(&state.pool).get(&session.user.id).await {
            Ok(profile) => profile.is_approved,
            Err(DbError::NotFound { .. }) => false,
            Err(e) => return Err(e.into()),
        };
        if !approved {
            tracing::info!(user_id = %session.user.id, "sign-in refused, awaiting approval");
            return Err(ApiError::Forbidden(
                "Account is waiting for admin approval".into(),
            ));
        }
    }

    let role = session.user.role;
    Ok(ApiResponse::data(SignInResponse {
        access_token: session.access_token,
        user: session.user,
        role,
    }))
}

/// GET /auth/session - the account behind the bearer token
async fn session(CurrentUser(user): CurrentUser) -> Json<ApiResponse<SessionResponse>> {
    let role = user.role;
    ApiResponse::data(SessionResponse {
        authenticated: true,
        user,
        role,
    })
}

/// Auth routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
        .route("/auth/session", get(session))
}
