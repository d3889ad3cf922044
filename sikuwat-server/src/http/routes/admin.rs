//! Admin dashboard: farmer data, approvals and image uploads

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;

use sikuwat_core::stats::PlantingStats;

use super::{message, ApiResponse};
use crate::db::repos::{Planting, PlantingRepo, Profile, ProfileRepo};
use crate::http::error::ApiError;
use crate::http::extractors::AdminUser;
use crate::http::server::AppState;
use crate::models::{Pagination, PaginationParams};
use crate::storage::{StorageError, StoredObject, MAX_UPLOAD_BYTES};

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub filename: Option<String>,
}

/// GET /admin/user-data - every farmer's plantings
async fn user_data(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<Planting>>>, ApiError> {
    let plantings = PlantingRepo::new(&state.pool)
        .list_all(Pagination::from(params))
        .await?;
    Ok(ApiResponse::page(plantings))
}

/// GET /admin/stats - statistics over all plantings
async fn stats(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
) -> Result<Json<ApiResponse<PlantingStats>>, ApiError> {
    let figures = PlantingRepo::new(&state.pool).figures(None).await?;
    Ok(ApiResponse::data(PlantingStats::from_figures(figures)))
}

/// GET /admin/users/pending - farmers waiting for approval
async fn pending_users(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
) -> Result<Json<ApiResponse<Vec<Profile>>>, ApiError> {
    let profiles = ProfileRepo::new(&state.pool).list_pending().await?;
    Ok(ApiResponse::data(profiles))
}

/// POST /admin/users/{id}/approve
async fn approve_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Profile>>, ApiError> {
    let profile = ProfileRepo::new(&state.pool).approve(&id).await?;
    tracing::info!(user_id = %id, approved_by = %admin.id, "farmer approved");
    Ok(ApiResponse::created(profile, "User approved", Vec::new()))
}

/// DELETE /admin/users/{id} - reject a registration
async fn reject_user(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    ProfileRepo::new(&state.pool).reject(&id).await?;
    tracing::info!(user_id = %id, rejected_by = %admin.id, "registration rejected");
    Ok(message("User rejected"))
}

/// POST /admin/uploads?filename=<name> - raw image bytes in the body
async fn upload_image(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Query(query): Query<UploadQuery>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<ApiResponse<StoredObject>>), ApiError> {
    let body = body.map_err(upload_rejection)?;
    let storage = state
        .storage
        .as_ref()
        .ok_or_else(|| ApiError::Unavailable("Image storage is not configured".into()))?;

    let filename = query
        .filename
        .as_deref()
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::BadRequest("filename query parameter is required".into()))?;

    let stored = storage.upload_image(filename, body.to_vec()).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::created(stored, "Image uploaded successfully", Vec::new()),
    ))
}

/// Body over the route limit gets the same envelope as the size check in
/// storage
fn upload_rejection(rejection: BytesRejection) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        StorageError::TooLarge.into()
    } else {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Admin routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/admin/user-data", get(user_data))
        .route("/admin/stats", get(stats))
        .route("/admin/users/pending", get(pending_users))
        .route("/admin/users/{id}/approve", post(approve_user))
        .route("/admin/users/{id}", delete(reject_user))
        .route(
            "/admin/uploads",
            post(upload_image).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
}
