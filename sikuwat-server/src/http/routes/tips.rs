//! Farming tip endpoints: public reads, admin writes

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use sikuwat_core::drafts::TipDraft;

use super::{message, ApiResponse};
use crate::db::repos::{Tip, TipInput, TipRepo};
use crate::http::error::ApiError;
use crate::http::extractors::AdminUser;
use crate::http::server::AppState;
use crate::models::{Pagination, PaginationParams};

async fn list_tips(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<Tip>>>, ApiError> {
    let tips = TipRepo::new(&state.pool).list(Pagination::from(params)).await?;
    Ok(ApiResponse::page(tips))
}

async fn get_tip(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Tip>>, ApiError> {
    let tip = TipRepo::new(&state.pool).get(&id).await?;
    Ok(ApiResponse::data(tip))
}

fn checked_input(draft: &TipDraft) -> Result<(TipInput, Vec<String>), ApiError> {
    let report = draft.validate();
    if !report.is_valid() {
        return Err(report.into());
    }
    Ok((TipInput::from_draft(draft), report.warnings))
}

async fn create_tip(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(draft): Json<TipDraft>,
) -> Result<(StatusCode, Json<ApiResponse<Tip>>), ApiError> {
    let (input, warnings) = checked_input(&draft)?;
    let tip = TipRepo::new(&state.pool).create(&input, &admin.id).await?;

    tracing::info!(id = %tip.id, category = %tip.category, "tip created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::created(tip, "Tip created successfully", warnings),
    ))
}

async fn update_tip(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(id): Path<String>,
    Json(draft): Json<TipDraft>,
) -> Result<Json<ApiResponse<Tip>>, ApiError> {
    let (input, warnings) = checked_input(&draft)?;
    let tip = TipRepo::new(&state.pool).update(&id, &input).await?;
    Ok(ApiResponse::created(tip, "Tip updated successfully", warnings))
}

async fn delete_tip(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    TipRepo::new(&state.pool).delete(&id).await?;
    tracing::info!(id = %id, "tip deleted");
    Ok(message("Tip deleted successfully"))
}

/// Tip routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/tips", get(list_tips))
        .route("/tips/{id}", get(get_tip))
        .route("/admin/tips", post(create_tip))
        .route("/admin/tips/{id}", put(update_tip).delete(delete_tip))
}
