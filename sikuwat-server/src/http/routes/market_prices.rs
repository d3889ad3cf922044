//! Market price endpoints: public reads, admin writes

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use chrono::Utc;

use sikuwat_core::drafts::MarketPriceDraft;

use super::{message, ApiResponse};
use crate::db::repos::{MarketPrice, MarketPriceInput, MarketPriceRepo};
use crate::http::error::ApiError;
use crate::http::extractors::AdminUser;
use crate::http::server::AppState;
use crate::models::{Pagination, PaginationParams};

/// GET /market-prices - newest first
async fn list_prices(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<MarketPrice>>>, ApiError> {
    let page = Pagination::from(params);
    let prices = MarketPriceRepo::new(&state.pool).list(page).await?;
    Ok(ApiResponse::page(prices))
}

/// GET /market-prices/{id}
async fn get_price(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MarketPrice>>, ApiError> {
    let price = MarketPriceRepo::new(&state.pool).get(&id).await?;
    Ok(ApiResponse::data(price))
}

fn checked_input(draft: &MarketPriceDraft) -> Result<(MarketPriceInput, Vec<String>), ApiError> {
    let report = draft.validate();
    if !report.is_valid() {
        return Err(report.into());
    }
    let input = MarketPriceInput::from_draft(draft, Utc::now().date_naive());
    Ok((input, report.warnings))
}

/// POST /admin/market-prices
async fn create_price(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(draft): Json<MarketPriceDraft>,
) -> Result<(StatusCode, Json<ApiResponse<MarketPrice>>), ApiError> {
    let (input, warnings) = checked_input(&draft)?;
    let price = MarketPriceRepo::new(&state.pool).create(&input, &admin.id).await?;

    tracing::info!(id = %price.id, commodity = %price.commodity, "market price created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::created(price, "Market price created successfully", warnings),
    ))
}

/// PUT /admin/market-prices/{id}
async fn update_price(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(id): Path<String>,
    Json(draft): Json<MarketPriceDraft>,
) -> Result<Json<ApiResponse<MarketPrice>>, ApiError> {
    let (input, warnings) = checked_input(&draft)?;
    let price = MarketPriceRepo::new(&state.pool).update(&id, &input).await?;
    Ok(ApiResponse::created(price, "Market price updated successfully", warnings))
}

/// DELETE /admin/market-prices/{id}
async fn delete_price(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    MarketPriceRepo::new(&state.pool).delete(&id).await?;
    tracing::info!(id = %id, "market price deleted");
    Ok(message("Market price deleted successfully"))
}

/// Market price routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/market-prices", get(list_prices))
        .route("/market-prices/{id}", get(get_price))
        .route("/admin/market-prices", post(create_price))
        .route("/admin/market-prices/{id}", put(update_price).delete(delete_price))
}
