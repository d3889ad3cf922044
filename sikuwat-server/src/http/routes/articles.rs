//! Article endpoints: public reads, admin writes

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};

use sikuwat_core::drafts::ArticleDraft;

use super::{message, ApiResponse};
use crate::db::repos::{Article, ArticleInput, ArticleRepo};
use crate::http::error::ApiError;
use crate::http::extractors::AdminUser;
use crate::http::server::AppState;
use crate::models::{Pagination, PaginationParams};

/// GET /articles
async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<Vec<Article>>>, ApiError> {
    let articles = ArticleRepo::new(&state.pool).list(Pagination::from(params)).await?;
    Ok(ApiResponse::page(articles))
}

/// GET /articles/{id}
async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Article>>, ApiError> {
    let article = ArticleRepo::new(&state.pool).get(&id).await?;
    Ok(ApiResponse::data(article))
}

fn checked_input(draft: &ArticleDraft) -> Result<(ArticleInput, Vec<String>), ApiError> {
    let report = draft.validate();
    if !report.is_valid() {
        return Err(report.into());
    }
    Ok((ArticleInput::from_draft(draft), report.warnings))
}

/// POST /admin/articles
async fn create_article(
    State(state): State<Arc<AppState>>,
    AdminUser(admin): AdminUser,
    Json(draft): Json<ArticleDraft>,
) -> Result<(StatusCode, Json<ApiResponse<Article>>), ApiError> {
    let (input, warnings) = checked_input(&draft)?;
    let article = ArticleRepo::new(&state.pool).create(&input, &admin.id).await?;

    tracing::info!(id = %article.id, "article created");
    Ok((
        StatusCode::CREATED,
        ApiResponse::created(article, "Article created successfully", warnings),
    ))
}

/// PUT /admin/articles/{id}
async fn update_article(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(id): Path<String>,
    Json(draft): Json<ArticleDraft>,
) -> Result<Json<ApiResponse<Article>>, ApiError> {
    let (input, warnings) = checked_input(&draft)?;
    let article = ArticleRepo::new(&state.pool).update(&id, &input).await?;
    Ok(ApiResponse::created(article, "Article updated successfully", warnings))
}

/// DELETE /admin/articles/{id}
async fn delete_article(
    State(state): State<Arc<AppState>>,
    AdminUser(_): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    ArticleRepo::new(&state.pool).delete(&id).await?;
    tracing::info!(id = %id, "article deleted");
    Ok(message("Article deleted successfully"))
}

/// Article routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/articles", get(list_articles))
        .route("/articles/{id}", get(get_article))
        .route("/admin/articles", post(create_article))
        .route("/admin/articles/{id}", put(update_article).delete(delete_article))
}
