//! Farmer planting log
//!
//! Every statement is scoped to the caller's id, so a farmer can only read
//! or change their own records.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;

use sikuwat_core::drafts::{HarvestDraft, PlantingDraft};
use sikuwat_core::stats::PlantingStats;

use super::{message, ApiResponse};
use crate::db::repos::{HarvestInput, Planting, PlantingInput, PlantingRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{CurrentUser, FarmerUser};
use crate::http::server::AppState;
use crate::models::Pagination;

/// Query for GET /user/plantings
#[derive(Debug, Default, Deserialize)]
pub struct PlantingQuery {
    /// Only plantings without a harvest yet
    #[serde(default)]
    pub pending: bool,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PlantingQuery {
    fn pagination(&self) -> Pagination {
        let default = Pagination::default();
        Pagination::new(
            self.page.unwrap_or(default.page),
            self.per_page.unwrap_or(default.per_page),
        )
    }
}

fn checked_input(draft: &PlantingDraft) -> Result<(PlantingInput, Vec<String>), ApiError> {
    let report = draft.validate();
    if !report.is_valid() {
        return Err(report.into());
    }
    Ok((PlantingInput::from_draft(draft), report.warnings))
}

/// POST /user/plantings - farmers only
async fn create_planting(
    State(state): State<Arc<AppState>>,
    FarmerUser(user): FarmerUser,
    Json(draft): Json<PlantingDraft>,
) -> Result<(StatusCode, Json<ApiResponse<Planting>>), ApiError> {
    let (input, warnings) = checked_input(&draft)?;
    let planting = PlantingRepo::new(&state.pool)
        .create(&user.id, user.display_name(), &input)
        .await?;

    tracing::info!(id = %planting.id, user_id = %user.id, seed = %planting.seed_type, "planting recorded");
    Ok((
        StatusCode::CREATED,
        ApiResponse::created(planting, "Planting data saved successfully", warnings),
    ))
}

/// GET /user/plantings[?pending=true]
async fn list_plantings(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<PlantingQuery>,
) -> Result<Json<ApiResponse<Vec<Planting>>>, ApiError> {
    let plantings = PlantingRepo::new(&state.pool)
        .list_for_user(&user.id, query.pending, query.pagination())
        .await?;
    Ok(ApiResponse::page(plantings))
}

/// GET /user/plantings/stats
async fn planting_stats(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<ApiResponse<PlantingStats>>, ApiError> {
    let figures = PlantingRepo::new(&state.pool).figures(Some(&user.id)).await?;
    Ok(ApiResponse::data(PlantingStats::from_figures(figures)))
}

/// PUT /user/plantings/{id} - partial update of an owned record. Fields
/// missing from the body keep their stored value; the merged record is
/// validated as a whole.
async fn update_planting(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(patch): Json<PlantingDraft>,
) -> Result<Json<ApiResponse<Planting>>, ApiError> {
    let repo = PlantingRepo::new(&state.pool);
    let stored = repo.get_owned(&id, &user.id).await?;

    let draft = patch.overlay(stored.to_draft());
    let (input, warnings) = checked_input(&draft)?;
    let planting = repo.update(&id, &user.id, &input).await?;
    Ok(ApiResponse::created(planting, "Planting data updated successfully", warnings))
}

/// POST /user/plantings/{id}/harvest
async fn record_harvest(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(draft): Json<HarvestDraft>,
) -> Result<Json<ApiResponse<Planting>>, ApiError> {
    let repo = PlantingRepo::new(&state.pool);
    let planting = repo.get_owned(&id, &user.id).await?;

    let report = draft.validate(planting.planting_date);
    if !report.is_valid() {
        return Err(report.into());
    }

    let harvest = HarvestInput::from_draft(&draft);
    let planting = repo.record_harvest(&id, &user.id, &harvest).await?;

    tracing::info!(id = %planting.id, yield_kg = harvest.harvest_yield, "harvest recorded");
    Ok(ApiResponse::created(planting, "Harvest recorded successfully", report.warnings))
}

/// DELETE /user/plantings/{id}
async fn delete_planting(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    PlantingRepo::new(&state.pool).delete(&id, &user.id).await?;
    Ok(message("Planting data deleted successfully"))
}

/// Planting routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/user/plantings", get(list_plantings).post(create_planting))
        .route("/user/plantings/stats", get(planting_stats))
        .route("/user/plantings/{id}", put(update_planting).delete(delete_planting))
        .route("/user/plantings/{id}/harvest", post(record_harvest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    use crate::http::routes::tests::{app, app_with_database, request, send, ADMIN_TOKEN, FARMER_TOKEN};

    const HARVEST_ONLY: &str =
        r#"{"harvest_date":"2024-09-01","harvest_yield":800,"sales_amount":4800000}"#;

    fn stored(user_id: &str) -> Planting {
        Planting {
            id: "planting_1".into(),
            user_id: user_id.into(),
            user_name: Some("Ani".into()),
            seed_type: "Padi IR64".into(),
            seed_count: 30,
            planting_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            harvest_date: None,
            harvest_yield: None,
            sales_amount: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn new_planting() -> PlantingInput {
        PlantingInput::from_draft(&stored("x").to_draft())
    }

    #[test]
    fn query_defaults() {
        let query: PlantingQuery = serde_json::from_str("{}").unwrap();
        assert!(!query.pending);
        assert_eq!(query.pagination().per_page, 50);
    }

    #[test]
    fn harvest_only_update_keeps_stored_fields() {
        let patch: PlantingDraft = serde_json::from_str(HARVEST_ONLY).unwrap();
        let merged = patch.overlay(stored("farmer").to_draft());

        let (input, warnings) = checked_input(&merged).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(input.seed_type, "Padi IR64");
        assert_eq!(input.seed_count, 30);
        assert_eq!(input.harvest_date, NaiveDate::from_ymd_opt(2024, 9, 1));
        assert_eq!(input.sales_amount, Some(4_800_000.0));
    }

    #[test]
    fn partial_update_still_validates_merged_record() {
        let patch: PlantingDraft =
            serde_json::from_str(r#"{"harvest_date":"2024-05-01"}"#).unwrap();
        let merged = patch.overlay(stored("farmer").to_draft());
        assert!(matches!(checked_input(&merged), Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn admins_cannot_log_plantings() {
        let body = r#"{"seedType":"Padi","seedCount":100,"plantingDate":"2024-03-01"}"#;
        let (status, body) = send(
            app(),
            request("POST", "/api/user/plantings", Some(ADMIN_TOKEN), Some(body)),
        )
        .await;
        assert_eq!(status, 401);
        assert_eq!(body["message"], "Unauthorized - User access required");
    }

    #[tokio::test]
    async fn future_planting_date_is_rejected() {
        let body = r#"{"seedType":"Jagung","seedCount":20,"plantingDate":"2999-01-01"}"#;
        let (status, body) = send(
            app(),
            request("POST", "/api/user/plantings", Some(FARMER_TOKEN), Some(body)),
        )
        .await;
        assert_eq!(status, 400);
        assert_eq!(body["details"][0], "planting date cannot be in the future");
    }

    #[tokio::test]
    async fn listing_requires_token() {
        let (status, _) = send(app(), request("GET", "/api/user/plantings?pending=true", None, None)).await;
        assert_eq!(status, 401);

        let (status, _) = send(app(), request("GET", "/api/user/plantings/stats", None, None)).await;
        assert_eq!(status, 401);
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn harvest_only_put_updates_planting() {
        let (app, pool) = app_with_database().await;
        let planting = PlantingRepo::new(&pool)
            .create("farmer", Some("FARMER"), &new_planting())
            .await
            .expect("create");

        let uri = format!("/api/user/plantings/{}", planting.id);
        let (status, body) = send(app, request("PUT", &uri, Some(FARMER_TOKEN), Some(HARVEST_ONLY))).await;
        assert_eq!(status, 200, "{body}");
        assert_eq!(body["data"]["seed_type"], "Padi IR64");
        assert_eq!(body["data"]["harvest_yield"], 800.0);

        PlantingRepo::new(&pool).delete(&planting.id, "farmer").await.expect("cleanup");
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn another_farmers_planting_is_not_found() {
        let (app, pool) = app_with_database().await;
        let repo = PlantingRepo::new(&pool);
        let planting = repo.create("other-farmer", None, &new_planting()).await.expect("create");

        let uri = format!("/api/user/plantings/{}", planting.id);
        let expected = format!("Planting data '{}' not found or unauthorized", planting.id);

        let (status, body) =
            send(app.clone(), request("PUT", &uri, Some(FARMER_TOKEN), Some(HARVEST_ONLY))).await;
        assert_eq!(status, 404);
        assert_eq!(body["message"], expected.as_str());

        let (status, body) = send(app.clone(), request("DELETE", &uri, Some(FARMER_TOKEN), None)).await;
        assert_eq!(status, 404);
        assert_eq!(body["message"], expected.as_str());

        let harvest = format!("{uri}/harvest");
        let (status, _) = send(app, request("POST", &harvest, Some(FARMER_TOKEN), Some(HARVEST_ONLY))).await;
        assert_eq!(status, 404);

        repo.get_owned(&planting.id, "other-farmer").await.expect("still there");
        repo.delete(&planting.id, "other-farmer").await.expect("cleanup");
    }
}
