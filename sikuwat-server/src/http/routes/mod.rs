//! Route handlers organized by resource

use axum::Json;
use serde::Serialize;

use crate::models::{PageInfo, Paginated};

pub mod admin;
pub mod articles;
pub mod auth;
pub mod chat;
pub mod health;
pub mod market_prices;
pub mod plantings;
pub mod tips;

/// Success envelope: `{"success": true, "data": ..., "message": ...}`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Page metadata of a list; `data` stays a plain array
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageInfo>,
    /// Validation warnings of an accepted draft
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn data(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
            warnings: Vec::new(),
        })
    }

    pub fn created(data: T, message: &str, warnings: Vec<String>) -> Json<Self> {
        Json(Self {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
            pagination: None,
            warnings,
        })
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// `{"success": true, "data": [...], "pagination": {...}}`
    pub fn page(page: Paginated<T>) -> Json<Self> {
        let (items, info) = page.into_parts();
        Json(Self {
            success: true,
            data: Some(items),
            message: None,
            pagination: Some(info),
            warnings: Vec::new(),
        })
    }
}

/// `{"success": true, "message": ...}`
pub fn message(message: impl Into<String>) -> Json<ApiResponse<()>> {
    Json(ApiResponse {
        success: true,
        data: None,
        message: Some(message.into()),
        pagination: None,
        warnings: Vec::new(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    //! Router harness: stub auth provider and a pool that never connects.
    //! Handlers that reach the database are covered by the ignored
    //! repository tests instead.

    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, Response};
    use axum::{Json, Router};
    use serde_json::Value;
    use tower::ServiceExt;

    use sikuwat_core::drafts::Role;
    use sikuwat_core::knowledge::KnowledgeBase;

    use crate::auth::{AuthError, AuthProvider, AuthUser, Session, SignUp};
    use crate::chat::ChatService;
    use crate::http::server::{build_router, AppState};

    pub(crate) const ADMIN_TOKEN: &str = "admin-token";
    pub(crate) const FARMER_TOKEN: &str = "farmer-token";

    /// Accepts two fixed tokens; sign-in succeeds for password `rahasia`
    pub(crate) struct StubAuth;

    fn account(id: &str, role: Role) -> AuthUser {
        AuthUser {
            id: id.into(),
            email: Some(format!("{id}@contoh.id")),
            name: Some(id.to_uppercase()),
            role: Some(role),
        }
    }

    #[async_trait]
    impl AuthProvider for StubAuth {
        async fn user_for_token(&self, token: &str) -> Result<AuthUser, AuthError> {
            match token {
                ADMIN_TOKEN => Ok(account("admin", Role::Admin)),
                FARMER_TOKEN => Ok(account("farmer", Role::User)),
                _ => Err(AuthError::InvalidToken),
            }
        }

        async fn sign_up(&self, request: &SignUp) -> Result<AuthUser, AuthError> {
            Err(AuthError::Rejected {
                message: format!("{} already registered", request.email),
            })
        }

        async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
            if password != "rahasia" {
                return Err(AuthError::Rejected {
                    message: "Invalid login credentials".into(),
                });
            }
            let role = if email.starts_with("admin") { Role::Admin } else { Role::User };
            Ok(Session {
                access_token: "session-token".into(),
                user: account(email.split('@').next().unwrap_or(email), role),
            })
        }
    }

    pub(crate) fn test_state() -> AppState {
        let pool = crate::db::create_lazy_pool("postgres://nobody@127.0.0.1:1/none", 1).unwrap();
        AppState {
            pool,
            auth: Arc::new(StubAuth),
            chat: ChatService::new(KnowledgeBase::builtin()),
            storage: None,
        }
    }

    pub(crate) fn app() -> Router {
        build_router(test_state())
    }

    /// Router on a migrated database from `DATABASE_URL`
    pub(crate) async fn app_with_database() -> (Router, sqlx::PgPool) {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL required");
        let pool = crate::db::create_pool(&url).await.expect("pool");
        crate::db::migrations::run(&pool).await.expect("migrations");

        let mut state = test_state();
        state.pool = pool.clone();
        (build_router(state), pool)
    }

    pub(crate) fn request(method: &str, uri: &str, token: Option<&str>, body: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    pub(crate) async fn send(app: Router, req: Request<Body>) -> (u16, Value) {
        let response: Response<Body> = app.oneshot(req).await.unwrap();
        let status = response.status().as_u16();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[test]
    fn envelope_shapes() {
        let Json(ok) = super::ApiResponse::data(vec![1, 2]);
        assert_eq!(
            serde_json::to_value(ok).unwrap(),
            serde_json::json!({ "success": true, "data": [1, 2] })
        );

        let page = crate::models::Paginated::from_rows(
            vec![("a", 1_i64)],
            crate::models::Pagination::default(),
        );
        let Json(listed) = super::ApiResponse::page(page);
        let listed = serde_json::to_value(listed).unwrap();
        assert_eq!(listed["data"], serde_json::json!(["a"]));
        assert_eq!(listed["pagination"]["total"], 1);
        assert_eq!(listed["pagination"]["per_page"], 50);

        let Json(msg) = super::message("Deleted");
        assert_eq!(
            serde_json::to_value(msg).unwrap(),
            serde_json::json!({ "success": true, "message": "Deleted" })
        );
    }
}
