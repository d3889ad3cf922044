//! Auth REST API of the hosted platform (GoTrue-compatible)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use sikuwat_core::drafts::Role;

use super::{AuthError, AuthProvider, AuthUser, Session, SignUp};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Deserialize)]
struct PlatformUser {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct UserMetadata {
    name: Option<String>,
    role: Option<String>,
}

impl From<PlatformUser> for AuthUser {
    fn from(u: PlatformUser) -> Self {
        Self {
            id: u.id,
            email: u.email,
            name: u.user_metadata.name,
            role: u.user_metadata.role.as_deref().and_then(Role::parse),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: PlatformUser,
}

/// Client for `<platform>/auth/v1`
#[derive(Debug, Clone)]
pub struct PlatformAuth {
    http: Client,
    base: Url,
    anon_key: String,
    service_role_key: Option<String>,
}

impl PlatformAuth {
    /// `service_role_key` is only needed for sign-up.
    pub fn new(
        base_url: &str,
        anon_key: impl Into<String>,
        service_role_key: Option<String>,
    ) -> Result<Self, AuthError> {
        let base = base_url_with_slash(base_url)
            .map_err(|e| AuthError::UnexpectedResponse(format!("invalid platform url: {e}")))?;
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("sikuwat/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base,
            anon_key: anon_key.into(),
            service_role_key,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, AuthError> {
        self.base
            .join(path)
            .map_err(|e| AuthError::UnexpectedResponse(format!("bad endpoint {path}: {e}")))
    }
}

#[async_trait]
impl AuthProvider for PlatformAuth {
    async fn user_for_token(&self, token: &str) -> Result<AuthUser, AuthError> {
        let res = self
            .http
            .get(self.endpoint("auth/v1/user")?)
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
            .send()
            .await?;

        match res.status() {
            s if s.is_success() => {
                let user: PlatformUser = res
                    .json()
                    .await
                    .map_err(|e| AuthError::UnexpectedResponse(e.to_string()))?;
                Ok(user.into())
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AuthError::InvalidToken),
            s => {
                let body = res.text().await.unwrap_or_default();
                Err(AuthError::UnexpectedResponse(format!("{}: {}", s, error_message(&body))))
            }
        }
    }

    async fn sign_up(&self, request: &SignUp) -> Result<AuthUser, AuthError> {
        let service_key = self
            .service_role_key
            .as_deref()
            .ok_or(AuthError::NotConfigured("service role key required for sign-up"))?;

        let res = self
            .http
            .post(self.endpoint("auth/v1/admin/users")?)
            .header("apikey", service_key)
            .bearer_auth(service_key)
            .json(&json!({
                "email": request.email,
                "password": request.password,
                "email_confirm": true,
                "user_metadata": {
                    "name": request.name,
                    "role": request.role.as_str(),
                },
            }))
            .send()
            .await?;

        if !res.status().is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                message: error_message(&body),
            });
        }

        let user: PlatformUser = res
            .json()
            .await
            .map_err(|e| AuthError::UnexpectedResponse(e.to_string()))?;
        Ok(user.into())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let mut url = self.endpoint("auth/v1/token")?;
        url.query_pairs_mut().append_pair("grant_type", "password");

        let res = self
            .http
            .post(url)
            .header("apikey", &self.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !res.status().is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AuthError::Rejected {
                message: error_message(&body),
            });
        }

        let token: TokenResponse = res
            .json()
            .await
            .map_err(|e| AuthError::UnexpectedResponse(e.to_string()))?;
        Ok(Session {
            access_token: token.access_token,
            user: token.user.into(),
        })
    }
}

/// Parse the platform URL so that relative joins append to its path
pub(crate) fn base_url_with_slash(raw: &str) -> Result<Url, url::ParseError> {
    let raw = raw.trim();
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{}/", raw))
    }
}

/// Human-readable message out of a platform error body
fn error_message(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        for key in ["msg", "message", "error_description", "error"] {
            if let Some(msg) = value.get(key).and_then(Value::as_str) {
                return msg.to_string();
            }
        }
    }
    let body = body.trim();
    if body.is_empty() {
        "request rejected by auth provider".to_string()
    } else {
        sikuwat_core::prompt::truncate_chars(body, 200).to_string()
    }
}
