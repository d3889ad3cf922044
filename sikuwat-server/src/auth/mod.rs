//! Authentication against the hosted platform
//!
//! The service never stores passwords. Accounts, sessions and token checks
//! are delegated to an [`AuthProvider`]; the server only reads the role and
//! display name out of the account metadata.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use sikuwat_core::drafts::Role;

pub mod platform;

pub use platform::PlatformAuth;

/// Authenticated account as reported by the platform
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    /// None when the metadata role is missing or unknown
    pub role: Option<Role>,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    /// Name to show next to records: metadata name, else email
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.email.as_deref())
    }
}

/// Result of a password sign-in
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub access_token: String,
    pub user: AuthUser,
}

/// New account registration
#[derive(Debug, Clone, Deserialize)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Token missing, expired or unknown to the platform
    #[error("invalid or expired access token")]
    InvalidToken,

    /// Platform refused the request (bad credentials, duplicate email, ...)
    #[error("{message}")]
    Rejected { message: String },

    #[error("authentication provider is not configured: {0}")]
    NotConfigured(&'static str),

    #[error("auth transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected auth response: {0}")]
    UnexpectedResponse(String),
}

/// Account and session operations of the hosted platform
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve the account behind a bearer token.
    async fn user_for_token(&self, token: &str) -> Result<AuthUser, AuthError>;

    /// Create an account with email auto-confirmed.
    async fn sign_up(&self, request: &SignUp) -> Result<AuthUser, AuthError>;

    /// Exchange email and password for an access token.
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError>;
}

/// Token from an `Authorization: Bearer <token>` header value
pub fn parse_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_parsing() {
        assert_eq!(parse_bearer("Bearer abc.def"), Some("abc.def"));
        assert_eq!(parse_bearer("bearer   tok "), Some("tok"));
        assert_eq!(parse_bearer("Basic dXNlcg=="), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("token-only"), None);
    }

    #[test]
    fn display_name_falls_back_to_email() {
        let user = AuthUser {
            id: "u1".into(),
            email: Some("tani@contoh.id".into()),
            name: None,
            role: Some(Role::User),
        };
        assert_eq!(user.display_name(), Some("tani@contoh.id"));
        assert!(!user.is_admin());
    }
}
