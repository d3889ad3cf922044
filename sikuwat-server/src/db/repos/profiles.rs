//! Account profiles and farmer approval
//!
//! Farmers sign up unapproved and may only sign in once an admin approves
//! them; rejecting a farmer deletes the profile.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use sikuwat_core::drafts::Role;

use super::DbError;

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: String,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: String,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

pub struct ProfileRepo<'a> {
    pool: &'a PgPool,
}

impl<'a> ProfileRepo<'a> {
    pub fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create or refresh the profile of a newly registered account.
    /// Admin accounts start approved, farmers do not.
    pub async fn upsert(
        &self,
        id: &str,
        email: &str,
        name: &str,
        role: Role,
    ) -> Result<Profile, DbError> {
        let profile = sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles (id, email, name, role, is_approved)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
                SET email = EXCLUDED.email, name = EXCLUDED.name, role = EXCLUDED.role
            RETURNING id, email, name, role, is_approved, created_at
            "#,
        )
        .bind(id)
        .bind(email)
        .bind(name)
        .bind(role.as_str())
        .bind(role == Role::Admin)
        .fetch_one(self.pool)
        .await?;

        Ok(profile)
    }

    pub async fn get(&self, id: &str) -> Result<Profile, DbError> {
        sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, name, role, is_approved, created_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    /// Farmers waiting for approval, oldest first
    pub async fn list_pending(&self) -> Result<Vec<Profile>, DbError> {
        let profiles = sqlx::query_as::<_, Profile>(
            r#"
            SELECT id, email, name, role, is_approved, created_at
            FROM profiles
            WHERE role = 'user' AND NOT is_approved
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(self.pool)
        .await?;

        Ok(profiles)
    }

    pub async fn approve(&self, id: &str) -> Result<Profile, DbError> {
        sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles SET is_approved = TRUE
            WHERE id = $1
            RETURNING id, email, name, role, is_approved, created_at
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?
        .ok_or_else(|| not_found(id))
    }

    /// Reject a registration by deleting its profile. The platform account
    /// remains but can no longer sign in.
    pub async fn reject(&self, id: &str) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM profiles WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }
}

fn not_found(id: &str) -> DbError {
    DbError::NotFound {
        resource: "profile",
        id: id.to_owned(),
    }
}
