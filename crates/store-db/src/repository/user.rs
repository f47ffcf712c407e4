//! User repository.
//!
//! Account persistence. Password hashing happens in the API layer; this
//! repository only ever sees the finished Argon2 hash.

use sqlx::SqlitePool;
use tracing::debug;

use store_core::User;

use crate::error::{DbError, DbResult};

/// Repository for user account operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new user repository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a new user.
    ///
    /// Fails with `DbError::UniqueViolation` when the username or email is
    /// already taken.
    pub async fn insert(&self, user: &User) -> DbResult<()> {
        debug!(user_id = %user.id, username = %user.username, "Inserting user");

        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, location,
                               role, payment_method, is_verified, joined_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.location)
        .bind(user.role)
        .bind(user.payment_method)
        .bind(user.is_verified)
        .bind(user.joined_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a user by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<User> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    /// Gets a user by email (the login identifier).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Gets a user by username.
    pub async fn get_by_username(&self, username: &str) -> DbResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Lists all users, newest first.
    pub async fn list(&self) -> DbResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY joined_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    /// Updates a user's mutable profile fields.
    ///
    /// The id, email uniqueness, and joined_at are enforced by the schema;
    /// the caller decides which fields changed and passes the full record.
    pub async fn update(&self, user: &User) -> DbResult<()> {
        debug!(user_id = %user.id, "Updating user");

        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = ?, email = ?, password_hash = ?, location = ?,
                role = ?, payment_method = ?, is_verified = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.location)
        .bind(user.role)
        .bind(user.payment_method)
        .bind(user.is_verified)
        .bind(&user.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", &user.id));
        }

        Ok(())
    }

    /// Deletes a user by ID.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(user_id = %id, "Deleting user");

        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", id));
        }

        Ok(())
    }
}
