// ABOUTME: User directory database operations
// ABOUTME: Registration, lookup by id or email, paginated listing, avatar and password updates
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::info;

use super::{parse_timestamp, to_count, Database};
use crate::errors::{is_unique_violation_on, AppError, AppResult};
use crate::models::{NewUser, User};

const USER_COLUMNS: &str =
    "id, email, username, first_name, last_name, password_hash, avatar, created_at";

impl Database {
    /// Create the users table
    pub(super) async fn migrate_users(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT NOT NULL UNIQUE,
                username TEXT NOT NULL UNIQUE,
                first_name TEXT NOT NULL,
                last_name TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                avatar TEXT,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// User directory database operations manager
pub struct UserManager {
    pool: SqlitePool,
}

impl UserManager {
    /// Create a new user manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new user with an already hashed password
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the email or username is taken
    pub async fn create(&self, new_user: &NewUser, password_hash: &str) -> AppResult<User> {
        let created_at = Utc::now();
        let result = sqlx::query(
            r"
            INSERT INTO users (email, username, first_name, last_name, password_hash, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(&new_user.email)
        .bind(&new_user.username)
        .bind(&new_user.first_name)
        .bind(&new_user.last_name)
        .bind(password_hash)
        .bind(created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation_on(&e, "users.email") {
                AppError::already_exists("A user with this email already exists")
                    .with_field("email")
            } else if is_unique_violation_on(&e, "users.username") {
                AppError::already_exists("A user with this username already exists")
                    .with_field("username")
            } else {
                AppError::database(format!("Failed to create user: {e}"))
            }
        })?;

        let id = result.last_insert_rowid();
        info!(user_id = id, username = %new_user.username, "User registered");

        Ok(User {
            id,
            email: new_user.email.clone(),
            username: new_user.username.clone(),
            first_name: new_user.first_name.clone(),
            last_name: new_user.last_name.clone(),
            password_hash: password_hash.to_owned(),
            avatar: None,
            created_at,
        })
    }

    /// Get a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get(&self, id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user: {e}")))?;

        row.map(|r| Self::row_to_user(&r)).transpose()
    }

    /// Get a user by login email
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn get_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get user by email: {e}")))?;

        row.map(|r| Self::row_to_user(&r)).transpose()
    }

    /// List users ordered by id, with the total count
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn list(&self, limit: i64, offset: i64) -> AppResult<(Vec<User>, u64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count users: {e}")))?;

        let rows = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list users: {e}")))?;

        let users = rows
            .iter()
            .map(Self::row_to_user)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((users, to_count(total)))
    }

    /// Replace or clear the stored avatar reference
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the user does not exist
    pub async fn set_avatar(&self, id: i64, avatar: Option<&str>) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET avatar = $1 WHERE id = $2")
            .bind(avatar)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update avatar: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        Ok(())
    }

    /// Store a new password hash
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the user does not exist
    pub async fn set_password_hash(&self, id: i64, password_hash: &str) -> AppResult<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $1 WHERE id = $2")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to update password: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User"));
        }
        info!(user_id = id, "Password changed");
        Ok(())
    }

    pub(crate) fn row_to_user(row: &SqliteRow) -> AppResult<User> {
        Ok(User {
            id: row.get("id"),
            email: row.get("email"),
            username: row.get("username"),
            first_name: row.get("first_name"),
            last_name: row.get("last_name"),
            password_hash: row.get("password_hash"),
            avatar: row.get("avatar"),
            created_at: parse_timestamp(row.get::<&str, _>("created_at"))?,
        })
    }
}
