// ABOUTME: Author subscription database operations
// ABOUTME: Follow/unfollow with self-subscription and duplicate rejection, followed-author listing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use super::{to_count, Database, UserManager};
use crate::errors::{is_unique_violation, AppError, AppResult};
use crate::models::User;

impl Database {
    /// Create the subscriptions table
    pub(super) async fn migrate_subscriptions(&self) -> anyhow::Result<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS subscriptions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL,
                UNIQUE (user_id, author_id),
                CHECK (user_id <> author_id)
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Subscription database operations manager
pub struct SubscriptionManager {
    pool: SqlitePool,
}

impl SubscriptionManager {
    /// Create a new subscription manager
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Follow an author
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when following oneself and
    /// `ResourceAlreadyExists` when already following
    pub async fn subscribe(&self, user_id: i64, author_id: i64) -> AppResult<()> {
        if user_id == author_id {
            return Err(AppError::invalid_input("You cannot subscribe to yourself"));
        }

        sqlx::query(
            "INSERT INTO subscriptions (user_id, author_id, created_at) VALUES ($1, $2, $3)",
        )
        .bind(user_id)
        .bind(author_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::already_exists("You are already subscribed to this user")
            } else {
                AppError::database(format!("Failed to subscribe: {e}"))
            }
        })?;

        info!(user_id, author_id, "Subscribed");
        Ok(())
    }

    /// Stop following an author
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for oneself and `AssociationMissing` when not
    /// subscribed
    pub async fn unsubscribe(&self, user_id: i64, author_id: i64) -> AppResult<()> {
        if user_id == author_id {
            return Err(AppError::invalid_input("You cannot unsubscribe from yourself"));
        }

        let result =
            sqlx::query("DELETE FROM subscriptions WHERE user_id = $1 AND author_id = $2")
                .bind(user_id)
                .bind(author_id)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to unsubscribe: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(AppError::association_missing(
                "You are not subscribed to this user",
            ));
        }

        info!(user_id, author_id, "Unsubscribed");
        Ok(())
    }

    /// Whether `user_id` follows `author_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails
    pub async fn is_subscribed(&self, user_id: i64, author_id: i64) -> AppResult<bool> {
        let found: Option<i64> =
            sqlx::query_scalar("SELECT 1 FROM subscriptions WHERE user_id = $1 AND author_id = $2")
                .bind(user_id)
                .bind(author_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to check subscription: {e}")))?;

        Ok(found.is_some())
    }

    /// Authors followed by a user, in subscription order, with the total count
    ///
    /// # Errors
    ///
    /// Returns an error if a database query fails
    pub async fn list_authors(
        &self,
        user_id: i64,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<User>, u64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to count subscriptions: {e}")))?;

        let rows = sqlx::query(
            r"
            SELECT u.id, u.email, u.username, u.first_name, u.last_name,
                   u.password_hash, u.avatar, u.created_at
            FROM subscriptions s
            JOIN users u ON u.id = s.author_id
            WHERE s.user_id = $1
            ORDER BY s.id
            LIMIT $2 OFFSET $3
            ",
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list subscriptions: {e}")))?;

        let authors = rows
            .iter()
            .map(UserManager::row_to_user)
            .collect::<AppResult<Vec<_>>>()?;
        Ok((authors, to_count(total)))
    }
}
