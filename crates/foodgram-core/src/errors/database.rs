// ABOUTME: Conversion from sqlx errors into AppError
// ABOUTME: Unique-constraint violations become conflicts, everything else a database error
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{AppError, ErrorCode};

/// Whether `error` is a UNIQUE constraint violation
#[must_use]
pub fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

/// Whether `error` is a UNIQUE constraint violation naming `column`
///
/// `SQLite` reports the failing columns as `table.column` in the message.
#[must_use]
pub fn is_unique_violation_on(error: &sqlx::Error, column: &str) -> bool {
    match error {
        sqlx::Error::Database(db) => db.is_unique_violation() && db.message().contains(column),
        _ => false,
    }
}

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        if matches!(error, sqlx::Error::RowNotFound) {
            return Self::not_found("Record");
        }
        if is_unique_violation(&error) {
            return Self::new(ErrorCode::ResourceAlreadyExists, "Record already exists")
                .with_source(error);
        }
        Self::database(format!("Database operation failed: {error}")).with_source(error)
    }
}
