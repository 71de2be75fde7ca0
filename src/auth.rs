// ABOUTME: JWT-based user authentication and password hashing
// ABOUTME: Issues and validates HS256 tokens and extracts credentials from Authorization headers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Authentication
//!
//! Stateless HS256 JWTs carry the user id in `sub`. Handlers receive the
//! authenticated identity as an explicit [`AuthResult`] value.

use chrono::{DateTime, Duration, Utc};
use http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::constants::service_names;
use crate::errors::{AppError, AppResult};
use crate::models::User;

/// `JWT` validation error with detailed information
#[derive(Debug, Clone, Error)]
pub enum JwtValidationError {
    /// Token has expired
    #[error("JWT token expired at {}", .expired_at.format("%Y-%m-%d %H:%M:%S UTC"))]
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },
    /// Token signature or claims are invalid
    #[error("JWT token is invalid: {reason}")]
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    #[error("JWT token is malformed: {details}")]
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        Self::auth_invalid(error.to_string())
    }
}

/// `JWT` claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
    /// Audience (who the token is intended for)
    pub aud: String,
}

/// Authenticated caller identity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthResult {
    /// Authenticated user id
    pub user_id: i64,
}

/// Authentication manager for `JWT` tokens and password hashes
#[derive(Clone)]
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
    bcrypt_cost: u32,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            token_expiry_hours: config.jwt_expiry_hours,
            bcrypt_cost: config.bcrypt_cost,
        }
    }

    /// Generate a `JWT` token for a user
    ///
    /// # Errors
    ///
    /// Returns an internal error if encoding fails
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(self.token_expiry_hours)).timestamp(),
            aud: service_names::FOODGRAM_SERVER.to_owned(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to sign token: {e}")))
    }

    /// Validate a token and return its claims
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] describing why the token was rejected
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_audience(&[service_names::FOODGRAM_SERVER]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| Self::convert_jwt_error(&e, token))
    }

    /// Resolve a token into the caller identity
    ///
    /// # Errors
    ///
    /// Returns `AuthInvalid` for a rejected token or a non-numeric subject
    pub fn authenticate_token(&self, token: &str) -> AppResult<AuthResult> {
        let claims = self.validate_token(token)?;
        let user_id = claims
            .sub
            .parse()
            .map_err(|_| AppError::auth_invalid("Token subject is not a user id"))?;
        debug!(user_id, "Token validated");
        Ok(AuthResult { user_id })
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(e: &jsonwebtoken::errors::Error, token: &str) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;

        match e.kind() {
            ErrorKind::ExpiredSignature => JwtValidationError::TokenExpired {
                expired_at: Self::peek_expiry(token).unwrap_or_else(Utc::now),
            },
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Json(_) | ErrorKind::Utf8(_) => {
                JwtValidationError::TokenMalformed {
                    details: e.to_string(),
                }
            }
            _ => {
                warn!("JWT token validation failed: {e}");
                JwtValidationError::TokenInvalid {
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Read `exp` without verifying anything, for error messages only
    fn peek_expiry(token: &str) -> Option<DateTime<Utc>> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        let data = decode::<Claims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
        DateTime::from_timestamp(data.claims.exp, 0)
    }

    /// Hash a password off the async executor
    ///
    /// # Errors
    ///
    /// Returns an internal error if hashing fails
    pub async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
            .await
            .map_err(|e| AppError::internal(format!("Password hashing task failed: {e}")))?
            .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
    }

    /// Verify a password against a stored hash off the async executor
    ///
    /// A malformed hash counts as a mismatch.
    pub async fn verify_password(&self, password: &str, hash: &str) -> bool {
        let password = password.to_owned();
        let hash = hash.to_owned();

        tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
            .await
            .unwrap_or(false)
    }
}

/// Extract the token from `Authorization: Bearer <jwt>` or `Authorization: Token <jwt>`
///
/// Returns `Ok(None)` when no Authorization header is present.
///
/// # Errors
///
/// Returns `AuthInvalid` for a header with an unknown scheme or no token
pub fn extract_token(headers: &HeaderMap) -> AppResult<Option<&str>> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let value = value
        .to_str()
        .map_err(|_| AppError::auth_invalid("Authorization header is not valid text"))?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("Token "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            AppError::auth_invalid("Authorization header must be 'Bearer <token>' or 'Token <token>'")
        })?;

    Ok(Some(token))
}
