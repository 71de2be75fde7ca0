// ABOUTME: Constants module with domain-separated organization
// ABOUTME: Field limits, short-link alphabet, pagination defaults and service names
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Constants module
//!
//! Constants are grouped into logical domains rather than being in a single
//! flat namespace.

/// Bounds enforced on recipe and ingredient values
pub mod limits {
    /// Minimum cooking time in minutes
    pub const MIN_COOKING_TIME: i64 = 1;
    /// Maximum cooking time in minutes
    pub const MAX_COOKING_TIME: i64 = 200;
    /// Minimum ingredient amount
    pub const MIN_AMOUNT: i64 = 1;
    /// Maximum ingredient amount
    pub const MAX_AMOUNT: i64 = 1000;
    /// Maximum decoded image size in bytes
    pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
    /// Maximum request body size; base64 inflates images by a third
    pub const MAX_REQUEST_BODY_BYTES: usize = 16 * 1024 * 1024;
}

/// Maximum string lengths, counted in characters
pub mod lengths {
    /// Recipe name
    pub const RECIPE_NAME: usize = 256;
    /// Tag name and slug
    pub const TAG: usize = 32;
    /// Ingredient name
    pub const INGREDIENT_NAME: usize = 128;
    /// Ingredient measurement unit
    pub const MEASUREMENT_UNIT: usize = 64;
    /// Email address
    pub const EMAIL: usize = 254;
    /// Username, first and last name
    pub const USER_NAME: usize = 150;
    /// Raw password
    pub const PASSWORD: usize = 150;
}

/// Short-link generation parameters
pub mod short_links {
    /// Number of characters in a generated short code
    pub const CODE_LENGTH: usize = 6;
    /// Alphabet short codes are drawn from
    pub const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    /// Path prefix of the public redirect endpoint
    pub const REDIRECT_PREFIX: &str = "/s";
}

/// Shopping list download
pub mod shopping_list {
    /// Filename offered to the client
    pub const FILENAME: &str = "shopping_list.txt";
    /// Content type of the rendered list
    pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";
}

/// Pagination defaults
pub mod pagination {
    /// Default page size when `limit` is absent
    pub const DEFAULT_PAGE_SIZE: u32 = 6;
    /// Hard upper bound on `limit`
    pub const MAX_PAGE_SIZE: u32 = 100;
}

/// Usernames that would shadow fixed routes
pub mod reserved {
    /// Reserved usernames
    pub const USERNAMES: &[&str] = &["me"];
}

/// Service identification
pub mod service_names {
    /// Server name used in logs and JWT audience
    pub const FOODGRAM_SERVER: &str = "foodgram-server";
}

/// API endpoints
pub mod endpoints {
    /// Health check endpoint
    pub const HEALTH_CHECK: &str = "/health";
    /// API base path
    pub const API_BASE: &str = "/api";
    /// Prefix under which stored images are served
    pub const MEDIA: &str = "/media";
}

/// Network ports
pub mod ports {
    /// Default HTTP port
    pub const DEFAULT_HTTP_PORT: u16 = 8000;
}
