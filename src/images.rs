// ABOUTME: Image storage for recipe pictures and user avatars
// ABOUTME: Decodes base64 data URIs and stores the bytes behind an async ImageStore trait
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Image Storage
//!
//! Clients send images inline as `data:image/<type>;base64,<payload>`.
//! [`decode_data_uri`] validates and decodes them; an [`ImageStore`] persists
//! the bytes and returns an opaque reference that is later turned into a
//! public URL with [`ImageStore::url`].

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::constants::{endpoints, limits};
use crate::errors::{AppError, AppResult};

/// Folder for recipe images
pub const RECIPE_IMAGES: &str = "recipes/images";
/// Folder for user avatars
pub const AVATARS: &str = "users/avatars";

/// Image decoded from a data URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// File extension matching the declared media type
    pub extension: &'static str,
    /// Raw image bytes
    pub bytes: Vec<u8>,
}

/// Decode a `data:image/...;base64,...` string
///
/// # Errors
///
/// Returns a validation error for empty input, an unsupported media type,
/// malformed base64 or an oversized payload
pub fn decode_data_uri(field: &str, value: &str) -> AppResult<DecodedImage> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::missing_field(field));
    }

    let (header, payload) = value
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(','))
        .ok_or_else(|| {
            AppError::invalid_input("Image must be a base64 data URI").with_field(field)
        })?;

    let media_type = header.strip_suffix(";base64").ok_or_else(|| {
        AppError::invalid_input("Image data URI must be base64 encoded").with_field(field)
    })?;

    let extension = match media_type.to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/jpeg" | "image/jpg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        other => {
            return Err(
                AppError::invalid_input(format!("Unsupported image type '{other}'"))
                    .with_field(field),
            )
        }
    };

    let bytes = general_purpose::STANDARD.decode(payload).map_err(|e| {
        AppError::invalid_input(format!("Invalid base64 image data: {e}")).with_field(field)
    })?;

    if bytes.is_empty() {
        return Err(AppError::invalid_input("Image is empty").with_field(field));
    }
    if bytes.len() > limits::MAX_IMAGE_BYTES {
        return Err(AppError::invalid_input(format!(
            "Image exceeds {} bytes",
            limits::MAX_IMAGE_BYTES
        ))
        .with_field(field));
    }

    Ok(DecodedImage { extension, bytes })
}

/// Binary image storage
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist an image under `folder` and return its reference
    ///
    /// # Errors
    /// Returns a storage error if the image cannot be written
    async fn store(&self, folder: &str, image: DecodedImage) -> AppResult<String>;

    /// Remove a stored image; removing a missing image is not an error
    ///
    /// # Errors
    /// Returns a storage error if the image exists but cannot be removed
    async fn delete(&self, reference: &str) -> AppResult<()>;

    /// Public URL of a stored image
    fn url(&self, reference: &str) -> String;
}

/// Filesystem-backed image store served under `/media`
#[derive(Debug, Clone)]
pub struct LocalImageStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalImageStore {
    /// Create a store rooted at `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    /// Directory images are written to
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, reference: &str) -> AppResult<PathBuf> {
        let relative = Path::new(reference);
        let safe = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe || reference.is_empty() {
            return Err(AppError::storage(format!(
                "Refusing image reference '{reference}'"
            )));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, folder: &str, image: DecodedImage) -> AppResult<String> {
        let reference = format!("{folder}/{}.{}", Uuid::new_v4(), image.extension);
        let path = self.resolve(&reference)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                AppError::storage(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }
        tokio::fs::write(&path, &image.bytes)
            .await
            .map_err(|e| AppError::storage(format!("Failed to write {}: {e}", path.display())))?;

        debug!(reference = %reference, bytes = image.bytes.len(), "Image stored");
        Ok(reference)
    }

    async fn delete(&self, reference: &str) -> AppResult<()> {
        let path = self.resolve(reference)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                warn!(reference = %reference, "Image already gone");
                Ok(())
            }
            Err(e) => Err(AppError::storage(format!(
                "Failed to remove {}: {e}",
                path.display()
            ))),
        }
    }

    fn url(&self, reference: &str) -> String {
        format!("{}{}/{reference}", self.public_base_url, endpoints::MEDIA)
    }
}
