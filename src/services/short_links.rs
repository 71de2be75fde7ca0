// ABOUTME: Short code generation for compact recipe links
// ABOUTME: Random and scripted generators behind one trait, plus code format checks and URL building
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::collections::VecDeque;
use std::sync::Mutex;

use rand::Rng;

use crate::constants::short_links::{ALPHABET, CODE_LENGTH, REDIRECT_PREFIX};

/// Source of candidate short codes
///
/// Candidates are not guaranteed to be unused; the caller checks them
/// against storage and draws again on collision.
pub trait ShortCodeGenerator: Send + Sync {
    /// Produce the next candidate code
    fn generate(&self) -> String;
}

/// Uniformly random codes of [`CODE_LENGTH`] characters from [`ALPHABET`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomShortCodeGenerator;

impl ShortCodeGenerator for RandomShortCodeGenerator {
    fn generate(&self) -> String {
        random_code(CODE_LENGTH)
    }
}

/// Replays a fixed sequence of codes, then falls back to random ones
///
/// Useful for reproducible fixtures and for forcing collisions.
#[derive(Debug, Default)]
pub struct SequenceShortCodeGenerator {
    codes: Mutex<VecDeque<String>>,
}

impl SequenceShortCodeGenerator {
    /// Create a generator that yields `codes` in order
    #[must_use]
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            codes: Mutex::new(codes.into_iter().map(Into::into).collect()),
        }
    }

    /// Number of scripted codes not yet handed out
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.codes.lock().map_or(0, |codes| codes.len())
    }
}

impl ShortCodeGenerator for SequenceShortCodeGenerator {
    fn generate(&self) -> String {
        self.codes
            .lock()
            .ok()
            .and_then(|mut codes| codes.pop_front())
            .unwrap_or_else(|| random_code(CODE_LENGTH))
    }
}

fn random_code(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| char::from(ALPHABET[rng.gen_range(0..ALPHABET.len())]))
        .collect()
}

/// Whether `code` has the shape of a generated short code
#[must_use]
pub fn is_well_formed(code: &str) -> bool {
    code.len() == CODE_LENGTH && code.bytes().all(|b| ALPHABET.contains(&b))
}

/// Public short link for a code
#[must_use]
pub fn short_link_url(public_base_url: &str, code: &str) -> String {
    format!("{public_base_url}{REDIRECT_PREFIX}/{code}")
}

/// Frontend location a short link redirects to
#[must_use]
pub fn recipe_page_url(public_base_url: &str, recipe_id: i64) -> String {
    format!("{public_base_url}/recipes/{recipe_id}/")
}
