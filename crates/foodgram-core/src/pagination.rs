// ABOUTME: Page-number pagination module for list endpoints
// ABOUTME: Resolves page/limit query parameters and builds count/next/previous envelopes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use url::Url;

/// Raw pagination query parameters as sent by the client
///
/// Both values are optional and parsed leniently: anything that is not a
/// positive integer falls back to the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PageQuery {
    /// 1-based page number
    pub page: Option<String>,
    /// Page size
    pub limit: Option<String>,
}

/// Resolved pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// 1-based page number
    pub page: u32,
    /// Page size, clamped to the configured maximum
    pub limit: u32,
}

impl PageParams {
    /// Resolve raw query values against defaults
    #[must_use]
    pub fn resolve(query: &PageQuery, default_limit: u32, max_limit: u32) -> Self {
        let page = query
            .page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);
        let limit = query
            .limit
            .as_deref()
            .and_then(|l| l.trim().parse::<u32>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(default_limit)
            .min(max_limit);

        Self { page, limit }
    }

    /// SQL `LIMIT` value
    #[must_use]
    pub fn sql_limit(&self) -> i64 {
        i64::from(self.limit)
    }

    /// SQL `OFFSET` value
    #[must_use]
    pub fn sql_offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

/// Paginated response envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Total number of items across all pages
    pub count: u64,
    /// Absolute URL of the next page
    pub next: Option<String>,
    /// Absolute URL of the previous page
    pub previous: Option<String>,
    /// Items on this page
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Build a page, deriving `next`/`previous` links from `request_url`
    ///
    /// `request_url` is the absolute URL of the current request; its other
    /// query parameters (filters) are preserved in the generated links.
    #[must_use]
    pub fn new(results: Vec<T>, count: u64, params: PageParams, request_url: &Url) -> Self {
        let seen = u64::from(params.page) * u64::from(params.limit);
        let next = (seen < count).then(|| page_link(request_url, params.page + 1, params.limit));
        let previous = (params.page > 1).then(|| page_link(request_url, params.page - 1, params.limit));

        Self {
            count,
            next,
            previous,
            results,
        }
    }

    /// Transform the items while keeping the envelope
    #[must_use]
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            count: self.count,
            next: self.next,
            previous: self.previous,
            results: self.results.into_iter().map(f).collect(),
        }
    }
}

fn page_link(request_url: &Url, page: u32, limit: u32) -> String {
    let mut url = request_url.clone();
    let kept: Vec<(String, String)> = request_url
        .query_pairs()
        .filter(|(k, _)| k != "page" && k != "limit")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();

    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &kept {
            pairs.append_pair(k, v);
        }
        pairs.append_pair("page", &page.to_string());
        pairs.append_pair("limit", &limit.to_string());
    }

    url.to_string()
}
