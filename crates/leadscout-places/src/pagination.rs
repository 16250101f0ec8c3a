//! Page-token pagination for the text search endpoint.
//!
//! A logical query returns at most 3 pages of 20 results. Each response may
//! carry a `next_page_token`; the token only becomes valid a short while
//! after it is issued, so the fetcher waits before every continuation
//! request. Requesting too early yields `INVALID_REQUEST`.

use std::collections::HashSet;
use std::time::Duration;

use crate::query::{PageRequest, PlacesApi, SearchQuery};
use crate::types::{ApiStatus, PlaceRecord};

pub const RESULTS_PER_PAGE: usize = 20;
pub const MAX_PAGES: u32 = 3;
pub const MAX_RESULTS_PER_QUERY: usize = 60;
pub const DEFAULT_PAGE_TOKEN_DELAY: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationSettings {
    pub max_pages: u32,
    pub max_results: usize,
    /// Wait before sending a continuation token.
    pub page_token_delay: Duration,
}

impl Default for PaginationSettings {
    fn default() -> Self {
        Self {
            max_pages: MAX_PAGES,
            max_results: MAX_RESULTS_PER_QUERY,
            page_token_delay: DEFAULT_PAGE_TOKEN_DELAY,
        }
    }
}

impl PaginationSettings {
    #[must_use]
    pub fn with_page_token_delay(page_token_delay: Duration) -> Self {
        Self {
            page_token_delay,
            ..Self::default()
        }
    }
}

/// Everything one fetch run accumulated, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct PaginatedResults {
    pub places: Vec<PlaceRecord>,
    pub place_ids: HashSet<String>,
    pub pages_fetched: u32,
}

impl PaginatedResults {
    #[must_use]
    pub fn len(&self) -> usize {
        self.places.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    fn push(&mut self, place: PlaceRecord) {
        if place.place_id.is_empty() {
            tracing::warn!(name = ?place.name, "skipping result without place_id");
            return;
        }
        if self.place_ids.insert(place.place_id.clone()) {
            self.places.push(place);
        }
    }
}

/// Drives `query` through pagination.
///
/// Returns `None` when the first page fails or is rejected, since nothing
/// trustworthy was obtained. A failure on a later page keeps what was
/// already accumulated. `ZERO_RESULTS` on the first page returns an empty
/// result without following any token.
///
/// Stops, in order of precedence, when the result ceiling is reached, when
/// no continuation token is returned, or when the page limit is reached.
pub async fn fetch_paginated<A: PlacesApi>(
    api: &A,
    query: &SearchQuery,
    settings: &PaginationSettings,
) -> Option<PaginatedResults> {
    let keyword = query.keyword();
    let mut results = PaginatedResults::default();
    let mut request = PageRequest::First(query);

    loop {
        let first_page = results.pages_fetched == 0;
        let Some(page) = api.search_page(&request).await else {
            if first_page {
                tracing::warn!(keyword, "first page failed; no results for this query");
                return None;
            }
            tracing::warn!(
                keyword,
                pages = results.pages_fetched,
                kept = results.len(),
                "continuation page failed; keeping partial results"
            );
            break;
        };
        results.pages_fetched += 1;

        match page.status {
            ApiStatus::Ok => {}
            ApiStatus::ZeroResults => {
                if first_page {
                    tracing::debug!(keyword, "zero results");
                }
                break;
            }
            status => {
                if first_page {
                    tracing::error!(
                        keyword,
                        %status,
                        error_message = ?page.error_message,
                        "search rejected"
                    );
                    return None;
                }
                // Usually an expired or premature token.
                tracing::warn!(
                    keyword,
                    %status,
                    kept = results.len(),
                    "continuation rejected; keeping partial results"
                );
                break;
            }
        }

        let next_token = page.continuation().map(str::to_owned);
        for place in page.results {
            results.push(place);
        }

        if results.len() >= settings.max_results {
            break;
        }
        let Some(token) = next_token else {
            break;
        };
        if results.pages_fetched >= settings.max_pages {
            break;
        }

        tokio::time::sleep(settings.page_token_delay).await;
        request = PageRequest::Continuation(token);
    }

    tracing::debug!(
        keyword,
        pages = results.pages_fetched,
        results = results.len(),
        "pagination finished"
    );
    Some(results)
}
