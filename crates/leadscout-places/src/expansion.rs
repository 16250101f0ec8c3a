//! Query expansion controller.
//!
//! For one (industry, location) pair: expand the industry into keyword
//! variants, run a direct text search per variant, and fall back to a grid
//! sweep around the geocoded location whenever the direct search returns
//! fewer results than the threshold. Survivors of the session dedup are
//! enriched with a details lookup and emitted as [`BusinessLead`]s.

use leadscout_core::KeywordSynonyms;

use crate::grid::{generate_grid, GridConfig, GridPoint, DEFAULT_OVERLAP_FACTOR};
use crate::grid_search::grid_search;
use crate::lead::BusinessLead;
use crate::pagination::{fetch_paginated, PaginationSettings};
use crate::query::{PlacesApi, SearchQuery};
use crate::session::ProcessedIdSet;
use crate::types::PlaceRecord;

/// Direct searches returning fewer results than this trigger a grid sweep.
pub const DEFAULT_RESULTS_THRESHOLD: usize = 55;

/// Radius of the disk swept around a location during grid expansion.
pub const DEFAULT_COVERAGE_RADIUS_M: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpansionSettings {
    pub results_threshold: usize,
    pub coverage_radius_m: f64,
    pub overlap_factor: f64,
    pub pagination: PaginationSettings,
}

impl Default for ExpansionSettings {
    fn default() -> Self {
        Self {
            results_threshold: DEFAULT_RESULTS_THRESHOLD,
            coverage_radius_m: DEFAULT_COVERAGE_RADIUS_M,
            overlap_factor: DEFAULT_OVERLAP_FACTOR,
            pagination: PaginationSettings::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    /// The direct text search returned nothing usable; grid expansion was
    /// not attempted for this keyword.
    DirectSearchFailed,
    /// The location could not be geocoded, so only direct results were kept.
    GeocodeFailed,
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DirectSearchFailed => f.write_str("direct search failed"),
            Self::GeocodeFailed => f.write_str("geocoding failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordFailure {
    pub keyword: String,
    pub location: String,
    pub reason: FailureReason,
}

/// Outcome of one (industry, location) unit of work.
#[derive(Debug, Clone, Default)]
pub struct IndustrySearch {
    pub industry: String,
    pub location: String,
    pub leads: Vec<BusinessLead>,
    pub failures: Vec<KeywordFailure>,
    /// Keyword variants that went through a grid sweep.
    pub grid_expansions: usize,
}

/// Aggregate over every (location, industry) pair of a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub searches: Vec<IndustrySearch>,
}

impl BatchReport {
    pub fn leads(&self) -> impl Iterator<Item = &BusinessLead> {
        self.searches.iter().flat_map(|s| s.leads.iter())
    }

    pub fn failures(&self) -> impl Iterator<Item = &KeywordFailure> {
        self.searches.iter().flat_map(|s| s.failures.iter())
    }

    #[must_use]
    pub fn lead_count(&self) -> usize {
        self.searches.iter().map(|s| s.leads.len()).sum()
    }

    #[must_use]
    pub fn into_leads(self) -> Vec<BusinessLead> {
        self.searches.into_iter().flat_map(|s| s.leads).collect()
    }
}

/// Turns coarse (industry, location) requests into deduplicated leads.
pub struct LeadFinder<'a, A> {
    api: &'a A,
    synonyms: &'a KeywordSynonyms,
    settings: ExpansionSettings,
}

impl<'a, A: PlacesApi> LeadFinder<'a, A> {
    #[must_use]
    pub fn new(api: &'a A, synonyms: &'a KeywordSynonyms, settings: ExpansionSettings) -> Self {
        Self {
            api,
            synonyms,
            settings,
        }
    }

    #[must_use]
    pub fn settings(&self) -> &ExpansionSettings {
        &self.settings
    }

    /// Runs every industry in every location, locations outermost.
    ///
    /// One pair failing never stops the batch; its failures are carried in
    /// the report.
    pub async fn search_all(
        &self,
        industries: &[String],
        locations: &[String],
        region: Option<&str>,
        cell_radius_km: f64,
        processed: &mut ProcessedIdSet,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for location in locations {
            for industry in industries {
                let search = self
                    .search_industry_in_location(
                        industry,
                        location,
                        region,
                        cell_radius_km,
                        processed,
                    )
                    .await;
                report.searches.push(search);
            }
        }
        tracing::info!(
            pairs = report.searches.len(),
            leads = report.lead_count(),
            failures = report.failures().count(),
            "batch finished"
        );
        report
    }

    /// Searches one industry in one location.
    ///
    /// Keyword variants run in expansion order. Direct results claim their
    /// place IDs in `processed` before that variant's grid sweep runs, so a
    /// business found both ways is attributed to the direct search, and an
    /// earlier variant wins over a later one. The location is geocoded at
    /// most once per call.
    pub async fn search_industry_in_location(
        &self,
        industry: &str,
        location: &str,
        region: Option<&str>,
        cell_radius_km: f64,
        processed: &mut ProcessedIdSet,
    ) -> IndustrySearch {
        let text_location = match region.map(str::trim) {
            Some(region) if !region.is_empty() => format!("{location} {region}"),
            _ => location.to_owned(),
        };
        let cell_radius_m = cell_radius_km * 1_000.0;
        let pagination = &self.settings.pagination;

        let mut outcome = IndustrySearch {
            industry: industry.to_owned(),
            location: location.to_owned(),
            ..IndustrySearch::default()
        };
        let mut candidates: Vec<PlaceRecord> = Vec::new();
        let mut center: Option<Option<GridPoint>> = None;
        let mut grid: Option<Vec<GridPoint>> = None;

        for keyword in self.synonyms.expand(industry) {
            let query = SearchQuery::in_location(&keyword, &text_location);
            let Some(direct) = fetch_paginated(self.api, &query, pagination).await else {
                tracing::warn!(
                    keyword = %keyword,
                    location,
                    "direct search failed; skipping keyword"
                );
                outcome.failures.push(KeywordFailure {
                    keyword,
                    location: location.to_owned(),
                    reason: FailureReason::DirectSearchFailed,
                });
                continue;
            };

            let direct_count = direct.len();
            let before = candidates.len();
            for place in direct.places {
                if processed.insert(&place.place_id) {
                    candidates.push(place);
                }
            }
            tracing::info!(
                keyword = %keyword,
                location,
                direct_count,
                new = candidates.len() - before,
                "direct search finished"
            );

            if direct_count >= self.settings.results_threshold {
                tracing::debug!(
                    keyword = %keyword,
                    location,
                    threshold = self.settings.results_threshold,
                    "direct search meets threshold; no grid expansion"
                );
                continue;
            }

            if center.is_none() {
                center = Some(self.api.geocode(&text_location).await);
            }
            let Some(point) = center.flatten() else {
                tracing::warn!(
                    keyword = %keyword,
                    location,
                    "could not geocode location; keeping direct results only"
                );
                outcome.failures.push(KeywordFailure {
                    keyword,
                    location: location.to_owned(),
                    reason: FailureReason::GeocodeFailed,
                });
                continue;
            };

            let points = grid.get_or_insert_with(|| {
                let config = GridConfig {
                    coverage_radius_m: self.settings.coverage_radius_m,
                    cell_radius_m,
                    overlap_factor: self.settings.overlap_factor,
                };
                generate_grid(point, &config)
            });
            let found =
                grid_search(self.api, &keyword, points, cell_radius_m, processed, pagination).await;
            outcome.grid_expansions += 1;
            candidates.extend(found);
        }

        outcome.leads.reserve(candidates.len());
        for place in candidates {
            let place = self.enrich(place).await;
            outcome.leads.push(BusinessLead::from_place(place, industry));
        }

        tracing::info!(
            industry,
            location,
            leads = outcome.leads.len(),
            failures = outcome.failures.len(),
            grid_expansions = outcome.grid_expansions,
            "industry search finished"
        );
        outcome
    }

    /// Fills missing phone/website from a details lookup. A failed lookup
    /// keeps the record as it is.
    async fn enrich(&self, place: PlaceRecord) -> PlaceRecord {
        if !place.needs_details() {
            return place;
        }
        match self.api.place_details(&place.place_id).await {
            Some(details) => place.merge_details(details),
            None => {
                tracing::warn!(
                    place_id = %place.place_id,
                    "details lookup failed; emitting lead without contact details"
                );
                place
            }
        }
    }
}
