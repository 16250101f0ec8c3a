//! Search queries and the collaborator trait the search engine runs against.

use crate::grid::GridPoint;
use crate::types::{PlaceRecord, SearchResponse};

/// Where a query is anchored.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationAnchor {
    /// Free text, e.g. `"Omagh Northern Ireland"`.
    Text(String),
    Point(GridPoint),
}

/// One logical search, driven through pagination exactly once.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchQuery {
    keyword: String,
    anchor: LocationAnchor,
    radius_m: Option<f64>,
}

impl SearchQuery {
    /// Text query of the form `"<keyword> in <location>"`.
    #[must_use]
    pub fn in_location(keyword: &str, location: &str) -> Self {
        Self {
            keyword: keyword.to_owned(),
            anchor: LocationAnchor::Text(location.to_owned()),
            radius_m: None,
        }
    }

    /// Keyword query biased to a circle of `radius_m` around `point`.
    #[must_use]
    pub fn around(keyword: &str, point: GridPoint, radius_m: f64) -> Self {
        Self {
            keyword: keyword.to_owned(),
            anchor: LocationAnchor::Point(point),
            radius_m: Some(radius_m),
        }
    }

    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    #[must_use]
    pub fn anchor(&self) -> &LocationAnchor {
        &self.anchor
    }

    #[must_use]
    pub fn radius_m(&self) -> Option<f64> {
        self.radius_m
    }

    /// Query-string parameters for the first page of this search.
    ///
    /// Taxonomy keywords use underscores (`boxing_gym`); they are sent as
    /// plain words.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let keyword = self.keyword.replace('_', " ");
        match &self.anchor {
            LocationAnchor::Text(location) => {
                vec![("query", format!("{keyword} in {location}"))]
            }
            LocationAnchor::Point(point) => {
                let mut params = vec![("query", keyword), ("location", point.to_string())];
                if let Some(radius) = self.radius_m {
                    params.push(("radius", format!("{radius:.0}")));
                }
                params
            }
        }
    }
}

/// A page request: either the first page of a query or a continuation.
#[derive(Debug, Clone, PartialEq)]
pub enum PageRequest<'a> {
    First(&'a SearchQuery),
    /// Only the token may be sent with a continuation request.
    Continuation(String),
}

impl PageRequest<'_> {
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            Self::First(query) => query.params(),
            Self::Continuation(token) => vec![("pagetoken", token.clone())],
        }
    }
}

/// The external places service as seen by the search engine.
///
/// Implementations follow the request-shim contract: `None` means the call
/// failed after whatever retrying the implementation does, and callers
/// degrade to partial results instead of aborting.
#[allow(async_fn_in_trait)]
pub trait PlacesApi {
    /// Fetch one page of text-search results.
    async fn search_page(&self, request: &PageRequest<'_>) -> Option<SearchResponse>;

    /// Fetch the full record for one place.
    async fn place_details(&self, place_id: &str) -> Option<PlaceRecord>;

    /// Resolve free text to coordinates. A single attempt, no retry.
    async fn geocode(&self, location: &str) -> Option<GridPoint>;
}
