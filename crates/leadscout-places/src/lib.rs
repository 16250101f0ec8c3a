pub mod client;
pub mod error;
pub mod expansion;
pub mod export;
pub mod grid;
pub mod grid_search;
pub mod lead;
pub mod pagination;
pub mod query;
pub(crate) mod retry;
pub mod session;
pub mod social;
pub mod types;

pub use client::PlacesClient;
pub use error::PlacesError;
pub use expansion::{
    BatchReport, ExpansionSettings, FailureReason, IndustrySearch, KeywordFailure, LeadFinder,
};
pub use export::{export_leads, safe_append, AppendPolicy, ExportSummary, JsonlSink, LeadSink, SinkError};
pub use grid::{generate_grid, GridConfig, GridPoint};
pub use grid_search::grid_search;
pub use lead::BusinessLead;
pub use pagination::{fetch_paginated, PaginatedResults, PaginationSettings};
pub use query::{PageRequest, PlacesApi, SearchQuery};
pub use retry::RetryPolicy;
pub use session::ProcessedIdSet;
pub use types::{ApiStatus, PlaceRecord, SearchResponse};
