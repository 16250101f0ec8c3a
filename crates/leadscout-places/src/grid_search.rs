//! Runs one keyword across every point of a search grid.

use crate::grid::GridPoint;
use crate::pagination::{fetch_paginated, PaginationSettings};
use crate::query::{PlacesApi, SearchQuery};
use crate::session::ProcessedIdSet;
use crate::types::PlaceRecord;

/// Searches `keyword` around each of `points` in order and returns only
/// businesses not yet in `processed`, claiming each one as it is found.
///
/// A business seen by two overlapping cells belongs to whichever cell was
/// searched first. A failed point is logged and skipped.
pub async fn grid_search<A: PlacesApi>(
    api: &A,
    keyword: &str,
    points: &[GridPoint],
    cell_radius_m: f64,
    processed: &mut ProcessedIdSet,
    settings: &PaginationSettings,
) -> Vec<PlaceRecord> {
    let mut found = Vec::new();
    let mut failed_points = 0usize;

    for (index, point) in points.iter().enumerate() {
        let query = SearchQuery::around(keyword, *point, cell_radius_m);
        let Some(results) = fetch_paginated(api, &query, settings).await else {
            failed_points += 1;
            tracing::warn!(keyword, point = %point, index, "grid point search failed; skipping");
            continue;
        };

        let before = found.len();
        for place in results.places {
            if processed.insert(&place.place_id) {
                found.push(place);
            }
        }
        tracing::debug!(
            keyword,
            point = %point,
            index,
            new = found.len() - before,
            "grid point searched"
        );
    }

    tracing::info!(
        keyword,
        points = points.len(),
        failed_points,
        new_places = found.len(),
        "grid search finished"
    );
    found
}
