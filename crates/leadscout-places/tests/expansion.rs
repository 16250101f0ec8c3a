//! Scenario tests for pagination, grid search, and the expansion controller
//! against a scripted in-memory places API.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::time::Duration;

use leadscout_core::KeywordSynonyms;
use leadscout_places::expansion::FailureReason;
use leadscout_places::query::LocationAnchor;
use leadscout_places::{
    grid_search, ApiStatus, ExpansionSettings, GridPoint, LeadFinder, PageRequest,
    PaginationSettings, PlaceRecord, PlacesApi, ProcessedIdSet, SearchResponse,
};

const OMAGH: GridPoint = GridPoint {
    lat: 54.597_7,
    lng: -7.309_9,
};

/// Text queries and tokens answer with fixed pages; point queries pop from a
/// per-keyword queue and answer `ZERO_RESULTS` once it runs dry.
#[derive(Default)]
struct ScriptedApi {
    text: HashMap<String, Option<SearchResponse>>,
    tokens: HashMap<String, Option<SearchResponse>>,
    points: RefCell<HashMap<String, VecDeque<Option<SearchResponse>>>>,
    details: HashMap<String, PlaceRecord>,
    geocodes: HashMap<String, GridPoint>,
    calls: RefCell<Vec<String>>,
}

impl ScriptedApi {
    fn text(mut self, query: &str, page: Option<SearchResponse>) -> Self {
        self.text.insert(query.to_owned(), page);
        self
    }

    fn token(mut self, token: &str, page: Option<SearchResponse>) -> Self {
        self.tokens.insert(token.to_owned(), page);
        self
    }

    fn point_pages(self, keyword: &str, pages: Vec<Option<SearchResponse>>) -> Self {
        self.points
            .borrow_mut()
            .insert(keyword.to_owned(), pages.into());
        self
    }

    fn details(mut self, record: PlaceRecord) -> Self {
        self.details.insert(record.place_id.clone(), record);
        self
    }

    fn geocode_to(mut self, location: &str, point: GridPoint) -> Self {
        self.geocodes.insert(location.to_owned(), point);
        self
    }

    fn calls_starting_with(&self, prefix: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }
}

impl PlacesApi for ScriptedApi {
    async fn search_page(&self, request: &PageRequest<'_>) -> Option<SearchResponse> {
        match request {
            PageRequest::First(query) => match query.anchor() {
                LocationAnchor::Text(location) => {
                    let key = format!("{} in {location}", query.keyword());
                    self.calls.borrow_mut().push(format!("text:{key}"));
                    self.text.get(&key).cloned().unwrap_or_else(zero)
                }
                LocationAnchor::Point(point) => {
                    self.calls
                        .borrow_mut()
                        .push(format!("point:{}@{point}", query.keyword()));
                    self.points
                        .borrow_mut()
                        .get_mut(query.keyword())
                        .and_then(VecDeque::pop_front)
                        .unwrap_or_else(zero)
                }
            },
            PageRequest::Continuation(token) => {
                self.calls.borrow_mut().push(format!("token:{token}"));
                self.tokens.get(token).cloned().flatten()
            }
        }
    }

    async fn place_details(&self, place_id: &str) -> Option<PlaceRecord> {
        self.calls.borrow_mut().push(format!("details:{place_id}"));
        self.details.get(place_id).cloned()
    }

    async fn geocode(&self, location: &str) -> Option<GridPoint> {
        self.calls.borrow_mut().push(format!("geocode:{location}"));
        self.geocodes.get(location).copied()
    }
}

fn zero() -> Option<SearchResponse> {
    Some(SearchResponse {
        status: ApiStatus::ZeroResults,
        results: Vec::new(),
        next_page_token: None,
        error_message: None,
    })
}

/// A complete record, so no details lookup is needed.
fn place(id: &str) -> PlaceRecord {
    PlaceRecord {
        place_id: id.to_owned(),
        name: Some(format!("Business {id}")),
        formatted_address: Some(format!("{id} Main Street")),
        formatted_phone_number: Some("028 0000 0000".into()),
        website: Some(format!("https://{id}.example")),
        ..PlaceRecord::default()
    }
}

fn page(ids: &[&str], token: Option<&str>) -> Option<SearchResponse> {
    Some(SearchResponse {
        status: ApiStatus::Ok,
        results: ids.iter().map(|id| place(id)).collect(),
        next_page_token: token.map(str::to_owned),
        error_message: None,
    })
}

fn numbered(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

fn as_refs(ids: &[String]) -> Vec<&str> {
    ids.iter().map(String::as_str).collect()
}

fn synonyms(entries: &[(&str, &[&str])]) -> KeywordSynonyms {
    KeywordSynonyms::new(
        entries
            .iter()
            .map(|(k, v)| ((*k).to_owned(), v.iter().map(|s| (*s).to_owned()).collect()))
            .collect(),
    )
}

fn settings() -> ExpansionSettings {
    ExpansionSettings {
        coverage_radius_m: 2_000.0,
        pagination: PaginationSettings::with_page_token_delay(Duration::ZERO),
        ..ExpansionSettings::default()
    }
}

fn lead_ids(leads: &[leadscout_places::BusinessLead]) -> Vec<&str> {
    leads.iter().map(|l| l.place_id.as_str()).collect()
}

#[tokio::test]
async fn dense_location_skips_grid_expansion() {
    let ids = numbered("belfast-", 80);
    let api = ScriptedApi::default().text("restaurant in Belfast", page(&as_refs(&ids), Some("more")));
    let table = KeywordSynonyms::default();
    let finder = LeadFinder::new(&api, &table, settings());
    let mut processed = ProcessedIdSet::new();

    let result = finder
        .search_industry_in_location("restaurant", "Belfast", None, 1.5, &mut processed)
        .await;

    assert_eq!(result.leads.len(), 80);
    assert_eq!(result.grid_expansions, 0);
    assert!(result.failures.is_empty());
    assert_eq!(api.calls_starting_with("geocode:"), 0);
    assert_eq!(api.calls_starting_with("point:"), 0);
    assert_eq!(processed.len(), 80);
}

#[tokio::test]
async fn sparse_location_merges_grid_results_without_duplicates() {
    let direct = numbered("omagh-", 8);
    let api = ScriptedApi::default()
        .text("boxing_gym in Omagh", page(&as_refs(&direct), None))
        .geocode_to("Omagh", OMAGH)
        .point_pages(
            "boxing_gym",
            vec![
                page(&["omagh-0", "omagh-1", "grid-a", "grid-b"], Some("g1")),
                page(&["grid-b", "grid-c"], None),
                None,
                page(&["grid-d", "omagh-7"], None),
            ],
        )
        .token("g1", page(&["grid-a", "grid-e"], None));
    let table = KeywordSynonyms::default();
    let finder = LeadFinder::new(&api, &table, settings());
    let mut processed = ProcessedIdSet::new();

    let result = finder
        .search_industry_in_location("boxing_gym", "Omagh", None, 1.0, &mut processed)
        .await;

    let ids = lead_ids(&result.leads);
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len(), "duplicate place in {ids:?}");
    assert_eq!(ids.len(), 8 + 5);
    assert_eq!(&ids[..8], as_refs(&direct).as_slice());
    assert_eq!(&ids[8..], ["grid-a", "grid-b", "grid-e", "grid-c", "grid-d"]);
    assert_eq!(result.grid_expansions, 1);
    assert!(result.failures.is_empty(), "a failed grid point is not a keyword failure");
    assert!(result.leads.iter().all(|l| l.business_type == "boxing_gym"));

    // coverage 2 km, cell 1 km: center + 7 + 13 points, center first.
    assert_eq!(api.calls_starting_with("point:"), 21);
    assert_eq!(
        api.calls.borrow().iter().find(|c| c.starts_with("point:")).map(String::as_str),
        Some("point:boxing_gym@54.597700,-7.309900")
    );
}

#[tokio::test]
async fn geocode_failure_keeps_direct_results() {
    let api = ScriptedApi::default().text("gym in Atlantis", page(&["a", "b"], None));
    let table = KeywordSynonyms::default();
    let finder = LeadFinder::new(&api, &table, settings());
    let mut processed = ProcessedIdSet::new();

    let result = finder
        .search_industry_in_location("gym", "Atlantis", None, 1.5, &mut processed)
        .await;

    assert_eq!(lead_ids(&result.leads), ["a", "b"]);
    assert_eq!(result.grid_expansions, 0);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].reason, FailureReason::GeocodeFailed);
    assert_eq!(result.failures[0].keyword, "gym");
    assert_eq!(api.calls_starting_with("point:"), 0);
}

#[tokio::test]
async fn failed_details_lookup_still_emits_lead() {
    let bare = |id: &str| PlaceRecord {
        place_id: id.to_owned(),
        name: Some(format!("Bare {id}")),
        ..PlaceRecord::default()
    };
    let api = ScriptedApi::default()
        .text(
            "cafe in Omagh",
            Some(SearchResponse {
                status: ApiStatus::Ok,
                results: vec![bare("no-details"), bare("with-details")],
                next_page_token: None,
                error_message: None,
            }),
        )
        .details(PlaceRecord {
            place_id: "with-details".into(),
            formatted_phone_number: Some("028 8224 1111".into()),
            website: Some("https://www.instagram.com/omaghcafe".into()),
            ..PlaceRecord::default()
        });
    let table = KeywordSynonyms::default();
    let finder = LeadFinder::new(
        &api,
        &table,
        ExpansionSettings {
            results_threshold: 1,
            ..settings()
        },
    );
    let mut processed = ProcessedIdSet::new();

    let result = finder
        .search_industry_in_location("cafe", "Omagh", None, 1.5, &mut processed)
        .await;

    assert_eq!(result.leads.len(), 2);
    let missing = &result.leads[0];
    assert_eq!(missing.place_id, "no-details");
    assert_eq!(missing.phone_number, "N/A");
    assert_eq!(missing.website, "N/A");

    let filled = &result.leads[1];
    assert_eq!(filled.name, "Bare with-details");
    assert_eq!(filled.phone_number, "028 8224 1111");
    assert_eq!(filled.instagram, "https://www.instagram.com/omaghcafe");
    assert_eq!(api.calls_starting_with("details:"), 2);
}

#[tokio::test]
async fn direct_results_outrank_grid_and_earlier_variants_outrank_later() {
    let api = ScriptedApi::default()
        .text("gym in Omagh", page(&["a"], None))
        .text("fitness centre in Omagh", page(&["g1", "f1", "a"], None))
        .geocode_to("Omagh", OMAGH)
        .point_pages("gym", vec![page(&["a", "g1"], None)])
        .point_pages("fitness centre", vec![page(&["f1", "f2"], None)]);
    let table = synonyms(&[("gym", &["fitness centre"])]);
    let finder = LeadFinder::new(&api, &table, settings());
    let mut processed = ProcessedIdSet::new();

    let result = finder
        .search_industry_in_location("gym", "Omagh", None, 1.0, &mut processed)
        .await;

    // "a" comes from the gym direct search and is not re-emitted by the gym
    // grid; "g1" is claimed by the gym grid before the fitness centre direct
    // search sees it; "f1" is claimed by the fitness centre direct search
    // before its own grid sweep.
    assert_eq!(lead_ids(&result.leads), ["a", "g1", "f1", "f2"]);
    assert!(result.leads.iter().all(|l| l.business_type == "gym"));
    assert_eq!(result.grid_expansions, 2);
    assert_eq!(api.calls_starting_with("geocode:"), 1, "geocode once per call");
}

#[tokio::test]
async fn session_set_suppresses_repeat_searches() {
    let api = ScriptedApi::default().text("gym in Omagh", page(&["a", "b"], None));
    let table = KeywordSynonyms::default();
    let finder = LeadFinder::new(
        &api,
        &table,
        ExpansionSettings {
            results_threshold: 0,
            ..settings()
        },
    );
    let mut processed = ProcessedIdSet::new();

    let first = finder
        .search_industry_in_location("gym", "Omagh", None, 1.5, &mut processed)
        .await;
    let second = finder
        .search_industry_in_location("gym", "Omagh", None, 1.5, &mut processed)
        .await;

    assert_eq!(first.leads.len(), 2);
    assert!(second.leads.is_empty());
    assert_eq!(processed.len(), 2);
}

#[tokio::test]
async fn failed_keyword_does_not_stop_other_variants() {
    let api = ScriptedApi::default()
        .text("gym in Omagh", None)
        .text("health club in Omagh", page(&["h1"], None));
    let table = synonyms(&[("gym", &["health club"])]);
    let finder = LeadFinder::new(
        &api,
        &table,
        ExpansionSettings {
            results_threshold: 1,
            ..settings()
        },
    );
    let mut processed = ProcessedIdSet::new();

    let result = finder
        .search_industry_in_location("gym", "Omagh", None, 1.5, &mut processed)
        .await;

    assert_eq!(lead_ids(&result.leads), ["h1"]);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].keyword, "gym");
    assert_eq!(result.failures[0].reason, FailureReason::DirectSearchFailed);
    assert_eq!(api.calls_starting_with("geocode:"), 0);
}

#[tokio::test]
async fn failed_direct_search_leaves_location_unswept() {
    let api = ScriptedApi::default()
        .text("gym in Omagh", None)
        .geocode_to("Omagh", OMAGH)
        .point_pages("gym", vec![page(&["g1", "g2"], None)]);
    let table = synonyms(&[]);
    let finder = LeadFinder::new(&api, &table, settings());
    let mut processed = ProcessedIdSet::new();

    let result = finder
        .search_industry_in_location("gym", "Omagh", None, 1.5, &mut processed)
        .await;

    assert!(result.leads.is_empty());
    assert_eq!(result.grid_expansions, 0);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].reason, FailureReason::DirectSearchFailed);
    assert_eq!(api.calls_starting_with("geocode:"), 0);
    assert_eq!(api.calls_starting_with("point:"), 0);
    assert!(processed.is_empty());
}

#[tokio::test]
async fn region_is_appended_to_text_queries_and_geocoding() {
    let api = ScriptedApi::default()
        .text("gym in Omagh Northern Ireland", page(&["a"], None))
        .geocode_to("Omagh Northern Ireland", OMAGH);
    let table = KeywordSynonyms::default();
    let finder = LeadFinder::new(
        &api,
        &table,
        ExpansionSettings {
            coverage_radius_m: 0.0,
            ..settings()
        },
    );
    let mut processed = ProcessedIdSet::new();

    let result = finder
        .search_industry_in_location("gym", "Omagh", Some("Northern Ireland"), 1.5, &mut processed)
        .await;

    assert_eq!(lead_ids(&result.leads), ["a"]);
    assert_eq!(result.location, "Omagh");
    assert_eq!(api.calls_starting_with("geocode:Omagh Northern Ireland"), 1);
    assert_eq!(api.calls_starting_with("point:"), 1, "zero coverage is center only");
}

#[tokio::test]
async fn search_all_covers_every_pair_and_reports_failures() {
    let api = ScriptedApi::default()
        .text("gym in Omagh", page(&["o1"], None))
        .text("cafe in Omagh", None)
        .text("gym in Newry", page(&["n1", "o1"], None))
        .text("cafe in Newry", page(&["n2"], None));
    let table = KeywordSynonyms::default();
    let finder = LeadFinder::new(
        &api,
        &table,
        ExpansionSettings {
            results_threshold: 0,
            ..settings()
        },
    );
    let mut processed = ProcessedIdSet::new();
    let industries = vec!["gym".to_owned(), "cafe".to_owned()];
    let locations = vec!["Omagh".to_owned(), "Newry".to_owned()];

    let report = finder
        .search_all(&industries, &locations, None, 1.5, &mut processed)
        .await;

    assert_eq!(report.searches.len(), 4);
    assert_eq!(report.searches[0].location, "Omagh");
    assert_eq!(report.searches[0].industry, "gym");
    assert_eq!(report.lead_count(), 3);
    assert_eq!(report.failures().count(), 1);
    let ids: Vec<_> = report.leads().map(|l| l.place_id.as_str()).collect();
    assert_eq!(ids, ["o1", "n1", "n2"]);
}

#[tokio::test]
async fn grid_search_never_returns_known_places() {
    let api = ScriptedApi::default().point_pages(
        "gym",
        vec![page(&["known", "x"], None), None, page(&["x", "y"], None)],
    );
    let mut processed: ProcessedIdSet = ["known"].into_iter().collect();
    let points = [
        OMAGH,
        GridPoint::new(54.61, -7.31),
        GridPoint::new(54.58, -7.31),
    ];

    let found = grid_search(
        &api,
        "gym",
        &points,
        1_500.0,
        &mut processed,
        &PaginationSettings::with_page_token_delay(Duration::ZERO),
    )
    .await;

    let ids: Vec<_> = found.iter().map(|p| p.place_id.as_str()).collect();
    assert_eq!(ids, ["x", "y"]);
    assert_eq!(processed.len(), 3);
    assert_eq!(api.calls_starting_with("point:"), 3, "failed point does not abort");
}
