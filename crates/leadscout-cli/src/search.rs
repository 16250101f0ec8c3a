//! `search` command: run the lead finder over industries × locations and
//! export the resulting leads.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use leadscout_core::{load_taxonomy, AppConfig, Taxonomy};
use leadscout_places::{
    export_leads, AppendPolicy, ExpansionSettings, JsonlSink, LeadFinder, PaginationSettings,
    PlacesClient, ProcessedIdSet, RetryPolicy,
};

#[derive(Debug)]
pub(crate) struct SearchArgs {
    pub(crate) category: Option<String>,
    pub(crate) industries: Vec<String>,
    pub(crate) locations: Vec<String>,
    pub(crate) all_locations: bool,
    pub(crate) cell_radius_km: Option<f64>,
    pub(crate) assigned_to: Option<String>,
    pub(crate) output: Option<PathBuf>,
    pub(crate) dry_run: bool,
}

pub(crate) fn build_places_client(config: &AppConfig) -> anyhow::Result<PlacesClient> {
    let retry = RetryPolicy {
        max_attempts: config.max_attempts,
        initial_backoff: Duration::from_millis(config.initial_backoff_ms),
        max_backoff: Duration::from_millis(config.max_backoff_ms),
        ..RetryPolicy::default()
    };
    PlacesClient::new(
        &config.google_api_key,
        config.request_timeout_secs,
        &config.user_agent,
        retry,
    )
    .context("failed to build places API client")
}

pub(crate) fn expansion_settings(config: &AppConfig) -> ExpansionSettings {
    ExpansionSettings {
        results_threshold: config.results_threshold,
        coverage_radius_m: config.coverage_radius_m,
        overlap_factor: config.overlap_factor,
        pagination: PaginationSettings::with_page_token_delay(Duration::from_millis(
            config.page_token_delay_ms,
        )),
    }
}

fn append_policy(config: &AppConfig) -> AppendPolicy {
    AppendPolicy {
        attempts: config.sheet_append_retries,
        retry_delay: Duration::from_millis(config.sheet_retry_delay_ms),
        row_delay: Duration::from_millis(config.sheet_row_delay_ms),
    }
}

/// Explicit `--industry` values win; otherwise the category's industries.
fn resolve_industries(
    taxonomy: &Taxonomy,
    category: Option<&str>,
    industries: Vec<String>,
) -> anyhow::Result<Vec<String>> {
    if !industries.is_empty() {
        return Ok(industries);
    }
    let Some(category) = category else {
        anyhow::bail!("pass --industry or --category to choose what to search for");
    };
    taxonomy
        .industries_in(category)
        .map(<[String]>::to_vec)
        .ok_or_else(|| anyhow::anyhow!("unknown category '{category}'; see `leadscout taxonomy`"))
}

fn resolve_locations(
    taxonomy: &Taxonomy,
    locations: Vec<String>,
    all_locations: bool,
) -> anyhow::Result<Vec<String>> {
    if all_locations {
        return Ok(taxonomy.locations.clone());
    }
    if locations.is_empty() {
        anyhow::bail!("pass --location (repeatable) or --all-locations");
    }
    for location in &locations {
        if !taxonomy
            .locations
            .iter()
            .any(|known| known.eq_ignore_ascii_case(location))
        {
            tracing::warn!(location = %location, "location is not in the taxonomy; searching anyway");
        }
    }
    Ok(locations)
}

/// Run the lead search and write leads as JSON lines.
///
/// Per-keyword failures are logged and summarised; they never abort the run.
///
/// # Errors
///
/// Returns an error if the taxonomy cannot be loaded, the arguments do not
/// select any industries or locations, the cell radius is not positive, the
/// client cannot be built, or the output file cannot be created.
pub(crate) async fn run_search(config: &AppConfig, args: SearchArgs) -> anyhow::Result<()> {
    let taxonomy = load_taxonomy(&config.taxonomy_path).with_context(|| {
        format!(
            "failed to load taxonomy from {}",
            config.taxonomy_path.display()
        )
    })?;
    let industries = resolve_industries(&taxonomy, args.category.as_deref(), args.industries)?;
    let locations = resolve_locations(&taxonomy, args.locations, args.all_locations)?;

    let cell_radius_km = args.cell_radius_km.unwrap_or(config.cell_radius_km);
    if !(cell_radius_km.is_finite() && cell_radius_km > 0.0) {
        anyhow::bail!("--cell-radius-km must be a positive number, got {cell_radius_km}");
    }

    if args.dry_run {
        println!(
            "dry-run: would search {} industries in {} locations ({} pairs, cell radius {cell_radius_km} km)",
            industries.len(),
            locations.len(),
            industries.len() * locations.len(),
        );
        for industry in &industries {
            println!(
                "  {industry}: {}",
                taxonomy.synonyms.expand(industry).join(", ")
            );
        }
        return Ok(());
    }

    let client = build_places_client(config)?;
    let finder = LeadFinder::new(&client, &taxonomy.synonyms, expansion_settings(config));
    let mut processed = ProcessedIdSet::new();

    let report = finder
        .search_all(
            &industries,
            &locations,
            taxonomy.region.as_deref(),
            cell_radius_km,
            &mut processed,
        )
        .await;

    let failures: Vec<String> = report
        .failures()
        .map(|f| format!("{} in {}: {}", f.keyword, f.location, f.reason))
        .collect();
    let leads = report.into_leads();
    if leads.is_empty() {
        println!("no businesses found; try another location or industry");
        for failure in &failures {
            eprintln!("  failed: {failure}");
        }
        return Ok(());
    }

    let policy = append_policy(config);
    let assigned_to = args.assigned_to.as_deref();
    let summary = if let Some(path) = &args.output {
        let file = File::create(path)
            .with_context(|| format!("failed to create output file {}", path.display()))?;
        let mut sink = JsonlSink::new(BufWriter::new(file));
        export_leads(&mut sink, &leads, assigned_to, &policy).await
    } else {
        let mut sink = JsonlSink::new(std::io::stdout());
        export_leads(&mut sink, &leads, assigned_to, &policy).await
    };

    eprintln!(
        "search complete: {} leads exported, {} failed to append, {} keyword failures",
        summary.appended,
        summary.failed,
        failures.len()
    );
    for failure in &failures {
        eprintln!("  failed: {failure}");
    }
    Ok(())
}
