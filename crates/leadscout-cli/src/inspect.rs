//! Read-only `grid` and `taxonomy` commands.

use std::path::Path;

use anyhow::Context;
use leadscout_core::{load_taxonomy, AppConfig};
use leadscout_places::{generate_grid, GridConfig, GridPoint, PlacesApi};

use crate::search::{build_places_client, expansion_settings};

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GridCenter {
    Location(String),
    Point(f64, f64),
}

/// Print one `lat,lng` line per grid point, center first.
///
/// # Errors
///
/// Returns an error if the location cannot be geocoded or the client cannot
/// be built.
pub(crate) async fn run_grid(
    config: &AppConfig,
    center: GridCenter,
    cell_radius_km: Option<f64>,
    coverage_m: Option<f64>,
) -> anyhow::Result<()> {
    let center = match center {
        GridCenter::Point(lat, lng) => GridPoint::new(lat, lng),
        GridCenter::Location(location) => {
            let client = build_places_client(config)?;
            client
                .geocode(&location)
                .await
                .with_context(|| format!("could not geocode '{location}'"))?
        }
    };

    let settings = expansion_settings(config);
    let grid_config = GridConfig {
        coverage_radius_m: coverage_m.unwrap_or(settings.coverage_radius_m),
        cell_radius_m: cell_radius_km.unwrap_or(config.cell_radius_km) * 1_000.0,
        overlap_factor: settings.overlap_factor,
    };
    let points = generate_grid(center, &grid_config);
    if points.is_empty() {
        anyhow::bail!("cell radius must be positive");
    }

    for point in &points {
        println!("{point}");
    }
    eprintln!(
        "{} points in {} rings (coverage {} m, cell {} m, step {} m)",
        points.len(),
        grid_config.ring_count(),
        grid_config.coverage_radius_m,
        grid_config.cell_radius_m,
        grid_config.step_distance_m()
    );
    Ok(())
}

/// Print the taxonomy, or one category of it.
///
/// # Errors
///
/// Returns an error if the file cannot be loaded or the category is unknown.
pub(crate) fn run_taxonomy(path: &Path, category: Option<&str>) -> anyhow::Result<()> {
    let taxonomy = load_taxonomy(path)
        .with_context(|| format!("failed to load taxonomy from {}", path.display()))?;

    let categories: Vec<(&str, &[String])> = match category {
        Some(wanted) => {
            let found = taxonomy
                .categories
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
                .with_context(|| format!("unknown category '{wanted}'"))?;
            vec![found]
        }
        None => taxonomy.categories.iter().collect(),
    };

    for (name, industries) in categories {
        println!("{name}");
        for industry in industries {
            let expanded = taxonomy.synonyms.expand(industry);
            if expanded.len() > 1 {
                println!("  {industry} (also: {})", expanded[1..].join(", "));
            } else {
                println!("  {industry}");
            }
        }
    }

    if category.is_none() {
        let region = taxonomy.region.as_deref().unwrap_or("no region");
        println!();
        println!("{} locations ({region}):", taxonomy.locations.len());
        println!("  {}", taxonomy.locations.join(", "));
    }
    Ok(())
}
