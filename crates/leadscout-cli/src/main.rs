mod inspect;
mod search;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "leadscout")]
#[command(about = "Find business leads with grid-expanded places search")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search industries across locations and export the leads found
    Search {
        /// Use every industry in this taxonomy category
        #[arg(long)]
        category: Option<String>,

        /// Industry keyword to search for (repeatable; overrides --category)
        #[arg(long = "industry")]
        industries: Vec<String>,

        /// Location to search in (repeatable)
        #[arg(long = "location")]
        locations: Vec<String>,

        /// Search every location in the taxonomy
        #[arg(long, conflicts_with = "locations")]
        all_locations: bool,

        /// Grid cell radius in kilometres (defaults to `LEADSCOUT_CELL_RADIUS_KM`)
        #[arg(long)]
        cell_radius_km: Option<f64>,

        /// Team member the leads are assigned to
        #[arg(long)]
        assigned_to: Option<String>,

        /// Write leads as JSON lines to this file instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Show the planned searches without calling the places API
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the search grid around a location or coordinate
    Grid {
        /// Location to geocode for the grid center
        #[arg(long, required_unless_present = "lat", conflicts_with = "lat")]
        location: Option<String>,

        /// Center latitude
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Center longitude
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,

        /// Grid cell radius in kilometres
        #[arg(long)]
        cell_radius_km: Option<f64>,

        /// Radius of the area to cover, in metres
        #[arg(long)]
        coverage_m: Option<f64>,
    },
    /// Show categories, industries, synonyms, and locations
    Taxonomy {
        /// Taxonomy YAML file
        #[arg(
            long,
            env = "LEADSCOUT_TAXONOMY_PATH",
            default_value = "./config/taxonomy.yaml"
        )]
        path: PathBuf,

        /// Only show this category
        #[arg(long)]
        category: Option<String>,
    },
}

fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("leadscout ready; run `leadscout --help` for commands");
        return Ok(());
    };

    match command {
        Commands::Taxonomy { path, category } => {
            init_tracing("info")?;
            inspect::run_taxonomy(&path, category.as_deref())
        }
        Commands::Search {
            category,
            industries,
            locations,
            all_locations,
            cell_radius_km,
            assigned_to,
            output,
            dry_run,
        } => {
            let config = load_config()?;
            search::run_search(
                &config,
                search::SearchArgs {
                    category,
                    industries,
                    locations,
                    all_locations,
                    cell_radius_km,
                    assigned_to,
                    output,
                    dry_run,
                },
            )
            .await
        }
        Commands::Grid {
            location,
            lat,
            lng,
            cell_radius_km,
            coverage_m,
        } => {
            let config = load_config()?;
            let center = match (lat, lng) {
                (Some(lat), Some(lng)) => inspect::GridCenter::Point(lat, lng),
                _ => inspect::GridCenter::Location(location.unwrap_or_default()),
            };
            inspect::run_grid(&config, center, cell_radius_km, coverage_m).await
        }
    }
}

/// Loads env config and installs the subscriber at its log level.
fn load_config() -> anyhow::Result<leadscout_core::AppConfig> {
    let config = leadscout_core::load_app_config_from_env()?;
    init_tracing(&config.log_level)?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}
