use crate::app_config::AppConfig;
use crate::ConfigError;

/// Shortest accepted wait before a continuation page token is sent.
pub const MIN_PAGE_TOKEN_DELAY_MS: u64 = 1_500;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_positive_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(invalid(var, format!("must be a positive number, got {value}")))
        }
    };

    let google_api_key = require("GOOGLE_API_KEY")?;
    let log_level = or_default("LEADSCOUT_LOG_LEVEL", "info");
    let taxonomy_path = PathBuf::from(or_default(
        "LEADSCOUT_TAXONOMY_PATH",
        "./config/taxonomy.yaml",
    ));

    let request_timeout_secs = parse_u64("LEADSCOUT_REQUEST_TIMEOUT_SECS", "15")?;
    let user_agent = or_default("LEADSCOUT_USER_AGENT", "leadscout/0.1 (lead-generation)");

    let max_attempts = parse_u32("LEADSCOUT_MAX_ATTEMPTS", "5")?;
    if max_attempts == 0 {
        return Err(invalid(
            "LEADSCOUT_MAX_ATTEMPTS",
            "at least one attempt is required".to_string(),
        ));
    }
    let initial_backoff_ms = parse_u64("LEADSCOUT_INITIAL_BACKOFF_MS", "1000")?;
    let max_backoff_ms = parse_u64("LEADSCOUT_MAX_BACKOFF_MS", "32000")?;
    if max_backoff_ms < initial_backoff_ms {
        return Err(invalid(
            "LEADSCOUT_MAX_BACKOFF_MS",
            format!("must be >= LEADSCOUT_INITIAL_BACKOFF_MS ({initial_backoff_ms})"),
        ));
    }
    let page_token_delay_ms = parse_u64("LEADSCOUT_PAGE_TOKEN_DELAY_MS", "2000")?;
    if page_token_delay_ms < MIN_PAGE_TOKEN_DELAY_MS {
        return Err(invalid(
            "LEADSCOUT_PAGE_TOKEN_DELAY_MS",
            format!("must be at least {MIN_PAGE_TOKEN_DELAY_MS} ms"),
        ));
    }

    let results_threshold = parse_usize("LEADSCOUT_RESULTS_THRESHOLD", "55")?;
    let coverage_radius_m = parse_positive_f64("LEADSCOUT_COVERAGE_RADIUS_M", "10000")?;
    let cell_radius_km = parse_positive_f64("LEADSCOUT_CELL_RADIUS_KM", "1.5")?;
    let overlap_factor = parse_positive_f64("LEADSCOUT_OVERLAP_FACTOR", "1.5")?;

    let sheet_append_retries = parse_u32("LEADSCOUT_SHEET_APPEND_RETRIES", "3")?;
    let sheet_retry_delay_ms = parse_u64("LEADSCOUT_SHEET_RETRY_DELAY_MS", "2000")?;
    let sheet_row_delay_ms = parse_u64("LEADSCOUT_SHEET_ROW_DELAY_MS", "1000")?;

    Ok(AppConfig {
        google_api_key,
        log_level,
        taxonomy_path,
        request_timeout_secs,
        user_agent,
        max_attempts,
        initial_backoff_ms,
        max_backoff_ms,
        page_token_delay_ms,
        results_threshold,
        coverage_radius_m,
        cell_radius_km,
        overlap_factor,
        sheet_append_retries,
        sheet_retry_delay_ms,
        sheet_row_delay_ms,
    })
}
