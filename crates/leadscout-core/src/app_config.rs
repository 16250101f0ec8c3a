use std::path::PathBuf;

#[derive(Clone)]
pub struct AppConfig {
    pub google_api_key: String,
    pub log_level: String,
    pub taxonomy_path: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub page_token_delay_ms: u64,
    pub results_threshold: usize,
    pub coverage_radius_m: f64,
    pub cell_radius_km: f64,
    pub overlap_factor: f64,
    pub sheet_append_retries: u32,
    pub sheet_retry_delay_ms: u64,
    pub sheet_row_delay_ms: u64,
}

impl AppConfig {
    /// Cell radius converted to meters, the unit the grid generator works in.
    #[must_use]
    pub fn cell_radius_m(&self) -> f64 {
        self.cell_radius_km * 1_000.0
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("google_api_key", &"[redacted]")
            .field("log_level", &self.log_level)
            .field("taxonomy_path", &self.taxonomy_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_attempts", &self.max_attempts)
            .field("initial_backoff_ms", &self.initial_backoff_ms)
            .field("max_backoff_ms", &self.max_backoff_ms)
            .field("page_token_delay_ms", &self.page_token_delay_ms)
            .field("results_threshold", &self.results_threshold)
            .field("coverage_radius_m", &self.coverage_radius_m)
            .field("cell_radius_km", &self.cell_radius_km)
            .field("overlap_factor", &self.overlap_factor)
            .field("sheet_append_retries", &self.sheet_append_retries)
            .field("sheet_retry_delay_ms", &self.sheet_retry_delay_ms)
            .field("sheet_row_delay_ms", &self.sheet_row_delay_ms)
            .finish()
    }
}
