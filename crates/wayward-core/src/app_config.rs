use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub tracking_interval_secs: u64,
    pub tracker_max_concurrent_users: usize,
    pub rewards_max_concurrent: usize,
    pub proximity_buffer_miles: i32,
    pub gps_base_url: Option<String>,
    pub gps_request_timeout_secs: u64,
    pub gps_max_retries: u32,
    pub gps_retry_backoff_base_ms: u64,
    pub internal_user_count: usize,
    pub trip_pricer_api_key: String,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("tracking_interval_secs", &self.tracking_interval_secs)
            .field(
                "tracker_max_concurrent_users",
                &self.tracker_max_concurrent_users,
            )
            .field("rewards_max_concurrent", &self.rewards_max_concurrent)
            .field("proximity_buffer_miles", &self.proximity_buffer_miles)
            .field("gps_base_url", &self.gps_base_url)
            .field("gps_request_timeout_secs", &self.gps_request_timeout_secs)
            .field("gps_max_retries", &self.gps_max_retries)
            .field("gps_retry_backoff_base_ms", &self.gps_retry_backoff_base_ms)
            .field("internal_user_count", &self.internal_user_count)
            .field("trip_pricer_api_key", &"[redacted]")
            .finish()
    }
}
