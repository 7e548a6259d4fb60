use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

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
/// Unlike [`load_app_config`], this does NOT load `.env` files. Useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so tests can drive it with a plain `HashMap` lookup instead of process env vars.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_i32 = |var: &str, default: &str| -> Result<i32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<i32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let at_least_one = |var: &str, value: usize| -> Result<usize, ConfigError> {
        if value == 0 {
            return Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("WAYWARD_ENV", "development"));

    let bind_addr = parse_addr("WAYWARD_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("WAYWARD_LOG_LEVEL", "info");

    let tracking_interval_secs = parse_u64("WAYWARD_TRACKING_INTERVAL_SECS", "300")?;
    if tracking_interval_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "WAYWARD_TRACKING_INTERVAL_SECS".to_string(),
            reason: "must be at least 1 second".to_string(),
        });
    }

    let tracker_max_concurrent_users = at_least_one(
        "WAYWARD_TRACKER_MAX_CONCURRENT_USERS",
        parse_usize("WAYWARD_TRACKER_MAX_CONCURRENT_USERS", "8")?,
    )?;
    let rewards_max_concurrent = at_least_one(
        "WAYWARD_REWARDS_MAX_CONCURRENT",
        parse_usize("WAYWARD_REWARDS_MAX_CONCURRENT", "16")?,
    )?;

    let proximity_buffer_miles = parse_i32("WAYWARD_PROXIMITY_BUFFER_MILES", "10")?;
    if proximity_buffer_miles < 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "WAYWARD_PROXIMITY_BUFFER_MILES".to_string(),
            reason: "must not be negative".to_string(),
        });
    }

    let gps_base_url = lookup("WAYWARD_GPS_BASE_URL").ok();
    let gps_request_timeout_secs = parse_u64("WAYWARD_GPS_REQUEST_TIMEOUT_SECS", "10")?;
    let gps_max_retries = parse_u32("WAYWARD_GPS_MAX_RETRIES", "3")?;
    let gps_retry_backoff_base_ms = parse_u64("WAYWARD_GPS_RETRY_BACKOFF_BASE_MS", "250")?;

    let internal_user_count = parse_usize("WAYWARD_INTERNAL_USER_COUNT", "100")?;

    // The stand-in key is fine everywhere except production traffic.
    let trip_pricer_api_key = if env == Environment::Production {
        lookup("WAYWARD_TRIP_PRICER_API_KEY")
            .map_err(|_| ConfigError::MissingEnvVar("WAYWARD_TRIP_PRICER_API_KEY".to_string()))?
    } else {
        or_default("WAYWARD_TRIP_PRICER_API_KEY", "test-server-api-key")
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        tracking_interval_secs,
        tracker_max_concurrent_users,
        rewards_max_concurrent,
        proximity_buffer_miles,
        gps_base_url,
        gps_request_timeout_secs,
        gps_max_retries,
        gps_retry_backoff_base_ms,
        internal_user_count,
        trip_pricer_api_key,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
