use std::env;
use std::time::Duration as StdDuration;

use chrono::Duration;

/// Runtime tuning for the tracking core, read once at startup.
///
/// Two distinct staleness signals: `offline_threshold` drives the coarse
/// Offline classification, `liveness_threshold` the fine-grained heartbeat
/// check served by the status endpoint.
#[derive(Debug, Clone)]
pub struct Config {
    pub offline_threshold: Duration,
    pub liveness_threshold: Duration,
    pub sweep_interval: StdDuration,
    pub fleet_file: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            offline_threshold: Duration::seconds(env_i64("OFFLINE_THRESHOLD_SECS", 60)),
            liveness_threshold: Duration::seconds(env_i64("LIVENESS_THRESHOLD_SECS", 30)),
            sweep_interval: StdDuration::from_secs(env_u64("SWEEP_INTERVAL_SECS", 5)),
            fleet_file: env::var("FLEET_FILE").ok(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key).ok().and_then(|value| value.parse::<i64>().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key).ok().and_then(|value| value.parse::<u64>().ok()).filter(|v| *v > 0).unwrap_or(default)
}
