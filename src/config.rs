//! Configuration module for HostPulse.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::time::Duration;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Path to the SQLite database file (default: "hostpulse.db")
    pub db_path: String,
    /// Path to the external ping executable (default: "ping")
    pub ping_path: String,
    /// Echo requests per probe when a host has no override (default: 5)
    pub probe_count: u32,
    /// Deadline for a single probe process (default: 30s)
    pub probe_timeout: Duration,
    /// Maximum number of ping processes running at once (default: 64)
    pub max_concurrent_probes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            db_path: "hostpulse.db".to_string(),
            ping_path: "ping".to_string(),
            probe_count: 5,
            probe_timeout: Duration::from_secs(30),
            max_concurrent_probes: 64,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `HOSTPULSE_DB_PATH`: database file path (default: "hostpulse.db")
    /// - `HOSTPULSE_PING_PATH`: ping executable (default: "ping")
    /// - `HOSTPULSE_PROBE_COUNT`: echo requests per probe (default: 5)
    /// - `HOSTPULSE_PROBE_TIMEOUT_SECS`: per-probe deadline (default: 30)
    /// - `HOSTPULSE_MAX_CONCURRENT_PROBES`: process cap (default: 64)
    pub fn load() -> Self {
        let mut cfg = Self::default();

        if let Ok(db_path) = env::var("HOSTPULSE_DB_PATH") {
            cfg.db_path = db_path;
        }

        if let Ok(ping_path) = env::var("HOSTPULSE_PING_PATH") {
            cfg.ping_path = ping_path;
        }

        if let Ok(count_str) = env::var("HOSTPULSE_PROBE_COUNT") {
            if let Ok(count) = count_str.parse() {
                cfg.probe_count = count;
            }
        }

        if let Ok(secs_str) = env::var("HOSTPULSE_PROBE_TIMEOUT_SECS") {
            if let Ok(secs) = secs_str.parse() {
                cfg.probe_timeout = Duration::from_secs(secs);
            }
        }

        if let Ok(cap_str) = env::var("HOSTPULSE_MAX_CONCURRENT_PROBES") {
            if let Ok(cap) = cap_str.parse::<usize>() {
                cfg.max_concurrent_probes = cap.max(1);
            }
        }

        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.db_path, "hostpulse.db");
        assert_eq!(cfg.ping_path, "ping");
        assert_eq!(cfg.probe_count, 5);
        assert_eq!(cfg.probe_timeout, Duration::from_secs(30));
        assert_eq!(cfg.max_concurrent_probes, 64);
    }
}
