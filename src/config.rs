//! Configuration management via environment variables
//!
//! Loads configuration from environment variables with .env file support.
//! Follows 12-factor app principles for cloud-native deployments.

use std::env;
use std::time::Duration;

use crate::error::{GateError, Result};

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub static_files: StaticConfig,
    pub detection: DetectionConfig,
}

/// Server binding configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Static UI serving configuration
#[derive(Debug, Clone)]
pub struct StaticConfig {
    pub dir: String,
}

/// Detection engine settings
#[derive(Debug, Clone)]
pub struct DetectionConfig {
    /// Deadline between the document fetch and the analysis call
    pub visit_deadline: Duration,
    /// Horizon after which idle sessions are evicted
    pub session_ttl: Duration,
    /// Horizon after which unredeemed challenges are treated as absent
    pub challenge_ttl: Duration,
    /// Cap on JSON request bodies
    pub max_body_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Reads .env file if present, then parses environment variables.
    /// Returns error if variables are present but invalid.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            server: ServerConfig::from_env()?,
            static_files: StaticConfig::from_env()?,
            detection: DetectionConfig::from_env()?,
        })
    }
}

impl ServerConfig {
    fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let port = env::var("PORT")
            .unwrap_or_else(|_| "4173".to_string())
            .parse::<u16>()
            .map_err(|e| GateError::Config(format!("Invalid PORT: {}", e)))?;

        Ok(Self { host, port })
    }
}

impl StaticConfig {
    fn from_env() -> Result<Self> {
        let dir = env::var("STATIC_DIR").unwrap_or_else(|_| "./dist".to_string());

        Ok(Self { dir })
    }
}

impl DetectionConfig {
    fn from_env() -> Result<Self> {
        let visit_deadline_ms = env::var("VISIT_DEADLINE_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u64>()
            .map_err(|e| GateError::Config(format!("Invalid VISIT_DEADLINE_MS: {}", e)))?;

        if visit_deadline_ms == 0 {
            return Err(GateError::Config(
                "VISIT_DEADLINE_MS must be greater than 0".to_string(),
            ));
        }

        let session_ttl_secs = env::var("SESSION_TTL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .map_err(|e| GateError::Config(format!("Invalid SESSION_TTL_SECS: {}", e)))?;

        let challenge_ttl_secs = env::var("CHALLENGE_TTL_SECS")
            .unwrap_or_else(|_| "60".to_string())
            .parse::<u64>()
            .map_err(|e| GateError::Config(format!("Invalid CHALLENGE_TTL_SECS: {}", e)))?;

        let max_body_bytes = env::var("MAX_BODY_BYTES")
            .unwrap_or_else(|_| "1048576".to_string())
            .parse::<usize>()
            .map_err(|e| GateError::Config(format!("Invalid MAX_BODY_BYTES: {}", e)))?;

        Ok(Self {
            visit_deadline: Duration::from_millis(visit_deadline_ms),
            session_ttl: Duration::from_secs(session_ttl_secs),
            challenge_ttl: Duration::from_secs(challenge_ttl_secs),
            max_body_bytes,
        })
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            visit_deadline: Duration::from_millis(5000),
            session_ttl: Duration::from_secs(60),
            challenge_ttl: Duration::from_secs(60),
            max_body_bytes: 1024 * 1024,
        }
    }
}
