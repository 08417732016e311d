//! Configuration module

use std::env;
use std::str::FromStr;

use crate::logic::features::DEFAULT_IDLE_THRESHOLD_US;
use crate::logic::model::DEFAULT_PREDICTION_THRESHOLD;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Path to the ONNX classifier
    pub model_path: String,

    /// Gap (µs) above which an IAT counts as idle
    pub idle_threshold_us: f64,

    /// Attack-probability decision threshold
    pub prediction_threshold: f64,

    /// Include probabilities and features in responses
    pub debug_mode: bool,

    /// Max request body size in bytes
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_path: "models/model.onnx".to_string(),
            idle_threshold_us: DEFAULT_IDLE_THRESHOLD_US,
            prediction_threshold: DEFAULT_PREDICTION_THRESHOLD,
            debug_mode: false,
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let idle_threshold_us = parse_or(&lookup, "IDLE_THRESHOLD", defaults.idle_threshold_us);
        let idle_threshold_us = if idle_threshold_us.is_finite() && idle_threshold_us >= 0.0 {
            idle_threshold_us
        } else {
            tracing::warn!("IDLE_THRESHOLD must be a non-negative number, using default");
            defaults.idle_threshold_us
        };

        Self {
            host: lookup("HOST").unwrap_or(defaults.host),

            port: parse_or(&lookup, "PORT", defaults.port),

            model_path: lookup("MODEL_PATH").unwrap_or(defaults.model_path),

            idle_threshold_us,

            prediction_threshold: parse_or(
                &lookup,
                "PREDICTION_THRESHOLD",
                defaults.prediction_threshold,
            ),

            debug_mode: lookup("DEBUG_MODE")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.debug_mode),

            max_body_bytes: parse_or(&lookup, "MAX_BODY_BYTES", defaults.max_body_bytes),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid value for {}: {:?}, using default", key, raw);
            default
        }),
        None => default,
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
