// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact form service.
//!
//! Values are read from the process environment (optionally seeded from a
//! `.env` file). Delivery credentials are optional at start-up: without
//! them the service still answers, but every submission fails with a server
//! configuration error until they are provided.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Longest accepted rate limit window (one year).
pub const MAX_WINDOW_SECS: u64 = 365 * 24 * 60 * 60;

/// Configuration for the contact form service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Deployment environment, `production` hides diagnostics (default: development)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Email delivery configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Per-client submission limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Submissions accepted per client within one window (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in seconds (default: 3600)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

/// Transactional email provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// Provider API key (`RESEND_API_KEY`)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Sender address (`CONTACT_FROM_EMAIL`)
    #[serde(default)]
    pub from_email: Option<String>,

    /// Recipient address (`CONTACT_TO_EMAIL`)
    #[serde(default)]
    pub to_email: Option<String>,

    /// Sender display name (default: CHKware Contact Form)
    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Provider API base URL (default: https://api.resend.com)
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Request timeout for the provider call in seconds (default: 10)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// Fully resolved delivery settings, only available when every required
/// variable is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliverySettings {
    pub api_key: String,
    pub from: String,
    pub to: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_max_requests() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    3600
}

fn default_from_name() -> String {
    "CHKware Contact Form".to_string()
}

fn default_api_base() -> String {
    "https://api.resend.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            environment: default_environment(),
            rate_limit: RateLimitConfig::default(),
            mail: MailConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_secs: default_window_secs(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            from_email: None,
            to_email: None,
            from_name: default_from_name(),
            api_base: default_api_base(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Unparsable numeric values fall back to their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or(defaults.bind_addr),
            environment: non_empty("NODE_ENV").unwrap_or(defaults.environment),
            rate_limit: RateLimitConfig {
                max_requests: non_empty("CONTACT_RATE_LIMIT_REQUESTS")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(defaults.rate_limit.max_requests),
                window_secs: non_empty("CONTACT_RATE_LIMIT_WINDOW")
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .map(|secs| secs.min(MAX_WINDOW_SECS))
                    .unwrap_or(defaults.rate_limit.window_secs),
            },
            mail: MailConfig {
                api_key: non_empty("RESEND_API_KEY"),
                from_email: non_empty("CONTACT_FROM_EMAIL"),
                to_email: non_empty("CONTACT_TO_EMAIL"),
                from_name: non_empty("CONTACT_FROM_NAME").unwrap_or(defaults.mail.from_name),
                api_base: non_empty("RESEND_API_BASE").unwrap_or(defaults.mail.api_base),
                timeout_secs: non_empty("RESEND_TIMEOUT_SECS")
                    .and_then(|v| v.trim().parse().ok())
                    .unwrap_or(defaults.mail.timeout_secs),
            },
            metrics: MetricsConfig {
                enabled: non_empty("METRICS_ENABLED")
                    .map(|v| {
                        !matches!(
                            v.trim().to_lowercase().as_str(),
                            "0" | "false" | "no" | "off"
                        )
                    })
                    .unwrap_or(defaults.metrics.enabled),
                ..defaults.metrics
            },
        }
    }

    /// Whether diagnostic details may be included in responses.
    pub fn expose_diagnostics(&self) -> bool {
        !self.environment.eq_ignore_ascii_case("production")
    }
}

impl RateLimitConfig {
    /// Get the rate window duration, capped at [`MAX_WINDOW_SECS`]
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs.min(MAX_WINDOW_SECS))
    }
}

impl MailConfig {
    /// Names of the required variables that are not set.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.api_key.is_none() {
            missing.push("RESEND_API_KEY");
        }
        if self.from_email.is_none() {
            missing.push("CONTACT_FROM_EMAIL");
        }
        if self.to_email.is_none() {
            missing.push("CONTACT_TO_EMAIL");
        }
        missing
    }

    /// Resolve the delivery settings, or `None` if anything required is missing.
    pub fn delivery(&self) -> Option<DeliverySettings> {
        match (&self.api_key, &self.from_email, &self.to_email) {
            (Some(api_key), Some(from_email), Some(to_email)) => Some(DeliverySettings {
                api_key: api_key.clone(),
                from: format!("{} <{}>", self.from_name, from_email),
                to: to_email.clone(),
            }),
            _ => None,
        }
    }

    /// Get the provider request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
