//! Site behavior configuration.
//!
//! # Responsibility
//! - Hold the fixed paths, storage key, delays and thresholds used by the
//!   site components.
//! - Allow hosts to override them from a JSON document.
//!
//! # Invariants
//! - Defaults reproduce the production site behavior.
//! - Thresholds are within `(0, 1]`; delays and windows are non-negative.

use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const DEFAULT_SPECIALS_PATH: &str = "/data/specials.json";
pub const DEFAULT_WORKER_SCRIPT: &str = "/sw.js";
pub const DEFAULT_DISMISSAL_KEY: &str = "pwaDismissedTime";
const ONE_HOUR_MS: i64 = 60 * 60 * 1000;

/// Runtime configuration shared by all components.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Relative path of the specials catalog.
    pub specials_path: String,
    /// Root path of the background worker script.
    pub worker_script: String,
    /// Local storage key for the banner dismissal timestamp.
    pub dismissal_key: String,
    /// Delay between page load and the banner eligibility check.
    pub banner_delay_ms: u64,
    /// Minimum age of a dismissal before the banner may show again.
    pub dismissal_window_ms: i64,
    pub content_threshold: f64,
    pub content_bottom_margin_px: f64,
    pub heritage_threshold: f64,
    /// Minimum spacing between processed scroll samples.
    pub scroll_sample_interval_ms: f64,
    pub contact_send_delay_ms: u64,
    pub contact_reset_delay_ms: u64,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            specials_path: DEFAULT_SPECIALS_PATH.to_string(),
            worker_script: DEFAULT_WORKER_SCRIPT.to_string(),
            dismissal_key: DEFAULT_DISMISSAL_KEY.to_string(),
            banner_delay_ms: 4_000,
            dismissal_window_ms: ONE_HOUR_MS,
            content_threshold: 0.1,
            content_bottom_margin_px: -50.0,
            heritage_threshold: 0.25,
            scroll_sample_interval_ms: 100.0,
            contact_send_delay_ms: 1_500,
            contact_reset_delay_ms: 3_000,
        }
    }
}

impl SiteConfig {
    /// Parses a JSON override document; missing fields keep their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("content_threshold", self.content_threshold),
            ("heritage_threshold", self.heritage_threshold),
        ] {
            if value.is_nan() || value <= 0.0 || value > 1.0 {
                return Err(ConfigError::OutOfRange {
                    field,
                    value: value.to_string(),
                });
            }
        }
        if self.dismissal_window_ms < 0 {
            return Err(ConfigError::OutOfRange {
                field: "dismissal_window_ms",
                value: self.dismissal_window_ms.to_string(),
            });
        }
        if self.scroll_sample_interval_ms.is_nan() || self.scroll_sample_interval_ms < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "scroll_sample_interval_ms",
                value: self.scroll_sample_interval_ms.to_string(),
            });
        }
        for (field, value) in [
            ("specials_path", &self.specials_path),
            ("worker_script", &self.worker_script),
            ("dismissal_key", &self.dismissal_key),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(field));
            }
        }
        Ok(())
    }

    pub fn banner_delay(&self) -> Duration {
        Duration::from_millis(self.banner_delay_ms)
    }

    pub fn contact_send_delay(&self) -> Duration {
        Duration::from_millis(self.contact_send_delay_ms)
    }

    pub fn contact_reset_delay(&self) -> Duration {
        Duration::from_millis(self.contact_reset_delay_ms)
    }
}

/// Configuration load/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    OutOfRange { field: &'static str, value: String },
    Empty(&'static str),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "invalid site config: {err}"),
            Self::OutOfRange { field, value } => {
                write!(f, "site config `{field}` is out of range: {value}")
            }
            Self::Empty(field) => write!(f, "site config `{field}` must not be empty"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}
