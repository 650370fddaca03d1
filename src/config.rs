//! Swipe configuration
//!
//! Each element can tune the recognizer through three attributes:
//! - `data-swipe-threshold`: minimum travel along the dominant axis (default 20)
//! - `data-swipe-timeout`: maximum contact duration in milliseconds (default 500)
//! - `data-swipe-ignore="true"`: never start a session on this element
//!
//! Recognizer-wide defaults come from the `[gestures]` table of the settings file.

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::carousel::CarouselConfig;
use crate::error::{ConfigError, Result};

pub const THRESHOLD_ATTRIBUTE: &str = "data-swipe-threshold";
pub const TIMEOUT_ATTRIBUTE: &str = "data-swipe-timeout";
pub const IGNORE_ATTRIBUTE: &str = "data-swipe-ignore";

fn default_threshold() -> f64 { 20.0 }
fn default_timeout() -> Duration { Duration::from_millis(500) }

/// Configuration for swipe recognition, resolved once per session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeConfig {
    /// Distance the contact must travel along the dominant axis
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    /// Contacts held this long or longer never produce a swipe
    #[serde(default = "default_timeout", rename = "timeout_ms", with = "millis")]
    pub timeout: Duration,

    /// Per-element only; never read from the settings file
    #[serde(skip)]
    pub ignore: bool,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
            timeout: default_timeout(),
            ignore: false,
        }
    }
}

impl SwipeConfig {
    /// Resolve the configuration of one element on top of `base`.
    ///
    /// Malformed numbers are logged and replaced by the base value.
    pub fn from_attributes<F>(base: &SwipeConfig, lookup: F) -> SwipeConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let threshold = match parse_attribute::<u32>(THRESHOLD_ATTRIBUTE, lookup(THRESHOLD_ATTRIBUTE)) {
            Ok(value) => value.map(f64::from).unwrap_or(base.threshold),
            Err(e) => {
                tracing::warn!("{}, using {}", e, base.threshold);
                base.threshold
            }
        };

        let timeout = match parse_attribute::<u64>(TIMEOUT_ATTRIBUTE, lookup(TIMEOUT_ATTRIBUTE)) {
            Ok(value) => value.map(Duration::from_millis).unwrap_or(base.timeout),
            Err(e) => {
                tracing::warn!("{}, using {}ms", e, base.timeout.as_millis());
                base.timeout
            }
        };

        SwipeConfig {
            threshold,
            timeout,
            ignore: is_ignored(&lookup),
        }
    }

    /// Reject thresholds no contact can sensibly be compared against
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !self.threshold.is_finite() || self.threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.threshold.to_string()));
        }
        Ok(())
    }

    /// Strict variant of [`SwipeConfig::from_attributes`] that rejects malformed numbers
    pub fn try_from_attributes<F>(base: &SwipeConfig, lookup: F) -> std::result::Result<SwipeConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let threshold = parse_attribute::<u32>(THRESHOLD_ATTRIBUTE, lookup(THRESHOLD_ATTRIBUTE))?;
        let timeout = parse_attribute::<u64>(TIMEOUT_ATTRIBUTE, lookup(TIMEOUT_ATTRIBUTE))?;

        Ok(SwipeConfig {
            threshold: threshold.map(f64::from).unwrap_or(base.threshold),
            timeout: timeout.map(Duration::from_millis).unwrap_or(base.timeout),
            ignore: is_ignored(&lookup),
        })
    }
}

/// Only the exact string "true" sets the flag
pub fn is_ignored<F>(lookup: &F) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(IGNORE_ATTRIBUTE).as_deref() == Some("true")
}

/// Absent and empty attributes both mean "use the base value"
fn parse_attribute<N: FromStr>(
    attribute: &'static str,
    raw: Option<String>,
) -> std::result::Result<Option<N>, ConfigError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<N>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidNumber {
            attribute,
            value: raw.clone(),
        })
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

/// Contents of the settings file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub gestures: SwipeConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
}

impl Settings {
    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let settings = Self::from_toml(&contents)?;
        tracing::info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(contents)?;
        settings.gestures.validate()?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::collections::HashMap;

    fn attrs(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults_without_attributes() {
        let config = SwipeConfig::from_attributes(&SwipeConfig::default(), attrs(&[]));
        assert_eq!(config.threshold, 20.0);
        assert_eq!(config.timeout, Duration::from_millis(500));
        assert!(!config.ignore);
    }

    #[test]
    fn test_attributes_override_base() {
        let config = SwipeConfig::from_attributes(
            &SwipeConfig::default(),
            attrs(&[(THRESHOLD_ATTRIBUTE, "45"), (TIMEOUT_ATTRIBUTE, " 1200 ")]),
        );
        assert_eq!(config.threshold, 45.0);
        assert_eq!(config.timeout, Duration::from_millis(1200));
    }

    #[test]
    fn test_malformed_falls_back_to_base() {
        let base = SwipeConfig {
            threshold: 30.0,
            ..SwipeConfig::default()
        };
        let config = SwipeConfig::from_attributes(
            &base,
            attrs(&[(THRESHOLD_ATTRIBUTE, "wide"), (TIMEOUT_ATTRIBUTE, "")]),
        );
        assert_eq!(config.threshold, 30.0);
        assert_eq!(config.timeout, base.timeout);
    }

    #[test]
    fn test_strict_rejects_malformed() {
        let err = SwipeConfig::try_from_attributes(
            &SwipeConfig::default(),
            attrs(&[(TIMEOUT_ATTRIBUTE, "20px")]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidNumber {
                attribute: TIMEOUT_ATTRIBUTE,
                value: "20px".to_string(),
            }
        );
    }

    #[test]
    fn test_ignore_requires_exact_true() {
        assert!(is_ignored(&attrs(&[(IGNORE_ATTRIBUTE, "true")])));
        assert!(!is_ignored(&attrs(&[(IGNORE_ATTRIBUTE, "TRUE")])));
        assert!(!is_ignored(&attrs(&[(IGNORE_ATTRIBUTE, "1")])));
    }

    #[test]
    fn test_settings_from_toml() {
        let settings = Settings::from_toml(
            r#"
            [gestures]
            threshold = 35.0
            timeout_ms = 800

            [carousel]
            max_clip_id = 12
            "#,
        )
        .unwrap();
        assert_eq!(settings.gestures.threshold, 35.0);
        assert_eq!(settings.gestures.timeout, Duration::from_millis(800));
        assert_eq!(settings.carousel.max_clip_id, 12);
        assert_eq!(settings.carousel.source_url, CarouselConfig::default().source_url);
    }

    #[test]
    fn test_settings_reject_bad_threshold() {
        for bad in ["-5.0", "nan", "inf"] {
            let result = Settings::from_toml(&format!("[gestures]\nthreshold = {}", bad));
            assert!(
                matches!(result, Err(Error::Config(ConfigError::InvalidThreshold(_)))),
                "threshold = {} was accepted",
                bad
            );
        }
        assert!(Settings::from_toml("[gestures]\nthreshold = 0.0").is_ok());
    }

    #[test]
    fn test_empty_settings_are_default() {
        let settings = Settings::from_toml("").unwrap();
        assert_eq!(settings.gestures, SwipeConfig::default());
    }
}
