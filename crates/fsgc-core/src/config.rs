//! Collector configuration types.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use derive_builder::Builder;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GcError;
use crate::policy::DEFAULT_POLICY_FILE;

/// Default TTL marker: `ttl=<days>` or `ttl=<hours>h` anywhere in a path.
pub const DEFAULT_MARKER: &str = r".*ttl=(?P<value>[0-9]+)(?P<suffix>h?).*";

const HOUR: Duration = Duration::from_secs(60 * 60);
const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Which part of a path the TTL marker is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchScope {
    /// The whole path, so ancestor directory names can carry a marker.
    #[default]
    FullPath,
    /// Only the final path component.
    BaseName,
}

/// Immutable configuration for a collection run.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct CollectorConfig {
    /// Marker pattern with `value` and `suffix` named capture groups.
    #[builder(default = "default_marker()")]
    pub marker: Regex,

    /// Base duration unit for each suffix the marker can capture.
    #[builder(default = "default_suffixes()")]
    pub suffixes: HashMap<String, Duration>,

    /// Part of the path the marker is matched against.
    #[builder(default)]
    pub match_scope: MatchScope,

    /// Reserved name of the per-directory policy file.
    #[builder(default = "DEFAULT_POLICY_FILE.to_string()")]
    pub policy_file: String,
}

fn default_marker() -> Regex {
    Regex::new(DEFAULT_MARKER).expect("default marker pattern is valid")
}

fn default_suffixes() -> HashMap<String, Duration> {
    HashMap::from([("h".to_string(), HOUR), (String::new(), DAY)])
}

impl CollectorConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref marker) = self.marker {
            let names: Vec<&str> = marker.capture_names().flatten().collect();
            for group in ["value", "suffix"] {
                if !names.contains(&group) {
                    return Err(format!(
                        "Marker pattern `{}` has no `{group}` capture group",
                        marker.as_str()
                    ));
                }
            }
        }
        if let Some(ref name) = self.policy_file {
            if name.is_empty() {
                return Err("Policy file name cannot be empty".to_string());
            }
            if name.contains(['/', '\\']) {
                return Err(format!("Policy file name `{name}` must not contain a path separator"));
            }
        }
        Ok(())
    }
}

impl From<CollectorConfigBuilderError> for GcError {
    fn from(err: CollectorConfigBuilderError) -> Self {
        GcError::config(err.to_string())
    }
}

impl CollectorConfig {
    /// Create a new config builder.
    pub fn builder() -> CollectorConfigBuilder {
        CollectorConfigBuilder::default()
    }

    /// Base unit for a captured suffix, if one is configured.
    pub fn suffix_unit(&self, suffix: &str) -> Option<Duration> {
        self.suffixes.get(suffix).copied()
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            marker: default_marker(),
            suffixes: default_suffixes(),
            match_scope: MatchScope::FullPath,
            policy_file: DEFAULT_POLICY_FILE.to_string(),
        }
    }
}

/// On-disk form of the collector configuration.
///
/// Suffix units are written as duration strings such as `"1h"` or `"7d"`.
///
/// ```toml
/// marker = '.*ttl=(?P<value>[0-9]+)(?P<suffix>[hd]?).*'
/// match_scope = "full_path"
/// policy_file = "fsgc.json"
///
/// [suffixes]
/// "" = "1d"
/// h = "1h"
/// d = "1d"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GcSettings {
    /// Marker pattern source.
    pub marker: String,
    /// Suffix to duration string.
    pub suffixes: BTreeMap<String, String>,
    /// Reserved policy file name.
    pub policy_file: String,
    /// Marker match scope.
    pub match_scope: MatchScope,
}

impl Default for GcSettings {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            suffixes: BTreeMap::from([
                ("h".to_string(), "1h".to_string()),
                (String::new(), "1d".to_string()),
            ]),
            policy_file: DEFAULT_POLICY_FILE.to_string(),
            match_scope: MatchScope::FullPath,
        }
    }
}

impl GcSettings {
    /// Validate the settings and turn them into a collector config.
    pub fn into_config(self) -> Result<CollectorConfig, GcError> {
        let marker = Regex::new(&self.marker)
            .map_err(|e| GcError::config(format!("Invalid marker pattern: {e}")))?;

        let suffixes = self
            .suffixes
            .iter()
            .map(|(suffix, unit)| parse_duration(unit).map(|d| (suffix.clone(), d)))
            .collect::<Result<HashMap<_, _>, _>>()?;

        let config = CollectorConfig::builder()
            .marker(marker)
            .suffixes(suffixes)
            .match_scope(self.match_scope)
            .policy_file(self.policy_file)
            .build()?;
        Ok(config)
    }
}

/// Parse a duration string (e.g., "90s", "30m", "1h", "7d", "2w").
pub fn parse_duration(s: &str) -> Result<Duration, GcError> {
    let s = s.trim().to_lowercase();

    let (num, multiplier) = if let Some(num) = s.strip_suffix('w') {
        (num, 7 * 24 * 60 * 60)
    } else if let Some(num) = s.strip_suffix('d') {
        (num, 24 * 60 * 60)
    } else if let Some(num) = s.strip_suffix('h') {
        (num, 60 * 60)
    } else if let Some(num) = s.strip_suffix('m') {
        (num, 60)
    } else if let Some(num) = s.strip_suffix('s') {
        (num, 1)
    } else {
        return Err(GcError::config(format!(
            "Duration `{s}` needs a unit (s, m, h, d or w)"
        )));
    };

    let num: u64 = num
        .trim()
        .parse()
        .map_err(|_| GcError::config(format!("Invalid duration `{s}`")))?;

    num.checked_mul(multiplier)
        .map(Duration::from_secs)
        .ok_or_else(|| GcError::config(format!("Duration `{s}` is too large")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CollectorConfig::default();
        assert_eq!(config.suffix_unit("h"), Some(HOUR));
        assert_eq!(config.suffix_unit(""), Some(DAY));
        assert_eq!(config.suffix_unit("d"), None);
        assert_eq!(config.match_scope, MatchScope::FullPath);
        assert_eq!(config.policy_file, "fsgc.json");
    }

    #[test]
    fn test_builder_defaults_match_default() {
        let built = CollectorConfig::builder().build().unwrap();
        let default = CollectorConfig::default();
        assert_eq!(built.marker.as_str(), default.marker.as_str());
        assert_eq!(built.suffixes, default.suffixes);
        assert_eq!(built.policy_file, default.policy_file);
    }

    #[test]
    fn test_builder_rejects_missing_groups() {
        let err = CollectorConfig::builder()
            .marker(Regex::new(r"ttl=(?P<value>\d+)").unwrap())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("suffix"));

        let err = CollectorConfig::builder()
            .marker(Regex::new(r"ttl=(\d+)(?P<suffix>h?)").unwrap())
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("value"));
    }

    #[test]
    fn test_builder_rejects_bad_policy_file() {
        assert!(CollectorConfig::builder().policy_file("").build().is_err());
        assert!(CollectorConfig::builder().policy_file("a/b.json").build().is_err());
        assert!(CollectorConfig::builder().policy_file(".gc.json").build().is_ok());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("90s").unwrap(), Duration::from_secs(90));
        assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_duration("1h").unwrap(), HOUR);
        assert_eq!(parse_duration(" 1D ").unwrap(), DAY);
        assert_eq!(parse_duration("2w").unwrap(), 14 * DAY);
        assert!(parse_duration("12").is_err());
        assert!(parse_duration("xh").is_err());
        assert!(parse_duration("-1h").is_err());
    }

    #[test]
    fn test_settings_into_config() {
        let mut settings = GcSettings::default();
        settings.suffixes.insert("d".to_string(), "1d".to_string());
        settings.match_scope = MatchScope::BaseName;

        let config = settings.into_config().unwrap();
        assert_eq!(config.suffix_unit("d"), Some(DAY));
        assert_eq!(config.match_scope, MatchScope::BaseName);
    }

    #[test]
    fn test_settings_invalid_marker() {
        let settings = GcSettings {
            marker: "ttl=(".to_string(),
            ..GcSettings::default()
        };
        assert!(matches!(
            settings.into_config(),
            Err(GcError::InvalidConfig { .. })
        ));
    }
}
