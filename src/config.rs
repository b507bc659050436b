//! Service configuration.

use serde::{Deserialize, Serialize};

use crate::breakpoint::BreakpointTable;
use crate::error::{ConfigError, MediaResult};

/// Environment variable consulted by [`MockConfig::detect`].
pub const TESTING_ENV_VAR: &str = "VIEWPORT_MEDIA_TESTING";

/// Breakpoint reported while mocking when nothing else has been recorded.
pub const DEFAULT_MOCKED_BREAKPOINT: &str = "desktop";

/// Mock mode settings.
///
/// Mocking is active only when both `testing` and `mocked` are set. While
/// active, registrations are inert and `matches` falls back to `breakpoint`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// The host is running under test.
    pub testing: bool,
    /// Mocking is switched on (only meaningful while `testing`).
    pub mocked: bool,
    /// Synthetic breakpoint reported while mocking.
    pub breakpoint: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            testing: false,
            mocked: true,
            breakpoint: DEFAULT_MOCKED_BREAKPOINT.to_string(),
        }
    }
}

impl MockConfig {
    /// Defaults with `testing` taken from `VIEWPORT_MEDIA_TESTING`.
    ///
    /// Hosts that do not set the flag explicitly start from here (or from
    /// [`MediaConfig::detected`]).
    #[must_use]
    pub fn detect() -> Self {
        let testing = std::env::var(TESTING_ENV_VAR)
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        Self {
            testing,
            ..Self::default()
        }
    }

    /// A config with mocking active.
    #[must_use]
    pub fn active(breakpoint: impl Into<String>) -> Self {
        Self {
            testing: true,
            mocked: true,
            breakpoint: breakpoint.into(),
        }
    }

    /// Whether mock mode is in effect.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.testing && self.mocked
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

/// Everything a [`crate::MediaService`] is built from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Breakpoints registered at construction, in order.
    pub breakpoints: BreakpointTable,
    /// Mock mode settings.
    pub mock: MockConfig,
    /// Per-stream buffer capacity.
    pub stream_capacity: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            breakpoints: BreakpointTable::standard(),
            mock: MockConfig::default(),
            stream_capacity: 64,
        }
    }
}

impl MediaConfig {
    /// Config with the given table and defaults elsewhere.
    #[must_use]
    pub fn with_breakpoints(breakpoints: BreakpointTable) -> Self {
        Self {
            breakpoints,
            ..Self::default()
        }
    }

    /// Default config with the testing flag detected from the environment.
    #[must_use]
    pub fn detected() -> Self {
        Self {
            mock: MockConfig::detect(),
            ..Self::default()
        }
    }

    /// Parses a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> MediaResult<Self> {
        let cfg: Self = serde_json::from_str(json).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        Ok(cfg)
    }

    /// Converts an already-parsed JSON value.
    pub fn from_json_value(value: serde_json::Value) -> MediaResult<Self> {
        let cfg: Self = serde_json::from_value(value).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = MediaConfig::default();
        assert_eq!(cfg.breakpoints.len(), 4);
        assert!(!cfg.mock.is_active());
        assert_eq!(cfg.mock.breakpoint, "desktop");
        assert_eq!(cfg.stream_capacity, 64);
    }

    #[test]
    fn from_json_partial_document() {
        let cfg = MediaConfig::from_json_str(
            r#"{
                "breakpoints": {"narrow": "(max-width: 599px)", "wide": "(min-width: 600px)"},
                "mock": {"testing": true, "breakpoint": "wide"}
            }"#,
        )
        .unwrap();

        let names: Vec<&str> = cfg.breakpoints.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, vec!["narrow", "wide"]);
        assert!(cfg.mock.is_active());
        assert_eq!(cfg.mock.breakpoint, "wide");
        assert_eq!(cfg.stream_capacity, 64);
    }

    #[test]
    fn from_json_rejects_duplicate_breakpoints() {
        let err = MediaConfig::from_json_str(
            r#"{"breakpoints": {"a": "(min-width: 1px)", "a": "(min-width: 2px)"}}"#,
        )
        .unwrap_err();
        assert!(err.is_config());
        assert!(format!("{err}").contains("more than once"));
    }

    #[test]
    fn from_json_value_roundtrips_through_serialize() {
        let cfg = MediaConfig::default();
        let value = serde_json::to_value(&cfg).unwrap();
        assert_eq!(MediaConfig::from_json_value(value).unwrap(), cfg);
    }

    #[test]
    fn mock_active_requires_both_flags() {
        let mut mock = MockConfig::active("tablet");
        assert!(mock.is_active());
        mock.mocked = false;
        assert!(!mock.is_active());
    }

    #[test]
    fn detect_reads_testing_flag_from_environment() {
        std::env::set_var(TESTING_ENV_VAR, "1");
        let cfg = MediaConfig::detected();
        assert!(cfg.mock.testing);
        assert!(cfg.mock.is_active());
        assert_eq!(cfg.mock.breakpoint, DEFAULT_MOCKED_BREAKPOINT);

        std::env::set_var(TESTING_ENV_VAR, "0");
        assert!(!MockConfig::detect().testing);

        std::env::remove_var(TESTING_ENV_VAR);
        assert!(!MockConfig::detect().is_active());
    }

    #[test]
    fn parse_flag_values() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(parse_flag("yes"));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
