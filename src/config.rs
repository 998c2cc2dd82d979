//! Bridge configuration.
//!
//! [`BridgeConfig`] is loaded once per process lifetime by `init` and lives
//! inside the bridge state until `term`. Defaults can be overridden through
//! environment variables so a host can tune the bridge without recompiling.

use serde::{Deserialize, Serialize};

use crate::error::{JpcError, Result};

/// Environment variable holding the tracing filter directive.
pub const ENV_LOG: &str = "SARISSA_JPC_LOG";

/// Environment variable overriding the default `top_limit`.
pub const ENV_TOP_LIMIT: &str = "SARISSA_JPC_TOP_LIMIT";

/// Environment variable overriding the default session id.
pub const ENV_SESSION: &str = "SARISSA_JPC_SESSION";

/// Configuration for the bridge and the engine it owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Session used when an envelope carries no `id`.
    pub default_session: String,

    /// Number of hits returned when a search names no `top_limit`.
    pub default_top_limit: usize,

    /// Upper bound applied to any requested `top_limit`.
    pub max_top_limit: usize,

    /// Tracing filter directive installed by `init`.
    pub log_filter: String,

    /// K1 parameter for BM25 at the start of every process lifetime.
    pub default_k1: f32,

    /// B parameter for BM25 at the start of every process lifetime.
    pub default_b: f32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            default_session: "default".to_string(),
            default_top_limit: 10,
            max_top_limit: 10_000,
            log_filter: "warn".to_string(),
            default_k1: 1.2,
            default_b: 0.75,
        }
    }
}

impl BridgeConfig {
    /// Build a configuration from the defaults plus environment overrides.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration using `lookup` to resolve environment keys.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = BridgeConfig::default();

        if let Some(filter) = lookup(ENV_LOG) {
            config.log_filter = filter;
        }
        if let Some(limit) = lookup(ENV_TOP_LIMIT) {
            config.default_top_limit = limit.trim().parse().map_err(|e| {
                JpcError::invalid_input(format!("{ENV_TOP_LIMIT}={limit} is not a count: {e}"))
            })?;
        }
        if let Some(session) = lookup(ENV_SESSION) {
            config.default_session = session;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.default_session.is_empty() {
            return Err(JpcError::invalid_input("default_session must not be empty"));
        }
        if self.default_top_limit == 0 || self.max_top_limit == 0 {
            return Err(JpcError::invalid_input("top limits must be greater than 0"));
        }
        if !self.default_k1.is_finite() || !self.default_b.is_finite() {
            return Err(JpcError::invalid_input("default k1 and b must be finite"));
        }
        Ok(())
    }

    /// Clamp a requested limit into `1..=max_top_limit`, falling back to the default.
    pub fn top_limit(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_top_limit)
            .clamp(1, self.max_top_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.default_session, "default");
        assert_eq!(config.default_top_limit, 10);
        assert_eq!(config.default_k1, 1.2);
        assert_eq!(config.default_b, 0.75);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let config = BridgeConfig::from_lookup(|key| match key {
            ENV_LOG => Some("debug".to_string()),
            ENV_TOP_LIMIT => Some("25".to_string()),
            ENV_SESSION => Some("main".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.default_top_limit, 25);
        assert_eq!(config.default_session, "main");
    }

    #[test]
    fn test_invalid_top_limit() {
        let result = BridgeConfig::from_lookup(|key| match key {
            ENV_TOP_LIMIT => Some("many".to_string()),
            _ => None,
        });
        assert!(result.is_err());

        let result = BridgeConfig::from_lookup(|key| match key {
            ENV_TOP_LIMIT => Some("0".to_string()),
            _ => None,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_top_limit_clamping() {
        let config = BridgeConfig::default();
        assert_eq!(config.top_limit(None), 10);
        assert_eq!(config.top_limit(Some(0)), 1);
        assert_eq!(config.top_limit(Some(3)), 3);
        assert_eq!(config.top_limit(Some(usize::MAX)), 10_000);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: BridgeConfig = serde_json::from_str(r#"{"default_top_limit": 5}"#).unwrap();
        assert_eq!(config.default_top_limit, 5);
        assert_eq!(config.default_session, "default");
    }
}
