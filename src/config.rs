use crate::editor::fields::ValidationPolicy;
use anyhow::{Context, Result};
use std::env;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Console configuration loaded from environment variables.
///
/// | Env Var                             | Default                     |
/// |-------------------------------------|-----------------------------|
/// | `PROPCONNECT_API_URL`               | `http://localhost:8080/api` |
/// | `PROPCONNECT_TIMEOUT_SECS`          | `30`                        |
/// | `PROPCONNECT_USERNAME`              | unset                       |
/// | `PROPCONNECT_PASSWORD`              | unset                       |
/// | `PROPCONNECT_REQUIRE_POSITIVE_PRICE`| `false`                     |
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub api_url: String,
    pub timeout_secs: u64,
    pub username: Option<String>,
    pub password: Option<String>,
    pub validation: ValidationPolicy,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            username: None,
            password: None,
            validation: ValidationPolicy::default(),
        }
    }
}

impl ConsoleConfig {
    /// Load `.env` (if present) and read the process environment.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let api_url = lookup("PROPCONNECT_API_URL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(defaults.api_url);

        let timeout_secs = match lookup("PROPCONNECT_TIMEOUT_SECS") {
            Some(raw) => raw.trim().parse().with_context(|| {
                format!("PROPCONNECT_TIMEOUT_SECS must be a whole number, got {raw:?}")
            })?,
            None => defaults.timeout_secs,
        };

        let require_positive_price = match lookup("PROPCONNECT_REQUIRE_POSITIVE_PRICE") {
            Some(raw) => raw.trim().parse::<bool>().with_context(|| {
                format!("PROPCONNECT_REQUIRE_POSITIVE_PRICE must be true or false, got {raw:?}")
            })?,
            None => false,
        };

        Ok(Self {
            api_url,
            timeout_secs,
            username: lookup("PROPCONNECT_USERNAME"),
            password: lookup("PROPCONNECT_PASSWORD"),
            validation: ValidationPolicy {
                require_positive_price,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = ConsoleConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, ConsoleConfig::default());
    }

    #[test]
    fn values_are_read_from_environment() {
        let config = ConsoleConfig::from_lookup(lookup_from(&[
            ("PROPCONNECT_API_URL", "https://api.example.com/api"),
            ("PROPCONNECT_TIMEOUT_SECS", " 5 "),
            ("PROPCONNECT_USERNAME", "asha"),
            ("PROPCONNECT_REQUIRE_POSITIVE_PRICE", "true"),
        ]))
        .unwrap();

        assert_eq!(config.api_url, "https://api.example.com/api");
        assert_eq!(config.timeout_secs, 5);
        assert_eq!(config.username.as_deref(), Some("asha"));
        assert_eq!(config.password, None);
        assert!(config.validation.require_positive_price);
    }

    #[test]
    fn bad_timeout_is_an_error_not_a_panic() {
        let err = ConsoleConfig::from_lookup(lookup_from(&[("PROPCONNECT_TIMEOUT_SECS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("PROPCONNECT_TIMEOUT_SECS"));
    }
}
