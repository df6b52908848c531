// Per-call configuration object (tokens, base URLs)

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Well-known configuration keys
pub mod keys {
    pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
    pub const GITHUB_API_URL: &str = "GITHUB_API_URL";
    pub const N8N_API_URL: &str = "N8N_API_URL";
    pub const N8N_API_KEY: &str = "N8N_API_KEY";
}

/// Request header carrying each well-known key, as `(header, key)`
pub const CREDENTIAL_HEADERS: &[(&str, &str)] = &[
    ("X-GitHub-Token", keys::GITHUB_TOKEN),
    ("X-GitHub-API-URL", keys::GITHUB_API_URL),
    ("X-N8N-API-URL", keys::N8N_API_URL),
    ("X-N8N-API-KEY", keys::N8N_API_KEY),
];

/// Keys that belong to one upstream and are only used together
pub const CREDENTIAL_GROUPS: &[&[&str]] = &[
    &[keys::GITHUB_TOKEN, keys::GITHUB_API_URL],
    &[keys::N8N_API_URL, keys::N8N_API_KEY],
];

/// String-to-string settings supplied with a single dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceConfig(BTreeMap<String, String>);

impl ServiceConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect the well-known keys from environment variables of the same name
    pub fn from_env() -> Self {
        CREDENTIAL_HEADERS
            .iter()
            .filter_map(|(_, key)| std::env::var(key).ok().map(|value| (*key, value)))
            .filter(|(_, value)| !value.is_empty())
            .collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Get a key that must be present and non-blank
    pub fn require(&self, key: &str) -> Result<&str, ConfigError> {
        match self.get(key) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::Missing(key.to_string())),
        }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Overlay `other` on top of `self`; keys in `other` win
    pub fn merge(mut self, other: ServiceConfig) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Overlay per-request values on server defaults.
    ///
    /// A credential group is taken either wholly from the defaults or
    /// wholly from `overrides`: once `overrides` sets any key of a group, the
    /// defaults for that group are dropped. A default secret is never paired
    /// with a caller-supplied URL.
    pub fn overlay(mut self, overrides: ServiceConfig) -> Self {
        for group in CREDENTIAL_GROUPS {
            if group.iter().any(|key| overrides.contains_key(key)) {
                for key in group.iter() {
                    self.0.remove(*key);
                }
            }
        }
        self.merge(overrides)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ServiceConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<BTreeMap<String, String>> for ServiceConfig {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_rejects_missing_and_blank() {
        let config = ServiceConfig::new()
            .with("GITHUB_TOKEN", "ghp_abc")
            .with("N8N_API_KEY", "   ");

        assert_eq!(config.require("GITHUB_TOKEN").unwrap(), "ghp_abc");
        assert_eq!(
            config.require("N8N_API_KEY"),
            Err(ConfigError::Missing("N8N_API_KEY".to_string()))
        );
        assert_eq!(
            config.require("N8N_API_URL").unwrap_err().to_string(),
            "N8N_API_URL is required"
        );
    }

    #[test]
    fn test_merge_prefers_overlay() {
        let defaults: ServiceConfig = [("N8N_API_URL", "http://default"), ("GITHUB_TOKEN", "a")]
            .into_iter()
            .collect();
        let overlay = ServiceConfig::new().with("GITHUB_TOKEN", "b");

        let merged = defaults.merge(overlay);
        assert_eq!(merged.get("GITHUB_TOKEN"), Some("b"));
        assert_eq!(merged.get("N8N_API_URL"), Some("http://default"));
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn test_overlay_replaces_whole_credential_groups() {
        let defaults = ServiceConfig::new()
            .with(keys::GITHUB_TOKEN, "server-secret")
            .with(keys::N8N_API_URL, "https://n8n.internal")
            .with(keys::N8N_API_KEY, "server-key")
            .with("EXTRA", "kept");

        let overlaid = defaults
            .clone()
            .overlay(ServiceConfig::new().with(keys::GITHUB_API_URL, "https://elsewhere"));
        assert_eq!(overlaid.get(keys::GITHUB_API_URL), Some("https://elsewhere"));
        assert!(!overlaid.contains_key(keys::GITHUB_TOKEN));
        assert_eq!(overlaid.get(keys::N8N_API_KEY), Some("server-key"));
        assert_eq!(overlaid.get("EXTRA"), Some("kept"));

        let overlaid = defaults
            .clone()
            .overlay(ServiceConfig::new().with(keys::N8N_API_URL, "https://attacker"));
        assert_eq!(overlaid.get(keys::N8N_API_URL), Some("https://attacker"));
        assert!(!overlaid.contains_key(keys::N8N_API_KEY));
        assert_eq!(overlaid.get(keys::GITHUB_TOKEN), Some("server-secret"));

        assert_eq!(defaults.clone().overlay(ServiceConfig::new()), defaults);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let config = ServiceConfig::new().with("K", "V");
        assert_eq!(serde_json::to_string(&config).unwrap(), r#"{"K":"V"}"#);
    }
}
