//! Engine configuration.
//!
//! Configuration is small: the policy seeded into the `*::*` permission key
//! whenever an engine is created or cleared. It can be built in code or
//! loaded from environment variables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable holding the default policy.
pub const DEFAULT_POLICY_ENV: &str = "ACL_DEFAULT_POLICY";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid configuration value.
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue {
        /// Configuration key.
        key: String,
        /// Error message.
        message: String,
    },
}

/// Verdict applied when no more specific permission matches.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum DefaultPolicy {
    /// Grant everything not explicitly denied.
    Allow,
    /// Deny everything not explicitly granted.
    #[default]
    Deny,
}

impl DefaultPolicy {
    /// Get the string representation of the policy.
    pub fn as_str(&self) -> &'static str {
        match self {
            DefaultPolicy::Allow => "allow",
            DefaultPolicy::Deny => "deny",
        }
    }

    /// Parse policy from string representation (case-insensitive).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "allow" | "grant" => Some(DefaultPolicy::Allow),
            "deny" => Some(DefaultPolicy::Deny),
            _ => None,
        }
    }
}

/// Access-control engine configuration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AclConfig {
    /// Policy stored under the `*::*` key.
    pub default_policy: DefaultPolicy,
}

impl AclConfig {
    /// Configuration with the given default policy.
    pub fn with_default_policy(default_policy: DefaultPolicy) -> Self {
        Self { default_policy }
    }

    /// Load configuration from environment variables, falling back to the
    /// default for anything missing or unparsable.
    ///
    /// Environment variables:
    /// - `ACL_DEFAULT_POLICY`: `allow` or `deny` (default: deny)
    pub fn from_env() -> Self {
        Self::try_from_env().unwrap_or_default()
    }

    /// Load configuration from environment variables, rejecting bad values.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let default_policy = match lookup(DEFAULT_POLICY_ENV) {
            Some(raw) => DefaultPolicy::parse(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: DEFAULT_POLICY_ENV.to_string(),
                message: format!("expected 'allow' or 'deny', got '{raw}'"),
            })?,
            None => DefaultPolicy::default(),
        };
        Ok(Self { default_policy })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AclConfig::default();
        assert_eq!(config.default_policy, DefaultPolicy::Deny);
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(DefaultPolicy::parse("allow"), Some(DefaultPolicy::Allow));
        assert_eq!(DefaultPolicy::parse(" DENY "), Some(DefaultPolicy::Deny));
        assert_eq!(DefaultPolicy::parse("maybe"), None);
        assert_eq!(DefaultPolicy::Allow.as_str(), "allow");
    }

    #[test]
    fn test_from_lookup() {
        let config = AclConfig::from_lookup(|_| Some("Allow".to_string())).unwrap();
        assert_eq!(config.default_policy, DefaultPolicy::Allow);

        let config = AclConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.default_policy, DefaultPolicy::Deny);

        let err = AclConfig::from_lookup(|_| Some("sometimes".to_string())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for ACL_DEFAULT_POLICY: expected 'allow' or 'deny', got 'sometimes'"
        );
    }
}
