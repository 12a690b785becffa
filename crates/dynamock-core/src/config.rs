//! Engine configuration.

use std::env;

/// Dynamock engine configuration.
#[derive(Debug, Clone)]
pub struct DynamockConfig {
    /// Region used in table ARNs.
    pub default_region: String,
    /// Reject key values whose variant differs from the declared `S`/`N` type.
    pub enforce_key_types: bool,
}

impl DynamockConfig {
    /// Create configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            default_region: env::var("DEFAULT_REGION").unwrap_or_else(|_| "us-east-1".to_owned()),
            enforce_key_types: env_bool("DYNAMOCK_ENFORCE_KEY_TYPES", true),
        }
    }
}

impl Default for DynamockConfig {
    fn default() -> Self {
        Self {
            default_region: "us-east-1".to_owned(),
            enforce_key_types: true,
        }
    }
}

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key).map_or(default, |v| {
        matches!(v.as_str(), "1" | "true" | "yes" | "TRUE" | "YES")
    })
}
