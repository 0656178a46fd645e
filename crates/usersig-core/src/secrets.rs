use std::collections::BTreeMap;

use crate::ConfigError;

/// Resolves a secret reference to its value.
pub trait SecretStore: Send + Sync {
    fn get(&self, secret_ref: &str) -> Result<String, ConfigError>;
}

/// Reads secrets from environment variables named by the reference.
pub struct EnvSecretStore;

impl SecretStore for EnvSecretStore {
    fn get(&self, secret_ref: &str) -> Result<String, ConfigError> {
        std::env::var(secret_ref)
            .ok()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| ConfigError::NotFound(format!("missing secret env var {secret_ref}")))
    }
}

/// In-memory secrets, for embedding and tests.
#[derive(Default)]
pub struct StaticSecretStore {
    secrets: BTreeMap<String, String>,
}

impl StaticSecretStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, secret_ref: &str, value: &str) -> Self {
        self.secrets.insert(secret_ref.to_string(), value.to_string());
        self
    }
}

impl SecretStore for StaticSecretStore {
    fn get(&self, secret_ref: &str) -> Result<String, ConfigError> {
        self.secrets
            .get(secret_ref)
            .cloned()
            .ok_or_else(|| ConfigError::NotFound(format!("secret {secret_ref} not set")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn static_store_lookup() {
        let store = StaticSecretStore::new().with("K", "v");
        assert_eq!(store.get("K").unwrap(), "v");
        assert!(matches!(store.get("missing"), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn env_store_reports_missing_var() {
        let err = EnvSecretStore
            .get("USERSIG_TEST_SURELY_UNSET_VAR")
            .unwrap_err();
        assert!(err.to_string().contains("USERSIG_TEST_SURELY_UNSET_VAR"));
    }
}
