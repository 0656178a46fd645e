use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use usersig_auth::Api;

mod error;
pub mod request;
mod secrets;

pub use error::ConfigError;
pub use request::{ConfigRequest, ConfigResponse, ExpireField, ResolvedRequest, issue_config_response};
pub use secrets::{EnvSecretStore, SecretStore, StaticSecretStore};

pub const CONFIG_FILE: &str = "usersig.toml";

/// Env var holding the application id in env-only deployments.
pub const SDKAPPID_ENV: &str = "SDKAPPID";
/// Env var holding the secret key in env-only deployments.
pub const SECRET_ENV: &str = "SECRET";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueDefaults {
    #[serde(default = "default_userid")]
    pub userid: String,
    #[serde(default = "default_expire")]
    pub expire: u64,
}

impl Default for IssueDefaults {
    fn default() -> Self {
        Self {
            userid: default_userid(),
            expire: default_expire(),
        }
    }
}

fn default_userid() -> String {
    "test".to_string()
}

fn default_expire() -> u64 {
    86_400
}

/// Where the issuing credential comes from, plus request defaults.
///
/// The secret key itself never lives in the file: `secret_ref` names it in a
/// [`SecretStore`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerConfig {
    pub sdkappid: u64,
    pub secret_ref: String,
    #[serde(default)]
    pub defaults: IssueDefaults,
}

impl IssuerConfig {
    /// Build a config from `SDKAPPID`, with the key read from `SECRET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Same as [`IssuerConfig::from_env`], reading variables through `var`.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let raw = var(SDKAPPID_ENV)
            .ok_or_else(|| ConfigError::NotFound(format!("missing env var {SDKAPPID_ENV}")))?;
        let sdkappid = raw.trim().parse::<u64>().map_err(|e| {
            ConfigError::Validation(format!("{SDKAPPID_ENV} must be an integer, got {raw:?}: {e}"))
        })?;
        let cfg = Self {
            sdkappid,
            secret_ref: SECRET_ENV.to_string(),
            defaults: IssueDefaults::default(),
        };
        validate_config(&cfg)?;
        Ok(cfg)
    }

    /// Resolve the secret key and return `(sdkappid, key)`.
    pub fn credential(&self, secrets: &dyn SecretStore) -> Result<(u64, String), ConfigError> {
        let key = secrets.get(&self.secret_ref)?;
        Ok((self.sdkappid, key))
    }

    /// Build a wall-clock issuer for this config.
    pub fn build_api(&self, secrets: &dyn SecretStore) -> Result<Api, ConfigError> {
        let (sdkappid, key) = self.credential(secrets)?;
        tracing::debug!(sdkappid, secret_ref = %self.secret_ref, "issuer credential resolved");
        Ok(Api::new(sdkappid, key))
    }
}

pub fn validate_config(cfg: &IssuerConfig) -> Result<(), ConfigError> {
    if cfg.sdkappid == 0 {
        return Err(ConfigError::Validation("sdkappid must be non-zero".to_string()));
    }
    if cfg.secret_ref.trim().is_empty() {
        return Err(ConfigError::Validation("secret_ref must be set".to_string()));
    }
    if cfg.defaults.userid.is_empty() {
        return Err(ConfigError::Validation(
            "defaults.userid must not be empty".to_string(),
        ));
    }
    if cfg.defaults.expire == 0 {
        return Err(ConfigError::Validation(
            "defaults.expire must be positive".to_string(),
        ));
    }
    Ok(())
}

pub fn default_config_dir() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config").join("usersig")
    } else {
        PathBuf::from(".usersig")
    }
}

pub fn load_config_from_dir(dir: &Path) -> Result<IssuerConfig, ConfigError> {
    load_config_from_file(&dir.join(CONFIG_FILE))
}

pub fn load_config_from_file(path: &Path) -> Result<IssuerConfig, ConfigError> {
    let content = fs::read_to_string(path)
        .map_err(|e| ConfigError::NotFound(format!("failed to read {}: {e}", path.display())))?;
    let cfg: IssuerConfig = toml::from_str(&content).map_err(|e| {
        ConfigError::Validation(format!("invalid TOML in {}: {e}", path.display()))
    })?;
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Write the default `usersig.toml` into `dir` unless one is already there.
///
/// Returns true if a file was written.
pub fn write_default_config_file(dir: &Path) -> Result<bool, ConfigError> {
    fs::create_dir_all(dir)
        .map_err(|e| ConfigError::Internal(format!("failed to create {}: {e}", dir.display())))?;

    let path = dir.join(CONFIG_FILE);
    if path.exists() {
        return Ok(false);
    }
    fs::write(&path, include_str!("../../../docs/usersig/usersig.toml.example")).map_err(|e| {
        ConfigError::Internal(format!("failed to write {}: {e}", path.display()))
    })?;
    Ok(true)
}
