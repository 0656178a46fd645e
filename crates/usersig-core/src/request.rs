//! Request and response shapes of the `/config` issuing endpoint.
//!
//! The transport is not part of this crate; a handler deserializes a
//! [`ConfigRequest`] from the body, calls [`issue_config_response`] and
//! serializes the returned [`ConfigResponse`].

use serde::{Deserialize, Serialize};
use usersig_auth::{Api, Clock};

use crate::{ConfigError, IssueDefaults};

/// `expire` as sent by clients: a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExpireField {
    Seconds(u64),
    Text(String),
}

/// Body of a `/config` request. Both fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRequest {
    #[serde(default)]
    pub userid: Option<String>,
    #[serde(default)]
    pub expire: Option<ExpireField>,
}

/// A request with its defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    pub userid: String,
    pub expire: u64,
}

/// Body of a `/config` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub sdkappid: u64,
    #[serde(rename = "userSig")]
    pub user_sig: String,
}

impl ConfigRequest {
    /// Apply `defaults` to empty fields.
    ///
    /// An absent or empty `userid` and an absent, zero or blank `expire` fall
    /// back to the defaults. A non-empty `expire` string must parse as whole
    /// seconds; `"0"` is taken literally.
    pub fn resolve(&self, defaults: &IssueDefaults) -> Result<ResolvedRequest, ConfigError> {
        let userid = match self.userid.as_deref() {
            Some(u) if !u.is_empty() => u.to_string(),
            _ => defaults.userid.clone(),
        };

        let expire = match &self.expire {
            None | Some(ExpireField::Seconds(0)) => defaults.expire,
            Some(ExpireField::Seconds(s)) => *s,
            Some(ExpireField::Text(t)) if t.trim().is_empty() => defaults.expire,
            Some(ExpireField::Text(t)) => t.trim().parse::<u64>().map_err(|e| {
                ConfigError::Validation(format!("expire must be whole seconds, got {t:?}: {e}"))
            })?,
        };

        Ok(ResolvedRequest { userid, expire })
    }
}

/// Issue a UserSig for `request` and wrap it in the response body.
pub fn issue_config_response<C: Clock>(
    api: &Api<C>,
    request: &ConfigRequest,
    defaults: &IssueDefaults,
) -> Result<ConfigResponse, ConfigError> {
    let resolved = request.resolve(defaults)?;
    tracing::info!(userid = %resolved.userid, expire = resolved.expire, "config request");
    let user_sig = api.issue_user_sig(&resolved.userid, resolved.expire)?;
    Ok(ConfigResponse {
        sdkappid: api.sdkappid(),
        user_sig,
    })
}
