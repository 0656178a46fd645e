//! usersig-auth
//!
//! Issues UserSig and PrivateMapKey tokens for the real-time audio/video
//! platform. A token is a signed JSON envelope, zlib-compressed and encoded
//! in a URL-safe base64 variant:
//!
//! - **UserSig** proves that an identifier may use the platform at all.
//! - **PrivateMapKey** additionally embeds a binary permission buffer that
//!   scopes the identifier to one room and a set of media privileges.
//!
//! The entry point is [`Api`], which binds an application id (`sdkappid`)
//! to its secret key.
//!
//! ## Quick start
//! ```
//! use usersig_auth::{Api, PrivilegeMap};
//!
//! # fn demo() -> usersig_auth::Result<()> {
//! let api = Api::new(1_400_000_001, "my-secret-key");
//! let user_sig = api.issue_user_sig("alice", 86_400)?;
//! let map_key = api.issue_private_map_key(
//!     "alice",
//!     300,
//!     1234,
//!     PrivilegeMap::ENTER_ROOM | PrivilegeMap::RECV_AUDIO | PrivilegeMap::RECV_VIDEO,
//! )?;
//! assert!(!user_sig.contains(['+', '/', '=']));
//! # let _ = map_key;
//! # Ok(()) }
//! # demo().unwrap();
//! ```

#![forbid(unsafe_code)]

pub mod base64url;
mod clock;
mod error;
mod privilege;
pub mod sig;
pub mod userbuf;

use std::fmt;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use privilege::PrivilegeMap;
pub use sig::Envelope;
pub use userbuf::{Permission, Room};

/// Token issuer bound to one application credential.
///
/// The credential is immutable, so an `Api` can be shared across threads and
/// used for any number of concurrent issuance calls.
#[derive(Clone)]
pub struct Api<C = SystemClock> {
    sdkappid: u64,
    key: Vec<u8>,
    clock: C,
}

impl Api<SystemClock> {
    /// Issuer reading issue times from the wall clock.
    pub fn new(sdkappid: u64, key: impl Into<Vec<u8>>) -> Self {
        Self::with_clock(sdkappid, key, SystemClock)
    }
}

impl<C: Clock> Api<C> {
    /// Issuer reading issue times from `clock`.
    pub fn with_clock(sdkappid: u64, key: impl Into<Vec<u8>>, clock: C) -> Self {
        Self {
            sdkappid,
            key: key.into(),
            clock,
        }
    }

    /// Application id this issuer signs for.
    pub fn sdkappid(&self) -> u64 {
        self.sdkappid
    }

    /// Issue a UserSig valid for `expire` seconds.
    pub fn issue_user_sig(&self, identifier: &str, expire: u64) -> Result<String> {
        self.issue(identifier, expire, None)
    }

    /// Issue a PrivateMapKey for a numeric room.
    pub fn issue_private_map_key(
        &self,
        identifier: &str,
        expire: u64,
        room_id: u32,
        privilege_map: impl Into<PrivilegeMap>,
    ) -> Result<String> {
        let permission = Permission::room_id(room_id, privilege_map);
        self.issue(identifier, expire, Some(&permission))
    }

    /// Issue a PrivateMapKey for a string room id.
    pub fn issue_private_map_key_with_room_code(
        &self,
        identifier: &str,
        expire: u64,
        room_code: &str,
        privilege_map: impl Into<PrivilegeMap>,
    ) -> Result<String> {
        let permission = Permission::room_code(room_code, privilege_map);
        self.issue(identifier, expire, Some(&permission))
    }

    /// Issue a token with an arbitrary permission, including a non-zero
    /// account type.
    pub fn issue(
        &self,
        identifier: &str,
        expire: u64,
        permission: Option<&Permission<'_>>,
    ) -> Result<String> {
        let time = self.clock.now_unix_secs()?;
        tracing::debug!(
            identifier,
            sdkappid = self.sdkappid,
            time,
            expire,
            kind = if permission.is_some() { "private_map_key" } else { "user_sig" },
            "issuing token"
        );
        sig::gen_sig(&self.key, self.sdkappid, identifier, time, expire, permission)
    }
}

impl<C> fmt::Debug for Api<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Api")
            .field("sdkappid", &self.sdkappid)
            .field("key", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_key() {
        let api = Api::new(7, "super-secret");
        let dbg = format!("{api:?}");
        assert!(dbg.contains("sdkappid: 7"));
        assert!(!dbg.contains("super-secret"));
    }

    #[test]
    fn fixed_clock_is_deterministic() {
        let api = Api::with_clock(1_400_000_001, "k", FixedClock(1_700_000_000));
        assert_eq!(
            api.issue_user_sig("test", 86400).unwrap(),
            api.issue_user_sig("test", 86400).unwrap()
        );
    }

    #[test]
    fn api_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Api>();
        assert_send_sync::<Api<FixedClock>>();
    }
}
