//! Signature computation and envelope assembly.

use crate::userbuf::{Permission, encode_userbuf};
use crate::{Result, base64url};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::write::ZlibEncoder;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::io::Write;

type HmacSha256 = Hmac<Sha256>;

/// Envelope format version.
pub const SIG_VERSION: &str = "2.0";

/// The signed document carried inside a token.
///
/// Field order matches what verifiers have historically received; only the
/// canonical string (see [`canonical_string`]) is covered by the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    /// Always [`SIG_VERSION`].
    #[serde(rename = "TLS.ver")]
    pub ver: String,

    /// Principal the token is issued for.
    #[serde(rename = "TLS.identifier")]
    pub identifier: String,

    /// Application id.
    #[serde(rename = "TLS.sdkappid")]
    pub sdkappid: u64,

    /// Issue time, seconds since the epoch.
    #[serde(rename = "TLS.time")]
    pub time: u64,

    /// Validity in seconds, counted from `time`.
    #[serde(rename = "TLS.expire")]
    pub expire: u64,

    /// Standard base64 of the permission buffer (PrivateMapKey only).
    #[serde(
        rename = "TLS.userbuf",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub userbuf: Option<String>,

    /// Standard base64 HMAC-SHA256 over the canonical string.
    #[serde(rename = "TLS.sig")]
    pub sig: String,
}

impl Envelope {
    /// Build and sign an envelope.
    pub fn sign(
        key: &[u8],
        identifier: &str,
        sdkappid: u64,
        time: u64,
        expire: u64,
        userbuf: Option<String>,
    ) -> Result<Self> {
        let content = canonical_string(identifier, sdkappid, time, expire, userbuf.as_deref());
        let sig = hmac_sha256_base64(key, &content)?;
        Ok(Self {
            ver: SIG_VERSION.to_string(),
            identifier: identifier.to_string(),
            sdkappid,
            time,
            expire,
            userbuf,
            sig,
        })
    }

    /// The string this envelope's signature covers.
    pub fn canonical_string(&self) -> String {
        canonical_string(
            &self.identifier,
            self.sdkappid,
            self.time,
            self.expire,
            self.userbuf.as_deref(),
        )
    }

    /// Serialize, zlib-compress and URL-escape the envelope.
    pub fn encode(&self) -> Result<String> {
        let json = serde_json::to_vec(self)?;
        Ok(base64url::encode(&deflate(&json)?))
    }
}

/// Newline-terminated `TLS.<field>:<value>` lines, in signing order.
///
/// The `TLS.userbuf` line is present if and only if `userbuf` is `Some`.
pub fn canonical_string(
    identifier: &str,
    sdkappid: u64,
    time: u64,
    expire: u64,
    userbuf: Option<&str>,
) -> String {
    let mut content = format!(
        "TLS.identifier:{identifier}\nTLS.sdkappid:{sdkappid}\nTLS.time:{time}\nTLS.expire:{expire}\n"
    );
    if let Some(buf) = userbuf {
        content.push_str("TLS.userbuf:");
        content.push_str(buf);
        content.push('\n');
    }
    content
}

/// Standard base64 of HMAC-SHA256(`key`, `content`).
pub fn hmac_sha256_base64(key: &[u8], content: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(key).map_err(|e| crate::Error::Key(e.to_string()))?;
    mac.update(content.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Issue a token at `time`.
///
/// With a `permission`, the permission buffer is encoded against the same
/// `time` and bound into the signature.
pub fn gen_sig(
    key: &[u8],
    sdkappid: u64,
    identifier: &str,
    time: u64,
    expire: u64,
    permission: Option<&Permission<'_>>,
) -> Result<String> {
    let userbuf = permission
        .map(|p| STANDARD.encode(encode_userbuf(identifier, sdkappid, p, time, expire)));
    Envelope::sign(key, identifier, sdkappid, time, expire, userbuf)?.encode()
}

/// zlib framing at the default level (6), through stock zlib.
fn deflate(bytes: &[u8]) -> Result<Vec<u8>> {
    let mut enc = ZlibEncoder::new(Vec::with_capacity(bytes.len()), Compression::default());
    enc.write_all(bytes)?;
    Ok(enc.finish()?)
}
