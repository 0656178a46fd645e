//! URL-safe rendition of standard base64.
//!
//! Tokens travel in URL paths and query strings, so the three characters of
//! the standard alphabet that need escaping there are swapped out:
//! `+` → `*`, `/` → `-`, `=` → `_`.

use crate::{Error, Result};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Replace `+`, `/` and `=` with their URL-safe stand-ins.
pub fn escape(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '+' => '*',
            '/' => '-',
            '=' => '_',
            other => other,
        })
        .collect()
}

/// Reverse [`escape`] and right-pad with `=` to a multiple of 4.
pub fn unescape(text: &str) -> String {
    let mut out: String = text
        .chars()
        .map(|c| match c {
            '_' => '=',
            '-' => '/',
            '*' => '+',
            other => other,
        })
        .collect();

    let rem = out.len() % 4;
    if rem != 0 {
        out.extend(std::iter::repeat_n('=', 4 - rem));
    }
    out
}

/// Standard base64 of `bytes`, escaped.
pub fn encode(bytes: &[u8]) -> String {
    escape(&STANDARD.encode(bytes))
}

/// Unescape and decode `text`.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(unescape(text))
        .map_err(|e| Error::Decode(e.to_string()))
}
