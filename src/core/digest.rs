//! BLAKE3 fingerprints of rendered templates.

use super::error::Result;
use super::template::Template;

/// Hash a string. Returns `"blake3:{hex}"`.
pub fn hash_string(s: &str) -> String {
    format!("blake3:{}", blake3::hash(s.as_bytes()).to_hex())
}

/// Fingerprint of the compact JSON rendering.
///
/// Two generations from the same config always share a fingerprint; CI can
/// compare it against the published template to detect hand edits.
pub fn fingerprint(template: &Template) -> Result<String> {
    Ok(hash_string(&template.to_json(false)?))
}
