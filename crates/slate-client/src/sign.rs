//! FNAUTH request signing.
//!
//! Signs a request by HMAC-ing a canonical string built from the HTTP
//! method, a hash of the content, the timestamp and the URL path. The
//! function is pure: it performs no I/O and is deterministic for fixed
//! inputs.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDateTime;
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use sha2::Sha256;

use crate::error::{ClientError, ClientResult};

type HmacSha256 = Hmac<Sha256>;

/// Authorization scheme prefix expected by the service.
const AUTH_SCHEME: &str = "FNAUTH";

/// Request content as seen by the signer.
///
/// The three non-empty variants hash differently and the distinction is part
/// of the wire protocol: text hashes its raw bytes, raw bytes are hex-encoded
/// before hashing, and JSON hashes its compact serialization. The service
/// verifies signatures produced exactly this way.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestContent {
    Empty,
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
}

impl RequestContent {
    /// Whether the request carries a body for signing purposes.
    ///
    /// Mirrors the service's notion of an absent body: empty text, empty
    /// byte strings, JSON null and empty JSON objects all sign as empty.
    pub fn is_empty(&self) -> bool {
        match self {
            RequestContent::Empty => true,
            RequestContent::Text(s) => s.is_empty(),
            RequestContent::Bytes(b) => b.is_empty(),
            RequestContent::Json(v) => match v {
                serde_json::Value::Null => true,
                serde_json::Value::Object(m) => m.is_empty(),
                _ => false,
            },
        }
    }

    /// Hex MD5 digest of the content's canonical representation.
    fn md5_hex(&self) -> ClientResult<Option<String>> {
        if self.is_empty() {
            return Ok(None);
        }
        let digest = match self {
            RequestContent::Empty => return Ok(None),
            RequestContent::Text(s) => Md5::digest(s.as_bytes()),
            // Byte content is hex-encoded before hashing.
            RequestContent::Bytes(b) => Md5::digest(hex::encode(b).as_bytes()),
            RequestContent::Json(v) => {
                let compact = serde_json::to_string(v)?;
                Md5::digest(compact.as_bytes())
            }
        };
        Ok(Some(hex::encode(digest)))
    }
}

/// Build the canonical string covered by the signature.
fn canonical_string(
    method: &str,
    url: &str,
    content: &RequestContent,
    content_type: &str,
    timestamp: NaiveDateTime,
) -> ClientResult<String> {
    let mut raw = String::with_capacity(128);
    raw.push_str(&method.to_uppercase());
    raw.push('\n');

    match content.md5_hex()? {
        Some(digest) => {
            raw.push_str(&digest);
            raw.push('\n');
            raw.push_str(content_type);
            raw.push('\n');
        }
        // No hash and no content-type line for an empty body.
        None => raw.push_str("\n\n"),
    }

    raw.push_str(&timestamp.format("%Y-%m-%dT%H:%M:%S").to_string());
    raw.push('Z');
    raw.push('\n');

    // Path only: everything from the first '?' on is not signed.
    let path = url.split('?').next().unwrap_or(url);
    raw.push_str(path);

    Ok(raw)
}

/// Sign a request, producing the full authorization token.
///
/// Returns `"FNAUTH <access_key_id>:<base64 HMAC-SHA256 signature>"`.
/// Fails with [`ClientError::InvalidCredential`] when the secret is empty.
pub fn sign_request(
    access_key_id: &str,
    secret_access_key: &str,
    method: &str,
    url: &str,
    content: &RequestContent,
    content_type: &str,
    timestamp: NaiveDateTime,
) -> ClientResult<String> {
    if secret_access_key.is_empty() {
        return Err(ClientError::invalid_credential(
            "a secret access key is required to sign requests",
        ));
    }

    let raw = canonical_string(method, url, content, content_type, timestamp)?;

    let mut mac = HmacSha256::new_from_slice(secret_access_key.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(raw.as_bytes());
    let signature = BASE64.encode(mac.finalize().into_bytes());

    Ok(format!("{} {}:{}", AUTH_SCHEME, access_key_id, signature))
}
