//! AWS Signature Version 4 for provider requests.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::{Digest, Sha256};

use super::provider::ProviderError;
use crate::config::Credentials;

type HmacSha256 = Hmac<Sha256>;

const ALGORITHM: &str = "AWS4-HMAC-SHA256";

/// The parts of an HTTP request that go into the signature.
#[derive(Debug, Clone)]
pub struct SigningRequest<'a> {
    pub method: &'a str,
    pub host: &'a str,
    /// Request path, already percent-encoded once (see [`encode_path`]).
    pub path: &'a str,
    pub content_type: Option<&'a str>,
    pub payload: &'a [u8],
}

/// Headers to attach to the outgoing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub amz_date: String,
    pub authorization: String,
    pub security_token: Option<String>,
}

/// Percent-encode each path segment, keeping the separators.
pub fn encode_path(path: &str) -> String {
    path.split('/').map(uri_encode).collect::<Vec<_>>().join("/")
}

fn uri_encode(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Result<Vec<u8>, ProviderError> {
    let mut mac =
        HmacSha256::new_from_slice(key).map_err(|e| ProviderError::Signing(e.to_string()))?;
    mac.update(data);
    Ok(mac.finalize().into_bytes().to_vec())
}

/// Derive the per-day signing key for `region`/`service`.
pub fn derive_signing_key(
    secret_access_key: &str,
    date: &str,
    region: &str,
    service: &str,
) -> Result<Vec<u8>, ProviderError> {
    let k_date = hmac_sha256(format!("AWS4{secret_access_key}").as_bytes(), date.as_bytes())?;
    let k_region = hmac_sha256(&k_date, region.as_bytes())?;
    let k_service = hmac_sha256(&k_region, service.as_bytes())?;
    hmac_sha256(&k_service, b"aws4_request")
}

/// Sorted `(name, value)` pairs covered by the signature.
fn signed_header_pairs<'a>(
    request: &'a SigningRequest<'a>,
    amz_date: &'a str,
    security_token: Option<&'a str>,
) -> Vec<(&'static str, &'a str)> {
    let mut headers = Vec::with_capacity(4);
    if let Some(content_type) = request.content_type {
        headers.push(("content-type", content_type));
    }
    headers.push(("host", request.host));
    headers.push(("x-amz-date", amz_date));
    if let Some(token) = security_token {
        headers.push(("x-amz-security-token", token));
    }
    headers
}

/// Canonical request: the path is encoded a second time, as every
/// service except S3 expects.
pub fn canonical_request(
    request: &SigningRequest<'_>,
    amz_date: &str,
    security_token: Option<&str>,
) -> (String, String) {
    let headers = signed_header_pairs(request, amz_date, security_token);
    let canonical_headers: String = headers
        .iter()
        .map(|(name, value)| format!("{name}:{}\n", value.trim()))
        .collect();
    let signed_headers = headers
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(";");

    let canonical = format!(
        "{}\n{}\n\n{}\n{}\n{}",
        request.method,
        encode_path(request.path),
        canonical_headers,
        signed_headers,
        sha256_hex(request.payload),
    );
    (canonical, signed_headers)
}

/// Sign `request` for `region`/`service` at `now`.
pub fn sign_request(
    request: &SigningRequest<'_>,
    credentials: &Credentials,
    region: &str,
    service: &str,
    now: DateTime<Utc>,
) -> Result<SignedHeaders, ProviderError> {
    let amz_date = now.format("%Y%m%dT%H%M%SZ").to_string();
    let date = now.format("%Y%m%d").to_string();
    let security_token = credentials.session_token.as_deref();

    let (canonical, signed_headers) = canonical_request(request, &amz_date, security_token);
    tracing::trace!(canonical_request = %canonical, "SigV4 canonical request");

    let scope = format!("{date}/{region}/{service}/aws4_request");
    let string_to_sign = format!(
        "{ALGORITHM}\n{amz_date}\n{scope}\n{}",
        sha256_hex(canonical.as_bytes())
    );

    let key = derive_signing_key(&credentials.secret_access_key, &date, region, service)?;
    let signature = hex::encode(hmac_sha256(&key, string_to_sign.as_bytes())?);

    Ok(SignedHeaders {
        authorization: format!(
            "{ALGORITHM} Credential={}/{scope}, SignedHeaders={signed_headers}, Signature={signature}",
            credentials.access_key_id
        ),
        amz_date,
        security_token: security_token.map(str::to_string),
    })
}
