//! Input validation for Connect API client construction and requests.

use crate::Result;
use anyhow::anyhow;

/// Validates a Connect base URL: must parse and use http or https.
///
/// Returns the URL with any trailing slash removed, ready for path
/// concatenation.
pub fn validate_base_url(url: &str) -> Result<String> {
    let parsed = reqwest::Url::parse(url).map_err(|e| anyhow!("invalid URL {url:?}: {e}"))?;
    match parsed.scheme() {
        "http" | "https" => Ok(url.trim_end_matches('/').to_string()),
        other => Err(anyhow!("invalid URL scheme: {other}. Must be http or https").into()),
    }
}

/// Validates an access token: must be non-empty.
pub fn validate_token(token: &str) -> Result<()> {
    if token.is_empty() {
        return Err(anyhow!("access token cannot be empty").into());
    }
    Ok(())
}

/// Validates a request path before joining it to the base URL.
///
/// API paths legitimately start with `/`, so only `..` traversal
/// sequences are rejected.
pub fn validate_request_path(path: &str) -> Result<()> {
    if path.contains("..") {
        return Err(anyhow!("invalid request path: {path}").into());
    }
    Ok(())
}
