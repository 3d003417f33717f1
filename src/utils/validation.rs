//! URL and input validation utilities

use anyhow::{anyhow, Result};
use url::Url;

/// Validate that a string is an absolute http(s) URL
pub fn validate_url(url: &str) -> Result<Url> {
    let parsed = Url::parse(url).map_err(|e| anyhow!("Invalid URL format: {}", e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(anyhow!("Unsupported URL scheme: {}", other)),
    }
}

/// Check if URL is usable as a sheet or endpoint address
pub fn is_valid_endpoint_url(url: &str) -> bool {
    validate_url(url).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_https() {
        assert!(is_valid_endpoint_url(
            "https://script.google.com/macros/s/abc/exec"
        ));
    }

    #[test]
    fn test_rejects_other_schemes() {
        assert!(!is_valid_endpoint_url("ftp://example.com/file.csv"));
        assert!(!is_valid_endpoint_url("not a url"));
    }
}
