//! First-run setup: connecting to a backend deployment.

use std::time::Duration;

use thiserror::Error;
use tracing::info;

use crate::api::{ApiError, BackendClient};
use crate::error::ValidationError;
use crate::store::{LocalStore, StoreError};

/// Every backend deployment URL starts with this.
const ENDPOINT_PREFIX: &str = "https://script.google.com/macros/s/";

/// The deployment id is followed by this path segment.
const ENDPOINT_EXEC: &str = "/exec";

#[derive(Error, Debug)]
pub enum SetupError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Cannot connect to Apps Script. Please check the URL and ensure the web app is deployed: {0}")]
    Unreachable(#[from] ApiError),

    #[error("Failed to save endpoint: {0}")]
    Store(#[from] StoreError),
}

/// Check that `url` looks like a web-app deployment URL and return it trimmed.
pub fn validate_endpoint_url(url: &str) -> Result<String, ValidationError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ValidationError::MissingEndpoint);
    }

    let invalid = || ValidationError::InvalidEndpoint(url.to_string());
    let rest = url.strip_prefix(ENDPOINT_PREFIX).ok_or_else(invalid)?;
    let (deployment_id, tail) = rest.split_at(rest.find('/').ok_or_else(invalid)?);

    if deployment_id.is_empty() || deployment_id.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    if !tail.starts_with(ENDPOINT_EXEC) {
        return Err(invalid());
    }
    Ok(url.to_string())
}

/// Validate `url`, confirm the deployment answers, then save it.
///
/// Nothing is saved unless the deployment responds with `{success: true}`.
pub async fn configure_endpoint(
    store: &LocalStore,
    url: &str,
    timeout: Duration,
) -> Result<String, SetupError> {
    let url = validate_endpoint_url(url)?;
    BackendClient::with_timeout(&url, timeout)?.ping().await?;
    store.save_endpoint_url(&url)?;
    info!("Backend endpoint configured");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::store::MemoryStore;
    use crate::test_support::unreachable_endpoint;

    #[test]
    fn test_accepts_deployment_urls() {
        for url in [
            "https://script.google.com/macros/s/AKfycbx123/exec",
            "  https://script.google.com/macros/s/AKfycbx123/exec  ",
            "https://script.google.com/macros/s/AKfycbx123/exec?foo=bar",
        ] {
            assert_eq!(validate_endpoint_url(url), Ok(url.trim().to_string()), "url {:?}", url);
        }
    }

    #[test]
    fn test_rejects_other_urls() {
        assert_eq!(validate_endpoint_url("   "), Err(ValidationError::MissingEndpoint));
        for url in [
            "http://script.google.com/macros/s/abc/exec",
            "https://script.google.com/macros/s//exec",
            "https://script.google.com/macros/s/abc/dev",
            "https://script.google.com/macros/s/abc",
            "https://script.google.com/macros/s/a c/exec",
            "https://example.com/exec",
        ] {
            assert!(
                matches!(validate_endpoint_url(url), Err(ValidationError::InvalidEndpoint(_))),
                "url {:?}",
                url
            );
        }
    }

    #[tokio::test]
    async fn test_configure_rejects_invalid_url_without_saving() {
        let store = LocalStore::new(Arc::new(MemoryStore::new()));
        let result = configure_endpoint(&store, &unreachable_endpoint(), Duration::from_secs(2)).await;
        assert!(matches!(result, Err(SetupError::Invalid(_))));
        assert_eq!(store.endpoint_url(), "");
    }
}
