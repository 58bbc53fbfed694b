//! Per-process session: who is recording entries, and where they go.
//!
//! The session is built once at start-up from the local store (plus an
//! optional endpoint override) and handed to whatever needs it. Nothing
//! reads the endpoint from ambient state.

use tracing::debug;

use crate::store::LocalStore;

/// Staff name recorded on entries when none has been saved.
pub const UNKNOWN_STAFF: &str = "Unknown";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    endpoint_url: Option<String>,
    staff_name: String,
}

impl Session {
    pub fn new(endpoint_url: Option<String>, staff_name: &str) -> Self {
        Self {
            endpoint_url: endpoint_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),
            staff_name: staff_name.trim().to_string(),
        }
    }

    /// Build the session from saved settings.
    pub fn load(store: &LocalStore) -> Self {
        let session = Self::new(Some(store.endpoint_url()), &store.staff_name());
        debug!(
            configured = session.is_configured(),
            has_staff = !session.staff_name.is_empty(),
            "Session loaded"
        );
        session
    }

    /// Replace the endpoint for this process only. Blank overrides are ignored.
    pub fn with_endpoint_override(self, endpoint_url: Option<String>) -> Self {
        match endpoint_url.map(|url| url.trim().to_string()) {
            Some(url) if !url.is_empty() => Self {
                endpoint_url: Some(url),
                ..self
            },
            _ => self,
        }
    }

    pub fn endpoint_url(&self) -> Option<&str> {
        self.endpoint_url.as_deref()
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint_url.is_some()
    }

    /// The saved staff name, possibly empty.
    pub fn staff_name(&self) -> &str {
        &self.staff_name
    }

    /// The name stamped on submitted entries.
    pub fn submitting_staff(&self) -> &str {
        if self.staff_name.is_empty() {
            UNKNOWN_STAFF
        } else {
            &self.staff_name
        }
    }
}
