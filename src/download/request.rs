//! Download requests and their terminal outcomes.

use chrono::{DateTime, Utc};

use crate::error::FailureReason;
use crate::publish::PublishedName;

/// One user action asking for a locator. Immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    locator: String,
    requested_at: DateTime<Utc>,
}

impl DownloadRequest {
    /// Validate a locator. Empty or whitespace-only locators are rejected.
    pub fn new(locator: &str) -> Result<Self, FailureReason> {
        let locator = locator.trim();
        if locator.is_empty() {
            return Err(FailureReason::InvalidInput);
        }

        Ok(Self {
            locator: locator.to_string(),
            requested_at: Utc::now(),
        })
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn requested_at(&self) -> DateTime<Utc> {
        self.requested_at
    }
}

/// Terminal result of a request, reported exactly once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadOutcome {
    Success(PublishedName),
    Failure(FailureReason),
}

impl DownloadOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, DownloadOutcome::Success(_))
    }

    /// One-line status text.
    pub fn status_text(&self) -> String {
        match self {
            DownloadOutcome::Success(name) => format!("Download complete: {}", name),
            DownloadOutcome::Failure(reason) => format!("Download failed: {}", reason),
        }
    }

    /// Title for the completion dialog.
    pub fn dialog_title(&self) -> &'static str {
        match self {
            DownloadOutcome::Success(_) => "Download complete",
            DownloadOutcome::Failure(FailureReason::PermissionDenied) => "Permission denied",
            DownloadOutcome::Failure(_) => "Download failed",
        }
    }

    /// Body for the completion dialog.
    pub fn dialog_message(&self) -> String {
        match self {
            DownloadOutcome::Success(name) => format!("Saved '{}' to shared storage.", name),
            DownloadOutcome::Failure(reason) => reason.to_string(),
        }
    }
}
