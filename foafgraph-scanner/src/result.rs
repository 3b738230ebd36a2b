use crate::error::{Result, ScanError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One fetched page. Non-success statuses are still pages; callers decide
/// whether a status is fatal via [`FetchedPage::ensure_success`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    pub url: String,
    pub status_code: u16,
    pub content_type: Option<String>,
    pub body: String,
    pub response_time: Duration,
}

impl FetchedPage {
    pub fn new(url: String, status_code: u16, body: String) -> Self {
        Self {
            url,
            status_code,
            content_type: None,
            body,
            response_time: Duration::from_secs(0),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    pub fn ensure_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ScanError::Status {
                url: self.url,
                status: self.status_code,
            })
        }
    }
}
