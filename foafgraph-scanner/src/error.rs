use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Can't fetch {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("No results found at {0}")]
    EmptyResult(String),
}

impl ScanError {
    /// True for failures of the fetch itself (transport, timeout, bad status),
    /// as opposed to input or extraction problems.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            ScanError::HttpError(_) | ScanError::Timeout(_) | ScanError::Status { .. }
        )
    }

    pub fn is_timeout(&self) -> bool {
        match self {
            ScanError::Timeout(_) => true,
            ScanError::HttpError(e) => e.is_timeout(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
