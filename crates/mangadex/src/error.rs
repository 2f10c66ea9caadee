//! Error types for the MangaDex client

use std::fmt;

/// Result type alias for upstream operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by upstream lookups
#[derive(Debug)]
pub enum Error {
    /// Transport failure (connect, timeout, body read)
    Http(reqwest::Error),

    /// Upstream answered with a non-2xx status
    Status {
        /// Requested URL
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Response body is not the expected JSON shape
    Decode(serde_json::Error),

    /// Request URL could not be built
    Url(url::ParseError),
}

impl Error {
    /// True when the upstream reported the entity as missing
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Status { status: 404, .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Http(e) => write!(f, "HTTP error: {}", e),
            Error::Status { url, status } => {
                write!(f, "API returned non-OK status {} for {}", status, url)
            }
            Error::Decode(e) => write!(f, "Decode error: {}", e),
            Error::Url(e) => write!(f, "Invalid URL: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(e) => Some(e),
            Error::Decode(e) => Some(e),
            Error::Url(e) => Some(e),
            Error::Status { .. } => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Http(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err)
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Url(err)
    }
}
