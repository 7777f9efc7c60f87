use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

/// Which remote lookup an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    Geocoding,
    Forecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Geocoding => "geocoding",
            Endpoint::Forecast => "forecast",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse classification of a failed lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network unreachable, timeout or non-2xx response.
    Transport,
    /// The response did not have the expected shape.
    Decode,
}

/// Failure of a single geocoding or forecast request.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{endpoint} request failed: {source}")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} request failed with status {status}: {body}")]
    Status {
        endpoint: Endpoint,
        status: StatusCode,
        body: String,
    },

    #[error("{endpoint} request timed out after {}s", .after.as_secs())]
    Timeout { endpoint: Endpoint, after: Duration },

    #[error("failed to decode {endpoint} response: {reason}")]
    Decode { endpoint: Endpoint, reason: String },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Transport { .. } | FetchError::Status { .. } | FetchError::Timeout { .. } => {
                ErrorKind::Transport
            }
            FetchError::Decode { .. } => ErrorKind::Decode,
        }
    }

    pub fn endpoint(&self) -> Endpoint {
        match self {
            FetchError::Transport { endpoint, .. }
            | FetchError::Status { endpoint, .. }
            | FetchError::Timeout { endpoint, .. }
            | FetchError::Decode { endpoint, .. } => *endpoint,
        }
    }

    pub(crate) fn decode(endpoint: Endpoint, reason: impl Into<String>) -> Self {
        FetchError::Decode { endpoint, reason: reason.into() }
    }
}

/// Errors from feeding an event the session cannot accept.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no candidate at index {index} ({available} available)")]
    NoSuchCandidate { index: usize, available: usize },
}
