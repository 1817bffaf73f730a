// src/error.rs
use thiserror::Error;

/// Why a source could not be read. Only used for logs and metrics labels;
/// callers treat every cause the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnavailableCause {
    Network,
    Timeout,
    RateLimited,
    Status(u16),
    Malformed,
}

impl UnavailableCause {
    pub fn as_str(self) -> &'static str {
        match self {
            UnavailableCause::Network => "network",
            UnavailableCause::Timeout => "timeout",
            UnavailableCause::RateLimited => "rate_limited",
            UnavailableCause::Status(_) => "status",
            UnavailableCause::Malformed => "malformed",
        }
    }
}

/// The single failure kind an adapter reports.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{source_name} unavailable ({}): {detail}", .cause.as_str())]
pub struct SourceUnavailable {
    pub source_name: String,
    pub cause: UnavailableCause,
    pub detail: String,
}

impl SourceUnavailable {
    pub fn new(source_name: &str, cause: UnavailableCause, detail: impl Into<String>) -> Self {
        Self {
            source_name: source_name.to_string(),
            cause,
            detail: detail.into(),
        }
    }

    pub fn malformed(source_name: &str, detail: impl std::fmt::Display) -> Self {
        Self::new(source_name, UnavailableCause::Malformed, detail.to_string())
    }

    pub fn from_reqwest(source_name: &str, err: &reqwest::Error) -> Self {
        let cause = if err.is_timeout() {
            UnavailableCause::Timeout
        } else if let Some(status) = err.status() {
            status_cause(status.as_u16())
        } else if err.is_decode() {
            UnavailableCause::Malformed
        } else {
            UnavailableCause::Network
        };
        Self::new(source_name, cause, err.to_string())
    }
}

pub(crate) fn status_cause(status: u16) -> UnavailableCause {
    if status == 429 {
        UnavailableCause::RateLimited
    } else {
        UnavailableCause::Status(status)
    }
}

/// Rejected query-string input. Never surfaced to the user: the parameter
/// falls back to "all".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("invalid filter criteria: {param}={value:?}")]
    InvalidFilterCriteria { param: &'static str, value: String },
}
