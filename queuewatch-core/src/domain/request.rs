//! Job identifier

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Reasons a job identifier is rejected before any network call is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRequestId {
    #[error("request id is missing")]
    Missing,

    #[error("request id is empty")]
    Empty,

    #[error("request id contains forbidden character {0:?}")]
    ForbiddenChar(char),
}

/// Opaque identifier of a previously submitted job
///
/// The value is never interpreted, only validated so that it can be placed
/// into an endpoint path as a single segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Parse an optional raw identifier
    ///
    /// Absent, blank and URL-shaping values are all rejected.
    pub fn parse(raw: Option<&str>) -> Result<Self, InvalidRequestId> {
        let raw = raw.ok_or(InvalidRequestId::Missing)?.trim();

        if raw.is_empty() {
            return Err(InvalidRequestId::Empty);
        }

        if let Some(c) = raw
            .chars()
            .find(|c| matches!(c, '/' | '?' | '#' | '%') || c.is_whitespace() || c.is_control())
        {
            return Err(InvalidRequestId::ForbiddenChar(c));
        }

        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RequestId {
    type Err = InvalidRequestId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(Some(s))
    }
}
