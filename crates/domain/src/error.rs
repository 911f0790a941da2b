// crates/domain/src/error.rs

use thiserror::Error;

/// Failure taxonomy for a single content fetch.
///
/// `Clone` is deliberate: one upstream round trip may be shared by several
/// coalesced waiters, each of which receives its own copy of the outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transport failed before any response arrived.
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded its configured bound.
    #[error("request timed out")]
    Timeout,

    /// The upstream answered with a non-2xx status.
    #[error("upstream returned HTTP {status}")]
    Http { status: u16 },

    /// A well-formed GraphQL error payload, or a response with no usable
    /// `data` member.
    #[error("GraphQL error: {0}")]
    GraphQl(String),
}

impl FetchError {
    /// Transport-level failures are worth retrying through a fallback
    /// source; GraphQL-level failures usually mean the query itself is bad.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchError::Network(_) | FetchError::Timeout | FetchError::Http { .. }
        )
    }
}
