//! Error types for admission control and document submission.

use reqwest::StatusCode;

/// Errors produced while constructing a [`Quota`](crate::Quota).
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuotaError {
    /// `limit` must admit at least one request per window.
    #[error("quota limit must be greater than zero")]
    ZeroLimit,
    /// `window` must be a positive duration.
    #[error("quota window must be a positive duration")]
    ZeroWindow,
}

/// Errors returned by [`RateLimiter::acquire`](crate::RateLimiter::acquire)
/// and friends.
///
/// Admission itself never fails while the limiter is live; these variants all
/// describe ways a caller stops waiting.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AcquireError {
    /// The limiter was already shut down when `acquire` was called.
    #[error("rate limiter is closed")]
    Closed,
    /// The caller was queued and the limiter shut down before a permit freed.
    #[error("wait for a permit was cancelled by shutdown")]
    Cancelled,
    /// `try_acquire_for` elapsed before a permit freed.
    #[error("timed out waiting for a permit")]
    TimedOut,
}

impl AcquireError {
    /// Check if this error means the limiter was closed before the call.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Check if this error means the wait was cancelled mid-queue.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Check if this error came from a bounded wait elapsing.
    pub fn is_timed_out(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

/// Errors returned by [`DocumentSubmitter::submit`](crate::DocumentSubmitter::submit)
/// and the submitter builder.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum SubmitError {
    /// Precondition failure: the request was rejected before touching the
    /// limiter, so no permit was consumed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Admission failed (shutdown or bounded wait elapsed).
    #[error("admission: {0}")]
    Throttle(#[from] AcquireError),
    /// The HTTP call itself failed (connect, TLS, body read).
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),
    /// The endpoint answered with a status other than 200/201.
    #[error("endpoint rejected document with status {status}")]
    Rejected {
        /// Status code returned by the endpoint.
        status: StatusCode,
        /// Response body, carried verbatim for the caller to inspect.
        body: String,
    },
    /// The configured endpoint is not a valid URL.
    #[error("invalid endpoint url: {0}")]
    Endpoint(String),
}

impl SubmitError {
    /// Check if this error is a precondition failure.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }

    /// Check if this error came from the admission gate.
    pub fn is_throttle(&self) -> bool {
        matches!(self, Self::Throttle(_))
    }

    /// Access the rejected status and body, if present.
    pub fn rejection(&self) -> Option<(StatusCode, &str)> {
        match self {
            Self::Rejected { status, body } => Some((*status, body.as_str())),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_error_predicates() {
        assert!(AcquireError::Closed.is_closed());
        assert!(!AcquireError::Closed.is_cancelled());
        assert!(AcquireError::Cancelled.is_cancelled());
        assert!(AcquireError::TimedOut.is_timed_out());
    }

    #[test]
    fn throttle_conversion_keeps_kind() {
        let err: SubmitError = AcquireError::Cancelled.into();
        assert!(err.is_throttle());
        match err {
            SubmitError::Throttle(inner) => assert!(inner.is_cancelled()),
            e => panic!("expected Throttle, got {:?}", e),
        }
    }

    #[test]
    fn rejection_accessor_exposes_status_and_body() {
        let err = SubmitError::Rejected {
            status: StatusCode::BAD_GATEWAY,
            body: "upstream unavailable".into(),
        };
        let (status, body) = err.rejection().expect("rejection details");
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body, "upstream unavailable");
        assert!(SubmitError::InvalidArgument("x".into()).rejection().is_none());
    }

    #[test]
    fn display_messages_name_the_failure() {
        let msg = format!("{}", AcquireError::Cancelled);
        assert!(msg.contains("cancelled"));
        let msg = format!("{}", QuotaError::ZeroLimit);
        assert!(msg.contains("greater than zero"));
    }
}
