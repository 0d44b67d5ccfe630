//! Quota configuration for the rate limiter.

use crate::QuotaError;
use std::time::Duration;

/// Immutable admission quota: at most `limit` grants per rolling `window`.
///
/// Validated at construction; an illegal quota is a configuration error, never
/// silently clamped.
///
/// ```rust
/// use turnstile::Quota;
/// use std::time::Duration;
///
/// let quota = Quota::per_second(3).unwrap();
/// assert_eq!(quota.limit(), 3);
/// assert_eq!(quota.window(), Duration::from_secs(1));
///
/// assert!(Quota::new(0, Duration::from_secs(1)).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quota {
    limit: u32,
    window: Duration,
}

impl Quota {
    /// Create a quota of `limit` admissions per `window`.
    ///
    /// Fails with [`QuotaError::ZeroLimit`] when `limit == 0` and
    /// [`QuotaError::ZeroWindow`] when `window` is zero.
    pub fn new(limit: u32, window: Duration) -> Result<Self, QuotaError> {
        if limit == 0 {
            return Err(QuotaError::ZeroLimit);
        }
        if window.is_zero() {
            return Err(QuotaError::ZeroWindow);
        }
        Ok(Self { limit, window })
    }

    /// `limit` admissions per second.
    pub fn per_second(limit: u32) -> Result<Self, QuotaError> {
        Self::new(limit, Duration::from_secs(1))
    }

    /// `limit` admissions per minute.
    pub fn per_minute(limit: u32) -> Result<Self, QuotaError> {
        Self::new(limit, Duration::from_secs(60))
    }

    /// Inspect the configured admission limit.
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Inspect the configured rolling window.
    pub fn window(&self) -> Duration {
        self.window
    }
}
