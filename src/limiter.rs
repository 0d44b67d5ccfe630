//! Rolling-window admission control.
//!
//! [`RateLimiter`] admits at most `quota.limit()` callers per rolling
//! `quota.window()`. Each grant consumes one permit; the permit frees exactly
//! one window after *its own* grant time, independently of what the admitted
//! caller does afterwards. A burst of `limit` grants therefore frees one slot
//! at a time, one window later each, instead of all at once.
//!
//! Semantics:
//! - `acquire` suspends the caller while the limiter is saturated; waiters are
//!   granted in strict arrival order, one per freed permit.
//! - `shutdown` cancels every queued waiter promptly and fails all later
//!   `acquire` calls with [`AcquireError::Closed`].
//! - Accounting lives in a single coordinator task fed by a request channel,
//!   so admission costs one task and one timer per limiter no matter how many
//!   callers pile up.
//!
//! Invariants:
//! - `0 <= outstanding <= limit` at every instant.
//! - Expiry bookkeeping never acquires a permit itself.

use crate::{AcquireError, Quota};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

type Reply = oneshot::Sender<Result<(), AcquireError>>;

enum Request {
    Acquire { reply: Reply },
    Shutdown,
}

/// Admission gate seam between the limiter and whatever it paces.
///
/// [`DocumentSubmitter`](crate::DocumentSubmitter) depends on this trait
/// rather than the concrete limiter, so tests can count or fake admissions.
#[async_trait]
pub trait Admission: Send + Sync {
    /// Suspend until admitted.
    async fn acquire(&self) -> Result<(), AcquireError>;
}

/// Handle to a rolling-window rate limiter.
///
/// Cheap to clone; every clone feeds the same coordinator, so one limiter
/// shared across tasks paces the union of their calls. The coordinator exits
/// once every handle is dropped and the outstanding permits have expired.
///
/// ```rust
/// use turnstile::{Quota, RateLimiter};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let limiter = RateLimiter::new(Quota::per_second(3).unwrap());
/// limiter.acquire().await.unwrap();
/// limiter.shutdown();
/// assert!(limiter.acquire().await.unwrap_err().is_closed());
/// # });
/// ```
#[derive(Clone)]
pub struct RateLimiter {
    tx: mpsc::UnboundedSender<Request>,
    quota: Quota,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").field("quota", &self.quota).finish()
    }
}

impl RateLimiter {
    /// Create a limiter and spawn its coordinator.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(quota: Quota) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(coordinate(rx, quota));
        Self { tx, quota }
    }

    /// Inspect the configured quota.
    pub fn quota(&self) -> Quota {
        self.quota
    }

    /// Suspend until a permit is granted.
    ///
    /// Returns [`AcquireError::Closed`] when called after
    /// [`shutdown`](Self::shutdown) and [`AcquireError::Cancelled`] when
    /// shutdown arrives while this caller is queued. Never fails otherwise.
    pub async fn acquire(&self) -> Result<(), AcquireError> {
        let (reply, granted) = oneshot::channel();
        self.tx
            .send(Request::Acquire { reply })
            .map_err(|_| AcquireError::Closed)?;
        match granted.await {
            Ok(outcome) => outcome,
            // Coordinator exited without answering: the limiter is gone.
            Err(_) => Err(AcquireError::Closed),
        }
    }

    /// Like [`acquire`](Self::acquire) but gives up after `timeout`,
    /// returning [`AcquireError::TimedOut`].
    ///
    /// A wait abandoned here does not hold its place in line; the permit it
    /// would have received goes to the next live waiter instead.
    pub async fn try_acquire_for(&self, timeout: Duration) -> Result<(), AcquireError> {
        match tokio::time::timeout(timeout, self.acquire()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AcquireError::TimedOut),
        }
    }

    /// Stop admitting and cancel every queued waiter.
    ///
    /// Waiters observe [`AcquireError::Cancelled`] promptly, not after their
    /// permits would have freed. Idempotent. Permits already granted are
    /// unaffected; they expire on their own schedule.
    pub fn shutdown(&self) {
        // A dead coordinator already means closed; nothing to do.
        let _ = self.tx.send(Request::Shutdown);
    }
}

#[async_trait]
impl Admission for RateLimiter {
    async fn acquire(&self) -> Result<(), AcquireError> {
        RateLimiter::acquire(self).await
    }
}

/// Coordinator-owned accounting. `outstanding` counts granted, not-yet-expired
/// permits; `expiries` holds their deadlines in grant order, which is also
/// deadline order because each is `now + window` with monotone `now`.
struct Gate {
    limit: u32,
    window: Duration,
    outstanding: u32,
    expiries: VecDeque<Instant>,
    waiters: VecDeque<Reply>,
    closed: bool,
}

impl Gate {
    fn new(quota: Quota) -> Self {
        Self {
            limit: quota.limit(),
            window: quota.window(),
            outstanding: 0,
            expiries: VecDeque::new(),
            waiters: VecDeque::new(),
            closed: false,
        }
    }

    fn admit(&mut self, reply: Reply) {
        if self.closed {
            let _ = reply.send(Err(AcquireError::Closed));
            return;
        }
        if self.outstanding < self.limit {
            self.outstanding += 1;
            self.expiries.push_back(Instant::now() + self.window);
            debug_assert!(self.outstanding <= self.limit, "outstanding permits exceed limit");
            if reply.send(Ok(())).is_err() {
                // Caller vanished before the grant landed; take the booking
                // back so the slot is not idle for a whole window.
                self.expiries.pop_back();
                self.outstanding -= 1;
                return;
            }
            tracing::trace!(outstanding = self.outstanding, "permit granted");
        } else {
            self.waiters.push_back(reply);
            tracing::trace!(queued = self.waiters.len(), "saturated, caller queued");
        }
    }

    /// The front permit reached its deadline: hand the freed unit to the
    /// earliest caller still waiting, or return it to the pool.
    fn release_front(&mut self) {
        if self.expiries.pop_front().is_none() {
            return;
        }
        while let Some(waiter) = self.waiters.pop_front() {
            if waiter.send(Ok(())).is_ok() {
                // Handed off: outstanding is unchanged, the unit starts a
                // fresh window from now.
                self.expiries.push_back(Instant::now() + self.window);
                tracing::trace!(queued = self.waiters.len(), "freed permit handed to waiter");
                return;
            }
            // Receiver gone (timed out or dropped); next in line.
        }
        debug_assert!(self.outstanding > 0, "permit accounting underflow");
        self.outstanding = self.outstanding.saturating_sub(1);
        tracing::trace!(outstanding = self.outstanding, "permit expired");
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        let cancelled = self.waiters.len();
        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(Err(AcquireError::Cancelled));
        }
        tracing::debug!(cancelled, "rate limiter shut down");
    }
}

/// Single owner of the gate state. Waits on whichever comes first: the
/// earliest permit deadline or the next caller request.
async fn coordinate(mut rx: mpsc::UnboundedReceiver<Request>, quota: Quota) {
    let mut gate = Gate::new(quota);
    let mut handles_live = true;
    loop {
        match gate.expiries.front().copied() {
            Some(deadline) if handles_live => {
                tokio::select! {
                    _ = tokio::time::sleep_until(deadline) => gate.release_front(),
                    request = rx.recv() => match request {
                        Some(Request::Acquire { reply }) => gate.admit(reply),
                        Some(Request::Shutdown) => gate.close(),
                        None => {
                            handles_live = false;
                            gate.close();
                        }
                    },
                }
            }
            Some(deadline) => {
                // Every handle is gone; just drain the remaining deadlines.
                tokio::time::sleep_until(deadline).await;
                gate.release_front();
            }
            None if gate.closed => break,
            None => match rx.recv().await {
                Some(Request::Acquire { reply }) => gate.admit(reply),
                Some(Request::Shutdown) => gate.close(),
                None => {
                    handles_live = false;
                    gate.close();
                }
            },
        }
    }
}
