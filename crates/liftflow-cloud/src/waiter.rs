//! Provisioning waiters
//!
//! Remote control planes provision resources in the background: the create
//! or delete call returns immediately and the resource walks through a
//! series of pending statuses before it settles. [`StateChange`] polls a
//! describe call until the resource reaches the target, and classifies every
//! response with an explicit transition function so the loop itself only
//! has to deal with deadlines and sleeping.
//!
//! ```text
//!            ┌──────────── pending ◄────┐
//!            │   (not found on create,  │ sleep (backoff, capped by deadline)
//!  poll ─────┤    status in pending set)┘
//!            ├──► succeeded   (target status, or gone when deleting)
//!            ├──► mismatch    (any other status)
//!            ├──► inconsistent (0 or >1 records for one ID)
//!            └──► timed out   (deadline reached before the next poll)
//! ```

use crate::error::CloudError;
use std::fmt::{Debug, Display};
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Default bound for a provisioning wait
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15 * 60);

/// Interval policy between polls (exponential backoff)
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay after the first poll
    pub initial_delay: Duration,

    /// Maximum delay between polls
    pub max_delay: Duration,

    /// Backoff multiplier
    pub multiplier: f64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

impl PollConfig {
    /// Fixed interval between polls
    pub fn fixed(interval: Duration) -> Self {
        Self {
            initial_delay: interval,
            max_delay: interval,
            multiplier: 1.0,
        }
    }

    /// Delay after the given (zero-based) poll
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let max = self.max_delay.as_secs_f64();
        let delay = self.initial_delay.as_secs_f64() * self.multiplier.powi(attempt as i32);
        if delay.is_finite() && delay >= 0.0 {
            Duration::from_secs_f64(delay.min(max))
        } else {
            self.max_delay
        }
    }
}

/// A remote record that reports a provisioning status.
pub trait Provisioned {
    type Status: Copy + Eq + Debug + Display;

    fn status(&self) -> Self::Status;
}

/// Outcome of a single describe call.
#[derive(Debug)]
pub enum Observation<T> {
    /// The describe call succeeded and returned these records
    Records(Vec<T>),
    /// The remote service reported the resource as not found
    NotFound,
}

/// What the waiter is waiting for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitTarget<S> {
    /// The resource reports this status
    Status(S),
    /// The resource no longer exists
    Gone,
}

impl<S: Display> Display for WaitTarget<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitTarget::Status(status) => write!(f, "{}", status),
            WaitTarget::Gone => write!(f, "deleted"),
        }
    }
}

/// State of the poll loop after a response has been classified.
#[derive(Debug)]
pub enum PollState<T, S> {
    /// Keep polling; carries the observed status when there was one
    Pending(Option<S>),
    /// Target reached; carries the record unless the target is [`WaitTarget::Gone`]
    Succeeded(Option<T>),
    /// A status outside the pending set that is not the target
    Mismatch(S),
    /// The deadline passed; carries the last observed status
    TimedOut(Option<S>),
    /// Number of records returned for a single ID, when it is not exactly one
    Inconsistent(usize),
}

/// Description of an expected status change
#[derive(Debug, Clone)]
pub struct StateChange<S> {
    /// Human-readable resource label used in errors and logs
    pub resource: String,

    /// Statuses that mean "keep waiting"
    pub pending: Vec<S>,

    /// Where the resource should end up
    pub target: WaitTarget<S>,

    /// Upper bound on the whole wait
    pub timeout: Duration,

    /// Interval policy between polls
    pub poll: PollConfig,
}

impl<S> StateChange<S>
where
    S: Copy + Eq + Debug + Display,
{
    pub fn new(
        resource: impl Into<String>,
        pending: Vec<S>,
        target: WaitTarget<S>,
        timeout: Duration,
    ) -> Self {
        Self {
            resource: resource.into(),
            pending,
            target,
            timeout,
            poll: PollConfig::default(),
        }
    }

    pub fn with_poll(mut self, poll: PollConfig) -> Self {
        self.poll = poll;
        self
    }

    /// Classify one describe response.
    ///
    /// A "not found" response counts as pending while waiting for a status,
    /// so a freshly created resource that is not visible yet does not fail
    /// the wait. When waiting for deletion, both "not found" and an empty
    /// record set mean the resource is gone.
    pub fn transition<T>(&self, observation: Observation<T>) -> PollState<T, S>
    where
        T: Provisioned<Status = S>,
    {
        let records = match observation {
            Observation::NotFound => {
                return match self.target {
                    WaitTarget::Gone => PollState::Succeeded(None),
                    WaitTarget::Status(_) => PollState::Pending(None),
                };
            }
            Observation::Records(records) => records,
        };

        if records.is_empty() && self.target == WaitTarget::Gone {
            return PollState::Succeeded(None);
        }

        let found = records.len();
        let mut records = records.into_iter();
        let record = match (records.next(), found) {
            (Some(record), 1) => record,
            _ => return PollState::Inconsistent(found),
        };

        let status = record.status();
        if self.target == WaitTarget::Status(status) {
            PollState::Succeeded(Some(record))
        } else if self.pending.contains(&status) {
            PollState::Pending(Some(status))
        } else {
            PollState::Mismatch(status)
        }
    }

    /// Poll `refresh` until the target is reached.
    ///
    /// Errors returned by `refresh` end the wait immediately and are passed
    /// through unchanged. No poll is issued once the deadline has passed.
    pub async fn wait<T, E, F, Fut>(&self, mut refresh: F) -> Result<Option<T>, E>
    where
        T: Provisioned<Status = S>,
        E: From<CloudError>,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Observation<T>, E>>,
    {
        let started = Instant::now();
        let deadline = started + self.timeout;
        let mut last: Option<S> = None;
        let mut attempt: u32 = 0;

        loop {
            let state = if Instant::now() >= deadline {
                PollState::TimedOut(last)
            } else {
                let observation = refresh().await?;
                attempt += 1;
                self.transition(observation)
            };

            match state {
                PollState::Succeeded(record) => {
                    tracing::debug!(
                        "{} reached {} after {} poll(s)",
                        self.resource,
                        self.target,
                        attempt
                    );
                    return Ok(record);
                }
                PollState::Pending(status) => {
                    if status.is_some() {
                        last = status;
                    }
                    tracing::debug!(
                        "{} pending (status: {}, poll #{})",
                        self.resource,
                        describe(status),
                        attempt
                    );
                }
                PollState::Mismatch(status) => {
                    tracing::debug!("{} settled in unexpected status {}", self.resource, status);
                    return Err(CloudError::UnexpectedStatus {
                        resource: self.resource.clone(),
                        status: status.to_string(),
                        expected: self.target.to_string(),
                    }
                    .into());
                }
                PollState::TimedOut(status) => {
                    return Err(CloudError::Timeout {
                        resource: self.resource.clone(),
                        target: self.target.to_string(),
                        last: describe(status),
                        waited_secs: started.elapsed().as_secs(),
                    }
                    .into());
                }
                PollState::Inconsistent(found) => {
                    return Err(CloudError::Inconsistent {
                        resource: self.resource.clone(),
                        found,
                    }
                    .into());
                }
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            sleep(self.poll.delay_for_attempt(attempt - 1).min(remaining)).await;
        }
    }
}

fn describe<S: Display>(status: Option<S>) -> String {
    status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "none".to_string())
}
