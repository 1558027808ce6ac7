//! Bounded retry around a fallible async operation.
//!
//! Model output is nondeterministic, so a malformed response is usually fixed
//! by asking again. [`run`] re-invokes the whole operation up to
//! [`RetryPolicy::max_attempts`] times and reports the outcome as a typed
//! [`RetryError`] instead of unwinding through the callers.

use std::fmt::Display;
use std::future::Future;

use thiserror::Error;

use crate::config::RetryConfig;

/// Decides whether a failed attempt is worth repeating.
pub trait Retryable {
    fn is_retryable(&self) -> bool {
        true
    }
}

/// How many times an operation may run in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
}

impl RetryPolicy {
    /// At least one attempt is always made.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

impl From<RetryConfig> for RetryPolicy {
    fn from(config: RetryConfig) -> Self {
        Self::new(config.max_attempts)
    }
}

/// Why [`run`] gave up.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// Every attempt failed with a retryable error; `last` is the final one.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },

    /// An attempt failed with an error that must not be retried.
    #[error("{0}")]
    Aborted(E),
}

impl<E> RetryError<E> {
    /// The error of the last attempt that ran.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { last, .. } => last,
            RetryError::Aborted(e) => e,
        }
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempt budget is spent.
///
/// `op` receives the 1-based attempt number.
pub async fn run<T, E, F, Fut>(
    policy: RetryPolicy,
    label: &str,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let max = policy.max_attempts();
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_retryable() => {
                log::warn!("{label}: attempt {attempt}/{max} failed, not retrying: {err}");
                return Err(RetryError::Aborted(err));
            }
            Err(err) => {
                log::warn!("{label}: attempt {attempt}/{max} failed: {err}");
                if attempt >= max {
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: err,
                    });
                }
                attempt += 1;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
