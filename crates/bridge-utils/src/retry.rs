// Copyright 2024 StarkGate Bridge Developers.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Retry logic for async calls

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use backoff::backoff::Backoff;
use futures::TryFutureExt;

use crate::{Error, Result};

/// Constant with Max Retry Count is a backoff policy which always returns
/// a constant duration, until it exceeds the maximum retry count.
#[derive(Debug)]
pub struct ConstantWithMaxRetryCount {
    interval: Duration,
    max_retry_count: usize,
    count: usize,
}

impl ConstantWithMaxRetryCount {
    /// Creates a new Constant backoff with `interval` and `max_retry_count`.
    /// `interval` is the duration to wait between retries, and `max_retry_count` is the maximum
    /// number of retries, after which we return `None` to indicate that we should stop retrying.
    pub fn new(interval: Duration, max_retry_count: usize) -> Self {
        Self {
            interval,
            max_retry_count,
            count: 0,
        }
    }
}

impl Backoff for ConstantWithMaxRetryCount {
    fn next_backoff(&mut self) -> Option<Duration> {
        (self.count < self.max_retry_count).then(|| {
            self.count += 1;
            self.interval
        })
    }

    fn reset(&mut self) {
        self.count = 0;
    }
}

/// The retry policy shared by every transfer log query.
///
/// A failed query is retried while fewer than `max_retry` attempts have
/// failed, unless the backend answered with a rate limit (HTTP 429). Rate
/// limited queries fail on the first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRetryPolicy {
    max_retry: usize,
    interval: Duration,
}

impl QueryRetryPolicy {
    /// Creates a new policy.
    pub const fn new(max_retry: usize, interval: Duration) -> Self {
        Self {
            max_retry,
            interval,
        }
    }

    /// The maximum number of retries after the first failure.
    pub const fn max_retry(&self) -> usize {
        self.max_retry
    }

    /// Decides whether a query that failed `failure_count` times already
    /// (not counting the current failure) should run again.
    pub fn should_retry(&self, failure_count: usize, error: &Error) -> bool {
        !error.is_rate_limited() && failure_count < self.max_retry
    }

    /// Runs `op` until it succeeds or the policy gives up, returning the
    /// last error in the latter case.
    pub async fn run<T, F, Fut>(&self, query: &'static str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let backoff =
            ConstantWithMaxRetryCount::new(self.interval, self.max_retry);
        let failures = AtomicUsize::new(0);
        let task = || {
            op().map_err(|e| {
                let failure_count = failures.fetch_add(1, Ordering::SeqCst);
                if self.should_retry(failure_count, &e) {
                    backoff::Error::transient(e)
                } else {
                    backoff::Error::permanent(e)
                }
            })
        };
        let notify = |e: Error, after: Duration| {
            tracing::event!(
                target: crate::probe::TARGET,
                tracing::Level::DEBUG,
                kind = %crate::probe::Kind::Retry,
                %query,
                error = %e,
                after_ms = after.as_millis() as u64,
            );
        };
        backoff::future::retry_notify(backoff, task, notify).await
    }
}

impl Default for QueryRetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate_limited() -> Error {
        Error::HttpStatus {
            status: reqwest::StatusCode::TOO_MANY_REQUESTS,
            url: String::from("https://indexer.example"),
        }
    }

    #[test]
    fn constant_backoff_stops_after_max_retries() {
        let mut backoff =
            ConstantWithMaxRetryCount::new(Duration::from_millis(5), 2);
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(5)));
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(5)));
        assert_eq!(backoff.next_backoff(), None);
        backoff.reset();
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(5)));
    }

    #[test]
    fn should_retry_respects_max_and_rate_limits() {
        let policy = QueryRetryPolicy::new(3, Duration::ZERO);
        let err = Error::Generic("connection reset");
        assert!(policy.should_retry(0, &err));
        assert!(policy.should_retry(2, &err));
        assert!(!policy.should_retry(3, &err));
        assert!(!policy.should_retry(0, &rate_limited()));
    }

    #[tokio::test]
    async fn run_retries_transient_errors() {
        let policy = QueryRetryPolicy::new(3, Duration::from_millis(1));
        let attempts = AtomicUsize::new(0);
        let value = policy
            .run("flaky", || {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(Error::Generic("not yet"))
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await
            .unwrap();
        assert_eq!(value, 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn run_gives_up_after_max_retry() {
        let policy = QueryRetryPolicy::new(2, Duration::from_millis(1));
        let attempts = AtomicUsize::new(0);
        let result: Result<()> = policy
            .run("broken", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::Generic("down")) }
            })
            .await;
        assert!(result.is_err());
        // the first attempt plus two retries.
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    #[tracing_test::traced_test]
    async fn run_never_retries_rate_limits() {
        let policy = QueryRetryPolicy::new(5, Duration::from_millis(1));
        let attempts = AtomicUsize::new(0);
        let result: Result<()> = policy
            .run("rate-limited", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(rate_limited()) }
            })
            .await;
        assert!(result.unwrap_err().is_rate_limited());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn run_stops_on_a_rate_limit_after_transient_errors() {
        let policy = QueryRetryPolicy::new(5, Duration::from_millis(1));
        let attempts = AtomicUsize::new(0);
        let result: Result<()> = policy
            .run("throttled", || {
                let attempt = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(Error::Generic("timeout"))
                    } else {
                        Err(rate_limited())
                    }
                }
            })
            .await;
        assert!(result.unwrap_err().is_rate_limited());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn zero_max_retry_runs_once() {
        let policy = QueryRetryPolicy::new(0, Duration::from_millis(1));
        let attempts = AtomicUsize::new(0);
        let result: Result<()> = policy
            .run("once", || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async { Err(Error::Generic("down")) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
