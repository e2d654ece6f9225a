//! Optimistic write state machine
//!
//! A mutation first applies its expected result locally as a `PendingWrite`.
//! The remote outcome then settles it exactly once, either confirming the
//! applied value or failing with an optional authoritative refetch.

use std::future::Future;

use crate::error::{Error, Result};

/// A locally applied change awaiting remote confirmation
#[derive(Debug)]
#[must_use = "a pending write must be confirmed or failed"]
pub struct PendingWrite<T> {
    applied: T,
}

/// How a pending write settled
#[derive(Debug)]
pub enum WriteOutcome<T> {
    /// The remote write succeeded; holds the value to keep
    Confirmed(T),
    /// The remote write failed; holds the refetched remote state, if the
    /// refetch succeeded
    Failed { error: Error, refetched: Option<T> },
}

impl<T> PendingWrite<T> {
    pub fn new(applied: T) -> Self {
        Self { applied }
    }

    pub fn applied(&self) -> &T {
        &self.applied
    }

    /// Settle as confirmed, letting the server's answer adjust the applied value
    pub fn confirm(self, adjust: impl FnOnce(T) -> T) -> WriteOutcome<T> {
        WriteOutcome::Confirmed(adjust(self.applied))
    }

    /// Settle as failed, awaiting `refetch` for the authoritative state
    pub async fn fail<F>(self, error: Error, refetch: F) -> WriteOutcome<T>
    where
        F: Future<Output = Result<T>>,
    {
        let refetched = match refetch.await {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("Refetch after failed write also failed: {}", e);
                None
            }
        };
        WriteOutcome::Failed { error, refetched }
    }

    /// Settle as failed without trying to refetch
    pub fn abandon(self, error: Error) -> WriteOutcome<T> {
        WriteOutcome::Failed {
            error,
            refetched: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;

    #[test]
    fn test_confirm_adjusts_applied_value() {
        let pending = PendingWrite::new(vec!["temp"]);
        assert_eq!(pending.applied(), &vec!["temp"]);

        match pending.confirm(|_| vec!["server-id"]) {
            WriteOutcome::Confirmed(v) => assert_eq!(v, vec!["server-id"]),
            other => panic!("Expected Confirmed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fail_with_successful_refetch() {
        let pending = PendingWrite::new(vec![1, 2, 3]);
        let outcome = pending
            .fail(ApiError::ServerError("boom".into()).into(), async {
                Ok(vec![1, 2])
            })
            .await;

        match outcome {
            WriteOutcome::Failed {
                error,
                refetched: Some(state),
            } => {
                assert!(error.to_string().contains("boom"));
                assert_eq!(state, vec![1, 2]);
            }
            other => panic!("Expected Failed with refetch, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fail_when_refetch_fails_too() {
        let pending = PendingWrite::new(0);
        let outcome = pending
            .fail(ApiError::Forbidden.into(), async {
                Err(ApiError::Network("offline".into()).into())
            })
            .await;

        assert!(matches!(
            outcome,
            WriteOutcome::Failed {
                refetched: None,
                ..
            }
        ));
    }
}
