use std::collections::HashSet;
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use crate::error::{submission_in_flight_error, Error};

/// Bounds a collaborator call. Elapsed maps to `collaborator_unavailable_error`.
pub async fn with_timeout<T, F>(timeout: Duration, what: &str, fut: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(elapsed) => {
            tracing::warn!("{} timed out after {:?}", what, timeout);
            Err(elapsed.into())
        }
    }
}

/// Logs and swallows the outcome of a notification.
pub fn log_dispatch(what: &str, result: Result<(), Error>) {
    match result {
        Ok(()) => tracing::info!("{} sent", what),
        Err(err) => tracing::warn!("{} failed: {}", what, err),
    }
}

/// Holds a submission key until dropped.
pub struct InFlight<'a> {
    keys: &'a Mutex<HashSet<String>>,
    key: String,
}

impl<'a> InFlight<'a> {
    pub fn acquire(keys: &'a Mutex<HashSet<String>>, key: String) -> Result<Self, Error> {
        let mut held = keys.lock().unwrap_or_else(PoisonError::into_inner);

        if !held.insert(key.clone()) {
            tracing::warn!("submission {} already in flight", key);
            return Err(submission_in_flight_error());
        }

        Ok(Self { keys, key })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
