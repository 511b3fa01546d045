//! Destinations for errors that cannot be returned to a caller.
//!
//! Persistence runs after the mutating call has already returned, and a load
//! skips bad records instead of failing. Those errors go to an [`ErrorSink`].

use crate::error::{ErrorKind, StoreError};
use std::sync::Mutex;
use tracing::error;

pub trait ErrorSink: Send + Sync {
    fn report(&self, error: &StoreError);
}

impl<F> ErrorSink for F
where
    F: Fn(&StoreError) + Send + Sync,
{
    fn report(&self, error: &StoreError) {
        self(error)
    }
}

/// Default sink: logs every report at error level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn report(&self, err: &StoreError) {
        error!(kind = ?err.kind(), error = %err, "list store error");
    }
}

/// Keeps every report in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    reports: Mutex<Vec<(ErrorKind, String)>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> Vec<(ErrorKind, String)> {
        self.reports
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn count(&self, kind: ErrorKind) -> usize {
        self.reports().iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn is_empty(&self) -> bool {
        self.reports().is_empty()
    }
}

impl ErrorSink for CollectingSink {
    fn report(&self, err: &StoreError) {
        let mut reports = self
            .reports
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        reports.push((err.kind(), err.to_string()));
    }
}
