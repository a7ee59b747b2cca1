//! Error reporting for failures the notification store recovers from.
//!
//! Persistence failures never reach callers of the store. They are handed to
//! an [`ErrorReporter`] instead, which by default logs them and forwards them
//! to Sentry.

use std::error::Error;
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::json;

pub trait ErrorReporter: Send + Sync {
    fn report(&self, error: &(dyn Error + 'static), context: &str);
}

impl<R: ErrorReporter + ?Sized> ErrorReporter for Arc<R> {
    fn report(&self, error: &(dyn Error + 'static), context: &str) {
        (**self).report(error, context)
    }
}

/// Logs through `tracing` and captures the error with Sentry when a client is bound.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingErrorReporter;

impl ErrorReporter for TracingErrorReporter {
    fn report(&self, error: &(dyn Error + 'static), context: &str) {
        tracing::error!(context, error = %error, "Notification persistence failure");
        shortlink_core::capture_error(error, Some(json!({ "context": context })));
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub context: String,
    pub message: String,
}

/// Keeps every report in memory. Used by tests and diagnostics views.
#[derive(Debug, Default)]
pub struct RecordingErrorReporter {
    reports: Mutex<Vec<ErrorReport>>,
}

impl RecordingErrorReporter {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn reports(&self) -> Vec<ErrorReport> {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorReporter for RecordingErrorReporter {
    fn report(&self, error: &(dyn Error + 'static), context: &str) {
        self.reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ErrorReport { context: context.to_string(), message: error.to_string() });
    }
}
