//! Error tracking with Sentry.
//!
//! Initialises the Sentry client from [`ErrorTrackingConfig`] and offers the
//! two calls the rest of the console uses: [`capture_error`] for failures that
//! are recovered locally but should still be seen by operators, and
//! [`add_breadcrumb`] for the trail leading up to them. Both are no-ops while
//! no client is bound.

use crate::config::ErrorTrackingConfig;
use crate::error::CoreError;
use sentry::ClientInitGuard;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Keeps the Sentry client alive for the lifetime of the process.
static SENTRY_GUARD: Mutex<Option<ClientInitGuard>> = Mutex::new(None);

/// Initializes the Sentry SDK.
///
/// Without a DSN (or with a blank one) error tracking stays disabled and this
/// returns `Ok(())`.
///
/// # Errors
///
/// Returns [`CoreError::ErrorTracking`] when the DSN cannot be parsed.
pub fn init_error_tracking(config: &ErrorTrackingConfig) -> Result<(), CoreError> {
    let Some(sentry_dsn_str) = config.sentry_dsn.as_deref().map(str::trim).filter(|dsn| !dsn.is_empty()) else {
        tracing::info!("No Sentry DSN provided. Error tracking is disabled.");
        return Ok(());
    };

    let dsn = sentry_dsn_str
        .parse::<sentry::types::Dsn>()
        .map_err(|e| CoreError::ErrorTracking(format!("Invalid Sentry DSN: {}", e)))?;

    let options = sentry::ClientOptions {
        dsn: Some(dsn),
        release: config.sentry_release.clone().map(std::borrow::Cow::Owned),
        environment: config.sentry_environment.clone().map(std::borrow::Cow::Owned),
        attach_stacktrace: true,
        ..Default::default()
    };

    let guard = sentry::init(options);
    match SENTRY_GUARD.lock() {
        Ok(mut slot) => *slot = Some(guard),
        Err(e) => {
            return Err(CoreError::Internal(format!("Failed to store Sentry client guard: {}", e)));
        }
    }

    tracing::info!(
        environment = ?config.sentry_environment,
        release = ?config.sentry_release,
        "Sentry error tracking initialized"
    );
    Ok(())
}

/// Returns `true` when a Sentry client is bound to the current hub.
pub fn is_enabled() -> bool {
    sentry::Hub::current().client().is_some()
}

/// Captures an error with Sentry.
///
/// `context` is attached as the "Custom Context" of the event. A JSON object
/// contributes its fields directly; any other value is stored under `"value"`.
pub fn capture_error(error: &dyn std::error::Error, context: Option<serde_json::Value>) {
    if !is_enabled() {
        return;
    }

    sentry::with_scope(
        |scope| {
            if let Some(ctx_val) = context {
                let mut map = BTreeMap::new();
                match ctx_val {
                    serde_json::Value::Object(obj_map) => {
                        for (k, v) in obj_map {
                            map.insert(k, v);
                        }
                    }
                    other => {
                        map.insert("value".to_string(), other);
                    }
                }
                scope.set_context("Custom Context", sentry::protocol::Context::Other(map));
            }
        },
        || {
            sentry::capture_error(error);
        },
    );
}

/// Adds a breadcrumb recording an event that preceded a potential issue.
pub fn add_breadcrumb(category: &str, message: &str, level: sentry::Level) {
    if !is_enabled() {
        return;
    }
    sentry::add_breadcrumb(sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level,
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use thiserror::Error;

    #[derive(Error, Debug)]
    #[error("Test error: {message}")]
    struct TestError {
        message: String,
    }

    #[test]
    fn test_init_error_tracking_without_dsn_is_ok() {
        let config = ErrorTrackingConfig {
            sentry_dsn: None,
            sentry_environment: Some("test_env".to_string()),
            sentry_release: Some("test_release".to_string()),
        };
        assert!(init_error_tracking(&config).is_ok());
    }

    #[test]
    fn test_init_error_tracking_blank_dsn_is_ok() {
        let config = ErrorTrackingConfig {
            sentry_dsn: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(init_error_tracking(&config).is_ok());
    }

    #[test]
    fn test_init_error_tracking_rejects_malformed_dsn() {
        let config = ErrorTrackingConfig {
            sentry_dsn: Some("not a dsn".to_string()),
            ..Default::default()
        };
        assert!(matches!(init_error_tracking(&config), Err(CoreError::ErrorTracking(_))));
    }

    #[test]
    fn test_capture_error_records_event_with_context() {
        let events = sentry::test::with_captured_events(|| {
            let err = TestError { message: "quota exceeded".to_string() };
            capture_error(&err, Some(json!({"operation": "save_history", "key": "notifications"})));
        });

        assert_eq!(events.len(), 1);
        match events[0].contexts.get("Custom Context") {
            Some(sentry::protocol::Context::Other(map)) => {
                assert_eq!(map.get("operation"), Some(&json!("save_history")));
                assert_eq!(map.get("key"), Some(&json!("notifications")));
            }
            other => panic!("Unexpected context: {:?}", other),
        }
    }

    #[test]
    fn test_capture_error_wraps_non_object_context() {
        let events = sentry::test::with_captured_events(|| {
            let err = TestError { message: "corrupt".to_string() };
            capture_error(&err, Some(json!("load_history")));
        });

        match events[0].contexts.get("Custom Context") {
            Some(sentry::protocol::Context::Other(map)) => {
                assert_eq!(map.get("value"), Some(&json!("load_history")));
            }
            other => panic!("Unexpected context: {:?}", other),
        }
    }

    #[test]
    fn test_add_breadcrumb_without_client_is_noop() {
        add_breadcrumb("notifications", "hydrated", sentry::Level::Info);
    }
}
