use std::fmt::Display;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Failure of a single registry or telemetry operation.
///
/// Scoped to the call that produced it; nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("{entity} not found for device_id {device_id}")]
    NotFound {
        entity: &'static str,
        device_id: i32,
    },

    #[error("{operation} failed ({target}): {source}")]
    Store {
        operation: &'static str,
        target: String,
        #[source]
        source: BoxError,
    },
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, device_id: i32) -> Self {
        Self::NotFound { entity, device_id }
    }

    /// Wrap a store-level failure with the operation name and its target.
    pub fn store(operation: &'static str, target: impl Display, source: impl Into<BoxError>) -> Self {
        Self::Store {
            operation,
            target: target.to_string(),
            source: source.into(),
        }
    }
}

/// Raised when a lookup by unique key yields more than one row.
#[derive(Debug, Error)]
#[error("expected at most one row, got {0}")]
pub struct UnexpectedRowCount(pub usize);

pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_carries_operation_and_target() {
        let err = CoreError::store("delete device", "device_id=7", UnexpectedRowCount(2));
        let msg = err.to_string();
        assert!(msg.contains("delete device"));
        assert!(msg.contains("device_id=7"));
        assert!(msg.contains("got 2"));
    }

    #[test]
    fn store_error_exposes_source() {
        let err = CoreError::store("list devices", "all", UnexpectedRowCount(3));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "expected at most one row, got 3");
    }

    #[test]
    fn not_found_message_names_entity_and_device() {
        let err = CoreError::not_found("sensor reading", 4);
        assert_eq!(err.to_string(), "sensor reading not found for device_id 4");
    }
}
