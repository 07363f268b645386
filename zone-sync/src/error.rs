//! Synchronizer error types

use shared::error::{AppError, ErrorCode};
use thiserror::Error;
use zone_store::StoreError;

/// Errors surfaced by synchronizer operations
///
/// Cancellations, declined confirmations and stale ids are not errors; they
/// come back as [`crate::Outcome::Skipped`].
#[derive(Debug, Error)]
pub enum SyncError {
    /// The document store rejected a write or delete
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A drawn or edited path cannot form a polygon
    #[error("Invalid polygon: {0}")]
    InvalidPolygon(String),

    /// A sub-zone path leaves its parent zone (containment enforced)
    #[error("Sub-zone {subzone} lies outside zone {zone_id}")]
    OutsideParent { zone_id: String, subzone: String },
}

impl SyncError {
    pub fn code(&self) -> ErrorCode {
        match self {
            SyncError::Store(e) => e.code(),
            SyncError::InvalidPolygon(_) => ErrorCode::InvalidPolygon,
            SyncError::OutsideParent { .. } => ErrorCode::SubZoneOutsideZone,
        }
    }
}

impl From<&SyncError> for AppError {
    fn from(err: &SyncError) -> Self {
        let app = AppError::with_message(err.code(), err.to_string());
        match err {
            SyncError::OutsideParent { zone_id, subzone } => app
                .with_detail("zone_id", zone_id.as_str())
                .with_detail("subzone", subzone.as_str()),
            _ => app,
        }
    }
}

/// Result type for synchronizer operations
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_store_error_code_passthrough() {
        let err = SyncError::from(StoreError::Unavailable("offline".to_string()));
        assert_eq!(err.code(), ErrorCode::StoreUnavailable);
        assert_eq!(err.to_string(), "Store error: Store unavailable: offline");
    }

    #[test]
    fn test_outside_parent_details() {
        let err = SyncError::OutsideParent {
            zone_id: "z1".to_string(),
            subzone: "Front".to_string(),
        };
        let app = AppError::from(&err);
        assert_eq!(app.code, ErrorCode::SubZoneOutsideZone);
        assert_eq!(app.detail("zone_id"), Some(&Value::from("z1")));
        assert_eq!(app.message, "Sub-zone Front lies outside zone z1");
    }
}
