//! Unified error codes for the zone editor
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Zone errors
//! - 2xxx: Volunteer errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Resource not found
    NotFound = 3,
    /// Operation cancelled by the user
    Cancelled = 4,

    // ==================== 1xxx: Zone ====================
    /// Zone not found
    ZoneNotFound = 1001,
    /// Sub-zone not found
    SubZoneNotFound = 1002,
    /// Polygon has fewer than three distinct vertices or no area
    InvalidPolygon = 1003,
    /// Sub-zone polygon lies outside its parent zone
    SubZoneOutsideZone = 1004,
    /// Zone name is empty
    ZoneNameRequired = 1005,
    /// Map is a read-only view
    EditingDisabled = 1006,

    // ==================== 2xxx: Volunteer ====================
    /// Volunteer not found in the read model
    VolunteerNotFound = 2001,

    // ==================== 9xxx: System ====================
    /// Internal error
    InternalError = 9001,
    /// Document store rejected a write
    StoreWriteFailed = 9002,
    /// Document store unreachable
    StoreUnavailable = 9003,
    /// Map surface not initialized
    MapNotReady = 9004,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::Cancelled => "Operation cancelled",

            // Zone
            ErrorCode::ZoneNotFound => "Zone not found",
            ErrorCode::SubZoneNotFound => "Sub-zone not found",
            ErrorCode::InvalidPolygon => "Polygon needs at least three distinct vertices",
            ErrorCode::SubZoneOutsideZone => "Sub-zone must lie within its zone",
            ErrorCode::ZoneNameRequired => "Zone name is required",
            ErrorCode::EditingDisabled => "Zone editing is disabled on this map",

            // Volunteer
            ErrorCode::VolunteerNotFound => "Volunteer not found",

            // System
            ErrorCode::InternalError => "Internal error",
            ErrorCode::StoreWriteFailed => "Document store rejected the write",
            ErrorCode::StoreUnavailable => "Document store is unavailable",
            ErrorCode::MapNotReady => "Map is not ready",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::Cancelled),

            // Zone
            1001 => Ok(ErrorCode::ZoneNotFound),
            1002 => Ok(ErrorCode::SubZoneNotFound),
            1003 => Ok(ErrorCode::InvalidPolygon),
            1004 => Ok(ErrorCode::SubZoneOutsideZone),
            1005 => Ok(ErrorCode::ZoneNameRequired),
            1006 => Ok(ErrorCode::EditingDisabled),

            // Volunteer
            2001 => Ok(ErrorCode::VolunteerNotFound),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::StoreWriteFailed),
            9003 => Ok(ErrorCode::StoreUnavailable),
            9004 => Ok(ErrorCode::MapNotReady),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::ZoneNotFound.code(), 1001);
        assert_eq!(ErrorCode::VolunteerNotFound.code(), 2001);
        assert_eq!(ErrorCode::StoreWriteFailed.code(), 9002);
    }

    #[test]
    fn test_try_from_roundtrip() {
        for code in [
            ErrorCode::Cancelled,
            ErrorCode::InvalidPolygon,
            ErrorCode::SubZoneOutsideZone,
            ErrorCode::MapNotReady,
            ErrorCode::EditingDisabled,
        ] {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
        assert_eq!(ErrorCode::try_from(4242), Err(InvalidErrorCode(4242)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::SubZoneNotFound).unwrap();
        assert_eq!(json, "1002");

        let code: ErrorCode = serde_json::from_str("9003").unwrap();
        assert_eq!(code, ErrorCode::StoreUnavailable);
        assert!(serde_json::from_str::<ErrorCode>("77").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(ErrorCode::Cancelled.to_string(), "E0004");
        assert_eq!(ErrorCode::ZoneNotFound.to_string(), "E1001");
    }
}
