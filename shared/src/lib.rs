//! Shared types for the zone editor
//!
//! Document models, polygon geometry, error codes and small utilities used
//! by the store and the synchronizer crates.

pub mod error;
pub mod geo;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode};
pub use models::{LatLng, Role, SubZone, User, Zone, ZoneCreate, ZonePatch};
pub use serde::{Deserialize, Serialize};
