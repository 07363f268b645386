//! Data models
//!
//! Document shapes shared by the store and the synchronizer. Field names are
//! camelCase on the wire to match the documents written by the dashboard.

pub mod user;
pub mod zone;

// Re-exports
pub use user::*;
pub use zone::*;
