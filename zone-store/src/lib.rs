//! # zone-store
//!
//! Document store interfaces for the zone collection and the user read
//! model, plus an in-process implementation.
//!
//! The hosted store owns durability, ordering and fan-out; this crate only
//! describes the listen/write primitives the editor relies on.

mod error;
mod memory;
mod merge;
mod snapshot;
mod store;

// Re-exports
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use merge::merge_json;
pub use snapshot::{ZoneSnapshot, ZoneWrite};
pub use store::{UserDirectory, ZoneStore};
