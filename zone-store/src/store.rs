//! Store interfaces
//!
//! ```text
//!      ┌──────────────────────┐      ┌──────────────────────┐
//!      │   ZoneStore trait    │      │ UserDirectory trait  │
//!      └──────────┬───────────┘      └──────────┬───────────┘
//!                 │                             │
//!                 └──────────────┬──────────────┘
//!                                ▼
//!                           MemoryStore
//! ```
//!
//! Every accepted zone write is followed by a full [`ZoneSnapshot`] on the
//! subscription channel, including writes made by this client.

use async_trait::async_trait;
use shared::models::{Role, User, ZoneCreate, ZonePatch};
use tokio::sync::broadcast;

use crate::error::StoreResult;
use crate::snapshot::ZoneSnapshot;

/// Real-time zone collection
#[async_trait]
pub trait ZoneStore: Send + Sync + std::fmt::Debug {
    /// Write a whole document, replacing any existing one
    async fn set(&self, id: &str, doc: &ZoneCreate) -> StoreResult<()>;

    /// Merge-write the fields present in `patch`
    async fn merge(&self, id: &str, patch: &ZonePatch) -> StoreResult<()>;

    /// Delete a document (succeeds when already absent)
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Current state of the collection
    async fn snapshot(&self) -> StoreResult<ZoneSnapshot>;

    /// Receive a full snapshot after every change
    fn subscribe(&self) -> broadcast::Receiver<ZoneSnapshot>;
}

/// Read-only user collection
#[async_trait]
pub trait UserDirectory: Send + Sync + std::fmt::Debug {
    /// Users whose role matches, ordered by id
    async fn list_by_role(&self, role: Role) -> StoreResult<Vec<User>>;

    /// Receive the full user list after every change
    fn subscribe_users(&self) -> broadcast::Receiver<Vec<User>>;
}
