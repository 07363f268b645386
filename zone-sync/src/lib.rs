//! # zone-sync
//!
//! Zone hierarchy synchronizer: keeps editable zone and sub-zone polygons on
//! an interactive map in step with the zone collection of a document store.
//!
//! ## 模块结构
//!
//! - [`synchronizer`] - snapshot intake, status and accessors
//! - [`reconcile`] - id-keyed shape registry (snapshot → shapes)
//! - [`edit`] - shape edits → merge-patches
//! - [`creation`] - drawing completion and [`CreationTarget`]
//! - [`actions`] - deletion and volunteer assignment
//! - [`map`] - map surface abstraction and in-memory map
//! - [`prompt`] - confirmation and name prompts
//! - [`runtime`] - async event loop and command handle
//! - [`config`] - environment configuration
//! - [`check`] - offline snapshot checks
//! - [`logger`] - logging setup

pub mod actions;
pub mod check;
pub mod config;
pub mod creation;
pub mod edit;
pub mod error;
pub mod logger;
pub mod map;
pub mod prompt;
pub mod reconcile;
pub mod runtime;
pub mod synchronizer;

// Re-exports
pub use actions::VolunteerOption;
pub use config::{EditMode, EditorConfig, MapOptions, ReconcileMode};
pub use creation::CreationTarget;
pub use error::{SyncError, SyncResult};
pub use map::{DrawingMode, EditEvent, InMemoryMap, MapSurface, ShapeEvent, ShapeHandle, ShapeStyle};
pub use prompt::{Answer, Prompter, ScriptedPrompter};
pub use reconcile::{ReconcileStats, ShapeKey, ShapeRegistry};
pub use runtime::{CommandResult, EditorCommand, EditorHandle, EditorRuntime};
pub use synchronizer::{Outcome, Skip, ZoneSynchronizer};
