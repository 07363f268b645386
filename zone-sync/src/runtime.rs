//! Editor runtime
//!
//! Single task owning the synchronizer. Store snapshots, user list updates
//! and UI commands are all handled on this one loop, one at a time.
//!
//! ```text
//!   EditorHandle ──EditorRequest──┐
//!   ZoneStore ────ZoneSnapshot────┼──▶ EditorRuntime::run ──▶ ZoneSynchronizer
//!   UserDirectory ──Vec<User>─────┘
//! ```
//!
//! After each command the runtime applies any snapshots the command's own
//! write already produced, so the reply is sent once the write is visible.

use std::sync::Arc;

use shared::error::{AppError, ErrorCode};
use shared::models::{Role, User};
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use zone_store::{UserDirectory, ZoneSnapshot};

use crate::error::SyncResult;
use crate::map::{MapSurface, ShapeEvent, ShapeHandle};
use crate::prompt::Prompter;
use crate::synchronizer::{Outcome, ZoneSynchronizer};

const COMMAND_CHANNEL_CAPACITY: usize = 32;

/// UI command sent to the runtime
#[derive(Debug, Clone, PartialEq)]
pub enum EditorCommand {
    /// The map finished initializing
    MapReady,
    /// A listener on a rendered shape fired
    ShapeEdited(ShapeEvent),
    /// The drawing tool completed a polygon
    PolygonCompleted(ShapeHandle),
    BeginZone,
    BeginSubZone { zone_id: String },
    CancelDrawing,
    DeleteZone { zone_id: String },
    DeleteSubZone { zone_id: String, subzone_id: String },
    AssignVolunteer { zone_id: String, subzone_id: String, volunteer_id: String },
    RemoveVolunteer { zone_id: String, subzone_id: String, name: String },
}

impl EditorCommand {
    pub fn name(&self) -> &'static str {
        match self {
            EditorCommand::MapReady => "map_ready",
            EditorCommand::ShapeEdited(_) => "shape_edited",
            EditorCommand::PolygonCompleted(_) => "polygon_completed",
            EditorCommand::BeginZone => "begin_zone",
            EditorCommand::BeginSubZone { .. } => "begin_subzone",
            EditorCommand::CancelDrawing => "cancel_drawing",
            EditorCommand::DeleteZone { .. } => "delete_zone",
            EditorCommand::DeleteSubZone { .. } => "delete_subzone",
            EditorCommand::AssignVolunteer { .. } => "assign_volunteer",
            EditorCommand::RemoveVolunteer { .. } => "remove_volunteer",
        }
    }
}

/// Reply to a command
pub type CommandResult = Result<Outcome, AppError>;

/// A command with its reply channel
#[derive(Debug)]
pub struct EditorRequest {
    pub command: EditorCommand,
    pub reply: Option<oneshot::Sender<CommandResult>>,
}

/// Cloneable sender side of the runtime
#[derive(Debug, Clone)]
pub struct EditorHandle {
    tx: mpsc::Sender<EditorRequest>,
}

impl EditorHandle {
    /// Send a command and wait for its result
    pub async fn send(&self, command: EditorCommand) -> CommandResult {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(EditorRequest {
                command,
                reply: Some(reply_tx),
            })
            .await
            .map_err(|_| AppError::with_message(ErrorCode::Cancelled, "Editor runtime stopped"))?;
        reply_rx
            .await
            .map_err(|_| AppError::with_message(ErrorCode::Cancelled, "Editor runtime dropped the reply"))?
    }

    /// Send a command without waiting
    pub async fn dispatch(&self, command: EditorCommand) -> Result<(), AppError> {
        self.tx
            .send(EditorRequest {
                command,
                reply: None,
            })
            .await
            .map_err(|_| AppError::with_message(ErrorCode::Cancelled, "Editor runtime stopped"))
    }
}

/// Event loop around a [`ZoneSynchronizer`]
pub struct EditorRuntime<M, P> {
    sync: ZoneSynchronizer<M, P>,
    zone_rx: broadcast::Receiver<ZoneSnapshot>,
    user_rx: broadcast::Receiver<Vec<User>>,
    command_rx: mpsc::Receiver<EditorRequest>,
}

impl<M, P> EditorRuntime<M, P>
where
    M: MapSurface + Send,
    P: Prompter + Send,
{
    /// Subscribe to both collections, load their current state and return
    /// the runtime with a handle for sending commands
    pub async fn connect(
        mut sync: ZoneSynchronizer<M, P>,
        users: Arc<dyn UserDirectory>,
    ) -> SyncResult<(Self, EditorHandle)> {
        // Subscribe before reading so no change falls in between
        let zone_rx = sync.store.subscribe();
        let user_rx = users.subscribe_users();

        let snapshot = sync.store.snapshot().await?;
        let volunteers = users.list_by_role(Role::Volunteer).await?;
        tracing::info!(
            zones = snapshot.len(),
            volunteers = volunteers.len(),
            "Editor connected"
        );
        sync.apply_snapshot(snapshot);
        sync.apply_volunteers(volunteers);

        let (tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        Ok((
            Self {
                sync,
                zone_rx,
                user_rx,
                command_rx,
            },
            EditorHandle { tx },
        ))
    }

    pub fn synchronizer(&self) -> &ZoneSynchronizer<M, P> {
        &self.sync
    }

    /// Run until shutdown or until every handle is dropped
    ///
    /// Returns the synchronizer so its final state can be inspected.
    pub async fn run(mut self, shutdown: CancellationToken) -> ZoneSynchronizer<M, P> {
        tracing::info!("Editor runtime started");

        loop {
            tokio::select! {
                biased;

                _ = shutdown.cancelled() => {
                    tracing::info!("Editor runtime received shutdown signal");
                    break;
                }
                result = self.zone_rx.recv() => match result {
                    Ok(snapshot) => {
                        self.sync.apply_snapshot(snapshot);
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Zone subscription lagged, reloading");
                        self.reload().await;
                    }
                    Err(RecvError::Closed) => {
                        tracing::info!("Zone subscription closed, editor runtime stopping");
                        break;
                    }
                },
                result = self.user_rx.recv() => match result {
                    Ok(users) => self.sync.apply_volunteers(users),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "User subscription lagged");
                    }
                    Err(RecvError::Closed) => {
                        tracing::info!("User subscription closed, editor runtime stopping");
                        break;
                    }
                },
                request = self.command_rx.recv() => {
                    let Some(request) = request else {
                        tracing::info!("All editor handles dropped, editor runtime stopping");
                        break;
                    };
                    let name = request.command.name();
                    let result = self.execute(request.command).await;
                    self.drain_snapshots().await;

                    match &result {
                        Ok(Outcome::Skipped(skip)) => {
                            tracing::debug!(command = name, code = %skip.code(), reason = ?skip, "Command skipped");
                        }
                        Err(e) => tracing::debug!(command = name, code = %e.code, "Command failed"),
                        Ok(_) => {}
                    }
                    if let Some(reply) = request.reply {
                        // Receiver may have given up
                        let _ = reply.send(result);
                    }
                }
            }
        }

        tracing::info!("Editor runtime stopped");
        self.sync
    }

    async fn execute(&mut self, command: EditorCommand) -> CommandResult {
        let sync = &mut self.sync;
        let result = match command {
            EditorCommand::MapReady => {
                sync.mark_ready();
                Ok(Outcome::Local)
            }
            EditorCommand::ShapeEdited(event) => sync.handle_shape_event(event).await,
            EditorCommand::PolygonCompleted(handle) => sync.polygon_completed(handle).await,
            EditorCommand::BeginZone => Ok(sync.begin_zone()),
            EditorCommand::BeginSubZone { zone_id } => Ok(sync.begin_subzone(&zone_id)),
            EditorCommand::CancelDrawing => {
                sync.cancel_drawing();
                Ok(Outcome::Local)
            }
            EditorCommand::DeleteZone { zone_id } => sync.delete_zone(&zone_id).await,
            EditorCommand::DeleteSubZone {
                zone_id,
                subzone_id,
            } => sync.delete_subzone(&zone_id, &subzone_id).await,
            EditorCommand::AssignVolunteer {
                zone_id,
                subzone_id,
                volunteer_id,
            } => {
                sync.assign_volunteer(&zone_id, &subzone_id, &volunteer_id)
                    .await
            }
            EditorCommand::RemoveVolunteer {
                zone_id,
                subzone_id,
                name,
            } => sync.remove_volunteer(&zone_id, &subzone_id, &name).await,
        };
        result.map_err(|e| AppError::from(&e))
    }

    /// Apply snapshots already queued on the subscription
    async fn drain_snapshots(&mut self) {
        loop {
            match self.zone_rx.try_recv() {
                Ok(snapshot) => {
                    self.sync.apply_snapshot(snapshot);
                }
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Zone subscription lagged, reloading");
                    self.reload().await;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }

    async fn reload(&mut self) {
        match self.sync.store.snapshot().await {
            Ok(snapshot) => {
                self.sync.apply_snapshot(snapshot);
            }
            Err(e) => tracing::warn!(error = %e, "Failed to reload zones"),
        }
    }
}
