//! zone-editor
//!
//! - `zone-editor check <file>`: validate a zone dump
//! - `zone-editor demo`: scripted edit session against the in-memory store

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use shared::models::{LatLng, Role, User};
use tokio_util::sync::CancellationToken;
use zone_store::{MemoryStore, ZoneWrite};
use zone_sync::check::{check_zones, load_zones};
use zone_sync::logger::init_logger_with_file;
use zone_sync::{
    Answer, EditorCommand, EditorConfig, EditorRuntime, InMemoryMap, ScriptedPrompter,
    ZoneSynchronizer,
};

#[derive(Debug, Parser)]
#[command(name = "zone-editor", version, about = "Zone hierarchy editor tools")]
struct Cli {
    /// Log level (trace, debug, info, warn, error); overrides LOG_LEVEL
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Write daily rolling logs to this directory; overrides LOG_DIR
    #[arg(long, global = true)]
    log_dir: Option<String>,

    /// Emit JSON log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Check polygons and sub-zone containment in a zone dump
    Check {
        /// JSON file with a zone array or a snapshot
        file: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Run a scripted editing session and print the resulting zones
    Demo,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = EditorConfig::from_env().with_logging(cli.log_level, cli.log_dir);
    init_logger_with_file(
        Some(&config.log_level),
        cli.json_logs,
        config.log_dir.as_deref(),
    );

    match cli.command {
        Command::Check { file, json } => check(&file, json),
        Command::Demo => demo(config).await,
    }
}

fn check(file: &std::path::Path, json: bool) -> anyhow::Result<ExitCode> {
    let zones = load_zones(file)?;
    let report = check_zones(&zones);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", report);
    }
    Ok(if report.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn square(lat: f64, lng: f64, size: f64) -> Vec<LatLng> {
    vec![
        LatLng::new(lat, lng),
        LatLng::new(lat, lng + size),
        LatLng::new(lat + size, lng + size),
        LatLng::new(lat + size, lng),
    ]
}

async fn demo(config: EditorConfig) -> anyhow::Result<ExitCode> {
    let center = config.map.center;

    let store = MemoryStore::new();
    store.put_user(User::new("u1", "Amit", Role::Volunteer));
    store.put_user(User::new("u2", "Neha", Role::Volunteer));

    let map = InMemoryMap::new();
    let prompter = ScriptedPrompter::with_answers([
        Answer::Text(Some("Main Stage".to_string())),
        Answer::Text(Some("Front Pit".to_string())),
    ]);
    let sync = ZoneSynchronizer::new(Arc::new(store.clone()), map.clone(), prompter, config);
    let (runtime, handle) = EditorRuntime::connect(sync, Arc::new(store.clone()))
        .await
        .context("Failed to connect editor")?;
    let shutdown = CancellationToken::new();
    let task = tokio::spawn(runtime.run(shutdown.clone()));

    map.set_ready(true);
    handle.dispatch(EditorCommand::MapReady).await?;

    // Zone around the map center
    let zone_path = square(center.lat - 0.001, center.lng - 0.001, 0.002);
    handle.send(EditorCommand::BeginZone).await?;
    let drawn = map.draw(&zone_path);
    let outcome = handle.send(EditorCommand::PolygonCompleted(drawn)).await?;
    let Some(ZoneWrite::Set { id: zone_id, .. }) = outcome.write() else {
        anyhow::bail!("Zone was not created: {:?}", outcome);
    };
    let zone_id = zone_id.clone();

    // Sub-zone in its south-west quarter
    handle
        .send(EditorCommand::BeginSubZone {
            zone_id: zone_id.clone(),
        })
        .await?;
    let drawn = map.draw(&square(center.lat - 0.0009, center.lng - 0.0009, 0.0008));
    let outcome = handle.send(EditorCommand::PolygonCompleted(drawn)).await?;
    let subzone_id = match outcome.write() {
        Some(ZoneWrite::Merge { patch, .. }) => patch
            .subzones
            .as_ref()
            .and_then(|s| s.last())
            .map(|sz| sz.id.clone()),
        _ => None,
    }
    .context("Sub-zone was not created")?;

    handle
        .send(EditorCommand::AssignVolunteer {
            zone_id: zone_id.clone(),
            subzone_id,
            volunteer_id: "u1".to_string(),
        })
        .await?;

    // Drag the zone's first vertex outward
    let zone_shape = map
        .paths()
        .into_iter()
        .find(|(_, path)| *path == zone_path)
        .map(|(handle, _)| handle)
        .context("Zone shape not rendered")?;
    let events = map.move_vertex(
        zone_shape,
        0,
        LatLng::new(center.lat - 0.0015, center.lng - 0.0015),
    );
    for event in events {
        handle.send(EditorCommand::ShapeEdited(event)).await?;
    }

    shutdown.cancel();
    let sync = task.await.context("Editor runtime panicked")?;
    tracing::info!(status = sync.status(), writes = store.writes().len(), "Demo finished");

    for write in store.writes() {
        println!("{} {}", write.kind(), write.doc_id());
    }
    println!("{}", serde_json::to_string_pretty(&sync.snapshot().zones)?);
    Ok(ExitCode::SUCCESS)
}
