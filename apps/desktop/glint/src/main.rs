// Prevents additional console window on Windows in release builds
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use glint::context::AppContext;
use glint::error::GlintError;
use glint::features;
use glint::logger::initialize as LoggerInitialize;
use glint::ui_loop::{self, Ticker};

use rpc_core::config::AppConfig;
use rpc_core::hub::{NotificationHub, NotificationSink};
use rpc_core::rpc::{MethodRegistry, RpcDispatcher};
use rpc_core::runtime::TaskRuntime;
use rpc_core::transport::{start_bridge, start_broadcast_server};

use common::ErrorLocation;

use std::fs::create_dir_all;
use std::sync::Arc;
use std::time::Duration;

use log::{info, warn};
use serde_json::json;

fn main() {
    if let Err(e) = run() {
        eprintln!("glint failed: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), GlintError> {
    // Logger FIRST
    let log_dir = dirs::data_local_dir()
        .map(|dir| dir.join("glint").join("logs"))
        .ok_or_else(|| GlintError::Glint {
            message: String::from("No local data directory for logs"),
            location: ErrorLocation::here(),
        })?;

    create_dir_all(&log_dir).map_err(|e| GlintError::Glint {
        message: format!("Failed to create log directory: {e}"),
        location: ErrorLocation::here(),
    })?;

    LoggerInitialize(&log_dir)?;

    info!("Glint shell starting");
    info!("Log directory: {}", log_dir.display());

    // Config: a rejected file falls back to defaults instead of refusing to
    // start; the diagnostic lands in the log.
    let config_dir = dirs::config_dir()
        .map(|dir| dir.join("glint"))
        .ok_or_else(|| GlintError::Glint {
            message: String::from("No config directory"),
            location: ErrorLocation::here(),
        })?;

    let config = match AppConfig::load(&config_dir) {
        Ok(config) => config,
        Err(e) => {
            warn!("Config rejected, using defaults: {e}");
            AppConfig::default()
        }
    };
    info!(
        "Config: broadcast port {}, {} worker thread(s) requested, {} ms poll interval",
        config.rpc.broadcast_port, config.rpc.worker_threads, config.ui.poll_interval_ms
    );

    let context = Arc::new(AppContext::new(config));

    // Task runtime: everything else schedules onto this pool.
    let runtime = Arc::new(TaskRuntime::new());
    runtime.start(context.config.rpc.worker_threads)?;

    // Startup composition: every feature registers before dispatch begins,
    // then the registry is frozen.
    let mut registry = MethodRegistry::new();
    features::register_methods(&mut registry, &context);
    info!("{} method(s) registered", registry.len());
    let registry = Arc::new(registry);

    let dispatcher = Arc::new(RpcDispatcher::new(
        Arc::clone(&registry),
        Arc::clone(&runtime),
    ));

    // Transports
    let (bridge, bridge_peer) = start_bridge(&runtime, Arc::clone(&dispatcher))?;
    let bridge = Arc::new(bridge);

    let handle = runtime.handle()?;
    let broadcast = handle.block_on(start_broadcast_server(
        context.config.rpc.broadcast_port,
        Arc::clone(&dispatcher),
        Arc::clone(&context.mailbox),
    ))?;
    let broadcast = Arc::new(broadcast);

    // Notification hub fanning out over both transports
    let mut hub = NotificationHub::new();
    hub.add_sink(Arc::clone(&bridge) as Arc<dyn NotificationSink>);
    hub.add_sink(Arc::clone(&broadcast) as Arc<dyn NotificationSink>);
    let hub = Arc::new(hub);

    // UI-affine effects route through the mailbox
    features::register_subscribers(&context, &hub);

    // Ctrl-C flips the same shutdown flag as app.shutdown
    let signal_context = Arc::clone(&context);
    runtime.submit(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            signal_context.request_shutdown();
        }
    })?;

    // Periodic status heartbeat over the hub
    let status_hub = Arc::clone(&hub);
    let status_context = Arc::clone(&context);
    let status_broadcast = Arc::clone(&broadcast);
    let status = Ticker::new(
        Duration::from_secs(context.config.notifications.status_interval_secs),
        Box::new(move || {
            status_hub.send(
                "app.status",
                json!({
                    "uptime_secs": status_context.uptime().as_secs(),
                    "subscribers": status_broadcast.connection_count(),
                }),
            );
        }),
    );

    // The main thread is the UI-affine thread; block it on the loop.
    ui_loop::run(&context, vec![status]);

    // Reverse of initialization: transports and features first, runtime last.
    info!("Shutting down");
    drop(bridge_peer);
    drop(hub);
    drop(broadcast);
    drop(bridge);
    runtime.stop();

    info!("Glint shell stopped");
    Ok(())
}
