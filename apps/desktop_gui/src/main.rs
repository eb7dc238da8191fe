use std::{path::PathBuf, sync::Arc};

mod backend_bridge;
mod clipboard;
mod config;
mod controller;
mod notifications;
mod ui;

use anyhow::Context;
use clap::Parser;
use client_core::HttpCipherClient;
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::{
    backend_bridge::{commands::BackendCommand, runtime},
    clipboard::SystemClipboard,
    controller::{events::UiEvent, WorkflowController},
    notifications::NotificationCenter,
    ui::DesktopGuiApp,
};

const UI_COMMAND_QUEUE: usize = 256;
const UI_EVENT_QUEUE: usize = 2048;

#[derive(Parser, Debug)]
#[command(name = "cyber-sentinel", about = "Emoji cipher desktop client")]
struct Args {
    /// Base URL of the cipher service, e.g. http://127.0.0.1:5000
    #[arg(long)]
    server_url: Option<String>,
    /// Settings file; defaults to <config_dir>/cyber_sentinel/settings.toml
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let args = Args::parse();

    let settings = config::load_settings(args.config.as_deref(), args.server_url.as_deref())?;
    tracing::info!(server_url = %settings.server_url, "starting cyber sentinel");

    let service = HttpCipherClient::new(settings.server_url.clone())
        .context("failed to build cipher service client")?;

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(UI_COMMAND_QUEUE);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(UI_EVENT_QUEUE);
    let _backend = runtime::launch(Arc::new(service), cmd_rx, ui_tx);

    let controller = WorkflowController::new(
        cmd_tx,
        Box::new(SystemClipboard),
        NotificationCenter::new(settings.timing, settings.max_notifications),
    );
    let app = DesktopGuiApp::new(controller, ui_rx, settings.server_url);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Cyber Sentinel")
            .with_inner_size([980.0, 640.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Cyber Sentinel",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|err| anyhow::anyhow!("desktop ui exited with error: {err}"))
}
