mod config;
mod controller;
mod error;
mod logging;
mod model;
mod view;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use anyhow::{Context, Result};
use clap::Parser;

use config::{Args, Config};
use controller::{
    ActionQueue, CommandDispatcher, InputStateMachine, PanelLoop, RunFlag, StatusSynchronizer,
    SyncSettings,
};
use model::{DisplayBuffer, MpdClient, PlayerClient, PlayerStatus};
use view::{DisplayDevice, Renderer, TerminalDisplay};

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if let Err(e) = logging::init_logging(&args.log_dir) {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== musicbox starting ===");

    let config = Config::try_from(args).context("invalid configuration")?;
    tracing::debug!(?config, "Configuration loaded");

    let display = Arc::new(
        TerminalDisplay::new(config.width, config.key_hold).context("failed to open display")?,
    );
    view::init_display(&*display).context("failed to initialize display")?;

    let (player, initial) = match connect(&config).await {
        Ok(connected) => connected,
        Err(e) => {
            tracing::error!(error = %e, "Could not reach player daemon");
            if let Err(e) = display.power_down() {
                tracing::warn!(error = %e, "Display power-down failed");
            }
            return Err(e);
        }
    };
    tracing::info!(
        state = ?initial.state,
        has_song = initial.has_song(),
        volume = initial.volume_percent,
        "Initial player status"
    );

    let run = RunFlag::new();
    let stopper = run.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, stopping");
            stopper.stop();
        }
    });

    let buffer = DisplayBuffer::shared(config.width);
    let (sender, receiver) = ActionQueue::bounded(config.queue_capacity);

    let panel = PanelLoop::new(
        display.clone(),
        buffer.clone(),
        sender,
        InputStateMachine::new(config.hold, config.double_press),
        Renderer::new(config.render_every),
        config.input_tick,
        config.max_input_faults,
    )
    .spawn(run.clone());
    let keys = display.spawn_key_reader(run.clone());

    let mut sync = StatusSynchronizer::new(
        player,
        display.clone(),
        buffer,
        receiver,
        CommandDispatcher::new(config.volume_step),
        initial,
        SyncSettings {
            interval: config.sync_interval,
            keepalive: config.keepalive,
            buffer_wait: config.buffer_wait,
            width: config.width,
        },
    );
    sync.run(&run).await;

    let mut player = sync.into_player();
    controller::shutdown(&mut player, [("input/render", panel), ("key reader", keys)], &*display)
        .await;

    tracing::info!("musicbox shutting down");
    Ok(())
}

async fn connect(config: &Config) -> Result<(MpdClient, PlayerStatus)> {
    tracing::info!(host = %config.host, port = config.port, "Connecting to player daemon...");
    let mut player = MpdClient::connect(&config.host, config.port, config.connect_timeout)
        .await
        .with_context(|| format!("failed to connect to {}:{}", config.host, config.port))?;
    tracing::info!(version = player.version(), "Connected");

    let status = player.status().await.context("failed to read initial player status")?;
    Ok((player, status))
}
