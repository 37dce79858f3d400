//! Command line / environment configuration

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "musicbox")]
#[command(about = "Two-line LCD and five-button front panel for a music player daemon")]
#[command(version)]
pub struct Args {
    /// Player daemon host
    #[arg(long, default_value = "localhost", env = "MUSICBOX_HOST")]
    pub host: String,

    /// Player daemon port
    #[arg(short, long, default_value_t = 6600, env = "MUSICBOX_PORT")]
    pub port: u16,

    /// Connect and per-reply timeout
    #[arg(long, default_value_t = 10_000, env = "MUSICBOX_CONNECT_TIMEOUT_MS")]
    pub connect_timeout_ms: u64,

    /// Input + render tick period
    #[arg(long, default_value_t = 50, env = "MUSICBOX_INPUT_TICK_MS")]
    pub input_tick_ms: u64,

    /// Draw a frame every Nth input tick
    #[arg(long, default_value_t = 5, env = "MUSICBOX_RENDER_EVERY")]
    pub render_every: u32,

    /// Status + dispatch cycle period
    #[arg(long, default_value_t = 500, env = "MUSICBOX_SYNC_INTERVAL_MS")]
    pub sync_interval_ms: u64,

    /// Keepalive ping interval
    #[arg(long, default_value_t = 5000, env = "MUSICBOX_KEEPALIVE_MS")]
    pub keepalive_ms: u64,

    /// SELECT long-press threshold
    #[arg(long, default_value_t = 2000, env = "MUSICBOX_HOLD_MS")]
    pub hold_ms: u64,

    /// LEFT double-press window
    #[arg(long, default_value_t = 2000, env = "MUSICBOX_DOUBLE_PRESS_MS")]
    pub double_press_ms: u64,

    /// Volume change per press, in percent
    #[arg(long, default_value_t = 5, env = "MUSICBOX_VOLUME_STEP")]
    pub volume_step: u8,

    /// Display width in characters
    #[arg(short, long, default_value_t = 16, env = "MUSICBOX_WIDTH")]
    pub width: usize,

    /// Pending action limit
    #[arg(long, default_value_t = 64, env = "MUSICBOX_QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// How long the synchronizer waits for the display buffer
    #[arg(long, default_value_t = 100, env = "MUSICBOX_BUFFER_WAIT_MS")]
    pub buffer_wait_ms: u64,

    /// Consecutive button-read failures before input is disabled
    #[arg(long, default_value_t = 10, env = "MUSICBOX_MAX_INPUT_FAULTS")]
    pub max_input_faults: u32,

    /// Terminal only: how long a key press counts as held without release events
    #[arg(long, default_value_t = 600, env = "MUSICBOX_KEY_HOLD_MS")]
    pub key_hold_ms: u64,

    /// Log directory
    #[arg(long, default_value = ".logs", env = "MUSICBOX_LOG_DIR")]
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub connect_timeout: Duration,
    pub input_tick: Duration,
    pub render_every: u32,
    pub sync_interval: Duration,
    pub keepalive: Duration,
    pub hold: Duration,
    pub double_press: Duration,
    pub volume_step: u8,
    pub width: usize,
    pub queue_capacity: usize,
    pub buffer_wait: Duration,
    pub max_input_faults: u32,
    pub key_hold: Duration,
}

impl TryFrom<Args> for Config {
    type Error = anyhow::Error;

    fn try_from(args: Args) -> Result<Self> {
        if args.width < 4 {
            bail!("--width must be at least 4, got {}", args.width);
        }
        if args.render_every == 0 {
            bail!("--render-every must be at least 1");
        }
        if args.queue_capacity == 0 {
            bail!("--queue-capacity must be at least 1");
        }
        if args.volume_step > 100 {
            bail!("--volume-step must be at most 100, got {}", args.volume_step);
        }

        Ok(Self {
            connect_timeout: period("connect-timeout-ms", args.connect_timeout_ms)?,
            input_tick: period("input-tick-ms", args.input_tick_ms)?,
            sync_interval: period("sync-interval-ms", args.sync_interval_ms)?,
            keepalive: period("keepalive-ms", args.keepalive_ms)?,
            hold: period("hold-ms", args.hold_ms)?,
            double_press: period("double-press-ms", args.double_press_ms)?,
            buffer_wait: period("buffer-wait-ms", args.buffer_wait_ms)?,
            key_hold: period("key-hold-ms", args.key_hold_ms)?,
            host: args.host,
            port: args.port,
            render_every: args.render_every,
            volume_step: args.volume_step,
            width: args.width,
            queue_capacity: args.queue_capacity,
            max_input_faults: args.max_input_faults.max(1),
        })
    }
}

fn period(name: &str, millis: u64) -> Result<Duration> {
    if millis == 0 {
        bail!("--{name} must be greater than zero");
    }
    Ok(Duration::from_millis(millis))
}
