//! Controller module - The two schedules and what connects them
//!
//! - `input`: Debounced button state machine
//! - `queue`: Bounded action queue from input to dispatch
//! - `dispatch`: Action to player command mapping
//! - `sync`: Status synchronizer (slow, network-bound schedule)
//! - `panel`: Input + render loop (fast schedule)
//!
//! The schedules share nothing but the action queue and the display buffer.

mod input;
mod queue;
mod dispatch;
mod sync;
mod panel;

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::model::PlayerClient;
use crate::view::DisplayDevice;

pub use input::InputStateMachine;
pub use queue::ActionQueue;
pub use dispatch::CommandDispatcher;
pub use sync::{StatusSynchronizer, SyncSettings};
pub use panel::PanelLoop;

/// Process-wide running flag. Cleared once; never set again.
#[derive(Clone)]
pub struct RunFlag {
    tx: Arc<watch::Sender<bool>>,
}

impl RunFlag {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(true);
        Self { tx: Arc::new(tx) }
    }

    pub fn is_running(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn stop(&self) {
        self.tx.send_replace(false);
    }

    /// Resolves once `stop` has been called
    pub async fn stopped(&self) {
        let mut rx = self.tx.subscribe();
        let _ = rx.wait_for(|running| !running).await;
    }
}

impl Default for RunFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Ordered teardown: player first, then the background tasks in the order
/// given, then the display
pub async fn shutdown<P, D>(
    player: &mut P,
    tasks: impl IntoIterator<Item = (&'static str, JoinHandle<()>)>,
    display: &D,
) where
    P: PlayerClient,
    D: DisplayDevice + ?Sized,
{
    tracing::info!("Disconnecting...");
    if let Err(e) = player.disconnect().await {
        tracing::warn!(error = %e, "Disconnect failed");
    }

    for (name, task) in tasks {
        tracing::info!(task = name, "Waiting for task...");
        if let Err(e) = task.await {
            tracing::error!(task = name, error = %e, "Task ended abnormally");
        }
    }

    tracing::info!("Cleaning up display...");
    if let Err(e) = display.power_down() {
        tracing::warn!(error = %e, "Display power-down failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ButtonId, DisplayBuffer, PlayerStatus};
    use crate::test_support::{Call, MockDisplay, MockPlayer};
    use crate::view::Renderer;
    use std::time::Duration;
    use tokio::time;

    #[tokio::test]
    async fn run_flag_stops_all_clones() {
        let run = RunFlag::new();
        let other = run.clone();
        assert!(other.is_running());

        let waiter = tokio::spawn(async move { other.stopped().await });
        run.stop();
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert!(!run.is_running());
    }

    #[tokio::test]
    async fn stopped_resolves_after_the_fact() {
        let run = RunFlag::new();
        run.stop();
        tokio::time::timeout(Duration::from_secs(1), run.stopped())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn shutdown_disconnects_joins_and_powers_down() {
        let player = MockPlayer::new();
        let mut handle = player.clone();
        let display = MockDisplay::new();
        let run = RunFlag::new();
        let panel_run = run.clone();
        let panel = tokio::spawn(async move { panel_run.stopped().await });
        let keys = tokio::spawn(async {});

        run.stop();
        shutdown(&mut handle, [("panel", panel), ("keys", keys)], &display).await;

        assert_eq!(player.calls(), vec![Call::Disconnect]);
        assert_eq!(display.backlight(), Some(false));
        assert_eq!(display.clears(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn panel_keeps_running_while_player_stalls() {
        let player = MockPlayer::new();
        player.set_fetch_delay(Some(Duration::from_secs(3)));
        let display = Arc::new(MockDisplay::new());
        let buffer = DisplayBuffer::shared(16);
        let (sender, receiver) = ActionQueue::bounded(64);
        let run = RunFlag::new();

        let panel = PanelLoop::new(
            display.clone(),
            buffer.clone(),
            sender,
            InputStateMachine::new(Duration::from_secs(2), Duration::from_secs(2)),
            Renderer::new(5),
            Duration::from_millis(50),
            10,
        )
        .spawn(run.clone());

        let mut sync = StatusSynchronizer::new(
            player.clone(),
            display.clone(),
            buffer,
            receiver,
            CommandDispatcher::new(5),
            PlayerStatus::default(),
            SyncSettings {
                interval: Duration::from_millis(500),
                keepalive: Duration::from_secs(5),
                buffer_wait: Duration::from_millis(100),
                width: 16,
            },
        );
        let sync_run = run.clone();
        let sync = tokio::spawn(async move { sync.run(&sync_run).await });

        // The first fetch is stuck until 3s
        time::sleep(Duration::from_secs(1)).await;
        let early_writes = display.writes();
        assert!(early_writes > 0);

        display.press(ButtonId::Right);
        time::sleep(Duration::from_millis(200)).await;
        display.release_all();
        time::sleep(Duration::from_millis(300)).await;
        player.set_fetch_delay(None);

        time::sleep(Duration::from_secs(1)).await;
        assert!(display.writes() > early_writes);
        assert!(player.commands().is_empty());
        assert_eq!(player.count(&Call::FetchStatus), 1);

        time::sleep(Duration::from_secs(1)).await;
        assert_eq!(player.commands(), vec![Call::Next]);

        run.stop();
        panel.await.unwrap();
        sync.await.unwrap();
    }
}
