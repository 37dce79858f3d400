//! Status synchronizer: the slow, network-bound schedule
//!
//! Each cycle takes the status reply requested at the end of the previous
//! cycle, applies queued actions against it, pings when due, refreshes the
//! display buffer and requests the next status.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::model::{PlayState, PlayerClient, PlayerStatus, SharedDisplayBuffer};
use crate::view::format::{format_status_line, format_title};
use crate::view::DisplayDevice;
use super::dispatch::CommandDispatcher;
use super::queue::ActionReceiver;
use super::RunFlag;

#[derive(Clone, Debug)]
pub struct SyncSettings {
    pub interval: Duration,
    pub keepalive: Duration,
    pub buffer_wait: Duration,
    pub width: usize,
}

/// What the title line currently shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ShownTitle {
    Initial,
    Song(u32),
    Cleared,
}

enum TitleUpdate {
    Keep,
    Song(u32, String),
    Clear,
}

pub struct StatusSynchronizer<P, D: ?Sized> {
    player: P,
    display: Arc<D>,
    buffer: SharedDisplayBuffer,
    actions: ActionReceiver,
    dispatcher: CommandDispatcher,
    snapshot: PlayerStatus,
    shown: ShownTitle,
    last_ping: Instant,
    settings: SyncSettings,
}

impl<P, D> StatusSynchronizer<P, D>
where
    P: PlayerClient,
    D: DisplayDevice + ?Sized,
{
    pub fn new(
        player: P,
        display: Arc<D>,
        buffer: SharedDisplayBuffer,
        actions: ActionReceiver,
        dispatcher: CommandDispatcher,
        initial: PlayerStatus,
        settings: SyncSettings,
    ) -> Self {
        Self {
            player,
            display,
            buffer,
            actions,
            dispatcher,
            snapshot: initial,
            shown: ShownTitle::Initial,
            last_ping: Instant::now(),
            settings,
        }
    }

    #[cfg(test)]
    pub fn snapshot(&self) -> &PlayerStatus {
        &self.snapshot
    }

    /// Hand the player back for teardown
    pub fn into_player(self) -> P {
        self.player
    }

    /// Cycle until `run` stops
    pub async fn run(&mut self, run: &RunFlag) {
        let mut ticker = time::interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        if let Err(e) = self.player.request_status().await {
            tracing::warn!(error = %e, "Initial status request failed");
        }

        while run.is_running() {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = run.stopped() => break,
            }
            self.cycle().await;
        }
        tracing::info!(dropped_actions = self.actions.dropped(), "Status synchronizer stopped");
    }

    pub async fn cycle(&mut self) {
        match self.player.fetch_status().await {
            Ok(status) => self.snapshot = status,
            Err(e) => tracing::warn!(error = %e, "Status fetch failed, keeping last snapshot"),
        }

        let actions = self.actions.drain();
        if !actions.is_empty() {
            tracing::debug!(count = actions.len(), "Dispatching queued actions");
            self.dispatcher
                .dispatch_all(actions, &self.snapshot, &mut self.player, &*self.display)
                .await;
        }

        self.keepalive().await;
        self.refresh_display().await;

        if let Err(e) = self.player.request_status().await {
            tracing::warn!(error = %e, "Status request failed");
        }
    }

    async fn keepalive(&mut self) {
        if self.last_ping.elapsed() < self.settings.keepalive {
            return;
        }
        self.last_ping = Instant::now();
        match self.player.ping().await {
            Ok(()) => tracing::trace!("Keepalive sent"),
            Err(e) => tracing::warn!(error = %e, "Keepalive failed"),
        }
    }

    async fn title_update(&mut self) -> TitleUpdate {
        match self.snapshot.song_id {
            Some(id) if self.shown != ShownTitle::Song(id) => match self.player.current_song().await {
                Ok(song) => {
                    tracing::info!(
                        song_id = id,
                        title = ?song.title,
                        artist = ?song.artist,
                        "Song changed"
                    );
                    TitleUpdate::Song(id, format_title(&song, self.settings.width))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Could not fetch current song");
                    TitleUpdate::Keep
                }
            },
            None if self.snapshot.state == PlayState::Stopped && self.shown != ShownTitle::Cleared => {
                TitleUpdate::Clear
            }
            _ => TitleUpdate::Keep,
        }
    }

    async fn refresh_display(&mut self) {
        // Network work happens before taking the buffer so the lock stays short
        let title = self.title_update().await;
        let status_line = format_status_line(&self.snapshot, self.settings.width);

        let mut buffer = match time::timeout(self.settings.buffer_wait, self.buffer.lock()).await {
            Ok(guard) => guard,
            Err(_) => {
                tracing::warn!("Display buffer busy, skipping update");
                return;
            }
        };

        match title {
            TitleUpdate::Song(id, text) => {
                buffer.set_title(&text);
                buffer.request_scroll_reset();
                self.shown = ShownTitle::Song(id);
            }
            TitleUpdate::Clear => {
                buffer.clear_title();
                buffer.request_scroll_reset();
                self.shown = ShownTitle::Cleared;
            }
            TitleUpdate::Keep => {}
        }
        buffer.set_status_line(&status_line);
    }
}
