//! Turns drained actions into player commands
//!
//! Every action in a drain is resolved against the same status snapshot,
//! the one fetched at the start of the cycle. Volume actions accumulate a
//! pending delta on top of that snapshot's volume, so the daemon may see
//! several `set_volume` calls per cycle; a volume change made elsewhere
//! during the cycle is not observed until the next fetch.

use crate::error::{DispatchError, PlayerError};
use crate::model::{Action, PlayState, PlayerClient, PlayerStatus};
use crate::view::DisplayDevice;

pub fn target_volume(current: u8, delta: i32) -> u8 {
    (i32::from(current) + delta).clamp(0, 100) as u8
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PendingVolumeDelta(i32);

impl PendingVolumeDelta {
    pub fn add(&mut self, delta: i32) -> i32 {
        self.0 += delta;
        self.0
    }

    pub fn reset(&mut self) {
        self.0 = 0;
    }
}

pub struct CommandDispatcher {
    volume_step: i32,
    screen_on: bool,
    pending_volume: PendingVolumeDelta,
}

impl CommandDispatcher {
    pub fn new(volume_step: u8) -> Self {
        Self {
            volume_step: i32::from(volume_step),
            screen_on: true,
            pending_volume: PendingVolumeDelta::default(),
        }
    }

    pub fn screen_on(&self) -> bool {
        self.screen_on
    }

    /// Apply a full drain in order. Failures are logged per action and never
    /// stop the rest of the drain.
    pub async fn dispatch_all<P, D>(
        &mut self,
        actions: Vec<Action>,
        snapshot: &PlayerStatus,
        player: &mut P,
        display: &D,
    ) where
        P: PlayerClient,
        D: DisplayDevice + ?Sized,
    {
        for action in actions {
            let result = self.dispatch(action, snapshot, player, display).await;
            match &result {
                Err(DispatchError::SeekRejected(reason)) => {
                    tracing::warn!(reason = %reason, "Can't seek to beginning of song");
                }
                _ => crate::log_player_result!(action_name(action), result),
            }
        }
        self.pending_volume.reset();
    }

    async fn dispatch<P, D>(
        &mut self,
        action: Action,
        snapshot: &PlayerStatus,
        player: &mut P,
        display: &D,
    ) -> Result<(), DispatchError>
    where
        P: PlayerClient,
        D: DisplayDevice + ?Sized,
    {
        match action {
            Action::VolumeUp => self.change_volume(self.volume_step, snapshot, player).await?,
            Action::VolumeDown => self.change_volume(-self.volume_step, snapshot, player).await?,
            Action::Next => player.next().await?,
            Action::Previous => player.previous().await?,
            Action::Rewind => {
                let Some(song_id) = snapshot.song_id else {
                    return Err(DispatchError::SeekRejected("no current song".to_string()));
                };
                player.seek(song_id, 0.0).await.map_err(|e| match e {
                    PlayerError::Ack { message, .. } => DispatchError::SeekRejected(message),
                    other => DispatchError::Player(other),
                })?;
            }
            Action::PlayPause => match snapshot.state {
                PlayState::Stopped => player.play().await?,
                PlayState::Playing => player.pause(true).await?,
                PlayState::Paused => player.pause(false).await?,
            },
            Action::ToggleScreen => {
                let on = !self.screen_on;
                display.set_backlight(on)?;
                self.screen_on = on;
                tracing::info!(screen_on = self.screen_on(), "Backlight toggled");
            }
        }
        Ok(())
    }

    async fn change_volume<P: PlayerClient>(
        &mut self,
        delta: i32,
        snapshot: &PlayerStatus,
        player: &mut P,
    ) -> Result<(), PlayerError> {
        let pending = self.pending_volume.add(delta);
        let volume = target_volume(snapshot.volume_percent, pending);
        tracing::debug!(from = snapshot.volume_percent, pending, volume, "Setting volume");
        player.set_volume(volume).await
    }
}

fn action_name(action: Action) -> &'static str {
    match action {
        Action::VolumeUp => "volume_up",
        Action::VolumeDown => "volume_down",
        Action::Next => "next",
        Action::Previous => "previous",
        Action::Rewind => "rewind",
        Action::PlayPause => "play_pause",
        Action::ToggleScreen => "toggle_screen",
    }
}
