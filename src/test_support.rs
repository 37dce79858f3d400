//! Recording test doubles for the player and display collaborators

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{DisplayError, PlayerError};
use crate::model::{ButtonId, ButtonSet, PlayState, PlayerClient, PlayerStatus, SongInfo};
use crate::view::{DisplayDevice, DisplayResult};

type PlayerResult<T> = Result<T, PlayerError>;

#[derive(Clone, Debug, PartialEq)]
pub enum Call {
    Status,
    RequestStatus,
    FetchStatus,
    CurrentSong,
    SetVolume(u8),
    Next,
    Previous,
    Seek(u32, f64),
    Play,
    Pause(bool),
    Ping,
    Disconnect,
}

#[derive(Default)]
struct PlayerState {
    calls: Vec<Call>,
    status: PlayerStatus,
    song: SongInfo,
    reject_seek: bool,
    offline: bool,
    fetch_delay: Option<Duration>,
}

/// Player double. Clones share state, so a test can keep one handle
/// while the code under test owns another.
#[derive(Clone, Default)]
pub struct MockPlayer {
    state: Arc<Mutex<PlayerState>>,
}

impl MockPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playing(song_id: u32, elapsed: f64, volume: u8) -> Self {
        let player = Self::new();
        player.set_status(PlayerStatus {
            state: PlayState::Playing,
            song_id: Some(song_id),
            elapsed_seconds: Some(elapsed),
            volume_percent: volume,
        });
        player
    }

    pub fn set_status(&self, status: PlayerStatus) {
        self.state.lock().unwrap().status = status;
    }

    pub fn set_song(&self, title: &str, artist: &str) {
        let mut state = self.state.lock().unwrap();
        state.song = SongInfo {
            id: state.status.song_id,
            title: Some(title.to_string()),
            artist: Some(artist.to_string()),
        };
    }

    pub fn reject_seek(&self, reject: bool) {
        self.state.lock().unwrap().reject_seek = reject;
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    /// Make every later `fetch_status` wait this long before replying
    pub fn set_fetch_delay(&self, delay: Option<Duration>) {
        self.state.lock().unwrap().fetch_delay = delay;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Calls other than status polling
    pub fn commands(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Status | Call::RequestStatus | Call::FetchStatus))
            .collect()
    }

    pub fn count(&self, call: &Call) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn record(&self, call: Call) -> PlayerResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.offline {
            Err(PlayerError::Disconnected)
        } else {
            Ok(())
        }
    }
}

impl PlayerClient for MockPlayer {
    async fn status(&mut self) -> PlayerResult<PlayerStatus> {
        self.record(Call::Status)?;
        Ok(self.state.lock().unwrap().status.clone())
    }

    async fn request_status(&mut self) -> PlayerResult<()> {
        self.record(Call::RequestStatus)
    }

    async fn fetch_status(&mut self) -> PlayerResult<PlayerStatus> {
        self.record(Call::FetchStatus)?;
        let delay = self.state.lock().unwrap().fetch_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.state.lock().unwrap().status.clone())
    }

    async fn current_song(&mut self) -> PlayerResult<SongInfo> {
        self.record(Call::CurrentSong)?;
        Ok(self.state.lock().unwrap().song.clone())
    }

    async fn set_volume(&mut self, volume: u8) -> PlayerResult<()> {
        self.record(Call::SetVolume(volume))
    }

    async fn next(&mut self) -> PlayerResult<()> {
        self.record(Call::Next)
    }

    async fn previous(&mut self) -> PlayerResult<()> {
        self.record(Call::Previous)
    }

    async fn seek(&mut self, song_id: u32, position_seconds: f64) -> PlayerResult<()> {
        self.record(Call::Seek(song_id, position_seconds))?;
        if self.state.lock().unwrap().reject_seek {
            return Err(PlayerError::Ack {
                code: 50,
                command: "seekid".to_string(),
                message: "No such song".to_string(),
            });
        }
        Ok(())
    }

    async fn play(&mut self) -> PlayerResult<()> {
        self.record(Call::Play)
    }

    async fn pause(&mut self, paused: bool) -> PlayerResult<()> {
        self.record(Call::Pause(paused))
    }

    async fn ping(&mut self) -> PlayerResult<()> {
        self.record(Call::Ping)
    }

    async fn disconnect(&mut self) -> PlayerResult<()> {
        self.record(Call::Disconnect)
    }
}

#[derive(Default)]
struct DisplayState {
    lines: [String; 2],
    writes: usize,
    clears: usize,
    backlight_calls: Vec<bool>,
    glyph_slots: Vec<u8>,
    pressed: ButtonSet,
    failing_reads: bool,
}

/// Display double recording what was drawn and serving scripted buttons
#[derive(Default)]
pub struct MockDisplay {
    state: Mutex<DisplayState>,
}

impl MockDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> [String; 2] {
        self.state.lock().unwrap().lines.clone()
    }

    pub fn writes(&self) -> usize {
        self.state.lock().unwrap().writes
    }

    pub fn clears(&self) -> usize {
        self.state.lock().unwrap().clears
    }

    pub fn backlight(&self) -> Option<bool> {
        self.state.lock().unwrap().backlight_calls.last().copied()
    }

    pub fn backlight_calls(&self) -> Vec<bool> {
        self.state.lock().unwrap().backlight_calls.clone()
    }

    pub fn glyph_slots(&self) -> Vec<u8> {
        self.state.lock().unwrap().glyph_slots.clone()
    }

    pub fn press(&self, button: ButtonId) {
        self.state.lock().unwrap().pressed.insert(button);
    }

    pub fn release_all(&self) {
        self.state.lock().unwrap().pressed = ButtonSet::empty();
    }

    pub fn fail_reads(&self, failing: bool) {
        self.state.lock().unwrap().failing_reads = failing;
    }
}

impl DisplayDevice for MockDisplay {
    fn clear(&self) -> DisplayResult<()> {
        let mut state = self.state.lock().unwrap();
        state.clears += 1;
        state.lines = [String::new(), String::new()];
        Ok(())
    }

    fn set_backlight(&self, on: bool) -> DisplayResult<()> {
        self.state.lock().unwrap().backlight_calls.push(on);
        Ok(())
    }

    fn write_line(&self, row: usize, text: &str) -> DisplayResult<()> {
        let mut state = self.state.lock().unwrap();
        if row >= state.lines.len() {
            return Err(DisplayError::InvalidRow(row));
        }
        state.lines[row] = text.to_string();
        state.writes += 1;
        Ok(())
    }

    fn define_glyph(&self, slot: u8, _bitmap: [u8; 8]) -> DisplayResult<()> {
        self.state.lock().unwrap().glyph_slots.push(slot);
        Ok(())
    }

    fn is_button_pressed(&self, button: ButtonId) -> DisplayResult<bool> {
        let state = self.state.lock().unwrap();
        if state.failing_reads {
            return Err(DisplayError::Io(std::io::Error::other("bus error")));
        }
        Ok(state.pressed.contains(button))
    }
}
