//! Player daemon interface consumed by the status/dispatch schedule

use std::future::Future;

use crate::error::PlayerError;
use super::status::{PlayerStatus, SongInfo};

pub type PlayerResult<T> = Result<T, PlayerError>;

/// Async RPC surface of the media-player daemon.
///
/// `request_status`/`fetch_status` split one status round trip in two so
/// the caller can do other work while the reply is in flight.
pub trait PlayerClient: Send {
    fn status(&mut self) -> impl Future<Output = PlayerResult<PlayerStatus>> + Send;

    fn request_status(&mut self) -> impl Future<Output = PlayerResult<()>> + Send;

    fn fetch_status(&mut self) -> impl Future<Output = PlayerResult<PlayerStatus>> + Send;

    fn current_song(&mut self) -> impl Future<Output = PlayerResult<SongInfo>> + Send;

    fn set_volume(&mut self, volume: u8) -> impl Future<Output = PlayerResult<()>> + Send;

    fn next(&mut self) -> impl Future<Output = PlayerResult<()>> + Send;

    fn previous(&mut self) -> impl Future<Output = PlayerResult<()>> + Send;

    fn seek(&mut self, song_id: u32, position_seconds: f64)
        -> impl Future<Output = PlayerResult<()>> + Send;

    fn play(&mut self) -> impl Future<Output = PlayerResult<()>> + Send;

    fn pause(&mut self, paused: bool) -> impl Future<Output = PlayerResult<()>> + Send;

    fn ping(&mut self) -> impl Future<Output = PlayerResult<()>> + Send;

    fn disconnect(&mut self) -> impl Future<Output = PlayerResult<()>> + Send;
}
