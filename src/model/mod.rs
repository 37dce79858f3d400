//! Model module - Shared state and player-side data types
//!
//! - `types`: Buttons, actions and play state
//! - `status`: Player status snapshots and song metadata
//! - `display_buffer`: The two-line buffer shared by both schedules
//! - `player_client`: Player daemon interface
//! - `mpd_client`: MPD implementation of that interface

mod types;
mod status;
mod display_buffer;
mod player_client;
mod mpd_client;

pub use types::{Action, ButtonId, ButtonSet, PlayState};

pub use status::{PlayerStatus, SongInfo};

pub use display_buffer::{fit_to_width, pad_to_width, DisplayBuffer, SharedDisplayBuffer};

pub use player_client::PlayerClient;

pub use mpd_client::MpdClient;
