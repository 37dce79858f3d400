//! Text formatting for the title and status lines

use crate::model::{fit_to_width, pad_to_width, PlayState, PlayerStatus, SongInfo};

/// Volume glyph bitmaps, empty through full, loaded into slots 1..=5
pub const VOLUME_GLYPHS: [[u8; 8]; 5] = [
    [0, 0, 0, 0, 0, 0, 0, 30],
    [0, 0, 0, 0, 0, 0, 16, 30],
    [0, 0, 0, 0, 8, 8, 24, 30],
    [0, 0, 4, 4, 12, 12, 28, 30],
    [2, 2, 6, 6, 14, 14, 30, 30],
];

/// Glyph slot for a volume level: floor(volume / 100 * 4) + 1, within 1..=5
pub fn volume_glyph(volume_percent: u8) -> u8 {
    let level = (f64::from(volume_percent) / 100.0 * 4.0).floor() as i64 + 1;
    level.clamp(1, VOLUME_GLYPHS.len() as i64) as u8
}

pub fn glyph_char(slot: u8) -> char {
    char::from(slot)
}

pub fn format_elapsed(elapsed_seconds: Option<f64>) -> String {
    let elapsed = elapsed_seconds.unwrap_or(0.0).max(0.0);
    let minutes = (elapsed / 60.0).floor() as u64;
    let seconds = (elapsed % 60.0).floor() as u64;
    format!("{}:{:02}", minutes, seconds)
}

/// `"{title} [{artist}] "`, padded to the display width
pub fn format_title(song: &SongInfo, width: usize) -> String {
    let title = song.title.as_deref().unwrap_or("No Title");
    let artist = song.artist.as_deref().unwrap_or("No Artist");
    pad_to_width(&format!("{} [{}] ", title, artist), width)
}

/// Elapsed text on the left, volume glyph in the last column
pub fn format_status_line(status: &PlayerStatus, width: usize) -> String {
    let text = match status.state {
        PlayState::Playing => format_elapsed(status.elapsed_seconds),
        PlayState::Paused => format!("{} paused", format_elapsed(status.elapsed_seconds)),
        PlayState::Stopped => "stopped".to_string(),
    };
    let left = fit_to_width(&text, width.saturating_sub(2));
    let line = format!("{} {}", left, glyph_char(volume_glyph(status.volume_percent)));
    fit_to_width(&line, width)
}
