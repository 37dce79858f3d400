//! Player status snapshots and song metadata

use super::types::PlayState;

/// One `status` reply. Replaced wholesale every sync cycle.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct PlayerStatus {
    pub state: PlayState,
    pub song_id: Option<u32>,
    pub elapsed_seconds: Option<f64>,
    pub volume_percent: u8,
}

impl PlayerStatus {
    /// Build a snapshot from `key: value` reply pairs. Unknown keys are ignored.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut status = Self::default();
        for (key, value) in pairs {
            match key {
                "state" => {
                    if let Some(state) = PlayState::from_protocol(value) {
                        status.state = state;
                    }
                }
                "songid" => status.song_id = value.parse().ok(),
                "elapsed" => status.elapsed_seconds = value.parse().ok(),
                "volume" => {
                    // -1 means the daemon has no mixer
                    status.volume_percent = value
                        .parse::<i32>()
                        .map(|v| v.clamp(0, 100) as u8)
                        .unwrap_or(0);
                }
                _ => {}
            }
        }
        status
    }

    pub fn has_song(&self) -> bool {
        self.song_id.is_some()
    }
}

/// Metadata for the current song
#[derive(Clone, Debug, PartialEq, Default)]
pub struct SongInfo {
    pub id: Option<u32>,
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl SongInfo {
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut song = Self::default();
        for (key, value) in pairs {
            match key {
                "Id" => song.id = value.parse().ok(),
                "Title" => song.title = Some(value.to_string()),
                "Artist" => song.artist = Some(value.to_string()),
                _ => {}
            }
        }
        song
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_playing_status() {
        let status = PlayerStatus::from_pairs([
            ("volume", "63"),
            ("repeat", "0"),
            ("state", "play"),
            ("song", "4"),
            ("songid", "17"),
            ("elapsed", "125.400"),
        ]);
        assert_eq!(status.state, PlayState::Playing);
        assert_eq!(status.song_id, Some(17));
        assert_eq!(status.elapsed_seconds, Some(125.4));
        assert_eq!(status.volume_percent, 63);
    }

    #[test]
    fn stopped_status_has_no_song() {
        let status = PlayerStatus::from_pairs([("volume", "-1"), ("state", "stop")]);
        assert_eq!(status.state, PlayState::Stopped);
        assert!(!status.has_song());
        assert_eq!(status.elapsed_seconds, None);
        assert_eq!(status.volume_percent, 0);
    }

    #[test]
    fn volume_is_clamped() {
        let status = PlayerStatus::from_pairs([("volume", "250")]);
        assert_eq!(status.volume_percent, 100);
    }

    #[test]
    fn parses_current_song() {
        let song = SongInfo::from_pairs([
            ("file", "a/b.flac"),
            ("Title", "Song"),
            ("Artist", "Artist"),
            ("Id", "17"),
        ]);
        assert_eq!(song.id, Some(17));
        assert_eq!(song.title.as_deref(), Some("Song"));
        assert_eq!(song.artist.as_deref(), Some("Artist"));
    }
}
