//! Core type definitions shared by both schedules

/// A physical button on the display plate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ButtonId {
    Up,
    Down,
    Left,
    Right,
    Select,
}

impl ButtonId {
    /// Idle-state sampling order. The first pressed button wins a tick.
    pub const PRIORITY: [ButtonId; 5] = [
        ButtonId::Up,
        ButtonId::Down,
        ButtonId::Right,
        ButtonId::Left,
        ButtonId::Select,
    ];

    fn bit(self) -> u8 {
        match self {
            ButtonId::Up => 1 << 0,
            ButtonId::Down => 1 << 1,
            ButtonId::Left => 1 << 2,
            ButtonId::Right => 1 << 3,
            ButtonId::Select => 1 << 4,
        }
    }

    pub fn index(self) -> usize {
        self.bit().trailing_zeros() as usize
    }
}

/// Snapshot of all button states, one bit per button
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonSet(u8);

impl ButtonSet {
    pub fn empty() -> Self {
        Self(0)
    }

    #[cfg(test)]
    pub fn with(mut self, button: ButtonId) -> Self {
        self.insert(button);
        self
    }

    pub fn insert(&mut self, button: ButtonId) {
        self.0 |= button.bit();
    }

    pub fn contains(self, button: ButtonId) -> bool {
        self.0 & button.bit() != 0
    }

    /// Highest-priority pressed button, if any
    pub fn first_pressed(self) -> Option<ButtonId> {
        ButtonId::PRIORITY.into_iter().find(|b| self.contains(*b))
    }
}

/// A high-level request produced by the input state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    VolumeUp,
    VolumeDown,
    Next,
    Previous,
    Rewind,
    PlayPause,
    ToggleScreen,
}

/// Playback state as reported by the player daemon
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlayState {
    Playing,
    Paused,
    #[default]
    Stopped,
}

impl PlayState {
    pub fn from_protocol(value: &str) -> Option<Self> {
        match value {
            "play" => Some(PlayState::Playing),
            "pause" => Some(PlayState::Paused),
            "stop" => Some(PlayState::Stopped),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_pressed_follows_priority() {
        let set = ButtonSet::empty()
            .with(ButtonId::Select)
            .with(ButtonId::Left)
            .with(ButtonId::Right);
        assert_eq!(set.first_pressed(), Some(ButtonId::Right));

        let set = ButtonSet::empty().with(ButtonId::Select).with(ButtonId::Down);
        assert_eq!(set.first_pressed(), Some(ButtonId::Down));

        assert_eq!(ButtonSet::empty().first_pressed(), None);
    }

    #[test]
    fn button_indices_are_distinct() {
        let mut seen = [false; 5];
        for button in ButtonId::PRIORITY {
            assert!(!seen[button.index()]);
            seen[button.index()] = true;
        }
    }

    #[test]
    fn play_state_parses_protocol_names() {
        assert_eq!(PlayState::from_protocol("play"), Some(PlayState::Playing));
        assert_eq!(PlayState::from_protocol("pause"), Some(PlayState::Paused));
        assert_eq!(PlayState::from_protocol("stop"), Some(PlayState::Stopped));
        assert_eq!(PlayState::from_protocol("idle"), None);
    }
}
