//! Debounced button state machine
//!
//! One button is tracked at a time. A press emits its action immediately
//! (SELECT waits for release to tell a short press from a long hold), then
//! the machine waits for that button to be released before sampling again.

use std::time::Duration;
use tokio::time::Instant;

use crate::model::{Action, ButtonId};
use crate::view::{DisplayDevice, DisplayResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DebounceState {
    Idle,
    Holdoff(ButtonId),
    Debounce { button: ButtonId, pressed_at: Instant },
}

pub struct InputStateMachine {
    state: DebounceState,
    last_left: Option<Instant>,
    hold: Duration,
    double_press: Duration,
}

impl InputStateMachine {
    /// `hold`: SELECT long-press threshold. `double_press`: LEFT window
    /// within which a second press means Previous instead of Rewind.
    pub fn new(hold: Duration, double_press: Duration) -> Self {
        Self {
            state: DebounceState::Idle,
            last_left: None,
            hold,
            double_press,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> DebounceState {
        self.state
    }

    /// Advance one tick. A failed button read leaves the state untouched.
    pub fn tick<D, F>(&mut self, now: Instant, buttons: &D, emit: &mut F) -> DisplayResult<()>
    where
        D: DisplayDevice + ?Sized,
        F: FnMut(Action),
    {
        if let DebounceState::Debounce { button, pressed_at } = self.state {
            if !buttons.is_button_pressed(button)? {
                self.state = DebounceState::Idle;
                if button == ButtonId::Select {
                    emit(self.select_action(now.saturating_duration_since(pressed_at)));
                }
            }
        }

        if let DebounceState::Holdoff(button) = self.state {
            self.state = DebounceState::Debounce { button, pressed_at: now };
            return Ok(());
        }

        if self.state == DebounceState::Idle {
            if let Some(button) = buttons.read_buttons()?.first_pressed() {
                self.state = DebounceState::Holdoff(button);
                if let Some(action) = self.press_action(button, now) {
                    emit(action);
                }
            }
        }
        Ok(())
    }

    fn select_action(&self, held: Duration) -> Action {
        if held >= self.hold {
            Action::ToggleScreen
        } else {
            Action::PlayPause
        }
    }

    fn press_action(&mut self, button: ButtonId, now: Instant) -> Option<Action> {
        match button {
            ButtonId::Up => Some(Action::VolumeUp),
            ButtonId::Down => Some(Action::VolumeDown),
            ButtonId::Right => Some(Action::Next),
            ButtonId::Left => {
                let action = match self.last_left {
                    Some(prev) if now.saturating_duration_since(prev) < self.double_press => {
                        Action::Previous
                    }
                    _ => Action::Rewind,
                };
                self.last_left = Some(now);
                Some(action)
            }
            // Decided on release
            ButtonId::Select => None,
        }
    }
}
