//! Character display plate interface

use crate::error::DisplayError;
use crate::model::{ButtonId, ButtonSet};

pub type DisplayResult<T> = Result<T, DisplayError>;

/// A two-line character display with a backlight and five buttons.
///
/// Calls must be quick: the input/render schedule calls them every tick.
pub trait DisplayDevice: Send + Sync {
    fn clear(&self) -> DisplayResult<()>;

    fn set_backlight(&self, on: bool) -> DisplayResult<()>;

    /// `row` is 0 or 1. Text is at most the display width.
    fn write_line(&self, row: usize, text: &str) -> DisplayResult<()>;

    /// Load a 5x8 custom glyph into `slot` (1..=7)
    fn define_glyph(&self, slot: u8, bitmap: [u8; 8]) -> DisplayResult<()>;

    fn is_button_pressed(&self, button: ButtonId) -> DisplayResult<bool>;

    /// Sample every button once
    fn read_buttons(&self) -> DisplayResult<ButtonSet> {
        let mut set = ButtonSet::empty();
        for button in ButtonId::PRIORITY {
            if self.is_button_pressed(button)? {
                set.insert(button);
            }
        }
        Ok(set)
    }

    /// Backlight off and blank. Used once at shutdown.
    fn power_down(&self) -> DisplayResult<()> {
        self.set_backlight(false)?;
        self.clear()
    }
}
