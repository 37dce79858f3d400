//! View module - Everything that draws on the display plate
//!
//! - `device`: Display plate interface (text rows, backlight, glyphs, buttons)
//! - `format`: Title and status line text
//! - `renderer`: Decimated renderer with circular title scroll
//! - `terminal`: crossterm-backed display plate

pub mod device;
pub mod format;
pub mod renderer;
pub mod terminal;

pub use device::{DisplayDevice, DisplayResult};
pub use renderer::Renderer;
pub use terminal::TerminalDisplay;

use format::VOLUME_GLYPHS;

/// Load the volume glyphs, light the backlight and show the startup splash
pub fn init_display<D: DisplayDevice + ?Sized>(display: &D) -> DisplayResult<()> {
    for (i, bitmap) in VOLUME_GLYPHS.iter().enumerate() {
        display.define_glyph(i as u8 + 1, *bitmap)?;
    }
    display.set_backlight(true)?;
    display.clear()?;
    display.write_line(0, "Getting player")?;
    display.write_line(1, "state...")?;
    Ok(())
}
