//! Decimated two-line renderer with a circular title scroll

use crate::model::{pad_to_width, DisplayBuffer, SharedDisplayBuffer};
use super::device::DisplayDevice;

/// Visible window of `title` starting at `offset`, wrapping around the
/// title's own length.
pub fn title_window(title: &str, offset: usize, width: usize) -> String {
    let len = title.chars().count();
    if len == 0 {
        return " ".repeat(width);
    }
    let window: String = title
        .chars()
        .cycle()
        .skip(offset % (len + 1))
        .take(width.min(len))
        .collect();
    pad_to_width(&window, width)
}

/// Compose both lines from the buffer, then advance the scroll
pub fn compose_frame(buffer: &mut DisplayBuffer) -> [String; 2] {
    buffer.take_scroll_reset();
    let top = title_window(buffer.title_text(), buffer.scroll_offset(), buffer.width());
    let bottom = buffer.status_line().to_string();
    buffer.advance_scroll();
    [top, bottom]
}

#[derive(Debug, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Not this tick's turn
    Idle,
    /// Buffer held by the writer; frame skipped
    Contended,
    Drawn,
}

pub struct Renderer {
    every: u32,
    count: u32,
}

impl Renderer {
    pub fn new(every: u32) -> Self {
        Self {
            every: every.max(1),
            count: 0,
        }
    }

    /// Called once per input tick. Draws every `every`th call and never
    /// waits for the buffer.
    pub fn tick<D: DisplayDevice + ?Sized>(
        &mut self,
        buffer: &SharedDisplayBuffer,
        display: &D,
    ) -> RenderOutcome {
        self.count += 1;
        if self.count < self.every {
            return RenderOutcome::Idle;
        }

        let frame = match buffer.try_lock() {
            Ok(mut guard) => compose_frame(&mut guard),
            Err(_) => {
                tracing::trace!("Display buffer busy, skipping frame");
                return RenderOutcome::Contended;
            }
        };
        self.count = 0;

        for (row, line) in frame.iter().enumerate() {
            if let Err(e) = display.write_line(row, line) {
                tracing::warn!(row, error = %e, "Display write failed");
            }
        }
        RenderOutcome::Drawn
    }
}
