//! Shared two-line display buffer
//!
//! The status synchronizer writes the title and status lines; the renderer
//! reads them and owns the scroll offset. Both go through the same mutex.

use std::sync::Arc;
use tokio::sync::Mutex;

pub type SharedDisplayBuffer = Arc<Mutex<DisplayBuffer>>;

const INITIAL_TITLE: &str = "unknown";

#[derive(Clone, Debug)]
pub struct DisplayBuffer {
    width: usize,
    title_text: String,
    title_len: usize,
    scroll_offset: usize,
    status_line: String,
    reset_requested: bool,
}

impl DisplayBuffer {
    pub fn new(width: usize) -> Self {
        let title_text = pad_to_width(INITIAL_TITLE, width);
        Self {
            width,
            title_len: title_text.chars().count(),
            title_text,
            scroll_offset: 0,
            status_line: " ".repeat(width),
            reset_requested: false,
        }
    }

    pub fn shared(width: usize) -> SharedDisplayBuffer {
        Arc::new(Mutex::new(Self::new(width)))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn title_text(&self) -> &str {
        &self.title_text
    }

    /// Title length in characters
    #[cfg(test)]
    pub fn title_len(&self) -> usize {
        self.title_len
    }

    pub fn status_line(&self) -> &str {
        &self.status_line
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    #[cfg(test)]
    pub fn reset_requested(&self) -> bool {
        self.reset_requested
    }

    /// Replace the title, padding it to the display width when shorter.
    /// Does not touch the scroll offset; pair with `request_scroll_reset`.
    pub fn set_title(&mut self, title: &str) {
        self.title_text = pad_to_width(title, self.width);
        self.title_len = self.title_text.chars().count();
        if self.scroll_offset > self.title_len {
            self.scroll_offset = 0;
        }
    }

    pub fn clear_title(&mut self) {
        self.set_title("");
    }

    /// Replace the status line. Always stored at exactly the display width.
    pub fn set_status_line(&mut self, line: &str) {
        self.status_line = fit_to_width(line, self.width);
    }

    pub fn request_scroll_reset(&mut self) {
        self.reset_requested = true;
    }

    /// Apply a pending scroll reset. Returns whether one was pending.
    pub fn take_scroll_reset(&mut self) -> bool {
        if self.reset_requested {
            self.reset_requested = false;
            self.scroll_offset = 0;
            true
        } else {
            false
        }
    }

    /// Move one character along, wrapping to 0 once past the title length
    pub fn advance_scroll(&mut self) {
        self.scroll_offset += 1;
        if self.scroll_offset > self.title_len {
            self.scroll_offset = 0;
        }
    }
}

/// Right-pad with spaces up to `width` characters. Longer text is kept whole.
pub fn pad_to_width(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        text.to_string()
    } else {
        format!("{}{}", text, " ".repeat(width - len))
    }
}

/// Pad or truncate to exactly `width` characters
pub fn fit_to_width(text: &str, width: usize) -> String {
    let truncated: String = text.chars().take(width).collect();
    pad_to_width(&truncated, width)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_padded_unknown_title() {
        let buffer = DisplayBuffer::new(16);
        assert_eq!(buffer.title_text(), "unknown         ");
        assert_eq!(buffer.status_line().len(), 16);
        assert_eq!(buffer.scroll_offset(), 0);
        assert!(!buffer.reset_requested());
    }

    #[test]
    fn long_titles_are_not_truncated() {
        let mut buffer = DisplayBuffer::new(8);
        buffer.set_title("A much longer title");
        assert_eq!(buffer.title_text(), "A much longer title");
        assert_eq!(buffer.title_len(), 19);
    }

    #[test]
    fn status_line_always_matches_width() {
        let mut buffer = DisplayBuffer::new(16);
        buffer.set_status_line("1:00");
        assert_eq!(buffer.status_line(), "1:00            ");
        buffer.set_status_line("this status line is far too long");
        assert_eq!(buffer.status_line().chars().count(), 16);
    }

    #[test]
    fn scroll_wraps_after_title_len_plus_one_steps() {
        let mut buffer = DisplayBuffer::new(16);
        buffer.set_title("Song [Artist] ");
        let len = buffer.title_len();
        for _ in 0..len {
            buffer.advance_scroll();
            assert!(buffer.scroll_offset() > 0);
            assert!(buffer.scroll_offset() < len + buffer.width());
        }
        buffer.advance_scroll();
        assert_eq!(buffer.scroll_offset(), 0);
    }

    #[test]
    fn reset_is_consumed_once() {
        let mut buffer = DisplayBuffer::new(16);
        buffer.advance_scroll();
        buffer.advance_scroll();
        buffer.request_scroll_reset();
        assert!(buffer.take_scroll_reset());
        assert_eq!(buffer.scroll_offset(), 0);
        assert!(!buffer.take_scroll_reset());
    }

    #[test]
    fn shorter_title_keeps_offset_in_bounds() {
        let mut buffer = DisplayBuffer::new(4);
        buffer.set_title("a rather long title");
        for _ in 0..15 {
            buffer.advance_scroll();
        }
        buffer.set_title("ab");
        assert!(buffer.scroll_offset() <= buffer.title_len());
    }
}
