//! Terminal stand-in for the character LCD plate
//!
//! Draws the two display rows on an alternate screen and turns arrow keys
//! and Enter/Space into button presses.

use std::io::{self, Stdout, Write};
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::controller::RunFlag;
use crate::error::DisplayError;
use crate::model::ButtonId;
use super::device::{DisplayDevice, DisplayResult};

const ROWS: usize = 2;
const GLYPH_SLOTS: usize = 8;
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];
const HELP: &str = "arrows/enter: buttons   q: quit";

/// Pressed-state tracking for keys.
///
/// With release reporting a button is held until its release event.
/// Without it a button counts as held for `hold` after its latest
/// press or auto-repeat event.
pub struct ButtonLatch {
    hold: Duration,
    state: Mutex<LatchState>,
}

#[derive(Default)]
struct LatchState {
    last_seen: [Option<Instant>; 5],
    release_events: bool,
}

impl ButtonLatch {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            state: Mutex::new(LatchState::default()),
        }
    }

    fn state(&self) -> std::sync::MutexGuard<'_, LatchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_release_events(&self, enabled: bool) {
        self.state().release_events = enabled;
    }

    pub fn press(&self, button: ButtonId, now: Instant) {
        self.state().last_seen[button.index()] = Some(now);
    }

    pub fn release(&self, button: ButtonId) {
        self.state().last_seen[button.index()] = None;
    }

    pub fn is_pressed(&self, button: ButtonId, now: Instant) -> bool {
        let state = self.state();
        match state.last_seen[button.index()] {
            Some(_) if state.release_events => true,
            Some(seen) => now.saturating_duration_since(seen) < self.hold,
            None => false,
        }
    }
}

struct Screen {
    out: Stdout,
    lit: bool,
    glyphs: [char; GLYPH_SLOTS],
    lines: [String; ROWS],
}

impl Screen {
    fn colors(&self) -> (Color, Color) {
        if self.lit {
            (Color::Black, Color::Cyan)
        } else {
            (Color::DarkGrey, Color::Black)
        }
    }

    fn printable(&self, text: &str) -> String {
        text.chars()
            .map(|c| match c as u32 {
                slot @ 1..=7 => self.glyphs[slot as usize],
                _ if c.is_control() => ' ',
                _ => c,
            })
            .collect()
    }

    fn draw_row(&mut self, row: usize) -> io::Result<()> {
        let (fg, bg) = self.colors();
        let text = self.printable(&self.lines[row]);
        queue!(
            self.out,
            MoveTo(1, row as u16 + 1),
            SetForegroundColor(fg),
            SetBackgroundColor(bg),
            Print(text),
            ResetColor
        )
    }

    fn redraw(&mut self) -> io::Result<()> {
        for row in 0..ROWS {
            self.draw_row(row)?;
        }
        self.out.flush()
    }
}

pub struct TerminalDisplay {
    width: usize,
    enhanced_keys: bool,
    screen: Mutex<Screen>,
    buttons: ButtonLatch,
}

impl TerminalDisplay {
    pub fn new(width: usize, key_hold: Duration) -> DisplayResult<Self> {
        enable_raw_mode()?;
        let mut out = io::stdout();
        let enhanced_keys = terminal::supports_keyboard_enhancement().unwrap_or(false);
        setup_or_restore(
            || enter_screen(&mut out, enhanced_keys),
            || restore_terminal(enhanced_keys),
        )?;

        let buttons = ButtonLatch::new(key_hold);
        buttons.set_release_events(enhanced_keys);
        tracing::debug!(width, enhanced_keys, "Terminal display initialized");

        Ok(Self {
            width,
            enhanced_keys,
            screen: Mutex::new(Screen {
                out,
                lit: false,
                glyphs: [' '; GLYPH_SLOTS],
                lines: [" ".repeat(width), " ".repeat(width)],
            }),
            buttons,
        })
    }

    fn screen(&self) -> DisplayResult<std::sync::MutexGuard<'_, Screen>> {
        self.screen.lock().map_err(|_| DisplayError::Poisoned)
    }

    /// Read keyboard events into the button latch until `run` stops.
    /// A broken event stream stops `run` too, since raw mode leaves no
    /// other way to quit.
    pub fn spawn_key_reader(self: &Arc<Self>, run: RunFlag) -> JoinHandle<()> {
        let display = Arc::clone(self);
        tokio::spawn(async move {
            let mut events = EventStream::new();
            loop {
                tokio::select! {
                    _ = run.stopped() => break,
                    event = events.next() => {
                        if key_event(event, &display.buttons, &run).is_break() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("Key reader stopped");
        })
    }
}

/// Run `setup`; if it fails, run `restore` before returning the error
fn setup_or_restore<T>(
    setup: impl FnOnce() -> io::Result<T>,
    restore: impl FnOnce(),
) -> io::Result<T> {
    let result = setup();
    if result.is_err() {
        restore();
    }
    result
}

fn enter_screen(out: &mut Stdout, enhanced_keys: bool) -> io::Result<()> {
    execute!(out, EnterAlternateScreen, Hide, Clear(ClearType::All))?;
    if enhanced_keys {
        execute!(
            out,
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    execute!(out, MoveTo(1, ROWS as u16 + 2), Print(HELP))
}

fn restore_terminal(enhanced_keys: bool) {
    let mut out = io::stdout();
    if enhanced_keys {
        let _ = execute!(out, PopKeyboardEnhancementFlags);
    }
    let _ = execute!(out, ResetColor, Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

fn key_event(
    event: Option<io::Result<Event>>,
    buttons: &ButtonLatch,
    run: &RunFlag,
) -> ControlFlow<()> {
    match event {
        Some(Ok(Event::Key(key))) => handle_key(key, buttons, run),
        Some(Ok(_)) => {}
        Some(Err(e)) => {
            tracing::error!(error = %e, "Keyboard event stream failed, stopping");
            run.stop();
            return ControlFlow::Break(());
        }
        None => {
            tracing::error!("Keyboard event stream ended, stopping");
            run.stop();
            return ControlFlow::Break(());
        }
    }
    ControlFlow::Continue(())
}

fn handle_key(key: KeyEvent, buttons: &ButtonLatch, run: &RunFlag) {
    let quit = matches!(key.code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
        || (key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL));
    if quit {
        if key.kind == KeyEventKind::Press {
            tracing::info!("Quit requested from keyboard");
            run.stop();
        }
        return;
    }

    let Some(button) = key_button(key.code) else {
        return;
    };
    match key.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => buttons.press(button, Instant::now()),
        KeyEventKind::Release => buttons.release(button),
    }
}

fn key_button(code: KeyCode) -> Option<ButtonId> {
    match code {
        KeyCode::Up => Some(ButtonId::Up),
        KeyCode::Down => Some(ButtonId::Down),
        KeyCode::Left => Some(ButtonId::Left),
        KeyCode::Right => Some(ButtonId::Right),
        KeyCode::Enter | KeyCode::Char(' ') => Some(ButtonId::Select),
        _ => None,
    }
}

/// Block character whose height matches the number of lit bitmap rows
fn glyph_block(bitmap: &[u8; 8]) -> char {
    match bitmap.iter().filter(|row| **row != 0).count() {
        0 => ' ',
        rows => BLOCKS[rows - 1],
    }
}

impl DisplayDevice for TerminalDisplay {
    fn clear(&self) -> DisplayResult<()> {
        let mut screen = self.screen()?;
        screen.lines = [" ".repeat(self.width), " ".repeat(self.width)];
        screen.redraw()?;
        Ok(())
    }

    fn set_backlight(&self, on: bool) -> DisplayResult<()> {
        let mut screen = self.screen()?;
        screen.lit = on;
        screen.redraw()?;
        Ok(())
    }

    fn write_line(&self, row: usize, text: &str) -> DisplayResult<()> {
        if row >= ROWS {
            return Err(DisplayError::InvalidRow(row));
        }
        let mut screen = self.screen()?;
        screen.lines[row] = crate::model::fit_to_width(text, self.width);
        screen.draw_row(row)?;
        screen.out.flush()?;
        Ok(())
    }

    fn define_glyph(&self, slot: u8, bitmap: [u8; 8]) -> DisplayResult<()> {
        if slot as usize >= GLYPH_SLOTS {
            return Err(DisplayError::InvalidGlyphSlot(slot));
        }
        self.screen()?.glyphs[slot as usize] = glyph_block(&bitmap);
        Ok(())
    }

    fn is_button_pressed(&self, button: ButtonId) -> DisplayResult<bool> {
        Ok(self.buttons.is_pressed(button, Instant::now()))
    }
}

impl Drop for TerminalDisplay {
    fn drop(&mut self) {
        restore_terminal(self.enhanced_keys);
    }
}
