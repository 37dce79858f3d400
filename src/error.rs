//! Error types for the player and display collaborators
//!
//! Every `PlayerError` is transient from the coordinator's point of view:
//! the call site logs it and the next cycle tries again.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlayerError {
    #[error("player I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("player timed out during {0}")]
    Timeout(&'static str),

    /// The daemon understood the command and refused it
    #[error("player rejected {command} (code {code}): {message}")]
    Ack {
        code: u32,
        command: String,
        message: String,
    },

    #[error("player protocol error: {0}")]
    Protocol(String),

    #[error("player connection closed")]
    Disconnected,
}

#[derive(Error, Debug)]
pub enum DisplayError {
    #[error("display I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("display state lock poisoned")]
    Poisoned,

    #[error("display has no row {0}")]
    InvalidRow(usize),

    #[error("display has no glyph slot {0}")]
    InvalidGlyphSlot(u8),
}

#[derive(Error, Debug)]
pub enum DispatchError {
    /// Seek refused, usually because nothing is queued
    #[error("seek rejected: {0}")]
    SeekRejected(String),

    #[error(transparent)]
    Player(#[from] PlayerError),

    #[error(transparent)]
    Display(#[from] DisplayError),
}
