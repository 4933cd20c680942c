//! core/error.rs
//! The advisory error taxonomy.
//!
//! Nothing here halts the store: catalog failures leave the previous playlist
//! in place and wait for the user to pick another decade; player errors are
//! displayed and self-heal via a timed skip to the next song. Errors travel
//! as ordinary data inside `PlaybackState`, never as panics across the
//! store/adapter boundary.

use thiserror::Error;

/// Anything the snapshot can report to the view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("No songs found for decade {decade} in the catalog")]
    CatalogEmpty { decade: String },

    #[error("Failed to read song catalog: {cause}")]
    CatalogRead { cause: String },

    #[error("Player error: {0}")]
    Player(#[from] PlayerError),
}

impl PlaybackError {
    /// Player errors recover by skipping ahead; catalog errors have no valid
    /// track to skip to.
    pub fn is_player(&self) -> bool {
        matches!(self, PlaybackError::Player(_))
    }
}

/// Widget-reported failures, mapped from the raw embedded-player codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("invalid video id")]
    InvalidId,

    #[error("video not found")]
    NotFound,

    #[error("playback restricted by the video owner")]
    Restricted,

    #[error("unknown player error (code {0})")]
    Unknown(i32),
}

impl PlayerError {
    /// Raw error codes posted by the embedded web player.
    pub fn from_code(code: i32) -> Self {
        match code {
            2 => PlayerError::InvalidId,
            100 => PlayerError::NotFound,
            101 | 150 => PlayerError::Restricted,
            other => PlayerError::Unknown(other),
        }
    }
}
