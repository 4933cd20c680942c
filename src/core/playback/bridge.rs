//! core/playback/bridge.rs
//! Wire codec for the webview bridge.
//!
//! One platform variant embeds the player as a web page inside a webview;
//! the page posts JSON messages for events, and commands go the other way as
//! evaluated JS calls. These shapes are the contract with the player page and
//! must not drift:
//!
//! ```text
//! {"type":"ready"}
//! {"type":"stateChange","stateCode":1}
//! {"type":"timeUpdate","currentTime":12.3,"duration":180.0}
//! {"type":"error","errorCode":100}
//! ```

use serde::Deserialize;

use crate::core::error::PlayerError;
use crate::core::playback::{PlayerCommand, PlayerEvent, WidgetState};

/// An incoming message from the player page, as posted.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BridgeMessage {
    Ready,
    StateChange { state_code: i32 },
    TimeUpdate { current_time: f64, duration: f64 },
    Error { error_code: i32 },
}

impl BridgeMessage {
    pub fn parse(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }

    /// Map to the store-facing event. Returns None for state codes this
    /// player version doesn't define.
    pub fn into_event(self) -> Option<PlayerEvent> {
        match self {
            BridgeMessage::Ready => Some(PlayerEvent::Ready),
            BridgeMessage::StateChange { state_code } => {
                WidgetState::from_code(state_code).map(PlayerEvent::StateChanged)
            }
            BridgeMessage::TimeUpdate {
                current_time,
                duration,
            } => Some(PlayerEvent::TimeUpdate {
                position: current_time,
                duration,
            }),
            BridgeMessage::Error { error_code } => {
                Some(PlayerEvent::Error(PlayerError::from_code(error_code)))
            }
        }
    }
}

/// Render a command as the JS call the player page exposes.
pub fn command_script(cmd: &PlayerCommand) -> String {
    match cmd {
        PlayerCommand::Load {
            video_id,
            start_seconds,
        } => format!("loadVideo('{video_id}', {start_seconds});"),
        PlayerCommand::Cue {
            video_id,
            start_seconds,
        } => format!("cueVideo('{video_id}', {start_seconds});"),
        PlayerCommand::Play => "playVideo();".to_string(),
        PlayerCommand::Pause => "pauseVideo();".to_string(),
        PlayerCommand::SeekTo(seconds) => format!("seekTo({seconds});"),
    }
}
