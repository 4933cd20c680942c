//! core/playback/mod.rs
//! Playback core module: the shared vocabulary of the loop
//! (actions in, commands and snapshots out) plus the store entry point.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::core::catalog::CatalogSource;
use crate::core::error::{PlaybackError, PlayerError};
use crate::core::types::Track;

pub mod adapter;
pub mod bridge;
pub mod state;

mod store;

use state::{PlaybackState, StoreConfig};
use store::PlaybackStore;

/// Handle for dispatching actions into the store.
///
/// Cheap to clone; hand one to the view, one to the adapter.
#[derive(Clone)]
pub struct StoreController {
    action_tx: Sender<Action>,
}

impl StoreController {
    /// Best-effort send. If the store thread died, the action is dropped.
    pub fn dispatch(&self, action: Action) {
        let _ = self.action_tx.send(action);
    }
}

/// "Something happened."
///
/// User gestures, catalog completions and widget events all funnel through
/// this one enum so the store can apply them strictly one at a time.
#[derive(Debug, Clone)]
pub enum Action {
    /// User picked a decade; kicks off an async catalog fetch.
    SelectDecade(String),
    /// Catalog fetch finished. Internal: sent by the fetch worker, tagged
    /// with the decade it was requested for so stale results can be dropped.
    CatalogLoaded {
        decade: String,
        result: Result<Vec<Track>, PlaybackError>,
    },

    TogglePlayPause,
    NextTrack,
    PreviousTrack,
    /// User finished dragging the seek slider.
    SeekTo(f64),
    DismissError,

    // App lifecycle
    WentToBackground,
    CameToForeground,

    /// Something the widget reported, relayed by the adapter.
    Player(PlayerEvent),

    Shutdown,
}

/// Store -> adapter. Side-effecting instructions, never stored.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    /// Load a video and start playing it at `start_seconds`.
    Load { video_id: String, start_seconds: f64 },
    /// Load a video but leave it paused at `start_seconds`.
    Cue { video_id: String, start_seconds: f64 },
    Play,
    Pause,
    SeekTo(f64),
}

/// Widget -> store. What the embedded player actually did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    /// Widget finished initializing and can take commands.
    Ready,
    StateChanged(WidgetState),
    /// High-frequency (~1 Hz) position report. Must never touch the playlist.
    TimeUpdate { position: f64, duration: f64 },
    Error(PlayerError),
}

/// The embedded player's own state codes, as posted over the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetState {
    Unstarted,
    Ended,
    Playing,
    Paused,
    Buffering,
    Cued,
}

impl WidgetState {
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(WidgetState::Unstarted),
            0 => Some(WidgetState::Ended),
            1 => Some(WidgetState::Playing),
            2 => Some(WidgetState::Paused),
            3 => Some(WidgetState::Buffering),
            5 => Some(WidgetState::Cued),
            _ => None,
        }
    }
}

/// Spawns the store thread and returns:
/// - `StoreController` (dispatch handle for view + adapter)
/// - `Receiver<PlaybackState>` (one snapshot per applied action, for the view)
/// - `Receiver<PlayerCommand>` (for the adapter to execute)
///
/// The store immediately fetches `config.initial_decade`, so the first
/// snapshots show `is_loading = true` and then the loaded playlist.
pub fn start_store(
    catalog: Arc<dyn CatalogSource>,
    config: StoreConfig,
) -> (
    StoreController,
    Receiver<PlaybackState>,
    Receiver<PlayerCommand>,
) {
    let (action_tx, action_rx) = mpsc::channel::<Action>();
    let (snapshot_tx, snapshot_rx) = mpsc::channel::<PlaybackState>();
    let (command_tx, command_rx) = mpsc::channel::<PlayerCommand>();

    let controller = StoreController { action_tx };
    let worker = controller.clone();

    thread::spawn(move || {
        let mut store = PlaybackStore::new(catalog, config, worker, snapshot_tx, command_tx);
        store.run(action_rx);
    });

    (controller, snapshot_rx, command_rx)
}
