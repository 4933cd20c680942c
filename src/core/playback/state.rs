//! core/playback/state.rs
//! The snapshot the view renders + the store's tunables.
//! Pure data definitions; all mutation happens in store.rs.

use std::time::Duration;

use crate::core::error::PlaybackError;
use crate::core::types::Track;

/// Everything the player screen needs to remember, as one value.
///
/// `is_playing` is the *intended* state, not necessarily what the widget is
/// doing this instant; reconciling the two is the store's job.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    /// Shuffled, decade-scoped playlist. Rebuilt wholesale on decade change.
    pub playlist: Vec<Track>,
    /// Index of the current track. Meaningless while `playlist` is empty.
    pub current_index: usize,
    /// Whether playback is *supposed* to be running.
    pub is_playing: bool,

    pub position_seconds: f64,
    /// 0.0 until the widget reports the real duration.
    pub duration_seconds: f64,

    /// True only while a catalog fetch is outstanding.
    pub is_loading: bool,
    pub error: Option<PlaybackError>,

    /// Decade tag driving the next catalog fetch.
    pub selected_decade: String,
    /// False right after a decade switch (there is no "previous" yet),
    /// true once the user has navigated within the playlist.
    pub prev_enabled: bool,
}

impl PlaybackState {
    pub(crate) fn new(decade: String) -> Self {
        Self {
            playlist: Vec::new(),
            current_index: 0,
            is_playing: false,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            is_loading: true,
            error: None,
            selected_decade: decade,
            prev_enabled: false,
        }
    }

    /// The one current track, or None while the playlist is empty.
    pub fn current_track(&self) -> Option<&Track> {
        self.playlist.get(self.current_index)
    }
}

/// Policy knobs the two original mobile implementations disagreed on.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Decade fetched at startup.
    pub initial_decade: String,

    /// Whether a decade switch starts playing the first track immediately
    /// (true -> `Load`) or leaves it cued (false -> `Cue`).
    pub autoplay_on_decade_change: bool,

    /// A widget PAUSED event is ignored while the position is below this
    /// threshold: a freshly loaded video surfaces a transient PAUSED before
    /// autoplay actually starts, and mirroring it would make every new track
    /// appear paused. Heuristic, not load-bearing.
    pub pause_guard_seconds: f64,

    /// How long a player error stays on screen before the store skips to the
    /// next track on its own.
    pub error_advance: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            initial_decade: "70".to_string(),
            autoplay_on_decade_change: false,
            pause_guard_seconds: 2.0,
            error_advance: Duration::from_secs(3),
        }
    }
}
