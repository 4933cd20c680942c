//! core/playback/adapter.rs
//! Store <-> widget translation.
//!
//! The adapter is the only component allowed to touch the embedded player:
//! it executes store commands against the `VideoWidget` surface and relays
//! widget events back as store actions. It also enforces the command
//! discipline: the widget must never receive a redundant call (re-loading the
//! video it already has causes a visible restart, re-sending play while
//! playing causes flicker), so it remembers the last commanded video id, the
//! last widget-reported state and the last commanded seek target.

use log::{debug, warn};

use crate::core::playback::bridge::BridgeMessage;
use crate::core::playback::{Action, PlayerCommand, PlayerEvent, StoreController, WidgetState};

/// Redundant seeks within this window are dropped.
const SEEK_EPSILON_SECONDS: f64 = 1.0;

/// The command surface of the embedded player.
///
/// Implementations wrap whatever the platform provides (a webview running the
/// player page, a native player view); tests use a recording mock.
pub trait VideoWidget {
    /// Load a video and start playing from `start_seconds`.
    fn load_video(&mut self, video_id: &str, start_seconds: f64);
    /// Load a video, paused, showing the frame at `start_seconds`.
    fn cue_video(&mut self, video_id: &str, start_seconds: f64);
    fn play(&mut self);
    fn pause(&mut self);
    fn seek_to(&mut self, seconds: f64);
}

/// Exclusive owner of one widget instance.
pub struct PlayerAdapter<W: VideoWidget> {
    widget: W,
    store: StoreController,

    last_video_id: Option<String>,
    last_widget_state: Option<WidgetState>,
    last_seek_seconds: f64,
}

impl<W: VideoWidget> PlayerAdapter<W> {
    pub fn new(widget: W, store: StoreController) -> Self {
        Self {
            widget,
            store,
            last_video_id: None,
            last_widget_state: None,
            last_seek_seconds: 0.0,
        }
    }

    /// Execute one store command against the widget, unless it is redundant.
    pub fn apply(&mut self, cmd: PlayerCommand) {
        match cmd {
            PlayerCommand::Load {
                video_id,
                start_seconds,
            } => {
                if self.last_video_id.as_deref() == Some(video_id.as_str()) {
                    debug!("skipping Load: {video_id} already loaded");
                    return;
                }
                self.widget.load_video(&video_id, start_seconds);
                self.last_video_id = Some(video_id);
                self.last_seek_seconds = start_seconds;
            }

            PlayerCommand::Cue {
                video_id,
                start_seconds,
            } => {
                if self.last_video_id.as_deref() == Some(video_id.as_str()) {
                    debug!("skipping Cue: {video_id} already loaded");
                    return;
                }
                self.widget.cue_video(&video_id, start_seconds);
                self.last_video_id = Some(video_id);
                self.last_seek_seconds = start_seconds;
            }

            PlayerCommand::Play => {
                if self.last_widget_state == Some(WidgetState::Playing) {
                    debug!("skipping Play: widget already playing");
                    return;
                }
                self.widget.play();
            }

            PlayerCommand::Pause => {
                if self.last_widget_state == Some(WidgetState::Paused) {
                    debug!("skipping Pause: widget already paused");
                    return;
                }
                self.widget.pause();
            }

            PlayerCommand::SeekTo(seconds) => {
                if (seconds - self.last_seek_seconds).abs() <= SEEK_EPSILON_SECONDS {
                    debug!("skipping SeekTo({seconds}): within epsilon of last seek");
                    return;
                }
                self.widget.seek_to(seconds);
                self.last_seek_seconds = seconds;
            }
        }
    }

    /// Relay one widget event to the store.
    pub fn on_event(&mut self, event: PlayerEvent) {
        if let PlayerEvent::StateChanged(state) = event {
            self.last_widget_state = Some(state);
        }
        self.store.dispatch(Action::Player(event));
    }

    /// Decode a raw bridge payload and relay it. Malformed or unknown
    /// messages are logged and dropped; the widget boundary is advisory.
    pub fn on_bridge_message(&mut self, raw: &str) {
        let message = match BridgeMessage::parse(raw) {
            Ok(m) => m,
            Err(e) => {
                warn!("unparseable bridge message: {e} ({raw})");
                return;
            }
        };

        match message.into_event() {
            Some(event) => self.on_event(event),
            None => debug!("ignoring bridge message with unknown state code"),
        }
    }

    /// The wrapped widget (e.g. for view embedding or teardown).
    pub fn widget(&self) -> &W {
        &self.widget
    }

    /// New widget instance (e.g. the webview reloaded): forget command
    /// history so the next Load/Play goes through.
    pub fn reset(&mut self) {
        self.last_video_id = None;
        self.last_widget_state = None;
        self.last_seek_seconds = 0.0;
    }
}
