//! core/playback/store.rs
//! The playback store engine (single owner of `PlaybackState`).
//!
//! Owns:
//! - the state snapshot
//! - the serialized action loop + periodic tick
//! - the pending error auto-advance timer
//!
//! Catalog fetches run on worker threads and re-enter the loop as
//! `Action::CatalogLoaded`, so no lock is ever held across IO. Emits
//! `PlayerCommand` for the adapter and whole-state snapshots for the view.
//! No widget imports.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use rand::seq::SliceRandom;

use crate::core::catalog::CatalogSource;
use crate::core::error::{PlaybackError, PlayerError};
use crate::core::playback::state::{PlaybackState, StoreConfig};
use crate::core::playback::{Action, PlayerCommand, PlayerEvent, StoreController, WidgetState};
use crate::core::types::Track;

const TICK: Duration = Duration::from_millis(200);

/// A scheduled "skip past this error" that may still be cancelled.
///
/// The token pins the advance to the error that scheduled it: if a newer
/// error, a decade switch or manual navigation supersedes it before the
/// deadline, the fire-time check fails and the advance is dropped.
struct PendingAdvance {
    due: Instant,
    token: u64,
}

pub(crate) struct PlaybackStore {
    state: PlaybackState,
    config: StoreConfig,
    catalog: Arc<dyn CatalogSource>,

    /// Handle back into our own action queue, for fetch workers.
    actions: StoreController,
    snapshot_tx: Sender<PlaybackState>,
    command_tx: Sender<PlayerCommand>,

    pending_advance: Option<PendingAdvance>,
    error_token: u64,

    was_playing_before_background: bool,
}

impl PlaybackStore {
    pub(crate) fn new(
        catalog: Arc<dyn CatalogSource>,
        config: StoreConfig,
        actions: StoreController,
        snapshot_tx: Sender<PlaybackState>,
        command_tx: Sender<PlayerCommand>,
    ) -> Self {
        Self {
            state: PlaybackState::new(config.initial_decade.clone()),
            config,
            catalog,
            actions,
            snapshot_tx,
            command_tx,
            pending_advance: None,
            error_token: 0,
            was_playing_before_background: false,
        }
    }

    pub(crate) fn run(&mut self, action_rx: Receiver<Action>) {
        // The originals load their catalog as soon as the screen comes up.
        self.select_decade(self.config.initial_decade.clone());
        self.publish();

        loop {
            match action_rx.recv_timeout(TICK) {
                Ok(action) => {
                    if self.handle_action(action) {
                        break;
                    }
                    self.publish();

                    while let Ok(action) = action_rx.try_recv() {
                        if self.handle_action(action) {
                            return;
                        }
                        self.publish();
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            if self.tick() {
                self.publish();
            }
        }
    }

    /// Apply one action. Returns true on shutdown.
    fn handle_action(&mut self, action: Action) -> bool {
        debug!("action: {action:?}");

        match action {
            Action::SelectDecade(tag) => self.select_decade(tag),
            Action::CatalogLoaded { decade, result } => self.catalog_loaded(decade, result),

            Action::TogglePlayPause => self.toggle_play_pause(),
            Action::NextTrack => self.next_track(),
            Action::PreviousTrack => self.previous_track(),
            Action::SeekTo(seconds) => self.seek_to(seconds),
            Action::DismissError => self.dismiss_error(),

            Action::WentToBackground => self.went_to_background(),
            Action::CameToForeground => self.came_to_foreground(),

            Action::Player(event) => self.player_event(event),

            Action::Shutdown => return true,
        }

        false
    }

    /// Fire the scheduled error advance if it is due and still current.
    /// Returns true if state changed.
    fn tick(&mut self) -> bool {
        let Some(pending) = &self.pending_advance else {
            return false;
        };

        if Instant::now() < pending.due {
            return false;
        }

        let still_current = pending.token == self.error_token
            && self.state.error.as_ref().is_some_and(|e| e.is_player());

        self.pending_advance = None;

        if !still_current {
            debug!("dropping stale error advance");
            return false;
        }

        self.next_track();
        true
    }

    // --- user actions ------------------------------------------------------

    fn select_decade(&mut self, tag: String) {
        // A decade switch supersedes any scheduled error recovery and any
        // in-flight fetch (its completion will carry the wrong decade tag).
        self.cancel_pending_advance();

        self.state.selected_decade = tag.clone();
        self.state.is_loading = true;
        self.state.error = None;

        let catalog = Arc::clone(&self.catalog);
        let actions = self.actions.clone();
        thread::spawn(move || {
            let result = catalog.load(&tag);
            actions.dispatch(Action::CatalogLoaded {
                decade: tag,
                result,
            });
        });
    }

    fn catalog_loaded(&mut self, decade: String, result: Result<Vec<Track>, PlaybackError>) {
        if decade != self.state.selected_decade {
            debug!(
                "ignoring stale catalog result for decade {decade} (current: {})",
                self.state.selected_decade
            );
            return;
        }

        self.state.is_loading = false;

        match result {
            Ok(tracks) if !tracks.is_empty() => {
                let mut playlist = tracks;
                playlist.shuffle(&mut rand::thread_rng());

                self.state.playlist = playlist;
                self.state.current_index = 0;
                self.state.position_seconds = 0.0;
                self.state.duration_seconds = 0.0;
                self.state.is_playing = self.config.autoplay_on_decade_change;
                self.state.error = None;
                self.state.prev_enabled = false;

                self.load_current();
            }
            Ok(_) => {
                // Keep the previous playlist; just report the empty decade.
                self.state.is_playing = false;
                self.state.error = Some(PlaybackError::CatalogEmpty { decade });
            }
            Err(e) => {
                warn!("catalog load failed: {e}");
                self.state.is_playing = false;
                self.state.error = Some(e);
            }
        }
    }

    fn toggle_play_pause(&mut self) {
        if self.state.playlist.is_empty() {
            return;
        }

        self.state.is_playing = !self.state.is_playing;
        self.send(if self.state.is_playing {
            PlayerCommand::Play
        } else {
            PlayerCommand::Pause
        });
    }

    fn next_track(&mut self) {
        if self.state.playlist.is_empty() {
            return;
        }

        self.cancel_pending_advance();

        let len = self.state.playlist.len();
        self.begin_track((self.state.current_index + 1) % len);
    }

    fn previous_track(&mut self) {
        if self.state.playlist.is_empty() {
            return;
        }

        self.cancel_pending_advance();

        let len = self.state.playlist.len();
        self.begin_track((self.state.current_index + len - 1) % len);
    }

    /// Common tail of Next/Previous: jump to `index` and start it playing.
    fn begin_track(&mut self, index: usize) {
        self.state.current_index = index;
        self.state.position_seconds = 0.0;
        self.state.duration_seconds = 0.0;
        self.state.is_playing = true;
        self.state.error = None;
        self.state.prev_enabled = true;

        self.load_current();
    }

    fn seek_to(&mut self, seconds: f64) {
        if self.state.playlist.is_empty() {
            return;
        }

        let seconds = seconds.max(0.0);
        self.state.position_seconds = seconds;
        self.send(PlayerCommand::SeekTo(seconds));
        // Intended play/pause state is untouched: seeking while paused stays
        // paused.
    }

    fn dismiss_error(&mut self) {
        let Some(error) = self.state.error.take() else {
            return;
        };

        if error.is_player() {
            // Dismissing a player error doubles as "skip this song", matching
            // the timed auto-advance it preempts.
            self.next_track();
        }
        // Catalog errors just clear: there is no valid track to advance to.
    }

    fn went_to_background(&mut self) {
        self.was_playing_before_background = self.state.is_playing;

        if self.state.is_playing {
            self.state.is_playing = false;
            self.send(PlayerCommand::Pause);
        }
    }

    fn came_to_foreground(&mut self) {
        if self.was_playing_before_background && !self.state.playlist.is_empty() {
            self.state.is_playing = true;
            self.send(PlayerCommand::Play);
        }
        self.was_playing_before_background = false;
    }

    // --- widget events -----------------------------------------------------

    fn player_event(&mut self, event: PlayerEvent) {
        match event {
            PlayerEvent::Ready => {
                // Widget (re)initialized: restore the current track at the
                // current offset, honoring the intended play state.
                if let Some(track) = self.state.current_track() {
                    let cmd = if self.state.is_playing {
                        PlayerCommand::Load {
                            video_id: track.video_id.clone(),
                            start_seconds: self.state.position_seconds,
                        }
                    } else {
                        PlayerCommand::Cue {
                            video_id: track.video_id.clone(),
                            start_seconds: self.state.position_seconds,
                        }
                    };
                    self.send(cmd);
                }
            }

            PlayerEvent::StateChanged(WidgetState::Playing) => {
                // Widget started even though we didn't think so (native
                // controls, autoplay kicking in). Follow it.
                if !self.state.is_playing && !self.state.playlist.is_empty() {
                    self.state.is_playing = true;
                }
            }

            PlayerEvent::StateChanged(WidgetState::Paused) => {
                // A just-loaded video surfaces a transient PAUSED before the
                // play command takes effect; mirroring it would fight the
                // intention to play. Only sync a pause once playback has
                // measurably progressed.
                if self.state.is_playing {
                    if self.state.position_seconds >= self.config.pause_guard_seconds {
                        self.state.is_playing = false;
                    } else {
                        debug!("suppressing transient pause near track start");
                    }
                }
            }

            PlayerEvent::StateChanged(WidgetState::Ended) => {
                // Sole auto-advance trigger besides explicit user action.
                self.next_track();
            }

            PlayerEvent::StateChanged(
                WidgetState::Buffering | WidgetState::Cued | WidgetState::Unstarted,
            ) => {}

            PlayerEvent::TimeUpdate { position, duration } => {
                if self.state.playlist.is_empty() {
                    return;
                }
                // Last write wins; a stale report racing a user seek is
                // acceptable jitter.
                self.state.position_seconds = position.max(0.0);
                self.state.duration_seconds = duration.max(0.0);
            }

            PlayerEvent::Error(error) => self.player_error(error),
        }
    }

    fn player_error(&mut self, error: PlayerError) {
        warn!("widget error: {error}");

        self.state.error = Some(PlaybackError::Player(error));
        self.state.is_playing = false;
        self.state.is_loading = false;

        // Schedule the recovery skip, superseding any earlier one.
        self.error_token += 1;
        self.pending_advance = Some(PendingAdvance {
            due: Instant::now() + self.config.error_advance,
            token: self.error_token,
        });
    }

    // --- plumbing ----------------------------------------------------------

    fn cancel_pending_advance(&mut self) {
        self.pending_advance = None;
    }

    /// Emit the Load/Cue for the current track from the start.
    fn load_current(&mut self) {
        let Some(track) = self.state.current_track() else {
            return;
        };

        let video_id = track.video_id.clone();
        let cmd = if self.state.is_playing {
            PlayerCommand::Load {
                video_id,
                start_seconds: 0.0,
            }
        } else {
            PlayerCommand::Cue {
                video_id,
                start_seconds: 0.0,
            }
        };
        self.send(cmd);
    }

    /// Best-effort command send. If the adapter is gone, the command drops.
    fn send(&self, cmd: PlayerCommand) {
        debug!("command: {cmd:?}");
        let _ = self.command_tx.send(cmd);
    }

    fn publish(&self) {
        let _ = self.snapshot_tx.send(self.state.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    struct EmptyCatalog;

    impl CatalogSource for EmptyCatalog {
        fn load(&self, _decade: &str) -> Result<Vec<Track>, PlaybackError> {
            Ok(Vec::new())
        }
    }

    fn track(n: usize) -> Track {
        Track {
            decade: "70".into(),
            year: "1971".into(),
            band: format!("Band {n}"),
            title: format!("Song {n}"),
            video_id: format!("video-{n}"),
        }
    }

    /// Store wired to channels the test owns, state mutated synchronously.
    fn make_store() -> (
        PlaybackStore,
        Receiver<Action>,
        Receiver<PlaybackState>,
        Receiver<PlayerCommand>,
    ) {
        let (action_tx, action_rx) = mpsc::channel();
        let (snapshot_tx, snapshot_rx) = mpsc::channel();
        let (command_tx, command_rx) = mpsc::channel();

        let store = PlaybackStore::new(
            Arc::new(EmptyCatalog),
            StoreConfig::default(),
            StoreController { action_tx },
            snapshot_tx,
            command_tx,
        );

        (store, action_rx, snapshot_rx, command_rx)
    }

    /// Store preloaded with an n-track playlist, as after a successful fetch.
    fn loaded_store(n: usize) -> (PlaybackStore, Receiver<PlayerCommand>) {
        let (mut store, _actions, _snapshots, commands) = make_store();
        store.catalog_loaded("70".into(), Ok((0..n).map(track).collect()));
        // Drain the Cue emitted by the load.
        while commands.try_recv().is_ok() {}
        (store, commands)
    }

    #[test]
    fn successful_load_resets_to_first_track() {
        let (mut store, _a, _s, commands) = make_store();
        store.state.is_loading = true;

        store.catalog_loaded("70".into(), Ok(vec![track(0), track(1)]));

        assert!(!store.state.is_loading);
        assert!(store.state.error.is_none());
        assert_eq!(store.state.playlist.len(), 2);
        assert_eq!(store.state.current_index, 0);
        assert_eq!(store.state.position_seconds, 0.0);
        assert!(!store.state.is_playing, "no autoplay on decade change");
        assert!(!store.state.prev_enabled);

        // Cued, not loaded, because autoplay is off by default.
        match commands.try_recv() {
            Ok(PlayerCommand::Cue { start_seconds, .. }) => assert_eq!(start_seconds, 0.0),
            other => panic!("expected Cue, got {other:?}"),
        }
    }

    #[test]
    fn autoplay_config_emits_load_instead_of_cue() {
        let (action_tx, _action_rx) = mpsc::channel();
        let (snapshot_tx, _snapshot_rx) = mpsc::channel();
        let (command_tx, commands) = mpsc::channel();
        let mut store = PlaybackStore::new(
            Arc::new(EmptyCatalog),
            StoreConfig {
                autoplay_on_decade_change: true,
                ..StoreConfig::default()
            },
            StoreController { action_tx },
            snapshot_tx,
            command_tx,
        );

        store.catalog_loaded("70".into(), Ok(vec![track(0)]));

        assert!(store.state.is_playing);
        assert!(matches!(commands.try_recv(), Ok(PlayerCommand::Load { .. })));
    }

    #[test]
    fn empty_load_reports_error_and_keeps_playlist() {
        let (mut store, _a, _s, _c) = make_store();
        store.catalog_loaded("70".into(), Ok(vec![track(0), track(1)]));

        store.state.selected_decade = "60".into();
        store.catalog_loaded("60".into(), Ok(Vec::new()));

        assert!(!store.state.is_loading);
        assert_eq!(
            store.state.error,
            Some(PlaybackError::CatalogEmpty {
                decade: "60".into()
            })
        );
        assert_eq!(store.state.playlist.len(), 2, "playlist untouched");
        assert!(!store.state.is_playing);
    }

    #[test]
    fn stale_catalog_result_is_dropped() {
        let (mut store, _a, _s, _c) = make_store();
        store.state.selected_decade = "80".into();

        // Completion for a decade the user has already navigated away from.
        store.catalog_loaded("70".into(), Ok(vec![track(0)]));

        assert!(store.state.playlist.is_empty());
        assert!(store.state.error.is_none());
    }

    #[test]
    fn toggle_is_a_noop_on_empty_playlist() {
        let (mut store, _a, _s, commands) = make_store();

        store.toggle_play_pause();

        assert!(!store.state.is_playing);
        assert!(commands.try_recv().is_err(), "no command emitted");
    }

    #[test]
    fn toggle_flips_intent_and_commands_the_widget() {
        let (mut store, commands) = loaded_store(2);

        store.toggle_play_pause();
        assert!(store.state.is_playing);
        assert_eq!(commands.try_recv().unwrap(), PlayerCommand::Play);

        store.toggle_play_pause();
        assert!(!store.state.is_playing);
        assert_eq!(commands.try_recv().unwrap(), PlayerCommand::Pause);
    }

    #[test]
    fn next_then_previous_returns_to_start() {
        for len in 1..=4 {
            let (mut store, _commands) = loaded_store(len);
            store.next_track();
            store.previous_track();
            assert_eq!(store.state.current_index, 0, "len {len}");
        }
    }

    #[test]
    fn next_n_times_lands_on_n_mod_len() {
        let len = 3;
        let (mut store, _commands) = loaded_store(len);

        for n in 1..=7 {
            store.next_track();
            assert_eq!(store.state.current_index, n % len);
        }
    }

    #[test]
    fn wraparound_scenario_two_tracks() {
        let (mut store, _commands) = loaded_store(2);
        assert_eq!(store.state.current_index, 0);

        store.next_track();
        assert_eq!(store.state.current_index, 1);
        store.next_track();
        assert_eq!(store.state.current_index, 0, "wrapped forward");
        store.previous_track();
        assert_eq!(store.state.current_index, 1, "wrapped backward");
    }

    #[test]
    fn navigation_starts_playback_and_emits_load() {
        let (mut store, commands) = loaded_store(2);

        store.next_track();

        assert!(store.state.is_playing);
        assert_eq!(store.state.position_seconds, 0.0);
        assert_eq!(store.state.duration_seconds, 0.0);
        assert!(store.state.prev_enabled);
        match commands.try_recv() {
            Ok(PlayerCommand::Load { video_id, .. }) => assert_eq!(video_id, "video-1"),
            other => panic!("expected Load, got {other:?}"),
        }
    }

    #[test]
    fn seek_updates_position_but_not_intent() {
        let (mut store, commands) = loaded_store(1);
        assert!(!store.state.is_playing);

        store.seek_to(42.5);

        assert_eq!(store.state.position_seconds, 42.5);
        assert!(!store.state.is_playing, "seek must not alter play intent");
        assert_eq!(commands.try_recv().unwrap(), PlayerCommand::SeekTo(42.5));
    }

    #[test]
    fn seek_on_empty_playlist_is_a_noop() {
        let (mut store, _a, _s, commands) = make_store();
        store.seek_to(10.0);
        assert_eq!(store.state.position_seconds, 0.0);
        assert!(commands.try_recv().is_err());
    }

    #[test]
    fn transient_pause_near_start_is_suppressed() {
        let (mut store, _commands) = loaded_store(2);
        store.next_track(); // is_playing = true, position 0

        store.player_event(PlayerEvent::StateChanged(WidgetState::Paused));

        assert!(store.state.is_playing, "guard held");
    }

    #[test]
    fn pause_after_guard_threshold_syncs() {
        let (mut store, _commands) = loaded_store(2);
        store.next_track();
        store.player_event(PlayerEvent::TimeUpdate {
            position: 2.0,
            duration: 180.0,
        });

        store.player_event(PlayerEvent::StateChanged(WidgetState::Paused));

        assert!(!store.state.is_playing);
    }

    #[test]
    fn unexpected_playing_report_syncs_intent() {
        let (mut store, _commands) = loaded_store(1);
        assert!(!store.state.is_playing);

        store.player_event(PlayerEvent::StateChanged(WidgetState::Playing));

        assert!(store.state.is_playing);
    }

    #[test]
    fn ended_advances_exactly_one_track() {
        let (mut store, _commands) = loaded_store(3);

        store.player_event(PlayerEvent::StateChanged(WidgetState::Ended));

        assert_eq!(store.state.current_index, 1);
        assert!(store.state.is_playing);
    }

    #[test]
    fn buffering_and_cued_are_ignored() {
        let (mut store, commands) = loaded_store(1);

        store.player_event(PlayerEvent::StateChanged(WidgetState::Buffering));
        store.player_event(PlayerEvent::StateChanged(WidgetState::Cued));
        store.player_event(PlayerEvent::StateChanged(WidgetState::Unstarted));

        assert!(!store.state.is_playing);
        assert!(commands.try_recv().is_err());
    }

    #[test]
    fn time_updates_never_touch_the_playlist() {
        let (mut store, _commands) = loaded_store(2);

        store.player_event(PlayerEvent::TimeUpdate {
            position: 93.0,
            duration: 222.0,
        });

        assert_eq!(store.state.position_seconds, 93.0);
        assert_eq!(store.state.duration_seconds, 222.0);
        assert_eq!(store.state.current_index, 0);
    }

    #[test]
    fn ready_reissues_current_track_at_current_position() {
        let (mut store, commands) = loaded_store(1);
        store.state.position_seconds = 17.0;

        store.player_event(PlayerEvent::Ready);

        // Not playing, so the track is cued, not loaded.
        match commands.try_recv() {
            Ok(PlayerCommand::Cue {
                video_id,
                start_seconds,
            }) => {
                assert_eq!(video_id, "video-0");
                assert_eq!(start_seconds, 17.0);
            }
            other => panic!("expected Cue, got {other:?}"),
        }
    }

    #[test]
    fn player_error_schedules_advance_and_tick_fires_it() {
        let (mut store, _commands) = loaded_store(2);
        store.config.error_advance = Duration::ZERO;
        store.next_track(); // index 1
        assert_eq!(store.state.current_index, 1);

        store.player_event(PlayerEvent::Error(PlayerError::Restricted));
        assert!(!store.state.is_playing);
        assert!(store.state.error.as_ref().unwrap().is_player());

        assert!(store.tick(), "advance fired");
        assert_eq!(store.state.current_index, 0, "wrapped to next track");
        assert!(store.state.is_playing);
        assert!(store.state.error.is_none());

        assert!(!store.tick(), "fires exactly once");
        assert_eq!(store.state.current_index, 0);
    }

    #[test]
    fn decade_switch_cancels_scheduled_advance() {
        let (mut store, _commands) = loaded_store(2);
        store.config.error_advance = Duration::ZERO;

        store.player_event(PlayerEvent::Error(PlayerError::NotFound));
        store.select_decade("80".into());

        assert!(!store.tick(), "superseded advance must not fire");
        assert_eq!(store.state.current_index, 0);
    }

    #[test]
    fn manual_skip_cancels_scheduled_advance() {
        let (mut store, _commands) = loaded_store(3);
        store.config.error_advance = Duration::ZERO;

        store.player_event(PlayerEvent::Error(PlayerError::Unknown(5)));
        store.next_track();
        assert_eq!(store.state.current_index, 1);

        assert!(!store.tick());
        assert_eq!(store.state.current_index, 1, "no double skip");
    }

    #[test]
    fn newer_error_supersedes_older_advance() {
        let (mut store, _commands) = loaded_store(3);

        store.player_event(PlayerEvent::Error(PlayerError::NotFound));
        let first = store.pending_advance.as_ref().unwrap().token;
        store.player_event(PlayerEvent::Error(PlayerError::Restricted));
        let second = store.pending_advance.as_ref().unwrap().token;

        assert_ne!(first, second);
    }

    #[test]
    fn dismissing_a_player_error_skips_ahead() {
        let (mut store, _commands) = loaded_store(2);
        store.player_event(PlayerEvent::Error(PlayerError::InvalidId));

        store.dismiss_error();

        assert!(store.state.error.is_none());
        assert_eq!(store.state.current_index, 1);
        assert!(store.state.is_playing);
    }

    #[test]
    fn dismissing_a_catalog_error_only_clears() {
        let (mut store, _a, _s, _c) = make_store();
        store.state.selected_decade = "60".into();
        store.catalog_loaded("60".into(), Ok(Vec::new()));
        assert!(store.state.error.is_some());

        store.dismiss_error();

        assert!(store.state.error.is_none());
        assert!(store.state.playlist.is_empty(), "nothing to advance to");
        assert!(!store.state.is_playing);
    }

    #[test]
    fn background_pause_and_foreground_resume() {
        let (mut store, commands) = loaded_store(1);
        store.toggle_play_pause();
        assert!(store.state.is_playing);
        let _ = commands.try_recv();

        store.went_to_background();
        assert!(!store.state.is_playing);
        assert_eq!(commands.try_recv().unwrap(), PlayerCommand::Pause);

        store.came_to_foreground();
        assert!(store.state.is_playing, "intent restored");
        assert_eq!(commands.try_recv().unwrap(), PlayerCommand::Play);
    }

    #[test]
    fn foreground_does_not_resume_if_it_was_paused() {
        let (mut store, commands) = loaded_store(1);

        store.went_to_background();
        store.came_to_foreground();

        assert!(!store.state.is_playing);
        assert!(commands.try_recv().is_err());
    }
}
