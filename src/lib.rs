//! Vintage Radio playback core
//!
//! # What this crate is
//! The non-UI half of a "vintage radio" player: pick a decade, get a shuffled
//! playlist of songs from a bundled catalog, and drive an embedded video
//! widget (an external, opaque player) through play/pause/seek/next/previous.
//!
//! # How it works (simple mental model)
//! Think "video game loop", but message-based:
//!
//! - `PlaybackState` = the *entire memory* of the player screen
//! - `Action` = "something happened" (button tapped, catalog loaded,
//!   widget reported a state change)
//! - the store applies one action at a time and publishes a fresh snapshot
//!
//! The loop is closed: view/widget -> `Action` -> store -> `PlayerCommand` ->
//! adapter -> widget -> event -> `Action` -> store -> new snapshot -> view.
//! No other component holds mutable state.
//!
//! # The interesting part
//! The widget is authoritative for "is a frame actually rendering"; the store
//! is authoritative for "what should happen next". Keeping the two in sync
//! without feedback loops (a freshly loaded video surfaces a transient PAUSED
//! before autoplay kicks in, redundant commands cause restart flicker, stale
//! catalog fetches race decade switches) is what `core::playback` is about.
//!
//! # Architecture constraints (on purpose)
//! - The store runs on one thread; all state mutation happens in its loop.
//! - The adapter exclusively owns the widget; the store only emits commands.
//! - Errors are ordinary data in the snapshot, never panics or exceptions.

pub mod core;

pub use crate::core::catalog::{CatalogSource, FileCatalog, parse_catalog};
pub use crate::core::error::{PlaybackError, PlayerError};
pub use crate::core::playback::adapter::{PlayerAdapter, VideoWidget};
pub use crate::core::playback::bridge::{BridgeMessage, command_script};
pub use crate::core::playback::state::{PlaybackState, StoreConfig};
pub use crate::core::playback::{
    Action, PlayerCommand, PlayerEvent, StoreController, WidgetState, start_store,
};
pub use crate::core::types::Track;
