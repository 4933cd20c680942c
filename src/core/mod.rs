//! core/mod.rs
//!
//! The brain of the player:
//! - Parse the bundled song catalog (delimited text)
//! - Own the playback state behind a serialized action loop
//! - Reconcile intended state with what the embedded widget reports
//!
//! The pipeline is explicit and modular:
//!   (A) catalog source -> Vec<Track> for a decade
//!   (B) store -> snapshots for the view + commands for the adapter
//!   (C) adapter -> widget calls, widget events -> actions
//!
//! This keeps any view layer dumb: it renders snapshots and forwards
//! gestures as actions, nothing else.

pub mod catalog;
pub mod error;
pub mod playback;
pub mod types;
