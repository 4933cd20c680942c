//! Core data types shared between the catalog and the playback store.
//!
//! Rule of thumb:
//! - These structs should be "boring bags of data"
//! - No widget code
//! - No filesystem code
//! - No parsing code
//!
//! 'Track' represents ONE catalog entry: a song plus the id of its video on
//! the external platform. Built once by the parser, never mutated after.

/// One line of the bundled catalog.
///
/// All fields are plain strings on purpose: `year` and `decade` are display
/// tags, not numbers we ever do arithmetic on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    /// Decade tag used for filtering, e.g. "70".
    pub decade: String,

    /// Release year as written in the catalog, e.g. "1971".
    pub year: String,

    /// Band / artist name.
    pub band: String,

    /// Song title.
    pub title: String,

    /// Video id on the external platform. The only field the player widget
    /// ever sees.
    pub video_id: String,
}
