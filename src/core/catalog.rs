//! core/catalog.rs
//! Catalog loading: the bundled `ids.txt` asset -> `Vec<Track>`.
//!
//! Format, one record per line, five `;`-separated fields:
//!
//! ```text
//! decade;year;band;songTitle;videoId
//! 70;1971;Led Zeppelin;Stairway to Heaven;iXQUu5Dti4g
//! ```
//!
//! - Fields are trimmed of surrounding whitespace.
//! - Lines with any other field count are silently skipped (comments, blank
//!   lines, half-edited records).
//! - No escaping: `;` cannot appear inside a field.

use std::fs;
use std::path::PathBuf;

use crate::core::error::PlaybackError;
use crate::core::types::Track;

/// Where the store fetches songs from.
///
/// The store never reads files itself; it calls this on a worker thread and
/// re-enters the result as a completion action. Tests swap in an in-memory
/// source.
pub trait CatalogSource: Send + Sync {
    /// All tracks whose decade tag equals `decade`, in catalog order.
    ///
    /// An empty result is not an error here; the store decides what an empty
    /// playlist means.
    fn load(&self, decade: &str) -> Result<Vec<Track>, PlaybackError>;
}

/// Catalog backed by an `ids.txt` file shipped with the app.
#[derive(Debug, Clone)]
pub struct FileCatalog {
    path: PathBuf,
}

impl FileCatalog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for FileCatalog {
    fn load(&self, decade: &str) -> Result<Vec<Track>, PlaybackError> {
        let text = fs::read_to_string(&self.path).map_err(|e| PlaybackError::CatalogRead {
            cause: format!("{}: {e}", self.path.display()),
        })?;
        Ok(parse_catalog(&text, decade))
    }
}

/// Parse catalog text and keep only records for `decade`.
pub fn parse_catalog(text: &str, decade: &str) -> Vec<Track> {
    text.lines()
        .filter_map(parse_line)
        .filter(|t| t.decade == decade)
        .collect()
}

fn parse_line(line: &str) -> Option<Track> {
    let parts: Vec<&str> = line.split(';').collect();
    if parts.len() != 5 {
        return None;
    }

    Some(Track {
        decade: parts[0].trim().to_string(),
        year: parts[1].trim().to_string(),
        band: parts[2].trim().to_string(),
        title: parts[3].trim().to_string(),
        video_id: parts[4].trim().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
70;1971;Led Zeppelin;Stairway to Heaven;iXQUu5Dti4g
70;1975;Queen; Bohemian Rhapsody ;fJ9rUzIMcZQ
80;1983;Michael Jackson;Billie Jean;Zi_XLOBDo_Y
not a record
60;1967;too;few
90;1991;one;too;many;fields
";

    #[test]
    fn parses_and_filters_by_decade() {
        let tracks = parse_catalog(SAMPLE, "70");
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].band, "Led Zeppelin");
        assert_eq!(tracks[1].video_id, "fJ9rUzIMcZQ");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let tracks = parse_catalog(SAMPLE, "70");
        assert_eq!(tracks[1].title, "Bohemian Rhapsody");
    }

    #[test]
    fn skips_lines_with_wrong_field_count() {
        // "60" and "90" only appear on malformed lines.
        assert!(parse_catalog(SAMPLE, "60").is_empty());
        assert!(parse_catalog(SAMPLE, "90").is_empty());
    }

    #[test]
    fn unknown_decade_yields_empty() {
        assert!(parse_catalog(SAMPLE, "50").is_empty());
    }

    #[test]
    fn file_catalog_reads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{SAMPLE}").unwrap();

        let catalog = FileCatalog::new(file.path());
        let tracks = catalog.load("80").unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].title, "Billie Jean");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let catalog = FileCatalog::new("/definitely/not/here/ids.txt");
        match catalog.load("70") {
            Err(PlaybackError::CatalogRead { cause }) => {
                assert!(cause.contains("ids.txt"));
            }
            other => panic!("expected CatalogRead, got {other:?}"),
        }
    }
}
