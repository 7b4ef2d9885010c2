//! Zone-code list loading.
//!
//! The bot only watches alerts for the NWS zones listed in a plain text
//! file, one code per line. Blank lines and lines starting with `#` are
//! ignored and codes are upper-cased. The file is re-read every cycle so
//! edits take effect without a restart.

use log::warn;
use tokio::fs;

/// Loads the zone codes from the given file.
///
/// A missing or unreadable file logs a warning and yields an empty list;
/// the caller treats that as "nothing to fetch" rather than an error.
///
/// # Examples
///
/// ```no_run
/// let zones = zones::load("zones.txt").await;
/// ```
pub async fn load(path: &str) -> Vec<String> {
    let Ok(contents) = fs::read_to_string(path).await else {
        warn!("could not read zone file {}", path);
        return Vec::new();
    };

    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_uppercase)
        .collect()
}
