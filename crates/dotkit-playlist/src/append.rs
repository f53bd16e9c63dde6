use std::path::Path;

use tracing::info;

use dotkit_core::{Result, atomic_write};

use crate::model::Playlist;

/// Read a playlist file, treating a missing file as empty.
pub(crate) fn read_or_empty(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(s) => Ok(s),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e.into()),
    }
}

/// Append a track unless its normalized URL is already listed.
///
/// Returns `Ok(false)` for a duplicate (the file is not touched) and
/// `Ok(true)` when the track was, or in `dry_run` would have been, added.
/// A blank title defaults to the URL; category tags in the title are kept.
pub fn append_to_playlist(url: &str, title: &str, path: &Path, dry_run: bool) -> Result<bool> {
    let url = url.trim();
    let existing = read_or_empty(path)?;

    if Playlist::parse(&existing).contains(url) {
        info!(url, path = %path.display(), "already in playlist");
        return Ok(false);
    }

    let title = match title.trim() {
        "" => url,
        t => t,
    };

    if dry_run {
        info!(url, title, "dry run, not writing");
        return Ok(true);
    }

    let mut contents = existing;
    if !contents.is_empty() && !contents.ends_with('\n') {
        contents.push('\n');
    }
    contents.push_str(&format!("# {title}\n{url}\n"));
    atomic_write(path, &contents)?;

    info!(url, title, path = %path.display(), "appended to playlist");
    Ok(true)
}
