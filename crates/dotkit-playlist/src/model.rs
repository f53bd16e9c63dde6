use std::collections::HashSet;

use tracing::debug;

use crate::normalize::normalize_url;

const EXTM3U: &str = "#EXTM3U";

/// One track: an optional `# title` line and the URL line after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub title: Option<String>,
    pub url: String,
}

impl PlaylistEntry {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            url: url.into(),
        }
    }

    /// The `CATEGORY/SUB` prefix of the title, if any.
    ///
    /// A prefix only counts when it has no lowercase letters, so ordinary
    /// titles like `Live at Pompeii: Echoes` are left alone.
    pub fn category(&self) -> Option<&str> {
        let (prefix, rest) = self.title.as_deref()?.split_once(':')?;
        let prefix = prefix.trim();
        let is_tag = !prefix.is_empty()
            && !rest.trim().is_empty()
            && prefix.chars().any(|c| c.is_uppercase())
            && !prefix.chars().any(|c| c.is_lowercase());
        is_tag.then_some(prefix)
    }

    /// Title without the category prefix, falling back to the URL.
    pub fn name(&self) -> &str {
        match (&self.title, self.category()) {
            (Some(t), Some(_)) => t.split_once(':').map(|(_, r)| r.trim()).unwrap_or(t),
            (Some(t), None) => t,
            (None, _) => &self.url,
        }
    }

    pub fn normalized_url(&self) -> String {
        normalize_url(&self.url)
    }
}

/// In-memory form of a playlist file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    /// Whether the file started with `#EXTM3U`.
    pub header: bool,
    pub entries: Vec<PlaylistEntry>,
}

impl Playlist {
    pub fn parse(text: &str) -> Self {
        let mut playlist = Playlist::default();
        let mut pending: Option<String> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            if line == EXTM3U {
                playlist.header = true;
                continue;
            }
            if let Some(rest) = line.strip_prefix("#EXTINF:") {
                // `#EXTINF:<duration>,<title>`
                let title = rest.split_once(',').map(|(_, t)| t).unwrap_or(rest);
                pending = Some(title.trim().to_string());
                continue;
            }
            if let Some(rest) = line.strip_prefix('#') {
                if let Some(prev) = pending.replace(rest.trim().to_string()) {
                    debug!(title = %prev, "title without url dropped");
                }
                continue;
            }
            playlist.entries.push(PlaylistEntry {
                title: pending.take().filter(|t| !t.is_empty()),
                url: line.to_string(),
            });
        }

        if let Some(prev) = pending {
            debug!(title = %prev, "trailing title without url dropped");
        }
        playlist
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        if self.header {
            out.push_str(EXTM3U);
            out.push('\n');
        }
        for entry in &self.entries {
            if let Some(ref title) = entry.title {
                out.push_str("# ");
                out.push_str(title);
                out.push('\n');
            }
            out.push_str(&entry.url);
            out.push('\n');
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether a track with the same normalized URL is already listed.
    pub fn contains(&self, url: &str) -> bool {
        let wanted = normalize_url(url);
        self.entries.iter().any(|e| e.normalized_url() == wanted)
    }

    /// Normalized URLs in file order (duplicates kept).
    pub fn normalized_urls(&self) -> Vec<String> {
        self.entries.iter().map(PlaylistEntry::normalized_url).collect()
    }

    /// Sort by category, then title, case-insensitively. Untagged tracks go last.
    pub fn sort(&mut self) {
        self.entries.sort_by_cached_key(|e| {
            (
                e.category().is_none(),
                e.category().unwrap_or_default().to_lowercase(),
                e.name().to_lowercase(),
            )
        });
    }

    /// Drop later entries whose normalized URL was already seen. Returns how many were removed.
    pub fn dedupe(&mut self) -> usize {
        let before = self.entries.len();
        let mut seen = HashSet::new();
        self.entries.retain(|e| seen.insert(e.normalized_url()));
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "# AMBIENT/CALM: Test Track 1\n\
https://youtube.com/watch?v=123456\n\
# FOCUS/CODING: Test Track 2\n\
https://youtube.com/watch?v=abcdef\n";

    #[test]
    fn test_parse_and_render_roundtrip() {
        let pl = Playlist::parse(SAMPLE);
        assert_eq!(pl.len(), 2);
        assert_eq!(pl.entries[0].title.as_deref(), Some("AMBIENT/CALM: Test Track 1"));
        assert_eq!(pl.render(), SAMPLE);
    }

    #[test]
    fn test_parse_header_blank_lines_and_legacy_urls() {
        let text = "#EXTM3U\n\nhttps://a.example/1\n\n# Named\nhttps://a.example/2\n";
        let pl = Playlist::parse(text);
        assert!(pl.header);
        assert_eq!(pl.entries[0].title, None);
        assert_eq!(pl.entries[1].title.as_deref(), Some("Named"));
        assert!(pl.render().starts_with("#EXTM3U\nhttps://a.example/1\n"));
    }

    #[test]
    fn test_parse_extinf_titles() {
        let pl = Playlist::parse("#EXTM3U\n#EXTINF:-1,Some Song\nhttps://a.example/x\n");
        assert_eq!(pl.entries[0].title.as_deref(), Some("Some Song"));
    }

    #[test]
    fn test_category() {
        let tagged = PlaylistEntry::new("ELECTRONIC/CHILL: Tagged Track", "u");
        assert_eq!(tagged.category(), Some("ELECTRONIC/CHILL"));
        assert_eq!(tagged.name(), "Tagged Track");

        let plain = PlaylistEntry::new("Live at Pompeii: Echoes", "u");
        assert_eq!(plain.category(), None);
        assert_eq!(plain.name(), "Live at Pompeii: Echoes");

        let untitled = PlaylistEntry {
            title: None,
            url: "https://a.example".into(),
        };
        assert_eq!(untitled.name(), "https://a.example");
    }

    #[test]
    fn test_contains_uses_normalized_urls() {
        let pl = Playlist::parse(SAMPLE);
        assert!(pl.contains("https://youtu.be/123456"));
        assert!(pl.contains("https://www.youtube.com/watch?v=abcdef&t=1"));
        assert!(!pl.contains("https://youtube.com/watch?v=zzz"));
    }

    #[test]
    fn test_sort_groups_by_category_then_title() {
        let mut pl = Playlist {
            header: false,
            entries: vec![
                PlaylistEntry::new("untagged", "u1"),
                PlaylistEntry::new("ROCK/METAL: b", "u2"),
                PlaylistEntry::new("AMBIENT/CALM: Zeta", "u3"),
                PlaylistEntry::new("ROCK/METAL: A", "u4"),
            ],
        };
        pl.sort();
        let urls: Vec<&str> = pl.entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["u3", "u4", "u2", "u1"]);
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let mut pl = Playlist::parse(
            "# one\nhttps://youtu.be/abc\n# two\nhttps://www.youtube.com/watch?v=abc\n# three\nhttps://x.example\n",
        );
        assert_eq!(pl.dedupe(), 1);
        assert_eq!(pl.len(), 2);
        assert_eq!(pl.entries[0].title.as_deref(), Some("one"));
    }
}
