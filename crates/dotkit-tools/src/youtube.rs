//! List a channel's uploads through the YouTube Data API, split into
//! regular videos and shorts.

use std::collections::HashSet;
use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use dotkit_core::{DotkitError, Fetcher, Result};

pub const API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// Shorts are at most this long.
const SHORT_MAX_SECS: u64 = 60;

/// The videos endpoint accepts at most 50 ids per call.
const IDS_PER_CALL: usize = 50;

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?)?$").expect("valid regex")
});

/// Parse an ISO-8601 duration such as `PT1H2M3S` or `P1DT5M`.
pub fn parse_iso8601_duration(value: &str) -> Option<Duration> {
    let caps = ISO_DURATION.captures(value)?;
    let mut secs: u64 = 0;
    for (group, unit) in [(1, 86_400u64), (2, 3_600), (3, 60), (4, 1)] {
        let Some(m) = caps.get(group) else { continue };
        let n: u64 = m.as_str().parse().ok()?;
        secs = secs.checked_add(n.checked_mul(unit)?)?;
    }
    Some(Duration::from_secs(secs))
}

/// A zero duration (live streams, premieres) counts as a regular video.
pub fn is_short(duration: Duration) -> bool {
    let secs = duration.as_secs();
    secs > 0 && secs <= SHORT_MAX_SECS
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchPage {
    #[serde(default)]
    items: Vec<SearchItem>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideosPage {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    snippet: Snippet,
    content_details: ContentDetails,
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub videos: Vec<String>,
    pub shorts: Vec<String>,
}

impl Catalog {
    pub fn total(&self) -> usize {
        self.videos.len() + self.shorts.len()
    }

    pub fn render(&self) -> String {
        let numbered = |titles: &[String]| -> String {
            titles
                .iter()
                .enumerate()
                .map(|(i, t)| format!("{}. {t}\n", i + 1))
                .collect()
        };
        format!(
            "Videos:\n{}\nShorts:\n{}\nSummary:\nTotal Videos: {}\nTotal Shorts: {}\nTotal Content (Videos + Shorts): {}\n",
            numbered(&self.videos),
            numbered(&self.shorts),
            self.videos.len(),
            self.shorts.len(),
            self.total(),
        )
    }
}

fn search_url(base: &str, channel_id: &str, key: &str, page_token: Option<&str>) -> Result<String> {
    let mut params = vec![
        ("part", "snippet"),
        ("channelId", channel_id),
        ("maxResults", "50"),
        ("type", "video"),
        ("key", key),
    ];
    if let Some(token) = page_token {
        params.push(("pageToken", token));
    }
    reqwest::Url::parse_with_params(&format!("{base}/search"), &params)
        .map(String::from)
        .map_err(|e| DotkitError::InvalidInput(e.to_string()))
}

fn videos_url(base: &str, ids: &[String], key: &str) -> Result<String> {
    let ids = ids.join(",");
    reqwest::Url::parse_with_params(
        &format!("{base}/videos"),
        &[("part", "snippet,contentDetails"), ("id", ids.as_str()), ("key", key)],
    )
    .map(String::from)
    .map_err(|e| DotkitError::InvalidInput(e.to_string()))
}

/// Every video id on the channel, following `nextPageToken` until it runs
/// out or repeats.
async fn channel_video_ids(fetcher: &dyn Fetcher, base: &str, channel_id: &str, key: &str) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut seen_tokens = HashSet::new();
    let mut token: Option<String> = None;
    loop {
        let url = search_url(base, channel_id, key, token.as_deref())?;
        let page: SearchPage = serde_json::from_str(&fetcher.get_text(&url).await?)?;
        ids.extend(page.items.into_iter().filter_map(|item| item.id.video_id));
        match page.next_page_token {
            Some(next) if seen_tokens.insert(next.clone()) => token = Some(next),
            Some(next) => {
                warn!(token = %next, "page token repeated; stopping pagination");
                break;
            }
            None => break,
        }
    }
    debug!(count = ids.len(), "channel video ids collected");
    Ok(ids)
}

pub async fn catalog(
    fetcher: &dyn Fetcher,
    base: &str,
    api_key: Option<&str>,
    channel_id: Option<&str>,
) -> Result<Catalog> {
    let key = api_key
        .filter(|k| !k.is_empty())
        .ok_or_else(|| DotkitError::Config("no YouTube API key (YOUTUBE_API_KEY)".into()))?;
    let channel_id = channel_id
        .filter(|c| !c.is_empty())
        .ok_or_else(|| DotkitError::Config("no YouTube channel id (YOUTUBE_CHANNEL_ID)".into()))?;

    let ids = channel_video_ids(fetcher, base, channel_id, key).await?;
    let mut catalog = Catalog::default();
    for chunk in ids.chunks(IDS_PER_CALL) {
        let url = videos_url(base, chunk, key)?;
        let page: VideosPage = serde_json::from_str(&fetcher.get_text(&url).await?)?;
        for video in page.items {
            let duration = parse_iso8601_duration(&video.content_details.duration).unwrap_or_default();
            if is_short(duration) {
                catalog.shorts.push(video.snippet.title);
            } else {
                catalog.videos.push(video.snippet.title);
            }
        }
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_durations() {
        assert_eq!(parse_iso8601_duration("PT45S"), Some(Duration::from_secs(45)));
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), Some(Duration::from_secs(3723)));
        assert_eq!(parse_iso8601_duration("P1DT5M"), Some(Duration::from_secs(86_700)));
        assert_eq!(parse_iso8601_duration("P0D"), Some(Duration::ZERO));
        assert_eq!(parse_iso8601_duration("1:30"), None);
    }

    #[test]
    fn test_overflowing_durations_do_not_parse() {
        assert_eq!(parse_iso8601_duration("P999999999999999999D"), None);
        assert_eq!(parse_iso8601_duration("PT99999999999999999999S"), None);
        assert_eq!(
            parse_iso8601_duration("PT18446744073709551615S"),
            Some(Duration::from_secs(u64::MAX))
        );
        assert_eq!(parse_iso8601_duration("PT1M18446744073709551615S"), None);
    }

    #[test]
    fn test_short_boundary() {
        assert!(is_short(Duration::from_secs(60)));
        assert!(!is_short(Duration::from_secs(61)));
        assert!(!is_short(Duration::ZERO));
    }

    #[test]
    fn test_render() {
        let catalog = Catalog {
            videos: vec!["Intro".into(), "Deep dive".into()],
            shorts: vec!["Tip".into()],
        };
        assert_eq!(
            catalog.render(),
            "Videos:\n1. Intro\n2. Deep dive\n\nShorts:\n1. Tip\n\nSummary:\nTotal Videos: 2\nTotal Shorts: 1\nTotal Content (Videos + Shorts): 3\n"
        );
    }
}
