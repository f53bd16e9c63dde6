use url::Url;

const YOUTUBE_HOSTS: &[&str] = &[
    "youtube.com",
    "www.youtube.com",
    "m.youtube.com",
    "music.youtube.com",
];
const SHORT_HOSTS: &[&str] = &["youtu.be", "www.youtu.be"];

/// Parse `raw` only if it looks like an absolute URL with a host.
///
/// `Url::parse` is lenient (`http:/example.com` parses), so the `://`
/// separator and a non-empty host are required on top of it.
fn parse_absolute(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if !raw.contains("://") {
        return None;
    }
    let url = Url::parse(raw).ok()?;
    match url.host_str() {
        Some(h) if !h.is_empty() => Some(url),
        _ => None,
    }
}

fn video_id_of(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    let id = if SHORT_HOSTS.contains(&host.as_str()) {
        segments.next()?.to_string()
    } else if YOUTUBE_HOSTS.contains(&host.as_str()) {
        match segments.next()? {
            "watch" => url
                .query_pairs()
                .find(|(k, _)| k == "v")
                .map(|(_, v)| v.into_owned())?,
            "shorts" | "embed" | "live" => segments.next()?.to_string(),
            _ => return None,
        }
    } else {
        return None;
    };

    let id = id.trim();
    let valid = !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    valid.then(|| id.to_string())
}

/// Extract the video id from any supported YouTube URL form.
pub fn youtube_video_id(raw: &str) -> Option<String> {
    parse_absolute(raw).and_then(|u| video_id_of(&u))
}

/// Whether `raw` points at a YouTube video.
pub fn is_youtube_url(raw: &str) -> bool {
    youtube_video_id(raw).is_some()
}

/// Canonical form used to compare playlist URLs.
///
/// YouTube video URLs collapse to `https://youtube.com/watch?v=<id>`.
/// Anything else becomes `scheme://host[:port]path[?query]`, lowercased,
/// without fragment or trailing slash. Input that isn't an absolute URL is
/// returned unchanged. Applying it twice gives the same result as once.
pub fn normalize_url(raw: &str) -> String {
    let Some(url) = parse_absolute(raw) else {
        return raw.to_string();
    };

    if let Some(id) = video_id_of(&url) {
        return format!("https://youtube.com/watch?v={id}");
    }

    let host = url.host_str().unwrap_or_default();
    let mut out = format!("{}://{}", url.scheme(), host);
    if let Some(port) = url.port() {
        out.push_str(&format!(":{port}"));
    }
    out.push_str(url.path());
    if let Some(q) = url.query() {
        out.push('?');
        out.push_str(q);
    }
    out.to_lowercase().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_youtube_forms_collapse() {
        let canonical = "https://youtube.com/watch?v=dQw4w9WgXcQ";
        for input in [
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
            "https://youtu.be/dQw4w9WgXcQ",
            "https://youtube.com/watch?v=dQw4w9WgXcQ&feature=shared",
            "https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
            "https://music.youtube.com/watch?v=dQw4w9WgXcQ&list=RD",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ?start=10",
            "https://youtu.be/dQw4w9WgXcQ?t=42",
            "http://WWW.YOUTUBE.COM/watch?v=dQw4w9WgXcQ",
        ] {
            assert_eq!(normalize_url(input), canonical, "input: {input}");
        }
    }

    #[test]
    fn test_video_id_keeps_case() {
        assert_eq!(youtube_video_id("https://youtu.be/AbCdEf").as_deref(), Some("AbCdEf"));
    }

    #[test]
    fn test_non_youtube_urls() {
        assert_eq!(normalize_url("https://example.com/page/"), "https://example.com/page");
        assert_eq!(normalize_url("https://example.com/page"), "https://example.com/page");
        assert_eq!(normalize_url("HTTPS://EXAMPLE.COM/PAGE"), "https://example.com/page");
        assert_eq!(normalize_url("https://example.com/"), "https://example.com");
        assert_eq!(
            normalize_url("https://example.com:8443/a?b=C#frag"),
            "https://example.com:8443/a?b=c"
        );
    }

    #[test]
    fn test_youtube_non_video_pages_are_plain_urls() {
        assert_eq!(
            normalize_url("https://www.youtube.com/@channel/videos/"),
            "https://www.youtube.com/@channel/videos"
        );
        assert!(!is_youtube_url("https://www.youtube.com/watch"));
    }

    #[test]
    fn test_encoded_ids_are_not_video_ids() {
        assert_eq!(youtube_video_id("https://youtu.be/a%26b"), None);
        assert_eq!(youtube_video_id("https://youtube.com/watch?v=a%26b"), None);
        assert_eq!(youtube_video_id("https://youtube.com/watch?v=a b"), None);
        assert_eq!(normalize_url("https://youtu.be/a%26b"), "https://youtu.be/a%26b");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for input in [
            "https://youtu.be/a%26b",
            "https://youtube.com/watch?v=a%26b&list=x",
            "https://www.youtube.com/shorts/x%3Fy",
            "https://youtu.be/dQw4w9WgXcQ?t=42",
            "https://example.com/a%20b/?q=%41#f",
            "HTTPS://EXAMPLE.COM/PAGE/",
            "not a url",
        ] {
            let once = normalize_url(input);
            assert_eq!(normalize_url(&once), once, "input: {input}");
        }
    }

    #[test]
    fn test_invalid_urls_unchanged() {
        for input in ["not a url", "http:/example.com", "", "example.com/page"] {
            assert_eq!(normalize_url(input), input);
        }
    }

    #[test]
    fn test_idempotent() {
        for input in [
            "https://youtu.be/dQw4w9WgXcQ",
            "HTTPS://EXAMPLE.COM/PAGE/",
            "https://example.com//double//",
            "https://example.com/a/?q=1",
            "not a url",
            "https://www.youtube.com/shorts/xyz",
        ] {
            let once = normalize_url(input);
            assert_eq!(normalize_url(&once), once, "input: {input}");
        }
    }
}
