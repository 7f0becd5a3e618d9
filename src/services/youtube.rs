//! YouTube link recognition for listening-activity videos.
//!
//! Teachers paste whatever link the browser shows; the portal embeds the
//! video through the canonical `/embed/<id>` URL.

const EMBED_PREFIX: &str = "https://www.youtube.com/embed/";
const VIDEO_ID_LEN: usize = 11;

/// Extract the 11-character video id from a YouTube URL.
///
/// Accepts `watch?v=`, `youtu.be/`, `/embed/`, `/shorts/` and `/live/`
/// forms on `youtube.com`, `www.youtube.com` and `m.youtube.com`, with or
/// without a scheme.
#[must_use]
pub fn youtube_video_id(url: &str) -> Option<String> {
    let trimmed = url.trim();
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .unwrap_or(trimmed);
    let rest = rest.split('#').next().unwrap_or_default();

    let (host, path_and_query) = rest.split_once('/').unwrap_or((rest, ""));
    let host = host.to_ascii_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let (path, query) = path_and_query
        .split_once('?')
        .unwrap_or((path_and_query, ""));

    let candidate = match host {
        "youtu.be" => path.split('/').next(),
        "youtube.com" | "m.youtube.com" => {
            let mut segments = path.split('/');
            match segments.next() {
                Some("watch") => query.split('&').find_map(|pair| pair.strip_prefix("v=")),
                Some("embed" | "shorts" | "live") => segments.next(),
                _ => None,
            }
        }
        _ => None,
    }?;

    is_video_id(candidate).then(|| candidate.to_owned())
}

/// Canonical embed URL for a recognizable YouTube link.
#[must_use]
pub fn youtube_embed_url(url: &str) -> Option<String> {
    youtube_video_id(url).map(|id| format!("{EMBED_PREFIX}{id}"))
}

fn is_video_id(candidate: &str) -> bool {
    candidate.len() == VIDEO_ID_LEN
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

#[cfg(test)]
#[path = "youtube_test.rs"]
mod tests;
