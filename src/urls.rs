use std::path::Path;
use std::sync::LazyLock;

use eyre::{Result, WrapErr};
use log::debug;
use regex::Regex;

static BARE_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]{11}$").expect("valid id regex"));

/// URL shapes that carry a video id, tried in order
static ID_IN_URL: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"youtube\.com/watch\?(?:.*&)?v=([a-zA-Z0-9_-]{11})",
        r"youtu\.be/([a-zA-Z0-9_-]{11})",
        r"youtube\.com/(?:embed|shorts|v|live)/([a-zA-Z0-9_-]{11})",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

const YOUTUBE_URL_MARKERS: &[&str] = &["youtube.com/watch?v=", "youtu.be/", "youtube.com/playlist?list=", "youtube.com/embed/"];

/// Extract the video id from a YouTube URL or a bare 11-character id.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();

    if BARE_ID.is_match(input) {
        return Some(input.to_string());
    }

    ID_IN_URL
        .iter()
        .find_map(|re| re.captures(input).map(|caps| caps[1].to_string()))
}

/// Whether the input looks like a YouTube video, playlist or embed URL
pub fn is_youtube_url(url: &str) -> bool {
    YOUTUBE_URL_MARKERS.iter().any(|m| url.contains(m))
}

/// Whether the input names a playlist (`list=` after percent-decoding)
pub fn is_playlist_url(url: &str) -> bool {
    decode(url).contains("list=")
}

pub(crate) fn decode(url: &str) -> String {
    urlencoding::decode(url)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| url.to_string())
}

/// Parse a URL list: one URL per line, `#` comments and blank lines ignored,
/// anything that is not a video URL dropped.
pub fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| line.contains("youtube.com/watch") || line.contains("youtu.be/"))
        .map(String::from)
        .collect()
}

/// Read a URL list file.
pub fn read_url_file(path: &Path) -> Result<Vec<String>> {
    let content =
        std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read URL file {}", path.display()))?;
    let urls = parse_url_list(&content);
    debug!("Read {} URLs from {}", urls.len(), path.display());
    Ok(urls)
}

/// Write URLs one per line, creating the parent directory if needed.
pub fn save_url_file(urls: &[String], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut content = urls.join("\n");
    if !content.is_empty() {
        content.push('\n');
    }
    std::fs::write(path, content).wrap_err_with(|| format!("failed to write {}", path.display()))?;
    debug!("Saved {} URLs to {}", urls.len(), path.display());
    Ok(())
}
