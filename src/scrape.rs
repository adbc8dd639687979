use std::collections::BTreeSet;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use scraper::{Html, Selector};

const ID_LEN: usize = 11;

/// Independent heuristics for video ids in page source, inline scripts and
/// attribute values. They overlap; every match lands in one set.
const ID_PATTERNS: &[&str] = &[
    // direct URLs
    r"(?:youtube\.com/(?:watch\?v=|embed/|v/)|youtu\.be/)([A-Za-z0-9_-]{11})",
    r"v=([A-Za-z0-9_-]{11})",
    // JSON keys
    r#""videoId"\s*:\s*"([A-Za-z0-9_-]{11})""#,
    r#""videoRenderer"\s*:\s*\{[^}]*"videoId"\s*:\s*"([A-Za-z0-9_-]{11})""#,
    r#""watchEndpoint"\s*:\s*\{[^}]*"videoId"\s*:\s*"([A-Za-z0-9_-]{11})""#,
    r#""videoPrimaryInfoRenderer[^}]*"videoId"\s*:\s*"([A-Za-z0-9_-]{11})""#,
    // escaped forms
    r"/watch\\?\?v=([A-Za-z0-9_-]{11})",
    r#"videoId\\?":\\?"([A-Za-z0-9_-]{11})"#,
    // quoted url values
    r#""url":\s*"[^"]*(?:youtube\.com/(?:watch\?v=|embed/|v/)|youtu\.be/)([A-Za-z0-9_-]{11})""#,
    // renderer blocks in page data
    r#"richItemRenderer.*?videoId\\?":\\?"([A-Za-z0-9_-]{11})"#,
    r#"gridVideoRenderer.*?videoId\\?":\\?"([A-Za-z0-9_-]{11})"#,
    r#"playlistVideoRenderer.*?videoId\\?":\\?"([A-Za-z0-9_-]{11})"#,
    r#"compactVideoRenderer.*?videoId\\?":\\?"([A-Za-z0-9_-]{11})"#,
    r#"endScreenVideoRenderer.*?videoId\\?":\\?"([A-Za-z0-9_-]{11})"#,
    // serialized data
    r#"serializedShareEntity\\?":\\?"video_([A-Za-z0-9_-]{11})"#,
    r#"watchEndpoint\\?":\{[^}]*\\?"videoId\\?":\\?"([A-Za-z0-9_-]{11})"#,
];

static PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ID_PATTERNS
        .iter()
        .filter_map(|p| match Regex::new(&format!("(?s){p}")) {
            Ok(re) => Some(re),
            Err(e) => {
                debug!("Skipping invalid id pattern {p}: {e}");
                None
            }
        })
        .collect()
});

static VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid video id regex"));

static INITIAL_DATA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)var ytInitialData = (\{.*?\});").expect("valid ytInitialData regex"));

/// Canonical watch URL for a video id
pub fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

/// Collect every video id that any heuristic finds in `text`.
///
/// A `var ytInitialData = {...};` assignment is additionally parsed as JSON and
/// rescanned in its re-serialized form. JSON that fails to parse is ignored.
pub fn extract_ids_from_text(text: &str) -> BTreeSet<String> {
    let mut ids = BTreeSet::new();
    collect_ids(text, &mut ids);

    for caps in INITIAL_DATA.captures_iter(text) {
        match serde_json::from_str::<serde_json::Value>(&caps[1]) {
            Ok(value) => match serde_json::to_string(&value) {
                Ok(json_text) => collect_ids(&json_text, &mut ids),
                Err(e) => debug!("Could not re-serialize ytInitialData: {e}"),
            },
            Err(e) => debug!("Could not parse ytInitialData: {e}"),
        }
    }

    ids
}

fn collect_ids(text: &str, ids: &mut BTreeSet<String>) {
    for re in PATTERNS.iter() {
        for caps in re.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                if m.as_str().chars().count() == ID_LEN {
                    ids.insert(m.as_str().to_string());
                }
            }
        }
    }
}

/// Find YouTube video URLs in an HTML document.
///
/// Scans the raw document, then each `<script>` body and `<a href>` value, and
/// takes well-formed `data-video-id` attributes directly. Returns sorted canonical watch URLs.
pub fn extract_youtube_urls(html: &str) -> Vec<String> {
    let mut ids = extract_ids_from_text(html);

    let document = Html::parse_document(html);

    if let Some(sel) = selector("script") {
        for script in document.select(&sel) {
            let body: String = script.text().collect();
            if !body.trim().is_empty() {
                ids.extend(extract_ids_from_text(&body));
            }
        }
    }

    if let Some(sel) = selector("[data-video-id]") {
        for element in document.select(&sel) {
            match element.value().attr("data-video-id") {
                Some(id) if VIDEO_ID.is_match(id) => {
                    ids.insert(id.to_string());
                }
                _ => {}
            }
        }
    }

    if let Some(sel) = selector("a[href]") {
        for anchor in document.select(&sel) {
            if let Some(href) = anchor.value().attr("href") {
                ids.extend(extract_ids_from_text(href));
            }
        }
    }

    debug!("Found {} unique video ids", ids.len());
    ids.iter().map(|id| watch_url(id)).collect()
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_url() {
        assert_eq!(watch_url("dQw4w9WgXcQ"), "https://www.youtube.com/watch?v=dQw4w9WgXcQ");
    }

    #[test]
    fn test_all_patterns_compile() {
        assert_eq!(PATTERNS.len(), ID_PATTERNS.len());
    }

    #[test]
    fn test_url_and_json_key_deduplicate() {
        let text = r#"see https://www.youtube.com/watch?v=dQw4w9WgXcQ and {"videoId":"dQw4w9WgXcQ"}"#;
        let urls = extract_youtube_urls(text);
        assert_eq!(urls, vec!["https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string()]);
    }

    #[test]
    fn test_no_ids() {
        assert!(extract_ids_from_text("nothing to see here").is_empty());
        assert!(extract_youtube_urls("<html><body><p>plain</p></body></html>").is_empty());
        assert!(extract_youtube_urls("").is_empty());
    }

    #[test]
    fn test_url_forms() {
        let text = "https://youtu.be/aaaaaaaaaaa https://www.youtube.com/embed/bbbbbbbbbbb \
                    https://www.youtube.com/v/ccccccccccc";
        let ids = extract_ids_from_text(text);
        assert!(ids.contains("aaaaaaaaaaa"));
        assert!(ids.contains("bbbbbbbbbbb"));
        assert!(ids.contains("ccccccccccc"));
        assert_eq!(ids.len(), 3);
    }

    #[test]
    fn test_escaped_json_forms() {
        let text = r#"{\"videoId\":\"AbCdEfGhIj_\"} \/watch\?v=ZyXwVuTsR-1 serializedShareEntity\":\"video_Q1w2e3r4t5y"#;
        let ids = extract_ids_from_text(text);
        assert!(ids.contains("AbCdEfGhIj_"));
        assert!(ids.contains("ZyXwVuTsR-1"));
        assert!(ids.contains("Q1w2e3r4t5y"));
    }

    #[test]
    fn test_renderer_spans_newlines() {
        let text = "\"gridVideoRenderer\": {\n  \"title\": \"x\",\n  \"videoId\":\"Mn0pQr1sT2u\"";
        let ids = extract_ids_from_text(text);
        assert!(ids.contains("Mn0pQr1sT2u"));
    }

    #[test]
    fn test_initial_data_reserialized() {
        // the key only reads as `videoId` once the JSON escape is decoded
        let text = r#"<script>var ytInitialData = {"contents": {"items": [{"video\u0049d":
            "InitData001"}]}};</script>"#;
        let ids = extract_ids_from_text(text);
        assert!(ids.contains("InitData001"));
    }

    #[test]
    fn test_invalid_initial_data_ignored() {
        let text = r#"var ytInitialData = {not json};  v=Fallback123"#;
        let ids = extract_ids_from_text(text);
        assert_eq!(ids.len(), 1);
        assert!(ids.contains("Fallback123"));
    }

    #[test]
    fn test_html_sources() {
        let html = r#"<html><body>
            <div data-video-id="DataAttr001"></div>
            <div data-video-id="short"></div>
            <a href="/watch?v=HrefLink001&list=PL1">link</a>
            <script>window.x = {"videoId": "ScriptId001"};</script>
        </body></html>"#;
        let urls = extract_youtube_urls(html);
        assert_eq!(
            urls,
            vec![
                "https://www.youtube.com/watch?v=DataAttr001".to_string(),
                "https://www.youtube.com/watch?v=HrefLink001".to_string(),
                "https://www.youtube.com/watch?v=ScriptId001".to_string(),
            ]
        );
    }

    #[test]
    fn test_data_attribute_must_look_like_an_id() {
        let html = r#"<div data-video-id="abc def ghi"></div><div data-video-id="abc/def?ghi"></div>"#;
        assert!(extract_youtube_urls(html).is_empty());
    }

    #[test]
    fn test_data_attribute_round_trip() {
        let html = r#"<div data-video-id="Attr_Id-001"></div>"#;
        let urls = extract_youtube_urls(html);
        assert_eq!(urls, vec![watch_url("Attr_Id-001")]);
        let ids = extract_ids_from_text(&urls.join("\n"));
        assert!(ids.contains("Attr_Id-001"));
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn test_output_round_trip() {
        let html = r#"<a href="https://youtu.be/RoundTrip01">a</a> "videoId":"RoundTrip02""#;
        let first = extract_ids_from_text(html);
        let urls = extract_youtube_urls(html);
        let second = extract_ids_from_text(&urls.join("\n"));
        assert_eq!(first, second);
    }
}
