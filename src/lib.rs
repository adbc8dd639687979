pub mod batch;
pub mod config;
pub mod output;
pub mod scrape;
pub mod urls;
pub mod vtt;
pub mod youtube;
pub mod ytdlp;

use serde::Serialize;

pub use scrape::{extract_ids_from_text, extract_youtube_urls, watch_url};
pub use urls::extract_video_id;
pub use vtt::parse_vtt;

/// A single timed unit of transcript text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub text: String,
    pub start_seconds: f64,
    pub duration_seconds: f64,
    /// Start time as `HH:MM:SS`
    pub start_formatted: String,
}

/// Ordered segments plus their space-joined text
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Transcript {
    pub segments: Vec<Segment>,
    pub full_text: String,
}

impl Transcript {
    /// Build a transcript, deriving `full_text` from the segments.
    pub fn from_segments(segments: Vec<Segment>) -> Self {
        let full_text = segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ");
        Self { segments, full_text }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

/// A transcript together with the language information used to obtain it
#[derive(Debug, Clone, Serialize)]
pub struct FetchedTranscript {
    pub transcript: Transcript,
    pub detected_language: String,
    pub selected_language: String,
}
