use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::{Segment, Transcript};

static CUE_TIMING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{2}:\d{2}:\d{2}\.\d{3})\s*-->\s*(\d{2}:\d{2}:\d{2}\.\d{3})").expect("valid cue timing regex")
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid tag regex"));

/// Parse WebVTT text into a transcript.
///
/// Every timing line of the form `HH:MM:SS.mmm --> HH:MM:SS.mmm` opens a cue whose
/// text runs until the next blank line or timing line. Cues whose text is empty
/// after tag removal are dropped. Malformed timing lines are skipped.
pub fn parse_vtt(content: &str) -> Transcript {
    let lines: Vec<&str> = content.lines().collect();
    let mut segments = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i].trim();
        i += 1;

        if !line.contains("-->") {
            continue;
        }

        let Some(caps) = CUE_TIMING.captures(line) else {
            debug!("Skipping malformed cue timing: {line}");
            continue;
        };

        let start = timestamp_to_seconds(&caps[1]);
        let end = timestamp_to_seconds(&caps[2]);

        let mut text_lines = Vec::new();
        while i < lines.len() {
            let raw = lines[i].trim();
            if raw.is_empty() || raw.contains("-->") {
                break;
            }
            let clean = clean_cue_text(raw);
            if !clean.is_empty() {
                text_lines.push(clean);
            }
            i += 1;
        }

        let text = text_lines.join(" ").trim().to_string();
        if text.is_empty() {
            continue;
        }

        segments.push(Segment {
            text,
            start_seconds: start,
            duration_seconds: (end - start).max(0.0),
            start_formatted: format_timestamp(start),
        });
    }

    debug!("Parsed {} VTT segments", segments.len());
    Transcript::from_segments(segments)
}

/// Strip inline formatting and timestamp tags from a cue line.
pub fn clean_cue_text(line: &str) -> String {
    TAG.replace_all(line, "").trim().to_string()
}

/// Convert `HH:MM:SS.mmm` to seconds, yielding `0.0` for anything unparseable.
pub fn timestamp_to_seconds(ts: &str) -> f64 {
    parse_timestamp(ts).unwrap_or(0.0)
}

fn parse_timestamp(ts: &str) -> Option<f64> {
    let mut parts = ts.trim().split(':');
    let hours: u64 = parts.next()?.parse().ok()?;
    let minutes: u64 = parts.next()?.parse().ok()?;
    let rest = parts.next()?;
    if parts.next().is_some() {
        return None;
    }

    let (secs, millis) = match rest.split_once('.') {
        Some((s, ms)) => (s.parse::<u64>().ok()?, ms.parse::<u64>().ok()?),
        None => (rest.parse::<u64>().ok()?, 0),
    };

    let whole = hours
        .checked_mul(3600)?
        .checked_add(minutes.checked_mul(60)?)?
        .checked_add(secs)?;
    Some(whole as f64 + millis as f64 / 1000.0)
}

/// Format seconds as `HH:MM:SS`, dropping the fractional part.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;
    format!("{hours:02}:{minutes:02}:{secs:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "WEBVTT
Kind: captions
Language: en

00:00:00.000 --> 00:00:03.000 align:start position:0%
Hello<00:00:01.500><c> world</c>

00:00:03.000 --> 00:00:05.500
second line
continues here

00:00:05.500 --> 00:00:06.000
<c> </c>

00:01:05.250 --> 00:01:07.000
last
";

    #[test]
    fn test_timestamp_to_seconds() {
        assert!((timestamp_to_seconds("00:01:05.250") - 65.25).abs() < f64::EPSILON);
        assert!((timestamp_to_seconds("01:00:00.000") - 3600.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_timestamp_to_seconds_invalid() {
        assert_eq!(timestamp_to_seconds("garbage"), 0.0);
        assert_eq!(timestamp_to_seconds("00:xx:01.000"), 0.0);
        assert_eq!(timestamp_to_seconds(""), 0.0);
    }

    #[test]
    fn test_timestamp_to_seconds_overflow() {
        assert_eq!(timestamp_to_seconds("9999999999999999999:00:00.000"), 0.0);
        assert_eq!(timestamp_to_seconds("00:9999999999999999999:00.000"), 0.0);
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00:00");
        assert_eq!(format_timestamp(65.25), "00:01:05");
        assert_eq!(format_timestamp(3725.9), "01:02:05");
    }

    #[test]
    fn test_clean_inline_tags() {
        assert_eq!(clean_cue_text("<00:00:01.500><c>hello</c>"), "hello");
        assert_eq!(clean_cue_text("<i>plain</i> text"), "plain text");
    }

    #[test]
    fn test_parse_sample() {
        let t = parse_vtt(SAMPLE);
        assert_eq!(t.segments.len(), 3);

        assert_eq!(t.segments[0].text, "Hello world");
        assert!((t.segments[0].duration_seconds - 3.0).abs() < f64::EPSILON);
        assert_eq!(t.segments[0].start_formatted, "00:00:00");

        assert_eq!(t.segments[1].text, "second line continues here");
        assert!((t.segments[1].start_seconds - 3.0).abs() < f64::EPSILON);
        assert!((t.segments[1].duration_seconds - 2.5).abs() < f64::EPSILON);

        assert_eq!(t.segments[2].text, "last");
        assert!((t.segments[2].start_seconds - 65.25).abs() < f64::EPSILON);
        assert_eq!(t.segments[2].start_formatted, "00:01:05");
    }

    #[test]
    fn test_full_text_matches_segments() {
        let t = parse_vtt(SAMPLE);
        let joined = t.segments.iter().map(|s| s.text.as_str()).collect::<Vec<_>>().join(" ");
        assert_eq!(t.full_text, joined);
        assert_eq!(t.full_text, "Hello world second line continues here last");
    }

    #[test]
    fn test_malformed_timing_skipped() {
        let vtt = "WEBVTT

0:00 --> 0:03
ignored text

00:00:04.000 --> 00:00:05.000
kept
";
        let t = parse_vtt(vtt);
        assert_eq!(t.segments.len(), 1);
        assert_eq!(t.segments[0].text, "kept");
    }

    #[test]
    fn test_back_to_back_cues_without_blank_line() {
        let vtt = "00:00:00.000 --> 00:00:01.000
one
00:00:01.000 --> 00:00:02.000
two";
        let t = parse_vtt(vtt);
        assert_eq!(t.segments.len(), 2);
        assert_eq!(t.full_text, "one two");
    }

    #[test]
    fn test_negative_duration_clamped() {
        let vtt = "00:00:05.000 --> 00:00:04.000\nbackwards\n";
        let t = parse_vtt(vtt);
        assert_eq!(t.segments.len(), 1);
        assert_eq!(t.segments[0].duration_seconds, 0.0);
    }

    #[test]
    fn test_crlf_input() {
        let vtt = "WEBVTT\r\n\r\n00:00:00.000 --> 00:00:02.000\r\nwindows\r\n";
        let t = parse_vtt(vtt);
        assert_eq!(t.segments.len(), 1);
        assert_eq!(t.segments[0].text, "windows");
    }

    #[test]
    fn test_empty_input() {
        let t = parse_vtt("");
        assert!(t.is_empty());
        assert_eq!(t.full_text, "");
    }
}
