use std::path::{Path, PathBuf};

use eyre::{Result, WrapErr};
use log::debug;

use crate::Transcript;

const PLAIN_DIR: &str = "transcripts_plain";
const TIMESTAMPS_DIR: &str = "transcripts_with_timestamps";

/// Render transcript as plain text (all segments on one line)
pub fn render_plain(transcript: &Transcript) -> String {
    transcript.full_text.clone()
}

/// Render transcript as `[HH:MM:SS] text` lines
pub fn render_timestamped(transcript: &Transcript) -> String {
    transcript
        .segments
        .iter()
        .map(|s| format!("[{}] {}\n", s.start_formatted, s.text))
        .collect()
}

/// Replace characters that are not allowed in file names, control characters included.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect()
}

/// `<index>_<title>_<video id>`, index zero-padded to three digits
pub fn file_stem(index: usize, title: &str, video_id: &str) -> String {
    format!("{index:03}_{}_{video_id}", sanitize_title(title))
}

/// The two sibling directories a batch writes into
#[derive(Debug, Clone)]
pub struct OutputLayout {
    pub plain_dir: PathBuf,
    pub timestamps_dir: PathBuf,
}

impl OutputLayout {
    /// Create `<base>/<batch>/transcripts_plain` and `<base>/<batch>/transcripts_with_timestamps`.
    pub fn create(base: &Path, batch: &str) -> Result<Self> {
        let batch_dir = base.join(batch);
        let layout = Self {
            plain_dir: batch_dir.join(PLAIN_DIR),
            timestamps_dir: batch_dir.join(TIMESTAMPS_DIR),
        };
        for dir in [&layout.plain_dir, &layout.timestamps_dir] {
            std::fs::create_dir_all(dir).wrap_err_with(|| format!("failed to create {}", dir.display()))?;
        }
        debug!("Output directories ready under {}", batch_dir.display());
        Ok(layout)
    }

    /// Write both renderings as `<stem>.txt`.
    pub fn write(&self, stem: &str, transcript: &Transcript) -> Result<()> {
        let name = format!("{stem}.txt");
        std::fs::write(self.plain_dir.join(&name), render_plain(transcript))?;
        std::fs::write(self.timestamps_dir.join(&name), render_timestamped(transcript))?;
        debug!("Wrote {name}");
        Ok(())
    }
}
