use std::path::PathBuf;
use std::time::Duration;

use eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};

use crate::output::{OutputLayout, file_stem};
use crate::urls::extract_video_id;
use crate::youtube::PageClient;
use crate::ytdlp::YtDlp;

/// Everything a batch run needs, constructed once by the caller
#[derive(Debug, Clone)]
pub struct BatchContext {
    pub page: PageClient,
    pub ytdlp: YtDlp,
    pub output_dir: PathBuf,
    /// Pause after each video
    pub delay: Duration,
}

#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub plain_dir: PathBuf,
    pub timestamps_dir: PathBuf,
}

impl BatchSummary {
    pub fn failed(&self) -> usize {
        self.total - self.successful
    }

    /// Percentage of videos that produced a transcript
    pub fn success_rate(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.successful as f64 / self.total as f64 * 100.0
    }
}

/// Fetch and write transcripts for `urls` one after another.
///
/// A video without a usable transcript is counted as failed and skipped; the
/// batch always runs to the end.
pub async fn process_videos(urls: &[String], batch_name: &str, ctx: &BatchContext) -> Result<BatchSummary> {
    let layout = OutputLayout::create(&ctx.output_dir, batch_name)?;

    let progress = ProgressBar::new(urls.len() as u64);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} videos ({eta}) {msg}")?
        .progress_chars("█▓▒░");
    progress.set_style(style);

    let mut successful = 0;

    for (idx, video_url) in urls.iter().enumerate() {
        let index = idx + 1;
        let title = ctx.page.fetch_title(video_url).await;
        progress.set_message(truncate(&title, 40));
        info!("[{index}/{}] {title} ({video_url})", urls.len());

        match ctx.ytdlp.fetch_transcript(video_url) {
            Some(fetched) if !fetched.transcript.is_empty() => {
                let video_id = extract_video_id(video_url).unwrap_or_else(|| "unknown".to_string());
                let stem = file_stem(index, &title, &video_id);
                match layout.write(&stem, &fetched.transcript) {
                    Ok(()) => {
                        info!(
                            "Saved {stem} ({} segments, {} subtitles)",
                            fetched.transcript.segments.len(),
                            fetched.selected_language
                        );
                        successful += 1;
                    }
                    Err(e) => {
                        warn!("Failed to write transcript for {video_url}: {e}");
                        progress.println(format!("Could not save transcript for {title}: {e}"));
                    }
                }
            }
            _ => progress.println(format!("No transcript available for {title}")),
        }

        progress.inc(1);
        tokio::time::sleep(ctx.delay).await;
    }

    progress.finish_and_clear();

    Ok(BatchSummary {
        total: urls.len(),
        successful,
        plain_dir: layout.plain_dir,
        timestamps_dir: layout.timestamps_dir,
    })
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
