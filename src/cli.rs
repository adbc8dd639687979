use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ytscribe",
    about = "Download YouTube subtitles and save them as plain and timestamped transcripts",
    version = env!("GIT_DESCRIBE"),
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Base directory for transcript folders [default: from config, else "transcripts"]
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Pause between videos in milliseconds [default: from config, else 500]
    #[arg(long, global = true)]
    pub delay_ms: Option<u64>,

    /// Subtitle language to request after the detected one (repeatable)
    #[arg(short, long = "lang", global = true)]
    pub langs: Vec<String>,

    /// Print progress details
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Transcribe a single video
    Video {
        /// YouTube video URL
        url: String,

        /// Folder name for this batch
        #[arg(long, default_value = "single_videos")]
        folder: String,
    },

    /// Transcribe every video listed in a file (one URL per line, # for comments)
    List {
        #[arg(default_value = "video_urls.txt")]
        file: PathBuf,

        #[arg(long, default_value = "transcripts_batch")]
        folder: String,
    },

    /// Transcribe every video in a playlist
    Playlist {
        /// YouTube playlist URL (must contain list=)
        url: String,

        #[arg(long, default_value = "playlist_transcripts")]
        folder: String,
    },

    /// Find video URLs in saved HTML/JSON page source and transcribe them
    Scan {
        #[arg(default_value = "codigo_fuente.txt")]
        file: PathBuf,

        #[arg(long, default_value = "html_extracted_transcripts")]
        folder: String,

        /// Also write the found URLs to this file
        #[arg(long)]
        save: Option<PathBuf>,

        /// Only list the found URLs, do not fetch transcripts
        #[arg(long)]
        urls_only: bool,
    },
}
