use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::LazyLock;

use eyre::{Result, bail};
use log::{debug, info, warn};
use regex::Regex;

use crate::scrape::watch_url;
use crate::urls::{decode, is_playlist_url};
use crate::{FetchedTranscript, parse_vtt};

pub const DEFAULT_PROGRAM: &str = "yt-dlp";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Subtitle languages requested after the detected one
pub const DEFAULT_LANGUAGES: &[&str] = &["es", "en", "fr", "de", "it", "pt"];

static VTT_LANG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\.([a-z]{2})\.vtt$").expect("valid vtt lang regex"));

/// Runs the external `yt-dlp` tool for language detection, subtitle download
/// and playlist listing
#[derive(Debug, Clone)]
pub struct YtDlp {
    program: PathBuf,
    languages: Vec<String>,
}

impl Default for YtDlp {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM, DEFAULT_LANGUAGES.iter().map(|s| s.to_string()).collect())
    }
}

impl YtDlp {
    pub fn new(program: impl Into<PathBuf>, languages: Vec<String>) -> Self {
        Self {
            program: program.into(),
            languages,
        }
    }

    fn run(&self, args: &[&str], cwd: Option<&Path>) -> Result<Output> {
        let mut cmd = Command::new(&self.program);
        cmd.args(args);
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        debug!("Running {} {}", self.program.display(), args.join(" "));

        match cmd.output() {
            Ok(output) => Ok(output),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                bail!(
                    "{} not found. Install it to download subtitles:\n  \
                     pip install yt-dlp\n  \
                     or: brew install yt-dlp",
                    self.program.display()
                );
            }
            Err(e) => bail!("failed to run {}: {e}", self.program.display()),
        }
    }

    /// Original language of the video according to its metadata, `en` when unknown.
    pub fn detect_language(&self, video_url: &str) -> String {
        let detected = self
            .run(&["--dump-json", "--no-download", video_url], None)
            .ok()
            .filter(|o| o.status.success())
            .and_then(|o| language_from_metadata(&String::from_utf8_lossy(&o.stdout)));

        match detected {
            Some(lang) => {
                info!("Detected language for {video_url}: {lang}");
                lang
            }
            None => {
                warn!("Could not detect language for {video_url}, using {DEFAULT_LANGUAGE}");
                DEFAULT_LANGUAGE.to_string()
            }
        }
    }

    /// Download and parse the best subtitle track for a video.
    ///
    /// Any upstream failure is logged and reported as `None`.
    pub fn fetch_transcript(&self, video_url: &str) -> Option<FetchedTranscript> {
        match self.try_fetch_transcript(video_url) {
            Ok(fetched) => Some(fetched),
            Err(e) => {
                warn!("No transcript available for {video_url}: {e}");
                None
            }
        }
    }

    fn try_fetch_transcript(&self, video_url: &str) -> Result<FetchedTranscript> {
        let detected = self.detect_language(video_url);

        let work_dir = tempfile::Builder::new().prefix("ytscribe-").tempdir()?;
        let files = self.download_subtitles(video_url, &detected, work_dir.path())?;

        let Some(best) = select_subtitle_file(&files, &detected) else {
            bail!("no subtitle files were downloaded");
        };
        let selected = language_from_filename(best);
        info!("Using {selected} subtitles from {}", best.display());

        let content = std::fs::read_to_string(best)?;
        let transcript = parse_vtt(&content);
        if transcript.is_empty() {
            bail!("subtitle file {} has no text", best.display());
        }

        Ok(FetchedTranscript {
            transcript,
            detected_language: detected,
            selected_language: selected,
        })
    }

    fn download_subtitles(&self, video_url: &str, detected: &str, dir: &Path) -> Result<Vec<PathBuf>> {
        let sub_langs = self.sub_langs(detected);
        let template = dir.join("%(id)s.%(ext)s");
        let template = template.to_string_lossy();

        let output = self.run(
            &[
                "--write-auto-sub",
                "--write-sub",
                "--skip-download",
                "--sub-format",
                "vtt",
                "--sub-lang",
                &sub_langs,
                "--output",
                &template,
                video_url,
            ],
            Some(dir),
        )?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!("{} exited with status {}: {}", self.program.display(), output.status, stderr.trim());
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
            .flatten()
            .map(|entry| entry.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "vtt"))
            .collect();
        files.sort();

        if files.is_empty() {
            bail!("no subtitle files were downloaded");
        }

        debug!("Downloaded {} subtitle files", files.len());
        for file in &files {
            debug!("  {}: {}", language_from_filename(file), file.display());
        }
        Ok(files)
    }

    /// Comma-separated language list with the detected language first
    fn sub_langs(&self, detected: &str) -> String {
        let mut langs: Vec<&str> = vec![detected];
        for lang in &self.languages {
            if !langs.contains(&lang.as_str()) {
                langs.push(lang);
            }
        }
        langs.join(",")
    }

    /// Ordered watch URLs of every video in a playlist.
    pub fn playlist_video_urls(&self, playlist_url: &str) -> Result<Vec<String>> {
        if !is_playlist_url(playlist_url) {
            bail!("no playlist ID found in URL: {playlist_url}");
        }
        let playlist_url = decode(playlist_url);

        let output = self.run(&["--flat-playlist", "--get-id", "--ignore-errors", &playlist_url], None)?;
        if !output.status.success() {
            bail!("failed to list videos for {playlist_url} (status: {})", output.status);
        }

        let urls: Vec<String> = String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(watch_url)
            .collect();

        if urls.is_empty() {
            bail!("no videos found in playlist; check that it is public and accessible");
        }

        info!("Playlist {playlist_url} has {} videos", urls.len());
        Ok(urls)
    }
}

fn language_from_metadata(json: &str) -> Option<String> {
    let metadata: serde_json::Value = serde_json::from_str(json).ok()?;
    let candidates = [
        metadata.get("language"),
        metadata.get("language_preference"),
        metadata.get("automatic_captions").and_then(|c| c.get("language")),
    ];
    candidates
        .into_iter()
        .filter_map(|v| v.and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|lang| !lang.is_empty())
        .map(String::from)
}

/// Language code from a `name.xx.vtt` file name, `unknown` otherwise
pub fn language_from_filename(path: &Path) -> String {
    let name = path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    VTT_LANG
        .captures(&name)
        .map(|caps| caps[1].to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Pick the subtitle file to use.
///
/// Prefers the detected language; then English/Spanish (the other one of the
/// pair first when the detected language is one of them); then the first file.
pub fn select_subtitle_file<'a>(files: &'a [PathBuf], detected: &str) -> Option<&'a PathBuf> {
    let first = files.first()?;

    let has_lang = |file: &PathBuf, lang: &str| {
        file.file_name()
            .is_some_and(|name| name.to_string_lossy().contains(&format!(".{lang}.vtt")))
    };

    if let Some(file) = files.iter().find(|f| has_lang(f, detected)) {
        return Some(file);
    }

    let fallbacks: [&str; 2] = match detected {
        "en" => ["en", "es"],
        "es" => ["es", "en"],
        _ => ["en", "es"],
    };
    for lang in fallbacks {
        if let Some(file) = files.iter().find(|f| has_lang(f, lang)) {
            debug!("Falling back to {lang} subtitles");
            return Some(file);
        }
    }

    debug!("Using first available subtitle file");
    Some(first)
}

/// First line of `<name> --version`, if the tool is installed
pub fn tool_version(name: &str) -> Option<String> {
    Command::new(name)
        .arg("--version")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .trim()
                .lines()
                .next()
                .unwrap_or("")
                .to_string()
        })
}
