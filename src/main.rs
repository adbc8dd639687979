use std::path::PathBuf;
use std::time::Duration;

use eyre::{Result, bail};
use log::{debug, info};

use ytscribe::batch::{BatchContext, BatchSummary, process_videos};
use ytscribe::config::Config;
use ytscribe::youtube::PageClient;
use ytscribe::ytdlp::{YtDlp, tool_version};

mod cli;

use cli::{Cli, Command};

fn setup_logging() -> Result<()> {
    let log_dir = log_dir();
    std::fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join("ytscribe.log");

    let target = Box::new(std::fs::OpenOptions::new().create(true).append(true).open(&log_file)?);

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized: {}", log_file.display());
    Ok(())
}

fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("ytscribe")
        .join("logs")
}

fn build_after_help(program: &str) -> String {
    let yt_dlp_line = match tool_version(program) {
        Some(v) => format!("  \x1b[32m✅\x1b[0m yt-dlp     {v}"),
        None => "  \x1b[31m❌\x1b[0m yt-dlp     (not found; install with `pip install yt-dlp`)".to_string(),
    };

    let log_path = log_dir().join("ytscribe.log");

    format!(
        "\nREQUIRED TOOLS:\n{yt_dlp_line}\n\nConfig is read from: {}\nLogs are written to: {}",
        ytscribe::config::config_path().display(),
        log_path.display()
    )
}

fn print_summary(summary: &BatchSummary) {
    if summary.successful == summary.total {
        eprintln!("\n✅ Processing complete: {}/{} videos (100%)", summary.successful, summary.total);
    } else {
        eprintln!(
            "\n⚠️  Processing complete with errors: {}/{} videos ({:.1}%), {} failed",
            summary.successful,
            summary.total,
            summary.success_rate(),
            summary.failed()
        );
    }
    eprintln!("   Plain text:      {}", summary.plain_dir.display());
    eprintln!("   With timestamps: {}", summary.timestamps_dir.display());
}

#[tokio::main]
async fn main() -> Result<()> {
    setup_logging()?;

    // Load config file (non-fatal if missing/invalid)
    let config = Config::load().unwrap_or_default();
    let program = config.yt_dlp();

    let after_help = build_after_help(&program.to_string_lossy());
    let cmd = <Cli as clap::CommandFactory>::command().after_help(after_help);
    let matches = cmd.get_matches();
    let cli = <Cli as clap::FromArgMatches>::from_arg_matches(&matches)?;

    // CLI flags take priority over config
    let languages = if cli.langs.is_empty() { config.languages() } else { cli.langs.clone() };
    let output_dir = cli.output_dir.clone().unwrap_or_else(|| config.output_dir());
    let delay = Duration::from_millis(cli.delay_ms.unwrap_or_else(|| config.delay_ms()));

    if cli.verbose {
        let config_path = ytscribe::config::config_path();
        if config_path.exists() {
            eprintln!("Config: {}", config_path.display());
        }
        eprintln!("Languages: {}", languages.join(","));
        eprintln!("Output: {}", output_dir.display());
    }
    debug!("languages={languages:?} output_dir={} delay={delay:?}", output_dir.display());

    let ctx = BatchContext {
        page: PageClient::new(config.user_agent())?,
        ytdlp: YtDlp::new(program, languages),
        output_dir,
        delay,
    };

    let (urls, folder) = match cli.command {
        Command::Video { url, folder } => {
            if !ytscribe::urls::is_youtube_url(&url) {
                bail!("not a YouTube URL: {url}");
            }
            (vec![url], folder)
        }
        Command::List { file, folder } => {
            let urls = ytscribe::urls::read_url_file(&file)?;
            if urls.is_empty() {
                bail!("no YouTube URLs found in {}", file.display());
            }
            eprintln!("Found {} URLs in {}", urls.len(), file.display());
            (urls, folder)
        }
        Command::Playlist { url, folder } => {
            eprintln!("Listing playlist videos...");
            let urls = ctx.ytdlp.playlist_video_urls(&url)?;
            eprintln!("Found {} videos in playlist", urls.len());
            (urls, folder)
        }
        Command::Scan {
            file,
            folder,
            save,
            urls_only,
        } => {
            let html = std::fs::read_to_string(&file)
                .map_err(|e| eyre::eyre!("could not read {}: {e}\n\nSave the page source there first.", file.display()))?;
            let urls = ytscribe::extract_youtube_urls(&html);
            if urls.is_empty() {
                bail!("no YouTube URLs found in {}", file.display());
            }
            eprintln!("Found {} YouTube URLs", urls.len());

            if let Some(ref path) = save {
                ytscribe::urls::save_url_file(&urls, path)?;
                eprintln!("URLs written to: {}", path.display());
            }
            if urls_only {
                for url in &urls {
                    println!("{url}");
                }
                return Ok(());
            }
            (urls, folder)
        }
    };

    if cli.verbose {
        for (i, url) in urls.iter().take(5).enumerate() {
            eprintln!("   {}. {url}", i + 1);
        }
        if urls.len() > 5 {
            eprintln!("   ... and {} more", urls.len() - 5);
        }
    }

    eprintln!("Extracting transcripts for {} video(s)...", urls.len());
    let summary = process_videos(&urls, &folder, &ctx).await?;
    print_summary(&summary);

    Ok(())
}
