use std::sync::LazyLock;

use eyre::{Result, bail};
use log::debug;
use regex::Regex;

use crate::urls::extract_video_id;

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

static TITLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<title>(.+?)</title>").expect("valid title regex"));

/// HTTP client for YouTube watch pages, carrying a fixed user agent
#[derive(Debug, Clone)]
pub struct PageClient {
    client: reqwest::Client,
}

impl PageClient {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { client })
    }

    /// Title of the video behind `video_url`, falling back to its video id
    /// (or `unknown`) when the page cannot be fetched or has no title.
    pub async fn fetch_title(&self, video_url: &str) -> String {
        match self.fetch_page_title(video_url).await {
            Ok(title) => title,
            Err(e) => {
                debug!("Title lookup failed for {video_url}: {e}");
                extract_video_id(video_url).unwrap_or_else(|| "unknown".to_string())
            }
        }
    }

    async fn fetch_page_title(&self, video_url: &str) -> Result<String> {
        debug!("Fetching watch page: {video_url}");
        let html = self
            .client
            .get(video_url)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        extract_title(&html)
    }
}

fn extract_title(html: &str) -> Result<String> {
    let Some(caps) = TITLE.captures(html) else {
        bail!("no <title> in watch page");
    };
    let decoded = html_escape::decode_html_entities(&caps[1]).to_string();
    let title = decoded.replace(" - YouTube", "").trim().to_string();
    if title.is_empty() {
        bail!("empty <title> in watch page");
    }
    Ok(title)
}
